use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pdf::ResumeTextExtractor;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every upload lives only as long as its handler.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Pluggable resume text extractor. Default: PdfTextExtractor.
    pub extractor: Arc<dyn ResumeTextExtractor>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State wired to a scripted LLM and a plain-text "PDF" extractor.
    pub fn for_tests(
        backend: Arc<crate::llm_client::testing::ScriptedCompletion>,
        batch_concurrency: usize,
    ) -> Self {
        Self {
            llm: LlmClient::new(backend),
            extractor: Arc::new(crate::pdf::testing::PlainTextExtractor),
            config: Config {
                anthropic_api_key: "test-key".to_string(),
                port: 0,
                rust_log: "debug".to_string(),
                batch_concurrency,
                max_upload_bytes: 1024 * 1024,
            },
        }
    }
}
