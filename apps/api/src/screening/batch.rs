//! Batch screening with per-file error isolation.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::pdf::ResumeTextExtractor;
use crate::screening::models::{ResumeScore, Strictness};
use crate::screening::scorer::score_resume;
use crate::screening::upload::UploadedResume;

/// One result per screened file, in submission order.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Scored {
        filename: String,
        score: ResumeScore,
    },
    Failed {
        filename: String,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<Vec<String>>,
    },
}

impl BatchEntry {
    pub fn filename(&self) -> &str {
        match self {
            BatchEntry::Scored { filename, .. } | BatchEntry::Failed { filename, .. } => filename,
        }
    }

    fn from_result(filename: String, result: Result<ResumeScore, AppError>) -> Self {
        match result {
            Ok(score) => BatchEntry::Scored { filename, score },
            Err(AppError::Schema { details, .. }) => BatchEntry::Failed {
                filename,
                error: "Data validation error from LLM output".to_string(),
                details: Some(details),
            },
            Err(e) => BatchEntry::Failed {
                filename,
                error: format!("Error processing resume: {e}"),
                details: None,
            },
        }
    }
}

/// Scores every named upload, at most `concurrency` at a time. Uploads with an
/// empty filename are skipped. A failure only affects its own entry.
pub async fn screen_batch(
    llm: &LlmClient,
    extractor: &dyn ResumeTextExtractor,
    job_description: &str,
    strictness: Strictness,
    uploads: Vec<UploadedResume>,
    concurrency: usize,
) -> Vec<BatchEntry> {
    let submitted = uploads.len();
    let named: Vec<UploadedResume> = uploads.into_iter().filter(|u| u.has_filename()).collect();
    info!(
        "Batch screening {} files ({} skipped without a filename, concurrency {})",
        named.len(),
        submitted - named.len(),
        concurrency
    );

    stream::iter(named)
        .map(|upload| async move {
            let UploadedResume { filename, bytes } = upload;
            let result = score_resume(llm, extractor, job_description, bytes, strictness).await;
            let entry = BatchEntry::from_result(filename, result);
            if let BatchEntry::Failed { error, .. } = &entry {
                warn!("Batch entry '{}' failed: {error}", entry.filename());
            }
            entry
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
