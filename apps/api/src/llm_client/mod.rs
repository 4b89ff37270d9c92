/// LLM Client: the single point of entry for all LLM calls in the screener.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through `LlmClient`, which is constructed in
/// `main` and handed to the pipelines through `AppState`.
///
/// Model: claude-sonnet-4-5 (hardcoded, not configurable)
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod circuit;
pub mod prompts;
#[cfg(test)]
pub mod testing;

use circuit::CircuitBreaker;
use prompts::PromptTemplate;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected API response: {0}")]
    Envelope(serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM output failed schema validation: {}", details.join("; "))]
    Schema { details: Vec<String> },

    #[error("LLM unavailable after {attempts} attempts: {message}")]
    Unavailable { attempts: u32, message: String },

    #[error("LLM circuit open, retry in {retry_after_secs}s")]
    CircuitOpen { retry_after_secs: u64 },
}

impl LlmError {
    /// Transport failures, rate limiting and 5xx are worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Output types of structured calls. `validate` runs after deserialization;
/// any returned detail turns the call into `LlmError::Schema`.
pub trait StructuredOutput: DeserializeOwned {
    fn validate(&self) -> Result<(), Vec<String>> {
        Ok(())
    }
}

/// One attempt at a text completion. Retry and circuit breaking live in
/// `LlmClient`, so implementations stay single-shot.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Anthropic Messages API backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

pub struct AnthropicCompletion {
    client: Client,
    api_key: String,
}

impl AnthropicCompletion {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            api_key,
        })
    }
}

#[async_trait]
impl Completion for AnthropicCompletion {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = serde_json::from_str(&body).map_err(LlmError::Envelope)?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        llm_response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client: retry, circuit breaker, structured output
// ────────────────────────────────────────────────────────────────────────────

/// Bounded exponential backoff for transient upstream failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`: 1s, 2s, 4s, ...
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * (1u32 << (attempt.saturating_sub(1)).min(16))
    }
}

/// The single LLM client used by all pipelines.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn Completion>,
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn Completion>) -> Self {
        Self::with_policy(backend, RetryPolicy::default(), CircuitBreaker::default())
    }

    pub fn with_policy(
        backend: Arc<dyn Completion>,
        retry: RetryPolicy,
        breaker: CircuitBreaker,
    ) -> Self {
        Self {
            backend,
            retry,
            breaker: Arc::new(breaker),
        }
    }

    /// Calls the backend, retrying transient failures with exponential backoff.
    /// Exhausted retries count against the circuit breaker and surface as
    /// `Unavailable`; permanent errors are returned as-is on the first attempt
    /// and, like successes, close the breaker.
    pub async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.breaker.check()?;

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.backend.complete(prompt, system).await {
                Ok(text) => {
                    self.breaker.record_success();
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        "LLM call attempt {} failed ({}), retrying after {}ms...",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_transient() => {
                    self.breaker.record_failure();
                    return Err(LlmError::Unavailable {
                        attempts: attempt,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    // The upstream answered, so it is reachable.
                    self.breaker.record_success();
                    return Err(e);
                }
            }
        }
    }

    /// Renders `template` with `vars`, calls the LLM, and coerces the reply into `T`.
    pub async fn call_structured<T: StructuredOutput>(
        &self,
        template: &PromptTemplate,
        vars: &[(&str, &str)],
    ) -> Result<T, LlmError> {
        let prompt = template.render(vars);
        let text = self.complete(&prompt, template.system).await?;
        parse_structured(&text)
    }
}

/// Parses model text into a validated `T`. Markdown fences are tolerated.
pub fn parse_structured<T: StructuredOutput>(text: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(text);
    let value: T = serde_json::from_str(text).map_err(|e| LlmError::Schema {
        details: vec![e.to_string()],
    })?;
    value
        .validate()
        .map_err(|details| LlmError::Schema { details })?;
    Ok(value)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
