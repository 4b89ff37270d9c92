//! Resume text extraction.
//!
//! Failure is signalled as an empty string, never as an error: the scoring
//! pipeline decides what an empty resume means for the request.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

/// Turns uploaded resume bytes into plain text. Empty output means "nothing
/// could be extracted".
#[async_trait]
pub trait ResumeTextExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes) -> String;
}

/// `pdf-extract` backed extractor. Decoding runs on the blocking pool; both
/// decode errors and decoder panics come back as an empty string.
pub struct PdfTextExtractor;

#[async_trait]
impl ResumeTextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Bytes) -> String {
        if bytes.is_empty() {
            warn!("PDF extraction skipped: empty upload");
            return String::new();
        }

        match tokio::task::spawn_blocking(move || extract_pages(&bytes)).await {
            Ok(text) => text,
            Err(e) => {
                warn!("PDF extraction aborted: {e}");
                String::new()
            }
        }
    }
}

/// Concatenates per-page text in page order.
fn extract_pages(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem_by_pages(bytes) {
        Ok(pages) => {
            debug!("Extracted text from {} PDF pages", pages.len());
            let text = pages.concat();
            if text.trim().is_empty() {
                String::new()
            } else {
                text
            }
        }
        Err(e) => {
            warn!("Error extracting text from PDF: {e}");
            String::new()
        }
    }
}
