//! Keyword stage: job description → keywords → four categories.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::screening::models::{ExtractedKeywords, KeywordCategories};
use crate::screening::prompts::{KEYWORD_CATEGORIZATION, KEYWORD_EXTRACTION};

const MAX_KEYWORD_WORDS: usize = 6;

pub async fn extract_keywords(
    job_description: &str,
    llm: &LlmClient,
) -> Result<Vec<String>, AppError> {
    let extracted: ExtractedKeywords = llm
        .call_structured(&KEYWORD_EXTRACTION, &[("job_description", job_description)])
        .await
        .map_err(|e| AppError::from_llm("keyword extraction", e))?;

    let long = extracted
        .keywords
        .iter()
        .filter(|k| k.split_whitespace().count() > MAX_KEYWORD_WORDS)
        .count();
    if long > 0 {
        debug!("{long} extracted keywords exceed {MAX_KEYWORD_WORDS} words");
    }

    Ok(extracted.keywords)
}

pub async fn categorize_keywords(
    keywords: &[String],
    llm: &LlmClient,
) -> Result<KeywordCategories, AppError> {
    let keywords_json = serde_json::to_string(keywords)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize keywords: {e}")))?;

    let categories: KeywordCategories = llm
        .call_structured(&KEYWORD_CATEGORIZATION, &[("keywords", keywords_json.as_str())])
        .await
        .map_err(|e| AppError::from_llm("keyword categorization", e))?;

    let coverage = check_coverage(keywords, &categories);
    if !coverage.is_exact() {
        warn!(
            "Keyword categorization is not a partition: missing={:?} duplicated={:?}",
            coverage.missing, coverage.duplicated
        );
    }

    Ok(categories)
}

/// How far a categorization is from "every keyword in exactly one bucket".
/// Reported only; the categorization is used as-is either way.
#[derive(Debug, Default, PartialEq)]
pub struct CategoryCoverage {
    pub missing: Vec<String>,
    pub duplicated: Vec<String>,
}

impl CategoryCoverage {
    pub fn is_exact(&self) -> bool {
        self.missing.is_empty() && self.duplicated.is_empty()
    }
}

/// Case-insensitive comparison of input keywords against the buckets.
pub fn check_coverage(keywords: &[String], categories: &KeywordCategories) -> CategoryCoverage {
    let mut placements: HashMap<String, usize> = HashMap::new();
    for bucket in categories.buckets() {
        for keyword in bucket {
            *placements.entry(keyword.trim().to_lowercase()).or_default() += 1;
        }
    }

    let mut coverage = CategoryCoverage::default();
    for keyword in keywords {
        match placements.get(&keyword.trim().to_lowercase()) {
            None => coverage.missing.push(keyword.clone()),
            Some(n) if *n > 1 => coverage.duplicated.push(keyword.clone()),
            Some(_) => {}
        }
    }
    coverage
}
