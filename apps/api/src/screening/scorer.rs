//! Resume scoring pipeline.
//!
//! Flow: extract_keywords → categorize_keywords → extract resume text →
//!       LLM scoring → local aggregate score.
//!
//! The aggregate is the only value computed here rather than by the LLM.

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::pdf::ResumeTextExtractor;
use crate::screening::keywords::{categorize_keywords, extract_keywords};
use crate::screening::models::{
    compute_aggregate_score, AggregateWeights, KeywordCategories, ResumeScore, Strictness,
};
use crate::screening::prompts::RESUME_SCORING;

pub const UNEXTRACTABLE_RESUME: &str = "Could not extract text from the provided resume PDF.";

/// Scores one resume against a job description.
///
/// Steps:
/// 1. extract_keywords() → keyword phrases
/// 2. categorize_keywords() → KeywordCategories
/// 3. extractor.extract() → resume text (empty ⇒ `AppError::Extraction`)
/// 4. LLM scoring → ResumeScore
/// 5. aggregate_score computed locally
pub async fn score_resume(
    llm: &LlmClient,
    extractor: &dyn ResumeTextExtractor,
    job_description: &str,
    resume: Bytes,
    strictness: Strictness,
) -> Result<ResumeScore, AppError> {
    let request_id = Uuid::new_v4();

    // Step 1: Keywords
    let keywords = extract_keywords(job_description, llm).await?;
    info!("[{request_id}] Extracted {} keywords", keywords.len());

    // Step 2: Categories
    let categories = categorize_keywords(&keywords, llm).await?;

    // Step 3: Resume text
    let resume_text = extractor.extract(resume).await;
    if resume_text.trim().is_empty() {
        return Err(AppError::Extraction(UNEXTRACTABLE_RESUME.to_string()));
    }
    info!("[{request_id}] Resume text extracted ({} chars)", resume_text.len());

    // Step 4: LLM scoring
    let mut score = request_score(llm, &resume_text, &categories, strictness).await?;

    // Step 5: Aggregate
    score.aggregate_score = compute_aggregate_score(&score, &AggregateWeights::default());
    info!(
        "[{request_id}] Scored '{}' at {:.2} (strictness: {strictness})",
        score.name, score.aggregate_score
    );

    Ok(score)
}

async fn request_score(
    llm: &LlmClient,
    resume_text: &str,
    categories: &KeywordCategories,
    strictness: Strictness,
) -> Result<ResumeScore, AppError> {
    let to_json = |items: &[String]| {
        serde_json::to_string(items)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize keywords: {e}")))
    };
    let technical = to_json(categories.technical.as_slice())?;
    let soft_skills = to_json(categories.soft_skills.as_slice())?;
    let extracurricular = to_json(categories.extracurricular.as_slice())?;
    let client_need = to_json(categories.recruiter_requirements.as_slice())?;

    llm.call_structured(
        &RESUME_SCORING,
        &[
            ("resume_text", resume_text),
            ("technical", technical.as_str()),
            ("soft_skills", soft_skills.as_str()),
            ("extracurricular", extracurricular.as_str()),
            ("client_need", client_need.as_str()),
            ("strictness", strictness.as_str()),
        ],
    )
    .await
    .map_err(|e| AppError::from_llm("resume scoring", e))
}
