//! Candidate recommendation: rank prior score records, ask the LLM for the top N.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::screening::models::{CandidateScore, RecommendationList};
use crate::screening::prompts::RECOMMENDATION;

/// Stable sort by `aggregate_score`, highest first. Equal scores keep their
/// submission order.
pub fn sort_by_aggregate(candidates: &mut [CandidateScore]) {
    candidates.sort_by(|a, b| b.aggregate_score.total_cmp(&a.aggregate_score));
}

/// Returns the LLM's recommendations for `candidates`.
///
/// An empty input returns an empty list without calling the LLM. The reply is
/// returned as-is: a list longer or shorter than `count` is not corrected.
pub async fn recommend(
    llm: &LlmClient,
    mut candidates: Vec<CandidateScore>,
    count: u32,
) -> Result<RecommendationList, AppError> {
    if candidates.is_empty() {
        return Ok(RecommendationList::default());
    }

    sort_by_aggregate(&mut candidates);

    let candidate_scores_json = serde_json::to_string(&candidates)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize candidates: {e}")))?;
    let num_recommendations = count.to_string();

    let list: RecommendationList = llm
        .call_structured(
            &RECOMMENDATION,
            &[
                ("candidate_scores_json", candidate_scores_json.as_str()),
                ("num_recommendations", num_recommendations.as_str()),
            ],
        )
        .await
        .map_err(|e| AppError::from_llm("recommendation", e))?;

    if list.recommendations.len() != count as usize {
        warn!(
            "Requested {count} recommendations, LLM returned {}",
            list.recommendations.len()
        );
    }
    info!(
        "Recommended {} of {} candidates",
        list.recommendations.len(),
        candidates.len()
    );

    Ok(list)
}
