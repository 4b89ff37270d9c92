//! Wire and LLM-output types for screening and recommendation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::llm_client::StructuredOutput;

/// Upper bound of the technical, soft-skills and extracurricular scores.
pub const CATEGORY_SCORE_MAX: i32 = 10;
/// Upper bound of the client-need score. Rescaled to 0–10 before weighting.
pub const CLIENT_NEED_SCORE_MAX: i32 = 3;

// ────────────────────────────────────────────────────────────────────────────
// Keyword stage
// ────────────────────────────────────────────────────────────────────────────

/// Keywords extracted from the job description, in the order the LLM gave them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedKeywords {
    pub keywords: Vec<String>,
}

impl StructuredOutput for ExtractedKeywords {}

/// Four-bucket partition of the extracted keywords.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordCategories {
    pub technical: Vec<String>,
    pub soft_skills: Vec<String>,
    pub extracurricular: Vec<String>,
    pub recruiter_requirements: Vec<String>,
}

impl StructuredOutput for KeywordCategories {}

impl KeywordCategories {
    pub fn buckets(&self) -> [&[String]; 4] {
        [
            &self.technical,
            &self.soft_skills,
            &self.extracurricular,
            &self.recruiter_requirements,
        ]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Strictness
// ────────────────────────────────────────────────────────────────────────────

/// Qualitative leniency passed through to the scoring prompt. Never
/// interpreted locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    Low,
    #[default]
    Medium,
    High,
    VeryStrict,
}

impl Strictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::Low => "low",
            Strictness::Medium => "medium",
            Strictness::High => "high",
            Strictness::VeryStrict => "very strict",
        }
    }

    /// Parses an optional form value; absent or blank means the default.
    pub fn from_form(value: Option<&str>) -> Result<Self, String> {
        match value.map(str::trim) {
            None | Some("") => Ok(Strictness::default()),
            Some(raw) => raw.parse(),
        }
    }
}

impl FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "low" => Ok(Strictness::Low),
            "medium" => Ok(Strictness::Medium),
            "high" => Ok(Strictness::High),
            "very strict" => Ok(Strictness::VeryStrict),
            _ => Err(format!(
                "Invalid strictness '{s}'. Expected one of: low, medium, high, very strict"
            )),
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume score
// ────────────────────────────────────────────────────────────────────────────

/// Per-candidate evaluation. Every field except `aggregate_score` comes from
/// the LLM; `aggregate_score` is always recomputed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeScore {
    pub name: String,
    pub technical_score: i32,
    pub technical_reason: String,
    pub softskills_score: i32,
    pub softskills_reason: String,
    pub extracurricular_score: i32,
    pub extracurricular_reason: String,
    pub client_need_score: i32,
    pub client_need_reason: String,
    #[serde(default)]
    pub aggregate_score: f64,
}

impl StructuredOutput for ResumeScore {
    fn validate(&self) -> Result<(), Vec<String>> {
        let checks = [
            ("technical_score", self.technical_score, CATEGORY_SCORE_MAX),
            ("softskills_score", self.softskills_score, CATEGORY_SCORE_MAX),
            ("extracurricular_score", self.extracurricular_score, CATEGORY_SCORE_MAX),
            ("client_need_score", self.client_need_score, CLIENT_NEED_SCORE_MAX),
        ];
        let errors: Vec<String> = checks
            .iter()
            .filter(|(_, value, max)| !(0..=*max).contains(value))
            .map(|(field, value, max)| format!("{field}: {value} is outside 0..={max}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Category weights for the aggregate score. Client need is rescaled onto
/// 0–10 before its weight is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateWeights {
    pub technical: f64,
    pub softskills: f64,
    pub extracurricular: f64,
    pub client_need: f64,
}

impl Default for AggregateWeights {
    fn default() -> Self {
        Self {
            technical: 0.4,
            softskills: 0.3,
            extracurricular: 0.2,
            client_need: 0.1,
        }
    }
}

/// technical×0.4 + softskills×0.3 + extracurricular×0.2 + (client_need/3×10)×0.1
pub fn compute_aggregate_score(score: &ResumeScore, weights: &AggregateWeights) -> f64 {
    let normalized_client_need =
        score.client_need_score as f64 / CLIENT_NEED_SCORE_MAX as f64 * CATEGORY_SCORE_MAX as f64;

    weights.technical * score.technical_score as f64
        + weights.softskills * score.softskills_score as f64
        + weights.extracurricular * score.extracurricular_score as f64
        + weights.client_need * normalized_client_need
}

// ────────────────────────────────────────────────────────────────────────────
// Recommendation
// ────────────────────────────────────────────────────────────────────────────

/// A prior score record as submitted to `/recommend`. Only `aggregate_score`
/// is read locally (missing = 0); every other field is forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    #[serde(default)]
    pub aggregate_score: f64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedCandidate {
    pub name: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationList {
    pub recommendations: Vec<RecommendedCandidate>,
}

impl StructuredOutput for RecommendationList {
    fn validate(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self
            .recommendations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.name.trim().is_empty())
            .map(|(i, _)| format!("recommendations[{i}].name is empty"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
