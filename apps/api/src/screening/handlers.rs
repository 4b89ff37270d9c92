//! Axum route handlers for screening and recommendation.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::screening::batch::{screen_batch, BatchEntry};
use crate::screening::models::{CandidateScore, RecommendationList, ResumeScore, Strictness};
use crate::screening::recommend::recommend;
use crate::screening::scorer::score_resume;
use crate::screening::upload::{read_screening_form, ScreeningForm};
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const RESUMES_FIELD: &str = "resumes[]";
const INVALID_RECOMMEND_BODY: &str =
    "Invalid request body. Expected 'candidate_scores' and 'num_recommendations'.";

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub candidate_scores: Option<Vec<CandidateScore>>,
    pub num_recommendations: Option<u32>,
}

/// POST /screen
///
/// Multipart: `resume` (PDF), `job_description`, optional `strictness`.
pub async fn handle_screen(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResumeScore>, AppError> {
    let form = read_form(multipart, RESUME_FIELD).await?;

    let resume = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;
    let job_description = require_job_description(form.job_description)?;
    if !resume.has_filename() {
        return Err(AppError::Validation("No selected file".to_string()));
    }
    let strictness = Strictness::from_form(form.strictness.as_deref()).map_err(AppError::Validation)?;

    let score = score_resume(
        &state.llm,
        state.extractor.as_ref(),
        &job_description,
        resume.bytes,
        strictness,
    )
    .await?;

    Ok(Json(score))
}

/// POST /batch_screen
///
/// Multipart: one or more `resumes[]` files, `job_description`, optional
/// `strictness`. Always 200 once the form is valid; failures are per entry.
pub async fn handle_batch_screen(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<BatchEntry>>, AppError> {
    let form = read_form(multipart, RESUMES_FIELD).await?;

    if form.files.is_empty() {
        return Err(AppError::Validation("No resume files provided".to_string()));
    }
    let job_description = require_job_description(form.job_description)?;
    let strictness = Strictness::from_form(form.strictness.as_deref()).map_err(AppError::Validation)?;

    let entries = screen_batch(
        &state.llm,
        state.extractor.as_ref(),
        &job_description,
        strictness,
        form.files,
        state.config.batch_concurrency,
    )
    .await;

    Ok(Json(entries))
}

/// POST /recommend
///
/// JSON: `candidate_scores` (score records), `num_recommendations`.
pub async fn handle_recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendationList>, AppError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected /recommend body: {e}");
        AppError::Validation(INVALID_RECOMMEND_BODY.to_string())
    })?;
    let (Some(candidate_scores), Some(count)) =
        (request.candidate_scores, request.num_recommendations)
    else {
        return Err(AppError::Validation(INVALID_RECOMMEND_BODY.to_string()));
    };

    let list = recommend(&state.llm, candidate_scores, count).await?;
    Ok(Json(list))
}

async fn read_form(
    multipart: Result<Multipart, MultipartRejection>,
    file_field: &str,
) -> Result<ScreeningForm, AppError> {
    let mut multipart = multipart
        .map_err(|e| AppError::Validation(format!("Expected a multipart/form-data body: {e}")))?;
    read_screening_form(&mut multipart, file_field).await
}

fn require_job_description(value: Option<String>) -> Result<String, AppError> {
    value
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("No job description provided".to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::llm_client::testing::ScriptedCompletion;
    use crate::routes::build_router;
    use crate::screening::scorer::fixtures::{screening_llm, JANE_RESUME, JOB_DESCRIPTION};
    use crate::screening::upload::testing::{body, content_type, Part};
    use crate::state::AppState;

    fn app(backend: Arc<ScriptedCompletion>) -> Router {
        build_router(AppState::for_tests(backend, 1))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, content_type())
            .body(Body::from(body(parts)))
            .unwrap()
    }

    fn json_request(uri: &str, value: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap()
    }

    // ── /screen ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_screen_end_to_end() {
        let backend = Arc::new(screening_llm(&[("Jane Doe", 8, 2)]));
        let (status, body) = send(
            app(backend),
            multipart(
                "/screen",
                &[
                    Part::File("resume", "jane.pdf", JANE_RESUME.as_bytes()),
                    Part::Text("job_description", JOB_DESCRIPTION),
                    Part::Text("strictness", "medium"),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Jane Doe");
        let technical = body["technical_score"].as_i64().unwrap();
        assert!((0..=10).contains(&technical));
        // 8*0.4 + 5*0.3 + 2*0.2 + (2/3*10)*0.1
        let expected = 3.2 + 1.5 + 0.4 + 2.0 / 3.0;
        assert!((body["aggregate_score"].as_f64().unwrap() - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_screen_missing_job_description_is_400() {
        let backend = Arc::new(ScriptedCompletion::new());
        let (status, body) = send(
            app(backend.clone()),
            multipart("/screen", &[Part::File("resume", "jane.pdf", JANE_RESUME.as_bytes())]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No job description provided");
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_screen_missing_resume_is_400() {
        let backend = Arc::new(ScriptedCompletion::new());
        let (status, body) = send(
            app(backend),
            multipart("/screen", &[Part::Text("job_description", JOB_DESCRIPTION)]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No resume file provided");
    }

    #[tokio::test]
    async fn test_screen_empty_filename_is_400() {
        let backend = Arc::new(ScriptedCompletion::new());
        let (status, _) = send(
            app(backend.clone()),
            multipart(
                "/screen",
                &[
                    Part::File("resume", "", JANE_RESUME.as_bytes()),
                    Part::Text("job_description", JOB_DESCRIPTION),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_screen_unknown_strictness_is_400() {
        let backend = Arc::new(ScriptedCompletion::new());
        let (status, body) = send(
            app(backend),
            multipart(
                "/screen",
                &[
                    Part::File("resume", "jane.pdf", JANE_RESUME.as_bytes()),
                    Part::Text("job_description", JOB_DESCRIPTION),
                    Part::Text("strictness", "ruthless"),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("ruthless"));
    }

    #[tokio::test]
    async fn test_screen_unextractable_resume_is_500() {
        let backend = Arc::new(screening_llm(&[]));
        let (status, body) = send(
            app(backend),
            multipart(
                "/screen",
                &[
                    Part::File("resume", "blank.pdf", b"   "),
                    Part::Text("job_description", JOB_DESCRIPTION),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "EXTRACTION_ERROR");
    }

    #[tokio::test]
    async fn test_screen_schema_failure_reports_details() {
        let backend = Arc::new(screening_llm(&[("Jane Doe", 8, 9)]));
        let (status, body) = send(
            app(backend),
            multipart(
                "/screen",
                &[
                    Part::File("resume", "jane.pdf", JANE_RESUME.as_bytes()),
                    Part::Text("job_description", JOB_DESCRIPTION),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "SCHEMA_VALIDATION_ERROR");
        assert_eq!(body["error"]["details"][0], "client_need_score: 9 is outside 0..=3");
    }

    #[tokio::test]
    async fn test_screen_non_multipart_is_400() {
        let backend = Arc::new(ScriptedCompletion::new());
        let (status, _) = send(app(backend), json_request("/screen", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ── /batch_screen ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_batch_screen_one_entry_per_named_file() {
        let backend = Arc::new(screening_llm(&[("Ann Lee", 9, 3), ("Bo Park", 3, 0)]));
        let (status, body) = send(
            app(backend),
            multipart(
                "/batch_screen",
                &[
                    Part::Text("job_description", JOB_DESCRIPTION),
                    Part::File("resumes[]", "ann.pdf", b"Ann Lee, Python"),
                    Part::File("resumes[]", "", b"skipped"),
                    Part::File("resumes[]", "broken.pdf", b""),
                    Part::File("resumes[]", "bo.pdf", b"Bo Park, Java"),
                    Part::Text("strictness", "very strict"),
                ],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["filename"], "ann.pdf");
        assert_eq!(entries[0]["score"]["name"], "Ann Lee");
        assert_eq!(entries[1]["filename"], "broken.pdf");
        assert!(entries[1]["error"].as_str().unwrap().starts_with("Error processing resume"));
        assert!(entries[1].get("details").is_none());
        assert_eq!(entries[2]["filename"], "bo.pdf");
        assert_eq!(entries[2]["score"]["name"], "Bo Park");
    }

    #[tokio::test]
    async fn test_batch_screen_without_files_is_400() {
        let backend = Arc::new(ScriptedCompletion::new());
        let (status, body) = send(
            app(backend),
            multipart("/batch_screen", &[Part::Text("job_description", JOB_DESCRIPTION)]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No resume files provided");
    }

    #[tokio::test]
    async fn test_batch_screen_without_job_description_is_400() {
        let backend = Arc::new(ScriptedCompletion::new());
        let (status, body) = send(
            app(backend),
            multipart("/batch_screen", &[Part::File("resumes[]", "a.pdf", b"Ann Lee")]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "No job description provided");
    }

    // ── /recommend ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_recommend_missing_fields_is_400() {
        let backend = Arc::new(ScriptedCompletion::new());
        for payload in [
            json!({}),
            json!({"candidate_scores": []}),
            json!({"num_recommendations": 2}),
        ] {
            let (status, body) =
                send(app(backend.clone()), json_request("/recommend", payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body["error"]["message"],
                "Invalid request body. Expected 'candidate_scores' and 'num_recommendations'."
            );
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_recommend_non_json_is_400() {
        let backend = Arc::new(ScriptedCompletion::new());
        let request = Request::post("/recommend")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        let (status, _) = send(app(backend), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recommend_empty_candidates_skip_llm() {
        let backend = Arc::new(ScriptedCompletion::new());
        let (status, body) = send(
            app(backend.clone()),
            json_request(
                "/recommend",
                json!({"candidate_scores": [], "num_recommendations": 3}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"recommendations": []}));
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_recommend_returns_llm_list() {
        let backend = Arc::new(ScriptedCompletion::new().then_ok(
            r#"{"recommendations": [{"name": "Jane Doe", "reason": "Strongest Python background"}]}"#,
        ));
        let (status, body) = send(
            app(backend),
            json_request(
                "/recommend",
                json!({
                    "candidate_scores": [
                        {"name": "John Doe", "technical_score": 8, "aggregate_score": 7.0},
                        {"name": "Jane Doe", "technical_score": 9, "aggregate_score": 7.1}
                    ],
                    "num_recommendations": 1
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"][0]["name"], "Jane Doe");
        assert!(body["recommendations"][0].get("aggregate_score").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recommend_upstream_down_is_503() {
        let transient = || crate::llm_client::LlmError::Api {
            status: 529,
            message: "overloaded".to_string(),
        };
        let backend = Arc::new(
            ScriptedCompletion::new()
                .then_err(transient())
                .then_err(transient())
                .then_err(transient()),
        );
        let (status, body) = send(
            app(backend),
            json_request(
                "/recommend",
                json!({"candidate_scores": [{"name": "A", "aggregate_score": 1}], "num_recommendations": 1}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "UPSTREAM_UNAVAILABLE");
    }
}
