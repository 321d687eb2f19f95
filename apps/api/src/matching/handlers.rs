//! Axum route handlers for the Matching API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::{MatchResult, ScoredJob};
use crate::models::job::Job;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMatchRequest {
    pub jobs: Vec<Job>,
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct BatchMatchResponse {
    pub jobs: Vec<ScoredJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreJobRequest {
    pub job: Option<Job>,
    pub resume_text: Option<String>,
}

/// POST /api/v1/jobs/match
///
/// Scores a submitted job list against resume text and returns it ranked.
/// Scoring never fails; an unusable resume just yields zero-score entries.
pub async fn handle_batch_match(
    State(state): State<AppState>,
    Json(req): Json<BatchMatchRequest>,
) -> Result<Json<BatchMatchResponse>, AppError> {
    let jobs = state.matcher.batch_score(req.jobs, &req.resume_text).await;
    Ok(Json(BatchMatchResponse { jobs }))
}

/// POST /api/v1/jobs/score
///
/// Scores a single job. Missing job or resume is not an error: the response
/// is the defined zero-score result.
pub async fn handle_score_job(
    State(state): State<AppState>,
    Json(req): Json<ScoreJobRequest>,
) -> Json<MatchResult> {
    let result = state
        .matcher
        .score_job(req.job.as_ref(), req.resume_text.as_deref())
        .await;
    Json(result)
}
