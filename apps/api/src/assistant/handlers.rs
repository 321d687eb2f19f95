//! Axum route handlers for the Assistant API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assistant::ChatOutcome;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearHistoryRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClearHistoryResponse {
    pub cleared: bool,
}

/// POST /api/v1/assistant/query
///
/// The assistant itself never fails; the only rejection here is an empty
/// message, which is a request-shape problem rather than a chat problem.
pub async fn handle_query(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }
    let outcome = state.assistant.process_query(&req.user_id, &req.message).await;
    Ok(Json(outcome))
}

/// POST /api/v1/assistant/history/clear
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Json(req): Json<ClearHistoryRequest>,
) -> Json<ClearHistoryResponse> {
    state.assistant.clear_history(&req.user_id).await;
    Json(ClearHistoryResponse { cleared: true })
}
