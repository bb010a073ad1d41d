//! Session handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::sessions::session_id;
use crate::{AppError, AppState, SuccessResponse};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
}

/// POST /api/session - Start a new session
///
/// Clients send the returned id back in the `x-session-id` header.
pub async fn create_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    let session_id = state.sessions.create().await;
    Json(SessionResponse { session_id })
}

/// DELETE /api/session - Drop the current session with its cache and ledger
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = session_id(&headers).ok_or_else(|| AppError::bad_request("Invalid session id"))?;
    if !state.sessions.remove(&id).await {
        return Err(AppError::not_found("Session not found"));
    }
    Ok(Json(SuccessResponse { success: true }))
}
