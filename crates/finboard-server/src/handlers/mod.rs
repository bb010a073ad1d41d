//! API handlers

pub mod dashboard;
pub mod insights;
pub mod ledger;
pub mod planning;
pub mod session;

pub use dashboard::*;
pub use insights::*;
pub use ledger::*;
pub use planning::*;
pub use session::*;

use axum::http::HeaderMap;

use crate::sessions::{session_id, SharedSession};
use crate::{AppError, AppState};

/// Session named by the request, created on first use
pub(crate) async fn current_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SharedSession, AppError> {
    let id = session_id(headers).ok_or_else(|| AppError::bad_request("Invalid session id"))?;
    Ok(state.sessions.get_or_create(&id).await)
}
