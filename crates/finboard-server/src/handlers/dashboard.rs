//! Overview tab handlers
//!
//! Fetch failures never fail the request: sections that could not be loaded
//! are absent and the reason travels in `notices`.

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use finboard_core::{Notices, OverviewView, SpendingChart};

use super::current_session;
use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct SpendingView {
    pub chart: Option<SpendingChart>,
    pub notices: Notices,
}

/// GET /api/overview - Headline metrics and spending chart
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<OverviewView>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let view = session
        .overview(state.fetcher.as_ref(), &state.endpoints)
        .await;
    Ok(Json(view))
}

/// GET /api/spending - Spending chart only
pub async fn get_spending(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SpendingView>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let data = session.load(state.fetcher.as_ref(), &state.endpoints).await;
    Ok(Json(SpendingView {
        chart: data.spending.as_ref().map(SpendingChart::from_spending),
        notices: data.notices,
    }))
}

/// POST /api/refresh - Clear cached payloads and reload the overview
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<OverviewView>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let view = session
        .refresh(state.fetcher.as_ref(), &state.endpoints)
        .await;
    Ok(Json(view))
}
