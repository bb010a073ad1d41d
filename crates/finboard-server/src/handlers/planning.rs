//! Budget, forecast and health check handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use finboard_core::session::LOAD_DATA_FIRST;
use finboard_core::{BudgetReport, Forecast, ForecastSettings, HealthReport, Notices};

use super::current_session;
use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct BudgetsView {
    /// Absent when spending could not be loaded
    pub report: Option<BudgetReport>,
    pub notices: Notices,
}

/// Request body for setting budgets
#[derive(Debug, Deserialize)]
pub struct SetBudgetsRequest {
    /// Category name to monthly budget
    pub budgets: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct HealthQuery {
    /// Defaults to three months of expenses
    pub emergency_fund: Option<f64>,
}

/// GET /api/budgets - Spending against budgets
pub async fn get_budgets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<BudgetsView>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let data = session.load(state.fetcher.as_ref(), &state.endpoints).await;
    Ok(Json(BudgetsView {
        report: session.budget_report(&data),
        notices: data.notices,
    }))
}

/// POST /api/budgets - Override budgets, then report
///
/// All overrides are validated before any is applied.
pub async fn set_budgets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SetBudgetsRequest>,
) -> Result<Json<BudgetsView>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;

    let mut budgets = session.budgets.clone();
    for (category, amount) in &body.budgets {
        budgets.set(category, *amount).map_err(AppError::from_core)?;
    }
    session.budgets = budgets;

    let data = session.load(state.fetcher.as_ref(), &state.endpoints).await;
    Ok(Json(BudgetsView {
        report: session.budget_report(&data),
        notices: data.notices,
    }))
}

/// GET /api/forecast - Cash-flow projection from the current month
///
/// Without loaded data the 404 body carries the fetch notices.
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(settings): Query<ForecastSettings>,
) -> Result<Json<Forecast>, AppError> {
    settings.validate().map_err(AppError::from_core)?;

    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let data = session.load(state.fetcher.as_ref(), &state.endpoints).await;
    let start = Local::now().date_naive();
    match session.forecast(&data, &settings, start) {
        Ok(forecast) => Ok(Json(forecast)),
        Err(e) => Err(AppError::from_core(e).with_notices(data.notices)),
    }
}

/// GET /api/health - Financial health score
pub async fn get_health(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HealthQuery>,
) -> Result<Json<HealthReport>, AppError> {
    if let Some(fund) = query.emergency_fund {
        if !fund.is_finite() || fund < 0.0 {
            return Err(AppError::bad_request(
                "emergency_fund must be a non-negative number",
            ));
        }
    }

    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let data = session.load(state.fetcher.as_ref(), &state.endpoints).await;
    if data.summary.is_none() {
        return Err(AppError::not_found(LOAD_DATA_FIRST).with_notices(data.notices));
    }
    match session.health(&data, query.emergency_fund) {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(AppError::from_core(e).with_notices(data.notices)),
    }
}
