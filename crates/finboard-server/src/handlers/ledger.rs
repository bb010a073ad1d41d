//! Ledger handlers: goals, debts, investments, assets and liabilities
//!
//! Records are appended to the current session only. Invalid records are
//! rejected with 400 and leave the ledger untouched.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use finboard_core::{
    Asset, Debt, Goal, GoalProgress, Investment, Liability, NetWorth, PayoffRow, PayoffStrategy,
    PortfolioSummary,
};

use super::current_session;
use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct PayoffQuery {
    #[serde(default)]
    pub strategy: PayoffStrategy,
}

// ========== Goals ==========

/// GET /api/goals - Goals with progress
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<GoalProgress>>, AppError> {
    let session = current_session(&state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(session.ledger.goals.progress()))
}

/// POST /api/goals - Add a goal
pub async fn add_goal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(goal): Json<Goal>,
) -> Result<Json<Goal>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let stored = session.ledger.goals.add(goal).map_err(AppError::from_core)?;
    Ok(Json(stored.clone()))
}

// ========== Debts ==========

/// GET /api/debts - List debts
pub async fn list_debts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Debt>>, AppError> {
    let session = current_session(&state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(session.ledger.debts.list().to_vec()))
}

/// POST /api/debts - Add a debt
pub async fn add_debt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(debt): Json<Debt>,
) -> Result<Json<Debt>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let stored = session.ledger.debts.add(debt).map_err(AppError::from_core)?;
    Ok(Json(stored.clone()))
}

/// GET /api/debts/plan - Payoff timeline (?strategy=snowball|avalanche)
pub async fn get_payoff_plan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PayoffQuery>,
) -> Result<Json<Vec<PayoffRow>>, AppError> {
    let session = current_session(&state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(session.ledger.debts.payoff_plan(query.strategy)))
}

// ========== Investments ==========

/// GET /api/investments - List holdings as entered
pub async fn list_investments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Investment>>, AppError> {
    let session = current_session(&state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(session.ledger.investments.list().to_vec()))
}

/// POST /api/investments - Add a holding
pub async fn add_investment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(investment): Json<Investment>,
) -> Result<Json<Investment>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let stored = session
        .ledger
        .investments
        .add(investment)
        .map_err(AppError::from_core)?;
    Ok(Json(stored.clone()))
}

/// GET /api/investments/summary - Portfolio value and gains
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<PortfolioSummary>, AppError> {
    let session = current_session(&state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(session.ledger.investments.portfolio()))
}

// ========== Net worth ==========

pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Asset>>, AppError> {
    let session = current_session(&state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(session.ledger.assets.list().to_vec()))
}

pub async fn add_asset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(asset): Json<Asset>,
) -> Result<Json<Asset>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let stored = session.ledger.assets.add(asset).map_err(AppError::from_core)?;
    Ok(Json(stored.clone()))
}

pub async fn list_liabilities(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Liability>>, AppError> {
    let session = current_session(&state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(session.ledger.liabilities.list().to_vec()))
}

pub async fn add_liability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(liability): Json<Liability>,
) -> Result<Json<Liability>, AppError> {
    let session = current_session(&state, &headers).await?;
    let mut session = session.lock().await;
    let stored = session
        .ledger
        .liabilities
        .add(liability)
        .map_err(AppError::from_core)?;
    Ok(Json(stored.clone()))
}

/// GET /api/net-worth - Assets minus liabilities
pub async fn get_net_worth(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<NetWorth>, AppError> {
    let session = current_session(&state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(session.ledger.net_worth()))
}
