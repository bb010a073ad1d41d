//! Per-user dashboard session
//!
//! Owns everything that used to live in ambient UI state: the response cache,
//! the ledger and the budget overrides. Handlers receive the session
//! explicitly and nothing here is shared between sessions.

use chrono::NaiveDate;

use crate::budgets::{budget_report, BudgetOverrides, BudgetReport};
use crate::cache::{Clock, ResponseCache, SystemClock};
use crate::dashboard::{load_dashboard, DashboardData, OverviewView};
use crate::error::{Error, Result};
use crate::fetch::{Endpoints, Fetcher};
use crate::forecast::{forecast, Forecast, ForecastSettings};
use crate::health::{health_check, HealthReport};
use crate::ledger::Ledger;

/// Shown by tabs that need the total summary when it is unavailable
pub const LOAD_DATA_FIRST: &str = "Please load financial data in the Overview tab first";

pub struct DashboardSession<C: Clock = SystemClock> {
    pub cache: ResponseCache<C>,
    pub ledger: Ledger,
    pub budgets: BudgetOverrides,
}

impl DashboardSession<SystemClock> {
    pub fn new() -> Self {
        Self::with_cache(ResponseCache::new())
    }
}

impl Default for DashboardSession<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> DashboardSession<C> {
    pub fn with_cache(cache: ResponseCache<C>) -> Self {
        Self {
            cache,
            ledger: Ledger::new(),
            budgets: BudgetOverrides::new(),
        }
    }

    /// Current payloads, served from cache while fresh
    pub async fn load(&mut self, fetcher: &dyn Fetcher, endpoints: &Endpoints) -> DashboardData {
        load_dashboard(&mut self.cache, fetcher, endpoints).await
    }

    pub async fn overview(&mut self, fetcher: &dyn Fetcher, endpoints: &Endpoints) -> OverviewView {
        OverviewView::from_data(&self.load(fetcher, endpoints).await)
    }

    /// Drop cached payloads and render the overview from fresh fetches
    pub async fn refresh(&mut self, fetcher: &dyn Fetcher, endpoints: &Endpoints) -> OverviewView {
        self.cache.clear();
        self.overview(fetcher, endpoints).await
    }

    /// Budget table, `None` when spending is unavailable
    pub fn budget_report(&self, data: &DashboardData) -> Option<BudgetReport> {
        data.spending
            .as_ref()
            .map(|spending| budget_report(spending, &self.budgets))
    }

    /// Health check using this session's debts
    pub fn health(&self, data: &DashboardData, emergency_fund: Option<f64>) -> Result<HealthReport> {
        let summary = data
            .summary
            .as_ref()
            .ok_or_else(|| Error::NotFound(LOAD_DATA_FIRST.into()))?;
        health_check(summary, self.ledger.debts.monthly_payments(), emergency_fund)
    }

    pub fn forecast(
        &self,
        data: &DashboardData,
        settings: &ForecastSettings,
        start: NaiveDate,
    ) -> Result<Forecast> {
        let summary = data
            .summary
            .as_ref()
            .ok_or_else(|| Error::NotFound(LOAD_DATA_FIRST.into()))?;
        forecast(summary, settings, start)
    }
}
