//! Dashboard loading and the overview/spending views
//!
//! A missing payload renders nothing for its section. It is never shown as
//! zeros.

use serde::Serialize;
use tracing::warn;

use crate::cache::{Clock, ResponseCache};
use crate::fetch::{Endpoints, Fetcher};
use crate::models::{
    format_eur, format_percent, Notice, Notices, SpendingByCategory, SummaryPayload,
};

pub const SPENDING_CHART_TITLE: &str = "Spending by Category";

/// Both analysis payloads for one request, with whatever went wrong
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub summary: Option<SummaryPayload>,
    pub spending: Option<SpendingByCategory>,
    pub notices: Notices,
}

/// Fetch (through the cache) and decode both payloads
pub async fn load_dashboard<C: Clock>(
    cache: &mut ResponseCache<C>,
    fetcher: &dyn Fetcher,
    endpoints: &Endpoints,
) -> DashboardData {
    let mut data = DashboardData::default();

    let spending_url = endpoints.spending_by_category();
    if let Some(value) = cache.cached_fetch(fetcher, &spending_url, &mut data.notices).await {
        match SpendingByCategory::from_value(&value) {
            Ok(spending) => data.spending = Some(spending),
            Err(e) => {
                warn!(url = %spending_url, error = %e, "Unexpected spending payload");
                data.notices.push(Notice::error(format!(
                    "Error displaying spending chart: {}",
                    e
                )));
            }
        }
    }

    let summary_url = endpoints.total_summary();
    if let Some(value) = cache.cached_fetch(fetcher, &summary_url, &mut data.notices).await {
        match SummaryPayload::from_value(&value) {
            Ok(summary) => data.summary = Some(summary),
            Err(e) => {
                warn!(url = %summary_url, error = %e, "Unexpected summary payload");
                data.notices
                    .push(Notice::error(format!("Error displaying metrics: {}", e)));
            }
        }
    }

    data
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: f64,
    pub display: String,
}

impl Metric {
    fn eur(label: &'static str, value: f64) -> Self {
        Self {
            label,
            value,
            display: format_eur(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewMetrics {
    pub income: Metric,
    pub expenses: Metric,
    pub savings: Metric,
    /// Absent when income is zero
    pub savings_rate: Option<String>,
}

impl OverviewMetrics {
    pub fn from_summary(summary: &SummaryPayload) -> Self {
        Self {
            income: Metric::eur("Total Income", summary.total_income),
            expenses: Metric::eur("Total Expenses", summary.total_expenses),
            savings: Metric::eur("Savings", summary.savings),
            savings_rate: summary.savings_rate().map(format_percent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub category: String,
    pub amount: f64,
    pub display: String,
}

/// Bar chart data in service order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingChart {
    pub title: &'static str,
    pub bars: Vec<ChartBar>,
    pub total: f64,
}

impl SpendingChart {
    pub fn from_spending(spending: &SpendingByCategory) -> Self {
        Self {
            title: SPENDING_CHART_TITLE,
            bars: spending
                .iter()
                .map(|c| ChartBar {
                    category: c.category.clone(),
                    amount: c.amount,
                    display: format_eur(c.amount),
                })
                .collect(),
            total: spending.total(),
        }
    }
}

/// Overview tab: headline metrics plus the spending chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewView {
    pub metrics: Option<OverviewMetrics>,
    pub chart: Option<SpendingChart>,
    pub notices: Notices,
}

impl OverviewView {
    pub fn from_data(data: &DashboardData) -> Self {
        Self {
            metrics: data.summary.as_ref().map(OverviewMetrics::from_summary),
            chart: data.spending.as_ref().map(SpendingChart::from_spending),
            notices: data.notices.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_formatting() {
        let metrics = OverviewMetrics::from_summary(&SummaryPayload {
            total_income: 3000.0,
            total_expenses: 2000.0,
            savings: 1000.0,
        });
        assert_eq!(metrics.income.display, "€3,000.00");
        assert_eq!(metrics.expenses.display, "€2,000.00");
        assert_eq!(metrics.savings.display, "€1,000.00");
        assert_eq!(metrics.savings_rate.as_deref(), Some("33.3%"));
    }

    #[test]
    fn test_zero_income_has_no_rate() {
        let metrics = OverviewMetrics::from_summary(&SummaryPayload::default());
        assert!(metrics.savings_rate.is_none());
        assert_eq!(metrics.income.display, "€0.00");
    }

    #[test]
    fn test_missing_payloads_render_nothing() {
        let data = DashboardData {
            summary: None,
            spending: None,
            notices: vec![Notice::error("Error fetching data: timeout")],
        };
        let view = OverviewView::from_data(&data);
        assert!(view.metrics.is_none());
        assert!(view.chart.is_none());
        assert_eq!(view.notices.len(), 1);
    }

    #[test]
    fn test_chart_keeps_order() {
        let spending =
            SpendingByCategory::from_pairs([("Rent", 1000.0), ("Food", 500.0), ("Other", 500.0)])
                .unwrap();
        let chart = SpendingChart::from_spending(&spending);
        let categories: Vec<&str> = chart.bars.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(categories, vec!["Rent", "Food", "Other"]);
        assert_eq!(chart.total, 2000.0);
        assert_eq!(chart.bars[1].display, "€500.00");
    }
}
