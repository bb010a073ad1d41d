//! Financial health check
//!
//! Score = min(100, 2 * savings rate + (100 - expense ratio)), minus
//! min(30, debt-to-income) when there is any debt, clamped to [0, 100].
//! Debt payments are passed in explicitly; the score never reads the ledger.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{format_percent, SummaryPayload};

/// Months of expenses assumed when no emergency fund is given
pub const DEFAULT_EMERGENCY_MONTHS: f64 = 3.0;

/// Coverage the dashboard recommends
pub const RECOMMENDED_EMERGENCY_MONTHS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    NeedsAttention,
    Moderate,
    Excellent,
}

impl HealthTier {
    pub fn from_score(score: f64) -> Self {
        if score < 60.0 {
            Self::NeedsAttention
        } else if score < 80.0 {
            Self::Moderate
        } else {
            Self::Excellent
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::NeedsAttention => "Financial Health Needs Attention",
            Self::Moderate => "Moderate Financial Health",
            Self::Excellent => "Excellent Financial Health!",
        }
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            Self::NeedsAttention => &[
                "Reduce discretionary spending",
                "Increase income streams if possible",
                "Focus on paying down high-interest debt",
            ],
            Self::Moderate => &[
                "Continue current savings habits",
                "Optimize expense categories",
                "Consider additional investments",
            ],
            Self::Excellent => &[
                "Maintain current financial practices",
                "Explore wealth-building opportunities",
                "Consider professional financial advice",
            ],
        }
    }
}

/// A ratio with its display form and verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ratio {
    pub value: f64,
    pub display: String,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyCoverage {
    pub fund: f64,
    /// `None` when there are no expenses to cover
    pub months: Option<f64>,
    pub recommended_months: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub savings_rate: Ratio,
    pub expense_ratio: Ratio,
    pub debt_to_income: Option<Ratio>,
    pub emergency_fund: EmergencyCoverage,
    /// Clamped to [0, 100]
    pub score: f64,
    /// `score` truncated, as shown on the progress bar
    pub score_display: u8,
    pub tier: HealthTier,
    pub headline: &'static str,
    pub recommendations: Vec<&'static str>,
}

/// Compute the health report
///
/// `monthly_debt_payments` is `None` when the user has no debt. Income must
/// be positive; the ratios are undefined otherwise.
pub fn health_check(
    summary: &SummaryPayload,
    monthly_debt_payments: Option<f64>,
    emergency_fund: Option<f64>,
) -> Result<HealthReport> {
    let income = summary.total_income;
    if !income.is_finite() || income <= 0.0 {
        return Err(Error::InvalidData(
            "total income must be positive to compute financial health".into(),
        ));
    }

    let savings_rate = summary.savings / income * 100.0;
    let expense_ratio = summary.total_expenses / income * 100.0;
    let dti = monthly_debt_payments.map(|payments| payments / income * 100.0);

    let mut score = (savings_rate * 2.0 + (100.0 - expense_ratio)).min(100.0);
    if let Some(dti) = dti {
        score -= dti.min(30.0);
    }
    let score = score.clamp(0.0, 100.0);
    let tier = HealthTier::from_score(score);

    let monthly_expenses = summary.total_expenses;
    let fund = emergency_fund.unwrap_or(DEFAULT_EMERGENCY_MONTHS * monthly_expenses);
    let coverage_months = if monthly_expenses > 0.0 {
        Some(fund / monthly_expenses)
    } else {
        None
    };

    Ok(HealthReport {
        savings_rate: Ratio {
            value: savings_rate,
            display: format_percent(savings_rate),
            label: if savings_rate > 20.0 {
                "Good"
            } else {
                "Needs Improvement"
            },
        },
        expense_ratio: Ratio {
            value: expense_ratio,
            display: format_percent(expense_ratio),
            label: if expense_ratio < 80.0 { "Healthy" } else { "High" },
        },
        debt_to_income: dti.map(|dti| Ratio {
            value: dti,
            display: format_percent(dti),
            label: if dti < 35.0 { "Good" } else { "High" },
        }),
        emergency_fund: EmergencyCoverage {
            fund,
            months: coverage_months,
            recommended_months: RECOMMENDED_EMERGENCY_MONTHS,
        },
        score,
        score_display: score as u8,
        tier,
        headline: tier.headline(),
        recommendations: tier.recommendations().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(income: f64, expenses: f64, savings: f64) -> SummaryPayload {
        SummaryPayload {
            total_income: income,
            total_expenses: expenses,
            savings,
        }
    }

    #[test]
    fn test_typical_score() {
        // sr = 33.3, er = 66.7 -> min(100, 66.7 + 33.3) = 100
        let report = health_check(&summary(3000.0, 2000.0, 1000.0), None, None).unwrap();
        assert!((report.score - 100.0).abs() < 1e-9);
        assert_eq!(report.tier, HealthTier::Excellent);
        assert_eq!(report.savings_rate.display, "33.3%");
        assert_eq!(report.savings_rate.label, "Good");
        assert_eq!(report.expense_ratio.label, "Healthy");
        assert!(report.debt_to_income.is_none());
        assert_eq!(report.emergency_fund.fund, 6000.0);
        assert_eq!(report.emergency_fund.months, Some(3.0));
    }

    #[test]
    fn test_debt_penalty() {
        // sr = 10, er = 90 -> 30; dti = 20 -> 10
        let report = health_check(&summary(1000.0, 900.0, 100.0), Some(200.0), None).unwrap();
        assert!((report.score - 10.0).abs() < 1e-9);
        assert_eq!(report.score_display, 10);
        assert_eq!(report.tier, HealthTier::NeedsAttention);
        let dti = report.debt_to_income.unwrap();
        assert_eq!(dti.display, "20.0%");
        assert_eq!(dti.label, "Good");
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn test_debt_penalty_capped_at_30() {
        // sr = 20, er = 80 -> 60; dti = 80 capped to 30
        let report = health_check(&summary(1000.0, 800.0, 200.0), Some(800.0), None).unwrap();
        assert!((report.score - 30.0).abs() < 1e-9);
        assert_eq!(report.debt_to_income.unwrap().label, "High");
    }

    #[test]
    fn test_score_clamped() {
        let high = health_check(&summary(100.0, 0.0, 500.0), None, None).unwrap();
        assert_eq!(high.score, 100.0);

        let low = health_check(&summary(100.0, 1000.0, -900.0), Some(100.0), None).unwrap();
        assert_eq!(low.score, 0.0);
        assert_eq!(low.score_display, 0);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(HealthTier::from_score(59.99), HealthTier::NeedsAttention);
        assert_eq!(HealthTier::from_score(60.0), HealthTier::Moderate);
        assert_eq!(HealthTier::from_score(79.99), HealthTier::Moderate);
        assert_eq!(HealthTier::from_score(80.0), HealthTier::Excellent);
    }

    #[test]
    fn test_explicit_emergency_fund() {
        let report = health_check(&summary(3000.0, 2000.0, 1000.0), None, Some(12000.0)).unwrap();
        assert_eq!(report.emergency_fund.months, Some(6.0));
    }

    #[test]
    fn test_zero_income_rejected() {
        assert!(health_check(&summary(0.0, 100.0, -100.0), None, None).is_err());
    }

    #[test]
    fn test_zero_expenses_coverage_absent() {
        let report = health_check(&summary(1000.0, 0.0, 1000.0), None, None).unwrap();
        assert_eq!(report.emergency_fund.months, None);
    }
}
