//! Cash-flow projection with compound monthly growth

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::SummaryPayload;

pub const MIN_FORECAST_MONTHS: u32 = 1;
pub const MAX_FORECAST_MONTHS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSettings {
    #[serde(default = "default_months")]
    pub months: u32,
    /// Percent per month
    #[serde(default = "default_income_growth")]
    pub income_growth: f64,
    /// Percent per month
    #[serde(default = "default_expense_growth")]
    pub expense_growth: f64,
}

fn default_months() -> u32 {
    6
}

fn default_income_growth() -> f64 {
    0.5
}

fn default_expense_growth() -> f64 {
    0.3
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            months: default_months(),
            income_growth: default_income_growth(),
            expense_growth: default_expense_growth(),
        }
    }
}

impl ForecastSettings {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FORECAST_MONTHS..=MAX_FORECAST_MONTHS).contains(&self.months) {
            return Err(Error::Validation(format!(
                "projection period must be between {} and {} months",
                MIN_FORECAST_MONTHS, MAX_FORECAST_MONTHS
            )));
        }
        if !self.income_growth.is_finite() || !self.expense_growth.is_finite() {
            return Err(Error::Validation("growth rates must be numbers".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    /// e.g. `Mar 2025`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub settings: ForecastSettings,
    pub rows: Vec<ForecastRow>,
    pub total_savings: f64,
    pub average_savings: f64,
}

/// Project `settings.months` months starting with the month containing `start`
///
/// Month `i` (from 0) scales income by `(1 + g/100)^i`, likewise expenses.
pub fn forecast(
    summary: &SummaryPayload,
    settings: &ForecastSettings,
    start: NaiveDate,
) -> Result<Forecast> {
    settings.validate()?;

    let first = start.with_day(1).unwrap_or(start);
    let income_factor = 1.0 + settings.income_growth / 100.0;
    let expense_factor = 1.0 + settings.expense_growth / 100.0;

    let mut rows = Vec::with_capacity(settings.months as usize);
    for i in 0..settings.months {
        let month = first
            .checked_add_months(Months::new(i))
            .ok_or_else(|| Error::InvalidData("forecast date out of range".into()))?;
        let income = summary.total_income * income_factor.powi(i as i32);
        let expenses = summary.total_expenses * expense_factor.powi(i as i32);
        rows.push(ForecastRow {
            month: month.format("%b %Y").to_string(),
            income,
            expenses,
            savings: income - expenses,
        });
    }

    let total_savings: f64 = rows.iter().map(|r| r.savings).sum();
    let average_savings = total_savings / rows.len() as f64;

    Ok(Forecast {
        settings: *settings,
        rows,
        total_savings,
        average_savings,
    })
}
