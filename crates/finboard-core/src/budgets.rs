//! Per-category budgets against actual spending

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{Notice, SpendingByCategory};

/// Default budget is this multiple of what was spent, rounded down
pub const DEFAULT_BUDGET_FACTOR: f64 = 1.2;

pub const WITHIN_BUDGET_MESSAGE: &str = "All categories within budget!";

/// User-chosen budgets by category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetOverrides {
    budgets: HashMap<String, f64>,
}

impl BudgetOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: &str, budget: f64) -> Result<()> {
        if category.trim().is_empty() {
            return Err(Error::Validation("category is required".into()));
        }
        if !budget.is_finite() || budget < 0.0 {
            return Err(Error::Validation(format!(
                "budget for '{}' must be a non-negative number",
                category
            )));
        }
        self.budgets.insert(category.to_string(), budget);
        Ok(())
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.budgets.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }
}

/// Parse `Category=Amount`
pub fn parse_budget_assignment(s: &str) -> std::result::Result<(String, f64), String> {
    let (category, amount) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected CATEGORY=AMOUNT, got '{}'", s))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| format!("invalid amount in '{}'", s))?;
    Ok((category.trim().to_string(), amount))
}

pub fn default_budget(spent: f64) -> f64 {
    (spent * DEFAULT_BUDGET_FACTOR).floor()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRow {
    pub category: String,
    pub spent: f64,
    pub budget: f64,
    pub over: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetReport {
    pub rows: Vec<BudgetRow>,
    pub over_budget: Vec<String>,
    pub notice: Notice,
}

/// Compare spending with budgets, keeping the service's category order
pub fn budget_report(spending: &SpendingByCategory, overrides: &BudgetOverrides) -> BudgetReport {
    let rows: Vec<BudgetRow> = spending
        .iter()
        .map(|c| {
            let budget = overrides
                .get(&c.category)
                .unwrap_or_else(|| default_budget(c.amount));
            BudgetRow {
                category: c.category.clone(),
                spent: c.amount,
                budget,
                over: c.amount > budget,
            }
        })
        .collect();

    let over_budget: Vec<String> = rows
        .iter()
        .filter(|r| r.over)
        .map(|r| r.category.clone())
        .collect();

    let notice = if over_budget.is_empty() {
        Notice::success(WITHIN_BUDGET_MESSAGE)
    } else {
        Notice::warning(format!("Over budget in: {}", over_budget.join(", ")))
    };

    BudgetReport {
        rows,
        over_budget,
        notice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoticeLevel;

    fn spending() -> SpendingByCategory {
        SpendingByCategory::from_pairs([("Rent", 1000.0), ("Food", 512.0), ("Other", 500.0)])
            .unwrap()
    }

    #[test]
    fn test_defaults_within_budget() {
        let report = budget_report(&spending(), &BudgetOverrides::new());
        let budgets: Vec<f64> = report.rows.iter().map(|r| r.budget).collect();
        assert_eq!(budgets, vec![1200.0, 614.0, 600.0]);
        assert!(report.over_budget.is_empty());
        assert_eq!(report.notice, Notice::success("All categories within budget!"));
    }

    #[test]
    fn test_overrides_flag_over_budget() {
        let mut overrides = BudgetOverrides::new();
        overrides.set("Rent", 900.0).unwrap();
        overrides.set("Other", 100.0).unwrap();
        overrides.set("Travel", 50.0).unwrap();

        let report = budget_report(&spending(), &overrides);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.over_budget, vec!["Rent", "Other"]);
        assert_eq!(report.notice.level, NoticeLevel::Warning);
        assert_eq!(report.notice.message, "Over budget in: Rent, Other");
    }

    #[test]
    fn test_spent_equal_to_budget_is_not_over() {
        let mut overrides = BudgetOverrides::new();
        overrides.set("Rent", 1000.0).unwrap();
        let report = budget_report(&spending(), &overrides);
        assert!(!report.rows[0].over);
    }

    #[test]
    fn test_invalid_override() {
        let mut overrides = BudgetOverrides::new();
        assert!(overrides.set("Rent", -1.0).is_err());
        assert!(overrides.set(" ", 10.0).is_err());
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_budget_assignment("Eating Out=250.5"),
            Ok(("Eating Out".to_string(), 250.5))
        );
        assert!(parse_budget_assignment("Rent").is_err());
        assert!(parse_budget_assignment("Rent=lots").is_err());
    }
}
