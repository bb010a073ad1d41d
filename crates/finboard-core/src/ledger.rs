//! Session ledger: goals, debts, investments, assets and liabilities
//!
//! Each collection is append-only and keeps insertion order. Names are not
//! unique; two records with the same name are independent. Every aggregate
//! is recomputed from the full collection on each call.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Checked before a record is appended
pub trait LedgerRecord {
    fn validate(&self) -> Result<()>;
}

fn require_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(format!("{} must be greater than zero", field)));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    pub target: f64,
    #[serde(default)]
    pub saved: f64,
    #[serde(default, alias = "date")]
    pub target_date: Option<NaiveDate>,
}

impl LedgerRecord for Goal {
    fn validate(&self) -> Result<()> {
        require_name("Goal name", &self.name)?;
        require_positive("Target amount", self.target)?;
        require_non_negative("Currently saved", self.saved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub name: String,
    pub balance: f64,
    /// Annual interest rate in percent
    pub rate: f64,
    /// Monthly payment
    pub payment: f64,
}

impl LedgerRecord for Debt {
    fn validate(&self) -> Result<()> {
        require_name("Debt name", &self.name)?;
        require_non_negative("Current balance", self.balance)?;
        require_non_negative("Interest rate", self.rate)?;
        require_positive("Monthly payment", self.payment)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub ticker: String,
    pub shares: f64,
    /// Cost basis per share
    pub cost: f64,
    /// Current price per share
    pub current: f64,
}

impl LedgerRecord for Investment {
    fn validate(&self) -> Result<()> {
        require_name("Ticker", &self.ticker)?;
        require_non_negative("Shares", self.shares)?;
        require_non_negative("Cost basis", self.cost)?;
        require_non_negative("Current price", self.current)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub description: String,
    pub value: f64,
}

impl LedgerRecord for Asset {
    fn validate(&self) -> Result<()> {
        require_name("Asset description", &self.description)?;
        require_non_negative("Value", self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    pub description: String,
    pub value: f64,
}

impl LedgerRecord for Liability {
    fn validate(&self) -> Result<()> {
        require_name("Liability description", &self.description)?;
        require_non_negative("Amount owed", self.value)
    }
}

/// Append-only list of validated records
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: LedgerRecord> Collection<T> {
    /// Validate and append; returns the stored record
    pub fn add(&mut self, record: T) -> Result<&T> {
        record.validate()?;
        self.items.push(record);
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// Records in insertion order
    pub fn list(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Collection<Asset> {
    pub fn total(&self) -> f64 {
        self.items.iter().map(|a| a.value).sum()
    }
}

impl Collection<Liability> {
    pub fn total(&self) -> f64 {
        self.items.iter().map(|l| l.value).sum()
    }
}

/// Progress toward one goal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub name: String,
    pub target: f64,
    pub saved: f64,
    pub remaining: f64,
    /// Percent, capped at 100
    pub progress: f64,
    pub target_date: Option<NaiveDate>,
}

impl Collection<Goal> {
    pub fn progress(&self) -> Vec<GoalProgress> {
        self.items
            .iter()
            .map(|g| GoalProgress {
                name: g.name.clone(),
                target: g.target,
                saved: g.saved,
                remaining: (g.target - g.saved).max(0.0),
                progress: (g.saved / g.target * 100.0).min(100.0),
                target_date: g.target_date,
            })
            .collect()
    }
}

/// Debt repayment ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoffStrategy {
    /// Smallest balance first
    #[default]
    Snowball,
    /// Highest interest rate first
    Avalanche,
}

impl PayoffStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snowball => "snowball",
            Self::Avalanche => "avalanche",
        }
    }
}

impl std::str::FromStr for PayoffStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "snowball" => Ok(Self::Snowball),
            "avalanche" => Ok(Self::Avalanche),
            _ => Err(format!("Unknown payoff strategy: {}", s)),
        }
    }
}

/// One row of the payoff timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoffRow {
    pub debt: String,
    pub balance: f64,
    pub rate: f64,
    /// Whole months at the current payment
    pub months: u64,
    /// Simple interest over `months`
    pub interest: f64,
    pub payment: f64,
}

impl Collection<Debt> {
    /// Sum of monthly payments, `None` when there is no debt
    pub fn monthly_payments(&self) -> Option<f64> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.iter().map(|d| d.payment).sum())
        }
    }

    pub fn total_balance(&self) -> f64 {
        self.items.iter().map(|d| d.balance).sum()
    }

    pub fn payoff_plan(&self, strategy: PayoffStrategy) -> Vec<PayoffRow> {
        let mut rows: Vec<PayoffRow> = self
            .items
            .iter()
            .map(|d| {
                let months = (d.balance / d.payment).floor() as u64;
                PayoffRow {
                    debt: d.name.clone(),
                    balance: d.balance,
                    rate: d.rate,
                    months,
                    interest: d.balance * (d.rate / 100.0) * (months as f64 / 12.0),
                    payment: d.payment,
                }
            })
            .collect();

        // stable sorts: equal keys stay in insertion order
        match strategy {
            PayoffStrategy::Snowball => rows.sort_by(|a, b| a.balance.total_cmp(&b.balance)),
            PayoffStrategy::Avalanche => rows.sort_by(|a, b| b.rate.total_cmp(&a.rate)),
        }
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    pub value: f64,
    pub cost: f64,
    pub gain: f64,
    /// Absent when nothing was invested
    pub gain_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<Holding>,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain: f64,
    pub total_gain_percent: Option<f64>,
}

fn gain_percent(gain: f64, cost: f64) -> Option<f64> {
    if cost == 0.0 {
        None
    } else {
        Some(gain / cost * 100.0)
    }
}

impl Collection<Investment> {
    pub fn portfolio(&self) -> PortfolioSummary {
        let holdings: Vec<Holding> = self
            .items
            .iter()
            .map(|i| {
                let value = i.shares * i.current;
                let cost = i.shares * i.cost;
                Holding {
                    ticker: i.ticker.clone(),
                    shares: i.shares,
                    value,
                    cost,
                    gain: value - cost,
                    gain_percent: gain_percent(value - cost, cost),
                }
            })
            .collect();

        let total_value = holdings.iter().map(|h| h.value).sum();
        let total_cost = holdings.iter().map(|h| h.cost).sum();
        let total_gain = holdings.iter().map(|h| h.gain).sum();
        PortfolioSummary {
            total_gain_percent: gain_percent(total_gain, total_cost),
            holdings,
            total_value,
            total_cost,
            total_gain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetWorth {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
}

/// All session-scoped user records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ledger {
    pub goals: Collection<Goal>,
    pub debts: Collection<Debt>,
    pub investments: Collection<Investment>,
    pub assets: Collection<Asset>,
    pub liabilities: Collection<Liability>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn net_worth(&self) -> NetWorth {
        let total_assets = self.assets.total();
        let total_liabilities = self.liabilities.total();
        NetWorth {
            total_assets,
            total_liabilities,
            net_worth: total_assets - total_liabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(description: &str, value: f64) -> Asset {
        Asset {
            description: description.into(),
            value,
        }
    }

    fn debt(name: &str, balance: f64, rate: f64, payment: f64) -> Debt {
        Debt {
            name: name.into(),
            balance,
            rate,
            payment,
        }
    }

    #[test]
    fn test_net_worth() {
        let mut ledger = Ledger::new();
        ledger.assets.add(asset("Savings", 500.0)).unwrap();
        ledger.assets.add(asset("Car", 300.0)).unwrap();
        ledger
            .liabilities
            .add(Liability {
                description: "Card".into(),
                value: 200.0,
            })
            .unwrap();

        let nw = ledger.net_worth();
        assert_eq!(nw.total_assets, 800.0);
        assert_eq!(nw.total_liabilities, 200.0);
        assert_eq!(nw.net_worth, 600.0);
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = Ledger::new();
        assert_eq!(ledger.net_worth().net_worth, 0.0);
        assert!(ledger.debts.monthly_payments().is_none());
        assert!(ledger.debts.payoff_plan(PayoffStrategy::Snowball).is_empty());
        assert_eq!(ledger.investments.portfolio(), PortfolioSummary::default());
    }

    #[test]
    fn test_duplicates_are_independent() {
        let mut ledger = Ledger::new();
        ledger.assets.add(asset("Cash", 10.0)).unwrap();
        ledger.assets.add(asset("Cash", 10.0)).unwrap();
        assert_eq!(ledger.assets.len(), 2);
        assert_eq!(ledger.assets.total(), 20.0);
    }

    #[test]
    fn test_validation() {
        let mut ledger = Ledger::new();
        assert!(ledger.assets.add(asset("  ", 1.0)).is_err());
        assert!(ledger.assets.add(asset("House", -1.0)).is_err());
        assert!(ledger.assets.add(asset("House", f64::NAN)).is_err());
        assert!(ledger.debts.add(debt("Loan", 100.0, 5.0, 0.0)).is_err());
        assert!(ledger
            .goals
            .add(Goal {
                name: "Trip".into(),
                target: 0.0,
                saved: 0.0,
                target_date: None,
            })
            .is_err());
        assert!(ledger.assets.is_empty());
        assert!(ledger.debts.is_empty());
        assert!(ledger.goals.is_empty());
    }

    #[test]
    fn test_goal_progress_is_capped() {
        let mut ledger = Ledger::new();
        ledger
            .goals
            .add(Goal {
                name: "Laptop".into(),
                target: 1000.0,
                saved: 1500.0,
                target_date: NaiveDate::from_ymd_opt(2025, 12, 1),
            })
            .unwrap();
        ledger
            .goals
            .add(Goal {
                name: "Trip".into(),
                target: 2000.0,
                saved: 500.0,
                target_date: None,
            })
            .unwrap();

        let progress = ledger.goals.progress();
        assert_eq!(progress[0].remaining, 0.0);
        assert_eq!(progress[0].progress, 100.0);
        assert_eq!(progress[1].remaining, 1500.0);
        assert_eq!(progress[1].progress, 25.0);
    }

    #[test]
    fn test_payoff_plan() {
        let mut ledger = Ledger::new();
        ledger.debts.add(debt("Car", 5000.0, 4.0, 250.0)).unwrap();
        ledger.debts.add(debt("Card", 1200.0, 19.9, 100.0)).unwrap();
        ledger.debts.add(debt("Student", 9000.0, 19.9, 350.0)).unwrap();

        let snowball = ledger.debts.payoff_plan(PayoffStrategy::Snowball);
        let names: Vec<&str> = snowball.iter().map(|r| r.debt.as_str()).collect();
        assert_eq!(names, vec!["Card", "Car", "Student"]);

        let card = &snowball[0];
        assert_eq!(card.months, 12);
        assert!((card.interest - 238.8).abs() < 1e-9);

        // Student: 9000 / 350 = 25.7 -> 25 months
        assert_eq!(snowball[2].months, 25);

        let avalanche = ledger.debts.payoff_plan(PayoffStrategy::Avalanche);
        let names: Vec<&str> = avalanche.iter().map(|r| r.debt.as_str()).collect();
        assert_eq!(names, vec!["Card", "Student", "Car"]);

        assert_eq!(ledger.debts.monthly_payments(), Some(700.0));
        assert_eq!(ledger.debts.total_balance(), 15200.0);
    }

    #[test]
    fn test_payoff_plan_large_balance() {
        let mut ledger = Ledger::new();
        ledger.debts.add(debt("Mortgage", 1e12, 10.0, 1.0)).unwrap();

        let plan = ledger.debts.payoff_plan(PayoffStrategy::Snowball);
        assert_eq!(plan[0].months, 1_000_000_000_000);
        let expected = 1e12 * 0.1 * (1e12 / 12.0);
        assert!((plan[0].interest - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_portfolio() {
        let mut ledger = Ledger::new();
        ledger
            .investments
            .add(Investment {
                ticker: "VWCE".into(),
                shares: 10.0,
                cost: 100.0,
                current: 120.0,
            })
            .unwrap();
        ledger
            .investments
            .add(Investment {
                ticker: "GIFT".into(),
                shares: 5.0,
                cost: 0.0,
                current: 10.0,
            })
            .unwrap();

        let summary = ledger.investments.portfolio();
        assert_eq!(summary.holdings[0].gain, 200.0);
        assert_eq!(summary.holdings[0].gain_percent, Some(20.0));
        assert_eq!(summary.holdings[1].gain_percent, None);
        assert_eq!(summary.total_value, 1250.0);
        assert_eq!(summary.total_cost, 1000.0);
        assert_eq!(summary.total_gain, 250.0);
        assert_eq!(summary.total_gain_percent, Some(25.0));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Avalanche".parse::<PayoffStrategy>(), Ok(PayoffStrategy::Avalanche));
        assert!("random".parse::<PayoffStrategy>().is_err());
    }

    #[test]
    fn test_goal_deserialize_date_alias() {
        let goal: Goal =
            serde_json::from_str(r#"{"name": "Car", "target": 100, "date": "2026-01-31"}"#)
                .unwrap();
        assert_eq!(goal.saved, 0.0);
        assert_eq!(goal.target_date, NaiveDate::from_ymd_opt(2026, 1, 31));
    }
}
