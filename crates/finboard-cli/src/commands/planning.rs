//! Health check, forecast and budget commands

use anyhow::{bail, Result};
use chrono::Local;
use finboard_core::models::format_percent;
use finboard_core::session::LOAD_DATA_FIRST;
use finboard_core::{
    budget_report, format_eur, forecast, health_check, BudgetOverrides, BudgetReport,
    DashboardConfig, Forecast, ForecastSettings, HealthReport, SummaryPayload,
};

use super::{format_notice, load_data, print_json, print_notices, truncate};

/// Summary payload or a user-facing error after showing what went wrong
async fn require_summary(config: &DashboardConfig) -> Result<SummaryPayload> {
    let data = load_data(config).await;
    print_notices(&data.notices);
    match data.summary {
        Some(summary) => Ok(summary),
        None => bail!(LOAD_DATA_FIRST),
    }
}

// ========== Health ==========

pub async fn cmd_health(
    config: &DashboardConfig,
    emergency_fund: Option<f64>,
    debt_payments: Option<f64>,
    json: bool,
) -> Result<()> {
    let summary = require_summary(config).await?;
    let report = health_check(&summary, debt_payments, emergency_fund)?;

    if json {
        return print_json(&report);
    }
    print!("{}", render_health(&report));
    Ok(())
}

pub fn render_health(report: &HealthReport) -> String {
    let mut out = String::from("\n🩺 Financial Health\n");
    out.push_str("   ─────────────────────────────────────────────────────────────\n");
    out.push_str(&format!(
        "   Score: {}/100  {}\n",
        report.score_display, report.headline
    ));
    out.push('\n');

    let mut ratio = |name: &str, display: &str, label: &str| {
        out.push_str(&format!("   {:<20} {:>8}  ({})\n", name, display, label));
    };
    ratio(
        "Savings rate",
        &report.savings_rate.display,
        report.savings_rate.label,
    );
    ratio(
        "Expense ratio",
        &report.expense_ratio.display,
        report.expense_ratio.label,
    );
    if let Some(dti) = &report.debt_to_income {
        ratio("Debt-to-income", &dti.display, dti.label);
    }

    let coverage = &report.emergency_fund;
    match coverage.months {
        Some(months) => out.push_str(&format!(
            "   {:<20} {:>8}  ({:.1} of {} recommended months)\n",
            "Emergency fund",
            format_eur(coverage.fund),
            months,
            coverage.recommended_months
        )),
        None => out.push_str(&format!(
            "   {:<20} {:>8}\n",
            "Emergency fund",
            format_eur(coverage.fund)
        )),
    }

    out.push_str("\n   Recommendations:\n");
    for rec in &report.recommendations {
        out.push_str(&format!("   • {}\n", rec));
    }
    out.push('\n');
    out
}

// ========== Forecast ==========

pub async fn cmd_forecast(
    config: &DashboardConfig,
    settings: &ForecastSettings,
    json: bool,
) -> Result<()> {
    settings.validate()?;
    let summary = require_summary(config).await?;
    let projection = forecast(&summary, settings, Local::now().date_naive())?;

    if json {
        return print_json(&projection);
    }
    print!("{}", render_forecast(&projection));
    Ok(())
}

pub fn render_forecast(projection: &Forecast) -> String {
    let settings = &projection.settings;
    let mut out = format!(
        "\n📈 Cash-Flow Forecast ({} months, income {}/mo, expenses {}/mo)\n",
        settings.months,
        format_percent(settings.income_growth),
        format_percent(settings.expense_growth)
    );
    out.push_str(&format!(
        "   {:<10} {:>14} {:>14} {:>14}\n",
        "Month", "Income", "Expenses", "Savings"
    ));
    out.push_str("   ─────────────────────────────────────────────────────────────\n");
    for row in &projection.rows {
        out.push_str(&format!(
            "   {:<10} {:>14} {:>14} {:>14}\n",
            row.month,
            format_eur(row.income),
            format_eur(row.expenses),
            format_eur(row.savings)
        ));
    }
    out.push_str("   ─────────────────────────────────────────────────────────────\n");
    out.push_str(&format!(
        "   Total projected savings: {}\n",
        format_eur(projection.total_savings)
    ));
    out.push_str(&format!(
        "   Average monthly savings: {}\n\n",
        format_eur(projection.average_savings)
    ));
    out
}

// ========== Budgets ==========

pub async fn cmd_budgets(config: &DashboardConfig, set: &[(String, f64)], json: bool) -> Result<()> {
    let mut overrides = BudgetOverrides::new();
    for (category, amount) in set {
        overrides.set(category, *amount)?;
    }

    let data = load_data(config).await;
    print_notices(&data.notices);
    let Some(spending) = data.spending else {
        bail!("Spending data is unavailable");
    };
    let report = budget_report(&spending, &overrides);

    if json {
        return print_json(&report);
    }
    print!("{}", render_budgets(&report));
    Ok(())
}

pub fn render_budgets(report: &BudgetReport) -> String {
    let mut out = String::from("\n🎯 Budgets\n");
    out.push_str(&format!(
        "   {:<20} {:>14} {:>14}\n",
        "Category", "Spent", "Budget"
    ));
    out.push_str("   ─────────────────────────────────────────────────────────────\n");
    for row in &report.rows {
        out.push_str(&format!(
            "   {:<20} {:>14} {:>14}{}\n",
            truncate(&row.category, 20),
            format_eur(row.spent),
            format_eur(row.budget),
            if row.over { "  ⚠️" } else { "" }
        ));
    }
    out.push('\n');
    out.push_str(&format_notice(&report.notice));
    out.push_str("\n\n");
    out
}
