//! Overview command

use anyhow::Result;
use finboard_core::{OverviewView, SpendingChart};

use super::{load_data, print_json, print_notices, truncate};

const BAR_WIDTH: usize = 30;
const LABEL_WIDTH: usize = 16;

pub async fn cmd_overview(config: &finboard_core::DashboardConfig, json: bool) -> Result<()> {
    let data = load_data(config).await;
    let view = OverviewView::from_data(&data);

    if json {
        return print_json(&view);
    }
    print!("{}", render_overview(&view));
    print_notices(&view.notices);
    println!();
    Ok(())
}

/// Metrics block followed by the spending chart; missing sections are omitted
pub fn render_overview(view: &OverviewView) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str("╭─────────────────────────────────────────╮\n");
    out.push_str("│           💰 Financial Overview          │\n");
    out.push_str("╰─────────────────────────────────────────╯\n");

    if let Some(metrics) = &view.metrics {
        out.push('\n');
        for metric in [&metrics.income, &metrics.expenses, &metrics.savings] {
            out.push_str(&format!("  {:<16} {:>14}\n", metric.label, metric.display));
        }
        if let Some(rate) = &metrics.savings_rate {
            out.push_str(&format!("  {:<16} {:>14}\n", "Savings Rate", rate));
        }
    }

    if let Some(chart) = &view.chart {
        out.push('\n');
        out.push_str(&render_chart(chart));
    }
    out.push('\n');
    out
}

/// Horizontal bars scaled to the largest category
pub fn render_chart(chart: &SpendingChart) -> String {
    let mut out = format!("  {}\n", chart.title);
    out.push_str("  ─────────────────────────────────────────────────────────────\n");

    let max = chart.bars.iter().map(|b| b.amount).fold(0.0_f64, f64::max);
    for bar in &chart.bars {
        let len = if max > 0.0 {
            ((bar.amount / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "  {:<16} {:<30} {:>12}\n",
            truncate(&bar.category, LABEL_WIDTH),
            "█".repeat(len),
            bar.display
        ));
    }
    out
}
