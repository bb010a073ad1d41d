//! Insights command

use std::path::Path;

use anyhow::{Context, Result};
use finboard_core::{
    Artifact, DashboardConfig, InsightRenderer, InsightReport, InsightRequest, Language, Notice,
    Notices, PromptId,
};

use super::{load_data, print_notices};

pub async fn cmd_insights(
    config: &DashboardConfig,
    language: Language,
    full: bool,
    pdf: Option<&Path>,
    audio: Option<&Path>,
) -> Result<()> {
    let renderer = InsightRenderer::from_config(config);
    let status = renderer.status();
    if !status.enabled {
        print_notices(&status.notices);
        return Ok(());
    }

    let data = load_data(config).await;
    print_notices(&data.notices);

    let request = InsightRequest {
        language,
        prompt: if full {
            PromptId::SavingsAdvice
        } else {
            PromptId::SavingsTips
        },
        pdf: pdf.is_some(),
        audio: audio.is_some(),
    };

    println!();
    println!("🤖 Generating {} savings advice...", language);
    let report = renderer
        .render(data.summary.as_ref(), data.spending.as_ref(), &request)
        .await;

    println!("{}", render_report(&report));
    let save_notices = save_artifacts(&report, pdf, audio);
    print_notices(&save_notices);
    print_notices(&report.notices);
    println!();
    Ok(())
}

pub fn render_report(report: &InsightReport) -> String {
    match &report.text {
        Some(text) => {
            let mut out = String::from("\n   💡 AI Savings Insights\n");
            out.push_str("   ─────────────────────────────────────────────────────────────\n");
            for line in text.lines() {
                out.push_str(&format!("   {}\n", line));
            }
            out
        }
        None => String::new(),
    }
}

/// Move generated artifacts to the requested destinations
///
/// Each artifact is saved on its own; a failure becomes an error notice and
/// does not stop the other. Temporary files are removed either way.
pub fn save_artifacts(report: &InsightReport, pdf: Option<&Path>, audio: Option<&Path>) -> Notices {
    let mut notices = Notices::new();
    if let Some(artifact) = &report.pdf {
        if let Some(dest) = pdf {
            match save_artifact(artifact, dest) {
                Ok(()) => println!("   📄 PDF saved to {}", dest.display()),
                Err(e) => notices.push(Notice::error(format!("Failed to save PDF: {:#}", e))),
            }
        }
        remove_temp(artifact);
    }
    if let Some(artifact) = &report.audio {
        if let Some(dest) = audio {
            match save_artifact(artifact, dest) {
                Ok(()) => println!("   🔊 Audio saved to {}", dest.display()),
                Err(e) => notices.push(Notice::error(format!("Failed to save audio: {:#}", e))),
            }
        }
        remove_temp(artifact);
    }
    notices
}

fn save_artifact(artifact: &Artifact, dest: &Path) -> Result<()> {
    artifact
        .save_to(dest)
        .with_context(|| format!("Failed to save {} to {}", artifact.file_name, dest.display()))
}

fn remove_temp(artifact: &Artifact) {
    if let Err(e) = std::fs::remove_file(&artifact.path) {
        tracing::debug!(path = %artifact.path.display(), error = %e, "Could not remove temporary artifact");
    }
}
