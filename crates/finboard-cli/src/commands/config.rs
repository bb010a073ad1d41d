//! Config command

use anyhow::Result;
use finboard_core::DashboardConfig;

pub fn cmd_config(config: &DashboardConfig) -> Result<()> {
    print!("{}", render_config(config));
    Ok(())
}

/// Effective settings with the credential masked
pub fn render_config(config: &DashboardConfig) -> String {
    let mut out = String::from("\n⚙️  finboard Configuration\n");
    out.push_str("   ─────────────────────────────────────────────────────────────\n");
    out.push_str(&format!("   Analysis API:    {}\n", config.api_base));
    out.push_str(&format!(
        "   Fetch timeout:   {}s\n",
        config.fetch_timeout.as_secs()
    ));
    out.push_str(&format!("   Backend:         {}\n", config.backend.as_str()));
    out.push_str(&format!("   Model:           {}\n", config.model));
    out.push_str(&format!("   Inference host:  {}\n", config.inference_host));
    out.push_str(&format!(
        "   API token:       {}\n",
        config.inference_token.as_deref().map(mask).unwrap_or_else(|| "(not set)".into())
    ));
    out.push_str(&format!(
        "   Secrets file:    {}\n",
        config
            .secrets_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".into())
    ));
    if !config.insights_enabled() {
        out.push_str("\n   ⚠️  AI insights disabled: set HUGGINGFACE_API_TOKEN or add huggingface_api_token to the secrets file\n");
    }
    out.push('\n');
    out
}

fn mask(token: &str) -> String {
    let visible: String = token.chars().take(3).collect();
    format!("{}***", visible)
}
