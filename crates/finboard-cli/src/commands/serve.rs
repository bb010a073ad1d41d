//! Server command implementation

use std::path::Path;

use anyhow::Result;
use finboard_core::DashboardConfig;
use finboard_server::ServerConfig;

pub async fn cmd_serve(
    config: DashboardConfig,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allowed_origins: Vec<String>,
) -> Result<()> {
    println!("🚀 Starting finboard web server...");
    println!("   Analysis API: {}", config.api_base);
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if !allowed_origins.is_empty() {
        println!("   CORS origins: {}", allowed_origins.join(", "));
    }
    println!();

    let server_config = ServerConfig {
        allowed_origins,
        ..ServerConfig::default()
    };
    let static_dir = static_dir.map(|p| p.to_string_lossy().into_owned());

    finboard_server::serve(config, host, port, static_dir.as_deref(), server_config).await
}
