//! Service entrypoint.
//!
//! The heavy lifting (component wiring, shutdown) lives in the lifecycle
//! module so this file remains a thin orchestrator.

use anyhow::Result;
use log::info;
use std::path::Path;
use tdm_backend::config::AppConfig;
use tdm_backend::{lifecycle, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = "config.toml";
    let config = if Path::new(config_path).exists() {
        match AppConfig::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("FATAL: failed to load {}: {}", config_path, e);
                std::process::exit(1);
            }
        }
    } else {
        AppConfig::default()
    };

    // Logging before any other side effects
    logging::init_logging(&config.logging)?;

    info!(
        "tdm-backend v{} starting (worker_id={})",
        env!("CARGO_PKG_VERSION"),
        config.service.worker_id
    );

    let context = lifecycle::bootstrap(&config)?;
    lifecycle::run(context).await
}
