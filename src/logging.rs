//! Logging setup on tracing-subscriber.
//!
//! The crates themselves log through the `log` facade; the
//! `tracing_log::LogTracer` bridge routes those records into the
//! subscriber installed here, so library code stays free of any
//! subscriber dependency.

use crate::config::LoggingSettings;
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Build the filter from the base level plus per-target overrides.
fn env_filter(settings: &LoggingSettings) -> anyhow::Result<EnvFilter> {
    let mut directives = vec![settings.level.clone()];
    // Runtime internals are only interesting when debugging the runtime
    directives.push("tokio=warn".to_string());
    directives.push("runtime=warn".to_string());
    for (target, level) in &settings.targets {
        directives.push(format!("{}={}", target, level));
    }
    let joined = directives.join(",");
    EnvFilter::try_new(&joined)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{}': {}", joined, e))
}

/// Install the global subscriber: optional console layer plus a file layer
/// in compact text or JSON lines, per `settings.format`.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(&settings.file_path).parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file_path)?;

    // log::* → tracing bridge; tolerate double init in tests
    tracing_log::LogTracer::init().ok();

    let console_layer = settings.log_to_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
    });

    let file_layer = if settings.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(log_file)
            .with_target(true)
            .with_span_list(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(log_file)
            .with_target(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter(settings)?)
        .with(console_layer)
        .with(file_layer)
        .init();

    log::debug!(
        "logging initialized: level={}, console={}, file={}",
        settings.level,
        settings.log_to_console,
        settings.file_path
    );
    Ok(())
}
