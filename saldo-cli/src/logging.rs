use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Map a config/flag level to a filter directive. Python-style names are
/// accepted too.
fn level_directive(level: &str) -> String {
    match level.trim().to_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}

/// `RUST_LOG` when set and valid, else `level`, else `info`.
fn build_filter(env: Option<&str>, level: &str) -> EnvFilter {
    env.and_then(|e| EnvFilter::try_new(e).ok())
        .or_else(|| EnvFilter::try_new(level_directive(level)).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber. Logs go to stderr so reports and JSON on
/// stdout stay clean.
pub fn init_logging(level: &str) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env.as_deref(), level);

    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    Ok(())
}
