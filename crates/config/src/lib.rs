pub mod schema;

pub use schema::{
    Discipline, LogConfig, MonitorConfig, SamplingConfig, SensorConfig, ShutdownConfig,
    ThemeConfig, WindowConfig,
};

use batmon_core::{MonitorError, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `MonitorConfig::default()` if
/// the file doesn't exist so the monitor always has sensible defaults.
///
/// A file that exists but fails to parse or validate is an error: a typo in
/// the shutdown section must not silently fall back to defaults.
pub fn load(path: impl AsRef<Path>) -> Result<MonitorConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(MonitorConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| MonitorError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config = parse(&raw)?;
    tracing::info!("Loaded config from '{}'", path.display());
    Ok(config)
}

/// Parse and validate a TOML document.
pub fn parse(raw: &str) -> Result<MonitorConfig> {
    let config: MonitorConfig =
        toml::from_str(raw).map_err(|e| MonitorError::Config(format!("TOML parse error: {e}")))?;
    validate(&config)?;
    Ok(config)
}

/// Longest interval, read budget or grace period accepted: one day.
pub const MAX_SECS: u64 = 86_400;

/// Reject values the monitor cannot run with.
pub fn validate(config: &MonitorConfig) -> Result<()> {
    let invalid = |msg: &str| Err(MonitorError::Config(msg.to_string()));

    if !(1..=MAX_SECS).contains(&config.sampling.interval_secs) {
        return invalid("sampling.interval_secs must be between 1 and 86400");
    }
    if !(1..=MAX_SECS).contains(&config.sampling.timeout_secs) {
        return invalid("sampling.timeout_secs must be between 1 and 86400");
    }
    if config.shutdown.grace_secs > MAX_SECS {
        return invalid("shutdown.grace_secs must be at most 86400");
    }
    if !(10..=1000).contains(&config.window.refresh_ms) {
        return invalid("window.refresh_ms must be between 10 and 1000");
    }
    if !(0.0..=100.0).contains(&config.shutdown.threshold) {
        return invalid("shutdown.threshold must be between 0 and 100");
    }
    if config.shutdown.command.is_empty() {
        return invalid("shutdown.command must name a program");
    }
    Ok(())
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("batmon").join("batmon.toml")
}
