//! batmon — battery monitor for INA219-based UPS boards.
//!
//! Run with:  `RUST_LOG=info batmon`

use anyhow::Result;
use batmon_system::{CommandPowerOff, Ina219Hwmon};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Structured logging — RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("batmon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = batmon_config::load(batmon_config::default_path())?;
    let reader = Arc::new(Ina219Hwmon::new(&config.sensor));
    let power_off = Arc::new(CommandPowerOff::from_config(&config.shutdown)?);

    // Sampling runs on its own runtime so a slow sensor never blocks the UI thread.
    let runtime = tokio::runtime::Runtime::new()?;
    let monitor = {
        let _guard = runtime.enter();
        batmon_system::spawn_monitor(&config, reader, power_off)?
    };

    let outcome: Result<()> = if config.window.enabled {
        batmon_window::run(config, monitor.samples, monitor.notices).map_err(Into::into)
    } else {
        tracing::info!("Window disabled; running headless");
        runtime.block_on(async {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => signal?,
                _ = monitor.task => {}
            }
            Ok::<(), anyhow::Error>(())
        })
    };

    // A read stuck on the bus must not keep the process alive.
    runtime.shutdown_background();
    outcome
}
