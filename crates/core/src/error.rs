use std::time::Duration;
use thiserror::Error;

/// Top-level error type shared by every `batmon` library crate.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A sensor read did not finish inside its time budget.
    #[error("sensor read timed out after {0:?}")]
    SensorTimeout(Duration),

    #[error("sensor error: {0}")]
    Sensor(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("power-off error: {0}")]
    PowerOff(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl MonitorError {
    /// `true` for failures of the sensor collaborator, which the sampling
    /// loop recovers from by skipping the cycle.
    pub fn is_sensor_failure(&self) -> bool {
        matches!(self, Self::SensorTimeout(_) | Self::Sensor(_))
    }
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;
