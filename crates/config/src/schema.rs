use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure parsed from `batmon.toml`.
///
/// Every section has defaults, so an empty or missing file reproduces the
/// stock UPS HAT setup: INA219 at `0x42` on bus 1, 10 s sampling, shutdown
/// below 5 %.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub sensor:   SensorConfig,
    pub sampling: SamplingConfig,
    pub window:   WindowConfig,
    pub shutdown: ShutdownConfig,
    pub log:      LogConfig,
    pub theme:    ThemeConfig,
}

/// Where to find the fuel-gauge sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// I²C bus number (`/dev/i2c-N`).
    pub bus: u16,
    /// 7-bit device address on the bus.
    pub address: u16,
    /// Root of the hwmon class directory.
    pub hwmon_root: PathBuf,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            bus:        1,
            address:    0x42,
            hwmon_root: PathBuf::from("/sys/class/hwmon"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Seconds between sensor reads.
    pub interval_secs: u64,
    /// Budget for a single read before the cycle is abandoned.
    pub timeout_secs: u64,
}

impl SamplingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            timeout_secs:  5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// `false` runs headless: sampling and shutdown policy only.
    pub enabled: bool,
    pub title: String,
    /// How often the window checks for a new sample (milliseconds).
    pub refresh_ms: u64,
    pub width: f32,
    pub height: f32,
}

impl WindowConfig {
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            enabled:    true,
            title:      "Battery Status".to_string(),
            refresh_ms: 100,
            width:      280.0,
            height:     180.0,
        }
    }
}

/// How the shutdown policy reacts to a low reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Discipline {
    /// Power off in the same cycle that saw the low reading.
    #[default]
    Immediate,
    /// Warn, then power off once the grace period runs out.
    Deferred,
    /// Never power off.
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    pub discipline: Discipline,
    /// Power off when the percentage is strictly below this value.
    pub threshold: f64,
    /// Delay between the warning and the power-off (deferred only).
    pub grace_secs: u64,
    /// Deferred only: a reading back at or above `threshold` cancels the
    /// pending power-off.
    pub cancel_on_recovery: bool,
    /// Program and arguments used to power the machine off.
    pub command: Vec<String>,
}

impl ShutdownConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            discipline:         Discipline::Immediate,
            threshold:          5.0,
            grace_secs:         60,
            cancel_on_recovery: false,
            command:            vec!["shutdown".into(), "-h".into(), "now".into()],
        }
    }
}

/// Optional append-only sample log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `None` disables the log.
    pub path: Option<PathBuf>,
}

/// Theme / styling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Window background color (hex, e.g. `"#1e1e2e"`).
    pub background: String,
    /// Text color for the readings.
    pub foreground: String,
    /// Color of the low-battery banner.
    pub accent: String,
    /// Font size in points.
    pub font_size: f32,
    /// Window padding (pixels).
    pub padding: u16,
    /// Gap between lines (pixels).
    pub gap: u16,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "#1e1e2e".to_string(), // Catppuccin Mocha — base
            foreground: "#cdd6f4".to_string(), // Catppuccin Mocha — text
            accent:     "#f38ba8".to_string(), // Catppuccin Mocha — red
            font_size:  14.0,
            padding:    12,
            gap:        4,
        }
    }
}
