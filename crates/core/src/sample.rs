use chrono::{DateTime, Local};

/// Bus voltage treated as an empty pack (0 %).
pub const EMPTY_VOLTS: f64 = 6.0;
/// Bus voltage treated as a full pack (100 %).
pub const FULL_VOLTS: f64 = 8.4;

/// `strftime` format used for sample timestamps in the window and the log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Map a bus voltage onto a charge percentage in `[0, 100]`.
///
/// Linear remap of the 6.0 V – 8.4 V range of a two-cell pack. The result is
/// only meaningful inside that range; everything outside clamps to the nearest
/// bound and `NaN` reads as empty.
#[must_use]
pub fn estimate_percentage(bus_voltage_volts: f64) -> f64 {
    let raw = (bus_voltage_volts - EMPTY_VOLTS) / (FULL_VOLTS - EMPTY_VOLTS) * 100.0;
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}

/// Raw values returned by one pass over the sensor's three accessors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub bus_voltage_volts: f64,
    /// Signed; negative while the pack is discharging.
    pub current_milliamps: f64,
    pub power_watts: f64,
}

/// Direction of current flow through the pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    Charging,
    Discharging,
}

impl ChargeState {
    /// Zero current counts as charging.
    pub fn from_current(current_milliamps: f64) -> Self {
        if current_milliamps < 0.0 {
            Self::Discharging
        } else {
            Self::Charging
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Charging    => "charging",
            Self::Discharging => "discharging",
        }
    }
}

/// One completed poll of the fuel gauge. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    bus_voltage_volts: f64,
    current_milliamps: f64,
    power_watts: f64,
    percentage: f64,
    timestamp: DateTime<Local>,
}

impl Sample {
    /// Build a sample from a raw reading, deriving the percentage.
    pub fn new(reading: Reading, timestamp: DateTime<Local>) -> Self {
        Self {
            bus_voltage_volts: reading.bus_voltage_volts,
            current_milliamps: reading.current_milliamps,
            power_watts:       reading.power_watts,
            percentage:        estimate_percentage(reading.bus_voltage_volts),
            timestamp,
        }
    }

    pub fn bus_voltage_volts(&self) -> f64 {
        self.bus_voltage_volts
    }

    pub fn current_milliamps(&self) -> f64 {
        self.current_milliamps
    }

    pub fn power_watts(&self) -> f64 {
        self.power_watts
    }

    /// Always within `[0, 100]`.
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn charge_state(&self) -> ChargeState {
        ChargeState::from_current(self.current_milliamps)
    }

    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}
