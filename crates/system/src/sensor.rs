use batmon_config::SensorConfig;
use batmon_core::{MonitorError, Reading, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Fuel-gauge sensor collaborator.
///
/// Implementations may block, fail, or never return; callers go through
/// [`crate::sampler::SensorGuard`] which bounds every read.
pub trait SensorReader: Send + Sync + 'static {
    fn bus_voltage_volts(&self) -> Result<f64>;

    /// Signed; negative while discharging.
    fn current_milliamps(&self) -> Result<f64>;

    fn power_watts(&self) -> Result<f64>;

    /// One pass over all three accessors.
    fn read(&self) -> Result<Reading> {
        Ok(Reading {
            bus_voltage_volts: self.bus_voltage_volts()?,
            current_milliamps: self.current_milliamps()?,
            power_watts:       self.power_watts()?,
        })
    }
}

/// Driver names the `ina2xx` hwmon driver registers for INA219-compatible parts.
const DRIVER_NAMES: &[&str] = &["ina219", "ina220"];

/// INA219 read through the Linux `ina2xx` hwmon driver.
///
/// The device directory is looked up on every read so a driver that binds
/// after startup is picked up without a restart.
#[derive(Debug, Clone)]
pub struct Ina219Hwmon {
    hwmon_root: PathBuf,
    /// Kernel device name, e.g. `"1-0042"`.
    device: String,
}

impl Ina219Hwmon {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            hwmon_root: config.hwmon_root.clone(),
            device:     format!("{}-{:04x}", config.bus, config.address),
        }
    }

    /// Scan `hwmon_root` for the `hwmonN` entry bound to our bus address.
    fn locate(&self) -> Result<PathBuf> {
        let entries = fs::read_dir(&self.hwmon_root).map_err(|e| {
            MonitorError::Sensor(format!("cannot list '{}': {e}", self.hwmon_root.display()))
        })?;

        for entry in entries.flatten() {
            let dir = entry.path();
            let name = match fs::read_to_string(dir.join("name")) {
                Ok(name) => name,
                Err(_) => continue,
            };
            if !DRIVER_NAMES.contains(&name.trim()) {
                continue;
            }
            let bound_to = fs::read_link(dir.join("device"))
                .ok()
                .and_then(|target| target.file_name().map(|n| n.to_string_lossy().into_owned()));
            if bound_to.as_deref() == Some(self.device.as_str()) {
                return Ok(dir);
            }
        }

        Err(MonitorError::Sensor(format!(
            "no INA219 hwmon device bound to {} under '{}'",
            self.device,
            self.hwmon_root.display()
        )))
    }

    fn voltage_in(dir: &Path) -> Result<f64> {
        // in1 is the bus voltage, in millivolts; in0 is the shunt.
        Ok(read_value(dir, "in1_input")? / 1000.0)
    }

    fn current_in(dir: &Path) -> Result<f64> {
        read_value(dir, "curr1_input")
    }

    fn power_in(dir: &Path) -> Result<f64> {
        // Microwatts.
        Ok(read_value(dir, "power1_input")? / 1_000_000.0)
    }
}

impl SensorReader for Ina219Hwmon {
    fn bus_voltage_volts(&self) -> Result<f64> {
        Self::voltage_in(&self.locate()?)
    }

    fn current_milliamps(&self) -> Result<f64> {
        Self::current_in(&self.locate()?)
    }

    fn power_watts(&self) -> Result<f64> {
        Self::power_in(&self.locate()?)
    }

    fn read(&self) -> Result<Reading> {
        let dir = self.locate()?;
        Ok(Reading {
            bus_voltage_volts: Self::voltage_in(&dir)?,
            current_milliamps: Self::current_in(&dir)?,
            power_watts:       Self::power_in(&dir)?,
        })
    }
}

/// Read and parse a single integer attribute from a hwmon directory.
fn read_value(dir: &Path, attr: &str) -> Result<f64> {
    let file = dir.join(attr);
    let raw = fs::read_to_string(&file)
        .map_err(|e| MonitorError::Sensor(format!("cannot read '{}': {e}", file.display())))?;
    raw.trim()
        .parse::<i64>()
        .map(|v| v as f64)
        .map_err(|e| MonitorError::Sensor(format!("bad value in '{}': {e}", file.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn config_for(root: &Path) -> SensorConfig {
        SensorConfig {
            bus:        1,
            address:    0x42,
            hwmon_root: root.to_path_buf(),
        }
    }

    fn fake_hwmon(root: &Path, entry: &str, name: &str, device: &str) -> PathBuf {
        let dir = root.join(entry);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("name"), format!("{name}\n")).unwrap();
        symlink(format!("../../../{device}"), dir.join("device")).unwrap();
        dir
    }

    #[test]
    fn reads_bus_values_from_matching_device() {
        let td = TempDir::new().unwrap();
        // A different INA219 on another address must be skipped.
        let other = fake_hwmon(td.path(), "hwmon0", "ina219", "1-0040");
        fs::write(other.join("in1_input"), "5000\n").unwrap();

        let dir = fake_hwmon(td.path(), "hwmon1", "ina219", "1-0042");
        fs::write(dir.join("in1_input"), "7812\n").unwrap();
        fs::write(dir.join("curr1_input"), "-315\n").unwrap();
        fs::write(dir.join("power1_input"), "2460000\n").unwrap();

        let sensor = Ina219Hwmon::new(&config_for(td.path()));
        let reading = sensor.read().unwrap();

        assert!((reading.bus_voltage_volts - 7.812).abs() < 1e-9);
        assert_eq!(reading.current_milliamps, -315.0);
        assert!((reading.power_watts - 2.46).abs() < 1e-9);
        assert_eq!(sensor.current_milliamps().unwrap(), -315.0);
    }

    #[test]
    fn skips_other_drivers() {
        let td = TempDir::new().unwrap();
        let dir = fake_hwmon(td.path(), "hwmon0", "cpu_thermal", "1-0042");
        fs::write(dir.join("in1_input"), "7812\n").unwrap();

        let sensor = Ina219Hwmon::new(&config_for(td.path()));
        assert!(matches!(sensor.read(), Err(MonitorError::Sensor(_))));
    }

    #[test]
    fn malformed_value_is_sensor_error() {
        let td = TempDir::new().unwrap();
        let dir = fake_hwmon(td.path(), "hwmon0", "ina219", "1-0042");
        fs::write(dir.join("in1_input"), "garbage\n").unwrap();

        let sensor = Ina219Hwmon::new(&config_for(td.path()));
        let err = sensor.bus_voltage_volts().unwrap_err();
        assert!(err.to_string().contains("in1_input"));
    }

    #[test]
    fn missing_root_is_sensor_error() {
        let sensor = Ina219Hwmon::new(&config_for(Path::new("/nonexistent/hwmon")));
        assert!(sensor.read().unwrap_err().is_sensor_failure());
    }
}
