use batmon_core::{Result, Sample};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only text log, one line per sample. Never read back.
#[derive(Debug)]
pub struct SampleLog {
    path: PathBuf,
    file: File,
}

impl SampleLog {
    /// Open (or create) the log for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::info!("Appending samples to '{}'", path.display());
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, sample: &Sample) -> Result<()> {
        self.file.write_all(format_line(sample).as_bytes())?;
        Ok(())
    }
}

/// `<timestamp> - Percent <value>, Battery is <charging|discharging>\n`
pub fn format_line(sample: &Sample) -> String {
    format!(
        "{} - Percent {}, Battery is {}\n",
        sample.timestamp_label(),
        sample.percentage(),
        sample.charge_state().as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use batmon_core::{estimate_percentage, Reading};
    use chrono::{Local, TimeZone};

    fn sample(volts: f64, current: f64) -> Sample {
        let at = Local.with_ymd_and_hms(2024, 5, 17, 21, 4, 9).unwrap();
        Sample::new(
            Reading {
                bus_voltage_volts: volts,
                current_milliamps: current,
                power_watts:       1.0,
            },
            at,
        )
    }

    #[test]
    fn line_format_matches_log_layout() {
        assert_eq!(
            format_line(&sample(7.2, -180.0)),
            format!(
                "2024-05-17 21:04:09 - Percent {}, Battery is discharging\n",
                estimate_percentage(7.2)
            )
        );
        assert_eq!(
            format_line(&sample(8.4, 0.0)),
            "2024-05-17 21:04:09 - Percent 100, Battery is charging\n"
        );
    }

    #[test]
    fn percentage_is_written_at_full_precision() {
        let line = format_line(&sample(7.0, -10.0));
        let expected = format!(
            "2024-05-17 21:04:09 - Percent {}, Battery is discharging\n",
            estimate_percentage(7.0)
        );
        assert_eq!(line, expected);
        assert!(line.contains("Percent 41.66666"));
    }

    #[test]
    fn appends_without_truncating() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("battery_status.log");
        std::fs::write(&path, "earlier line\n").unwrap();

        let mut log = SampleLog::open(&path).unwrap();
        log.append(&sample(7.2, -180.0)).unwrap();
        log.append(&sample(6.0, 50.0)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "earlier line");
        assert!(lines[2].ends_with("Percent 0, Battery is charging"));
    }
}
