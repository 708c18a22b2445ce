use chrono::{DateTime, Local};

/// User-facing shutdown status published by the monitor task.
///
/// Sources:
/// - Shutdown policy, first low reading (deferred) → `Pending`
/// - Recovered reading with `cancel_on_recovery`   → back to `Clear`
/// - Power-off command issued                      → `PoweringOff`
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ShutdownNotice {
    /// Nothing to report.
    #[default]
    Clear,
    /// Low battery seen; the machine powers off at `deadline`.
    ///
    /// `deadline` is `None` when it lies beyond what a calendar time can hold.
    Pending {
        percentage: f64,
        deadline:   Option<DateTime<Local>>,
    },
    /// The power-off command has been issued.
    PoweringOff,
}

impl ShutdownNotice {
    /// One-line message for the window, `None` when there is nothing to show.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Clear => None,
            Self::Pending { percentage, deadline: Some(deadline) } => Some(format!(
                "Battery low ({percentage:.1}%): shutting down at {}",
                deadline.format("%H:%M:%S")
            )),
            Self::Pending { percentage, deadline: None } => Some(format!(
                "Battery low ({percentage:.1}%): shutdown pending"
            )),
            Self::PoweringOff => Some("Battery low: shutting down now".to_string()),
        }
    }
}
