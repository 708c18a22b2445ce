use batmon_core::{sample::Sample, state::PanelState};
use batmon_theme::Theme;
use iced::{
    widget::{column, text},
    Element,
};

/// The text lines shown for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingLines {
    pub voltage: String,
    pub current: String,
    pub power:   String,
    pub percent: String,
    pub status:  String,
    pub updated: String,
}

impl ReadingLines {
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            voltage: format!("Voltage: {:.3} V", sample.bus_voltage_volts()),
            current: format!("Current: {:.6} A", sample.current_milliamps() / 1000.0),
            power:   format!("Power: {:.3} W", sample.power_watts()),
            percent: format!("Percent: {:.1}%", sample.percentage()),
            status:  format!("Battery is {}", sample.charge_state().as_str()),
            updated: format!("Last Updated: {}", sample.timestamp_label()),
        }
    }

    /// Placeholder shown before the first successful read.
    pub fn waiting() -> Self {
        Self {
            voltage: "Voltage: --".to_string(),
            current: "Current: --".to_string(),
            power:   "Power: --".to_string(),
            percent: "Percent: --".to_string(),
            status:  "Waiting for sensor".to_string(),
            updated: String::new(),
        }
    }
}

/// Voltage, current, power and percentage of the last consumed sample.
#[derive(Debug, Default)]
pub struct ReadingsWidget;

impl ReadingsWidget {
    pub fn new() -> Self {
        Self
    }

    pub fn lines(&self, state: &PanelState) -> ReadingLines {
        state
            .sample
            .as_ref()
            .map_or_else(ReadingLines::waiting, ReadingLines::from_sample)
    }

    pub fn view<'a, Message: 'a>(
        &'a self,
        state: &'a PanelState,
        theme: &'a Theme,
    ) -> Element<'a, Message> {
        let lines = self.lines(state);
        let size  = theme.font_size;
        let color = theme.foreground.to_iced();

        column![
            text(lines.voltage).size(size).color(color),
            text(lines.current).size(size).color(color),
            text(lines.power).size(size).color(color),
            text(lines.percent).size(size).color(color),
            text(lines.status).size(smaller(size, 1.0)).color(color),
            text(lines.updated).size(smaller(size, 2.0)).color(color),
        ]
        .spacing(theme.gap as f32)
        .into()
    }
}

/// Font size for the secondary lines; never below one pixel.
fn smaller(size: f32, by: f32) -> f32 {
    (size - by).max(1.0)
}
