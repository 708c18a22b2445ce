//! Desktop window for `batmon`.
//!
//! Owns the Iced application loop. The window never talks to the sensor: it
//! polls the monitor's single-slot feeds on a short timer and redraws only
//! when something new has been published, so a stalled read cannot freeze
//! the UI.

use batmon_config::MonitorConfig;
use batmon_core::{sample::Sample, state::PanelState, ShutdownNotice};
use batmon_system::Feed;
use batmon_theme::Theme;
use batmon_widgets::{ReadingsWidget, ShutdownBanner};
use iced::{
    widget::{column, container},
    Element, Length, Size, Subscription, Task,
};
use std::time::Duration;
use tracing::debug;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Open the status window.  Returns when the window is closed.
pub fn run(
    config: MonitorConfig,
    samples: Feed<Option<Sample>>,
    notices: Feed<ShutdownNotice>,
) -> iced::Result {
    let size = Size::new(config.window.width, config.window.height);

    iced::application(
        move || Window::new(&config, samples.clone(), notices.clone()),
        Window::update,
        Window::view,
    )
    .title(Window::title)
    .subscription(Window::subscription)
    .style(Window::style)
    .window_size(size)
    .run()
}

// ── Message ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Message {
    /// Timer tick — check the feeds for anything new.
    Refresh,
}

// ── State ─────────────────────────────────────────────────────────────────────

pub struct Window {
    panel:    PanelState,
    samples:  Feed<Option<Sample>>,
    notices:  Feed<ShutdownNotice>,
    title:    String,
    refresh:  Duration,
    theme:    Theme,
    readings: ReadingsWidget,
    banner:   ShutdownBanner,
}

impl Window {
    fn new(
        config: &MonitorConfig,
        samples: Feed<Option<Sample>>,
        notices: Feed<ShutdownNotice>,
    ) -> (Self, Task<Message>) {
        let mut window = Self {
            panel:    PanelState::default(),
            samples,
            notices,
            title:    config.window.title.clone(),
            refresh:  config.window.refresh(),
            theme:    Theme::from_config(&config.theme),
            readings: ReadingsWidget::new(),
            banner:   ShutdownBanner::new(),
        };
        // Pick up anything published before the window came up.
        window.refresh();

        (window, Task::none())
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    /// Pull the newest sample and notice, if any.
    ///
    /// Returns `true` when the displayed state changed; an empty feed leaves
    /// everything as it was.
    pub fn refresh(&mut self) -> bool {
        let mut changed = false;

        if let Some(Some(sample)) = self.samples.poll() {
            debug!("Displaying sample taken at {}", sample.timestamp_label());
            changed |= self.panel.apply_sample(sample);
        }
        if let Some(notice) = self.notices.poll() {
            changed |= self.panel.apply_notice(notice);
        }

        changed
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    // ── Update ────────────────────────────────────────────────────────────────

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Refresh => {
                self.refresh();
            }
        }
        Task::none()
    }

    // ── View ──────────────────────────────────────────────────────────────────

    fn view(&self) -> Element<'_, Message> {
        let readings = self.readings.view(&self.panel, &self.theme);

        let body: Element<'_, Message> = match self.banner.view(&self.panel, &self.theme) {
            Some(banner) => column![readings, banner]
                .spacing(self.theme.gap as f32 * 3.0)
                .into(),
            None => readings,
        };

        container(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(self.theme.padding)
            .into()
    }

    // ── Subscriptions ─────────────────────────────────────────────────────────

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(self.refresh).map(|_| Message::Refresh)
    }

    // ── Style ─────────────────────────────────────────────────────────────────

    fn style(&self, _theme: &iced::Theme) -> iced::theme::Style {
        iced::theme::Style {
            background_color: self.theme.background.to_iced(),
            text_color: self.theme.foreground.to_iced(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batmon_core::Reading;
    use chrono::Local;
    use tokio::sync::watch;

    type Senders = (
        watch::Sender<Option<Sample>>,
        watch::Sender<ShutdownNotice>,
    );

    fn window() -> (Window, Senders) {
        let (sample_tx, sample_rx) = watch::channel(None);
        let (notice_tx, notice_rx) = watch::channel(ShutdownNotice::Clear);
        let (window, _) = Window::new(
            &MonitorConfig::default(),
            Feed::new(sample_rx),
            Feed::new(notice_rx),
        );
        (window, (sample_tx, notice_tx))
    }

    fn sample(volts: f64) -> Sample {
        Sample::new(
            Reading {
                bus_voltage_volts: volts,
                current_milliamps: 120.0,
                power_watts:       0.9,
            },
            Local::now(),
        )
    }

    #[test]
    fn empty_feed_leaves_display_untouched() {
        let (mut window, _senders) = window();

        assert!(!window.refresh());
        assert!(!window.refresh());
        assert!(window.panel().sample.is_none());
        assert_eq!(window.panel().notice, ShutdownNotice::Clear);
    }

    #[test]
    fn shows_newest_sample_once() {
        let (mut window, (samples, _notices)) = window();

        samples.send_replace(Some(sample(7.0)));
        samples.send_replace(Some(sample(7.8)));
        assert!(window.refresh());

        let shown = window.panel().sample.clone().unwrap();
        assert!((shown.percentage() - 75.0).abs() < 1e-9);

        // Nothing new: display keeps the last sample.
        assert!(!window.refresh());
        assert_eq!(window.panel().sample, Some(shown));
    }

    #[test]
    fn picks_up_shutdown_notice() {
        let (mut window, (_samples, notices)) = window();

        notices.send_replace(ShutdownNotice::PoweringOff);
        assert!(window.refresh());
        assert_eq!(window.panel().notice, ShutdownNotice::PoweringOff);
    }

    #[test]
    fn update_keeps_polling_without_side_effects() {
        let (mut window, _senders) = window();
        let _ = window.update(Message::Refresh);
        assert!(window.panel().sample.is_none());
    }
}
