use batmon_core::state::PanelState;
use batmon_theme::Theme;
use iced::{widget::text, Element};

/// Low-battery warning line.
///
/// Hidden entirely while no shutdown is pending.
#[derive(Debug, Default)]
pub struct ShutdownBanner;

impl ShutdownBanner {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when there is nothing to warn about — callers should skip rendering.
    pub fn view<'a, Message: 'a>(
        &'a self,
        state: &'a PanelState,
        theme: &'a Theme,
    ) -> Option<Element<'a, Message>> {
        let message = state.notice.message()?;
        Some(text(message).size(theme.font_size).color(theme.accent.to_iced()).into())
    }
}
