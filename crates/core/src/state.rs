use crate::{notice::ShutdownNotice, sample::Sample};

/// What the window currently shows; widgets read from this snapshot.
#[derive(Debug, Clone, Default)]
pub struct PanelState {
    /// Most recently consumed sample, `None` until the first read lands.
    pub sample: Option<Sample>,
    /// Latest shutdown status.
    pub notice: ShutdownNotice,
}

impl PanelState {
    /// Replace the displayed sample. Returns `true` if the state changed.
    pub fn apply_sample(&mut self, sample: Sample) -> bool {
        if self.sample.as_ref() == Some(&sample) {
            return false;
        }
        self.sample = Some(sample);
        true
    }

    /// Replace the shutdown notice. Returns `true` if the state changed.
    pub fn apply_notice(&mut self, notice: ShutdownNotice) -> bool {
        if self.notice == notice {
            return false;
        }
        self.notice = notice;
        true
    }
}
