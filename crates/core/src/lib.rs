pub mod error;
pub mod notice;
pub mod sample;
pub mod state;

pub use error::{MonitorError, Result};
pub use notice::ShutdownNotice;
pub use sample::{estimate_percentage, ChargeState, Reading, Sample};
pub use state::PanelState;
