pub mod banner;
pub mod readings;

pub use banner::ShutdownBanner;
pub use readings::{ReadingLines, ReadingsWidget};
