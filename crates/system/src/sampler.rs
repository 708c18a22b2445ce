use crate::sensor::SensorReader;
use batmon_core::{MonitorError, Reading, Result, Sample};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Bounds every sensor read by a per-call deadline.
///
/// The read runs on tokio's blocking pool; if it overruns `budget` the cycle
/// is abandoned and the worker is remembered as stalled. While it stays
/// stalled, later cycles fail fast with [`MonitorError::SensorTimeout`]
/// instead of stacking more blocked workers on a hung bus.
pub struct SensorGuard {
    reader:  Arc<dyn SensorReader>,
    budget:  Duration,
    stalled: Option<JoinHandle<Result<Reading>>>,
}

impl SensorGuard {
    pub fn new(reader: Arc<dyn SensorReader>, budget: Duration) -> Self {
        Self {
            reader,
            budget,
            stalled: None,
        }
    }

    /// Acquire one [`Sample`], or fail without producing a partial one.
    pub async fn sample(&mut self) -> Result<Sample> {
        if let Some(worker) = self.stalled.take() {
            if !worker.is_finished() {
                self.stalled = Some(worker);
                return Err(MonitorError::SensorTimeout(self.budget));
            }
            // Finished late; its value belonged to an abandoned cycle.
            tracing::debug!("Stalled sensor read completed; resuming");
        }

        let reader = Arc::clone(&self.reader);
        let mut worker = tokio::task::spawn_blocking(move || reader.read());

        match tokio::time::timeout(self.budget, &mut worker).await {
            Ok(Ok(reading)) => Ok(Sample::new(reading?, Local::now())),
            Ok(Err(join)) => Err(MonitorError::Sensor(format!("sensor worker failed: {join}"))),
            Err(_elapsed) => {
                self.stalled = Some(worker);
                Err(MonitorError::SensorTimeout(self.budget))
            }
        }
    }
}
