pub mod log;
pub mod sampler;
pub mod sensor;
pub mod shutdown;

#[cfg(test)]
pub(crate) mod testing;

pub use log::SampleLog;
pub use sampler::SensorGuard;
pub use sensor::{Ina219Hwmon, SensorReader};
pub use shutdown::{Action, CommandPowerOff, GraceTimer, PolicyState, PowerOff, ShutdownPolicy};

use batmon_config::MonitorConfig;
use batmon_core::{Result, Sample, ShutdownNotice};
use chrono::Local;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Latest-value-wins receiving end of a single-slot channel.
///
/// The producer overwrites the slot; [`Feed::poll`] hands out each value at
/// most once and never blocks.
#[derive(Debug, Clone)]
pub struct Feed<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Feed<T> {
    pub fn new(rx: watch::Receiver<T>) -> Self {
        Self { rx }
    }

    /// The newest value if it has not been seen yet, otherwise `None`.
    pub fn poll(&mut self) -> Option<T> {
        let current = self.rx.borrow_and_update();
        current.has_changed().then(|| (*current).clone())
    }

    /// Wait for the producer to publish something new and return it.
    /// `None` once the producer is gone.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Handles returned by [`spawn_monitor`].
#[derive(Debug)]
pub struct MonitorHandle {
    pub samples: Feed<Option<Sample>>,
    pub notices: Feed<ShutdownNotice>,
    /// Finishes once a power-off has been issued.
    pub task: JoinHandle<()>,
}

/// Cadences the monitor runs at.
#[derive(Debug, Clone, Copy)]
struct Timing {
    interval: Duration,
    timeout:  Duration,
    grace:    Duration,
}

/// Spawn the background sampling task on the current Tokio runtime.
///
/// Every `sampling.interval_secs` it reads the sensor under a
/// `sampling.timeout_secs` budget, publishes the sample, appends it to the
/// sample log, and feeds the shutdown policy.
pub fn spawn_monitor(
    config: &MonitorConfig,
    reader: Arc<dyn SensorReader>,
    power_off: Arc<dyn PowerOff>,
) -> Result<MonitorHandle> {
    let log = config.log.path.as_ref().map(SampleLog::open).transpose()?;
    let timing = Timing {
        interval: config.sampling.interval(),
        timeout:  config.sampling.timeout(),
        grace:    config.shutdown.grace(),
    };

    info!(
        "Sampling every {:?} (budget {:?}), shutdown {:?} below {}%",
        timing.interval, timing.timeout, config.shutdown.discipline, config.shutdown.threshold
    );

    Ok(start(timing, ShutdownPolicy::from_config(&config.shutdown), reader, power_off, log))
}

fn start(
    timing: Timing,
    policy: ShutdownPolicy,
    reader: Arc<dyn SensorReader>,
    power_off: Arc<dyn PowerOff>,
    log: Option<SampleLog>,
) -> MonitorHandle {
    let (sample_tx, sample_rx) = watch::channel(None);
    let (notice_tx, notice_rx) = watch::channel(ShutdownNotice::Clear);

    let monitor = Monitor {
        guard: SensorGuard::new(reader, timing.timeout),
        timing,
        policy,
        power_off,
        log,
        samples: sample_tx,
        notices: Arc::new(notice_tx),
        grace: None,
    };

    MonitorHandle {
        samples: Feed::new(sample_rx),
        notices: Feed::new(notice_rx),
        task:    tokio::spawn(monitor.run()),
    }
}

struct Monitor {
    guard:     SensorGuard,
    timing:    Timing,
    policy:    ShutdownPolicy,
    power_off: Arc<dyn PowerOff>,
    log:       Option<SampleLog>,
    samples:   watch::Sender<Option<Sample>>,
    notices:   Arc<watch::Sender<ShutdownNotice>>,
    grace:     Option<GraceTimer>,
}

impl Monitor {
    async fn run(mut self) {
        let mut ticker = time::interval(self.timing.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if self.grace_fired() {
                info!("Power-off issued; sampling stopped");
                return;
            }

            let sample = match self.guard.sample().await {
                Ok(sample) => sample,
                Err(e) => {
                    error!("Skipping sampling cycle: {e}");
                    continue;
                }
            };

            // The grace timer may have fired while the read was in flight.
            if self.grace_fired() || self.process(sample).is_break() {
                info!("Power-off issued; sampling stopped");
                return;
            }
        }
    }

    fn grace_fired(&mut self) -> bool {
        let fired = self.grace.as_ref().is_some_and(GraceTimer::has_fired);
        if fired {
            self.policy.grace_expired();
        }
        fired
    }

    fn process(&mut self, sample: Sample) -> ControlFlow<()> {
        debug!(
            "{:.3} V, {:.1} mA, {:.3} W -> {:.1}%",
            sample.bus_voltage_volts(),
            sample.current_milliamps(),
            sample.power_watts(),
            sample.percentage()
        );

        if let Some(log) = &mut self.log {
            if let Err(e) = log.append(&sample) {
                warn!("Cannot append to '{}': {e}", log.path().display());
            }
        }

        let percentage = sample.percentage();
        self.samples.send_replace(Some(sample));

        match self.policy.observe(percentage) {
            Action::None => ControlFlow::Continue(()),
            Action::PowerOff => {
                warn!("Battery at {percentage:.1}%; powering off now");
                self.notices.send_replace(ShutdownNotice::PoweringOff);
                shutdown::issue(self.power_off.as_ref());
                ControlFlow::Break(())
            }
            Action::StartGrace => {
                let grace = self.timing.grace;
                warn!("Battery at {percentage:.1}%; powering off in {grace:?}");
                let deadline = chrono::Duration::from_std(grace)
                    .ok()
                    .and_then(|delay| Local::now().checked_add_signed(delay));
                self.notices
                    .send_replace(ShutdownNotice::Pending { percentage, deadline });
                self.grace = Some(GraceTimer::start(
                    grace,
                    Arc::clone(&self.power_off),
                    Arc::clone(&self.notices),
                ));
                ControlFlow::Continue(())
            }
            Action::CancelGrace => {
                if let Some(timer) = self.grace.take() {
                    if !timer.cancel() {
                        // Lost the race: the power-off already went out.
                        self.policy.grace_expired();
                        return ControlFlow::Break(());
                    }
                }
                info!("Battery recovered to {percentage:.1}%; shutdown cancelled");
                self.notices.send_replace(ShutdownNotice::Clear);
                ControlFlow::Continue(())
            }
        }
    }
}
