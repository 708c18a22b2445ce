use batmon_config::{Discipline, ShutdownConfig};
use batmon_core::{MonitorError, Result, ShutdownNotice};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Capability to power the machine off. Injected so tests can count calls.
pub trait PowerOff: Send + Sync + 'static {
    fn power_off(&self) -> Result<()>;
}

/// Runs an external command such as `shutdown -h now`.
///
/// Fire-and-forget: the child is spawned and never waited on.
#[derive(Debug, Clone)]
pub struct CommandPowerOff {
    program: String,
    args:    Vec<String>,
}

impl CommandPowerOff {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(cfg: &ShutdownConfig) -> Result<Self> {
        let (program, args) = cfg
            .command
            .split_first()
            .ok_or_else(|| MonitorError::Config("shutdown.command is empty".into()))?;
        Ok(Self::new(program.clone(), args.to_vec()))
    }
}

impl PowerOff for CommandPowerOff {
    fn power_off(&self) -> Result<()> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|e| MonitorError::PowerOff(format!("cannot run '{}': {e}", self.program)))
    }
}

/// Issue the power-off and log (but otherwise ignore) a failure to launch it.
pub fn issue(power_off: &dyn PowerOff) {
    if let Err(e) = power_off.power_off() {
        error!("{e}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyState {
    Normal,
    /// Deferred discipline: warning shown, grace timer running.
    Pending,
    /// Terminal.
    ShuttingDown,
}

/// What the caller must do after feeding the policy a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    PowerOff,
    StartGrace,
    CancelGrace,
}

/// Threshold state machine deciding when to power off.
#[derive(Debug, Clone)]
pub struct ShutdownPolicy {
    discipline:         Discipline,
    threshold:          f64,
    cancel_on_recovery: bool,
    state:              PolicyState,
}

impl ShutdownPolicy {
    pub fn new(discipline: Discipline, threshold: f64) -> Self {
        Self {
            discipline,
            threshold,
            cancel_on_recovery: false,
            state: PolicyState::Normal,
        }
    }

    pub fn from_config(cfg: &ShutdownConfig) -> Self {
        Self::new(cfg.discipline, cfg.threshold).with_cancel_on_recovery(cfg.cancel_on_recovery)
    }

    #[must_use]
    pub fn with_cancel_on_recovery(mut self, cancel: bool) -> Self {
        self.cancel_on_recovery = cancel;
        self
    }

    pub fn state(&self) -> PolicyState {
        self.state
    }

    /// Feed one percentage reading.
    pub fn observe(&mut self, percentage: f64) -> Action {
        let low = percentage < self.threshold;

        match (self.discipline, self.state) {
            (_, PolicyState::ShuttingDown) | (Discipline::Disabled, _) => Action::None,
            (Discipline::Immediate, PolicyState::Normal) if low => {
                self.state = PolicyState::ShuttingDown;
                Action::PowerOff
            }
            (Discipline::Deferred, PolicyState::Normal) if low => {
                self.state = PolicyState::Pending;
                Action::StartGrace
            }
            (Discipline::Deferred, PolicyState::Pending) if !low && self.cancel_on_recovery => {
                self.state = PolicyState::Normal;
                Action::CancelGrace
            }
            _ => Action::None,
        }
    }

    /// The grace timer issued the power-off. Terminal, even if a recovered
    /// reading already moved the policy back to `Normal`.
    pub fn grace_expired(&mut self) {
        if self.discipline == Discipline::Deferred {
            self.state = PolicyState::ShuttingDown;
        }
    }
}

/// One-shot timer that powers off after the grace period.
///
/// Firing and cancelling race on a single `armed` flag: exactly one of them
/// wins, so a cancel that arrives after the power-off was issued reports
/// failure instead of silently succeeding.
#[derive(Debug)]
pub struct GraceTimer {
    handle: JoinHandle<()>,
    armed:  Arc<AtomicBool>,
    fired:  Arc<AtomicBool>,
}

impl GraceTimer {
    pub fn start(
        grace: Duration,
        power_off: Arc<dyn PowerOff>,
        notices: Arc<watch::Sender<ShutdownNotice>>,
    ) -> Self {
        let armed = Arc::new(AtomicBool::new(true));
        let fired = Arc::new(AtomicBool::new(false));

        let handle = {
            let armed = Arc::clone(&armed);
            let fired = Arc::clone(&fired);
            tokio::spawn(async move {
                tokio::time::sleep(grace).await;
                if !armed.swap(false, Ordering::SeqCst) {
                    return;
                }
                fired.store(true, Ordering::SeqCst);
                warn!("Grace period over; powering off");
                notices.send_replace(ShutdownNotice::PoweringOff);
                issue(power_off.as_ref());
            })
        };

        Self { handle, armed, fired }
    }

    /// `true` once the power-off has been issued.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Disarm the timer. Returns `false` if it already fired.
    pub fn cancel(self) -> bool {
        let disarmed = self.armed.swap(false, Ordering::SeqCst);
        self.handle.abort();
        disarmed
    }
}
