//! Test doubles shared by the unit tests in this crate.

use crate::sensor::SensorReader;
use crate::shutdown::PowerOff;
use batmon_core::{MonitorError, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Bus voltage that maps to `percentage` on the 6.0 V – 8.4 V scale.
pub fn volts_for(percentage: f64) -> f64 {
    6.0 + percentage * 0.024
}

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Volts(f64),
    /// Block the worker for a while, then report these volts.
    Stall(Duration, f64),
    Fail,
}

/// Sensor that plays back a fixed script, one step per read.
pub struct ScriptedReader {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedReader {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SensorReader for ScriptedReader {
    fn bus_voltage_volts(&self) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Volts(v)) => Ok(v),
            Some(Step::Stall(delay, v)) => {
                std::thread::sleep(delay);
                Ok(v)
            }
            Some(Step::Fail) => Err(MonitorError::Sensor("bus error".into())),
            None => Err(MonitorError::Sensor("script exhausted".into())),
        }
    }

    fn current_milliamps(&self) -> Result<f64> {
        Ok(-200.0)
    }

    fn power_watts(&self) -> Result<f64> {
        Ok(1.4)
    }
}

/// Records power-off requests instead of acting on them.
#[derive(Debug, Default)]
pub struct SpyPowerOff {
    calls: AtomicUsize,
}

impl SpyPowerOff {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PowerOff for SpyPowerOff {
    fn power_off(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
