// Scripted interface sources and actuators shared by unit tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::CoreError;
use crate::model::{InterfaceCounters, PowerAction};
use crate::power::PowerActuator;
use crate::sampler::InterfaceSource;

pub fn iface(name: &str, received: u64, sent: u64) -> InterfaceCounters {
    InterfaceCounters {
        name: name.to_owned(),
        is_up: true,
        is_loopback: false,
        bytes_received: received,
        bytes_sent: sent,
    }
}

pub fn loopback(received: u64) -> InterfaceCounters {
    InterfaceCounters {
        is_loopback: true,
        ..iface("lo", received, received)
    }
}

/// Returns each reading in turn, then keeps repeating the last one.
pub struct ScriptedSource {
    readings: Vec<Vec<InterfaceCounters>>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(readings: Vec<Vec<InterfaceCounters>>) -> Self {
        Self { readings, next: 0 }
    }
}

impl InterfaceSource for ScriptedSource {
    fn interfaces(&mut self) -> Vec<InterfaceCounters> {
        let index = self.next.min(self.readings.len().saturating_sub(1));
        self.next += 1;
        self.readings.get(index).cloned().unwrap_or_default()
    }
}

/// A single `eth0` whose received counter grows by `step` on every read.
pub struct SteppingSource {
    received: u64,
    step: Arc<AtomicU64>,
}

impl SteppingSource {
    pub fn new(step: u64) -> Self {
        Self {
            received: 0,
            step: Arc::new(AtomicU64::new(step)),
        }
    }

    /// Shared handle for changing the step while a watcher owns the source.
    pub fn step_handle(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.step)
    }
}

impl InterfaceSource for SteppingSource {
    fn interfaces(&mut self) -> Vec<InterfaceCounters> {
        self.received += self.step.load(Ordering::SeqCst);
        vec![iface("eth0", self.received, 0)]
    }
}

#[derive(Default)]
pub struct RecordingActuator {
    performed: Mutex<Vec<PowerAction>>,
}

impl RecordingActuator {
    pub fn performed(&self) -> Vec<PowerAction> {
        self.performed.lock().expect("actuator lock").clone()
    }
}

impl PowerActuator for RecordingActuator {
    fn perform(&self, action: PowerAction) -> Result<(), CoreError> {
        self.performed.lock().expect("actuator lock").push(action);
        Ok(())
    }
}

pub struct FailingActuator;

impl PowerActuator for FailingActuator {
    fn perform(&self, action: PowerAction) -> Result<(), CoreError> {
        Err(CoreError::PowerAction {
            action,
            reason: "permission denied".into(),
        })
    }
}
