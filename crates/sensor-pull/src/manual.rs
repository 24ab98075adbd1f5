//! An in-process hardware source fed by the application.
//!
//! Useful for replaying recorded readings, simulation, and tests: every call
//! to `emit` is delivered synchronously to the listeners registered for that
//! sensor kind, on the calling thread.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use sensor_core::{HardwareSource, Listener, ListenerId, ReadingCallback, SamplingDelay, SensorKind};

/// One accepted or refused registration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub id: ListenerId,
    pub kind: SensorKind,
    pub delay: SamplingDelay,
    pub accepted: bool,
}

pub struct ManualSource {
    accepting: AtomicBool,
    listeners: Mutex<Vec<(Listener, SensorKind)>>,
    history: Mutex<Vec<Registration>>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self {
            accepting: AtomicBool::new(true),
            listeners: Mutex::new(Vec::new()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// A source whose hardware refuses every registration.
    pub fn rejecting() -> Self {
        let source = Self::new();
        source.set_accepting(false);
        source
    }

    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    /// Delivers one reading; returns how many listeners received it.
    pub fn emit(&self, kind: SensorKind, values: &[f32]) -> usize {
        let callbacks: Vec<ReadingCallback> = self
            .listeners
            .lock()
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(listener, _)| listener.callback.clone())
            .collect();
        for callback in &callbacks {
            callback(values);
        }
        callbacks.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.history.lock().clone()
    }
}

impl Default for ManualSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareSource for ManualSource {
    fn register_listener(&self, listener: Listener, kind: SensorKind, delay: SamplingDelay) -> bool {
        let accepted = self.accepting.load(Ordering::SeqCst);
        self.history.lock().push(Registration {
            id: listener.id,
            kind,
            delay,
            accepted,
        });
        if accepted {
            let mut listeners = self.listeners.lock();
            listeners.retain(|(existing, _)| existing.id != listener.id);
            listeners.push((listener, kind));
        }
        accepted
    }

    fn unregister_listener(&self, id: ListenerId) {
        self.listeners.lock().retain(|(listener, _)| listener.id != id);
    }
}
