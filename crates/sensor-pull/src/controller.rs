//! Session lifecycle of a single pull sensor.

use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use sensor_core::{
    DropReason, HardwareSource, Listener, ListenerId, Processor, ReadingCallback, Sample,
    SampleBuffer, SensorConfig, SensorError, SensorKind, Timestamp,
};

use crate::intake::{self, DropCounts, DropStats, Reading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Sensing,
}

enum Session {
    Idle,
    Sensing {
        started_at: Timestamp,
        consumer: JoinHandle<SampleBuffer>,
    },
}

/// Owns the sensing sessions of one sensor kind.
///
/// Readings flow from the hardware callback through `record_sample` into the
/// session's intake; the controller holds the only sender, so taking it away
/// at stop closes the session to new readings while everything already
/// accepted still reaches the buffer. The processor runs once per session on
/// the drained buffer.
pub struct SensorController<P: Processor> {
    kind: SensorKind,
    source: Arc<dyn HardwareSource>,
    processor: P,
    listener: Listener,
    config: RwLock<SensorConfig>,
    session: Mutex<Session>,
    intake: RwLock<Option<Sender<Reading>>>,
    latest: RwLock<Option<P::Output>>,
    drops: DropStats,
}

impl<P: Processor + 'static> SensorController<P> {
    pub fn new(
        kind: SensorKind,
        source: Arc<dyn HardwareSource>,
        processor: P,
        config: SensorConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let callback: ReadingCallback = Arc::new(move |values: &[f32]| {
                if let Some(controller) = weak.upgrade() {
                    controller.on_reading(values);
                }
            });
            Self {
                kind,
                source,
                processor,
                listener: Listener {
                    id: ListenerId::next(),
                    callback,
                },
                config: RwLock::new(config),
                session: Mutex::new(Session::Idle),
                intake: RwLock::new(None),
                latest: RwLock::new(None),
                drops: DropStats::default(),
            }
        })
    }

    pub fn sensor_kind(&self) -> SensorKind {
        self.kind
    }

    pub fn listener_id(&self) -> ListenerId {
        self.listener.id
    }

    pub fn state(&self) -> SessionState {
        match *self.session.lock() {
            Session::Idle => SessionState::Idle,
            Session::Sensing { .. } => SessionState::Sensing,
        }
    }

    pub fn is_sensing(&self) -> bool {
        self.state() == SessionState::Sensing
    }

    /// Copy of the live configuration.
    pub fn config(&self) -> SensorConfig {
        self.config.read().clone()
    }

    pub fn update_config<F>(&self, update: F)
    where
        F: FnOnce(&mut SensorConfig),
    {
        update(&mut self.config.write());
    }

    /// Counts of readings rejected since construction.
    pub fn dropped(&self) -> DropCounts {
        self.drops.counts()
    }

    /// Begins a session with a fresh, empty buffer.
    ///
    /// Returns `Ok(false)` if the hardware refused the listener; the
    /// controller then stays idle and a later call may retry.
    pub fn start_sensing(&self) -> Result<bool, SensorError> {
        let mut session = self.session.lock();
        if matches!(*session, Session::Sensing { .. }) {
            warn!(kind = %self.kind, "start requested while already sensing");
            return Err(SensorError::AlreadySensing);
        }

        let (delay, capacity) = {
            let config = self.config.read();
            (config.sampling_delay(), config.intake_capacity())
        };
        let (sender, consumer) = intake::spawn(self.kind, capacity)?;
        *self.intake.write() = Some(sender);
        let started_at = Timestamp::now();

        if !self
            .source
            .register_listener(self.listener.clone(), self.kind, delay)
        {
            warn!(kind = %self.kind, ?delay, "hardware rejected listener registration");
            self.intake.write().take();
            match intake::finish(consumer) {
                Ok(buffer) if !buffer.is_empty() => {
                    self.drops
                        .record_many(DropReason::NotSensing, buffer.len() as u64);
                    debug!(kind = %self.kind, discarded = buffer.len(), "readings from refused registration dropped");
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(kind = %self.kind, error = %err, "discarding intake failed");
                }
            }
            return Ok(false);
        }

        *session = Session::Sensing {
            started_at,
            consumer,
        };
        info!(
            kind = %self.kind,
            ?delay,
            period_us = delay.nominal_period().as_micros() as u64,
            capacity,
            "sensing started"
        );
        Ok(true)
    }

    /// Ends the session and processes everything it recorded.
    ///
    /// On processor failure the previous result is kept and the error is
    /// returned; the controller is idle either way.
    pub fn stop_sensing(&self) -> Result<P::Output, SensorError> {
        let mut session = self.session.lock();
        let Session::Sensing {
            started_at,
            consumer,
        } = std::mem::replace(&mut *session, Session::Idle)
        else {
            warn!(kind = %self.kind, "stop requested while idle");
            return Err(SensorError::NotSensing);
        };

        self.source.unregister_listener(self.listener.id);
        // Waits out in-flight sends; the channel disconnects with the sender.
        self.intake.write().take();
        let buffer = intake::finish(consumer)?;

        let snapshot = self.config.read().snapshot();
        match self
            .processor
            .process(started_at, buffer.samples(), buffer.timestamps(), snapshot)
        {
            Ok(output) => {
                *self.latest.write() = Some(output.clone());
                info!(kind = %self.kind, samples = buffer.len(), "sensing stopped");
                Ok(output)
            }
            Err(err) => {
                error!(kind = %self.kind, samples = buffer.len(), error = %err, "processing failed, keeping previous result");
                Err(SensorError::Processing(err))
            }
        }
    }

    /// Appends one reading to the running session.
    ///
    /// Rejected readings are counted and reported as `DroppedSample`.
    pub fn record_sample(&self, sample: Sample, captured_at: Timestamp) -> Result<(), SensorError> {
        let outcome = match self.intake.read().as_ref() {
            None => Err(DropReason::NotSensing),
            Some(sender) => sender
                .try_send((sample, captured_at))
                .map_err(|err| match err {
                    TrySendError::Full(_) => DropReason::IntakeFull,
                    TrySendError::Disconnected(_) => DropReason::IntakeClosed,
                }),
        };
        outcome.map_err(|reason| {
            self.drops.record(reason);
            SensorError::DroppedSample { reason }
        })
    }

    /// Result of the last successfully processed session.
    pub fn get_most_recent_result(&self) -> Option<P::Output> {
        self.latest.read().clone()
    }

    /// One sense cycle: start, wait for the configured window, stop.
    pub fn sense_once(&self) -> Result<P::Output, SensorError> {
        let window = self.config.read().sense_window();
        if !self.start_sensing()? {
            return Err(SensorError::RegistrationRejected { kind: self.kind });
        }
        thread::sleep(window);
        self.stop_sensing()
    }

    /// Stops a running session; its result is still cached.
    pub fn shutdown(&self) {
        if !self.is_sensing() {
            return;
        }
        if let Err(err) = self.stop_sensing() {
            warn!(kind = %self.kind, error = %err, "session ended with error during shutdown");
        }
    }

    fn on_reading(&self, values: &[f32]) {
        let captured_at = Timestamp::now();
        let recorded = match Sample::from_values(values) {
            Ok(sample) => self.record_sample(sample, captured_at),
            Err(err) => {
                if let Some(reason) = err.drop_reason() {
                    self.drops.record(reason);
                }
                Err(err)
            }
        };
        if let Err(err) = recorded {
            debug!(kind = %self.kind, error = %err, "reading dropped");
        }
    }
}

impl<P: Processor> Drop for SensorController<P> {
    fn drop(&mut self) {
        if matches!(*self.session.get_mut(), Session::Sensing { .. }) {
            self.source.unregister_listener(self.listener.id);
        }
    }
}
