//! Queue between the hardware callback and the session buffer.
//!
//! Each session gets a bounded channel and one consumer thread that owns the
//! `SampleBuffer` exclusively. The consumer exits once every sender is gone
//! and hands the buffer back through its join handle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};

use sensor_core::{DropReason, Sample, SampleBuffer, SensorError, SensorKind, Timestamp};

pub(crate) type Reading = (Sample, Timestamp);

pub(crate) fn spawn(
    kind: SensorKind,
    capacity: usize,
) -> Result<(Sender<Reading>, JoinHandle<SampleBuffer>), SensorError> {
    let (tx, rx) = crossbeam_channel::bounded::<Reading>(capacity);
    let handle = thread::Builder::new()
        .name(format!("{kind}-intake"))
        .spawn(move || {
            let mut buffer = SampleBuffer::new();
            for (sample, captured_at) in rx {
                buffer.append(sample, captured_at);
            }
            buffer
        })
        .map_err(|e| SensorError::IntakeFailed {
            message: e.to_string(),
        })?;
    Ok((tx, handle))
}

/// Waits for the consumer to drain the channel. All senders must be dropped first.
pub(crate) fn finish(handle: JoinHandle<SampleBuffer>) -> Result<SampleBuffer, SensorError> {
    handle.join().map_err(|_| SensorError::IntakeFailed {
        message: "intake consumer panicked".to_string(),
    })
}

/// Per-reason counters of readings that never reached a buffer.
#[derive(Debug, Default)]
pub struct DropStats {
    not_sensing: AtomicU64,
    intake_full: AtomicU64,
    intake_closed: AtomicU64,
    malformed: AtomicU64,
}

impl DropStats {
    pub fn record(&self, reason: DropReason) {
        self.record_many(reason, 1);
    }

    pub fn record_many(&self, reason: DropReason, count: u64) {
        let counter = match reason {
            DropReason::NotSensing => &self.not_sensing,
            DropReason::IntakeFull => &self.intake_full,
            DropReason::IntakeClosed => &self.intake_closed,
            DropReason::Malformed => &self.malformed,
        };
        counter.fetch_add(count, Ordering::Relaxed);
    }

    pub fn counts(&self) -> DropCounts {
        DropCounts {
            not_sensing: self.not_sensing.load(Ordering::Relaxed),
            intake_full: self.intake_full.load(Ordering::Relaxed),
            intake_closed: self.intake_closed.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCounts {
    pub not_sensing: u64,
    pub intake_full: u64,
    pub intake_closed: u64,
    pub malformed: u64,
}

impl DropCounts {
    pub fn total(&self) -> u64 {
        self.not_sensing + self.intake_full + self.intake_closed + self.malformed
    }
}
