//! # Sensor Core
//!
//! This crate provides the core data structures shared by every pull sensor:
//! the `Sample`/`Timestamp` pair recorded from hardware, the `SampleBuffer`
//! that holds a session's readings, the `SensorConfig` parameter bag, and the
//! collaborator interfaces (`HardwareSource`, `Processor`) a controller drives.
//! It also defines the `SensorData` trait, the common surface of every derived
//! result.

pub mod buffer;
pub mod config;
pub mod error;
pub mod processor;
pub mod sample;
pub mod source;

pub use buffer::SampleBuffer;
pub use config::{ConfigSnapshot, ParamValue, SensorConfig};
pub use error::{DropReason, SensorError};
pub use processor::Processor;
pub use sample::{AXES, Sample, SamplingDelay, SensorKind, Timestamp};
pub use source::{HardwareSource, Listener, ListenerId, ReadingCallback};

/// Read-only surface shared by the results of all sensor kinds.
pub trait SensorData {
    fn sensor_kind(&self) -> SensorKind;
    fn sense_start(&self) -> Timestamp;
    fn config(&self) -> &ConfigSnapshot;
}
