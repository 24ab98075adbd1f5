//! # Sensor Pull
//!
//! Controllers for pull sensors: hardware that must be explicitly started and
//! stopped to deliver a continuous stream of readings.
//!
//! A `SensorController` registers a listener with a `HardwareSource`, queues
//! every reading of the current session into a bounded intake drained by a
//! single consumer thread, and on stop hands the complete buffer to its
//! `Processor` exactly once. The most recent result is cached for queries.
//!
//! ```
//! use std::sync::Arc;
//! use sensor_core::{SensorConfig, SensorKind};
//! use sensor_pull::{AccelerometerProcessor, ManualSource, SensorController};
//!
//! let source = Arc::new(ManualSource::new());
//! let controller = SensorController::new(
//!     SensorKind::Accelerometer,
//!     source.clone(),
//!     AccelerometerProcessor,
//!     SensorConfig::new(),
//! );
//!
//! assert!(controller.start_sensing().unwrap());
//! source.emit(SensorKind::Accelerometer, &[0.0, 0.0, 9.81]);
//! let data = controller.stop_sensing().unwrap();
//! assert_eq!(data.summary.sample_count, 1);
//! ```

pub mod accelerometer;
pub mod controller;
pub mod instance;
pub mod intake;
pub mod manual;

pub use accelerometer::{
    AccelerometerController, AccelerometerData, AccelerometerProcessor, MotionSummary,
    accelerometer, shutdown_accelerometer,
};
pub use controller::{SensorController, SessionState};
pub use instance::InstanceCell;
pub use intake::{DropCounts, DropStats};
pub use manual::{ManualSource, Registration};
