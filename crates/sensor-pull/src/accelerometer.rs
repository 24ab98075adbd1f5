//! Accelerometer binding: processor, derived data, and the process-wide controller.

use std::sync::Arc;

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use tracing::info;

use sensor_core::{
    ConfigSnapshot, HardwareSource, Processor, Sample, SensorConfig, SensorData, SensorKind,
    Timestamp,
};

use crate::controller::SensorController;
use crate::instance::InstanceCell;

/// Keep raw readings and timestamps in the result (bool, default true).
pub const RAW_DATA: &str = "RAW_DATA";

pub type AccelerometerController = SensorController<AccelerometerProcessor>;

static ACCELEROMETER: InstanceCell<AccelerometerController> = InstanceCell::new();

/// The process-wide accelerometer controller, built on first access.
///
/// `source` is only used by the call that constructs the controller.
pub fn accelerometer(source: Arc<dyn HardwareSource>) -> Arc<AccelerometerController> {
    ACCELEROMETER.get_or_init(|| {
        info!("creating accelerometer controller");
        SensorController::new(
            SensorKind::Accelerometer,
            source,
            AccelerometerProcessor,
            SensorConfig::new(),
        )
    })
}

/// Stops any running session and releases the process-wide controller.
///
/// The stopped session's result stays cached on the returned controller.
pub fn shutdown_accelerometer() -> Option<Arc<AccelerometerController>> {
    let controller = ACCELEROMETER.shutdown()?;
    controller.shutdown();
    Some(controller)
}

/// Statistics over the acceleration magnitude of one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionSummary {
    pub sample_count: usize,
    /// Time between the first and last reading.
    pub duration_ms: i64,
    pub mean_magnitude: f64,
    pub magnitude_std_dev: f64,
}

impl MotionSummary {
    pub fn from_readings(samples: &[Sample], timestamps: &[Timestamp]) -> Self {
        let duration_ms = match (timestamps.first(), timestamps.last()) {
            (Some(first), Some(last)) => last.millis_since(*first),
            _ => 0,
        };
        if samples.is_empty() {
            return Self {
                duration_ms,
                ..Self::default()
            };
        }

        let n = samples.len() as f64;
        let magnitudes: Vec<f64> = samples.iter().map(Sample::magnitude).collect();
        let mean = magnitudes.iter().sum::<f64>() / n;
        let variance = magnitudes.iter().map(|m| (m - mean).powi(2)).sum::<f64>() / n;

        Self {
            sample_count: samples.len(),
            duration_ms,
            mean_magnitude: mean,
            magnitude_std_dev: variance.sqrt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerData {
    pub sense_start: Timestamp,
    /// Empty unless `RAW_DATA` was enabled.
    pub readings: Vec<Sample>,
    pub timestamps: Vec<Timestamp>,
    pub summary: MotionSummary,
    pub config: ConfigSnapshot,
}

impl SensorData for AccelerometerData {
    fn sensor_kind(&self) -> SensorKind {
        SensorKind::Accelerometer
    }

    fn sense_start(&self) -> Timestamp {
        self.sense_start
    }

    fn config(&self) -> &ConfigSnapshot {
        &self.config
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccelerometerProcessor;

impl Processor for AccelerometerProcessor {
    type Output = AccelerometerData;

    fn process(
        &self,
        sense_start: Timestamp,
        samples: &[Sample],
        timestamps: &[Timestamp],
        config: ConfigSnapshot,
    ) -> Result<AccelerometerData> {
        ensure!(
            samples.len() == timestamps.len(),
            "{} readings but {} timestamps",
            samples.len(),
            timestamps.len()
        );

        let summary = MotionSummary::from_readings(samples, timestamps);
        let (readings, timestamps) = if config.get_bool(RAW_DATA).unwrap_or(true) {
            (samples.to_vec(), timestamps.to_vec())
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(AccelerometerData {
            sense_start,
            readings,
            timestamps,
            summary,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manual::ManualSource;
    use approx::assert_relative_eq;

    fn ts(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    #[test]
    fn summary_of_constant_gravity() {
        let samples = vec![Sample::new(0.0, 0.0, 9.81); 4];
        let timestamps = vec![ts(100), ts(120), ts(140), ts(160)];
        let summary = MotionSummary::from_readings(&samples, &timestamps);

        assert_eq!(summary.sample_count, 4);
        assert_eq!(summary.duration_ms, 60);
        assert_relative_eq!(summary.mean_magnitude, 9.81, epsilon = 1e-5);
        assert_relative_eq!(summary.magnitude_std_dev, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn summary_spread_of_magnitudes() {
        let samples = vec![Sample::new(3.0, 4.0, 0.0), Sample::new(0.0, 0.0, 1.0)];
        let summary = MotionSummary::from_readings(&samples, &[ts(0), ts(10)]);
        // magnitudes 5 and 1
        assert_relative_eq!(summary.mean_magnitude, 3.0, epsilon = 1e-9);
        assert_relative_eq!(summary.magnitude_std_dev, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn processes_empty_session() {
        let data = AccelerometerProcessor
            .process(ts(5), &[], &[], SensorConfig::new().snapshot())
            .unwrap();
        assert_eq!(data.sense_start, ts(5));
        assert!(data.readings.is_empty());
        assert_eq!(data.summary, MotionSummary::default());
    }

    #[test]
    fn keeps_raw_readings_by_default() {
        let samples = [Sample::new(1.0, 0.0, 0.0), Sample::new(0.0, 1.0, 0.0)];
        let timestamps = [ts(10), ts(30)];
        let data = AccelerometerProcessor
            .process(ts(0), &samples, &timestamps, SensorConfig::new().snapshot())
            .unwrap();

        assert_eq!(data.readings, samples.to_vec());
        assert_eq!(data.timestamps, timestamps.to_vec());
        assert_eq!(data.sensor_kind(), SensorKind::Accelerometer);
        assert_eq!(data.summary.duration_ms, 20);
    }

    #[test]
    fn raw_data_can_be_disabled() {
        let mut config = SensorConfig::new();
        config.set_parameter(RAW_DATA, false);
        let data = AccelerometerProcessor
            .process(
                ts(0),
                &[Sample::new(0.0, 0.0, 2.0)],
                &[ts(1)],
                config.snapshot(),
            )
            .unwrap();

        assert!(data.readings.is_empty());
        assert!(data.timestamps.is_empty());
        assert_eq!(data.summary.sample_count, 1);
        assert_eq!(data.config().get_bool(RAW_DATA), Some(false));
    }

    #[test]
    fn rejects_misaligned_sequences() {
        let result = AccelerometerProcessor.process(
            ts(0),
            &[Sample::new(0.0, 0.0, 1.0)],
            &[],
            SensorConfig::new().snapshot(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn serializes_to_json() {
        let data = AccelerometerProcessor
            .process(
                ts(1_000),
                &[Sample::new(1.0, 2.0, 3.0)],
                &[ts(1_001)],
                SensorConfig::new().snapshot(),
            )
            .unwrap();
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"readings\":[[1.0,2.0,3.0]]"));
        assert!(json.contains("\"sense_start\":1000"));

        let back: AccelerometerData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn process_wide_controller_is_shared_until_shutdown() {
        let source = Arc::new(ManualSource::new());
        let first = accelerometer(source.clone());
        let again = accelerometer(Arc::new(ManualSource::rejecting()));
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(first.sensor_kind(), SensorKind::Accelerometer);

        assert!(first.start_sensing().unwrap());
        source.emit(SensorKind::Accelerometer, &[0.0, 9.81, 0.0]);
        let released = shutdown_accelerometer().unwrap();
        assert!(Arc::ptr_eq(&first, &released));
        assert!(!released.is_sensing());
        assert_eq!(released.get_most_recent_result().unwrap().summary.sample_count, 1);

        let fresh = accelerometer(source.clone());
        assert!(!Arc::ptr_eq(&first, &fresh));
        assert!(fresh.get_most_recent_result().is_none());
        shutdown_accelerometer();
    }
}
