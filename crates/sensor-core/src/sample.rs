//! Readings, timestamps, and the identifiers used to dispatch among sensors.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DropReason, SensorError};

/// Number of components in a motion reading.
pub const AXES: usize = 3;

/// One hardware reading. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample([f32; AXES]);

impl Sample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self([x, y, z])
    }

    /// Copies the first `AXES` components of a raw hardware vector.
    ///
    /// Extra components are ignored; a shorter vector is rejected as malformed.
    pub fn from_values(values: &[f32]) -> Result<Self, SensorError> {
        match values {
            [x, y, z, ..] => Ok(Self::new(*x, *y, *z)),
            _ => Err(SensorError::DroppedSample {
                reason: DropReason::Malformed,
            }),
        }
    }

    pub fn x(&self) -> f32 {
        self.0[0]
    }

    pub fn y(&self) -> f32 {
        self.0[1]
    }

    pub fn z(&self) -> f32 {
        self.0[2]
    }

    pub fn as_array(&self) -> &[f32; AXES] {
        &self.0
    }

    /// Euclidean norm of the reading.
    pub fn magnitude(&self) -> f64 {
        self.0
            .iter()
            .map(|v| f64::from(*v).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl From<[f32; AXES]> for Sample {
    fn from(values: [f32; AXES]) -> Self {
        Self(values)
    }
}

/// Wall-clock milliseconds since the Unix epoch at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`; negative if `earlier` is later.
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Identifies a sensor type for dispatch among controllers and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Magnetometer,
}

impl SensorKind {
    /// Stable numeric identifier.
    pub const fn id(&self) -> u32 {
        match self {
            SensorKind::Accelerometer => 5001,
            SensorKind::Gyroscope => 5002,
            SensorKind::Magnetometer => 5003,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            5001 => Some(SensorKind::Accelerometer),
            5002 => Some(SensorKind::Gyroscope),
            5003 => Some(SensorKind::Magnetometer),
            _ => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::Magnetometer => "magnetometer",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate hint passed to the hardware on registration.
///
/// The codes match the platform's delay constants, so a configured integer
/// can be forwarded unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SamplingDelay {
    Fastest,
    #[default]
    Game,
    Ui,
    Normal,
}

impl SamplingDelay {
    pub const fn code(&self) -> i64 {
        match self {
            SamplingDelay::Fastest => 0,
            SamplingDelay::Game => 1,
            SamplingDelay::Ui => 2,
            SamplingDelay::Normal => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(SamplingDelay::Fastest),
            1 => Some(SamplingDelay::Game),
            2 => Some(SamplingDelay::Ui),
            3 => Some(SamplingDelay::Normal),
            _ => None,
        }
    }

    /// Nominal interval between readings. `Fastest` is as fast as the hardware allows.
    pub const fn nominal_period(&self) -> Duration {
        match self {
            SamplingDelay::Fastest => Duration::ZERO,
            SamplingDelay::Game => Duration::from_micros(20_000),
            SamplingDelay::Ui => Duration::from_micros(66_667),
            SamplingDelay::Normal => Duration::from_micros(200_000),
        }
    }
}
