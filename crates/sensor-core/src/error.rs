//! Error types for sensor controllers.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sample::SensorKind;

/// Why a reading was not added to the session buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// No session was running when the reading arrived.
    NotSensing,
    /// The intake queue was at capacity.
    IntakeFull,
    /// The intake consumer was gone.
    IntakeClosed,
    /// The hardware delivered fewer components than a sample needs.
    Malformed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DropReason::NotSensing => "not sensing",
            DropReason::IntakeFull => "intake full",
            DropReason::IntakeClosed => "intake closed",
            DropReason::Malformed => "malformed reading",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensing session already running")]
    AlreadySensing,

    #[error("no sensing session running")]
    NotSensing,

    #[error("hardware rejected {kind} listener registration")]
    RegistrationRejected { kind: SensorKind },

    #[error("sample dropped: {reason}")]
    DroppedSample { reason: DropReason },

    #[error("processing failed: {0}")]
    Processing(#[source] anyhow::Error),

    #[error("sample intake failed: {message}")]
    IntakeFailed { message: String },

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse sensor config: {message}")]
    ConfigParse { message: String },
}

impl SensorError {
    /// The drop reason, if this error is a dropped sample.
    pub fn drop_reason(&self) -> Option<DropReason> {
        match self {
            SensorError::DroppedSample { reason } => Some(*reason),
            _ => None,
        }
    }
}
