//! Sensing parameters.
//!
//! A `SensorConfig` is a flat bag of named parameters that the scheduling
//! layer may change at any time. Processors never see it directly; they get a
//! `ConfigSnapshot` taken when the session is processed.
//!
//! # Example Config
//!
//! ```toml
//! SAMPLING_DELAY = 1
//! SENSE_WINDOW_LENGTH_MILLIS = 8000
//! INTAKE_CAPACITY = 4096
//! RAW_DATA = true
//! ```

use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SensorError;
use crate::sample::SamplingDelay;

/// Platform rate hint code, see [`SamplingDelay::from_code`].
pub const SAMPLING_DELAY: &str = "SAMPLING_DELAY";
/// Length of one sense cycle.
pub const SENSE_WINDOW_LENGTH_MILLIS: &str = "SENSE_WINDOW_LENGTH_MILLIS";
/// Bound of the queue between the hardware callback and the session buffer.
pub const INTAKE_CAPACITY: &str = "INTAKE_CAPACITY";

pub const DEFAULT_SENSE_WINDOW_LENGTH_MILLIS: u64 = 8_000;
pub const DEFAULT_INTAKE_CAPACITY: usize = 4_096;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Live, mutable sensing parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorConfig {
    params: BTreeMap<String, ParamValue>,
}

impl SensorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat TOML table of parameters.
    pub fn from_toml_str(contents: &str) -> Result<Self, SensorError> {
        let params: BTreeMap<String, ParamValue> =
            toml::from_str(contents).map_err(|e| SensorError::ConfigParse {
                message: e.to_string(),
            })?;
        Ok(Self { params })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SensorError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SensorError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn contains_parameter(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn get_parameter(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn set_parameter(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn remove_parameter(&mut self, key: &str) -> Option<ParamValue> {
        self.params.remove(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        match self.params.get(key)? {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.params.get(key)? {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.params.get(key)? {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.params.get(key)? {
            ParamValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Rate hint for hardware registration; `Game` when absent or unrecognised.
    pub fn sampling_delay(&self) -> SamplingDelay {
        if !self.contains_parameter(SAMPLING_DELAY) {
            return SamplingDelay::default();
        }
        match self.get_i64(SAMPLING_DELAY).and_then(SamplingDelay::from_code) {
            Some(delay) => delay,
            None => {
                warn!(value = ?self.get_parameter(SAMPLING_DELAY), "unrecognised sampling delay, using default");
                SamplingDelay::default()
            }
        }
    }

    pub fn sense_window(&self) -> Duration {
        let millis = self
            .get_i64(SENSE_WINDOW_LENGTH_MILLIS)
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(DEFAULT_SENSE_WINDOW_LENGTH_MILLIS);
        Duration::from_millis(millis)
    }

    pub fn intake_capacity(&self) -> usize {
        self.get_i64(INTAKE_CAPACITY)
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_INTAKE_CAPACITY)
    }

    /// Immutable copy for a processor call.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot(self.clone())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Read-only copy of a `SensorConfig`, decoupled from later changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot(SensorConfig);

impl Deref for ConfigSnapshot {
    type Target = SensorConfig;

    fn deref(&self) -> &SensorConfig {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_parameters_fall_back_to_defaults() {
        let config = SensorConfig::new();
        assert!(!config.contains_parameter(SAMPLING_DELAY));
        assert_eq!(config.sampling_delay(), SamplingDelay::Game);
        assert_eq!(config.sense_window(), Duration::from_millis(8_000));
        assert_eq!(config.intake_capacity(), DEFAULT_INTAKE_CAPACITY);
    }

    #[test]
    fn configured_sampling_delay_is_used() {
        let mut config = SensorConfig::new();
        config.set_parameter(SAMPLING_DELAY, 3i64);
        assert_eq!(config.sampling_delay(), SamplingDelay::Normal);

        config.set_parameter(SAMPLING_DELAY, 99i64);
        assert_eq!(config.sampling_delay(), SamplingDelay::Game);

        config.set_parameter(SAMPLING_DELAY, "fast");
        assert_eq!(config.sampling_delay(), SamplingDelay::Game);
    }

    #[test]
    fn invalid_capacity_and_window_are_ignored() {
        let mut config = SensorConfig::new();
        config.set_parameter(INTAKE_CAPACITY, 0i64);
        config.set_parameter(SENSE_WINDOW_LENGTH_MILLIS, -5i64);
        assert_eq!(config.intake_capacity(), DEFAULT_INTAKE_CAPACITY);
        assert_eq!(config.sense_window(), Duration::from_millis(8_000));
    }

    #[test]
    fn typed_getters() {
        let mut config = SensorConfig::new();
        config.set_parameter("a", true);
        config.set_parameter("b", 7i64);
        config.set_parameter("c", 0.5);
        config.set_parameter("d", "text");

        assert_eq!(config.get_bool("a"), Some(true));
        assert_eq!(config.get_i64("b"), Some(7));
        assert_eq!(config.get_f64("b"), Some(7.0));
        assert_eq!(config.get_f64("c"), Some(0.5));
        assert_eq!(config.get_str("d"), Some("text"));
        assert_eq!(config.get_i64("a"), None);
        assert_eq!(config.len(), 4);
        assert_eq!(config.remove_parameter("a"), Some(ParamValue::Bool(true)));
        assert!(!config.contains_parameter("a"));
    }

    #[test]
    fn snapshot_does_not_follow_live_changes() {
        let mut config = SensorConfig::new();
        config.set_parameter(SAMPLING_DELAY, 0i64);
        let snapshot = config.snapshot();
        config.set_parameter(SAMPLING_DELAY, 2i64);

        assert_eq!(snapshot.sampling_delay(), SamplingDelay::Fastest);
        assert_eq!(config.sampling_delay(), SamplingDelay::Ui);
    }

    #[test]
    fn parses_flat_toml() {
        let config = SensorConfig::from_toml_str(
            r#"
            SAMPLING_DELAY = 2
            SENSE_WINDOW_LENGTH_MILLIS = 500
            RAW_DATA = false
            LABEL = "wrist"
            GAIN = 1.5
            "#,
        )
        .unwrap();

        assert_eq!(config.sampling_delay(), SamplingDelay::Ui);
        assert_eq!(config.sense_window(), Duration::from_millis(500));
        assert_eq!(config.get_bool("RAW_DATA"), Some(false));
        assert_eq!(config.get_str("LABEL"), Some("wrist"));
        assert_eq!(config.get_f64("GAIN"), Some(1.5));
    }

    #[test]
    fn nested_tables_are_rejected() {
        let err = SensorConfig::from_toml_str("[section]\nkey = 1\n").unwrap_err();
        assert!(matches!(err, SensorError::ConfigParse { .. }));
    }

    #[test]
    fn load_from_file_reads_parameters() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "INTAKE_CAPACITY = 16").unwrap();
        let config = SensorConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.intake_capacity(), 16);

        let missing = SensorConfig::load_from_file(Path::new("/nonexistent/sensor.toml"));
        assert!(matches!(missing, Err(SensorError::ConfigRead { .. })));
    }
}
