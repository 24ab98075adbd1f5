//! Timestamp-paired sample storage for one sensing session.

use crate::sample::{Sample, Timestamp};

/// Two parallel sequences of readings and capture times, in capture order.
///
/// Both sequences always have the same length. There is no removal: a buffer
/// is discarded wholesale when the next session starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    timestamps: Vec<Timestamp>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            timestamps: Vec::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, sample: Sample, timestamp: Timestamp) {
        self.samples.push(sample);
        self.timestamps.push(timestamp);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Copies the current contents.
    pub fn snapshot(&self) -> (Vec<Sample>, Vec<Timestamp>) {
        (self.samples.clone(), self.timestamps.clone())
    }

    pub fn into_parts(self) -> (Vec<Sample>, Vec<Timestamp>) {
        (self.samples, self.timestamps)
    }
}
