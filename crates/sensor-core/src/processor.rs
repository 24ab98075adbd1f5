//! Turning a session's raw readings into a derived result.

use crate::config::ConfigSnapshot;
use crate::sample::{Sample, Timestamp};

/// Derives a result from one completed session.
///
/// Implementations exist per sensor kind. `samples` and `timestamps` have the
/// same length and are index-aligned in capture order; both may be empty.
pub trait Processor: Send + Sync {
    type Output: Clone + Send + Sync;

    fn process(
        &self,
        sense_start: Timestamp,
        samples: &[Sample],
        timestamps: &[Timestamp],
        config: ConfigSnapshot,
    ) -> anyhow::Result<Self::Output>;
}
