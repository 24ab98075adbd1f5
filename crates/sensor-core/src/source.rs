//! The platform sensor service seen from a controller.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::sample::{SamplingDelay, SensorKind};

/// Receives the raw value vector of each hardware reading.
///
/// May be invoked from a platform thread, concurrently with application
/// threads. It must not panic and should return quickly.
pub type ReadingCallback = Arc<dyn Fn(&[f32]) + Send + Sync>;

/// Identity of a registered listener, used to unregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocates an id unique within the process.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Clone)]
pub struct Listener {
    pub id: ListenerId,
    pub callback: ReadingCallback,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Platform sensor registration.
pub trait HardwareSource: Send + Sync {
    /// Starts delivering readings of `kind` to `listener` at roughly `delay`.
    ///
    /// Returns `false` if the hardware refused the registration.
    fn register_listener(&self, listener: Listener, kind: SensorKind, delay: SamplingDelay) -> bool;

    /// Stops delivering to the listener. Unknown ids are ignored.
    fn unregister_listener(&self, id: ListenerId);
}
