//! Collaborators the timer reads from and reports to.
//!
//! The runner never owns segment storage or the repeat preference; it holds a
//! `watch::Receiver` from each and reads the latest value on every tick, after
//! asking the source to `refresh` itself.

use tokio::sync::watch;

use crate::error::Result;
use crate::timer::{Segment, SegmentId, SegmentList};

/// What a notifier is told when a tick lands on a segment end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCrossing {
    pub segment_index: usize,
    pub segment_name: String,
    pub elapsed_secs: u64,
}

/// Sink for boundary crossings (sound, vibration, desktop notification...).
///
/// Called from the tick loop, outside the engine lock. Implementations must
/// return promptly; anything slow belongs on another task.
pub trait Notifier: Send + Sync {
    fn fire(&self, crossing: &BoundaryCrossing);
}

/// Durable, observable segment storage.
pub trait SegmentRepository: Send + Sync {
    /// Live view of the list. The receiver always holds the latest snapshot.
    fn observe(&self) -> watch::Receiver<SegmentList>;

    /// Current list, in playback order.
    fn list(&self) -> Result<SegmentList> {
        Ok(self.observe().borrow().clone())
    }

    /// Append a segment and return its durable id.
    fn insert(&self, segment: Segment) -> Result<SegmentId>;

    /// Remove by id. Unknown ids are a no-op; returns whether anything was removed.
    fn remove(&self, id: SegmentId) -> Result<bool>;

    fn clear(&self) -> Result<()>;

    /// Bring the observed list up to date with writes made outside this handle.
    ///
    /// Stores whose only writer is this handle keep the default no-op.
    fn refresh(&self) -> Result<()> {
        Ok(())
    }
}

/// Persisted repeat-mode flag.
pub trait RepeatPreference: Send + Sync {
    fn observe(&self) -> watch::Receiver<bool>;

    fn is_repeated(&self) -> bool {
        *self.observe().borrow()
    }

    /// Flip the flag and return the new value.
    fn toggle(&self) -> Result<bool>;

    /// Bring the observed flag up to date with writes made outside this handle.
    fn refresh(&self) -> Result<()> {
        Ok(())
    }
}
