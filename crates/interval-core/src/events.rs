use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Position;

/// Every state change in the timer produces an Event.
/// Front ends print or forward them; notifiers react to `BoundaryCrossed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        elapsed_secs: u64,
        position: Option<Position>,
        at: DateTime<Utc>,
    },
    /// Timer was reset to idle. `elapsed_secs` is the value before the reset.
    TimerStopped {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// A tick landed exactly on the end of a segment.
    BoundaryCrossed {
        segment_index: usize,
        segment_name: String,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// A non-repeating sequence ran past its end and the timer went idle.
    SequenceFinished {
        elapsed_secs: u64,
        total_secs: u64,
        at: DateTime<Utc>,
    },
}
