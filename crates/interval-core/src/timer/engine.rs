//! Timer engine implementation.
//!
//! The engine is a tick-counting state machine. It does not own a clock -
//! the caller (usually [`TimerRunner`](super::TimerRunner)) calls `tick()` once per
//! second and hands it the latest segment list and repeat flag.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running
//!   ^        |          |
//!   +--------+----------+   stop() / sequence finished
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.start();
//! // Once per second:
//! engine.tick(&segments, repeat); // Some(Event) on a boundary or at the end
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::boundary::{locate, Lookup, Position};
use super::segments::SegmentList;
use crate::events::Event;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Point-in-time view of the engine for front ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub elapsed_secs: u64,
    pub repeat: bool,
    pub position: Option<Position>,
    pub segment_name: Option<String>,
}

impl TimerSnapshot {
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }
}

/// Core timer engine.
#[derive(Debug, Clone, Default)]
pub struct TimerEngine {
    state: TimerState,
    elapsed_secs: u64,
    repeat: bool,
    position: Option<Position>,
    segment_name: Option<String>,
}

impl TimerEngine {
    /// Create an idle engine with nothing elapsed.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Mirror the repeat preference without ticking, so idle snapshots show it.
    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            elapsed_secs: self.elapsed_secs,
            repeat: self.repeat,
            position: self.position,
            segment_name: self.segment_name.clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let at = Utc::now();
        match self.state {
            TimerState::Idle => {
                self.state = TimerState::Running;
                info!("timer started");
                Some(Event::TimerStarted {
                    elapsed_secs: self.elapsed_secs,
                    at,
                })
            }
            TimerState::Paused => {
                self.state = TimerState::Running;
                info!(elapsed_secs = self.elapsed_secs, "timer resumed");
                Some(Event::TimerResumed {
                    elapsed_secs: self.elapsed_secs,
                    at,
                })
            }
            TimerState::Running => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        // Nothing elapsed yet: there is nothing to retain.
        self.state = if self.elapsed_secs == 0 {
            TimerState::Idle
        } else {
            TimerState::Paused
        };
        info!(elapsed_secs = self.elapsed_secs, "timer paused");
        Some(Event::TimerPaused {
            elapsed_secs: self.elapsed_secs,
            position: self.position,
            at: Utc::now(),
        })
    }

    /// Reset to idle from any state.
    pub fn stop(&mut self) -> Event {
        let elapsed_secs = self.elapsed_secs;
        self.state = TimerState::Idle;
        self.elapsed_secs = 0;
        self.position = None;
        self.segment_name = None;
        info!(elapsed_secs, "timer stopped");
        Event::TimerStopped {
            elapsed_secs,
            at: Utc::now(),
        }
    }

    /// Advance one second against the latest segment list and repeat flag.
    ///
    /// Returns `BoundaryCrossed` when the tick lands on a segment end and
    /// `SequenceFinished` when a non-repeating sequence runs out (the engine is
    /// idle afterwards). Ticks while not running are ignored.
    pub fn tick(&mut self, segments: &SegmentList, repeat: bool) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        self.repeat = repeat;

        let boundaries = segments.boundaries();
        match locate(self.elapsed_secs, boundaries.as_slice(), repeat) {
            Lookup::Empty => {
                debug!(
                    elapsed_secs = self.elapsed_secs,
                    segments = segments.len(),
                    "no active segment, tick ignored"
                );
                None
            }
            Lookup::Finished => {
                let elapsed_secs = self.elapsed_secs;
                self.stop();
                info!(elapsed_secs, "sequence finished");
                Some(Event::SequenceFinished {
                    elapsed_secs,
                    total_secs: boundaries.total(),
                    at: Utc::now(),
                })
            }
            Lookup::Position(position) => {
                let name = segments
                    .get(position.segment_index)
                    .map(|entry| entry.segment.name.clone())
                    .unwrap_or_default();
                debug!(
                    elapsed_secs = self.elapsed_secs,
                    segment_index = position.segment_index,
                    remaining_secs = position.remaining_secs,
                    "tick"
                );
                self.position = Some(position);
                self.segment_name = Some(name.clone());

                if position.is_boundary() {
                    Some(Event::BoundaryCrossed {
                        segment_index: position.segment_index,
                        segment_name: name,
                        elapsed_secs: self.elapsed_secs,
                        at: Utc::now(),
                    })
                } else {
                    None
                }
            }
        }
    }
}
