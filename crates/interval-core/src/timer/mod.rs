mod boundary;
mod engine;
pub mod format;
mod runner;
mod segments;

pub use boundary::{locate, realign, Lookup, Position};
pub use engine::{TimerEngine, TimerSnapshot, TimerState};
pub use runner::{TimerRunner, TICK_PERIOD};
pub use segments::{CumulativeBoundaries, Segment, SegmentId, SegmentList, StoredSegment};
