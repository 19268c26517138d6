//! # Interval Core Library
//!
//! This library provides the core logic for the Interval segment timer.
//! A timer plays an ordered list of named segments, reports which one is active
//! and how long it has left, signals every segment boundary, and optionally loops.
//! The CLI binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-counting state machine; the caller supplies the
//!   latest segment list and repeat flag on every `tick()`
//! - **Timer Runner**: Owns the one-second tick loop on a tokio runtime and
//!   publishes snapshots and events
//! - **Ports**: Traits for segment storage, the repeat preference and notifiers
//! - **Storage**: SQLite and in-memory stores, TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerRunner`]: Periodic driver with cancellable tick loop
//! - [`SegmentStore`]: Persistent segment list and repeat flag
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod notify;
pub mod ports;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use ports::{BoundaryCrossing, Notifier, RepeatPreference, SegmentRepository};
pub use storage::{Config, MemoryStore, SegmentStore};
pub use timer::{
    Position, Segment, SegmentId, SegmentList, TimerEngine, TimerRunner, TimerSnapshot,
    TimerState,
};
