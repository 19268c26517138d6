//! Periodic driver for [`TimerEngine`].
//!
//! One tokio task ticks the engine once per second. Every engine mutation goes
//! through a single mutex; commands bump a generation counter under that lock so a
//! superseded tick loop exits instead of touching state, even if it was already
//! past its await point when the handle was aborted.
//!
//! Before reading the segment list and repeat flag, each tick asks both sources
//! to refresh, so edits made through another handle (another process writing
//! the same database) are seen on the next tick.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::engine::{TimerEngine, TimerSnapshot};
use super::segments::SegmentList;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::ports::{BoundaryCrossing, Notifier, RepeatPreference, SegmentRepository};

/// Fixed tick granularity. Each tick counts as exactly one elapsed second.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const EVENT_CAPACITY: usize = 64;

struct Shared {
    engine: TimerEngine,
    generation: u64,
}

struct Inner {
    shared: Mutex<Shared>,
    segment_source: Arc<dyn SegmentRepository>,
    repeat_source: Arc<dyn RepeatPreference>,
    segments: watch::Receiver<SegmentList>,
    repeat: watch::Receiver<bool>,
    notifier: Arc<dyn Notifier>,
    snapshots: watch::Sender<TimerSnapshot>,
    events: broadcast::Sender<Event>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Called with the state lock held so snapshots are published in mutation order.
    fn publish_snapshot(&self, shared: &Shared) {
        let next = shared.engine.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    /// A failed refresh keeps the last observed value.
    fn refresh_repeat(&self) -> bool {
        if let Err(e) = self.repeat_source.refresh() {
            warn!(error = %e, "failed to refresh repeat preference");
        }
        *self.repeat.borrow()
    }

    fn refresh_segments(&self) -> SegmentList {
        if let Err(e) = self.segment_source.refresh() {
            warn!(error = %e, "failed to refresh segment list");
        }
        self.segments.borrow().clone()
    }

    fn emit(&self, event: Option<Event>) {
        if let Some(event) = event {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    /// Run one tick for loop `generation`. Returns false when the loop should exit.
    fn tick(&self, generation: u64) -> bool {
        // Latest values, read fresh on every tick.
        let segments = self.refresh_segments();
        let repeat = self.refresh_repeat();

        let (event, keep_running) = {
            let mut shared = self.lock();
            if shared.generation != generation || !shared.engine.is_running() {
                debug!(generation, "stale tick loop exiting");
                return false;
            }
            let event = shared.engine.tick(&segments, repeat);
            self.publish_snapshot(&shared);
            (event, shared.engine.is_running())
        };

        if let Some(Event::BoundaryCrossed {
            segment_index,
            segment_name,
            elapsed_secs,
            ..
        }) = &event
        {
            self.notifier.fire(&BoundaryCrossing {
                segment_index: *segment_index,
                segment_name: segment_name.clone(),
                elapsed_secs: *elapsed_secs,
            });
        }
        self.emit(event);
        keep_running
    }
}

async fn tick_loop(inner: Arc<Inner>, generation: u64) {
    let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    // A late tick is not followed by a catch-up burst.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if !inner.tick(generation) {
            break;
        }
    }
}

/// Owns the tick loop for one engine.
///
/// `start`, `pause` and `stop` are synchronous and may be called from any thread;
/// the loop itself runs on the tokio runtime the runner was created in.
pub struct TimerRunner {
    inner: Arc<Inner>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    runtime: Handle,
}

impl TimerRunner {
    /// Build a runner on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`CoreError::Runtime`] when called outside a tokio runtime.
    pub fn new(
        segments: Arc<dyn SegmentRepository>,
        repeat: Arc<dyn RepeatPreference>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| CoreError::Runtime(e.to_string()))?;
        Ok(Self::with_handle(runtime, segments, repeat, notifier))
    }

    /// Build a runner whose tick loop is spawned on `runtime`.
    pub fn with_handle(
        runtime: Handle,
        segments: Arc<dyn SegmentRepository>,
        repeat: Arc<dyn RepeatPreference>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let repeat_rx = repeat.observe();
        let mut engine = TimerEngine::new();
        engine.set_repeat(*repeat_rx.borrow());
        let (snapshots, _) = watch::channel(engine.snapshot());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    engine,
                    generation: 0,
                }),
                segments: segments.observe(),
                repeat: repeat_rx,
                segment_source: segments,
                repeat_source: repeat,
                notifier,
                snapshots,
                events,
            }),
            ticker: Mutex::new(None),
            runtime,
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Current state, with the repeat flag refreshed from the preference.
    ///
    /// A changed flag is also published to subscribers.
    pub fn snapshot(&self) -> TimerSnapshot {
        let repeat = self.inner.refresh_repeat();
        let mut shared = self.inner.lock();
        shared.engine.set_repeat(repeat);
        self.inner.publish_snapshot(&shared);
        shared.engine.snapshot()
    }

    /// Receiver that is updated after every command and tick.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.inner.snapshots.subscribe()
    }

    /// Stream of transitions and boundary crossings.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. Calling it while running restarts the tick loop.
    pub fn start(&self) -> Option<Event> {
        let mut ticker = self.lock_ticker();
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let (event, generation) = {
            let mut shared = self.inner.lock();
            shared.generation += 1;
            let event = shared.engine.start();
            self.inner.publish_snapshot(&shared);
            (event, shared.generation)
        };

        *ticker = Some(
            self.runtime
                .spawn(tick_loop(Arc::clone(&self.inner), generation)),
        );
        self.inner.emit(event.clone());
        event
    }

    /// Pause, keeping elapsed time and position.
    pub fn pause(&self) -> Option<Event> {
        let event = self.cancel_then(TimerEngine::pause);
        self.inner.emit(event.clone());
        event
    }

    /// Reset to idle from any state.
    pub fn stop(&self) -> Event {
        let event = self.cancel_then(TimerEngine::stop);
        self.inner.emit(Some(event.clone()));
        event
    }

    /// Whether a tick loop task is currently alive.
    pub fn has_ticker(&self) -> bool {
        self.lock_ticker()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn cancel_then<T>(&self, command: impl FnOnce(&mut TimerEngine) -> T) -> T {
        let mut ticker = self.lock_ticker();
        if let Some(handle) = ticker.take() {
            handle.abort();
        }
        let mut shared = self.inner.lock();
        shared.generation += 1;
        let out = command(&mut shared.engine);
        self.inner.publish_snapshot(&shared);
        out
    }

    fn lock_ticker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(|poisoned| {
            warn!("ticker lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Drop for TimerRunner {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_ticker().take() {
            handle.abort();
        }
    }
}
