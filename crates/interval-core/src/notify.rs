//! Boundary-crossing notifiers.
//!
//! Each one is fire-and-forget: failures are logged, never returned to the tick loop.

use std::io::Write;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::ports::{BoundaryCrossing, Notifier};
use crate::storage::NotificationsConfig;

/// Rings the terminal bell (the "sound" effector for a console front end).
pub struct BellNotifier<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> BellNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl BellNotifier<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> Notifier for BellNotifier<W> {
    fn fire(&self, _crossing: &BoundaryCrossing) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = out.write_all(b"\x07").and_then(|_| out.flush()) {
            warn!(error = %e, "failed to ring bell");
        }
    }
}

/// Emits a log line per crossing, carrying the vibration pulse length for
/// front ends that forward it to a haptic device.
pub struct LogNotifier {
    pulse_ms: u64,
}

impl LogNotifier {
    pub fn new(pulse_ms: u64) -> Self {
        Self { pulse_ms }
    }
}

impl Notifier for LogNotifier {
    fn fire(&self, crossing: &BoundaryCrossing) {
        info!(
            segment_index = crossing.segment_index,
            segment = %crossing.segment_name,
            elapsed_secs = crossing.elapsed_secs,
            pulse_ms = self.pulse_ms,
            "segment boundary"
        );
    }
}

/// Forwards crossings to an async consumer without blocking.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<BoundaryCrossing>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BoundaryCrossing>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn fire(&self, crossing: &BoundaryCrossing) {
        if self.tx.send(crossing.clone()).is_err() {
            warn!("boundary receiver dropped");
        }
    }
}

/// Fans a crossing out to every inner notifier, in order.
#[derive(Default)]
pub struct CompositeNotifier {
    inner: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.inner.push(notifier);
        self
    }

    pub fn push(&mut self, notifier: Arc<dyn Notifier>) {
        self.inner.push(notifier);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Sound and vibration effectors as configured. Empty when notifications are off.
    pub fn from_config(config: &NotificationsConfig) -> Self {
        let mut composite = Self::new();
        if !config.enabled {
            return composite;
        }
        if config.bell {
            composite.push(Arc::new(BellNotifier::stderr()));
        }
        if config.vibration {
            composite.push(Arc::new(LogNotifier::new(config.vibration_ms)));
        }
        composite
    }
}

impl Notifier for CompositeNotifier {
    fn fire(&self, crossing: &BoundaryCrossing) {
        for notifier in &self.inner {
            notifier.fire(crossing);
        }
    }
}
