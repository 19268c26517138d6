//! In-memory segment repository and repeat preference.

use std::sync::Mutex;

use tokio::sync::watch;

use crate::error::Result;
use crate::ports::{RepeatPreference, SegmentRepository};
use crate::timer::{Segment, SegmentId, SegmentList};

/// Volatile store implementing both ports. Ids start at 1 and are never reused.
pub struct MemoryStore {
    segments: watch::Sender<SegmentList>,
    repeat: watch::Sender<bool>,
    next_id: Mutex<i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_repeat(false)
    }

    pub fn with_repeat(repeat: bool) -> Self {
        Self {
            segments: watch::Sender::new(SegmentList::new()),
            repeat: watch::Sender::new(repeat),
            next_id: Mutex::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentRepository for MemoryStore {
    fn observe(&self) -> watch::Receiver<SegmentList> {
        self.segments.subscribe()
    }

    fn insert(&self, segment: Segment) -> Result<SegmentId> {
        let id = {
            let mut next = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
            let id = SegmentId(*next);
            *next += 1;
            id
        };
        self.segments.send_modify(|list| list.add(id, segment));
        Ok(id)
    }

    fn remove(&self, id: SegmentId) -> Result<bool> {
        let mut removed = false;
        self.segments.send_if_modified(|list| {
            removed = list.remove_at(id);
            removed
        });
        Ok(removed)
    }

    fn clear(&self) -> Result<()> {
        self.segments.send_modify(SegmentList::remove_all);
        Ok(())
    }
}

impl RepeatPreference for MemoryStore {
    fn observe(&self) -> watch::Receiver<bool> {
        self.repeat.subscribe()
    }

    fn toggle(&self) -> Result<bool> {
        let mut now = false;
        self.repeat.send_modify(|flag| {
            *flag = !*flag;
            now = *flag;
        });
        Ok(now)
    }
}
