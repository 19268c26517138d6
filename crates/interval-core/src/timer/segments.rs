use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A named duration in the playback sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    /// Duration in seconds. Zero is accepted; ties on a shared boundary resolve
    /// to the earliest segment.
    pub duration_secs: u64,
}

impl Segment {
    /// Build a segment, rejecting blank names.
    pub fn new(name: impl Into<String>, duration_secs: u64) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "segment name must not be empty".into(),
            });
        }
        Ok(Self {
            name,
            duration_secs,
        })
    }
}

/// Durable identifier assigned by a segment repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub i64);

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A segment as persisted, carrying its durable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSegment {
    pub id: SegmentId,
    #[serde(flatten)]
    pub segment: Segment,
}

/// Ordered list of segments. Insertion order is playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentList {
    entries: Vec<StoredSegment>,
}

impl SegmentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<StoredSegment>) -> Self {
        Self { entries }
    }

    pub fn add(&mut self, id: SegmentId, segment: Segment) {
        self.entries.push(StoredSegment { id, segment });
    }

    /// Remove the segment with the given id. Unknown ids are ignored.
    ///
    /// Returns whether anything was removed.
    pub fn remove_at(&mut self, id: SegmentId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn remove_all(&mut self) {
        self.entries.clear();
    }

    pub fn all(&self) -> &[StoredSegment] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&StoredSegment> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_secs(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.segment.duration_secs))
    }

    /// Prefix sums of the durations: entry `i` is the second at which segment `i` ends.
    ///
    /// Always derived fresh; callers must not hold on to it across a mutation.
    pub fn boundaries(&self) -> CumulativeBoundaries {
        let mut running = 0u64;
        let ends = self
            .entries
            .iter()
            .map(|e| {
                running = running.saturating_add(e.segment.duration_secs);
                running
            })
            .collect();
        CumulativeBoundaries(ends)
    }
}

/// Non-decreasing segment end offsets, in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeBoundaries(Vec<u64>);

impl CumulativeBoundaries {
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    /// Total length of one pass through the sequence; 0 when empty.
    pub fn total(&self) -> u64 {
        self.0.last().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(durations: &[u64]) -> SegmentList {
        let mut list = SegmentList::new();
        for (i, d) in durations.iter().enumerate() {
            list.add(
                SegmentId(i as i64 + 1),
                Segment::new(format!("S{}", i + 1), *d).unwrap(),
            );
        }
        list
    }

    #[test]
    fn boundaries_are_inclusive_prefix_sums() {
        let l = list(&[10, 20, 5]);
        assert_eq!(l.boundaries().as_slice(), &[10, 30, 35]);
        assert_eq!(l.boundaries().total(), 35);
        assert_eq!(l.total_secs(), 35);
    }

    #[test]
    fn empty_list_has_zero_total() {
        let l = SegmentList::new();
        assert!(l.boundaries().as_slice().is_empty());
        assert_eq!(l.boundaries().total(), 0);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let mut l = list(&[3, 3]);
        assert!(!l.remove_at(SegmentId(42)));
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let mut l = list(&[1, 2, 3]);
        assert!(l.remove_at(SegmentId(2)));
        let names: Vec<_> = l.all().iter().map(|e| e.segment.name.as_str()).collect();
        assert_eq!(names, vec!["S1", "S3"]);
        assert_eq!(l.boundaries().as_slice(), &[1, 4]);
    }

    #[test]
    fn remove_all_clears() {
        let mut l = list(&[1, 2]);
        l.remove_all();
        assert!(l.is_empty());
    }

    #[test]
    fn zero_duration_repeats_previous_boundary() {
        let l = list(&[3, 0, 4]);
        assert_eq!(l.boundaries().as_slice(), &[3, 3, 7]);
    }

    #[test]
    fn blank_name_rejected() {
        assert!(Segment::new("  ", 10).is_err());
    }
}
