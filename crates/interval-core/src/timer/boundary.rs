//! Position lookup over cumulative segment boundaries.
//!
//! Elapsed time is folded into `[1, total]` before lookup, so an exact multiple of
//! the sequence length lands on the final boundary rather than wrapping to the first
//! segment early.

use serde::{Deserialize, Serialize};

/// Active segment and the seconds left in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub segment_index: usize,
    pub remaining_secs: u64,
}

impl Position {
    /// True on the tick that lands exactly on a segment end.
    pub fn is_boundary(&self) -> bool {
        self.remaining_secs == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Position(Position),
    /// Non-repeating sequence ran past its end.
    Finished,
    /// Total length is zero; there is no active segment.
    Empty,
}

/// Fold `elapsed` into `[1, total]`. A multiple of `total` maps to `total`.
pub fn realign(elapsed_secs: u64, total: u64) -> u64 {
    debug_assert!(total > 0);
    match elapsed_secs % total {
        0 => total,
        rem => rem,
    }
}

/// Map elapsed seconds onto the boundary sequence.
pub fn locate(elapsed_secs: u64, cumulative: &[u64], repeat: bool) -> Lookup {
    let total = cumulative.last().copied().unwrap_or(0);
    if total == 0 {
        return Lookup::Empty;
    }
    if !repeat && elapsed_secs > total {
        return Lookup::Finished;
    }

    let realigned = realign(elapsed_secs, total);
    // First boundary at or after `realigned`; equal boundaries resolve to the lowest index.
    let segment_index = cumulative.partition_point(|&end| end < realigned);
    match cumulative.get(segment_index) {
        Some(&end) => Lookup::Position(Position {
            segment_index,
            remaining_secs: end - realigned,
        }),
        None => Lookup::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pos(segment_index: usize, remaining_secs: u64) -> Lookup {
        Lookup::Position(Position {
            segment_index,
            remaining_secs,
        })
    }

    #[test]
    fn repeat_wraps_after_exact_total() {
        let c = [10, 30];
        assert_eq!(locate(30, &c, true), pos(1, 0));
        assert_eq!(locate(31, &c, true), pos(0, 9));
        assert_eq!(locate(60, &c, true), pos(1, 0));
    }

    #[test]
    fn non_repeat_finishes_past_total() {
        let c = [5];
        assert_eq!(locate(5, &c, false), pos(0, 0));
        assert_eq!(locate(6, &c, false), Lookup::Finished);
    }

    #[test]
    fn first_second_of_each_segment() {
        let c = [10, 30];
        assert_eq!(locate(1, &c, false), pos(0, 9));
        assert_eq!(locate(10, &c, false), pos(0, 0));
        assert_eq!(locate(11, &c, false), pos(1, 19));
    }

    #[test]
    fn zero_total_is_empty() {
        assert_eq!(locate(3, &[], true), Lookup::Empty);
        assert_eq!(locate(3, &[0, 0], false), Lookup::Empty);
    }

    #[test]
    fn zero_duration_tie_picks_first() {
        // [3, 0, 4]
        let c = [3, 3, 7];
        assert_eq!(locate(3, &c, false), pos(0, 0));
        assert_eq!(locate(4, &c, false), pos(2, 3));
    }

    #[test]
    fn elapsed_zero_lands_on_last_boundary() {
        assert_eq!(locate(0, &[4, 9], true), pos(1, 0));
    }

    #[test]
    fn crossings_for_two_three_second_segments() {
        let c = [3, 6];
        let crossed: Vec<u64> = (1..=6)
            .filter(|&e| matches!(locate(e, &c, false), Lookup::Position(p) if p.is_boundary()))
            .collect();
        assert_eq!(crossed, vec![3, 6]);
    }

    fn durations() -> impl Strategy<Value = Vec<u64>> {
        prop::collection::vec(0u64..50, 1..8).prop_filter("non-zero total", |d| {
            d.iter().sum::<u64>() > 0
        })
    }

    fn prefix(d: &[u64]) -> Vec<u64> {
        d.iter()
            .scan(0u64, |acc, x| {
                *acc += x;
                Some(*acc)
            })
            .collect()
    }

    proptest! {
        #[test]
        fn index_is_first_boundary_at_or_after_elapsed(d in durations(), seed in 0u64..10_000) {
            let c = prefix(&d);
            let total = *c.last().unwrap();
            let e = seed % total + 1;
            match locate(e, &c, false) {
                Lookup::Position(p) => {
                    let i = p.segment_index;
                    prop_assert!(c[i] >= e);
                    prop_assert!(i == 0 || c[i - 1] < e);
                    prop_assert_eq!(p.remaining_secs, c[i] - e);
                }
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }

        #[test]
        fn repeat_lookup_is_periodic(d in durations(), e in 1u64..500, k in 0u64..20) {
            let c = prefix(&d);
            let total = *c.last().unwrap();
            prop_assert_eq!(locate(e, &c, true), locate(e + k * total, &c, true));
        }
    }
}
