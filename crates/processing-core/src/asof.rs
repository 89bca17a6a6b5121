//! Temporal joiner: nearest-time alignment of two ordered series.
//!
//! For every row of the left series the joiner picks at most one row of
//! the right series:
//!
//! - **Backward:** the latest right row with `right.t <= left.t`.
//! - **Forward:** the earliest right row with `right.t >= left.t`.
//! - **Nearest:** whichever of the two candidates is closer (backward wins
//!   ties).
//!
//! A candidate further away than the tolerance (inclusive) is discarded.
//! With duplicated right timestamps, backward picks the last duplicate and
//! forward the first. Both series must be sorted ascending (within each key
//! group for keyed joins); this is a precondition checked only in debug
//! builds.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use stridelab_common::error::{ensure_same_len, StrideResult};
use stridelab_gait_model::record::{DurationNs, TimestampNs, Timestamped};

/// Search direction of the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JoinDirection {
    #[default]
    Backward,
    Forward,
    Nearest,
}

/// Asof-style temporal joiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalJoiner {
    direction: JoinDirection,
    tolerance_ns: Option<DurationNs>,
}

impl TemporalJoiner {
    pub fn new(direction: JoinDirection) -> Self {
        Self {
            direction,
            tolerance_ns: None,
        }
    }

    pub fn backward() -> Self {
        Self::new(JoinDirection::Backward)
    }

    pub fn forward() -> Self {
        Self::new(JoinDirection::Forward)
    }

    pub fn nearest() -> Self {
        Self::new(JoinDirection::Nearest)
    }

    /// Limit matches to `|left.t - right.t| <= tolerance_ns`.
    pub fn with_tolerance(mut self, tolerance_ns: DurationNs) -> Self {
        self.tolerance_ns = Some(tolerance_ns);
        self
    }

    pub fn direction(&self) -> JoinDirection {
        self.direction
    }

    pub fn tolerance_ns(&self) -> Option<DurationNs> {
        self.tolerance_ns
    }

    /// Match each left timestamp to an index into `right`.
    pub fn match_times(&self, left: &[TimestampNs], right: &[TimestampNs]) -> Vec<Option<usize>> {
        debug_assert!(is_sorted(left), "left series must be sorted by time");
        debug_assert!(is_sorted(right), "right series must be sorted by time");

        left.iter().map(|&t| self.match_one(t, right)).collect()
    }

    /// Keyed variant: a right row is only a candidate when its key equals
    /// the left row's key. Series must be sorted within each key group.
    pub fn match_times_by<K: Eq + Hash>(
        &self,
        left: &[TimestampNs],
        left_keys: &[K],
        right: &[TimestampNs],
        right_keys: &[K],
    ) -> StrideResult<Vec<Option<usize>>> {
        ensure_same_len("left join keys", left.len(), left_keys.len())?;
        ensure_same_len("right join keys", right.len(), right_keys.len())?;

        // Per-key sorted timestamps and their original right indices.
        let mut groups: HashMap<&K, (Vec<TimestampNs>, Vec<usize>)> = HashMap::new();
        for (idx, (t, key)) in right.iter().zip(right_keys).enumerate() {
            let group = groups.entry(key).or_default();
            group.0.push(*t);
            group.1.push(idx);
        }
        debug_assert!(
            groups.values().all(|(times, _)| is_sorted(times)),
            "right series must be sorted by time within each key"
        );

        Ok(left
            .iter()
            .zip(left_keys)
            .map(|(&t, key)| {
                let (times, indices) = groups.get(key)?;
                self.match_one(t, times).map(|pos| indices[pos])
            })
            .collect())
    }

    /// Join two record sequences, pairing each left row with its match.
    pub fn join<'a, L: Timestamped, R: Timestamped>(
        &self,
        left: &'a [L],
        right: &'a [R],
    ) -> Vec<(&'a L, Option<&'a R>)> {
        let left_times: Vec<TimestampNs> = left.iter().map(Timestamped::timestamp_ns).collect();
        let right_times: Vec<TimestampNs> = right.iter().map(Timestamped::timestamp_ns).collect();

        self.match_times(&left_times, &right_times)
            .into_iter()
            .zip(left)
            .map(|(m, row)| (row, m.map(|idx| &right[idx])))
            .collect()
    }

    fn match_one(&self, t: TimestampNs, right: &[TimestampNs]) -> Option<usize> {
        let candidate = match self.direction {
            JoinDirection::Backward => backward_candidate(t, right),
            JoinDirection::Forward => forward_candidate(t, right),
            JoinDirection::Nearest => {
                match (backward_candidate(t, right), forward_candidate(t, right)) {
                    (Some(b), Some(f)) => {
                        if t - right[b] <= right[f] - t {
                            Some(b)
                        } else {
                            Some(f)
                        }
                    }
                    (b, f) => b.or(f),
                }
            }
        }?;

        match self.tolerance_ns {
            Some(tol) if (right[candidate] - t).abs() > tol => None,
            _ => Some(candidate),
        }
    }
}

/// Last index with `right[idx] <= t`.
fn backward_candidate(t: TimestampNs, right: &[TimestampNs]) -> Option<usize> {
    right.partition_point(|&r| r <= t).checked_sub(1)
}

/// First index with `right[idx] >= t`.
fn forward_candidate(t: TimestampNs, right: &[TimestampNs]) -> Option<usize> {
    let idx = right.partition_point(|&r| r < t);
    (idx < right.len()).then_some(idx)
}

pub(crate) fn is_sorted<T: PartialOrd>(values: &[T]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_picks_latest_not_after() {
        let joiner = TemporalJoiner::backward();
        let matches = joiner.match_times(&[5, 10, 25], &[0, 10, 20]);
        assert_eq!(matches, vec![Some(0), Some(1), Some(2)]);

        let matches = joiner.match_times(&[-1], &[0, 10]);
        assert_eq!(matches, vec![None]);
    }

    #[test]
    fn test_forward_picks_earliest_not_before() {
        let joiner = TemporalJoiner::forward();
        let matches = joiner.match_times(&[5, 10, 25], &[0, 10, 20]);
        assert_eq!(matches, vec![Some(1), Some(1), None]);
    }

    #[test]
    fn test_duplicate_right_timestamps() {
        let right = [0, 10, 10, 10, 20];
        assert_eq!(
            TemporalJoiner::backward().match_times(&[10], &right),
            vec![Some(3)]
        );
        assert_eq!(
            TemporalJoiner::forward().match_times(&[10], &right),
            vec![Some(1)]
        );
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let joiner = TemporalJoiner::backward().with_tolerance(5);
        let matches = joiner.match_times(&[15, 16], &[10]);
        assert_eq!(matches, vec![Some(0), None]);

        let joiner = TemporalJoiner::forward().with_tolerance(5);
        let matches = joiner.match_times(&[4, 5], &[10]);
        assert_eq!(matches, vec![None, Some(0)]);
    }

    #[test]
    fn test_nearest_prefers_backward_on_tie() {
        let joiner = TemporalJoiner::nearest();
        let matches = joiner.match_times(&[3, 5, 7, 30], &[0, 10]);
        assert_eq!(matches, vec![Some(0), Some(0), Some(1), Some(1)]);

        let joiner = TemporalJoiner::nearest().with_tolerance(4);
        assert_eq!(joiner.match_times(&[5], &[0, 10]), vec![None]);
    }

    #[test]
    fn test_keyed_join_respects_keys() {
        let joiner = TemporalJoiner::backward();
        let right = [0, 1, 2, 3];
        let right_keys = ["a", "b", "a", "b"];
        let matches = joiner
            .match_times_by(&[2, 2, 5], &["a", "b", "c"], &right, &right_keys)
            .unwrap();
        assert_eq!(matches, vec![Some(2), Some(1), None]);
    }

    #[test]
    fn test_keyed_join_length_mismatch_is_invalid_argument() {
        let joiner = TemporalJoiner::backward();
        let err = joiner
            .match_times_by(&[1, 2], &["a"], &[0], &["a"])
            .unwrap_err();
        assert!(err.to_string().contains("left join keys"));
    }

    #[test]
    fn test_join_records_and_empty_inputs() {
        let joiner = TemporalJoiner::backward().with_tolerance(3);
        let left: Vec<TimestampNs> = vec![1, 8];
        let right: Vec<TimestampNs> = vec![0, 4];
        let joined = joiner.join(&left, &right);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].1, Some(&0));
        assert_eq!(joined[1].1, None);

        assert!(joiner.match_times(&[], &[1, 2]).is_empty());
        assert_eq!(joiner.match_times(&[1, 2], &[]), vec![None, None]);
    }
}
