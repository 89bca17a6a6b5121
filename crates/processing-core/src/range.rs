//! Time range selection.

use serde::{Deserialize, Serialize};
use stridelab_gait_model::bout::Bout;
use stridelab_gait_model::record::{TimestampNs, Timestamped};

/// A `[min, max]` time window; `max` is optionally exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub min_ns: TimestampNs,
    pub max_ns: TimestampNs,
    pub include_end: bool,
}

impl TimeRange {
    /// Closed range `[min, max]`.
    pub fn closed(min_ns: TimestampNs, max_ns: TimestampNs) -> Self {
        Self {
            min_ns,
            max_ns,
            include_end: true,
        }
    }

    /// Half-open range `[min, max)`.
    pub fn half_open(min_ns: TimestampNs, max_ns: TimestampNs) -> Self {
        Self {
            min_ns,
            max_ns,
            include_end: false,
        }
    }

    /// Timestamps strictly between a bout's start and end.
    pub fn inside_bout<K>(bout: &Bout<K>) -> Self {
        Self::closed(bout.start_ns + 1, bout.end_ns - 1)
    }

    pub fn contains(&self, t: TimestampNs) -> bool {
        t >= self.min_ns
            && if self.include_end {
                t <= self.max_ns
            } else {
                t < self.max_ns
            }
    }
}

/// Rows of `rows` whose timestamp lies in `range`, in their original order.
pub fn select_range<T: Timestamped + Clone>(rows: &[T], range: TimeRange) -> Vec<T> {
    rows.iter()
        .filter(|r| range.contains(r.timestamp_ns()))
        .cloned()
        .collect()
}

/// Apply one range to several series at once.
pub fn select_ranges<T: Timestamped + Clone>(series: &[&[T]], range: TimeRange) -> Vec<Vec<T>> {
    series.iter().map(|rows| select_range(rows, range)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_end_flag() {
        let rows: Vec<TimestampNs> = vec![0, 5, 10, 15];
        assert_eq!(select_range(&rows, TimeRange::closed(5, 10)), vec![5, 10]);
        assert_eq!(select_range(&rows, TimeRange::half_open(5, 10)), vec![5]);
    }

    #[test]
    fn test_multiple_series() {
        let a: Vec<TimestampNs> = vec![1, 2, 3];
        let b: Vec<TimestampNs> = vec![2, 4];
        let selected = select_ranges(&[a.as_slice(), b.as_slice()], TimeRange::closed(2, 3));
        assert_eq!(selected, vec![vec![2, 3], vec![2]]);
    }

    #[test]
    fn test_inside_bout_excludes_both_ends() {
        let bout = Bout {
            start_ns: 3,
            end_ns: 9,
            count: 2,
            valid: true,
            key: (),
        };
        let range = TimeRange::inside_bout(&bout);
        assert!(!range.contains(3));
        assert!(range.contains(4));
        assert!(range.contains(8));
        assert!(!range.contains(9));

        let rows: Vec<TimestampNs> = vec![3, 5, 9];
        assert_eq!(select_range(&rows, range), vec![5]);
    }
}
