//! Bout table rows.
//!
//! A bout is a maximal contiguous run of samples sharing one validity
//! state (and, optionally, one group key). Bouts of one group are in time
//! order and do not overlap.

use serde::{Deserialize, Serialize};

use crate::record::{DurationNs, Session, TimestampNs};

/// One row of a bout table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bout<K = ()> {
    /// Earliest sample timestamp in the bout.
    #[serde(rename = "t_start")]
    pub start_ns: TimestampNs,

    /// Latest sample timestamp in the bout.
    #[serde(rename = "t_end")]
    pub end_ns: TimestampNs,

    /// Number of samples in the bout (>= 1 for extracted bouts).
    pub count: usize,

    /// Validity state shared by every sample of the bout.
    pub valid: bool,

    /// Extra grouping key shared by every sample of the bout.
    pub key: K,
}

impl<K> Bout<K> {
    pub fn duration_ns(&self) -> DurationNs {
        self.end_ns - self.start_ns
    }

    /// Whether `t` lies in the half-open window `[start, end)`.
    pub fn window_contains(&self, t: TimestampNs) -> bool {
        t >= self.start_ns && t < self.end_ns
    }

    /// Replace the group key, keeping the window and flags.
    pub fn map_key<J>(self, f: impl FnOnce(K) -> J) -> Bout<J> {
        Bout {
            start_ns: self.start_ns,
            end_ns: self.end_ns,
            count: self.count,
            valid: self.valid,
            key: f(self.key),
        }
    }
}

impl Session {
    /// View the session as a bout keyed by its id.
    ///
    /// The sample count is unknown for session tables and reported as 0.
    pub fn as_bout(&self) -> Bout<String> {
        Bout {
            start_ns: self.start_ns,
            end_ns: self.end_ns,
            count: 0,
            valid: true,
            key: self.session_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_half_open() {
        let bout = Bout {
            start_ns: 10,
            end_ns: 20,
            count: 3,
            valid: true,
            key: (),
        };
        assert!(bout.window_contains(10));
        assert!(bout.window_contains(19));
        assert!(!bout.window_contains(20));
        assert_eq!(bout.duration_ns(), 10);
    }

    #[test]
    fn test_session_as_bout_carries_id() {
        let session = Session {
            session_id: "run-1".to_string(),
            start_ns: 0,
            end_ns: 100,
        };
        let bout = session.as_bout();
        assert_eq!(bout.key, "run-1");
        assert!(bout.valid);
        assert_eq!(bout.map_key(|k| k.len()).key, 5);
    }
}
