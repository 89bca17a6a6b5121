//! Time-stamped sensor records consumed by the analysis crates.
//!
//! Records are exchanged as JSONL (one JSON object per line). Decoding the
//! raw device protocol into these shapes happens upstream; this module
//! only defines the shapes and the line format.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Timestamp in nanoseconds (Unix epoch or session-relative).
pub type TimestampNs = i64;

/// Signed duration in nanoseconds.
pub type DurationNs = i64;

/// Anything that sits at a point in time.
pub trait Timestamped {
    fn timestamp_ns(&self) -> TimestampNs;
}

impl Timestamped for TimestampNs {
    fn timestamp_ns(&self) -> TimestampNs {
        *self
    }
}

impl<T: Timestamped> Timestamped for &T {
    fn timestamp_ns(&self) -> TimestampNs {
        (**self).timestamp_ns()
    }
}

/// Collect the timestamps of a record sequence.
pub fn timestamps<T: Timestamped>(rows: &[T]) -> Vec<TimestampNs> {
    rows.iter().map(Timestamped::timestamp_ns).collect()
}

/// Per-step metrics reported for one foot.
///
/// Footpods report metrics such as `impact`, `pronation`, `braking`,
/// `contact_time` and `flight_ratio`; IMU-derived gait cycles report the
/// fields of [`crate::gait::GaitCycle`]. All metrics are numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Foot label (e.g. "left"/"right", or "A"/"B" when the side is unknown).
    pub foot: String,

    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

impl StepRecord {
    pub fn new(timestamp_ns: TimestampNs, foot: impl Into<String>) -> Self {
        Self {
            timestamp_ns,
            foot: foot.into(),
            metrics: BTreeMap::new(),
        }
    }

    /// Builder-style metric insertion.
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// One phone IMU sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    /// User acceleration projected on the gravity direction.
    pub a_vert: f64,
}

/// Phone activity-monitor sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySample {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Activity label such as "running", "walking" or "stationary".
    pub activity: String,

    #[serde(default)]
    pub floors_ascended: f64,

    #[serde(default)]
    pub floors_descended: f64,
}

/// Music player state sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicPlaystate {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    #[serde(default)]
    pub track_uri: Option<String>,

    pub paused: bool,

    /// Playhead position within the track.
    pub position_ms: f64,
}

/// Section boundary within a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicSection {
    pub track_uri: String,

    /// Section start as a playhead position.
    pub start_ms: f64,

    /// Section index within the track.
    pub section: u32,
}

/// A recording session window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,

    #[serde(rename = "t_start")]
    pub start_ns: TimestampNs,

    #[serde(rename = "t_end")]
    pub end_ns: TimestampNs,
}

macro_rules! impl_timestamped {
    ($($ty:ty),* $(,)?) => {
        $(impl Timestamped for $ty {
            fn timestamp_ns(&self) -> TimestampNs {
                self.timestamp_ns
            }
        })*
    };
}

impl_timestamped!(StepRecord, ImuSample, ActivitySample, MusicPlaystate);

impl Timestamped for Session {
    fn timestamp_ns(&self) -> TimestampNs {
        self.start_ns
    }
}

/// Parse records from JSONL content (one JSON object per line).
///
/// Blank lines and lines starting with `#` are skipped. Errors carry the
/// 1-based line number.
pub fn parse_records<T: DeserializeOwned>(jsonl: &str) -> Result<Vec<T>, ModelError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, content)| {
            serde_json::from_str(content).map_err(|source| ModelError::Parse { line, source })
        })
        .collect()
}

/// Serialize records to JSONL format.
pub fn serialize_records<T: Serialize>(records: &[T]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}

/// Check that a record sequence is sorted ascending by time.
pub fn ensure_sorted<T: Timestamped>(rows: &[T]) -> Result<(), ModelError> {
    match rows
        .windows(2)
        .position(|w| w[1].timestamp_ns() < w[0].timestamp_ns())
    {
        Some(idx) => Err(ModelError::Unsorted { index: idx + 1 }),
        None => Ok(()),
    }
}
