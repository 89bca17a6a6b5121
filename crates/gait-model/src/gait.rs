//! Gait events, gait cycles and left/right symmetry types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::{StepRecord, TimestampNs, Timestamped};

/// Which contact moment a gait event marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    /// Initial contact: the foot touches down.
    #[serde(rename = "ic")]
    Initial,
    /// Final contact: the foot leaves the ground.
    #[serde(rename = "fc")]
    Final,
}

/// A detected contact event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitEvent {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,
    pub kind: ContactKind,
    /// Raw signal value at the event sample.
    pub amplitude: f64,
}

/// One gait cycle derived from an initial contact.
///
/// Durations are in milliseconds, cadence in steps per minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitCycle {
    /// Time of the initial contact.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,
    /// Time from initial contact to the paired final contact.
    pub contact_time_ms: f64,
    /// Time from initial contact to the next initial contact.
    pub step_duration_ms: f64,
    /// Time from initial contact to the second-next initial contact.
    pub stride_duration_ms: f64,
    pub cadence: f64,
    /// Fraction of the step spent airborne.
    pub flight_ratio: f64,
    /// Signal magnitude at initial contact (sign-flipped).
    pub impact: f64,
}

impl GaitCycle {
    /// Express the cycle as a step record for `foot`, so IMU-derived cycles
    /// can go through the same left/right pairing as footpod steps.
    pub fn to_step_record(&self, foot: impl Into<String>) -> StepRecord {
        StepRecord::new(self.timestamp_ns, foot)
            .with_metric("contact_time", self.contact_time_ms)
            .with_metric("step_duration", self.step_duration_ms)
            .with_metric("stride_duration", self.stride_duration_ms)
            .with_metric("cadence", self.cadence)
            .with_metric("flight_ratio", self.flight_ratio)
            .with_metric("impact", self.impact)
    }
}

/// One step paired with the opposite foot's step.
///
/// `columns` holds side-suffixed metrics (`impact_left`, `impact_right`)
/// and any appended symmetry columns (`impact_sa`). A missing column means
/// the value is undefined for this row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedStep {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Label of the foot whose step anchors this row.
    pub initial_foot: String,

    /// Set when the opposite step is missing or any value is NaN.
    pub bad_half_step: bool,

    #[serde(flatten)]
    pub columns: BTreeMap<String, f64>,
}

impl MergedStep {
    /// Column value, NaN when undefined.
    pub fn column(&self, name: &str) -> f64 {
        self.columns.get(name).copied().unwrap_or(f64::NAN)
    }
}

/// Closed set of left/right symmetry formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryMethod {
    /// Symmetry Index.
    Si,
    /// Symmetry Angle.
    Sa,
    /// Universal Symmetry Index.
    Usi,
    /// Weighted Universal Symmetry Index.
    Wusi,
}

impl SymmetryMethod {
    pub const ALL: [SymmetryMethod; 4] = [Self::Si, Self::Sa, Self::Usi, Self::Wusi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Si => "si",
            Self::Sa => "sa",
            Self::Usi => "usi",
            Self::Wusi => "wusi",
        }
    }
}

impl fmt::Display for SymmetryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymmetryMethod {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ModelError::UnknownSymmetryMethod(s.to_string()))
    }
}

/// Which foot anchors the rows of a left/right merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingSide {
    /// Rows anchored on the first foot label.
    First,
    /// Rows anchored on the second foot label.
    Second,
    /// Both of the above, concatenated and sorted by time.
    Both,
}

impl FromStr for PairingSide {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" | "left" => Ok(Self::First),
            "second" | "right" => Ok(Self::Second),
            "both" => Ok(Self::Both),
            other => Err(ModelError::UnknownPairingSide(other.to_string())),
        }
    }
}

/// Symmetry of one feature in one merged step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryRecord {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,
    pub feature: String,
    pub method: SymmetryMethod,
    pub left: f64,
    pub right: f64,
    /// NaN when either side is undefined.
    pub value: f64,
}

impl Timestamped for GaitEvent {
    fn timestamp_ns(&self) -> TimestampNs {
        self.timestamp_ns
    }
}

impl Timestamped for GaitCycle {
    fn timestamp_ns(&self) -> TimestampNs {
        self.timestamp_ns
    }
}

impl Timestamped for MergedStep {
    fn timestamp_ns(&self) -> TimestampNs {
        self.timestamp_ns
    }
}

impl Timestamped for SymmetryRecord {
    fn timestamp_ns(&self) -> TimestampNs {
        self.timestamp_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetry_method_parsing() {
        assert_eq!("sa".parse::<SymmetryMethod>().unwrap(), SymmetryMethod::Sa);
        assert_eq!(
            "wusi".parse::<SymmetryMethod>().unwrap(),
            SymmetryMethod::Wusi
        );
        let err = "ratio".parse::<SymmetryMethod>().unwrap_err();
        assert!(err.to_string().contains("ratio"));
    }

    #[test]
    fn test_pairing_side_parsing() {
        assert_eq!("both".parse::<PairingSide>().unwrap(), PairingSide::Both);
        assert_eq!("left".parse::<PairingSide>().unwrap(), PairingSide::First);
        assert!("middle".parse::<PairingSide>().is_err());
    }

    #[test]
    fn test_gait_cycle_as_step_record() {
        let cycle = GaitCycle {
            timestamp_ns: 500,
            contact_time_ms: 250.0,
            step_duration_ms: 660.0,
            stride_duration_ms: 1330.0,
            cadence: 90.9,
            flight_ratio: 0.62,
            impact: 1.5,
        };
        let step = cycle.to_step_record("A");
        assert_eq!(step.foot, "A");
        assert_eq!(step.timestamp_ns, 500);
        assert_eq!(step.metric("impact"), Some(1.5));
        assert_eq!(step.metrics.len(), 6);
    }

    #[test]
    fn test_merged_step_missing_column_is_nan() {
        let mut columns = BTreeMap::new();
        columns.insert("impact_left".to_string(), 3.0);
        let step = MergedStep {
            timestamp_ns: 0,
            initial_foot: "left".to_string(),
            bad_half_step: true,
            columns,
        };
        assert_eq!(step.column("impact_left"), 3.0);
        assert!(step.column("impact_right").is_nan());
    }

    #[test]
    fn test_contact_kind_wire_names() {
        assert_eq!(serde_json::to_string(&ContactKind::Initial).unwrap(), "\"ic\"");
        assert_eq!(serde_json::to_string(&ContactKind::Final).unwrap(), "\"fc\"");
    }
}
