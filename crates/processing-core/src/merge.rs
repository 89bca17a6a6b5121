//! Left/right step pairing.
//!
//! Each step of the anchoring foot is joined backward in time with the
//! opposite foot's latest step within a tolerance. Metrics become columns
//! suffixed by the side they came from, so `impact_left` always holds the
//! first foot's value regardless of which foot anchors the row.

use std::collections::{BTreeMap, BTreeSet};

use stridelab_common::clock::secs_to_ns;
use stridelab_common::config::SymmetryDefaults;
use stridelab_gait_model::gait::{MergedStep, PairingSide};
use stridelab_gait_model::record::{DurationNs, StepRecord};

use crate::asof::TemporalJoiner;

/// Pairs per-foot step records into gait-cycle rows.
#[derive(Debug, Clone)]
pub struct LeftRightMerger {
    feet: [String; 2],
    suffixes: [String; 2],
    tolerance_ns: DurationNs,
    side: PairingSide,
}

impl Default for LeftRightMerger {
    fn default() -> Self {
        Self::from_config(&SymmetryDefaults::default())
    }
}

impl LeftRightMerger {
    /// Merger for the given foot labels; the first label is treated as left.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            feet: [first.into(), second.into()],
            suffixes: ["_left".to_string(), "_right".to_string()],
            tolerance_ns: secs_to_ns(1.0),
            side: PairingSide::Both,
        }
    }

    pub fn from_config(config: &SymmetryDefaults) -> Self {
        let [first, second] = config.feet.clone();
        Self::new(first, second).with_tolerance_secs(config.pairing_tolerance_secs)
    }

    pub fn with_tolerance_secs(mut self, secs: f64) -> Self {
        self.tolerance_ns = secs_to_ns(secs);
        self
    }

    pub fn with_side(mut self, side: PairingSide) -> Self {
        self.side = side;
        self
    }

    pub fn with_suffixes(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.suffixes = [left.into(), right.into()];
        self
    }

    pub fn suffixes(&self) -> &[String; 2] {
        &self.suffixes
    }

    /// Merge the steps of both feet. `steps` must be sorted by time.
    ///
    /// Rows with no opposite step in range, or with any undefined column,
    /// are kept and flagged `bad_half_step`.
    pub fn merge(&self, steps: &[StepRecord]) -> Vec<MergedStep> {
        let per_foot: [Vec<&StepRecord>; 2] = [0, 1].map(|side| {
            steps
                .iter()
                .filter(|s| s.foot == self.feet[side])
                .collect()
        });

        let metric_names: BTreeSet<&str> = steps
            .iter()
            .filter(|s| self.feet.contains(&s.foot))
            .flat_map(|s| s.metrics.keys().map(String::as_str))
            .collect();
        let expected_columns: Vec<String> = metric_names
            .iter()
            .flat_map(|name| self.suffixes.iter().map(move |sfx| format!("{name}{sfx}")))
            .collect();

        let anchors: &[usize] = match self.side {
            PairingSide::First => &[0],
            PairingSide::Second => &[1],
            PairingSide::Both => &[0, 1],
        };

        let mut merged: Vec<MergedStep> = Vec::new();
        for &anchor in anchors {
            let other = 1 - anchor;
            let joiner = TemporalJoiner::backward().with_tolerance(self.tolerance_ns);
            for (step, matched) in joiner.join(&per_foot[anchor], &per_foot[other]) {
                let mut columns = BTreeMap::new();
                self.insert_metrics(&mut columns, step, anchor);
                if let Some(opposite) = matched {
                    self.insert_metrics(&mut columns, opposite, other);
                }

                let bad_half_step = matched.is_none()
                    || columns.values().any(|v: &f64| v.is_nan())
                    || expected_columns.iter().any(|c| !columns.contains_key(c));

                merged.push(MergedStep {
                    timestamp_ns: step.timestamp_ns,
                    initial_foot: self.feet[anchor].clone(),
                    bad_half_step,
                    columns,
                });
            }
        }

        // Stable: on equal times the first foot's row comes first.
        merged.sort_by_key(|m| m.timestamp_ns);

        tracing::debug!(
            rows = merged.len(),
            bad = merged.iter().filter(|m| m.bad_half_step).count(),
            "Merged left/right steps"
        );

        merged
    }

    fn insert_metrics(&self, columns: &mut BTreeMap<String, f64>, step: &StepRecord, side: usize) {
        let suffix = &self.suffixes[side];
        for (name, value) in &step.metrics {
            columns.insert(format!("{name}{suffix}"), *value);
        }
    }
}
