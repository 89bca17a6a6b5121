//! End-to-end step filtering and grouping.
//!
//! Chains the quality filters, the music merger and bout extraction so that
//! only steps from clean running stretches remain, each tagged with the
//! session, track and section it belongs to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stridelab_common::config::FilterDefaults;
use stridelab_common::error::StrideResult;
use stridelab_gait_model::bout::Bout;
use stridelab_gait_model::gait::{GaitCycle, MergedStep, SymmetryRecord};
use stridelab_gait_model::record::{
    ActivitySample, ImuSample, MusicPlaystate, MusicSection, Session, StepRecord, TimestampNs,
};

use crate::bout_window::annotate_key;
use crate::bouts::extract_bouts_by;
use crate::gsi::{BoutGsi, GsiEstimator};
use crate::music::{merge_music_playstate, music_sections};
use crate::quality_filters::{ActivityFilter, ElevationFilter};
use crate::stats::{mean, median, summarize_pairs, GroupSummary};
use crate::symmetry::SymmetryCalculator;

/// Context streams used to filter steps. Every stream is optional; a
/// missing stream disables the filters and annotations that need it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunContext<'a> {
    pub activity: Option<&'a [ActivitySample]>,
    pub playstates: Option<&'a [MusicPlaystate]>,
    pub sessions: Option<&'a [Session]>,
    pub sections: Option<&'a [MusicSection]>,
}

/// Grouping key of a running stretch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunKey {
    pub session_id: Option<String>,
    pub track_uri: Option<String>,
    pub section: Option<u32>,
}

/// A merged step that passed every filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStep {
    #[serde(flatten)]
    pub step: MergedStep,
    #[serde(flatten)]
    pub key: RunKey,
    pub position_ms: f64,
    /// Index of the running bout within the filtered series.
    pub bout_idx: usize,
}

/// Why steps were dropped, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCounts {
    pub total: usize,
    pub bad_half_step: usize,
    pub bad_not_running: usize,
    pub bad_not_flat: usize,
    pub bad_no_music: usize,
    pub kept: usize,
}

/// Keeps the steps of clean running bouts.
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    activity: ActivityFilter,
    elevation: ElevationFilter,
}

impl RunFilter {
    pub fn from_config(config: &FilterDefaults) -> Self {
        Self {
            activity: ActivityFilter::from_config(config),
            elevation: ElevationFilter::from_config(config),
        }
    }

    /// Filter `steps` (sorted by time) and tag the survivors.
    pub fn apply(
        &self,
        steps: &[MergedStep],
        context: &RunContext<'_>,
    ) -> StrideResult<(Vec<RunStep>, FilterCounts)> {
        let times: Vec<TimestampNs> = steps.iter().map(|s| s.timestamp_ns).collect();
        let n = steps.len();

        let (not_running, not_flat) = match context.activity {
            Some(activity) => (
                self.activity.flags(&times, activity)?,
                self.elevation.flags(&times, activity)?,
            ),
            None => (vec![false; n], vec![false; n]),
        };
        let music = match context.playstates {
            Some(playstates) => Some(merge_music_playstate(&times, playstates)?),
            None => None,
        };
        let no_music = |i: usize| music.as_ref().is_some_and(|m| m[i].bad_no_music);

        let kept: Vec<usize> = (0..n)
            .filter(|&i| {
                !(steps[i].bad_half_step || not_running[i] || not_flat[i] || no_music(i))
            })
            .collect();
        let counts = FilterCounts {
            total: n,
            bad_half_step: steps.iter().filter(|s| s.bad_half_step).count(),
            bad_not_running: not_running.iter().filter(|f| **f).count(),
            bad_not_flat: not_flat.iter().filter(|f| **f).count(),
            bad_no_music: (0..n).filter(|&i| no_music(i)).count(),
            kept: kept.len(),
        };

        let kept_times: Vec<TimestampNs> = kept.iter().map(|&i| times[i]).collect();
        let session_ids = match context.sessions {
            Some(sessions) => {
                let windows: Vec<Bout<String>> = sessions.iter().map(Session::as_bout).collect();
                annotate_key(&kept_times, &windows)
            }
            None => vec![None; kept.len()],
        };
        let kept_music: Vec<_> = kept
            .iter()
            .filter_map(|&i| music.as_ref().map(|m| m[i].clone()))
            .collect();
        let sections = match (context.sections, music.is_some()) {
            (Some(sections), true) => music_sections(&kept_music, sections)?,
            _ => vec![None; kept.len()],
        };

        let keys: Vec<RunKey> = (0..kept.len())
            .map(|j| RunKey {
                session_id: session_ids[j].clone(),
                track_uri: kept_music.get(j).and_then(|m| m.track_uri.clone()),
                section: sections[j],
            })
            .collect();

        // Every kept row is valid, so the bouts partition the rows in order.
        let bouts = extract_bouts_by(&kept_times, &vec![true; kept.len()], &keys, false)?;
        let bout_idx: Vec<usize> = bouts
            .iter()
            .enumerate()
            .flat_map(|(idx, bout)| std::iter::repeat(idx).take(bout.count))
            .collect();

        let rows: Vec<RunStep> = kept
            .iter()
            .zip(&bout_idx)
            .enumerate()
            .map(|(j, (&i, &idx))| RunStep {
                step: steps[i].clone(),
                key: keys[j].clone(),
                position_ms: kept_music.get(j).map_or(f64::NAN, |m| m.position_ms),
                bout_idx: idx,
            })
            .collect();

        tracing::info!(
            total = counts.total,
            kept = counts.kept,
            bouts = bouts.len(),
            "Filtered steps to running bouts"
        );

        Ok((rows, counts))
    }
}

/// Append symmetry columns to filtered rows. Features and the wusi scale
/// are taken from these rows only.
pub fn append_run_symmetry(
    rows: &mut [RunStep],
    calculator: &SymmetryCalculator,
) -> Vec<SymmetryRecord> {
    let mut steps: Vec<MergedStep> = rows.iter().map(|r| r.step.clone()).collect();
    let records = calculator.apply(&mut steps, None);
    for (row, step) in rows.iter_mut().zip(steps) {
        row.step = step;
    }
    records
}

/// Time span of every running bout, from its first to its last step, in
/// bout index order.
pub fn run_bouts(rows: &[RunStep]) -> Vec<Bout<RunKey>> {
    let mut bouts: BTreeMap<usize, Bout<RunKey>> = BTreeMap::new();
    for row in rows {
        let t = row.step.timestamp_ns;
        bouts
            .entry(row.bout_idx)
            .and_modify(|bout| {
                bout.start_ns = bout.start_ns.min(t);
                bout.end_ns = bout.end_ns.max(t);
                bout.count += 1;
            })
            .or_insert_with(|| Bout {
                start_ns: t,
                end_ns: t,
                count: 1,
                valid: true,
                key: row.key.clone(),
            });
    }
    bouts.into_values().collect()
}

/// GSI of the IMU samples strictly inside every running bout.
pub fn run_bout_gsi(
    rows: &[RunStep],
    imu: &[ImuSample],
    estimator: &GsiEstimator,
) -> Vec<BoutGsi<RunKey>> {
    estimator.estimate_bouts(&run_bouts(rows), imu)
}

/// Mean and median of the per-bout GSI results of one run key. NaN
/// results are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GsiSummary {
    pub bouts: usize,
    pub gsi_mean: f64,
    pub gsi_median: f64,
    pub stride_duration_mean: f64,
    pub stride_duration_median: f64,
    pub cadence_mean: f64,
    pub cadence_median: f64,
}

impl GsiSummary {
    fn from_bouts(results: &[&BoutGsi<RunKey>]) -> Self {
        let defined = |values: Vec<f64>| -> Vec<f64> {
            values.into_iter().filter(|v| !v.is_nan()).collect()
        };
        let gsi = defined(results.iter().map(|r| r.gsi).collect());
        let stride = defined(results.iter().map(|r| r.stride_duration_ms).collect());
        let cadence = defined(results.iter().map(|r| r.cadence).collect());

        Self {
            bouts: results.len(),
            gsi_mean: mean(&gsi),
            gsi_median: median(&gsi),
            stride_duration_mean: mean(&stride),
            stride_duration_median: median(&stride),
            cadence_mean: mean(&cadence),
            cadence_median: median(&cadence),
        }
    }
}

/// Column statistics of one run key, plus its GSI when IMU data was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub steps: GroupSummary<RunKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gsi: Option<GsiSummary>,
}

/// Column statistics per session, track and section. With `gsi`, the
/// per-bout results sharing a run key are summarized alongside.
pub fn summarize_runs(rows: &[RunStep], gsi: Option<&[BoutGsi<RunKey>]>) -> Vec<RunSummary> {
    summarize_pairs(rows.iter().map(|r| (r.key.clone(), &r.step)))
        .into_iter()
        .map(|steps| {
            let gsi = gsi.map(|results| {
                let members: Vec<&BoutGsi<RunKey>> = results
                    .iter()
                    .filter(|r| r.bout.key == steps.key)
                    .collect();
                GsiSummary::from_bouts(&members)
            });
            RunSummary { steps, gsi }
        })
        .collect()
}

/// Label gait cycles alternately with two foot names. The true side of an
/// IMU-derived step is unknown, only that consecutive steps alternate.
pub fn alternate_feet(cycles: &[GaitCycle], labels: [&str; 2]) -> Vec<StepRecord> {
    cycles
        .iter()
        .enumerate()
        .map(|(i, c)| c.to_step_record(labels[i % 2]))
        .collect()
}
