//! Data-quality filters built from bouts.
//!
//! The activity and elevation filters return one flag per target row; a
//! `true` flag marks the row as unusable. Session quality checks look at
//! footpod averages to catch sessions where the pods were mounted wrongly.

use serde::{Deserialize, Serialize};
use stridelab_common::config::FilterDefaults;
use stridelab_common::error::StrideResult;
use stridelab_gait_model::bout::Bout;
use stridelab_gait_model::record::{ActivitySample, Session, StepRecord, TimestampNs};

use crate::bout_window::{annotate_constant, annotate_key, pad_bouts, BoutPadding};
use crate::bouts::extract_bouts;
use crate::stats::mean;

/// Flags rows that fall outside stretches of one activity (`bad_not_running`).
#[derive(Debug, Clone)]
pub struct ActivityFilter {
    activity: String,
    padding: BoutPadding,
}

impl Default for ActivityFilter {
    fn default() -> Self {
        Self::from_config(&FilterDefaults::default())
    }
}

impl ActivityFilter {
    /// Filter for `activity` with the default padding, which drops the first
    /// 10 s and the last 2 s of every bout.
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            padding: BoutPadding::new(10.0, -2.0),
        }
    }

    pub fn from_config(config: &FilterDefaults) -> Self {
        Self::new(config.activity.clone())
            .with_padding(BoutPadding::from_window(config.activity_window_secs))
    }

    pub fn with_padding(mut self, padding: BoutPadding) -> Self {
        self.padding = padding;
        self
    }

    /// Padded bouts during which the activity matched.
    pub fn bouts(&self, activity: &[ActivitySample]) -> StrideResult<Vec<Bout>> {
        let times: Vec<TimestampNs> = activity.iter().map(|a| a.timestamp_ns).collect();
        let valid: Vec<bool> = activity.iter().map(|a| a.activity == self.activity).collect();
        let bouts = extract_bouts(&times, &valid, false)?;
        Ok(pad_bouts(&bouts, self.padding))
    }

    /// `true` for every row of `times` outside the padded activity bouts.
    pub fn flags(
        &self,
        times: &[TimestampNs],
        activity: &[ActivitySample],
    ) -> StrideResult<Vec<bool>> {
        let bouts = self.bouts(activity)?;
        let flags = annotate_constant(times, &bouts, false, true);
        tracing::debug!(
            activity = %self.activity,
            bouts = bouts.len(),
            flagged = flags.iter().filter(|f| **f).count(),
            "Applied activity filter"
        );
        Ok(flags)
    }
}

/// Flags rows around changes in climbed floors (`bad_not_flat`).
#[derive(Debug, Clone)]
pub struct ElevationFilter {
    padding: BoutPadding,
}

impl Default for ElevationFilter {
    fn default() -> Self {
        Self::from_config(&FilterDefaults::default())
    }
}

impl ElevationFilter {
    pub fn new(padding: BoutPadding) -> Self {
        Self { padding }
    }

    pub fn from_config(config: &FilterDefaults) -> Self {
        Self::new(BoutPadding::from_window(config.elevation_window_secs))
    }

    /// Padded bouts of samples where the floor count changed.
    pub fn bouts(&self, activity: &[ActivitySample]) -> StrideResult<Vec<Bout>> {
        let times: Vec<TimestampNs> = activity.iter().map(|a| a.timestamp_ns).collect();
        let floors: Vec<f64> = activity
            .iter()
            .map(|a| a.floors_ascended + a.floors_descended)
            .collect();
        // The first sample has no predecessor and counts as a change.
        let changed: Vec<bool> = (0..floors.len())
            .map(|i| i == 0 || floors[i] != floors[i - 1])
            .collect();
        let bouts = extract_bouts(&times, &changed, false)?;
        Ok(pad_bouts(&bouts, self.padding))
    }

    /// `true` for every row of `times` inside a padded elevation-change bout.
    pub fn flags(
        &self,
        times: &[TimestampNs],
        activity: &[ActivitySample],
    ) -> StrideResult<Vec<bool>> {
        let bouts = self.bouts(activity)?;
        let flags = annotate_constant(times, &bouts, true, false);
        tracing::debug!(
            bouts = bouts.len(),
            flagged = flags.iter().filter(|f| **f).count(),
            "Applied elevation filter"
        );
        Ok(flags)
    }
}

/// Footpod plausibility checks for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionQuality {
    pub session_id: String,
    pub steps: usize,
    pub mean_impact: f64,
    pub mean_pronation: f64,
    pub mean_flight_ratio: f64,
    pub bad_pods_upside_down: bool,
    pub bad_pods_switched_sides: bool,
    pub bad_fake_run: bool,
}

impl SessionQuality {
    pub fn is_valid(&self) -> bool {
        !(self.bad_pods_upside_down || self.bad_pods_switched_sides || self.bad_fake_run)
    }
}

fn metric_mean(steps: &[&StepRecord], name: &str) -> f64 {
    let values: Vec<f64> = steps
        .iter()
        .filter_map(|s| s.metric(name))
        .filter(|v| !v.is_nan())
        .collect();
    mean(&values)
}

/// Quality flags of every session that contains at least one step, in
/// session table order. `steps` must be sorted by time.
pub fn session_quality(sessions: &[Session], steps: &[StepRecord]) -> Vec<SessionQuality> {
    let times: Vec<TimestampNs> = steps.iter().map(|s| s.timestamp_ns).collect();
    let windows: Vec<Bout<String>> = sessions.iter().map(Session::as_bout).collect();
    let session_ids = annotate_key(&times, &windows);

    sessions
        .iter()
        .filter_map(|session| {
            let members: Vec<&StepRecord> = steps
                .iter()
                .zip(&session_ids)
                .filter(|(_, id)| id.as_deref() == Some(session.session_id.as_str()))
                .map(|(step, _)| step)
                .collect();
            if members.is_empty() {
                return None;
            }

            let mean_impact = metric_mean(&members, "impact");
            let mean_pronation = metric_mean(&members, "pronation");
            let mean_flight_ratio = metric_mean(&members, "flight_ratio");
            Some(SessionQuality {
                session_id: session.session_id.clone(),
                steps: members.len(),
                mean_impact,
                mean_pronation,
                mean_flight_ratio,
                bad_pods_upside_down: mean_impact < 5.0,
                bad_pods_switched_sides: mean_pronation > 0.0,
                bad_fake_run: mean_flight_ratio < 1.0,
            })
        })
        .collect()
}

/// Sessions that contain steps and raise none of the quality flags.
pub fn retain_valid_sessions(sessions: &[Session], steps: &[StepRecord]) -> Vec<Session> {
    let quality = session_quality(sessions, steps);
    let retained: Vec<Session> = sessions
        .iter()
        .filter(|s| {
            quality
                .iter()
                .any(|q| q.session_id == s.session_id && q.is_valid())
        })
        .cloned()
        .collect();

    if retained.len() < quality.len() {
        tracing::info!(
            dropped = quality.len() - retained.len(),
            "Dropped sessions failing footpod checks"
        );
    }
    retained
}
