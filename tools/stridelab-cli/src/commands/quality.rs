//! Footpod plausibility checks per session.

use std::path::PathBuf;

use stridelab_gait_model::record::{Session, StepRecord};
use stridelab_processing_core::quality_filters::session_quality;

use super::{read_series, write_records};

pub fn run(steps: PathBuf, sessions: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let steps: Vec<StepRecord> = read_series(&steps)?;
    let sessions: Vec<Session> = read_series(&sessions)?;

    let quality = session_quality(&sessions, &steps);

    eprintln!("Sessions with steps: {}/{}", quality.len(), sessions.len());
    for q in &quality {
        let mut issues = Vec::new();
        if q.bad_pods_upside_down {
            issues.push("upside down");
        }
        if q.bad_pods_switched_sides {
            issues.push("switched sides");
        }
        if q.bad_fake_run {
            issues.push("fake run");
        }
        let verdict = if issues.is_empty() {
            "ok".to_string()
        } else {
            issues.join(", ")
        };
        eprintln!(
            "  {}: {} steps, impact {:.1}, pronation {:.1}, flight {:.1} -> {verdict}",
            q.session_id, q.steps, q.mean_impact, q.mean_pronation, q.mean_flight_ratio
        );
    }

    write_records(output.as_deref(), &quality)
}
