//! Pair feet, compute symmetry indices and keep clean running bouts.

use std::path::PathBuf;

use anyhow::Context;
use stridelab_common::config::AppConfig;
use stridelab_gait_model::gait::{PairingSide, SymmetryMethod};
use stridelab_gait_model::record::{
    ActivitySample, ImuSample, MusicPlaystate, MusicSection, Session, StepRecord,
};
use stridelab_processing_core::gsi::{GsiConfig, GsiEstimator};
use stridelab_processing_core::merge::LeftRightMerger;
use stridelab_processing_core::pipeline::{
    append_run_symmetry, run_bout_gsi, run_bouts, summarize_runs, RunContext, RunFilter,
};
use stridelab_processing_core::quality_filters::retain_valid_sessions;
use stridelab_processing_core::symmetry::SymmetryCalculator;

use super::{read_optional, read_records, read_series, write_records};

pub struct Inputs {
    pub steps: PathBuf,
    pub activity: Option<PathBuf>,
    pub sessions: Option<PathBuf>,
    pub music: Option<PathBuf>,
    pub sections: Option<PathBuf>,
    pub imu: Option<PathBuf>,
}

pub struct Options {
    pub method: Option<String>,
    pub feet: Option<Vec<String>>,
    pub side: String,
    pub pod_checks: bool,
    pub output: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

pub fn run(config: &AppConfig, inputs: Inputs, options: Options) -> anyhow::Result<()> {
    let method: SymmetryMethod = options
        .method
        .as_deref()
        .unwrap_or(config.symmetry.method.as_str())
        .parse()?;
    let side: PairingSide = options.side.parse()?;

    let steps: Vec<StepRecord> = read_series(&inputs.steps)?;
    let activity: Option<Vec<ActivitySample>> =
        read_optional(inputs.activity.as_ref(), read_series)?;
    let playstates: Option<Vec<MusicPlaystate>> =
        read_optional(inputs.music.as_ref(), read_series)?;
    let sections: Option<Vec<MusicSection>> =
        read_optional(inputs.sections.as_ref(), read_records)?;
    let mut sessions: Option<Vec<Session>> =
        read_optional(inputs.sessions.as_ref(), read_series)?;
    let imu: Option<Vec<ImuSample>> = read_optional(inputs.imu.as_ref(), read_series)?;

    eprintln!("Loaded {} steps from {}", steps.len(), inputs.steps.display());

    if options.pod_checks {
        if let Some(all) = sessions.take() {
            let retained = retain_valid_sessions(&all, &steps);
            eprintln!("  Sessions passing pod checks: {}/{}", retained.len(), all.len());
            sessions = Some(retained);
        }
    }

    let mut merger = LeftRightMerger::from_config(&config.symmetry).with_side(side);
    if let Some(feet) = options.feet {
        let [first, second] = <[String; 2]>::try_from(feet)
            .map_err(|f| anyhow::anyhow!("Expected two foot labels, got {}", f.len()))?;
        merger = LeftRightMerger::new(first, second)
            .with_tolerance_secs(config.symmetry.pairing_tolerance_secs)
            .with_side(side);
    }

    let merged = merger.merge(&steps);
    eprintln!("  Merged rows: {}", merged.len());

    let context = RunContext {
        activity: activity.as_deref(),
        playstates: playstates.as_deref(),
        sessions: sessions.as_deref(),
        sections: sections.as_deref(),
    };
    let (mut rows, counts) = RunFilter::from_config(&config.filters)
        .apply(&merged, &context)
        .context("Failed to filter steps")?;

    eprintln!("  Dropped half steps: {}", counts.bad_half_step);
    if context.activity.is_some() {
        eprintln!("  Dropped outside running: {}", counts.bad_not_running);
        eprintln!("  Dropped around elevation changes: {}", counts.bad_not_flat);
    }
    if context.playstates.is_some() {
        eprintln!("  Dropped without music: {}", counts.bad_no_music);
    }
    eprintln!(
        "  Kept {} of {} rows in {} bouts",
        counts.kept,
        counts.total,
        run_bouts(&rows).len()
    );

    let calculator = SymmetryCalculator::new(method);
    let records = append_run_symmetry(&mut rows, &calculator);
    eprintln!(
        "  Symmetry values: {} (method {method})",
        records.iter().filter(|r| r.value.is_finite()).count()
    );

    let gsi = match &imu {
        Some(samples) => {
            let estimator = GsiEstimator::new(GsiConfig::from(&config.gsi))?;
            let results = run_bout_gsi(&rows, samples, &estimator);
            eprintln!(
                "  GSI bouts: {} ({} defined)",
                results.len(),
                results.iter().filter(|r| !r.gsi.is_nan()).count()
            );
            Some(results)
        }
        None => None,
    };

    if let Some(path) = &options.summary {
        let summary = summarize_runs(&rows, gsi.as_deref());
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("  Summary saved to: {}", path.display());
    }

    write_records(options.output.as_deref(), &rows)
}
