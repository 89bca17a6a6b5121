//! Activity and elevation-change bout tables.

use std::path::PathBuf;

use stridelab_common::clock::{format_timestamp, ns_to_secs};
use stridelab_common::config::AppConfig;
use stridelab_gait_model::record::ActivitySample;
use stridelab_processing_core::quality_filters::{ActivityFilter, ElevationFilter};

use super::{read_series, write_records};

pub fn run(
    config: &AppConfig,
    activity: PathBuf,
    elevation: bool,
    label: Option<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let samples: Vec<ActivitySample> = read_series(&activity)?;
    eprintln!(
        "Loaded {} activity samples from {}",
        samples.len(),
        activity.display()
    );

    let bouts = if elevation {
        ElevationFilter::from_config(&config.filters).bouts(&samples)?
    } else {
        let mut filters = config.filters.clone();
        if let Some(label) = label {
            filters.activity = label;
        }
        ActivityFilter::from_config(&filters).bouts(&samples)?
    };

    eprintln!("  Bouts: {}", bouts.len());
    for bout in &bouts {
        eprintln!(
            "  {} .. {} ({:.0} s, {} samples)",
            format_timestamp(bout.start_ns),
            format_timestamp(bout.end_ns),
            ns_to_secs(bout.duration_ns()),
            bout.count
        );
    }

    write_records(output.as_deref(), &bouts)
}
