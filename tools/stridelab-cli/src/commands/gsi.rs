//! Autocorrelation gait symmetry index over a recording, its sessions, or
//! its running bouts.

use std::path::PathBuf;

use stridelab_common::clock::{estimate_sample_rate_hz, format_timestamp};
use stridelab_common::config::AppConfig;
use stridelab_gait_model::bout::Bout;
use stridelab_gait_model::record::{timestamps, ActivitySample, ImuSample, Session};
use stridelab_processing_core::gsi::{BoutGsi, GsiConfig, GsiEstimator};
use stridelab_processing_core::quality_filters::ActivityFilter;

use super::{read_series, write_records};

pub fn run(
    config: &AppConfig,
    imu: PathBuf,
    sessions: Option<PathBuf>,
    activity: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let samples: Vec<ImuSample> = read_series(&imu)?;
    eprintln!("Loaded {} IMU samples from {}", samples.len(), imu.display());

    let gsi_config = GsiConfig::from(&config.gsi);
    if let Some(rate) = estimate_sample_rate_hz(&timestamps(&samples)) {
        if (rate - gsi_config.sample_rate_hz).abs() > 0.1 * gsi_config.sample_rate_hz {
            tracing::warn!(
                measured = rate,
                configured = gsi_config.sample_rate_hz,
                "IMU sample rate differs from the configured GSI rate"
            );
        }
    }
    let estimator = GsiEstimator::new(gsi_config)?;

    let results: Vec<BoutGsi<Option<String>>> = if let Some(path) = sessions {
        let sessions: Vec<Session> = read_series(&path)?;
        let bouts: Vec<Bout<Option<String>>> = sessions
            .iter()
            .map(|s| s.as_bout().map_key(Some))
            .collect();
        estimator.estimate_bouts(&bouts, &samples)
    } else if let Some(path) = activity {
        let activity: Vec<ActivitySample> = read_series(&path)?;
        let bouts: Vec<Bout<Option<String>>> = ActivityFilter::from_config(&config.filters)
            .bouts(&activity)?
            .into_iter()
            .map(|b| b.map_key(|_| None))
            .collect();
        estimator.estimate_bouts(&bouts, &samples)
    } else {
        let whole = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => vec![Bout {
                start_ns: first.timestamp_ns - 1,
                end_ns: last.timestamp_ns + 1,
                count: samples.len(),
                valid: true,
                key: None,
            }],
            _ => Vec::new(),
        };
        estimator.estimate_bouts(&whole, &samples)
    };

    for result in &results {
        let label = result.bout.key.as_deref().unwrap_or("-");
        eprintln!(
            "  {} {label}: 1-GSI {:.3}, stride {:.0} ms, cadence {:.1}",
            format_timestamp(result.bout.start_ns),
            result.gsi,
            result.stride_duration_ms,
            result.cadence
        );
    }

    write_records(output.as_deref(), &results)
}
