//! Detect gait cycles from phone IMU samples.

use std::path::PathBuf;

use stridelab_common::clock::estimate_sample_rate_hz;
use stridelab_common::config::AppConfig;
use stridelab_gait_model::record::{timestamps, ImuSample};
use stridelab_processing_core::gait_events::{GaitDetectorConfig, GaitEventDetector};
use stridelab_processing_core::pipeline::alternate_feet;
use stridelab_processing_core::stats::mean;

use super::{read_series, write_records};

pub fn run(
    config: &AppConfig,
    imu: PathBuf,
    output: Option<PathBuf>,
    feet: Vec<String>,
    cycles: bool,
) -> anyhow::Result<()> {
    let [first, second] = <[String; 2]>::try_from(feet)
        .map_err(|f| anyhow::anyhow!("Expected two foot labels, got {}", f.len()))?;

    let samples: Vec<ImuSample> = read_series(&imu)?;
    eprintln!("Loaded {} IMU samples from {}", samples.len(), imu.display());
    if let Some(rate) = estimate_sample_rate_hz(&timestamps(&samples)) {
        eprintln!("  Sample rate: {rate:.1} Hz");
    }

    let detector = GaitEventDetector::new(GaitDetectorConfig::from(&config.gait))?;
    let detection = detector.detect_imu(&samples)?;

    eprintln!(
        "  Contacts: {} initial, {} final",
        detection.initial_contacts.len(),
        detection.final_contacts.len()
    );
    eprintln!("  Gait cycles: {}", detection.cycles.len());
    if !detection.cycles.is_empty() {
        let cadence: Vec<f64> = detection.cycles.iter().map(|c| c.cadence).collect();
        let contact: Vec<f64> = detection.cycles.iter().map(|c| c.contact_time_ms).collect();
        eprintln!("  Mean cadence: {:.1} steps/min", mean(&cadence));
        eprintln!("  Mean contact time: {:.0} ms", mean(&contact));
    }

    if cycles {
        write_records(output.as_deref(), &detection.cycles)
    } else {
        let steps = alternate_feet(&detection.cycles, [first.as_str(), second.as_str()]);
        write_records(output.as_deref(), &steps)
    }
}
