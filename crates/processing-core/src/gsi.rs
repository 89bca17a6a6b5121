//! Gait Symmetry Index from 3-axis acceleration autocorrelation.
//!
//! Following Zhang et al. (2018): the biased autocorrelation summed over the
//! three axes peaks at the stride lag, and the unbiased autocorrelation
//! magnitude at half that lag (one step) measures how similar consecutive
//! steps are. The reported index is `1 - GSI`, so 0 means symmetric.

use serde::{Deserialize, Serialize};
use stridelab_common::config::GsiDefaults;
use stridelab_common::error::{ensure_same_len, StrideError, StrideResult};
use stridelab_gait_model::bout::Bout;
use stridelab_gait_model::record::ImuSample;

use crate::lowpass::ButterworthLowPass;
use crate::range::{select_range, TimeRange};

/// Normalized autocorrelation of `data` for lags `0..data.len()`.
///
/// The unbiased form divides lag `j` by the number of overlapping samples
/// `n - j`; the biased form does not, so it tapers towards zero.
pub fn autocorrelate(data: &[f64], unbiased: bool) -> Vec<f64> {
    autocorrelate_lags(data, unbiased, data.len())
}

/// Like [`autocorrelate`], limited to lags `0..max_lag`.
pub fn autocorrelate_lags(data: &[f64], unbiased: bool, max_lag: usize) -> Vec<f64> {
    let n = data.len();
    let raw: Vec<f64> = (0..max_lag.min(n))
        .map(|lag| {
            let sum: f64 = data[..n - lag]
                .iter()
                .zip(&data[lag..])
                .map(|(a, b)| a * b)
                .sum();
            if unbiased {
                sum / (n - lag) as f64
            } else {
                sum
            }
        })
        .collect();

    match raw.first().copied() {
        Some(zero_lag) => raw.iter().map(|v| v / zero_lag).collect(),
        None => raw,
    }
}

/// Index of the first maximum; a NaN counts as the maximum.
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in values.iter().enumerate() {
        if v.is_nan() {
            return Some(idx);
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((idx, v)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Parameters of the GSI estimator. Lags are in samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GsiConfig {
    pub max_lag: usize,
    pub dead_lag: usize,
    pub sample_rate_hz: f64,
    pub cutoff_hz: f64,
}

impl Default for GsiConfig {
    fn default() -> Self {
        Self::from(&GsiDefaults::default())
    }
}

impl From<&GsiDefaults> for GsiConfig {
    fn from(defaults: &GsiDefaults) -> Self {
        Self {
            max_lag: defaults.max_lag,
            dead_lag: defaults.dead_lag,
            sample_rate_hz: defaults.sample_rate_hz,
            cutoff_hz: 10.0,
        }
    }
}

/// Result of one GSI computation. Both fields are NaN when the window was
/// too short.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GsiEstimate {
    /// `1 - GSI`: 0 for perfectly symmetric gait.
    pub gsi: f64,
    pub stride_duration_secs: f64,
}

impl GsiEstimate {
    const UNDEFINED: Self = Self {
        gsi: f64::NAN,
        stride_duration_secs: f64::NAN,
    };

    /// Steps per minute; a stride spans two steps.
    pub fn cadence(&self) -> f64 {
        2.0 * 60.0 / self.stride_duration_secs
    }
}

/// GSI of the IMU samples inside one bout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoutGsi<K = ()> {
    #[serde(flatten)]
    pub bout: Bout<K>,
    pub gsi: f64,
    pub stride_duration_ms: f64,
    pub cadence: f64,
}

/// Computes the gait symmetry index of acceleration windows.
pub struct GsiEstimator {
    config: GsiConfig,
    filter: ButterworthLowPass,
}

impl GsiEstimator {
    pub fn new(config: GsiConfig) -> StrideResult<Self> {
        if config.max_lag <= config.dead_lag {
            return Err(StrideError::invalid_argument(format!(
                "max lag ({}) must exceed dead lag ({})",
                config.max_lag, config.dead_lag
            )));
        }
        let filter = ButterworthLowPass::new(config.cutoff_hz, config.sample_rate_hz)?;
        Ok(Self { config, filter })
    }

    pub fn config(&self) -> &GsiConfig {
        &self.config
    }

    /// Estimate the GSI and stride duration of one window.
    pub fn estimate(&self, ax: &[f64], ay: &[f64], az: &[f64]) -> StrideResult<GsiEstimate> {
        ensure_same_len("y acceleration", ax.len(), ay.len())?;
        ensure_same_len("z acceleration", ax.len(), az.len())?;

        let GsiConfig {
            max_lag, dead_lag, ..
        } = self.config;
        if ax.len() <= dead_lag {
            return Ok(GsiEstimate::UNDEFINED);
        }

        let filtered: Vec<Vec<f64>> = [ax, ay, az]
            .iter()
            .map(|axis| self.filter.filter(axis))
            .collect();
        let lags = max_lag.min(ax.len());

        let mut c_step = vec![0.0; lags];
        let mut c_stride = vec![0.0; lags];
        for axis in &filtered {
            let unbiased = autocorrelate_lags(axis, true, max_lag);
            let biased = autocorrelate_lags(axis, false, max_lag);
            for lag in 0..lags {
                c_step[lag] += unbiased[lag] * unbiased[lag];
                c_stride[lag] += biased[lag].max(0.0);
            }
        }

        let Some(peak) = argmax(&c_stride[dead_lag..]) else {
            return Ok(GsiEstimate::UNDEFINED);
        };
        let stride_lag = dead_lag + peak;
        let gsi = c_step[stride_lag / 2].sqrt() / 3.0_f64.sqrt();

        let estimate = GsiEstimate {
            gsi: 1.0 - gsi,
            stride_duration_secs: stride_lag as f64 / self.config.sample_rate_hz,
        };
        tracing::trace!(
            samples = ax.len(),
            stride_lag,
            gsi = estimate.gsi,
            "Estimated gait symmetry index"
        );
        Ok(estimate)
    }

    /// Estimate over the three acceleration axes of IMU samples.
    pub fn estimate_imu(&self, samples: &[ImuSample]) -> GsiEstimate {
        let ax: Vec<f64> = samples.iter().map(|s| s.ax).collect();
        let ay: Vec<f64> = samples.iter().map(|s| s.ay).collect();
        let az: Vec<f64> = samples.iter().map(|s| s.az).collect();
        // Axes built from the same samples always have equal lengths.
        self.estimate(&ax, &ay, &az).unwrap_or(GsiEstimate::UNDEFINED)
    }

    /// One estimate per bout, using the samples strictly inside each bout.
    pub fn estimate_bouts<K: Clone>(
        &self,
        bouts: &[Bout<K>],
        samples: &[ImuSample],
    ) -> Vec<BoutGsi<K>> {
        let results: Vec<BoutGsi<K>> = bouts
            .iter()
            .map(|bout| {
                let window = select_range(samples, TimeRange::inside_bout(bout));
                let estimate = self.estimate_imu(&window);
                BoutGsi {
                    bout: bout.clone(),
                    gsi: estimate.gsi,
                    stride_duration_ms: estimate.stride_duration_secs * 1000.0,
                    cadence: estimate.cadence(),
                }
            })
            .collect();

        tracing::debug!(
            bouts = results.len(),
            defined = results.iter().filter(|r| !r.gsi.is_nan()).count(),
            "Computed GSI per bout"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_estimator() -> GsiEstimator {
        GsiEstimator::new(GsiConfig::default()).unwrap()
    }

    #[test]
    fn test_autocorrelation_normalization() {
        let data = [1.0, 2.0, 3.0];
        // Raw lags: 14, 8, 3.
        let biased = autocorrelate(&data, false);
        assert_eq!(biased.len(), 3);
        assert!((biased[0] - 1.0).abs() < 1e-12);
        assert!((biased[1] - 8.0 / 14.0).abs() < 1e-12);
        assert!((biased[2] - 3.0 / 14.0).abs() < 1e-12);

        let unbiased = autocorrelate(&data, true);
        assert!((unbiased[1] - (8.0 / 2.0) / (14.0 / 3.0)).abs() < 1e-12);
        assert!((unbiased[2] - 3.0 / (14.0 / 3.0)).abs() < 1e-12);

        assert_eq!(autocorrelate_lags(&data, true, 2).len(), 2);
        assert!(autocorrelate(&[], true).is_empty());
    }

    #[test]
    fn test_argmax_semantics() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[1.0, f64::NAN, 5.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_short_window_is_undefined() {
        let estimator = default_estimator();
        let x = vec![0.0; 50];
        let estimate = estimator.estimate(&x, &x, &x).unwrap();
        assert!(estimate.gsi.is_nan());
        assert!(estimate.stride_duration_secs.is_nan());
    }

    #[test]
    fn test_invalid_parameters() {
        let estimator = default_estimator();
        assert!(estimator.estimate(&[0.0; 60], &[0.0; 60], &[0.0; 59]).is_err());

        let config = GsiConfig {
            max_lag: 50,
            ..GsiConfig::default()
        };
        assert!(GsiEstimator::new(config).is_err());

        let config = GsiConfig {
            sample_rate_hz: 15.0,
            ..GsiConfig::default()
        };
        assert!(GsiEstimator::new(config).is_err());

        let config = GsiConfig {
            sample_rate_hz: -1.0,
            ..GsiConfig::default()
        };
        assert!(GsiEstimator::new(config).is_err());
    }

    #[test]
    fn test_bout_windows_are_exclusive() {
        let samples: Vec<ImuSample> = (0..300)
            .map(|i| {
                let t = i as f64 / 100.0;
                let v = (2.0 * std::f64::consts::PI * t).sin();
                ImuSample {
                    timestamp_ns: i * 10_000_000,
                    ax: v,
                    ay: v,
                    az: v,
                    a_vert: v,
                }
            })
            .collect();
        let bouts = vec![
            Bout {
                start_ns: 0,
                end_ns: 2_990_000_000,
                count: 300,
                valid: true,
                key: (),
            },
            Bout {
                start_ns: 0,
                end_ns: 510_000_000,
                count: 52,
                valid: true,
                key: (),
            },
        ];
        let results = default_estimator().estimate_bouts(&bouts, &samples);
        assert_eq!(results.len(), 2);
        assert!((results[0].stride_duration_ms - 1000.0).abs() <= 30.0);
        assert!((results[0].cadence - 120.0).abs() < 4.0);
        // 50 samples strictly inside (0, 0.51 s): too short.
        assert!(results[1].gsi.is_nan());
    }
}
