//! Gait event detection from vertical acceleration.
//!
//! Initial contacts (IC) are the prominent troughs of the vertical
//! acceleration and final contacts (FC) its prominent peaks. Each IC is
//! paired with the first FC inside the contact-time window and with the
//! first later IC inside the step-time window. Pairings that violate the
//! timing constraints are dropped.

use serde::{Deserialize, Serialize};
use stridelab_common::clock::{ms_to_ns, ns_to_ms};
use stridelab_common::config::GaitDefaults;
use stridelab_common::error::{ensure_same_len, StrideError, StrideResult};
use stridelab_gait_model::gait::{ContactKind, GaitCycle, GaitEvent};
use stridelab_gait_model::record::{ImuSample, TimestampNs};

use crate::asof::{is_sorted, TemporalJoiner};
use crate::peaks::{find_peaks, find_troughs};

/// Timing windows for pairing contact events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitDetectorConfig {
    /// `[min, max]` time from IC to FC (ms).
    pub contact_time_range_ms: [f64; 2],
    /// `[min, max]` time from IC to the opposite foot's IC (ms).
    pub step_time_range_ms: [f64; 2],
    /// Minimum peak prominence in signal units.
    pub peak_prominence: f64,
}

impl Default for GaitDetectorConfig {
    fn default() -> Self {
        Self::from(&GaitDefaults::default())
    }
}

impl From<&GaitDefaults> for GaitDetectorConfig {
    fn from(defaults: &GaitDefaults) -> Self {
        Self {
            contact_time_range_ms: defaults.contact_time_range_ms,
            step_time_range_ms: defaults.step_time_range_ms,
            peak_prominence: defaults.peak_prominence,
        }
    }
}

/// Everything the detector found in one signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GaitDetection {
    /// Plausible gait cycles, sorted by IC time.
    pub cycles: Vec<GaitCycle>,
    /// All IC candidates, before pairing.
    pub initial_contacts: Vec<GaitEvent>,
    /// All FC candidates, before pairing.
    pub final_contacts: Vec<GaitEvent>,
}

impl GaitDetection {
    pub fn ic_times(&self) -> Vec<TimestampNs> {
        self.initial_contacts.iter().map(|e| e.timestamp_ns).collect()
    }

    pub fn fc_times(&self) -> Vec<TimestampNs> {
        self.final_contacts.iter().map(|e| e.timestamp_ns).collect()
    }
}

/// Detects contact events and derives gait cycles.
pub struct GaitEventDetector {
    config: GaitDetectorConfig,
}

// Intermediate row while pairing events.
struct Candidate {
    t: TimestampNs,
    contact_ms: Option<f64>,
    step_ms: Option<f64>,
    impact: f64,
}

impl GaitEventDetector {
    pub fn new(config: GaitDetectorConfig) -> StrideResult<Self> {
        for (name, range) in [
            ("contact time range", config.contact_time_range_ms),
            ("step time range", config.step_time_range_ms),
        ] {
            if !(range[0] >= 0.0 && range[0] <= range[1]) {
                return Err(StrideError::invalid_argument(format!(
                    "{name} must satisfy 0 <= min <= max, got [{}, {}]",
                    range[0], range[1]
                )));
            }
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &GaitDetectorConfig {
        &self.config
    }

    /// Run the detector on the vertical acceleration of IMU samples.
    pub fn detect_imu(&self, samples: &[ImuSample]) -> StrideResult<GaitDetection> {
        let times: Vec<TimestampNs> = samples.iter().map(|s| s.timestamp_ns).collect();
        let signal: Vec<f64> = samples.iter().map(|s| s.a_vert).collect();
        self.detect(&times, &signal)
    }

    /// Detect gait cycles in `signal` sampled at `times`.
    pub fn detect(&self, times: &[TimestampNs], signal: &[f64]) -> StrideResult<GaitDetection> {
        ensure_same_len("acceleration signal", times.len(), signal.len())?;
        debug_assert!(is_sorted(times), "signal timestamps must be sorted");

        let event = |kind: ContactKind| move |idx: usize| GaitEvent {
            timestamp_ns: times[idx],
            kind,
            amplitude: signal[idx],
        };
        let initial_contacts: Vec<GaitEvent> = find_troughs(signal, self.config.peak_prominence)
            .into_iter()
            .map(|p| p.index)
            .map(event(ContactKind::Initial))
            .collect();
        let final_contacts: Vec<GaitEvent> = find_peaks(signal, self.config.peak_prominence)
            .into_iter()
            .map(|p| p.index)
            .map(event(ContactKind::Final))
            .collect();

        tracing::debug!(
            ic = initial_contacts.len(),
            fc = final_contacts.len(),
            "Found contact candidates"
        );

        let cycles = self.pair_events(&initial_contacts, &final_contacts);

        tracing::debug!(cycles = cycles.len(), "Paired gait cycles");

        Ok(GaitDetection {
            cycles,
            initial_contacts,
            final_contacts,
        })
    }

    fn pair_events(&self, ics: &[GaitEvent], fcs: &[GaitEvent]) -> Vec<GaitCycle> {
        let [c_min, c_max] = self.config.contact_time_range_ms.map(ms_to_ns);
        let [s_min, s_max] = self.config.step_time_range_ms.map(ms_to_ns);

        let ic_times: Vec<TimestampNs> = ics.iter().map(|e| e.timestamp_ns).collect();
        let fc_times: Vec<TimestampNs> = fcs.iter().map(|e| e.timestamp_ns).collect();

        let contact_targets: Vec<TimestampNs> = ic_times.iter().map(|t| t + c_min).collect();
        let step_targets: Vec<TimestampNs> = ic_times.iter().map(|t| t + s_min).collect();

        let contact_matches = TemporalJoiner::forward()
            .with_tolerance(c_max - c_min)
            .match_times(&contact_targets, &fc_times);
        let step_matches = TemporalJoiner::forward()
            .with_tolerance(s_max - s_min)
            .match_times(&step_targets, &ic_times);

        let candidates: Vec<Candidate> = ics
            .iter()
            .enumerate()
            .map(|(i, ic)| Candidate {
                t: ic.timestamp_ns,
                contact_ms: contact_matches[i].map(|j| ns_to_ms(fc_times[j] - ic.timestamp_ns)),
                step_ms: step_matches[i].map(|j| ns_to_ms(ic_times[j] - ic.timestamp_ns)),
                impact: -ic.amplitude,
            })
            .collect();

        // Double detections: the next IC must be at least one minimum step away.
        let survivors: Vec<&Candidate> = candidates
            .iter()
            .enumerate()
            .filter(|(i, c)| {
                candidates
                    .get(i + 1)
                    .is_some_and(|next| next.t - c.t > s_min)
            })
            .map(|(_, c)| c)
            .filter(|c| matches!((c.step_ms, c.contact_ms), (Some(s), Some(ct)) if s > ct))
            .collect();

        survivors
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                let stride_ns = survivors.get(i + 2)?.t - c.t;
                if stride_ns <= 0 || stride_ns >= 2 * s_max {
                    return None;
                }
                let step = c.step_ms?;
                let contact = c.contact_ms?;
                Some(GaitCycle {
                    timestamp_ns: c.t,
                    contact_time_ms: contact,
                    step_duration_ms: step,
                    stride_duration_ms: ns_to_ms(stride_ns),
                    cadence: 60_000.0 / step,
                    flight_ratio: (step - contact) / step,
                    impact: c.impact,
                })
            })
            .collect()
    }
}

impl Default for GaitEventDetector {
    fn default() -> Self {
        Self {
            config: GaitDetectorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stridelab_common::clock::NANOS_PER_MILLI;

    /// Square-ish gait pattern: an IC trough every `step_ms`, an FC peak
    /// `contact_ms` later, flat zero elsewhere. One sample per millisecond.
    fn synthetic(n_steps: usize, step_ms: usize, contact_ms: usize) -> (Vec<i64>, Vec<f64>) {
        let len = n_steps * step_ms + 100;
        let times: Vec<i64> = (0..len as i64).map(|ms| ms * NANOS_PER_MILLI).collect();
        let mut signal = vec![0.0; len];
        for k in 0..n_steps {
            let ic = 50 + k * step_ms;
            signal[ic] = -10.0;
            signal[ic + contact_ms] = 5.0;
        }
        (times, signal)
    }

    #[test]
    fn test_regular_steps() {
        let (times, signal) = synthetic(10, 400, 150);
        let detection = GaitEventDetector::default().detect(&times, &signal).unwrap();

        assert_eq!(detection.initial_contacts.len(), 10);
        assert_eq!(detection.final_contacts.len(), 10);
        // The last IC has no successor and the two before it no stride.
        assert_eq!(detection.cycles.len(), 7);

        let cycle = detection.cycles[0];
        assert_eq!(cycle.timestamp_ns, 50 * NANOS_PER_MILLI);
        assert!((cycle.contact_time_ms - 150.0).abs() < 1e-9);
        assert!((cycle.step_duration_ms - 400.0).abs() < 1e-9);
        assert!((cycle.stride_duration_ms - 800.0).abs() < 1e-9);
        assert!((cycle.cadence - 150.0).abs() < 1e-9);
        assert!((cycle.flight_ratio - 0.625).abs() < 1e-9);
        assert!((cycle.impact - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_contact_outside_window_drops_cycles() {
        // FC 300 ms after IC is outside the default [50, 200] window.
        let (times, signal) = synthetic(6, 400, 300);
        let detection = GaitEventDetector::default().detect(&times, &signal).unwrap();
        assert!(detection.cycles.is_empty());
        assert_eq!(detection.ic_times().len(), 6);
    }

    #[test]
    fn test_invalid_inputs() {
        let detector = GaitEventDetector::default();
        assert!(detector.detect(&[0, 1], &[0.0]).is_err());
        assert!(detector.detect(&[], &[]).unwrap().cycles.is_empty());

        let config = GaitDetectorConfig {
            contact_time_range_ms: [200.0, 50.0],
            ..GaitDetectorConfig::default()
        };
        assert!(GaitEventDetector::new(config).is_err());
    }
}
