//! Second-order Butterworth low-pass filter.

use std::f64::consts::{PI, SQRT_2};

use stridelab_common::error::{StrideError, StrideResult};

/// A single second-order section designed with the bilinear transform.
///
/// Filtering starts from a zero state and runs forward only, so the output
/// is delayed with respect to the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButterworthLowPass {
    b: [f64; 3],
    /// Feedback coefficients `a1`, `a2` (`a0` is normalized to 1).
    a: [f64; 2],
}

impl ButterworthLowPass {
    pub fn new(cutoff_hz: f64, sample_rate_hz: f64) -> StrideResult<Self> {
        if !(sample_rate_hz > 0.0) {
            return Err(StrideError::invalid_argument(format!(
                "sample rate must be positive, got {sample_rate_hz}"
            )));
        }
        if !(cutoff_hz > 0.0 && cutoff_hz < sample_rate_hz / 2.0) {
            return Err(StrideError::invalid_argument(format!(
                "cutoff {cutoff_hz} Hz must lie in (0, {}) for a {sample_rate_hz} Hz signal",
                sample_rate_hz / 2.0
            )));
        }

        let wc = (PI * cutoff_hz / sample_rate_hz).tan();
        let wc2 = wc * wc;
        let norm = 1.0 + SQRT_2 * wc + wc2;

        let b0 = wc2 / norm;
        Ok(Self {
            b: [b0, 2.0 * b0, b0],
            a: [2.0 * (wc2 - 1.0) / norm, (1.0 - SQRT_2 * wc + wc2) / norm],
        })
    }

    pub fn coefficients(&self) -> ([f64; 3], [f64; 2]) {
        (self.b, self.a)
    }

    /// Filter `input` (transposed direct form II).
    pub fn filter(&self, input: &[f64]) -> Vec<f64> {
        let [b0, b1, b2] = self.b;
        let [a1, a2] = self.a;
        let (mut z1, mut z2) = (0.0, 0.0);

        input
            .iter()
            .map(|&x| {
                let y = b0 * x + z1;
                z1 = b1 * x - a1 * y + z2;
                z2 = b2 * x - a2 * y;
                y
            })
            .collect()
    }
}
