//! Prominence-based peak detection.
//!
//! A peak is a sample strictly greater than its neighbours; flat tops count
//! once, at the midpoint of the plateau (rounded down). The first and last
//! samples are never peaks. A peak's prominence is its height above the
//! higher of the two lowest points reachable on either side without
//! climbing above the peak.

/// A detected local maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub prominence: f64,
}

/// Local maxima of `signal` with prominence of at least `min_prominence`,
/// in ascending index order.
pub fn find_peaks(signal: &[f64], min_prominence: f64) -> Vec<Peak> {
    local_maxima(signal)
        .into_iter()
        .map(|index| Peak {
            index,
            prominence: prominence(signal, index),
        })
        .filter(|p| p.prominence >= min_prominence)
        .collect()
}

/// Indices of the peaks of `-signal`.
pub fn find_troughs(signal: &[f64], min_prominence: f64) -> Vec<Peak> {
    let negated: Vec<f64> = signal.iter().map(|v| -v).collect();
    find_peaks(&negated, min_prominence)
}

fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let last = x.len() - 1;
    let mut i = 1;
    while i < last {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < last && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

fn prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let mut left_min = height;
    for &v in x[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &x[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(peaks: &[Peak]) -> Vec<usize> {
        peaks.iter().map(|p| p.index).collect()
    }

    #[test]
    fn test_simple_peaks_and_prominence() {
        let x = [0.0, 2.0, 0.0, 5.0, 1.0, 3.0, 0.0];
        let peaks = find_peaks(&x, 0.0);
        assert_eq!(indices(&peaks), vec![1, 3, 5]);
        assert_eq!(peaks[0].prominence, 2.0);
        assert_eq!(peaks[1].prominence, 5.0);
        // Right of 3.0 drops to 0, left to 1 before meeting 5.0.
        assert_eq!(peaks[2].prominence, 2.0);
    }

    #[test]
    fn test_plateau_midpoint() {
        let x = [0.0, 1.0, 3.0, 3.0, 3.0, 3.0, 1.0, 0.0];
        assert_eq!(indices(&find_peaks(&x, 0.0)), vec![3]);
    }

    #[test]
    fn test_edges_and_rising_plateau_are_not_peaks() {
        assert!(find_peaks(&[5.0, 1.0, 0.0], 0.0).is_empty());
        assert!(find_peaks(&[0.0, 1.0, 5.0], 0.0).is_empty());
        assert!(find_peaks(&[0.0, 2.0, 2.0, 3.0, 0.5], 0.0)
            .iter()
            .all(|p| p.index == 3));
        assert!(find_peaks(&[1.0, 2.0], 0.0).is_empty());
    }

    #[test]
    fn test_prominence_threshold() {
        let x = [0.0, 1.0, 0.0, 4.0, 0.0];
        assert_eq!(indices(&find_peaks(&x, 1.5)), vec![3]);
    }

    #[test]
    fn test_troughs() {
        let x = [0.0, -3.0, 0.0, -1.0, 0.0];
        assert_eq!(indices(&find_troughs(&x, 1.5)), vec![1]);
    }
}
