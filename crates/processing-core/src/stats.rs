//! Summary statistics over feature columns.
//!
//! Empty inputs yield NaN rather than an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stridelab_gait_model::gait::MergedStep;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (`n - 1` in the denominator).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Percentile `p` in `[0, 100]` with linear interpolation between ranks.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

/// Interquartile range (75th minus 25th percentile).
pub fn iqr(values: &[f64]) -> f64 {
    percentile(values, 75.0) - percentile(values, 25.0)
}

/// Root mean square distance to `reference`.
pub fn rmse(values: &[f64], reference: f64) -> f64 {
    let squared: Vec<f64> = values.iter().map(|v| (reference - v).powi(2)).collect();
    mean(&squared).sqrt()
}

/// Mean absolute distance to `reference`.
pub fn mae(values: &[f64], reference: f64) -> f64 {
    let abs: Vec<f64> = values.iter().map(|v| (reference - v).abs()).collect();
    mean(&abs)
}

/// Descriptive statistics of one feature. Errors are relative to 0, the
/// ideal value of a symmetry index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub iqr: f64,
    pub rmse: f64,
    pub mae: f64,
}

impl FeatureSummary {
    /// Summarize the defined (non-NaN) values.
    pub fn from_values(values: &[f64]) -> Self {
        let defined: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        Self {
            count: defined.len(),
            mean: mean(&defined),
            std: std_dev(&defined),
            median: median(&defined),
            iqr: iqr(&defined),
            rmse: rmse(&defined, 0.0),
            mae: mae(&defined, 0.0),
        }
    }
}

/// Statistics of every column for one group of merged steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary<K> {
    pub key: K,
    pub rows: usize,
    pub features: BTreeMap<String, FeatureSummary>,
}

/// Group `rows` by `key` and summarize every column per group.
///
/// Groups appear in the order their key is first seen. A column absent
/// from a row counts as undefined for that row.
pub fn summarize_by<K, F>(rows: &[MergedStep], key: F) -> Vec<GroupSummary<K>>
where
    K: PartialEq,
    F: Fn(&MergedStep) -> K,
{
    summarize_pairs(rows.iter().map(|row| (key(row), row)))
}

/// Like [`summarize_by`], for rows that already carry their key.
pub fn summarize_pairs<'a, K, I>(pairs: I) -> Vec<GroupSummary<K>>
where
    K: PartialEq,
    I: IntoIterator<Item = (K, &'a MergedStep)>,
{
    let mut groups: Vec<(K, Vec<&MergedStep>)> = Vec::new();
    for (k, row) in pairs {
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(row),
            None => groups.push((k, vec![row])),
        }
    }

    groups
        .into_iter()
        .map(|(key, members)| {
            let mut values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
            for row in &members {
                for (name, value) in &row.columns {
                    values.entry(name.as_str()).or_default().push(*value);
                }
            }
            GroupSummary {
                key,
                rows: members.len(),
                features: values
                    .into_iter()
                    .map(|(name, v)| (name.to_string(), FeatureSummary::from_values(&v)))
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_statistics() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(mean(&values), 2.5);
        assert!((std_dev(&values) - 1.290_994_448_7).abs() < 1e-9);
        assert_eq!(median(&values), 2.5);
        // numpy: percentile 75 = 3.25, 25 = 1.75.
        assert!((iqr(&values) - 1.5).abs() < 1e-12);
        assert!((rmse(&values, 0.0) - 7.5_f64.sqrt()).abs() < 1e-12);
        assert_eq!(mae(&[-1.0, 1.0], 0.0), 1.0);
        assert_eq!(mae(&[3.0], 1.0), 2.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(mean(&[]).is_nan());
        assert!(std_dev(&[1.0]).is_nan());
        assert!(median(&[]).is_nan());
        assert_eq!(median(&[5.0]), 5.0);
    }

    #[test]
    fn test_summary_ignores_nan() {
        let summary = FeatureSummary::from_values(&[f64::NAN, 0.1, -0.1]);
        assert_eq!(summary.count, 2);
        assert!(summary.mean.abs() < 1e-12);
        assert!((summary.mae - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_summarize_by_keeps_first_seen_order() {
        let row = |t: i64, foot: &str, v: f64| {
            let mut columns = BTreeMap::new();
            columns.insert("impact_sa".to_string(), v);
            MergedStep {
                timestamp_ns: t,
                initial_foot: foot.to_string(),
                bad_half_step: false,
                columns,
            }
        };
        let rows = vec![row(0, "right", 0.2), row(1, "left", 0.0), row(2, "right", 0.4)];
        let groups = summarize_by(&rows, |r| r.initial_foot.clone());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "right");
        assert_eq!(groups[0].rows, 2);
        assert!((groups[0].features["impact_sa"].mean - 0.3).abs() < 1e-12);
        assert_eq!(groups[1].key, "left");
    }
}
