//! Left/right symmetry indices.
//!
//! All four formulas start from the angle `phi = atan2(1, L / R)`, which is
//! `pi/4` for perfectly symmetric values. See Alves et al. (2020) for the
//! definitions.

use std::collections::BTreeSet;
use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

use stridelab_gait_model::gait::{MergedStep, SymmetryMethod, SymmetryRecord};

/// Evaluate `method` on one left/right pair.
///
/// `sigma` is only used by [`SymmetryMethod::Wusi`]: the larger of the
/// population standard deviations of the left and right columns.
pub fn symmetry_index(method: SymmetryMethod, left: f64, right: f64, sigma: f64) -> f64 {
    let phi = 1.0_f64.atan2(left / right);
    let (sin, cos) = phi.sin_cos();

    match method {
        SymmetryMethod::Si => (cos - sin) / (cos + sin),
        SymmetryMethod::Sa => {
            if phi < 0.75 * PI {
                0.5 - phi / FRAC_PI_2
            } else if phi < 1.75 * PI {
                -1.0 + phi / FRAC_PI_2
            } else {
                1.0 - phi / FRAC_PI_2
            }
        }
        SymmetryMethod::Usi => cos - sin,
        SymmetryMethod::Wusi => {
            let weight = 1.0
                - SQRT_2 * sigma / (2.0 * sigma * sigma + left * left + right * right).sqrt();
            weight * (cos - sin)
        }
    }
}

/// Population standard deviation of the defined values, NaN when none are.
pub(crate) fn population_std(values: impl IntoIterator<Item = f64>) -> f64 {
    let defined: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if defined.is_empty() {
        return f64::NAN;
    }
    let n = defined.len() as f64;
    let mean = defined.iter().sum::<f64>() / n;
    (defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Computes one symmetry method over the paired columns of merged steps.
#[derive(Debug, Clone)]
pub struct SymmetryCalculator {
    method: SymmetryMethod,
    suffixes: [String; 2],
}

impl SymmetryCalculator {
    pub fn new(method: SymmetryMethod) -> Self {
        Self {
            method,
            suffixes: ["_left".to_string(), "_right".to_string()],
        }
    }

    pub fn with_suffixes(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.suffixes = [left.into(), right.into()];
        self
    }

    pub fn method(&self) -> SymmetryMethod {
        self.method
    }

    /// Name of the column the results are stored in.
    pub fn column_name(&self, feature: &str) -> String {
        format!("{feature}_{}", self.method)
    }

    /// Base names that have both a left and a right column somewhere in
    /// `rows`, in alphabetical order.
    pub fn discover_features(&self, rows: &[MergedStep]) -> Vec<String> {
        let columns: BTreeSet<&str> = rows
            .iter()
            .flat_map(|r| r.columns.keys().map(String::as_str))
            .collect();
        let [left, right] = &self.suffixes;

        columns
            .iter()
            .filter_map(|c| c.strip_suffix(left.as_str()))
            .filter(|base| columns.contains(format!("{base}{right}").as_str()))
            .map(str::to_string)
            .collect()
    }

    /// Symmetry of every row for every feature. `features = None` uses
    /// [`Self::discover_features`].
    pub fn records(&self, rows: &[MergedStep], features: Option<&[String]>) -> Vec<SymmetryRecord> {
        let features = self.resolve_features(rows, features);
        let mut records = Vec::with_capacity(rows.len() * features.len());

        for feature in &features {
            let (left_col, right_col) = self.side_columns(feature);
            let sigma = self.sigma(rows, &left_col, &right_col);
            for row in rows {
                let left = row.column(&left_col);
                let right = row.column(&right_col);
                let value = if left.is_nan() || right.is_nan() {
                    f64::NAN
                } else {
                    symmetry_index(self.method, left, right, sigma)
                };
                records.push(SymmetryRecord {
                    timestamp_ns: row.timestamp_ns,
                    feature: feature.clone(),
                    method: self.method,
                    left,
                    right,
                    value,
                });
            }
        }
        records
    }

    /// Append `{feature}_{method}` columns to `rows`. Rows where the result
    /// is not finite get no column.
    pub fn apply(&self, rows: &mut [MergedStep], features: Option<&[String]>) -> Vec<SymmetryRecord> {
        let records = self.records(rows, features);
        let per_feature = rows.len();

        for chunk in records.chunks(per_feature.max(1)) {
            for (row, record) in rows.iter_mut().zip(chunk) {
                if record.value.is_finite() {
                    row.columns
                        .insert(self.column_name(&record.feature), record.value);
                }
            }
        }

        tracing::debug!(
            method = %self.method,
            rows = rows.len(),
            values = records.iter().filter(|r| r.value.is_finite()).count(),
            "Appended symmetry columns"
        );

        records
    }

    fn resolve_features(&self, rows: &[MergedStep], features: Option<&[String]>) -> Vec<String> {
        match features {
            Some(list) => list.to_vec(),
            None => self.discover_features(rows),
        }
    }

    fn side_columns(&self, feature: &str) -> (String, String) {
        (
            format!("{feature}{}", self.suffixes[0]),
            format!("{feature}{}", self.suffixes[1]),
        )
    }

    fn sigma(&self, rows: &[MergedStep], left_col: &str, right_col: &str) -> f64 {
        if self.method != SymmetryMethod::Wusi {
            return f64::NAN;
        }
        let left = population_std(rows.iter().map(|r| r.column(left_col)));
        let right = population_std(rows.iter().map(|r| r.column(right_col)));
        // NaN when either side has no defined values.
        if left.is_nan() || right.is_nan() {
            f64::NAN
        } else {
            left.max(right)
        }
    }
}
