//! Applying bout windows to another time series.
//!
//! Every bout covers the half-open window `[start, end)`. Target rows inside
//! a window are labelled with a value derived from the bout, or receive a
//! value interpolated from a reference series. Bouts are applied in table
//! order, so under overlap the last bout wins.

use serde::{Deserialize, Serialize};
use stridelab_common::clock::secs_to_ns;
use stridelab_common::error::{ensure_same_len, StrideError, StrideResult};
use stridelab_gait_model::bout::Bout;
use stridelab_gait_model::record::TimestampNs;

use crate::asof::is_sorted;

/// Offsets added to bout boundaries, in seconds. Negative values move the
/// boundary earlier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoutPadding {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl BoutPadding {
    pub fn new(start_secs: f64, end_secs: f64) -> Self {
        Self {
            start_secs,
            end_secs,
        }
    }

    /// Build from a `[start, end]` window as stored in configuration.
    pub fn from_window(window: [f64; 2]) -> Self {
        Self::new(window[0], window[1])
    }
}

/// Return a copy of `bouts` with padded boundaries.
pub fn pad_bouts<K: Clone>(bouts: &[Bout<K>], padding: BoutPadding) -> Vec<Bout<K>> {
    let start = secs_to_ns(padding.start_secs);
    let end = secs_to_ns(padding.end_secs);
    bouts
        .iter()
        .map(|b| Bout {
            start_ns: b.start_ns + start,
            end_ns: b.end_ns + end,
            ..b.clone()
        })
        .collect()
}

/// Index range of sorted `times` inside `[start, end)`.
fn window_rows(times: &[TimestampNs], start: TimestampNs, end: TimestampNs) -> std::ops::Range<usize> {
    let lo = times.partition_point(|&t| t < start);
    let hi = times.partition_point(|&t| t < end).max(lo);
    lo..hi
}

/// Write `value(bout_index, bout)` into `out` for every row covered by a
/// bout. Rows outside every window keep whatever `out` already holds.
///
/// `times` must be sorted ascending and `out` aligned to it.
pub fn annotate_bouts_with<K, T, F>(
    times: &[TimestampNs],
    bouts: &[Bout<K>],
    out: &mut [T],
    mut value: F,
) -> StrideResult<()>
where
    F: FnMut(usize, &Bout<K>) -> T,
    T: Clone,
{
    ensure_same_len("annotation buffer", times.len(), out.len())?;
    debug_assert!(is_sorted(times), "target series must be sorted by time");

    for (idx, bout) in bouts.iter().enumerate() {
        let rows = window_rows(times, bout.start_ns, bout.end_ns);
        if rows.is_empty() {
            continue;
        }
        let v = value(idx, bout);
        out[rows].fill(v);
    }
    Ok(())
}

/// Label covered rows with their bout's validity flag.
pub fn annotate_valid<K>(times: &[TimestampNs], bouts: &[Bout<K>], default: bool) -> Vec<bool> {
    let mut out = vec![default; times.len()];
    fill(times, bouts, &mut out, |_, b| b.valid);
    out
}

/// Label covered rows with the position of their bout in the table.
pub fn annotate_index<K>(times: &[TimestampNs], bouts: &[Bout<K>]) -> Vec<Option<usize>> {
    let mut out = vec![None; times.len()];
    fill(times, bouts, &mut out, |idx, _| Some(idx));
    out
}

/// Label covered rows with a constant.
pub fn annotate_constant<K, T: Clone>(
    times: &[TimestampNs],
    bouts: &[Bout<K>],
    value: T,
    default: T,
) -> Vec<T> {
    let mut out = vec![default; times.len()];
    fill(times, bouts, &mut out, |_, _| value.clone());
    out
}

/// Label covered rows with their bout's group key.
pub fn annotate_key<K: Clone>(times: &[TimestampNs], bouts: &[Bout<K>]) -> Vec<Option<K>> {
    let mut out = vec![None; times.len()];
    fill(times, bouts, &mut out, |_, b| Some(b.key.clone()));
    out
}

// Buffers built here always match `times`, so the length check cannot fail.
fn fill<K, T: Clone>(
    times: &[TimestampNs],
    bouts: &[Bout<K>],
    out: &mut [T],
    value: impl FnMut(usize, &Bout<K>) -> T,
) {
    let _ = annotate_bouts_with(times, bouts, out, value);
}

/// Piecewise-linear interpolation over sorted reference points, extrapolating
/// from the outermost segments. Needs at least two points.
pub(crate) fn interpolate_at(ref_times: &[TimestampNs], ref_values: &[f64], t: TimestampNs) -> f64 {
    let n = ref_times.len();
    let hi = ref_times.partition_point(|&x| x < t).clamp(1, n - 1);
    let lo = hi - 1;

    let (x0, x1) = (ref_times[lo], ref_times[hi]);
    if x1 == x0 {
        return ref_values[lo];
    }
    let frac = (t - x0) as f64 / (x1 - x0) as f64;
    ref_values[lo] + frac * (ref_values[hi] - ref_values[lo])
}

/// For every bout, write into `out` the reference series interpolated at
/// the timestamps of the covered target rows.
///
/// Rows outside every window are left untouched. The reference series must
/// hold at least two points whenever any row is covered.
pub fn interpolate_bouts<K>(
    times: &[TimestampNs],
    bouts: &[Bout<K>],
    ref_times: &[TimestampNs],
    ref_values: &[f64],
    out: &mut [f64],
) -> StrideResult<()> {
    ensure_same_len("interpolation buffer", times.len(), out.len())?;
    ensure_same_len("reference values", ref_times.len(), ref_values.len())?;
    debug_assert!(is_sorted(times), "target series must be sorted by time");
    debug_assert!(is_sorted(ref_times), "reference series must be sorted by time");

    for bout in bouts {
        let rows = window_rows(times, bout.start_ns, bout.end_ns);
        if rows.is_empty() {
            continue;
        }
        if ref_times.len() < 2 {
            return Err(StrideError::invalid_argument(format!(
                "interpolation needs at least 2 reference points, got {}",
                ref_times.len()
            )));
        }
        for row in rows {
            out[row] = interpolate_at(ref_times, ref_values, times[row]);
        }
    }
    Ok(())
}
