//! Bout extraction.
//!
//! Turns a validity vector aligned to a time-ordered series into a table
//! of maximal contiguous runs. A new bout starts whenever the validity or
//! the group key changes from the previous row.

use stridelab_common::error::{ensure_same_len, StrideResult};
use stridelab_gait_model::bout::Bout;
use stridelab_gait_model::record::TimestampNs;

/// Extract bouts from a validity vector.
///
/// With `keep_invalid = false` the invalid bouts are dropped; the order of
/// the remaining bouts is unchanged.
pub fn extract_bouts(
    times: &[TimestampNs],
    valid: &[bool],
    keep_invalid: bool,
) -> StrideResult<Vec<Bout>> {
    let keys = vec![(); times.len()];
    extract_bouts_by(times, valid, &keys, keep_invalid)
}

/// Extract bouts, additionally splitting whenever `keys` changes.
pub fn extract_bouts_by<K: Clone + PartialEq>(
    times: &[TimestampNs],
    valid: &[bool],
    keys: &[K],
    keep_invalid: bool,
) -> StrideResult<Vec<Bout<K>>> {
    ensure_same_len("validity", times.len(), valid.len())?;
    ensure_same_len("bout keys", times.len(), keys.len())?;

    let mut bouts: Vec<Bout<K>> = Vec::new();
    for (idx, &t) in times.iter().enumerate() {
        let boundary = idx == 0 || valid[idx] != valid[idx - 1] || keys[idx] != keys[idx - 1];

        match bouts.last_mut() {
            Some(current) if !boundary => {
                current.start_ns = current.start_ns.min(t);
                current.end_ns = current.end_ns.max(t);
                current.count += 1;
            }
            _ => bouts.push(Bout {
                start_ns: t,
                end_ns: t,
                count: 1,
                valid: valid[idx],
                key: keys[idx].clone(),
            }),
        }
    }

    let total = bouts.len();
    if !keep_invalid {
        bouts.retain(|b| b.valid);
    }

    tracing::debug!(
        samples = times.len(),
        bouts = total,
        kept = bouts.len(),
        "Extracted bouts"
    );

    Ok(bouts)
}
