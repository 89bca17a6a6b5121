//! Property tests for bouts, joins and symmetry indices.

use proptest::prelude::*;

use stridelab_gait_model::gait::SymmetryMethod;
use stridelab_processing_core::asof::TemporalJoiner;
use stridelab_processing_core::bout_window::annotate_bouts_with;
use stridelab_processing_core::bouts::extract_bouts;
use stridelab_processing_core::symmetry::symmetry_index;

/// Strictly increasing timestamps built from positive gaps.
fn increasing_times(gaps: &[i64]) -> Vec<i64> {
    gaps.iter()
        .scan(0_i64, |t, gap| {
            *t += gap;
            Some(*t)
        })
        .collect()
}

/// Sorted timestamps that may repeat.
fn sorted_times(mut values: Vec<i64>) -> Vec<i64> {
    values.sort_unstable();
    values
}

proptest! {
    #[test]
    fn bouts_cover_every_sample(
        rows in prop::collection::vec((1_i64..1_000, any::<bool>()), 1..200)
    ) {
        let gaps: Vec<i64> = rows.iter().map(|(g, _)| *g).collect();
        let valid: Vec<bool> = rows.iter().map(|(_, v)| *v).collect();
        let times = increasing_times(&gaps);

        let bouts = extract_bouts(&times, &valid, true).unwrap();

        prop_assert_eq!(bouts.iter().map(|b| b.count).sum::<usize>(), times.len());
        prop_assert_eq!(bouts[0].start_ns, times[0]);
        prop_assert_eq!(bouts[bouts.len() - 1].end_ns, times[times.len() - 1]);
        for pair in bouts.windows(2) {
            prop_assert!(pair[0].end_ns < pair[1].start_ns);
            prop_assert_ne!(pair[0].valid, pair[1].valid);
        }

        let mut row = 0;
        for bout in &bouts {
            prop_assert_eq!(bout.start_ns, times[row]);
            prop_assert!(valid[row..row + bout.count].iter().all(|v| *v == bout.valid));
            row += bout.count;
            prop_assert_eq!(bout.end_ns, times[row - 1]);
        }
    }

    #[test]
    fn dropping_invalid_bouts_keeps_order(
        rows in prop::collection::vec((1_i64..1_000, any::<bool>()), 1..200)
    ) {
        let gaps: Vec<i64> = rows.iter().map(|(g, _)| *g).collect();
        let valid: Vec<bool> = rows.iter().map(|(_, v)| *v).collect();
        let times = increasing_times(&gaps);

        let all = extract_bouts(&times, &valid, true).unwrap();
        let kept = extract_bouts(&times, &valid, false).unwrap();
        let expected: Vec<_> = all.into_iter().filter(|b| b.valid).collect();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn reannotating_own_bouts_is_idempotent(
        rows in prop::collection::vec((1_i64..1_000, any::<bool>()), 1..200)
    ) {
        let gaps: Vec<i64> = rows.iter().map(|(g, _)| *g).collect();
        let valid: Vec<bool> = rows.iter().map(|(_, v)| *v).collect();
        let times = increasing_times(&gaps);

        let bouts = extract_bouts(&times, &valid, true).unwrap();
        let mut annotated = valid.clone();
        annotate_bouts_with(&times, &bouts, &mut annotated, |_, b| b.valid).unwrap();
        prop_assert_eq!(&annotated, &valid);

        let again = extract_bouts(&times, &annotated, true).unwrap();
        prop_assert_eq!(again, bouts);
    }

    #[test]
    fn backward_join_respects_tolerance(
        left in prop::collection::vec(0_i64..10_000, 0..60),
        right in prop::collection::vec(0_i64..10_000, 0..60),
        tolerance in 0_i64..500,
    ) {
        let left = sorted_times(left);
        let right = sorted_times(right);
        let matches = TemporalJoiner::backward()
            .with_tolerance(tolerance)
            .match_times(&left, &right);

        prop_assert_eq!(matches.len(), left.len());
        for (t, m) in left.iter().zip(&matches) {
            let candidate = right.iter().rev().find(|&&r| r <= *t && t - r <= tolerance).copied();
            match m {
                Some(idx) => {
                    let r = right[*idx];
                    prop_assert!(r <= *t);
                    prop_assert!(t - r <= tolerance);
                    prop_assert_eq!(Some(r), candidate);
                }
                None => prop_assert!(candidate.is_none()),
            }
        }
    }

    #[test]
    fn forward_join_respects_tolerance(
        left in prop::collection::vec(0_i64..10_000, 0..60),
        right in prop::collection::vec(0_i64..10_000, 0..60),
        tolerance in 0_i64..500,
    ) {
        let left = sorted_times(left);
        let right = sorted_times(right);
        let matches = TemporalJoiner::forward()
            .with_tolerance(tolerance)
            .match_times(&left, &right);

        for (t, m) in left.iter().zip(&matches) {
            let candidate = right.iter().find(|&&r| r >= *t && r - t <= tolerance).copied();
            prop_assert_eq!(m.map(|idx| right[idx]), candidate);
        }
    }

    #[test]
    fn equal_sides_are_symmetric(value in 0.01_f64..1_000.0, sigma in 0.0_f64..100.0) {
        for method in [SymmetryMethod::Si, SymmetryMethod::Sa, SymmetryMethod::Usi, SymmetryMethod::Wusi] {
            let v = symmetry_index(method, value, value, sigma);
            prop_assert!(v.abs() < 1e-9, "{} gave {}", method, v);
        }
    }

    #[test]
    fn swapping_sides_flips_sign(left in 0.01_f64..1_000.0, right in 0.01_f64..1_000.0) {
        for method in [SymmetryMethod::Si, SymmetryMethod::Sa, SymmetryMethod::Usi] {
            let forward = symmetry_index(method, left, right, 0.0);
            let swapped = symmetry_index(method, right, left, 0.0);
            prop_assert!((forward + swapped).abs() < 1e-9, "{}: {} vs {}", method, forward, swapped);
        }
    }
}
