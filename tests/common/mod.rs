//! Shared helpers for the engine-vs-oracle integration suites.

use matrix_profile::MatrixProfile;

/// Deterministic pseudo-random series, uniform in [-1000, 1000).
///
/// Plain 64-bit LCG using Knuth's MMIX multiplier/increment; the top 53
/// bits of the state map to the unit interval.
pub fn pseudo_random_series(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            unit * 2000.0 - 1000.0
        })
        .collect()
}

/// Distances compare equal when both are infinite, otherwise to 1e-5
/// relative tolerance.
pub fn distances_close(a: f64, b: f64) -> bool {
    if a.is_infinite() || b.is_infinite() {
        return a.is_infinite() && b.is_infinite();
    }
    (a - b).abs() <= 1e-5 * a.abs().max(b.abs()).max(1.0)
}

/// Assert two profiles agree on distances (overall, left, right).
pub fn assert_profiles_match(name: &str, got: &MatrixProfile, want: &MatrixProfile) {
    assert_eq!(got.len(), want.len(), "{name}: length mismatch");
    let lanes: [(&str, &[f64], &[f64]); 3] = [
        ("distances", &got.distances, &want.distances),
        ("left", &got.left_distances, &want.left_distances),
        ("right", &got.right_distances, &want.right_distances),
    ];
    for (lane, g, w) in lanes {
        for (i, (a, b)) in g.iter().zip(w.iter()).enumerate() {
            assert!(
                distances_close(*a, *b),
                "{name}/{lane} mismatch at {i}: got {a}, want {b}"
            );
        }
        assert!(g.iter().all(|d| !d.is_nan()), "{name}/{lane} contains NaN");
    }
}

/// Direct z-normalized Euclidean distance between two finite, non-constant
/// windows; used to verify that a profile's recorded index is consistent
/// with its recorded distance.
pub fn znorm_distance(a: &[f64], b: &[f64]) -> f64 {
    let m = a.len() as f64;
    let norm = |w: &[f64]| -> Option<Vec<f64>> {
        let mu = w.iter().sum::<f64>() / m;
        let sigma = (w.iter().map(|x| (x - mu) * (x - mu)).sum::<f64>() / m).sqrt();
        if sigma < 1e-15 {
            None
        } else {
            Some(w.iter().map(|x| (x - mu) / sigma).collect())
        }
    };
    match (norm(a), norm(b)) {
        (Some(za), Some(zb)) => za
            .iter()
            .zip(&zb)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt(),
        (None, None) => 0.0,
        _ => (2.0 * m).sqrt(),
    }
}

/// Check every finite profile entry's index points at a window whose direct
/// distance matches the recorded minimum.
pub fn assert_indices_consistent(
    name: &str,
    mp: &MatrixProfile,
    query: &[f64],
    reference: &[f64],
) {
    let m = mp.m;
    for (i, (&d, &j)) in mp.distances.iter().zip(mp.indices.iter()).enumerate() {
        if !d.is_finite() {
            assert_eq!(j, -1, "{name}: infinite entry {i} must have index -1");
            continue;
        }
        let j = j as usize;
        let direct = znorm_distance(&query[i..i + m], &reference[j..j + m]);
        assert!(
            (d - direct).abs() <= 1e-5 * direct.max(1.0),
            "{name}: entry {i} records d={d} at index {j}, direct distance {direct}"
        );
    }
}
