//! Brute-force O(n^2 * m) reference implementation.
//!
//! Recomputes every window's statistics and every pairwise distance directly,
//! with the same exclusion-zone, validity, and constant-subsequence policy as
//! the incremental engine. Exists to validate the engine's outputs; not
//! resource-optimized and not intended for production use.

use crate::core::profile::{exclusion_zone, MatrixProfile};
use crate::core::stats::SIGMA_FLOOR;
use crate::error::{check_window, ProfileError};

/// Per-window statistics recomputed from scratch, one window at a time.
struct WindowStats {
    mean: Vec<f64>,
    sigma: Vec<f64>,
    valid: Vec<bool>,
}

fn window_stats(ts: &[f64], m: usize) -> WindowStats {
    let n_subs = ts.len() - m + 1;
    let m_f = m as f64;
    let mut mean = Vec::with_capacity(n_subs);
    let mut sigma = Vec::with_capacity(n_subs);
    let mut valid = Vec::with_capacity(n_subs);

    for i in 0..n_subs {
        let w = &ts[i..i + m];
        if w.iter().any(|x| !x.is_finite()) {
            mean.push(f64::NAN);
            sigma.push(f64::NAN);
            valid.push(false);
            continue;
        }
        let mu = w.iter().sum::<f64>() / m_f;
        let var = w.iter().map(|x| (x - mu) * (x - mu)).sum::<f64>() / m_f;
        mean.push(mu);
        sigma.push(var.sqrt());
        valid.push(true);
    }

    WindowStats { mean, sigma, valid }
}

/// Direct z-normalized distance between window `i` of `ts_a` and window `j`
/// of `ts_b`, applying the shared validity/constant policy.
fn pair_distance(
    ts_a: &[f64],
    i: usize,
    ts_b: &[f64],
    j: usize,
    m: usize,
    wa: &WindowStats,
    wb: &WindowStats,
) -> f64 {
    if !wa.valid[i] || !wb.valid[j] {
        return f64::INFINITY;
    }
    let m_f = m as f64;
    let const_a = wa.sigma[i] < SIGMA_FLOOR;
    let const_b = wb.sigma[j] < SIGMA_FLOOR;
    if const_a && const_b {
        return 0.0;
    }
    if const_a || const_b {
        return (2.0 * m_f).sqrt();
    }

    let qt: f64 = ts_a[i..i + m]
        .iter()
        .zip(&ts_b[j..j + m])
        .map(|(a, b)| a * b)
        .sum();
    let r = (qt - m_f * wa.mean[i] * wb.mean[j]) / (m_f * wa.sigma[i] * wb.sigma[j]);
    (2.0 * m_f * (1.0 - r.clamp(-1.0, 1.0))).max(0.0).sqrt()
}

/// Record `d` at `mp[idx]` with neighbor `neighbor`, strict-minimum updates.
fn record(mp: &mut MatrixProfile, idx: usize, d: f64, neighbor: usize) {
    if d < mp.distances[idx] {
        mp.distances[idx] = d;
        mp.indices[idx] = neighbor as i64;
    }
    if neighbor < idx && d < mp.left_distances[idx] {
        mp.left_distances[idx] = d;
        mp.left_indices[idx] = neighbor as i64;
    }
    if neighbor > idx && d < mp.right_distances[idx] {
        mp.right_distances[idx] = d;
        mp.right_indices[idx] = neighbor as i64;
    }
}

/// Brute-force self-join with exclusion zone `ceil(m/4)`.
pub fn self_join(ts: &[f64], m: usize) -> Result<MatrixProfile, ProfileError> {
    check_window(ts.len(), m)?;

    let n_subs = ts.len() - m + 1;
    let zone = exclusion_zone(m);
    let stats = window_stats(ts, m);
    let mut mp = MatrixProfile::new(n_subs, m, zone);

    for i in 0..n_subs {
        for j in 0..n_subs {
            if i.abs_diff(j) <= zone {
                continue;
            }
            let d = pair_distance(ts, i, ts, j, m, &stats, &stats);
            record(&mut mp, i, d, j);
        }
    }
    Ok(mp)
}

/// Brute-force bidirectional AB-join (no exclusion zone).
pub fn ab_join(
    ts_a: &[f64],
    ts_b: &[f64],
    m: usize,
) -> Result<(MatrixProfile, MatrixProfile), ProfileError> {
    check_window(ts_a.len(), m)?;
    check_window(ts_b.len(), m)?;

    let n_a = ts_a.len() - m + 1;
    let n_b = ts_b.len() - m + 1;
    let sa = window_stats(ts_a, m);
    let sb = window_stats(ts_b, m);
    let mut mp_a = MatrixProfile::new(n_a, m, 0);
    let mut mp_b = MatrixProfile::new(n_b, m, 0);

    for i in 0..n_a {
        for j in 0..n_b {
            let d = pair_distance(ts_a, i, ts_b, j, m, &sa, &sb);
            if i == j {
                // Main diagonal: positions coincide, only the overall
                // profiles apply (mirrors the engine's accumulation rule).
                if d < mp_a.distances[i] {
                    mp_a.distances[i] = d;
                    mp_a.indices[i] = j as i64;
                }
                if d < mp_b.distances[j] {
                    mp_b.distances[j] = d;
                    mp_b.indices[j] = i as i64;
                }
            } else {
                record(&mut mp_a, i, d, j);
                record(&mut mp_b, j, d, i);
            }
        }
    }
    Ok((mp_a, mp_b))
}
