use log::debug;

use crate::core::profile::{MatrixProfile, ProfileAccumulator};
use crate::core::stats::PreparedSeries;
use crate::engine::distance::{corr_to_distance, neg_correlation};
use crate::engine::sliding_dot::sliding_dot_product;
use crate::error::{check_window, ProfileError};

/// Minimum number of subsequences before dispatching to the parallel path.
#[cfg(feature = "parallel")]
const MIN_PARALLEL_SUBS: usize = 256;

/// Read-only context shared by the AB-join diagonal kernels.
struct AbCtx<'a> {
    a: &'a PreparedSeries,
    b: &'a PreparedSeries,
    m: usize,
    n_a: usize,
    n_b: usize,
    /// `qt_first_pos[k] = dot(A[0..m], B[k..k+m])` seeds positive diagonals.
    qt_first_pos: &'a [f64],
    /// `qt_first_neg[k] = dot(B[0..m], A[k..k+m])` seeds negative diagonals.
    qt_first_neg: &'a [f64],
}

/// Bidirectional AB-join: nearest neighbors for every subsequence of `ts_a`
/// in `ts_b`, and the sibling profile for `ts_b` in `ts_a`, from one traversal
/// of the rectangular distance matrix.
///
/// No exclusion zone applies; every diagonal is walked. Positive diagonals
/// start at `(0, k)`, negative diagonals at `(k, 0)`, each seeded from a
/// sliding dot product and advanced with the O(1) QT recurrence. Left/right
/// directional entries compare positions across the two series; the main
/// diagonal (equal positions) updates only the overall profiles.
pub fn ab_join(
    ts_a: &[f64],
    ts_b: &[f64],
    m: usize,
) -> Result<(MatrixProfile, MatrixProfile), ProfileError> {
    check_window(ts_a.len(), m)?;
    check_window(ts_b.len(), m)?;

    let a = PreparedSeries::new(ts_a, m);
    let b = PreparedSeries::new(ts_b, m);
    let n_a = a.n_subs();
    let n_b = b.n_subs();
    debug!("ab-join: n_a={}, n_b={}, m={}", ts_a.len(), ts_b.len(), m);

    let qt_first_pos = sliding_dot_product(&a.values[0..m], &b.values);
    let qt_first_neg = sliding_dot_product(&b.values[0..m], &a.values);

    let cx = AbCtx {
        a: &a,
        b: &b,
        m,
        n_a,
        n_b,
        qt_first_pos: &qt_first_pos,
        qt_first_neg: &qt_first_neg,
    };

    let (acc_a, acc_b) = traverse(&cx);

    let two_m = 2.0 * m as f64;
    let mut mp_a = MatrixProfile::new(n_a, m, 0);
    let mut mp_b = MatrixProfile::new(n_b, m, 0);
    acc_a.write_to(&mut mp_a, |nc| corr_to_distance(two_m, nc));
    acc_b.write_to(&mut mp_b, |nc| corr_to_distance(two_m, nc));
    Ok((mp_a, mp_b))
}

#[cfg(not(feature = "parallel"))]
fn traverse(cx: &AbCtx<'_>) -> (ProfileAccumulator, ProfileAccumulator) {
    let mut acc_a = ProfileAccumulator::new(cx.n_a);
    let mut acc_b = ProfileAccumulator::new(cx.n_b);
    for k in 0..cx.n_b {
        positive_diagonal(cx, k, &mut acc_a, &mut acc_b);
    }
    for k in 1..cx.n_a {
        negative_diagonal(cx, k, &mut acc_a, &mut acc_b);
    }
    (acc_a, acc_b)
}

#[cfg(feature = "parallel")]
fn traverse(cx: &AbCtx<'_>) -> (ProfileAccumulator, ProfileAccumulator) {
    use rayon::prelude::*;

    if cx.n_a.min(cx.n_b) < MIN_PARALLEL_SUBS {
        let mut acc_a = ProfileAccumulator::new(cx.n_a);
        let mut acc_b = ProfileAccumulator::new(cx.n_b);
        for k in 0..cx.n_b {
            positive_diagonal(cx, k, &mut acc_a, &mut acc_b);
        }
        for k in 1..cx.n_a {
            negative_diagonal(cx, k, &mut acc_a, &mut acc_b);
        }
        return (acc_a, acc_b);
    }

    let n_threads = rayon::current_num_threads();

    let chunk_pos = cx.n_b.div_ceil(n_threads);
    let pos: Vec<(ProfileAccumulator, ProfileAccumulator)> = (0..n_threads)
        .into_par_iter()
        .map(|t| {
            let start_k = t * chunk_pos;
            let end_k = (start_k + chunk_pos).min(cx.n_b);
            let mut acc_a = ProfileAccumulator::new(cx.n_a);
            let mut acc_b = ProfileAccumulator::new(cx.n_b);
            for k in start_k..end_k {
                positive_diagonal(cx, k, &mut acc_a, &mut acc_b);
            }
            (acc_a, acc_b)
        })
        .collect();

    let n_neg = cx.n_a.saturating_sub(1);
    let chunk_neg = n_neg.div_ceil(n_threads).max(1);
    let neg: Vec<(ProfileAccumulator, ProfileAccumulator)> = (0..n_threads)
        .into_par_iter()
        .map(|t| {
            let start_k = (t * chunk_neg + 1).min(cx.n_a);
            let end_k = (start_k + chunk_neg).min(cx.n_a);
            let mut acc_a = ProfileAccumulator::new(cx.n_a);
            let mut acc_b = ProfileAccumulator::new(cx.n_b);
            for k in start_k..end_k {
                negative_diagonal(cx, k, &mut acc_a, &mut acc_b);
            }
            (acc_a, acc_b)
        })
        .collect();

    let mut acc_a = ProfileAccumulator::new(cx.n_a);
    let mut acc_b = ProfileAccumulator::new(cx.n_b);
    for (la, lb) in pos.iter().chain(neg.iter()) {
        acc_a.merge(la);
        acc_b.merge(lb);
    }
    (acc_a, acc_b)
}

/// Diagonal starting at `(0, k)`: pairs `(p, p + k)`.
///
/// For `k > 0` the reference position is always ahead of the query position,
/// so the directional updates need no per-pair branch; `k == 0` is the main
/// diagonal where positions coincide.
fn positive_diagonal(
    cx: &AbCtx<'_>,
    k: usize,
    acc_a: &mut ProfileAccumulator,
    acc_b: &mut ProfileAccumulator,
) {
    let m = cx.m;
    let m_f = m as f64;
    let (sa, sb) = (&cx.a.stats, &cx.b.stats);
    let diag_len = cx.n_a.min(cx.n_b - k);

    let mut qt = cx.qt_first_pos[k];
    for p in 0..diag_len {
        let (i, j) = (p, p + k);
        if p > 0 {
            qt = qt - cx.a.values[i - 1] * cx.b.values[j - 1]
                + cx.a.values[i + m - 1] * cx.b.values[j + m - 1];
        }
        let nc = neg_correlation(
            qt,
            m_f,
            sa.mean[i],
            sb.mean[j],
            sa.m_sigma_inv[i],
            sb.m_sigma_inv[j],
            sa.valid[i],
            sb.valid[j],
        );
        if k == 0 {
            acc_a.update_overall(i, nc, j);
            acc_b.update_overall(j, nc, i);
        } else {
            acc_a.update_right(i, nc, j);
            acc_b.update_left(j, nc, i);
        }
    }
}

/// Diagonal starting at `(k, 0)` with `k >= 1`: pairs `(p + k, p)`. The query
/// position is always ahead of the reference position.
fn negative_diagonal(
    cx: &AbCtx<'_>,
    k: usize,
    acc_a: &mut ProfileAccumulator,
    acc_b: &mut ProfileAccumulator,
) {
    let m = cx.m;
    let m_f = m as f64;
    let (sa, sb) = (&cx.a.stats, &cx.b.stats);
    let diag_len = cx.n_b.min(cx.n_a - k);

    let mut qt = cx.qt_first_neg[k];
    for p in 0..diag_len {
        let (i, j) = (p + k, p);
        if p > 0 {
            qt = qt - cx.a.values[i - 1] * cx.b.values[j - 1]
                + cx.a.values[i + m - 1] * cx.b.values[j + m - 1];
        }
        let nc = neg_correlation(
            qt,
            m_f,
            sa.mean[i],
            sb.mean[j],
            sa.m_sigma_inv[i],
            sb.m_sigma_inv[j],
            sa.valid[i],
            sb.valid[j],
        );
        acc_a.update_left(i, nc, j);
        acc_b.update_right(j, nc, i);
    }
}
