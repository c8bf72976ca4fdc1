use log::debug;

use crate::core::profile::{exclusion_zone, MatrixProfile, ProfileAccumulator};
use crate::core::stats::PreparedSeries;
use crate::engine::distance::{corr_to_distance, neg_correlation};
use crate::engine::sliding_dot::sliding_dot_product;
use crate::error::{check_window, ProfileError};

/// Minimum number of subsequences before dispatching to the parallel path;
/// below this, thread-dispatch overhead exceeds the parallelism gain.
#[cfg(feature = "parallel")]
const MIN_PARALLEL_SUBS: usize = 256;

/// Read-only context shared by the diagonal kernels.
struct DiagCtx<'a> {
    values: &'a [f64],
    m: usize,
    n_subs: usize,
    qt_first: &'a [f64],
    mean: &'a [f64],
    m_sigma_inv: &'a [f64],
    /// Precomputed `m * mean[i]`.
    m_mean: &'a [f64],
    valid: &'a [bool],
    /// Whether any window is constant or invalid; selects the checked kernel.
    checked: bool,
}

/// Matrix profile of a series against itself.
///
/// Diagonal traversal of the upper triangle: diagonal `k` holds pairs
/// `(i, i + k)`, seeded from one sliding dot product and advanced with the
/// O(1) QT recurrence
/// `QT[p] = QT[p-1] - T[p-1]*T[p+k-1] + T[p+m-1]*T[p+k+m-1]`.
/// Each computed pair updates both endpoints of the accumulator, so the lower
/// triangle is never walked. Trivial matches are excluded by skipping
/// diagonals `k <= ceil(m/4)` entirely.
///
/// Every diagonal reseeds from the convolution output, so incremental
/// floating-point drift is bounded by a single diagonal's length.
pub fn self_join(ts: &[f64], m: usize) -> Result<MatrixProfile, ProfileError> {
    check_window(ts.len(), m)?;

    let zone = exclusion_zone(m);
    let prepared = PreparedSeries::new(ts, m);
    let n_subs = prepared.n_subs();
    debug!(
        "self-join: n={}, m={}, n_subs={}, zone={}, checked={}",
        ts.len(),
        m,
        n_subs,
        zone,
        prepared.stats.needs_checked_path()
    );

    let qt_first = sliding_dot_product(&prepared.values[0..m], &prepared.values);
    let m_f = m as f64;
    let m_mean: Vec<f64> = prepared.stats.mean.iter().map(|&mu| m_f * mu).collect();

    let cx = DiagCtx {
        values: &prepared.values,
        m,
        n_subs,
        qt_first: &qt_first,
        mean: &prepared.stats.mean,
        m_sigma_inv: &prepared.stats.m_sigma_inv,
        m_mean: &m_mean,
        valid: &prepared.stats.valid,
        checked: prepared.stats.needs_checked_path(),
    };

    let first_k = zone + 1;
    let mut mp = MatrixProfile::new(n_subs, m, zone);
    let acc = traverse(&cx, first_k);
    acc.write_to(&mut mp, |nc| corr_to_distance(2.0 * m_f, nc));
    Ok(mp)
}

#[cfg(not(feature = "parallel"))]
fn traverse(cx: &DiagCtx<'_>, first_k: usize) -> ProfileAccumulator {
    let mut acc = ProfileAccumulator::new(cx.n_subs);
    process_diagonals(cx, first_k, cx.n_subs, &mut acc);
    acc
}

#[cfg(feature = "parallel")]
fn traverse(cx: &DiagCtx<'_>, first_k: usize) -> ProfileAccumulator {
    use rayon::prelude::*;

    if cx.n_subs < MIN_PARALLEL_SUBS {
        let mut acc = ProfileAccumulator::new(cx.n_subs);
        process_diagonals(cx, first_k, cx.n_subs, &mut acc);
        return acc;
    }

    let ranges = diagonal_ranges(first_k, cx.n_subs, rayon::current_num_threads());
    let locals: Vec<ProfileAccumulator> = ranges
        .into_par_iter()
        .map(|(start_k, end_k)| {
            let mut acc = ProfileAccumulator::new(cx.n_subs);
            process_diagonals(cx, start_k, end_k, &mut acc);
            acc
        })
        .collect();

    // Per-position minimum reduction; merge order is irrelevant.
    let mut acc = ProfileAccumulator::new(cx.n_subs);
    for local in &locals {
        acc.merge(local);
    }
    acc
}

fn process_diagonals(cx: &DiagCtx<'_>, start_k: usize, end_k: usize, acc: &mut ProfileAccumulator) {
    for k in start_k..end_k {
        if cx.checked {
            diagonal_checked(cx, k, acc);
        } else {
            diagonal_fast(cx, k, acc);
        }
    }
}

/// One diagonal, branchless: no constant or invalid windows anywhere, so the
/// correlation formula applies unconditionally. `mul_add` keeps the QT
/// recurrence and correlation in fused form.
#[inline(always)]
fn diagonal_fast(cx: &DiagCtx<'_>, k: usize, acc: &mut ProfileAccumulator) {
    let DiagCtx {
        values,
        m,
        n_subs,
        qt_first,
        mean,
        m_sigma_inv,
        m_mean,
        ..
    } = *cx;
    let diag_len = n_subs - k;

    let mut qt = qt_first[k];
    let nc = m_mean[0].mul_add(mean[k], -qt) * m_sigma_inv[0] * m_sigma_inv[k];
    acc.update_right(0, nc, k);
    acc.update_left(k, nc, 0);

    for p in 1..diag_len {
        let j = p + k;
        qt = (-values[p - 1]).mul_add(values[j - 1], qt);
        qt = values[p + m - 1].mul_add(values[j + m - 1], qt);

        let nc = m_mean[p].mul_add(mean[j], -qt) * m_sigma_inv[p] * m_sigma_inv[j];
        acc.update_right(p, nc, j);
        acc.update_left(j, nc, p);
    }
}

/// One diagonal with per-pair validity and constant-subsequence checks.
#[inline(always)]
fn diagonal_checked(cx: &DiagCtx<'_>, k: usize, acc: &mut ProfileAccumulator) {
    let DiagCtx {
        values,
        m,
        n_subs,
        qt_first,
        mean,
        m_sigma_inv,
        valid,
        ..
    } = *cx;
    let diag_len = n_subs - k;
    let m_f = m as f64;

    let mut qt = qt_first[k];
    let nc = neg_correlation(
        qt,
        m_f,
        mean[0],
        mean[k],
        m_sigma_inv[0],
        m_sigma_inv[k],
        valid[0],
        valid[k],
    );
    acc.update_right(0, nc, k);
    acc.update_left(k, nc, 0);

    for p in 1..diag_len {
        let j = p + k;
        qt = (-values[p - 1]).mul_add(values[j - 1], qt);
        qt = values[p + m - 1].mul_add(values[j + m - 1], qt);

        let nc = neg_correlation(
            qt,
            m_f,
            mean[p],
            mean[j],
            m_sigma_inv[p],
            m_sigma_inv[j],
            valid[p],
            valid[j],
        );
        acc.update_right(p, nc, j);
        acc.update_left(j, nc, p);
    }
}

/// Partition diagonals `first_k..n_subs` into `n_chunks` contiguous ranges of
/// approximately equal total work.
///
/// Diagonal `k` has length `n_subs - k`, so earlier diagonals carry more work;
/// the split uses the analytic cumulative-work formula with a binary search
/// per chunk boundary.
#[cfg(feature = "parallel")]
pub(crate) fn diagonal_ranges(
    first_k: usize,
    n_subs: usize,
    n_chunks: usize,
) -> Vec<(usize, usize)> {
    let n_diags = n_subs.saturating_sub(first_k);
    if n_diags == 0 || n_chunks == 0 {
        return vec![];
    }
    let n_chunks = n_chunks.min(n_diags);

    // cumwork(i) = sum_{d=0}^{i-1} (n_diags - d) = i*n_diags - i*(i-1)/2
    let cumwork = |i: usize| -> usize { i * n_diags - i * i.saturating_sub(1) / 2 };
    let total = cumwork(n_diags);

    let mut ranges = Vec::with_capacity(n_chunks);
    let mut prev = 0usize;
    for c in 1..=n_chunks {
        let target = if c == n_chunks {
            n_diags
        } else {
            let threshold = (c as f64 * total as f64 / n_chunks as f64).round() as usize;
            let (mut lo, mut hi) = (prev, n_diags);
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                if cumwork(mid) >= threshold {
                    hi = mid;
                } else {
                    lo = mid + 1;
                }
            }
            lo
        };
        if target > prev {
            ranges.push((first_k + prev, first_k + target));
        }
        prev = target;
    }
    ranges
}
