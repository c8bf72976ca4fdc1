use crate::core::stats::{PreparedSeries, SIGMA_FLOOR};
use crate::engine::sliding_dot::sliding_dot_product;
use crate::error::{check_window, ProfileError};

/// Negated Pearson correlation for one subsequence pair, with validity and
/// constant-subsequence handling.
///
/// Lower is a better match. Returns:
/// - +inf if either window is invalid (distance +inf, never a neighbor)
/// - -1.0 if both windows are constant (distance 0)
/// - 0.0 if exactly one is constant (distance sqrt(2m), the fixed fallback)
/// - `(m*mu_i*mu_j - QT) / (m*sigma_i*sigma_j)` otherwise
#[inline(always)]
pub(crate) fn neg_correlation(
    qt: f64,
    m_f: f64,
    mean_i: f64,
    mean_j: f64,
    msi_i: f64,
    msi_j: f64,
    valid_i: bool,
    valid_j: bool,
) -> f64 {
    if !valid_i || !valid_j {
        return f64::INFINITY;
    }
    if msi_i == 0.0 && msi_j == 0.0 {
        return -1.0;
    }
    if msi_i == 0.0 || msi_j == 0.0 {
        return 0.0;
    }
    (m_f * mean_i).mul_add(mean_j, -qt) * msi_i * msi_j
}

/// Convert a negated correlation to a z-normalized Euclidean distance:
/// `d = sqrt(2m * (1 + neg_r))` with `neg_r` clamped to [-1, 1].
///
/// Any non-finite correlation (invalid pair, or an arithmetic edge case that
/// escaped upstream) maps to +inf explicitly, never NaN, so downstream
/// minimization stays well-defined. The clamp guards the sqrt against small
/// negative arguments from floating-point error.
#[inline(always)]
pub(crate) fn corr_to_distance(two_m: f64, neg_corr: f64) -> f64 {
    if !neg_corr.is_finite() {
        return f64::INFINITY;
    }
    (two_m * (1.0 + neg_corr.clamp(-1.0, 1.0))).sqrt()
}

/// Z-normalized distance profile of one query window against every window of
/// `series` (MASS): `out[j] = d(query, series[j..j+m])` with `m = query.len()`.
///
/// Windows of `series` contaminated by NaN/inf yield +inf; a non-finite value
/// anywhere in `query` makes the whole profile +inf. Constant subsequences
/// follow the fixed-fallback policy rather than producing NaN.
pub fn distance_profile(query: &[f64], series: &[f64]) -> Result<Vec<f64>, ProfileError> {
    let m = query.len();
    check_window(m, m)?;
    check_window(series.len(), m)?;

    let prepared = PreparedSeries::new(series, m);
    let n_subs = prepared.n_subs();
    let m_f = m as f64;
    let two_m = 2.0 * m_f;

    if query.iter().any(|x| !x.is_finite()) {
        return Ok(vec![f64::INFINITY; n_subs]);
    }

    let mu_q = query.iter().sum::<f64>() / m_f;
    let sum_sq_q: f64 = query.iter().map(|x| x * x).sum();
    let sigma_q = (sum_sq_q / m_f - mu_q * mu_q).max(0.0).sqrt();
    let msi_q = if sigma_q < SIGMA_FLOOR {
        0.0
    } else {
        1.0 / (m_f.sqrt() * sigma_q)
    };

    let qt = sliding_dot_product(query, &prepared.values);
    let stats = &prepared.stats;

    let out = (0..n_subs)
        .map(|j| {
            let nc = neg_correlation(
                qt[j],
                m_f,
                mu_q,
                stats.mean[j],
                msi_q,
                stats.m_sigma_inv[j],
                true,
                stats.valid[j],
            );
            corr_to_distance(two_m, nc)
        })
        .collect();
    Ok(out)
}
