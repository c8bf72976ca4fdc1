/// Standard deviations below this floor are treated as zero variance: the
/// window is constant and must not be used as a normalization divisor.
pub const SIGMA_FLOOR: f64 = 1e-15;

/// Rolling mean, population standard deviation, and validity mask for all
/// subsequences of length `m`.
///
/// Computed in one O(n) pass over cumulative sums and sums-of-squares. The
/// variance uses `E[X^2] - E[X]^2` clamped to zero, which keeps the recurrence
/// O(n) while bounding cancellation error for the window sizes this crate
/// targets.
///
/// Windows containing any NaN or infinite value are marked invalid: their
/// mean/std are reported as NaN and their `m_sigma_inv` is zero, so they can
/// never act as a normalization basis.
#[derive(Debug, Clone)]
pub struct RollingStats {
    /// Window mean; NaN for invalid windows.
    pub mean: Vec<f64>,
    /// Window population standard deviation; NaN for invalid windows.
    pub std: Vec<f64>,
    /// Precomputed `1 / (sqrt(m) * sigma)`; zero for constant or invalid
    /// windows. Lets the inner loop replace division with multiplication:
    /// `r = (QT - m*mu_i*mu_j) * m_sigma_inv[i] * m_sigma_inv[j]`.
    pub m_sigma_inv: Vec<f64>,
    /// True iff the window contains only finite values.
    pub valid: Vec<bool>,
    /// Whether any valid window is constant (sigma below the floor).
    pub has_constant: bool,
    /// Whether any window contains a non-finite value.
    pub has_invalid: bool,
}

/// A series prepared for join computation: a cleaned copy with non-finite
/// positions zero-filled (so dot products stay finite) plus its rolling
/// statistics.
///
/// The validity mask in `stats` records which windows touched a zero-filled
/// position; distances involving those windows are forced to +inf downstream
/// rather than relying on NaN propagation.
#[derive(Debug, Clone)]
pub struct PreparedSeries {
    /// Series values with NaN/inf replaced by 0.0.
    pub values: Vec<f64>,
    /// Rolling statistics over the cleaned values, with invalid windows masked.
    pub stats: RollingStats,
}

impl PreparedSeries {
    /// Clean a series and compute its rolling statistics for window length `m`.
    pub fn new(ts: &[f64], m: usize) -> Self {
        assert!(m > 0, "window length must be > 0");
        assert!(ts.len() >= m, "series must be at least as long as m");

        let n = ts.len();

        // Zero-fill non-finite positions; prefix-count them so window validity
        // is an O(1) range query.
        let mut values = Vec::with_capacity(n);
        let mut bad_prefix = vec![0usize; n + 1];
        for (i, &x) in ts.iter().enumerate() {
            if x.is_finite() {
                values.push(x);
                bad_prefix[i + 1] = bad_prefix[i];
            } else {
                values.push(0.0);
                bad_prefix[i + 1] = bad_prefix[i] + 1;
            }
        }

        let stats = RollingStats::compute(&values, &bad_prefix, m);
        Self { values, stats }
    }

    /// Number of subsequences of length `m`.
    pub fn n_subs(&self) -> usize {
        self.stats.mean.len()
    }
}

impl RollingStats {
    /// Compute rolling statistics over a cleaned series.
    ///
    /// `bad_prefix[i]` counts non-finite positions in the original series
    /// before index `i`; a window is invalid iff the count over its span is
    /// non-zero.
    fn compute(values: &[f64], bad_prefix: &[usize], m: usize) -> Self {
        let n = values.len();
        let n_subs = n - m + 1;

        let mut cumsum = vec![0.0; n + 1];
        let mut cumsum_sq = vec![0.0; n + 1];
        for (i, &x) in values.iter().enumerate() {
            cumsum[i + 1] = cumsum[i] + x;
            cumsum_sq[i + 1] = cumsum_sq[i] + x * x;
        }

        let mut mean = vec![0.0; n_subs];
        let mut std = vec![0.0; n_subs];
        let mut m_sigma_inv = vec![0.0; n_subs];
        let mut valid = vec![true; n_subs];
        let mut has_constant = false;
        let mut has_invalid = false;

        let m_f = m as f64;
        let sqrt_m = m_f.sqrt();
        for i in 0..n_subs {
            if bad_prefix[i + m] - bad_prefix[i] > 0 {
                mean[i] = f64::NAN;
                std[i] = f64::NAN;
                valid[i] = false;
                has_invalid = true;
                continue;
            }
            let sum = cumsum[i + m] - cumsum[i];
            let sum_sq = cumsum_sq[i + m] - cumsum_sq[i];
            let mu = sum / m_f;
            let var = (sum_sq / m_f - mu * mu).max(0.0);
            let sigma = var.sqrt();
            mean[i] = mu;
            std[i] = sigma;
            if sigma < SIGMA_FLOOR {
                has_constant = true;
            } else {
                m_sigma_inv[i] = 1.0 / (sqrt_m * sigma);
            }
        }

        Self {
            mean,
            std,
            m_sigma_inv,
            valid,
            has_constant,
            has_invalid,
        }
    }

    /// Whether the checked (branching) inner loop is required.
    pub fn needs_checked_path(&self) -> bool {
        self.has_constant || self.has_invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rolling_stats_simple() {
        // Subsequences of [1,2,3,4,5] with m=3: means 2,3,4, std sqrt(2/3)
        let p = PreparedSeries::new(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(p.n_subs(), 3);
        assert_relative_eq!(p.stats.mean[0], 2.0, max_relative = 1e-12);
        assert_relative_eq!(p.stats.mean[1], 3.0, max_relative = 1e-12);
        assert_relative_eq!(p.stats.mean[2], 4.0, max_relative = 1e-12);

        let expected_std = (2.0_f64 / 3.0).sqrt();
        for &s in &p.stats.std {
            assert_relative_eq!(s, expected_std, max_relative = 1e-12);
        }
        assert!(!p.stats.needs_checked_path());
    }

    #[test]
    fn test_rolling_stats_constant_windows() {
        let p = PreparedSeries::new(&[5.0; 10], 4);
        assert!(p.stats.has_constant);
        assert!(!p.stats.has_invalid);
        for i in 0..p.n_subs() {
            assert!((p.stats.mean[i] - 5.0).abs() < 1e-12);
            assert!(p.stats.std[i] < SIGMA_FLOOR);
            assert_eq!(p.stats.m_sigma_inv[i], 0.0);
            assert!(p.stats.valid[i]);
        }
    }

    #[test]
    fn test_nan_marks_overlapping_windows_invalid() {
        let ts = [1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0, 7.0];
        let p = PreparedSeries::new(&ts, 3);
        // Windows starting at 0, 1, 2 cover index 2; 3 and 4 do not.
        assert_eq!(p.stats.valid, vec![false, false, false, true, true]);
        assert!(p.stats.has_invalid);
        for i in 0..3 {
            assert!(p.stats.mean[i].is_nan());
            assert!(p.stats.std[i].is_nan());
            assert_eq!(p.stats.m_sigma_inv[i], 0.0);
        }
        assert!((p.stats.mean[3] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_infinity_treated_as_missing() {
        let ts = [1.0, f64::INFINITY, 3.0, 4.0, 5.0, 6.0];
        let p = PreparedSeries::new(&ts, 3);
        assert_eq!(p.values[1], 0.0);
        assert_eq!(p.stats.valid, vec![false, false, true, true]);
    }

    #[test]
    fn test_all_invalid_series() {
        let p = PreparedSeries::new(&[f64::NAN; 5], 3);
        assert!(p.stats.valid.iter().all(|&v| !v));
        assert!(p.stats.has_invalid);
        // Cleaned values are all zero.
        assert!(p.values.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_single_window() {
        let p = PreparedSeries::new(&[2.0, 4.0, 6.0], 3);
        assert_eq!(p.n_subs(), 1);
        assert!((p.stats.mean[0] - 4.0).abs() < 1e-12);
    }
}
