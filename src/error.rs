use thiserror::Error;

/// Errors raised by parameter validation before any numeric work begins.
///
/// Per-window data quality problems (NaN/Inf contamination, zero variance)
/// are never errors; they degrade the affected profile entries to +inf or a
/// fixed fallback distance instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// One of the input series has length zero.
    #[error("input series is empty")]
    EmptySeries,

    /// The subsequence length is below the minimum of 3.
    #[error("invalid window length m={m}: m must be at least 3")]
    InvalidWindowLength { m: usize },

    /// The subsequence length exceeds a series length.
    #[error("window length m={m} exceeds series length n={n}")]
    WindowExceedsSeriesLength { m: usize, n: usize },

    /// The unified entry point was called without a reference series while
    /// `self_join` was false.
    #[error("reference series is required when self_join is false")]
    MissingReference,
}

/// Validate a (series length, window length) pair.
///
/// Checked once per input series at the start of every public operation.
pub(crate) fn check_window(n: usize, m: usize) -> Result<(), ProfileError> {
    if n == 0 {
        return Err(ProfileError::EmptySeries);
    }
    if m < 3 {
        return Err(ProfileError::InvalidWindowLength { m });
    }
    if m > n {
        return Err(ProfileError::WindowExceedsSeriesLength { m, n });
    }
    Ok(())
}
