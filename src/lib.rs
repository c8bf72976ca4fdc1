//! Matrix profile computation for univariate time series.
//!
//! For every length-`m` subsequence of a query series, the matrix profile
//! records the z-normalized Euclidean distance to its nearest-neighbor
//! subsequence in a reference series, plus that neighbor's index. Self-joins
//! (series against itself, with an exclusion zone suppressing trivial
//! matches) and AB-joins (two distinct series, no zone) are both supported.
//!
//! The engine traverses the implicit distance matrix diagonal-wise: each
//! diagonal is seeded by one sliding dot product (FFT-backed for large
//! inputs) and advanced with an O(1) incremental recurrence, for O(n^2)
//! total instead of the naive O(n^2 * m). NaN/inf values are treated as
//! missing data: windows touching them never yield finite distances, and a
//! position with no eligible neighbor reads `(inf, -1)`.
//!
//! # Examples
//!
//! ```
//! use matrix_profile::compute_matrix_profile;
//!
//! let ts = vec![1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 2.0, 1.0];
//! let mp = compute_matrix_profile(&ts, 4, None, true).unwrap();
//! assert_eq!(mp.len(), ts.len() - 4 + 1);
//! // The repeating pattern means every window has a close match.
//! assert!(mp.distances[0] < 1e-6);
//! ```

pub mod core;
pub mod engine;
pub mod error;
pub mod naive;

pub use crate::core::profile::{exclusion_zone, MatrixProfile, NO_NEIGHBOR};
pub use crate::core::stats::{PreparedSeries, RollingStats};
pub use crate::engine::ab_join::ab_join;
pub use crate::engine::distance::distance_profile;
pub use crate::engine::self_join::self_join;
pub use crate::error::ProfileError;

/// Unified entry point.
///
/// - `reference = None`: `self_join` must be true; the query is joined
///   against itself with the exclusion zone applied.
/// - `reference = Some(_)` with `self_join = true`: the caller asserts the
///   two series are identical by construction; the join runs against the
///   query with the zone applied.
/// - `reference = Some(r)` with `self_join = false`: one-directional AB-join;
///   the returned profile indexes the query's subsequences with neighbors in
///   `r`. Use [`ab_join`] directly for both sibling profiles.
pub fn compute_matrix_profile(
    query: &[f64],
    window_length: usize,
    reference: Option<&[f64]>,
    self_join: bool,
) -> Result<MatrixProfile, ProfileError> {
    match (reference, self_join) {
        (None, false) => Err(ProfileError::MissingReference),
        (None, true) => crate::engine::self_join::self_join(query, window_length),
        (Some(r), true) => {
            debug_assert_eq!(query.len(), r.len(), "self-join series must be identical");
            crate::engine::self_join::self_join(query, window_length)
        }
        (Some(r), false) => {
            crate::engine::ab_join::ab_join(query, r, window_length).map(|(mp_a, _)| mp_a)
        }
    }
}
