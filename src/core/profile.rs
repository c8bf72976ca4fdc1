/// Exclusion zone half-width for a self-join: `ceil(m / 4)`.
///
/// For query position `i`, reference positions in `[i - zone, i + zone]` are
/// trivial matches and ineligible as nearest neighbors.
pub fn exclusion_zone(m: usize) -> usize {
    (m as f64 / 4.0).ceil() as usize
}

/// Sentinel neighbor index meaning "no eligible neighbor found".
pub const NO_NEIGHBOR: i64 = -1;

/// The matrix profile: per-subsequence nearest-neighbor distances and indices.
///
/// A position with no eligible neighbor (every candidate excluded or invalid)
/// holds `(f64::INFINITY, NO_NEIGHBOR)`. The left/right variants restrict the
/// neighbor to smaller/larger indices respectively; for an AB-join the
/// comparison is positional across the two series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixProfile {
    /// Nearest-neighbor distance per subsequence.
    pub distances: Vec<f64>,
    /// Index of the nearest neighbor, or `NO_NEIGHBOR`.
    pub indices: Vec<i64>,
    /// Nearest neighbor restricted to smaller indices.
    pub left_distances: Vec<f64>,
    pub left_indices: Vec<i64>,
    /// Nearest neighbor restricted to larger indices.
    pub right_distances: Vec<f64>,
    pub right_indices: Vec<i64>,
    /// Subsequence length used.
    pub m: usize,
    /// Exclusion zone half-width applied (zero for AB-joins).
    pub exclusion_zone: usize,
}

impl MatrixProfile {
    /// Create a profile with every slot at `(inf, NO_NEIGHBOR)`.
    pub fn new(n_subs: usize, m: usize, exclusion_zone: usize) -> Self {
        Self {
            distances: vec![f64::INFINITY; n_subs],
            indices: vec![NO_NEIGHBOR; n_subs],
            left_distances: vec![f64::INFINITY; n_subs],
            left_indices: vec![NO_NEIGHBOR; n_subs],
            right_distances: vec![f64::INFINITY; n_subs],
            right_indices: vec![NO_NEIGHBOR; n_subs],
            m,
            exclusion_zone,
        }
    }

    /// Number of profile entries.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }
}

/// A single accumulator slot: negated Pearson correlations (lower = better
/// match) for the overall, left, and right nearest neighbors.
///
/// Kept in the correlation domain during the O(n^2) traversal; the sqrt-based
/// distance conversion happens once per slot at the end.
#[derive(Clone, Copy)]
pub(crate) struct AccEntry {
    pub neg_corr: f64,
    pub left_neg_corr: f64,
    pub right_neg_corr: f64,
    pub index: i64,
    pub left_index: i64,
    pub right_index: i64,
}

impl AccEntry {
    const EMPTY: Self = Self {
        neg_corr: f64::INFINITY,
        left_neg_corr: f64::INFINITY,
        right_neg_corr: f64::INFINITY,
        index: NO_NEIGHBOR,
        left_index: NO_NEIGHBOR,
        right_index: NO_NEIGHBOR,
    };
}

/// Running-minimum accumulator for diagonal traversal.
///
/// Every update uses strict `<`, so ties keep the first neighbor encountered
/// in traversal order, and +inf entries (invalid pairs) never displace
/// anything. Updates are monotonic; merge order between thread-local copies
/// is irrelevant.
pub(crate) struct ProfileAccumulator {
    pub entries: Vec<AccEntry>,
}

impl ProfileAccumulator {
    pub fn new(n: usize) -> Self {
        Self {
            entries: vec![AccEntry::EMPTY; n],
        }
    }

    /// Update overall + right profile for `idx`; `neighbor > idx` must hold.
    #[inline(always)]
    pub fn update_right(&mut self, idx: usize, neg_corr: f64, neighbor: usize) {
        let e = &mut self.entries[idx];
        if neg_corr < e.neg_corr {
            e.neg_corr = neg_corr;
            e.index = neighbor as i64;
        }
        if neg_corr < e.right_neg_corr {
            e.right_neg_corr = neg_corr;
            e.right_index = neighbor as i64;
        }
    }

    /// Update overall + left profile for `idx`; `neighbor < idx` must hold.
    #[inline(always)]
    pub fn update_left(&mut self, idx: usize, neg_corr: f64, neighbor: usize) {
        let e = &mut self.entries[idx];
        if neg_corr < e.neg_corr {
            e.neg_corr = neg_corr;
            e.index = neighbor as i64;
        }
        if neg_corr < e.left_neg_corr {
            e.left_neg_corr = neg_corr;
            e.left_index = neighbor as i64;
        }
    }

    /// Update only the overall profile. Used on the AB-join main diagonal
    /// where query and reference positions coincide and neither directional
    /// profile applies.
    #[inline(always)]
    pub fn update_overall(&mut self, idx: usize, neg_corr: f64, neighbor: usize) {
        let e = &mut self.entries[idx];
        if neg_corr < e.neg_corr {
            e.neg_corr = neg_corr;
            e.index = neighbor as i64;
        }
    }

    /// Merge a thread-local accumulator into this one, element-wise minimum.
    #[cfg(feature = "parallel")]
    pub fn merge(&mut self, other: &Self) {
        for (a, b) in self.entries.iter_mut().zip(other.entries.iter()) {
            if b.neg_corr < a.neg_corr {
                a.neg_corr = b.neg_corr;
                a.index = b.index;
            }
            if b.left_neg_corr < a.left_neg_corr {
                a.left_neg_corr = b.left_neg_corr;
                a.left_index = b.left_index;
            }
            if b.right_neg_corr < a.right_neg_corr {
                a.right_neg_corr = b.right_neg_corr;
                a.right_index = b.right_index;
            }
        }
    }

    /// Convert accumulated correlations to distances and write the profile.
    ///
    /// `convert` is applied once per slot, moving the sqrt out of the O(n^2)
    /// inner loop. Untouched slots convert from +inf to +inf and keep their
    /// `NO_NEIGHBOR` index.
    pub fn write_to(&self, mp: &mut MatrixProfile, convert: impl Fn(f64) -> f64) {
        for (i, e) in self.entries.iter().enumerate() {
            mp.distances[i] = convert(e.neg_corr);
            mp.indices[i] = e.index;
            mp.left_distances[i] = convert(e.left_neg_corr);
            mp.left_indices[i] = e.left_index;
            mp.right_distances[i] = convert(e.right_neg_corr);
            mp.right_indices[i] = e.right_index;
        }
    }
}
