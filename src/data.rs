//! Condensed count representations of categorical samples
//!
//! A sample over `K` categories is stored as a histogram of histograms: the
//! distinct count values `nn` and, for each, the number of categories `ff`
//! that attained it. Storage is proportional to the number of *distinct*
//! counts rather than to `K`, which matters in the deeply undersampled
//! regime this crate targets.

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sufficient statistics of one categorical sample, in condensed form.
///
/// # Example
///
/// ```rust
/// use dirmeta::data::CompactCounts;
///
/// // 3 unobserved categories, 2 categories seen twice, 1 seen five times
/// let counts = CompactCounts::new(&[0, 2, 5], &[3, 2, 1]).unwrap();
///
/// assert_eq!(counts.k(), 6);
/// assert_eq!(counts.k_obs(), 3);
/// assert_eq!(counts.n(), 9.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct CompactCounts {
    /// Total number of categories (support size)
    k: usize,
    /// Number of categories with nonzero count
    k_obs: usize,
    /// Total sample size
    n: f64,
    /// Distinct observed count values, strictly ascending
    nn: Vec<f64>,
    /// Number of categories attaining each value in `nn`
    ff: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactCountsError {
    /// No count values supplied
    Empty,
    /// `nn` and `ff` have different lengths
    LengthMismatch { nn_len: usize, ff_len: usize },
    /// Count values are not strictly ascending
    CountsNotAscending,
    /// A multiplicity is zero
    ZeroFrequency { ix: usize },
    /// Declared support is smaller than the number of listed categories
    KTooSmall { k: usize, observed: usize },
}

impl CompactCounts {
    /// Create compact counts from distinct count values and their
    /// multiplicities. The support size is `sum(ff)`.
    pub fn new(nn: &[u64], ff: &[u64]) -> Result<Self, CompactCountsError> {
        if nn.is_empty() {
            return Err(CompactCountsError::Empty);
        }
        if nn.len() != ff.len() {
            return Err(CompactCountsError::LengthMismatch {
                nn_len: nn.len(),
                ff_len: ff.len(),
            });
        }
        if nn.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CompactCountsError::CountsNotAscending);
        }
        if let Some(ix) = ff.iter().position(|&f| f == 0) {
            return Err(CompactCountsError::ZeroFrequency { ix });
        }

        let k: u64 = ff.iter().sum();
        let k_obs: u64 = nn
            .iter()
            .zip(ff.iter())
            .filter(|(&n, _)| n > 0)
            .map(|(_, &f)| f)
            .sum();
        let n: u64 = nn.iter().zip(ff.iter()).map(|(&n, &f)| n * f).sum();

        Ok(CompactCounts {
            k: k as usize,
            k_obs: k_obs as usize,
            n: n as f64,
            nn: nn.iter().map(|&x| x as f64).collect(),
            ff: ff.iter().map(|&x| x as f64).collect(),
        })
    }

    /// Create compact counts from per-category counts.
    ///
    /// `k` is the total support size; when it exceeds `counts.len()` the
    /// remaining categories are recorded as unobserved. `None` means the
    /// support is exactly the listed categories.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dirmeta::data::CompactCounts;
    ///
    /// let counts = CompactCounts::from_counts(&[4, 0, 4, 1], Some(10)).unwrap();
    ///
    /// assert_eq!(counts.k(), 10);
    /// assert_eq!(counts.k_obs(), 3);
    /// assert_eq!(counts.nn(), &[0.0, 1.0, 4.0]);
    /// assert_eq!(counts.ff(), &[7.0, 1.0, 2.0]);
    /// ```
    pub fn from_counts(
        counts: &[u64],
        k: Option<usize>,
    ) -> Result<Self, CompactCountsError> {
        let k = k.unwrap_or(counts.len());
        if k < counts.len() {
            return Err(CompactCountsError::KTooSmall {
                k,
                observed: counts.len(),
            });
        }

        let mut sorted: Vec<u64> = counts.to_vec();
        sorted.sort_unstable();

        let mut nn: Vec<u64> = Vec::new();
        let mut ff: Vec<u64> = Vec::new();
        for &c in &sorted {
            match nn.last() {
                Some(&last) if last == c => *ff.last_mut().unwrap() += 1,
                _ => {
                    nn.push(c);
                    ff.push(1);
                }
            }
        }

        let pad = (k - counts.len()) as u64;
        if pad > 0 {
            if nn.first() == Some(&0) {
                ff[0] += pad;
            } else {
                nn.insert(0, 0);
                ff.insert(0, pad);
            }
        }

        Self::new(&nn, &ff)
    }

    /// Total number of categories.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of observed (nonzero-count) categories.
    pub fn k_obs(&self) -> usize {
        self.k_obs
    }

    /// Total sample size.
    pub fn n(&self) -> f64 {
        self.n
    }

    /// Distinct observed count values.
    pub fn nn(&self) -> &[f64] {
        &self.nn
    }

    /// Multiplicity of each distinct count value.
    pub fn ff(&self) -> &[f64] {
        &self.ff
    }

    /// The ff-weighted reduction `Σᵢ ff[i]·f(nn[i])`.
    ///
    /// Applies a per-count function over the distinct values and contracts
    /// with the multiplicities, so nothing of size `K` is materialized.
    pub fn ff_sum<F: Fn(f64) -> f64>(&self, f: F) -> f64 {
        self.nn
            .iter()
            .zip(self.ff.iter())
            .map(|(&n, &m)| m * f(n))
            .sum()
    }
}

/// Two samples over a shared support, for divergence estimation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct PairedCounts {
    first: CompactCounts,
    second: CompactCounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairedCountsError {
    /// The two samples disagree on the support size
    CategoryMismatch { k_1: usize, k_2: usize },
}

impl PairedCounts {
    pub fn new(
        first: CompactCounts,
        second: CompactCounts,
    ) -> Result<Self, PairedCountsError> {
        if first.k() != second.k() {
            Err(PairedCountsError::CategoryMismatch {
                k_1: first.k(),
                k_2: second.k(),
            })
        } else {
            Ok(PairedCounts { first, second })
        }
    }

    /// The shared support size.
    pub fn k(&self) -> usize {
        self.first.k()
    }

    pub fn first(&self) -> &CompactCounts {
        &self.first
    }

    pub fn second(&self) -> &CompactCounts {
        &self.second
    }
}

impl std::error::Error for CompactCountsError {}
impl std::error::Error for PairedCountsError {}

impl fmt::Display for CompactCountsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no count values supplied"),
            Self::LengthMismatch { nn_len, ff_len } => write!(
                f,
                "nn has {} entries but ff has {}",
                nn_len, ff_len
            ),
            Self::CountsNotAscending => {
                write!(f, "count values must be strictly ascending")
            }
            Self::ZeroFrequency { ix } => {
                write!(f, "multiplicity at index {} is zero", ix)
            }
            Self::KTooSmall { k, observed } => write!(
                f,
                "support size {} is smaller than the {} listed categories",
                k, observed
            ),
        }
    }
}

impl fmt::Display for PairedCountsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CategoryMismatch { k_1, k_2 } => write!(
                f,
                "paired samples disagree on the support size ({} vs {})",
                k_1, k_2
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_invariants() {
        let c = CompactCounts::new(&[0, 5, 10], &[2, 2, 1]).unwrap();
        assert_eq!(c.k(), 5);
        assert_eq!(c.k_obs(), 3);
        assert::close(c.n(), 20.0, 1e-12);
        // sum(ff) == K and dot(nn, ff) == N
        assert::close(c.ff_sum(|_| 1.0), c.k() as f64, 1e-12);
        assert::close(c.ff_sum(|n| n), c.n(), 1e-12);
    }

    #[test]
    fn new_rejects_malformed_input() {
        assert_eq!(CompactCounts::new(&[], &[]), Err(CompactCountsError::Empty));
        assert_eq!(
            CompactCounts::new(&[0, 1], &[1]),
            Err(CompactCountsError::LengthMismatch { nn_len: 2, ff_len: 1 })
        );
        assert_eq!(
            CompactCounts::new(&[1, 1], &[1, 1]),
            Err(CompactCountsError::CountsNotAscending)
        );
        assert_eq!(
            CompactCounts::new(&[0, 1], &[1, 0]),
            Err(CompactCountsError::ZeroFrequency { ix: 1 })
        );
    }

    #[test]
    fn from_counts_pads_unobserved() {
        let c = CompactCounts::from_counts(&[3, 3, 1], Some(7)).unwrap();
        assert_eq!(c.nn(), &[0.0, 1.0, 3.0]);
        assert_eq!(c.ff(), &[4.0, 1.0, 2.0]);
        assert_eq!(c.k(), 7);
        assert::close(c.n(), 7.0, 1e-12);
    }

    #[test]
    fn from_counts_rejects_small_k() {
        let res = CompactCounts::from_counts(&[1, 2, 3], Some(2));
        assert_eq!(
            res,
            Err(CompactCountsError::KTooSmall { k: 2, observed: 3 })
        );
    }

    #[test]
    fn paired_counts_require_shared_support() {
        let c1 = CompactCounts::from_counts(&[1, 2], Some(4)).unwrap();
        let c2 = CompactCounts::from_counts(&[3, 1], Some(5)).unwrap();
        let res = PairedCounts::new(c1.clone(), c2);
        assert_eq!(
            res,
            Err(PairedCountsError::CategoryMismatch { k_1: 4, k_2: 5 })
        );

        let c3 = CompactCounts::from_counts(&[0, 4], Some(4)).unwrap();
        assert!(PairedCounts::new(c1, c3).is_ok());
    }

    #[test]
    fn ff_sum_contracts_over_distinct_counts() {
        let c = CompactCounts::new(&[0, 2, 5], &[3, 2, 1]).unwrap();
        let expected = 3.0 * (0.0_f64 + 1.0).ln()
            + 2.0 * (2.0_f64 + 1.0).ln()
            + (5.0_f64 + 1.0).ln();
        assert::close(c.ff_sum(|n| (n + 1.0).ln()), expected, 1e-12);
    }
}
