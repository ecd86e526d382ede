//! Metaprior flattening the induced prior on Shannon entropy

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::Metaprior;
use crate::misc::{digamma_diff, pentagamma, tetragamma, trigamma};

/// The NSB entropy metaprior: the Jacobian of the map from the concentration
/// `a` to the a-priori expected Shannon entropy under a symmetric Dirichlet.
///
/// The expectation `ψ(Ka+1) − ψ(a+1)` runs from 0 (at `a → 0`) to `ln K`
/// (at `a → ∞`), strictly increasing.
///
/// # Example
///
/// ```rust
/// use dirmeta::metaprior::{EntropyMetaprior, Metaprior};
///
/// let mp = EntropyMetaprior::new(2);
/// // ψ(3) − ψ(2) = 1/2
/// assert!((mp.prior_expectation(1.0) - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct EntropyMetaprior {
    k: f64,
}

impl EntropyMetaprior {
    pub fn new(k: usize) -> Self {
        EntropyMetaprior { k: k as f64 }
    }
}

impl Metaprior for EntropyMetaprior {
    fn k(&self) -> f64 {
        self.k
    }

    fn prior_expectation(&self, a: f64) -> f64 {
        digamma_diff(self.k * a + 1.0, a + 1.0)
    }

    fn factor(&self, a: f64) -> f64 {
        self.k * trigamma(self.k * a + 1.0) - trigamma(a + 1.0)
    }

    fn factor_jac(&self, a: f64) -> f64 {
        self.k * self.k * tetragamma(self.k * a + 1.0) - tetragamma(a + 1.0)
    }

    fn factor_hess(&self, a: f64) -> f64 {
        self.k.powi(3) * pentagamma(self.k * a + 1.0) - pentagamma(a + 1.0)
    }
}
