//! Metaprior flattening the induced prior on the Simpson index

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::Metaprior;

/// Metaprior for the a-priori expected Simpson index
/// `(K−1)/(Ka+1)²` under a symmetric Dirichlet: simple rational powers of
/// `Ka+1`, no special functions involved.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct SimpsonMetaprior {
    k: f64,
}

impl SimpsonMetaprior {
    pub fn new(k: usize) -> Self {
        SimpsonMetaprior { k: k as f64 }
    }
}

impl Metaprior for SimpsonMetaprior {
    fn k(&self) -> f64 {
        self.k
    }

    fn prior_expectation(&self, a: f64) -> f64 {
        (self.k - 1.0) * (self.k * a + 1.0).powi(-2)
    }

    fn factor(&self, a: f64) -> f64 {
        2.0 * self.k * (self.k - 1.0) * (self.k * a + 1.0).powi(-3)
    }

    fn factor_jac(&self, a: f64) -> f64 {
        -6.0 * self.k.powi(2) * (self.k - 1.0) * (self.k * a + 1.0).powi(-4)
    }

    fn factor_hess(&self, a: f64) -> f64 {
        24.0 * self.k.powi(3) * (self.k - 1.0) * (self.k * a + 1.0).powi(-5)
    }
}
