//! Metaprior flattening the induced prior on cross-entropy

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::Metaprior;
use crate::misc::{digamma_diff, pentagamma, tetragamma, trigamma};

/// Metaprior for the a-priori expected cross-entropy `ψ(Kb) − ψ(b)` under a
/// symmetric Dirichlet with concentration `b`.
///
/// The expectation decreases strictly from `+∞` (at `b → 0`) toward `ln K`,
/// so the factor is taken with the sign flipped to stay positive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct CrossEntropyMetaprior {
    k: f64,
}

impl CrossEntropyMetaprior {
    pub fn new(k: usize) -> Self {
        CrossEntropyMetaprior { k: k as f64 }
    }
}

impl Metaprior for CrossEntropyMetaprior {
    fn k(&self) -> f64 {
        self.k
    }

    fn prior_expectation(&self, b: f64) -> f64 {
        digamma_diff(self.k * b, b)
    }

    fn factor(&self, b: f64) -> f64 {
        trigamma(b) - self.k * trigamma(self.k * b)
    }

    fn factor_jac(&self, b: f64) -> f64 {
        tetragamma(b) - self.k * self.k * tetragamma(self.k * b)
    }

    fn factor_hess(&self, b: f64) -> f64 {
        pentagamma(b) - self.k.powi(3) * pentagamma(self.k * b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn expectation_exceeds_ln_k() {
        for k in [2usize, 5, 100] {
            let mp = CrossEntropyMetaprior::new(k);
            let ln_k = (k as f64).ln();
            for &b in &[1e-4, 0.1, 1.0, 100.0] {
                assert!(mp.prior_expectation(b) > ln_k);
            }
        }
    }

    #[test]
    fn factor_is_positive() {
        let mp = CrossEntropyMetaprior::new(12);
        for &b in &[1e-4, 0.1, 1.0, 100.0] {
            assert!(mp.factor(b) > 0.0);
        }
    }

    proptest! {
        #[test]
        fn expectation_is_strictly_decreasing(
            ln_b in -6.0..6.0_f64,
            step in 0.1..2.0_f64,
            k in 2usize..500,
        ) {
            let mp = CrossEntropyMetaprior::new(k);
            let b = ln_b.exp();
            let c = (ln_b + step).exp();
            prop_assert!(mp.prior_expectation(c) < mp.prior_expectation(b));
        }

        #[test]
        fn log_derivatives_match_finite_differences(
            ln_b in -4.0..3.5_f64,
            k in 2usize..200,
        ) {
            let mp = CrossEntropyMetaprior::new(k);
            let b = ln_b.exp();
            let h = 1e-6 * b;

            let jac_fd =
                (mp.ln_factor(b + h) - mp.ln_factor(b - h)) / (2.0 * h);
            let jac = mp.ln_factor_jac(b);
            let js = jac.abs().max(1e-3);
            prop_assert!((jac - jac_fd).abs() / js < 1e-4);

            let hess_fd =
                (mp.ln_factor_jac(b + h) - mp.ln_factor_jac(b - h)) / (2.0 * h);
            let hess = mp.ln_factor_hess(b);
            let hs = hess.abs().max(1e-3);
            prop_assert!((hess - hess_fd).abs() / hs < 1e-4);
        }
    }
}
