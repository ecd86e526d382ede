//! Metaprior for KL divergence under matched symmetric Dirichlet priors

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::Metaprior;

/// Metaprior for the a-priori expected Kullback-Leibler divergence when both
/// distributions share the same concentration parameter: `E = c/a` with
/// `c = (K−1)/K`, so the transformation factor is `c/a²`.
///
/// # Example
///
/// ```rust
/// use dirmeta::metaprior::{EqualKlMetaprior, Metaprior};
///
/// let mp = EqualKlMetaprior::new(2);
/// assert!((mp.prior_expectation(1.0) - 0.5).abs() < 1e-15);
/// assert!((mp.prior_expectation(4.0) - 0.125).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct EqualKlMetaprior {
    k: f64,
    c: f64,
}

impl EqualKlMetaprior {
    pub fn new(k: usize) -> Self {
        let k = k as f64;
        EqualKlMetaprior {
            k,
            c: (k - 1.0) / k,
        }
    }
}

impl Metaprior for EqualKlMetaprior {
    fn k(&self) -> f64 {
        self.k
    }

    fn prior_expectation(&self, a: f64) -> f64 {
        self.c / a
    }

    fn factor(&self, a: f64) -> f64 {
        self.c / (a * a)
    }

    fn factor_jac(&self, a: f64) -> f64 {
        -2.0 * self.c / (a * a * a)
    }

    fn factor_hess(&self, a: f64) -> f64 {
        6.0 * self.c / (a * a * a * a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn k2_expectation_is_half_inverse() {
        let mp = EqualKlMetaprior::new(2);
        for &a in &[1e-5, 0.3, 1.0, 7.0, 1e3] {
            assert::close(mp.prior_expectation(a), 0.5 / a, 1e-15);
        }
    }

    #[test]
    fn ln_factor_closed_form() {
        // ln(c/a²) = ln c − 2 ln a
        let mp = EqualKlMetaprior::new(5);
        let c: f64 = 0.8;
        for &a in &[0.2, 1.0, 12.0] {
            assert::close(
                mp.ln_factor(a),
                c.ln() - 2.0 * a.ln(),
                1e-12,
            );
            assert::close(mp.ln_factor_jac(a), -2.0 / a, 1e-12);
            assert::close(mp.ln_factor_hess(a), 2.0 / (a * a), 1e-12);
        }
    }

    proptest! {
        #[test]
        fn log_derivatives_match_finite_differences(
            ln_a in -4.0..3.5_f64,
            k in 2usize..200,
        ) {
            let mp = EqualKlMetaprior::new(k);
            let a = ln_a.exp();
            let h = 1e-6 * a;

            let jac_fd =
                (mp.ln_factor(a + h) - mp.ln_factor(a - h)) / (2.0 * h);
            let jac = mp.ln_factor_jac(a);
            let js = jac.abs().max(1e-3);
            prop_assert!((jac - jac_fd).abs() / js < 1e-4);

            let hess_fd =
                (mp.ln_factor_jac(a + h) - mp.ln_factor_jac(a - h)) / (2.0 * h);
            let hess = mp.ln_factor_hess(a);
            let hs = hess.abs().max(1e-3);
            prop_assert!((hess - hess_fd).abs() / hs < 1e-4);
        }
    }
}
