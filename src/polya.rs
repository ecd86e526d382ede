//! Dirichlet-multinomial (Polya) log-likelihood of compact counts
//!
//! The marginal likelihood of the observed counts after integrating the
//! category probabilities out under a symmetric Dirichlet prior with
//! concentration `a`. All methods are pure functions of `a`; they are only
//! meaningful for `a > 0`, which the optimizer guarantees through its bound
//! interval.

use special::Gamma as _;

use crate::data::CompactCounts;
use crate::misc::trigamma;

/// Log multivariate Beta normalization of the symmetric Dirichlet,
/// `ln B(x, …, x) = K·ln Γ(x) − ln Γ(K·x)`, with its derivatives in `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricBeta {
    k: f64,
}

impl SymmetricBeta {
    pub fn new(k: usize) -> Self {
        SymmetricBeta { k: k as f64 }
    }

    pub fn ln(&self, x: f64) -> f64 {
        self.k * x.ln_gamma().0 - (self.k * x).ln_gamma().0
    }

    pub fn ln_jac(&self, x: f64) -> f64 {
        self.k * x.digamma() - self.k * (self.k * x).digamma()
    }

    pub fn ln_hess(&self, x: f64) -> f64 {
        self.k * trigamma(x) - self.k * self.k * trigamma(self.k * x)
    }
}

/// Polya (symmetric-Dirichlet-multinomial) log-likelihood of one sample.
///
/// # Example
///
/// ```rust
/// use dirmeta::data::CompactCounts;
/// use dirmeta::polya::Polya;
///
/// // K = 2, a single draw landing in the first category: the marginal
/// // probability is 1/2 whatever the concentration.
/// let counts = CompactCounts::new(&[0, 1], &[1, 1]).unwrap();
/// let polya = Polya::new(&counts);
///
/// assert!((polya.ln_m(0.7) - 0.5_f64.ln()).abs() < 1e-12);
/// assert!((polya.ln_m(3.1) - 0.5_f64.ln()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Polya<'a> {
    counts: &'a CompactCounts,
    norm: SymmetricBeta,
}

impl<'a> Polya<'a> {
    pub fn new(counts: &'a CompactCounts) -> Self {
        let norm = SymmetricBeta::new(counts.k());
        Polya { counts, norm }
    }

    /// Log-likelihood at concentration `a`.
    pub fn ln_m(&self, a: f64) -> f64 {
        let k = self.counts.k() as f64;
        let big_x = self.counts.n() + k * a;
        self.counts.ff_sum(|n| (n + a).ln_gamma().0) - big_x.ln_gamma().0
            - self.norm.ln(a)
    }

    /// 1st derivative of the log-likelihood in `a`.
    pub fn ln_m_jac(&self, a: f64) -> f64 {
        let k = self.counts.k() as f64;
        let big_x = self.counts.n() + k * a;
        self.counts.ff_sum(|n| (n + a).digamma()) - k * big_x.digamma()
            - self.norm.ln_jac(a)
    }

    /// 2nd derivative of the log-likelihood in `a`.
    pub fn ln_m_hess(&self, a: f64) -> f64 {
        let k = self.counts.k() as f64;
        let big_x = self.counts.n() + k * a;
        self.counts.ff_sum(|n| trigamma(n + a)) - k * k * trigamma(big_x)
            - self.norm.ln_hess(a)
    }
}
