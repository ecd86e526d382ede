//! Two-parameter metaprior for Kullback-Leibler divergence
//!
//! Pairs the entropy metaprior (over `a`, the concentration of the first
//! distribution) with the cross-entropy metaprior (over `b`, the second) and
//! layers a shape prior on the induced divergence scale
//! `D(a, b) = E[cross-entropy](b) − E[entropy](a)`.
//!
//! Convention: the component factors are folded into both the linear-domain
//! `factor` and the log-domain `ln_factor`, so the two agree
//! (`factor ≈ exp(ln_factor)`) everywhere the prior is smooth. Clamping of
//! the Uniform shape above `cutoff_ratio · ln K` is applied last and returns
//! the numerical sentinels exactly.

use nalgebra::{Matrix2, Vector2};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use super::{
    CrossEntropyMetaprior, EntropyMetaprior, Metaprior, MetapriorError,
    PriorShape,
};
use crate::consts::{CUTOFF_RATIO, NUMERICAL_INFTY, NUMERICAL_ZERO};

/// Metaprior over the pair of concentration parameters `(a, b)` of a
/// KL-divergence estimate.
///
/// # Example
///
/// ```rust
/// use dirmeta::metaprior::{KlMetaprior, PriorShape};
///
/// let mp = KlMetaprior::new(10, PriorShape::LogUniform)
///     .with_scaling(2.0)
///     .unwrap();
///
/// // the induced divergence scale is positive
/// assert!(mp.div(1.0, 1.0) > 0.0);
///
/// // the uniform shape takes no scaling parameter
/// assert!(KlMetaprior::new(10, PriorShape::Uniform).with_scaling(2.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct KlMetaprior {
    k: f64,
    shape: PriorShape,
    scaling: f64,
    cutoff_ratio: f64,
    numerical_zero: f64,
    numerical_infty: f64,
    entropy: EntropyMetaprior,
    cross_entropy: CrossEntropyMetaprior,
}

impl KlMetaprior {
    pub fn new(k: usize, shape: PriorShape) -> Self {
        KlMetaprior {
            k: k as f64,
            shape,
            scaling: 1.0,
            cutoff_ratio: CUTOFF_RATIO,
            numerical_zero: NUMERICAL_ZERO,
            numerical_infty: NUMERICAL_INFTY,
            entropy: EntropyMetaprior::new(k),
            cross_entropy: CrossEntropyMetaprior::new(k),
        }
    }

    /// Build from the string configuration surface: a shape choice amongst
    /// `"uniform"`, `"log-uniform"`, `"scaled"` and an optional `scaling`.
    pub fn from_choice(
        k: usize,
        choice: &str,
        scaling: Option<f64>,
    ) -> Result<Self, MetapriorError> {
        let shape: PriorShape = choice.parse()?;
        let mp = Self::new(k, shape);
        match scaling {
            Some(s) => mp.with_scaling(s),
            None => Ok(mp),
        }
    }

    /// Set the scaling exponent/rate of the shape prior.
    ///
    /// Rejected when the shape takes no scaling parameter, or when the value
    /// is not a positive finite number.
    pub fn with_scaling(self, scaling: f64) -> Result<Self, MetapriorError> {
        if !self.shape.accepts_scaling() {
            Err(MetapriorError::ScalingNotAccepted { shape: self.shape })
        } else if !scaling.is_finite() {
            Err(MetapriorError::ScalingNotFinite { scaling })
        } else if scaling <= 0.0 {
            Err(MetapriorError::ScalingTooLow { scaling })
        } else {
            Ok(KlMetaprior { scaling, ..self })
        }
    }

    /// Set the support cap of the Uniform shape, as a multiple of `ln K`.
    pub fn with_cutoff_ratio(
        self,
        cutoff_ratio: f64,
    ) -> Result<Self, MetapriorError> {
        if cutoff_ratio <= 1.0 || !cutoff_ratio.is_finite() {
            Err(MetapriorError::CutoffRatioTooLow { cutoff_ratio })
        } else {
            Ok(KlMetaprior {
                cutoff_ratio,
                ..self
            })
        }
    }

    /// Override the numerical sentinels standing in for zero prior mass and
    /// for infinity in the log domain.
    pub fn with_sentinels(
        self,
        numerical_zero: f64,
        numerical_infty: f64,
    ) -> Self {
        KlMetaprior {
            numerical_zero,
            numerical_infty,
            ..self
        }
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn shape(&self) -> PriorShape {
        self.shape
    }

    pub fn scaling(&self) -> f64 {
        self.scaling
    }

    fn ln_k(&self) -> f64 {
        self.k.ln()
    }

    fn cutoff(&self) -> f64 {
        self.cutoff_ratio * self.ln_k()
    }

    /// The induced divergence scale `D(a, b)`, always positive.
    pub fn div(&self, a: f64, b: f64) -> f64 {
        self.cross_entropy.prior_expectation(b)
            - self.entropy.prior_expectation(a)
    }

    // Marginalization factor over the nuisance direction: 1/D while D is
    // below its natural ceiling ln K, constant 1/ln K beyond it.
    fn phi(&self, d: f64) -> f64 {
        if !self.shape.uses_phi() {
            1.0
        } else if d < self.ln_k() {
            d.recip()
        } else {
            self.ln_k().recip()
        }
    }

    fn ln_phi(&self, d: f64) -> f64 {
        if !self.shape.uses_phi() {
            0.0
        } else if d < self.ln_k() {
            -d.ln()
        } else {
            -self.ln_k().ln()
        }
    }

    fn ln_phi_jac(&self, a: f64, b: f64, d: f64) -> Vector2<f64> {
        if self.shape.uses_phi() && d < self.ln_k() {
            Vector2::new(
                self.entropy.factor(a) / d,
                self.cross_entropy.factor(b) / d,
            )
        } else {
            Vector2::zeros()
        }
    }

    fn ln_phi_hess(&self, a: f64, b: f64, d: f64) -> Matrix2<f64> {
        if self.shape.uses_phi() && d < self.ln_k() {
            let fa = self.entropy.factor(a);
            let fb = self.cross_entropy.factor(b);
            let h_aa = self.entropy.factor_jac(a) / d + (fa / d).powi(2);
            let h_bb = self.cross_entropy.factor_jac(b) / d + (fb / d).powi(2);
            let h_ab = fa * fb / (d * d);
            Matrix2::new(h_aa, h_ab, h_ab, h_bb)
        } else {
            Matrix2::zeros()
        }
    }

    // Shape prior on D, linear domain. The Uniform clamp is handled by the
    // callers so the sentinel wins exactly.
    fn shape_prior(&self, a: f64, d: f64) -> f64 {
        match self.shape {
            PriorShape::Uniform => 1.0,
            PriorShape::LogUniform => d.powf(-self.scaling),
            PriorShape::Scaled => {
                (-self.scaling * d / self.entropy.prior_expectation(a)).exp()
            }
        }
    }

    fn ln_shape_prior(&self, a: f64, d: f64) -> f64 {
        match self.shape {
            PriorShape::Uniform => 0.0,
            PriorShape::LogUniform => -self.scaling * d.ln(),
            PriorShape::Scaled => {
                -self.scaling * d / self.entropy.prior_expectation(a)
            }
        }
    }

    fn ln_shape_prior_jac(&self, a: f64, b: f64, d: f64) -> Vector2<f64> {
        let s = self.scaling;
        match self.shape {
            PriorShape::Uniform => Vector2::zeros(),
            PriorShape::LogUniform => Vector2::new(
                s * self.entropy.factor(a) / d,
                s * self.cross_entropy.factor(b) / d,
            ),
            PriorShape::Scaled => {
                let ea = self.entropy.prior_expectation(a);
                let eb = self.cross_entropy.prior_expectation(b);
                Vector2::new(
                    s * eb * self.entropy.factor(a) / (ea * ea),
                    s * self.cross_entropy.factor(b) / ea,
                )
            }
        }
    }

    fn ln_shape_prior_hess(&self, a: f64, b: f64, d: f64) -> Matrix2<f64> {
        let s = self.scaling;
        match self.shape {
            PriorShape::Uniform => Matrix2::zeros(),
            PriorShape::LogUniform => {
                let fa = self.entropy.factor(a);
                let fb = self.cross_entropy.factor(b);
                let h_aa = s * self.entropy.factor_jac(a) / d
                    + s * (fa / d).powi(2);
                let h_bb = s * self.cross_entropy.factor_jac(b) / d
                    + s * (fb / d).powi(2);
                let h_ab = s * fa * fb / (d * d);
                Matrix2::new(h_aa, h_ab, h_ab, h_bb)
            }
            PriorShape::Scaled => {
                let ea = self.entropy.prior_expectation(a);
                let eb = self.cross_entropy.prior_expectation(b);
                let fa = self.entropy.factor(a);
                let fb = self.cross_entropy.factor(b);
                let h_aa = s
                    * eb
                    * (self.entropy.factor_jac(a) / (ea * ea)
                        - 2.0 * fa * fa / (ea * ea * ea));
                let h_ab = -s * fb * fa / (ea * ea);
                let h_bb = s * self.cross_entropy.factor_jac(b) / ea;
                Matrix2::new(h_aa, h_ab, h_ab, h_bb)
            }
        }
    }

    fn clamped(&self, d: f64) -> bool {
        self.shape == PriorShape::Uniform && d >= self.cutoff()
    }

    /// Complete metaprior density over `(a, b)`, linear domain.
    pub fn factor(&self, a: f64, b: f64) -> f64 {
        let d = self.div(a, b);
        if self.clamped(d) {
            return self.numerical_zero;
        }
        self.phi(d)
            * self.shape_prior(a, d)
            * self.entropy.factor(a)
            * self.cross_entropy.factor(b)
    }

    /// Log of the complete metaprior.
    pub fn ln_factor(&self, a: f64, b: f64) -> f64 {
        let d = self.div(a, b);
        if self.clamped(d) {
            return -self.numerical_infty;
        }
        self.ln_phi(d)
            + self.ln_shape_prior(a, d)
            + self.entropy.ln_factor(a)
            + self.cross_entropy.ln_factor(b)
    }

    /// Gradient of the log metaprior over `(a, b)`.
    pub fn ln_factor_jac(&self, a: f64, b: f64) -> Vector2<f64> {
        let d = self.div(a, b);
        if self.clamped(d) {
            return Vector2::repeat(-self.numerical_infty);
        }
        self.ln_phi_jac(a, b, d)
            + self.ln_shape_prior_jac(a, b, d)
            + Vector2::new(
                self.entropy.ln_factor_jac(a),
                self.cross_entropy.ln_factor_jac(b),
            )
    }

    /// Hessian of the log metaprior over `(a, b)`.
    pub fn ln_factor_hess(&self, a: f64, b: f64) -> Matrix2<f64> {
        let d = self.div(a, b);
        if self.clamped(d) {
            return Matrix2::repeat(-self.numerical_infty);
        }
        let mut hess = self.ln_phi_hess(a, b, d) + self.ln_shape_prior_hess(a, b, d);
        hess[(0, 0)] += self.entropy.ln_factor_hess(a);
        hess[(1, 1)] += self.cross_entropy.ln_factor_hess(b);
        hess
    }
}
