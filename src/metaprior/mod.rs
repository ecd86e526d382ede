//! NSB-style metapriors on the concentration parameter
//!
//! A metaprior is the absolute Jacobian factor of the change of variables
//! from the concentration parameter to a target quantity (entropy,
//! cross-entropy, Simpson index, divergence), chosen so the induced prior on
//! that quantity is close to flat. Concrete variants supply the closed-form
//! factor and its first two derivatives; the log-domain derivatives follow
//! generically.

mod cross_entropy;
mod entropy;
mod equal_kl;
mod hellinger;
mod kl;
mod simpson;

pub use cross_entropy::CrossEntropyMetaprior;
pub use entropy::EntropyMetaprior;
pub use equal_kl::EqualKlMetaprior;
pub use hellinger::HellingerMetaprior;
pub use kl::KlMetaprior;
pub use simpson::SimpsonMetaprior;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One-dimensional metaprior over a concentration parameter at fixed `K`.
///
/// Implementors provide the a-priori expectation of the target quantity and
/// the transformation factor with its first two derivatives; the log-domain
/// methods are derived.
pub trait Metaprior {
    /// Support size the metaprior was built for.
    fn k(&self) -> f64;

    /// A-priori expectation of the target quantity under the symmetric
    /// Dirichlet with concentration `a`.
    fn prior_expectation(&self, a: f64) -> f64;

    /// Transformation factor: the absolute Jacobian of the change of
    /// variables from `a` to the target quantity.
    fn factor(&self, a: f64) -> f64;

    /// 1st derivative of the transformation factor.
    fn factor_jac(&self, a: f64) -> f64;

    /// 2nd derivative of the transformation factor.
    fn factor_hess(&self, a: f64) -> f64;

    /// Log of the transformation factor.
    fn ln_factor(&self, a: f64) -> f64 {
        self.factor(a).ln()
    }

    /// 1st derivative of the log transformation factor.
    fn ln_factor_jac(&self, a: f64) -> f64 {
        self.factor_jac(a) / self.factor(a)
    }

    /// 2nd derivative of the log transformation factor.
    fn ln_factor_hess(&self, a: f64) -> f64 {
        let ln_jac = self.ln_factor_jac(a);
        self.factor_hess(a) / self.factor(a) - ln_jac * ln_jac
    }
}

/// Shape of the prior placed on the induced divergence scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "kebab-case"))]
pub enum PriorShape {
    /// Flat on the divergence, with mass cut off above a multiple of `ln K`
    Uniform,
    /// Proportional to `D^(-scaling)`
    LogUniform,
    /// Exponential tilt `exp(-scaling · D / E[entropy])`
    Scaled,
}

impl PriorShape {
    /// Whether the shape carries the phi marginalization factor over the
    /// nuisance direction.
    pub fn uses_phi(&self) -> bool {
        match self {
            PriorShape::Uniform => true,
            PriorShape::LogUniform => true,
            PriorShape::Scaled => false,
        }
    }

    /// Whether the shape accepts the `scaling` extra parameter.
    pub fn accepts_scaling(&self) -> bool {
        match self {
            PriorShape::Uniform => false,
            PriorShape::LogUniform => true,
            PriorShape::Scaled => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriorShape::Uniform => "uniform",
            PriorShape::LogUniform => "log-uniform",
            PriorShape::Scaled => "scaled",
        }
    }
}

impl fmt::Display for PriorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PriorShape {
    type Err = MetapriorError;

    /// # Example
    ///
    /// ```rust
    /// use std::str::FromStr;
    /// use dirmeta::metaprior::PriorShape;
    ///
    /// assert_eq!(PriorShape::from_str("log-uniform"), Ok(PriorShape::LogUniform));
    /// assert!(PriorShape::from_str("bogus").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" => Ok(PriorShape::Uniform),
            "log-uniform" => Ok(PriorShape::LogUniform),
            "scaled" => Ok(PriorShape::Scaled),
            _ => Err(MetapriorError::UnknownShape {
                choice: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetapriorError {
    /// The prior-shape string is not one of uniform, log-uniform, scaled
    UnknownShape { choice: String },
    /// The scaling parameter is not positive
    ScalingTooLow { scaling: f64 },
    /// The scaling parameter is infinite or NaN
    ScalingNotFinite { scaling: f64 },
    /// The chosen shape does not accept a scaling parameter
    ScalingNotAccepted { shape: PriorShape },
    /// The cutoff ratio must exceed one
    CutoffRatioTooLow { cutoff_ratio: f64 },
    /// The variant has no closed form yet
    NotImplemented { what: &'static str },
}

impl std::error::Error for MetapriorError {}

impl fmt::Display for MetapriorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownShape { choice } => write!(
                f,
                "unrecognized prior shape `{}`; choose amongst: uniform, \
                 log-uniform, scaled",
                choice
            ),
            Self::ScalingTooLow { scaling } => {
                write!(f, "scaling ({}) must be greater than zero", scaling)
            }
            Self::ScalingNotFinite { scaling } => {
                write!(f, "scaling ({}) was non-finite", scaling)
            }
            Self::ScalingNotAccepted { shape } => write!(
                f,
                "the `{}` prior shape does not accept a scaling parameter",
                shape
            ),
            Self::CutoffRatioTooLow { cutoff_ratio } => write!(
                f,
                "cutoff ratio ({}) must be greater than one",
                cutoff_ratio
            ),
            Self::NotImplemented { what } => {
                write!(f, "{} is not implemented", what)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_round_trips_through_strings() {
        for shape in [
            PriorShape::Uniform,
            PriorShape::LogUniform,
            PriorShape::Scaled,
        ] {
            assert_eq!(PriorShape::from_str(shape.as_str()), Ok(shape));
        }
    }

    #[test]
    fn unknown_shape_is_rejected() {
        let err = PriorShape::from_str("bogus").unwrap_err();
        assert_eq!(
            err,
            MetapriorError::UnknownShape {
                choice: "bogus".to_string()
            }
        );
    }

    #[test]
    fn shape_table() {
        assert!(PriorShape::Uniform.uses_phi());
        assert!(PriorShape::LogUniform.uses_phi());
        assert!(!PriorShape::Scaled.uses_phi());

        assert!(!PriorShape::Uniform.accepts_scaling());
        assert!(PriorShape::LogUniform.accepts_scaling());
        assert!(PriorShape::Scaled.accepts_scaling());
    }
}
