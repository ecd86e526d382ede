//! MAP estimation of concentration parameters
//!
//! Each `optimal_*_param` function maximizes the log-posterior of a
//! concentration parameter: the Polya evidence of the counts plus the
//! log-metaprior matching the quantity being estimated. Maximization runs
//! through [`bounded_bfgs`] with exact gradients; the estimate reports
//! whether the search converged and whether it saturated the bound interval.

mod bfgs;
mod line_search;

pub use bfgs::{bounded_bfgs, BfgsParams, Minimum};
pub use line_search::{wolfe_search, WolfeParams};

use log::warn;
use nalgebra::DVector;
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::consts;
use crate::data::{CompactCounts, PairedCounts};
use crate::metaprior::{
    CrossEntropyMetaprior, EntropyMetaprior, EqualKlMetaprior, KlMetaprior,
    Metaprior, MetapriorError, SimpsonMetaprior,
};
use crate::polya::Polya;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizeError {
    /// Maximum number of iterations reached.
    MaxIterationReached,
    /// A rounding error which can cause runaway was encountered.
    RoundingError,
}

impl std::error::Error for OptimizeError {}

impl fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxIterationReached => {
                write!(f, "maximum number of iterations reached")
            }
            Self::RoundingError => write!(f, "rounding error encountered"),
        }
    }
}

/// Knobs of the MAP search over concentration parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapParams {
    /// Closed bound interval applied to every coordinate
    pub bounds: (f64, f64),
    /// Starting value for every coordinate
    pub init_guess: f64,
    /// Inner quasi-Newton settings
    pub bfgs: BfgsParams,
}

impl Default for MapParams {
    fn default() -> Self {
        MapParams {
            bounds: consts::BOUNDS,
            init_guess: consts::INIT_GUESS,
            bfgs: BfgsParams::default(),
        }
    }
}

impl MapParams {
    pub fn with_bounds(self, bounds: (f64, f64)) -> Self {
        Self { bounds, ..self }
    }

    pub fn with_init_guess(self, init_guess: f64) -> Self {
        Self { init_guess, ..self }
    }

    pub fn with_bfgs(self, bfgs: BfgsParams) -> Self {
        Self { bfgs, ..self }
    }
}

/// A maximum-a-posteriori estimate of one or two concentration parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct MapEstimate {
    params: Vec<f64>,
    saturated: bool,
    converged: bool,
    iters: usize,
}

impl MapEstimate {
    /// The estimated parameter, for one-dimensional searches.
    pub fn param(&self) -> f64 {
        self.params[0]
    }

    /// All estimated parameters.
    pub fn params(&self) -> &[f64] {
        &self.params
    }

    /// Whether any parameter landed on the bound interval. A saturated
    /// estimate means the posterior mode lies outside the searched region
    /// and the value should be treated with suspicion.
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// Whether the inner minimizer met a convergence criterion.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Outer quasi-Newton iterations spent.
    pub fn iters(&self) -> usize {
        self.iters
    }
}

/// Maximize an n-dimensional log-posterior within the bound box.
fn maximize<F>(n: usize, params: &MapParams, ln_post: F) -> MapEstimate
where
    F: Fn(&DVector<f64>) -> (f64, DVector<f64>),
{
    let (lo, hi) = params.bounds;
    let bounds = vec![(lo, hi); n];
    let x0 = DVector::from_element(n, params.init_guess.clamp(lo, hi));

    let min = bounded_bfgs(x0, &bounds, &params.bfgs, |x| {
        let (f, g) = ln_post(x);
        (-f, -g)
    });

    let sat_tol = (hi - lo) * 1e-9;
    let saturated = min
        .x
        .iter()
        .any(|&xj| xj - lo <= sat_tol || hi - xj <= sat_tol);
    if saturated {
        warn!(
            "MAP estimate saturated the bound interval [{:e}, {:e}]",
            lo, hi
        );
    }
    if !min.converged {
        warn!("MAP search stopped after {} iterations short of convergence", min.iters);
    }

    MapEstimate {
        params: min.x.iter().copied().collect(),
        saturated,
        converged: min.converged,
        iters: min.iters,
    }
}

/// MAP concentration under a flat prior on the concentration itself, i.e.
/// the maximizer of the bare Polya evidence.
pub fn optimal_dirichlet_param(
    counts: &CompactCounts,
    params: &MapParams,
) -> MapEstimate {
    let polya = Polya::new(counts);
    maximize(1, params, |x| {
        let a = x[0];
        (
            polya.ln_m(a),
            DVector::from_column_slice(&[polya.ln_m_jac(a)]),
        )
    })
}

/// MAP concentration under the entropy metaprior.
pub fn optimal_entropy_param(
    counts: &CompactCounts,
    params: &MapParams,
) -> MapEstimate {
    let polya = Polya::new(counts);
    let mp = EntropyMetaprior::new(counts.k());
    maximize(1, params, |x| {
        let a = x[0];
        let f = polya.ln_m(a) + mp.ln_factor(a);
        let g = polya.ln_m_jac(a) + mp.ln_factor_jac(a);
        (f, DVector::from_column_slice(&[g]))
    })
}

/// MAP concentration of the second sample under the cross-entropy
/// metaprior.
pub fn optimal_cross_entropy_param(
    counts: &CompactCounts,
    params: &MapParams,
) -> MapEstimate {
    let polya = Polya::new(counts);
    let mp = CrossEntropyMetaprior::new(counts.k());
    maximize(1, params, |x| {
        let b = x[0];
        let f = polya.ln_m(b) + mp.ln_factor(b);
        let g = polya.ln_m_jac(b) + mp.ln_factor_jac(b);
        (f, DVector::from_column_slice(&[g]))
    })
}

/// MAP concentration under the Simpson-index metaprior.
pub fn optimal_simpson_param(
    counts: &CompactCounts,
    params: &MapParams,
) -> MapEstimate {
    let polya = Polya::new(counts);
    let mp = SimpsonMetaprior::new(counts.k());
    maximize(1, params, |x| {
        let a = x[0];
        let f = polya.ln_m(a) + mp.ln_factor(a);
        let g = polya.ln_m_jac(a) + mp.ln_factor_jac(a);
        (f, DVector::from_column_slice(&[g]))
    })
}

/// MAP of the single concentration shared by both samples under the
/// equal-concentration KL metaprior.
pub fn optimal_equal_kl_param(
    paired: &PairedCounts,
    params: &MapParams,
) -> MapEstimate {
    let polya_1 = Polya::new(paired.first());
    let polya_2 = Polya::new(paired.second());
    let mp = EqualKlMetaprior::new(paired.k());
    maximize(1, params, |x| {
        let a = x[0];
        let f = polya_1.ln_m(a) + polya_2.ln_m(a) + mp.ln_factor(a);
        let g =
            polya_1.ln_m_jac(a) + polya_2.ln_m_jac(a) + mp.ln_factor_jac(a);
        (f, DVector::from_column_slice(&[g]))
    })
}

/// Joint MAP of the two concentration parameters `(a, b)` under the chosen
/// KL-divergence prior shape.
///
/// `choice` is one of `"uniform"`, `"log-uniform"`, `"scaled"`; `scaling`
/// tunes the latter two shapes.
pub fn optimal_kl_divergence_params(
    paired: &PairedCounts,
    choice: &str,
    scaling: Option<f64>,
    params: &MapParams,
) -> Result<MapEstimate, MetapriorError> {
    let mp = KlMetaprior::from_choice(paired.k(), choice, scaling)?;
    let polya_1 = Polya::new(paired.first());
    let polya_2 = Polya::new(paired.second());
    Ok(maximize(2, params, |x| {
        let (a, b) = (x[0], x[1]);
        let f = polya_1.ln_m(a) + polya_2.ln_m(b) + mp.ln_factor(a, b);
        let jac = mp.ln_factor_jac(a, b);
        let g = DVector::from_column_slice(&[
            polya_1.ln_m_jac(a) + jac[0],
            polya_2.ln_m_jac(b) + jac[1],
        ]);
        (f, g)
    }))
}

/// Joint MAP for the Hellinger divergence. No metaprior closed form exists,
/// so this always fails.
pub fn optimal_hellinger_params(
    _paired: &PairedCounts,
    _params: &MapParams,
) -> Result<MapEstimate, MetapriorError> {
    Err(MetapriorError::NotImplemented {
        what: "MAP estimation for the Hellinger divergence",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skewed_counts() -> CompactCounts {
        CompactCounts::new(&[0, 5, 10], &[2, 2, 1]).unwrap()
    }

    #[test]
    fn entropy_map_is_interior_and_stationary() {
        let counts = skewed_counts();
        let est = optimal_entropy_param(&counts, &MapParams::default());

        assert!(est.converged());
        assert!(!est.saturated());

        let a = est.param();
        let polya = Polya::new(&counts);
        let mp = EntropyMetaprior::new(counts.k());
        let grad = polya.ln_m_jac(a) + mp.ln_factor_jac(a);
        assert!(grad.abs() < 1e-3, "gradient at MAP was {}", grad);
    }

    #[test]
    fn even_counts_saturate_the_upper_bound() {
        // perfectly even counts drive the evidence toward the iid limit,
        // so the bare Polya MAP runs into the upper bound
        let counts = CompactCounts::new(&[4], &[5]).unwrap();
        let est = optimal_dirichlet_param(&counts, &MapParams::default());

        assert!(est.saturated());
        let hi = MapParams::default().bounds.1;
        assert::close(est.param(), hi, 1e-6 * hi);
    }

    #[test]
    fn equal_kl_map_stays_interior_for_even_counts() {
        // the c/a² metaprior decays fast enough to pull the shared
        // concentration back from the iid limit
        let c = CompactCounts::new(&[4], &[5]).unwrap();
        let paired = PairedCounts::new(c.clone(), c).unwrap();
        let est = optimal_equal_kl_param(&paired, &MapParams::default());

        assert!(est.converged());
        assert!(!est.saturated());

        let a = est.param();
        let polya = Polya::new(paired.first());
        let mp = EqualKlMetaprior::new(paired.k());
        let grad = 2.0 * polya.ln_m_jac(a) + mp.ln_factor_jac(a);
        assert!(grad.abs() < 1e-3, "gradient at MAP was {}", grad);
    }

    #[test]
    fn kl_divergence_map_runs_on_scaled_shape() {
        let c1 = CompactCounts::from_counts(&[4, 2, 1, 1], Some(10)).unwrap();
        let c2 = CompactCounts::from_counts(&[1, 1, 3, 5], Some(10)).unwrap();
        let paired = PairedCounts::new(c1, c2).unwrap();

        let est = optimal_kl_divergence_params(
            &paired,
            "scaled",
            Some(1.0),
            &MapParams::default(),
        )
        .unwrap();

        assert_eq!(est.params().len(), 2);
        let (lo, hi) = MapParams::default().bounds;
        for &p in est.params() {
            assert!(p.is_finite());
            assert!((lo..=hi).contains(&p));
        }
    }

    #[test]
    fn kl_divergence_map_runs_on_phi_shapes() {
        // the uniform and log-uniform shapes carry the phi term and, for
        // uniform, the sentinel-clamped region; the search must still land
        // on a finite in-bounds pair
        let c1 = CompactCounts::from_counts(&[4, 2, 1, 1], Some(10)).unwrap();
        let c2 = CompactCounts::from_counts(&[1, 1, 3, 5], Some(10)).unwrap();
        let paired = PairedCounts::new(c1, c2).unwrap();
        let (lo, hi) = MapParams::default().bounds;

        for (choice, scaling) in
            [("uniform", None), ("log-uniform", Some(1.0))]
        {
            let est = optimal_kl_divergence_params(
                &paired,
                choice,
                scaling,
                &MapParams::default(),
            )
            .unwrap();

            assert_eq!(est.params().len(), 2);
            for &p in est.params() {
                assert!(p.is_finite(), "{}: non-finite parameter", choice);
                assert!((lo..=hi).contains(&p), "{}: out of bounds", choice);
            }
        }
    }

    #[test]
    fn kl_divergence_map_rejects_bad_config() {
        let c = CompactCounts::from_counts(&[1, 2, 3], Some(5)).unwrap();
        let paired = PairedCounts::new(c.clone(), c).unwrap();

        let res = optimal_kl_divergence_params(
            &paired,
            "bogus",
            None,
            &MapParams::default(),
        );
        assert!(matches!(
            res,
            Err(MetapriorError::UnknownShape { .. })
        ));

        let res = optimal_kl_divergence_params(
            &paired,
            "uniform",
            Some(2.0),
            &MapParams::default(),
        );
        assert!(matches!(
            res,
            Err(MetapriorError::ScalingNotAccepted { .. })
        ));
    }

    #[test]
    fn hellinger_map_is_not_implemented() {
        let c = CompactCounts::from_counts(&[1, 2, 3], Some(5)).unwrap();
        let paired = PairedCounts::new(c.clone(), c).unwrap();
        let res = optimal_hellinger_params(&paired, &MapParams::default());
        assert!(matches!(
            res,
            Err(MetapriorError::NotImplemented { .. })
        ));
    }
}
