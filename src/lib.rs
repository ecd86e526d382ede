//! MAP machinery for Bayesian entropy and divergence estimation over
//! categorical data with Dirichlet priors.
//!
//! The posterior over a symmetric Dirichlet concentration parameter combines
//! the [Polya evidence](polya::Polya) of the observed counts with an
//! NSB-style [metaprior](metaprior) that flattens the induced prior on the
//! quantity of interest (Shannon entropy, cross-entropy, Simpson index, or
//! KL divergence). The [optimize] module maximizes that posterior inside a
//! trusted bound interval, and [posterior] supplies the curvature and
//! binning pieces of Laplace-style marginalization around the mode.
//!
//! # Example
//!
//! ```rust
//! use dirmeta::prelude::*;
//!
//! // 10 categories, only 8 observations: deeply undersampled
//! let counts = CompactCounts::from_counts(&[4, 2, 1, 1], Some(10)).unwrap();
//!
//! let est = optimal_entropy_param(&counts, &MapParams::default());
//! assert!(est.converged());
//! assert!(!est.saturated());
//!
//! // negative curvature at the mode gives the posterior width
//! let hess = entropy_ln_posterior_hess(&counts, est.param());
//! assert!(hess < 0.0);
//! ```

pub mod consts;
pub mod data;
pub mod metaprior;
pub mod misc;
pub mod optimize;
pub mod polya;
pub mod posterior;
pub mod prelude;
