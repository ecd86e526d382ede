//! Numerical constants and process-wide defaults
//!
//! Every tunable in this module is a *default*: the optimizer reads them
//! through [`MapParams`](crate::optimize::MapParams) and the two-dimensional
//! metapriors through their builder methods, so tests and callers can
//! override any of them without touching shared state.

/// Half-width of the posterior binning window, in posterior standard
/// deviations.
pub const N_SIGMA: f64 = 1.5;

/// Default iteration cap for the MAP optimizer.
pub const MAX_ITER: usize = 500;

/// Default function/gradient tolerance for the MAP optimizer.
pub const TOL: f64 = 1e-14;

/// Trusted interval for concentration parameters. Outside of it the Polya
/// likelihood and the metapriors lose numerical meaning.
pub const BOUNDS: (f64, f64) = (1e-5, 1e3);

/// Default starting guess for each concentration parameter.
pub const INIT_GUESS: f64 = 1.0;

/// Divergence prior support cap, as a multiple of `ln K`. Must be > 1.
pub const CUTOFF_RATIO: f64 = 5.0;

/// Stand-in for zero prior mass, keeps the objective finite.
pub const NUMERICAL_ZERO: f64 = 1e-14;

/// Stand-in for infinity in the log domain.
pub const NUMERICAL_INFTY: f64 = 1e12;

/// Hard cap on the number of posterior bins.
pub const MAX_BINS: usize = 200;
