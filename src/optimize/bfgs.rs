//! Box-constrained Broyden–Fletcher–Goldfarb–Shanno minimizer
//!
//! Quasi-Newton with an inverse-Hessian approximation, a strong-Wolfe line
//! search, and an active-set treatment of the box: coordinates pinned at a
//! bound with an outward gradient are frozen out of the search direction,
//! and the line search is capped so every iterate stays inside the box.

use log::debug;
use nalgebra::base::{EuclideanNorm, Norm};
use nalgebra::{DMatrix, DVector};

use super::line_search::{wolfe_search, WolfeParams};
use crate::consts;

#[inline]
fn outer_product_self(col: &DVector<f64>) -> DMatrix<f64> {
    let row = DMatrix::from_row_slice(1, col.nrows(), col.as_slice());
    col * row
}

/// Parameters of the bounded BFGS minimizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BfgsParams {
    /// Maximum number of outer iterations
    pub max_iter: usize,
    /// Line search settings
    pub wolfe_params: WolfeParams,
    /// Convergence threshold on the projected-gradient norm
    pub accuracy: f64,
    /// Relative objective-change threshold declaring a stall converged
    pub ftol: f64,
}

impl Default for BfgsParams {
    fn default() -> Self {
        Self {
            max_iter: consts::MAX_ITER,
            wolfe_params: WolfeParams::default(),
            accuracy: 1e-7,
            ftol: consts::TOL,
        }
    }
}

impl BfgsParams {
    pub fn with_max_iter(self, max_iter: usize) -> Self {
        Self { max_iter, ..self }
    }

    pub fn with_accuracy(self, accuracy: f64) -> Self {
        Self { accuracy, ..self }
    }

    pub fn with_ftol(self, ftol: f64) -> Self {
        Self { ftol, ..self }
    }

    pub fn with_wolfe_params(self, wolfe_params: WolfeParams) -> Self {
        Self {
            wolfe_params,
            ..self
        }
    }
}

/// Outcome of a bounded minimization. Non-convergence is a status, not an
/// error: `x` always holds the best iterate found.
#[derive(Clone, Debug, PartialEq)]
pub struct Minimum {
    /// Final iterate, inside the box
    pub x: DVector<f64>,
    /// Objective value at `x`
    pub f: f64,
    /// Whether a convergence criterion was met
    pub converged: bool,
    /// Outer iterations spent
    pub iters: usize,
}

/// Minimize `f` over the box `bounds`, starting from `x0`.
///
/// `f` returns the objective value and its gradient. `bounds` gives the
/// closed `(lo, hi)` interval of every coordinate and must match the length
/// of `x0`; `x0` is clamped into the box before the first evaluation.
pub fn bounded_bfgs<F>(
    x0: DVector<f64>,
    bounds: &[(f64, f64)],
    params: &BfgsParams,
    f: F,
) -> Minimum
where
    F: Fn(&DVector<f64>) -> (f64, DVector<f64>),
{
    let n = x0.nrows();
    assert_eq!(bounds.len(), n, "one (lo, hi) pair per coordinate");

    let clamp = |x: &mut DVector<f64>| {
        for (j, &(lo, hi)) in bounds.iter().enumerate() {
            x[j] = x[j].clamp(lo, hi);
        }
    };
    // Longest step along `dir` from `x` that stays inside the box.
    let step_cap = |x: &DVector<f64>, dir: &DVector<f64>| -> f64 {
        bounds
            .iter()
            .enumerate()
            .filter(|(j, _)| dir[*j] != 0.0)
            .map(|(j, &(lo, hi))| {
                if dir[j] > 0.0 {
                    (hi - x[j]) / dir[j]
                } else {
                    (lo - x[j]) / dir[j]
                }
            })
            .fold(f64::INFINITY, f64::min)
    };

    let metric = EuclideanNorm {};
    let mut b_inv = DMatrix::identity(n, n);
    let mut x = x0;
    clamp(&mut x);
    let (mut f_x, mut g_x) = f(&x);

    for i in 0..params.max_iter {
        // A coordinate is active when it sits on a bound and the gradient
        // pushes it outward; those coordinates stay put this iteration.
        let active: Vec<bool> = bounds
            .iter()
            .enumerate()
            .map(|(j, &(lo, hi))| {
                let tol = (hi - lo) * 1e-8;
                (x[j] - lo <= tol && g_x[j] > 0.0)
                    || (hi - x[j] <= tol && g_x[j] < 0.0)
            })
            .collect();

        let mut pg = g_x.clone();
        for (j, &a) in active.iter().enumerate() {
            if a {
                pg[j] = 0.0;
            }
        }
        if metric.norm(&pg) < params.accuracy {
            return Minimum {
                x,
                f: f_x,
                converged: true,
                iters: i,
            };
        }

        let mut search_dir: DVector<f64> = -1.0 * &b_inv * &g_x;
        for (j, &a) in active.iter().enumerate() {
            if a {
                search_dir[j] = 0.0;
            }
        }
        debug!(
            "bfgs: i = {}, x = {}, f = {}, search_dir = {}",
            i, x, f_x, search_dir
        );

        // The curvature approximation can turn the direction uphill or pin
        // it against the box; restart from projected steepest descent.
        if search_dir.dot(&g_x) >= 0.0
            || step_cap(&x, &search_dir) <= params.wolfe_params.amin
        {
            b_inv = DMatrix::identity(n, n);
            search_dir = -pg.clone();
        }

        let mut wolfe = params.wolfe_params;
        wolfe.amax = wolfe.amax.min(step_cap(&x, &search_dir));

        let eps = match wolfe_search(&wolfe, |e| {
            let xe = &x + &search_dir * e;
            let (f_e, g_e) = f(&xe);
            (f_e, g_e.dot(&search_dir))
        }) {
            Ok(eps) => eps,
            Err(err) => {
                debug!("line search failed at iteration {}: {}", i, err);
                return Minimum {
                    x,
                    f: f_x,
                    converged: false,
                    iters: i,
                };
            }
        };

        let s: DVector<f64> = eps * &search_dir;
        x += &s;
        clamp(&mut x);

        let f_last = f_x;
        let g_last = g_x;
        let eval = f(&x);
        f_x = eval.0;
        g_x = eval.1;

        if (f_last - f_x).abs() <= params.ftol * (1.0 + f_x.abs()) {
            return Minimum {
                x,
                f: f_x,
                converged: true,
                iters: i + 1,
            };
        }

        let y: DVector<f64> = &g_x - &g_last;
        let sty = s.dot(&y);
        // The secant update needs positive curvature along the step; skip it
        // otherwise (typical right after hitting a bound).
        if sty > 1e-10 * metric.norm(&s) * metric.norm(&y) {
            let sst = outer_product_self(&s);
            let yt_bi_y: f64 = y.dot(&(&b_inv * &y));
            let add = ((sty + yt_bi_y) * &sst) / (sty * sty);
            let sub = (&b_inv * &y * s.transpose()
                + &s * y.transpose() * &b_inv)
                / sty;
            b_inv += &add - &sub;
        }
    }

    Minimum {
        x,
        f: f_x,
        converged: false,
        iters: params.max_iter,
    }
}
