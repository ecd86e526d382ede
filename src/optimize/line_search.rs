//! Strong-Wolfe line search
//!
//! Bracketing and zoom phases after Algorithms 3.5 and 3.6 of Nocedal &
//! Wright, *Numerical Optimization*. The search works on the scalar
//! restriction `phi(e) = f(x + e·d)` of the objective along a descent
//! direction `d`; the callback returns `(phi(e), phi'(e))`.
//!
//! `amax` doubles as the box cap of the outer bounded optimizer: when the
//! objective is still descending at the cap, the cap itself is returned.

use log::debug;

use super::OptimizeError;

/// Strong-Wolfe line search parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WolfeParams {
    /// Sufficient-decrease coefficient
    pub c1: f64,
    /// Curvature coefficient
    pub c2: f64,
    /// Smallest step distinguishable from no step at all
    pub amin: f64,
    /// Largest admissible step
    pub amax: f64,
    /// Bracket width below which the zoom phase settles
    pub xtol: f64,
    /// Maximum number of bracketing (and zoom) iterations
    pub max_iter: usize,
}

impl Default for WolfeParams {
    fn default() -> Self {
        Self {
            c1: 1e-4,
            c2: 0.9,
            amin: 1e-8,
            amax: 50.0,
            xtol: 1e-14,
            max_iter: 20,
        }
    }
}

/// Minimizer of the quadratic through `(a, fa)` and `(b, fb)` with slope
/// `fpa` at `a`.
#[inline]
fn quad_min(a: f64, fa: f64, fpa: f64, b: f64, fb: f64) -> Option<f64> {
    let dab = b - a;
    if dab == 0.0 {
        return None;
    }
    let c2 = (2.0 / dab) * (((fb - fa) / dab) - fpa);
    if c2 == 0.0 {
        None
    } else {
        Some(a - fpa / c2)
    }
}

/// Minimizer of the cubic through `(a, fa)`, `(b, fb)`, `(c, fc)` with slope
/// `fpa` at `a`.
#[inline]
fn cubic_min(
    a: f64,
    fa: f64,
    fpa: f64,
    b: f64,
    fb: f64,
    c: f64,
    fc: f64,
) -> Option<f64> {
    let db = b - a;
    let dc = c - a;
    let denom = (db * db).powi(2) * (db - dc);
    if denom == 0.0 {
        return None;
    }
    let fu = fb - fa - fpa * db;
    let fv = fc - fa - fpa * dc;
    let c2 = (dc * dc * fu - db * db * fv) / denom;
    if c2 == 0.0 {
        return None;
    }
    let c1 = (-dc * dc * dc * fu + db * db * db * fv) / denom;
    let radical = c1 * c1 - 3.0 * c2 * fpa;
    if radical < 0.0 {
        return None;
    }
    let res = a + (-c1 + radical.sqrt()) / (3.0 * c2);
    if res.is_nan() {
        None
    } else {
        Some(res)
    }
}

/// Shrink a bracket known to contain a strong-Wolfe point.
#[allow(clippy::too_many_arguments)]
fn zoom<F>(
    mut alpha_lo: f64,
    mut alpha_hi: f64,
    mut phi_lo: f64,
    mut derphi_lo: f64,
    mut phi_hi: f64,
    phi_0: f64,
    derphi_0: f64,
    params: &WolfeParams,
    f: F,
) -> Result<f64, OptimizeError>
where
    F: Fn(f64) -> (f64, f64),
{
    const DELTA1: f64 = 0.2;
    const DELTA2: f64 = 0.1;

    let mut alpha_rec = 0.0;
    let mut phi_rec = phi_0;

    for i in 0..params.max_iter {
        let delta = alpha_hi - alpha_lo;
        if delta.abs() < params.xtol {
            return Ok(alpha_lo);
        }
        let (a, b) = if delta < 0.0 {
            (alpha_hi, alpha_lo)
        } else {
            (alpha_lo, alpha_hi)
        };

        // Cubic guess first, quadratic next, bisection as the fallback.
        // Guesses too close to either end of the bracket are rejected.
        let cchk = DELTA1 * delta;
        let cubic = if i > 0 {
            cubic_min(
                alpha_lo, phi_lo, derphi_lo, alpha_hi, phi_hi, alpha_rec,
                phi_rec,
            )
        } else {
            None
        };
        let aj = match cubic.filter(|&t| t >= a + cchk && t <= b - cchk) {
            Some(t) => t,
            None => {
                let qchk = DELTA2 * delta;
                quad_min(alpha_lo, phi_lo, derphi_lo, alpha_hi, phi_hi)
                    .filter(|&t| t >= a + qchk && t <= b - qchk)
                    .unwrap_or(alpha_lo + 0.5 * delta)
            }
        };

        let (phi_aj, derphi_aj) = f(aj);
        debug!(
            "zoom: i = {}, a_lo = {}, a_hi = {}, a_j = {}, phi_aj = {}",
            i, alpha_lo, alpha_hi, aj, phi_aj
        );

        if phi_aj > phi_0 + params.c1 * aj * derphi_0 || phi_aj >= phi_lo {
            alpha_rec = alpha_hi;
            phi_rec = phi_hi;
            alpha_hi = aj;
            phi_hi = phi_aj;
        } else {
            if derphi_aj.abs() <= -params.c2 * derphi_0 {
                return Ok(aj);
            }
            if derphi_aj * delta >= 0.0 {
                alpha_rec = alpha_hi;
                phi_rec = phi_hi;
                alpha_hi = alpha_lo;
                phi_hi = phi_lo;
            } else {
                alpha_rec = alpha_lo;
                phi_rec = phi_lo;
            }
            alpha_lo = aj;
            phi_lo = phi_aj;
            derphi_lo = derphi_aj;
        }
    }
    Err(OptimizeError::MaxIterationReached)
}

/// Find a step length satisfying the strong Wolfe conditions, or the cap
/// `amax` when the objective keeps descending all the way to it.
pub fn wolfe_search<F>(params: &WolfeParams, f: F) -> Result<f64, OptimizeError>
where
    F: Fn(f64) -> (f64, f64),
{
    let (phi_0, derphi_0) = f(0.0);
    if derphi_0 >= 0.0 {
        // not a descent direction
        return Err(OptimizeError::RoundingError);
    }

    let mut alpha0 = 0.0;
    let mut alpha1 = 1.0_f64.min(params.amax);
    let (mut phi_a0, mut derphi_a0) = (phi_0, derphi_0);
    let (mut phi_a1, mut derphi_a1) = f(alpha1);

    debug!(
        "wolfe_search: phi_0 = {}, derphi_0 = {}, amax = {}",
        phi_0, derphi_0, params.amax
    );

    for i in 0..params.max_iter {
        if alpha1 < params.amin {
            return Err(OptimizeError::RoundingError);
        }

        if phi_a1 > phi_0 + params.c1 * alpha1 * derphi_0
            || (phi_a1 >= phi_a0 && i > 0)
        {
            return zoom(
                alpha0, alpha1, phi_a0, derphi_a0, phi_a1, phi_0, derphi_0,
                params, f,
            );
        }

        if derphi_a1.abs() <= -params.c2 * derphi_0 {
            return Ok(alpha1);
        }

        if derphi_a1 >= 0.0 {
            return zoom(
                alpha1, alpha0, phi_a1, derphi_a1, phi_a0, phi_0, derphi_0,
                params, f,
            );
        }

        // Sufficient decrease holds and the slope is still negative. The cap
        // is the best admissible point once the step reaches it.
        if alpha1 >= params.amax {
            return Ok(alpha1);
        }

        let alpha2 = (2.0 * alpha1).min(params.amax);
        alpha0 = alpha1;
        phi_a0 = phi_a1;
        derphi_a0 = derphi_a1;
        alpha1 = alpha2;
        let eval = f(alpha1);
        phi_a1 = eval.0;
        derphi_a1 = eval.1;
    }

    Err(OptimizeError::MaxIterationReached)
}
