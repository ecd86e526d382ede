//! Posterior curvature and binning helpers
//!
//! The log-posterior Hessians evaluated at (or near) a MAP estimate feed
//! Laplace-style approximations of the posterior over the concentration
//! parameters; the binning helpers discretize that posterior for numerical
//! integration over a grid of concentration values.

use nalgebra::Matrix2;

use crate::consts;
use crate::data::{CompactCounts, PairedCounts};
use crate::metaprior::{
    CrossEntropyMetaprior, EntropyMetaprior, EqualKlMetaprior, KlMetaprior,
    Metaprior, SimpsonMetaprior,
};
use crate::polya::Polya;

/// Curvature of the bare Polya log-evidence.
pub fn dirichlet_ln_posterior_hess(counts: &CompactCounts, a: f64) -> f64 {
    Polya::new(counts).ln_m_hess(a)
}

/// Curvature of the log-posterior under the entropy metaprior.
pub fn entropy_ln_posterior_hess(counts: &CompactCounts, a: f64) -> f64 {
    Polya::new(counts).ln_m_hess(a)
        + EntropyMetaprior::new(counts.k()).ln_factor_hess(a)
}

/// Curvature of the log-posterior under the cross-entropy metaprior.
pub fn cross_entropy_ln_posterior_hess(
    counts: &CompactCounts,
    b: f64,
) -> f64 {
    Polya::new(counts).ln_m_hess(b)
        + CrossEntropyMetaprior::new(counts.k()).ln_factor_hess(b)
}

/// Curvature of the log-posterior under the Simpson-index metaprior.
pub fn simpson_ln_posterior_hess(counts: &CompactCounts, a: f64) -> f64 {
    Polya::new(counts).ln_m_hess(a)
        + SimpsonMetaprior::new(counts.k()).ln_factor_hess(a)
}

/// Curvature of the log-posterior of the shared concentration under the
/// equal-concentration KL metaprior. Both samples contribute evidence.
pub fn equal_kl_ln_posterior_hess(paired: &PairedCounts, a: f64) -> f64 {
    Polya::new(paired.first()).ln_m_hess(a)
        + Polya::new(paired.second()).ln_m_hess(a)
        + EqualKlMetaprior::new(paired.k()).ln_factor_hess(a)
}

/// Hessian of the joint log-posterior over `(a, b)` under a KL-divergence
/// metaprior. The evidence terms are separable, so they only touch the
/// diagonal.
pub fn kl_divergence_ln_posterior_hess(
    paired: &PairedCounts,
    metaprior: &KlMetaprior,
    a: f64,
    b: f64,
) -> Matrix2<f64> {
    let mut hess = metaprior.ln_factor_hess(a, b);
    hess[(0, 0)] += Polya::new(paired.first()).ln_m_hess(a);
    hess[(1, 1)] += Polya::new(paired.second()).ln_m_hess(b);
    hess
}

/// Empirical choice for the number of posterior integration bins,
/// `10·(K/N)²` rounded, between 1 and [`consts::MAX_BINS`].
///
/// # Example
///
/// ```rust
/// use dirmeta::posterior::empirical_n_bins;
///
/// assert_eq!(empirical_n_bins(10.0, 10), 10);
/// // well-sampled data needs almost no marginalization
/// assert_eq!(empirical_n_bins(10_000.0, 10), 1);
/// // deeply undersampled data hits the cap
/// assert_eq!(empirical_n_bins(1.0, 100), 200);
/// ```
pub fn empirical_n_bins(size: f64, categories: usize) -> usize {
    let n_bins = (10.0 * (categories as f64 / size).powi(2)).round().max(1.0);
    (n_bins as usize).min(consts::MAX_BINS)
}

/// `n` points geometrically spaced from `lo` to `hi`, inclusive.
fn logspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![lo];
    }
    let ratio = hi / lo;
    (0..n)
        .map(|i| lo * ratio.powf(i as f64 / (n - 1) as f64))
        .collect()
}

/// Log-spaced bins centered on `loc`, spanning `n_sigma` posterior standard
/// deviations on either side.
///
/// The lower edge is floored at the lower optimization bound so the grid
/// never leaves the admissible concentration interval. For even `n_bins`
/// the grid has exactly `n_bins` points with `loc` in the middle.
pub fn centered_logspace_bins(loc: f64, std: f64, n_bins: usize) -> Vec<f64> {
    let lower = (loc - consts::N_SIGMA * std).max(consts::BOUNDS.0);
    let upper = loc + consts::N_SIGMA * std;
    let half = n_bins / 2;

    let mut bins = logspace(lower, loc, half);
    bins.pop(); // loc re-enters with the upper half
    bins.extend(logspace(loc, upper, half + 1));
    bins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metaprior::PriorShape;

    fn skewed_counts() -> CompactCounts {
        CompactCounts::new(&[0, 5, 10], &[2, 2, 1]).unwrap()
    }

    fn paired() -> PairedCounts {
        let c1 = CompactCounts::from_counts(&[4, 2, 1, 1], Some(10)).unwrap();
        let c2 = CompactCounts::from_counts(&[1, 1, 3, 5], Some(10)).unwrap();
        PairedCounts::new(c1, c2).unwrap()
    }

    #[test]
    fn entropy_posterior_hess_matches_finite_differences() {
        let counts = skewed_counts();
        let polya = Polya::new(&counts);
        let mp = EntropyMetaprior::new(counts.k());
        let grad = |a: f64| polya.ln_m_jac(a) + mp.ln_factor_jac(a);

        for &a in &[0.1, 1.0, 5.0] {
            let h = 1e-6 * a;
            let fd = (grad(a + h) - grad(a - h)) / (2.0 * h);
            let hess = entropy_ln_posterior_hess(&counts, a);
            let scale = hess.abs().max(1.0);
            assert::close(hess / scale, fd / scale, 1e-4);
        }
    }

    #[test]
    fn equal_kl_posterior_hess_matches_finite_differences() {
        let paired = paired();
        let p1 = Polya::new(paired.first());
        let p2 = Polya::new(paired.second());
        let mp = EqualKlMetaprior::new(paired.k());
        let grad =
            |a: f64| p1.ln_m_jac(a) + p2.ln_m_jac(a) + mp.ln_factor_jac(a);

        for &a in &[0.1, 1.0, 5.0] {
            let h = 1e-6 * a;
            let fd = (grad(a + h) - grad(a - h)) / (2.0 * h);
            let hess = equal_kl_ln_posterior_hess(&paired, a);
            let scale = hess.abs().max(1.0);
            assert::close(hess / scale, fd / scale, 1e-4);
        }
    }

    #[test]
    fn kl_posterior_hess_matches_finite_differences() {
        let paired = paired();
        let mp = KlMetaprior::new(paired.k(), PriorShape::Scaled)
            .with_scaling(1.0)
            .unwrap();
        let p1 = Polya::new(paired.first());
        let p2 = Polya::new(paired.second());
        let grad_a = |a: f64, b: f64| {
            p1.ln_m_jac(a) + mp.ln_factor_jac(a, b)[0]
        };
        let grad_b = |a: f64, b: f64| {
            p2.ln_m_jac(b) + mp.ln_factor_jac(a, b)[1]
        };

        let (a, b) = (0.8, 1.3);
        let h = 1e-6;
        let hess = kl_divergence_ln_posterior_hess(&paired, &mp, a, b);

        let fd_aa = (grad_a(a + h, b) - grad_a(a - h, b)) / (2.0 * h);
        let fd_bb = (grad_b(a, b + h) - grad_b(a, b - h)) / (2.0 * h);
        let fd_ab = (grad_a(a, b + h) - grad_a(a, b - h)) / (2.0 * h);

        let s_aa = hess[(0, 0)].abs().max(1.0);
        let s_bb = hess[(1, 1)].abs().max(1.0);
        let s_ab = hess[(0, 1)].abs().max(1.0);
        assert::close(hess[(0, 0)] / s_aa, fd_aa / s_aa, 1e-4);
        assert::close(hess[(1, 1)] / s_bb, fd_bb / s_bb, 1e-4);
        assert::close(hess[(0, 1)] / s_ab, fd_ab / s_ab, 1e-4);
    }

    #[test]
    fn n_bins_is_clamped_to_the_valid_range() {
        assert_eq!(empirical_n_bins(1e6, 2), 1);
        assert_eq!(empirical_n_bins(2.0, 1000), consts::MAX_BINS);
        // 10·(14/10)² = 19.6
        assert_eq!(empirical_n_bins(10.0, 14), 20);
    }

    #[test]
    fn centered_bins_are_ascending_and_centered() {
        let bins = centered_logspace_bins(1.0, 0.5, 10);
        assert_eq!(bins.len(), 10);
        assert!(bins.windows(2).all(|w| w[0] < w[1]));
        assert::close(bins[4], 1.0, 1e-12);
        assert::close(bins[0], 1.0 - consts::N_SIGMA * 0.5, 1e-12);
        assert::close(
            bins[bins.len() - 1],
            1.0 + consts::N_SIGMA * 0.5,
            1e-12,
        );
    }

    #[test]
    fn centered_bins_floor_at_the_lower_bound() {
        // loc − n_sigma·std is negative, so the grid starts at the bound
        let bins = centered_logspace_bins(0.1, 1.0, 8);
        assert::close(bins[0], consts::BOUNDS.0, 1e-18);
        assert!(bins.iter().all(|&b| b > 0.0));
        assert!(bins.windows(2).all(|w| w[0] < w[1]));
    }
}
