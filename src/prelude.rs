//! Re-imports for convenience

#[doc(no_inline)]
pub use crate::data::{CompactCounts, PairedCounts};
#[doc(no_inline)]
pub use crate::metaprior::*;
#[doc(no_inline)]
pub use crate::optimize::{
    optimal_cross_entropy_param, optimal_dirichlet_param,
    optimal_entropy_param, optimal_equal_kl_param, optimal_hellinger_params,
    optimal_kl_divergence_params, optimal_simpson_param, MapEstimate,
    MapParams,
};
#[doc(no_inline)]
pub use crate::polya::Polya;
#[doc(no_inline)]
pub use crate::posterior::*;
