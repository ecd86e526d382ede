//! Placeholder for a metaprior on Hellinger divergence

use super::MetapriorError;

/// Metaprior for Hellinger divergence between two Dirichlet-distributed
/// distributions.
///
/// No closed form is known for the a-priori expectation, so construction
/// always fails with [`MetapriorError::NotImplemented`]. The type exists so
/// the divergence surface is uniform across variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HellingerMetaprior {
    _private: (),
}

impl HellingerMetaprior {
    pub fn new(_k: usize) -> Result<Self, MetapriorError> {
        Err(MetapriorError::NotImplemented {
            what: "the Hellinger-divergence metaprior",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_always_fails() {
        let err = HellingerMetaprior::new(10).unwrap_err();
        assert!(matches!(err, MetapriorError::NotImplemented { .. }));
    }
}
