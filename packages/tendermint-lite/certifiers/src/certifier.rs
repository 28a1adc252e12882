//! The [`Certifier`] capability shared by every certifier.

use std::sync::Arc;

use tendermint_lite_types::Checkpoint;

use crate::error::CertifierError;

/// Accepts or rejects checkpoints based on trusted validator knowledge.
pub trait Certifier {
    /// Chain the certifier is bound to.
    fn chain_id(&self) -> &str;

    /// Succeeds iff `checkpoint` is signed by more than two thirds of a trusted validator set.
    ///
    /// # Errors
    /// Returns the reason the checkpoint cannot be trusted.
    fn certify(&self, checkpoint: &Checkpoint) -> Result<(), CertifierError>;
}

impl<C: Certifier + ?Sized> Certifier for &C {
    fn chain_id(&self) -> &str {
        (**self).chain_id()
    }

    fn certify(&self, checkpoint: &Checkpoint) -> Result<(), CertifierError> {
        (**self).certify(checkpoint)
    }
}

impl<C: Certifier + ?Sized> Certifier for Arc<C> {
    fn chain_id(&self) -> &str {
        (**self).chain_id()
    }

    fn certify(&self, checkpoint: &Checkpoint) -> Result<(), CertifierError> {
        (**self).certify(checkpoint)
    }
}
