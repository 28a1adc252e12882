//! Trusting application data: the proof must match the checkpoint and the checkpoint must
//! be certified.

use tendermint_lite_certifiers::Certifier;
use tendermint_lite_types::{Checkpoint, Proof, TxProof};
use tracing::debug;

use crate::error::AuditError;

/// Checks data against a checkpoint, then the checkpoint against a certifier.
#[derive(Debug)]
pub struct Auditor<C> {
    certifier: C,
}

impl<C: Certifier> Auditor<C> {
    /// Audits with `certifier`.
    #[must_use]
    pub const fn new(certifier: C) -> Self {
        Self { certifier }
    }

    /// The certifier headers are checked with.
    #[must_use]
    pub const fn certifier(&self) -> &C {
        &self.certifier
    }

    /// Accepts `(key, value)` iff `proof` shows it under the app hash of a certified
    /// `checkpoint`.
    ///
    /// # Errors
    /// Returns [`AuditError::Proof`] if the proof does not bind to the checkpoint and
    /// [`AuditError::Certification`] if the checkpoint is not trusted.
    pub fn audit<P: Proof + ?Sized>(
        &self,
        key: &[u8],
        value: &[u8],
        proof: &P,
        checkpoint: &Checkpoint,
    ) -> Result<(), AuditError> {
        checkpoint
            .check_app_state(key, value, proof)
            .map_err(AuditError::Proof)?;
        self.certifier.certify(checkpoint)?;
        debug!(height = checkpoint.height(), "app state audited");
        Ok(())
    }

    /// Accepts a transaction iff `proof` shows it under the data hash of a certified
    /// `checkpoint`.
    ///
    /// # Errors
    /// As [`Auditor::audit`].
    pub fn audit_tx(&self, proof: &TxProof, checkpoint: &Checkpoint) -> Result<(), AuditError> {
        checkpoint.check_tx_proof(proof).map_err(AuditError::Proof)?;
        self.certifier.certify(checkpoint)?;
        debug!(height = checkpoint.height(), "transaction audited");
        Ok(())
    }

    /// Accepts a full transaction list iff it is exactly the one a certified `checkpoint`
    /// commits to.
    ///
    /// # Errors
    /// As [`Auditor::audit`].
    pub fn audit_txs<T: AsRef<[u8]>>(
        &self,
        txs: &[T],
        checkpoint: &Checkpoint,
    ) -> Result<(), AuditError> {
        checkpoint.check_txs(txs).map_err(AuditError::Proof)?;
        self.certifier.certify(checkpoint)?;
        Ok(())
    }
}
