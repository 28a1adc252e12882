//! This module defines [`AuditError`].

use tendermint_lite_certifiers::CertifierError;
use tendermint_lite_types::Error;

/// Why an audited piece of data cannot be trusted.
#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum AuditError {
    /// The data is not what the checkpoint commits to
    #[error("proof rejected: {0}")]
    Proof(#[source] Error),

    /// The checkpoint itself is not trusted
    #[error("checkpoint not certified: {0}")]
    Certification(#[from] CertifierError),
}

impl AuditError {
    /// True when the data was bad, as opposed to the header.
    #[must_use]
    pub const fn is_proof_error(&self) -> bool {
        matches!(self, Self::Proof(_))
    }
}
