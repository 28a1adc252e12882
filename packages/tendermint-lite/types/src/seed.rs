//! A checkpoint bundled with the validator set that produced it.

use serde::{Deserialize, Serialize};
use tendermint_lite_utils::ensure;

use crate::{checkpoint::Checkpoint, error::Error, hash::Hash, validators::ValidatorSet};

/// The unit of trust transfer between a client and a provider, also known as a full commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    /// Signed header.
    pub checkpoint: Checkpoint,
    /// Validator set claimed to have signed it.
    pub validators: ValidatorSet,
}

impl Seed {
    /// Height of the checkpoint.
    #[must_use]
    pub const fn height(&self) -> u64 {
        self.checkpoint.height()
    }

    /// Hash of the bundled validator set.
    #[must_use]
    pub fn validators_hash(&self) -> Hash {
        self.validators.hash()
    }

    /// Internal consistency: structurally valid checkpoint whose header names the bundled set.
    ///
    /// Signatures are not checked here; certifiers do that.
    ///
    /// # Errors
    /// Returns the structural error of the checkpoint, or [`Error::ValidatorsChanged`] if
    /// the bundled set does not hash to the header's validators hash.
    pub fn validate_full(&self, chain_id: &str) -> Result<(), Error> {
        self.checkpoint.validate_basic(chain_id)?;
        let hash = self.validators.hash();
        ensure!(
            hash == self.checkpoint.header.validators_hash,
            Error::ValidatorsChanged {
                height: self.height(),
                expected: self.checkpoint.header.validators_hash,
                found: hash,
            }
        );
        Ok(())
    }

    /// [`Seed::validate_full`] against the chain id in the seed's own header.
    ///
    /// Used by stores, which are not bound to one chain.
    ///
    /// # Errors
    /// Same as [`Seed::validate_full`].
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_full(&self.checkpoint.header.chain_id)
    }
}
