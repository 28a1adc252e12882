//! Read-only provider over a full node.

use tendermint_lite_types::{Checkpoint, Hash, Seed, ValidatorSet};
use tracing::debug;

use super::Provider;
use crate::error::ProviderError;

/// Untrusted remote data, typically a node's RPC endpoint.
///
/// Retries, timeouts and transport errors are the implementation's business; anything it
/// returns is checked before use.
pub trait Source: Send + Sync {
    /// Latest block height known to the node.
    ///
    /// # Errors
    /// Any transport or node error.
    fn latest_height(&self) -> anyhow::Result<u64>;

    /// Signed header at `height`.
    ///
    /// # Errors
    /// Any transport or node error.
    fn commit(&self, height: u64) -> anyhow::Result<Checkpoint>;

    /// Validator set that signed the block at `height`.
    ///
    /// # Errors
    /// Any transport or node error.
    fn validators(&self, height: u64) -> anyhow::Result<ValidatorSet>;
}

/// Builds seeds from a [`Source`]. Nothing is ever stored.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct NodeProvider<S> {
    source: S,
}

impl<S: Source> NodeProvider<S> {
    /// Reads from `source`.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// The wrapped source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Fetches the commit and validator set at `height` and checks they belong together.
    fn seed_at(&self, height: u64) -> Result<Seed, ProviderError> {
        let checkpoint = self.source.commit(height)?;
        let validators = self.source.validators(height)?;

        let validators_hash = validators.hash();
        if validators_hash != checkpoint.header.validators_hash {
            return Err(ProviderError::InconsistentSource {
                height,
                header: checkpoint.header.validators_hash,
                validators: validators_hash,
            });
        }
        debug!(height, "fetched seed from node");
        Ok(Seed {
            checkpoint,
            validators,
        })
    }
}

impl<S: Source> Provider for NodeProvider<S> {
    fn store_seed(&self, _seed: &Seed) -> Result<(), ProviderError> {
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn get_by_height(&self, height: u64) -> Result<Seed, ProviderError> {
        let height = height.min(self.source.latest_height()?);
        if height == 0 {
            return Err(ProviderError::HeightNotFound(height));
        }
        self.seed_at(height)
    }

    /// Only the set signing the node's latest block can be found.
    #[tracing::instrument(skip(self))]
    fn get_by_hash(&self, hash: &Hash) -> Result<Seed, ProviderError> {
        let latest = self.source.latest_height()?;
        if latest == 0 {
            return Err(ProviderError::HashNotFound(*hash));
        }
        let seed = self.seed_at(latest)?;
        if seed.validators_hash() == *hash {
            Ok(seed)
        } else {
            Err(ProviderError::HashNotFound(*hash))
        }
    }
}
