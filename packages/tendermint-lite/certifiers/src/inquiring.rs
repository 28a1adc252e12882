//! Certification that recovers from a validator set rotation by asking a provider.

use std::sync::Arc;

use tendermint_lite_types::{Checkpoint, Seed, ValidatorSet};
use tracing::{debug, info};

use crate::{
    certifier::Certifier,
    dynamic::{DynamicCertifier, TrustThreshold},
    error::CertifierError,
    provider::Provider,
};

/// A [`DynamicCertifier`] backed by a [`Provider`] of trusted seeds.
///
/// When a checkpoint names a validator set other than the trusted one, the provider is asked
/// for a seed carrying exactly that set. A match is applied as an update and the checkpoint is
/// retried once. Only one transition is bridged per call; intermediate seeds are never chained.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct InquiringCertifier<P> {
    dynamic: DynamicCertifier,
    provider: P,
}

impl<P: Provider> InquiringCertifier<P> {
    /// Starts trusting `seed` and records it in `provider`.
    ///
    /// # Errors
    /// Returns an error if the seed is not consistent for `chain_id` or cannot be stored.
    pub fn new(chain_id: impl Into<String>, seed: Seed, provider: P) -> Result<Self, CertifierError> {
        let dynamic = DynamicCertifier::from_seed(chain_id, &seed)?;
        provider.store_seed(&seed)?;
        Ok(Self { dynamic, provider })
    }

    /// Wraps an existing certifier and provider without touching either.
    #[must_use]
    pub const fn from_parts(dynamic: DynamicCertifier, provider: P) -> Self {
        Self { dynamic, provider }
    }

    /// See [`DynamicCertifier::with_change_threshold`].
    #[must_use]
    pub fn with_change_threshold(self, threshold: TrustThreshold) -> Self {
        Self {
            dynamic: self.dynamic.with_change_threshold(threshold),
            provider: self.provider,
        }
    }

    /// Highest height trusted so far.
    #[must_use]
    pub fn last_height(&self) -> u64 {
        self.dynamic.last_height()
    }

    /// The currently trusted validator set.
    #[must_use]
    pub fn validators(&self) -> Arc<ValidatorSet> {
        self.dynamic.validators()
    }

    /// The backing provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The wrapped certifier.
    #[must_use]
    pub const fn dynamic(&self) -> &DynamicCertifier {
        &self.dynamic
    }

    /// Applies a validator set transition and persists it as a seed.
    ///
    /// # Errors
    /// Returns the [`DynamicCertifier::update`] error, or a provider error if the accepted
    /// transition could not be stored.
    pub fn update(
        &self,
        checkpoint: &Checkpoint,
        validators: ValidatorSet,
    ) -> Result<(), CertifierError> {
        self.dynamic.update(checkpoint, validators.clone())?;
        self.provider.store_seed(&Seed {
            checkpoint: checkpoint.clone(),
            validators,
        })?;
        Ok(())
    }

    fn recover(&self, checkpoint: &Checkpoint) -> Result<(), CertifierError> {
        let hash = checkpoint.validators_hash();
        let seed = self.provider.get_by_hash(hash)?;
        info!(
            target_height = checkpoint.height(),
            seed_height = seed.height(),
            validators = %hash,
            "found seed for rotated validator set"
        );
        self.dynamic.update(&seed.checkpoint, seed.validators)?;
        Ok(())
    }
}

impl<P: Provider> Certifier for InquiringCertifier<P> {
    fn chain_id(&self) -> &str {
        self.dynamic.chain_id()
    }

    #[tracing::instrument(skip_all, fields(height = checkpoint.height()))]
    fn certify(&self, checkpoint: &Checkpoint) -> Result<(), CertifierError> {
        match self.dynamic.certify(checkpoint) {
            Err(err) if err.is_validators_changed() => {
                debug!(%err, "trusted validator set is stale, asking provider");
                self.recover(checkpoint)?;
                self.dynamic.certify(checkpoint)
            }
            result => result,
        }
    }
}
