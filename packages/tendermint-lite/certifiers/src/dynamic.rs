//! Certification with controlled validator set rotation.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tendermint_lite_types::{Checkpoint, Seed, ValidatorSet};
use tendermint_lite_utils::ensure;
use tracing::{debug, info, warn};

use crate::{certifier::Certifier, error::CertifierError, static_certifier::StaticCertifier};

/// Fraction of voting power, e.g. `1/3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustThreshold {
    /// Numerator of the fraction
    pub numerator: u64,
    /// Denominator of the fraction
    pub denominator: u64,
}

impl TrustThreshold {
    /// Creates a threshold, `None` unless `0 < numerator <= denominator`.
    #[must_use]
    pub const fn new(numerator: u64, denominator: u64) -> Option<Self> {
        if numerator == 0 || denominator == 0 || numerator > denominator {
            return None;
        }
        Some(Self {
            numerator,
            denominator,
        })
    }

    /// Whether the fraction is well formed.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        Self::new(self.numerator, self.denominator).is_some()
    }
}

/// Trusted validator set plus the highest height certified with it.
#[derive(Debug)]
struct TrustedState {
    certifier: StaticCertifier,
    last_height: u64,
}

/// A certifier whose trusted validator set can be replaced by a forward-moving update.
///
/// The trusted state is an immutable snapshot behind an [`Arc`]; updates swap the whole
/// snapshot, so a concurrent [`Certifier::certify`] sees either the old or the new set.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct DynamicCertifier {
    chain_id: String,
    state: RwLock<Arc<TrustedState>>,
    change_threshold: Option<TrustThreshold>,
}

impl DynamicCertifier {
    /// Trusts `validators` as of `height`.
    #[must_use]
    pub fn new(chain_id: impl Into<String>, validators: ValidatorSet, height: u64) -> Self {
        let chain_id = chain_id.into();
        let certifier = StaticCertifier::new(chain_id.clone(), validators);
        Self {
            chain_id,
            state: RwLock::new(Arc::new(TrustedState {
                certifier,
                last_height: height,
            })),
            change_threshold: None,
        }
    }

    /// Trusts the validator set of a seed after checking the seed is consistent.
    ///
    /// # Errors
    /// Returns an error if the seed fails [`Seed::validate_full`] for `chain_id`.
    pub fn from_seed(chain_id: impl Into<String>, seed: &Seed) -> Result<Self, CertifierError> {
        let chain_id = chain_id.into();
        seed.validate_full(&chain_id)?;
        Ok(Self::new(chain_id, seed.validators.clone(), seed.height()))
    }

    /// Records the largest validator set change an update should accept.
    ///
    /// The threshold is kept for configuration and inspection only: [`Self::update`] does not
    /// compare the old and new sets, so no update is ever rejected because of it.
    #[must_use]
    pub fn with_change_threshold(mut self, threshold: TrustThreshold) -> Self {
        warn!(
            numerator = threshold.numerator,
            denominator = threshold.denominator,
            "validator set change threshold configured but not enforced"
        );
        self.change_threshold = Some(threshold);
        self
    }

    /// The configured, unenforced change threshold.
    #[must_use]
    pub const fn change_threshold(&self) -> Option<TrustThreshold> {
        self.change_threshold
    }

    /// Highest height trusted so far.
    #[must_use]
    pub fn last_height(&self) -> u64 {
        self.state.read().last_height
    }

    /// The currently trusted validator set.
    #[must_use]
    pub fn validators(&self) -> Arc<ValidatorSet> {
        Arc::clone(self.state.read().certifier.validators())
    }

    fn snapshot(&self) -> Arc<TrustedState> {
        Arc::clone(&self.state.read())
    }

    /// Replaces the trusted validator set with `validators`.
    ///
    /// `checkpoint` must be above the trusted height and signed by a quorum of the *new*
    /// set; that signature is the proof the rotation happened. The old set is not consulted.
    ///
    /// # Errors
    /// Returns [`CertifierError::PastTime`] for a checkpoint at or below the trusted height,
    /// or the verification error of the checkpoint against the new set.
    #[tracing::instrument(skip_all, fields(height = checkpoint.height()))]
    pub fn update(
        &self,
        checkpoint: &Checkpoint,
        validators: ValidatorSet,
    ) -> Result<(), CertifierError> {
        let proposed = checkpoint.height();
        let trusted = self.last_height();
        ensure!(proposed > trusted, CertifierError::PastTime { trusted, proposed });

        let certifier = StaticCertifier::new(self.chain_id.clone(), validators);
        certifier.certify(checkpoint)?;

        let mut state = self.state.write();
        // Another update may have landed while we verified.
        ensure!(
            proposed > state.last_height,
            CertifierError::PastTime {
                trusted: state.last_height,
                proposed,
            }
        );
        info!(
            from_height = state.last_height,
            to_height = proposed,
            old_validators = %state.certifier.validators_hash(),
            new_validators = %certifier.validators_hash(),
            "validator set updated"
        );
        *state = Arc::new(TrustedState {
            certifier,
            last_height: proposed,
        });
        Ok(())
    }
}

impl Certifier for DynamicCertifier {
    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn certify(&self, checkpoint: &Checkpoint) -> Result<(), CertifierError> {
        let snapshot = self.snapshot();
        snapshot.certifier.certify(checkpoint)?;

        let height = checkpoint.height();
        let mut state = self.state.write();
        if height > state.last_height
            && state.certifier.validators_hash() == snapshot.certifier.validators_hash()
        {
            let certifier = state.certifier.clone();
            *state = Arc::new(TrustedState {
                certifier,
                last_height: height,
            });
        }
        debug!(height, trusted_height = state.last_height, "checkpoint certified");
        Ok(())
    }
}
