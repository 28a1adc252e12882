//! Certification against one fixed validator set.

use std::sync::Arc;

use tendermint_lite_types::{Checkpoint, Error, Hash, ValidatorSet};
use tendermint_lite_utils::ensure;

use crate::{certifier::Certifier, error::CertifierError};

/// Verifies checkpoints against a single, fixed validator set.
///
/// Stateless: certifying never changes it, so it can be cloned and shared freely.
#[derive(Clone, Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct StaticCertifier {
    chain_id: String,
    validators: Arc<ValidatorSet>,
    validators_hash: Hash,
}

impl StaticCertifier {
    /// Creates a certifier trusting `validators` on `chain_id`.
    #[must_use]
    pub fn new(chain_id: impl Into<String>, validators: ValidatorSet) -> Self {
        let validators_hash = validators.hash();
        Self {
            chain_id: chain_id.into(),
            validators: Arc::new(validators),
            validators_hash,
        }
    }

    /// The trusted validator set.
    #[must_use]
    pub const fn validators(&self) -> &Arc<ValidatorSet> {
        &self.validators
    }

    /// Hash of the trusted validator set.
    #[must_use]
    pub const fn validators_hash(&self) -> &Hash {
        &self.validators_hash
    }

    /// Runs every check and returns the voting power that signed.
    ///
    /// Structural checks come first, then the validators hash, then the quorum, so a
    /// checkpoint from a rotated set is reported as [`Error::ValidatorsChanged`] rather than
    /// as a quorum failure.
    ///
    /// # Errors
    /// Returns the first failing check.
    pub fn verify(&self, checkpoint: &Checkpoint) -> Result<i64, Error> {
        checkpoint.validate_basic(&self.chain_id)?;
        ensure!(
            *checkpoint.validators_hash() == self.validators_hash,
            Error::ValidatorsChanged {
                height: checkpoint.height(),
                expected: self.validators_hash,
                found: *checkpoint.validators_hash(),
            }
        );
        self.validators.verify_commit(&self.chain_id, &checkpoint.commit)
    }
}

impl Certifier for StaticCertifier {
    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn certify(&self, checkpoint: &Checkpoint) -> Result<(), CertifierError> {
        self.verify(checkpoint)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tendermint_lite_types::test_utils::TestValidators;

    use super::*;

    const CHAIN_ID: &str = "test-chain";

    #[rstest]
    #[case(5)]
    #[case(4)]
    fn accepts_quorum_of_trusted_set(#[case] signers: usize) {
        let vals = TestValidators::new(0, 5, 10);
        let certifier = StaticCertifier::new(CHAIN_ID, vals.validator_set());
        let checkpoint = vals.checkpoint(CHAIN_ID, 100, signers);
        assert!(certifier.certify(&checkpoint).is_ok());
    }

    #[rstest]
    #[case(3)]
    #[case(2)]
    fn rejects_minority(#[case] signers: usize) {
        let vals = TestValidators::new(0, 5, 10);
        let certifier = StaticCertifier::new(CHAIN_ID, vals.validator_set());
        let checkpoint = vals.checkpoint(CHAIN_ID, 100, signers);
        let err = certifier.certify(&checkpoint).unwrap_err();
        assert!(err.is_quorum_failure(), "{err}");
    }

    #[test]
    fn rotated_set_is_reported_as_validators_changed() {
        let old = TestValidators::new(0, 4, 10);
        let new = TestValidators::new(10, 4, 10);
        let certifier = StaticCertifier::new(CHAIN_ID, old.validator_set());
        let err = certifier
            .certify(&new.checkpoint(CHAIN_ID, 8, 4))
            .unwrap_err();
        assert!(err.is_validators_changed(), "{err}");
    }

    #[test]
    fn structural_errors_come_before_validator_checks() {
        let vals = TestValidators::new(0, 4, 10);
        let certifier = StaticCertifier::new(CHAIN_ID, vals.validator_set());
        let err = certifier
            .certify(&vals.checkpoint("other-chain", 8, 4))
            .unwrap_err();
        assert!(matches!(
            err,
            CertifierError::Verification(Error::ChainIdMismatch { .. })
        ));
    }

    #[test]
    fn overlapping_minority_of_a_mixed_set_fails_quorum() {
        // Trusted set of 4; the header names the same set but only 2 trusted keys plus
        // outsiders signed.
        let trusted = TestValidators::new(0, 4, 10);
        let outsiders = TestValidators::new(10, 3, 10);
        let certifier = StaticCertifier::new(CHAIN_ID, trusted.validator_set());
        let mut checkpoint = trusted.checkpoint(CHAIN_ID, 8, 2);
        let extra = outsiders.sign(CHAIN_ID, &checkpoint.header, 3);
        checkpoint.commit.votes.extend(extra.votes);
        assert!(certifier.certify(&checkpoint).unwrap_err().is_quorum_failure());
    }
}
