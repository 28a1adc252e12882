//! Validators, validator sets and the commit quorum check.

use std::collections::BTreeSet;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use tendermint_lite_utils::ensure;

use crate::{
    commit::Commit,
    error::Error,
    hash::{Address, Hash},
    merkle::simple_hash_from_byte_vectors,
};

/// Upper bound on the summed voting power of a set, low enough that the quorum arithmetic
/// cannot overflow.
pub const MAX_TOTAL_VOTING_POWER: i64 = i64::MAX / 8;

/// A member of a validator set.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Address derived from `pub_key`.
    pub address: Address,
    /// ed25519 public key.
    #[serde_as(as = "Hex")]
    pub pub_key: [u8; 32],
    /// Voting power, strictly positive.
    pub voting_power: i64,
}

impl Validator {
    /// Creates a validator, deriving its address from the key.
    #[must_use]
    pub fn new(pub_key: [u8; 32], voting_power: i64) -> Self {
        Self {
            address: Address::from_public_key(&pub_key),
            pub_key,
            voting_power,
        }
    }

    /// Bytes hashed into the validator set hash.
    #[must_use]
    pub fn hash_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.address.0.len() + self.pub_key.len() + 8);
        bytes.extend_from_slice(&self.address.0);
        bytes.extend_from_slice(&self.pub_key);
        bytes.extend_from_slice(&self.voting_power.to_be_bytes());
        bytes
    }

    fn validate(&self) -> Result<(), Error> {
        let expected = Address::from_public_key(&self.pub_key);
        ensure!(
            expected == self.address,
            Error::AddressMismatch {
                expected,
                found: self.address,
            }
        );
        ensure!(
            self.voting_power > 0,
            Error::NonPositiveVotingPower {
                address: self.address,
                power: self.voting_power,
            }
        );
        VerifyingKey::from_bytes(&self.pub_key).map_err(|_| Error::InvalidPublicKey(self.address))?;
        Ok(())
    }

    fn verify_signature(&self, msg: &[u8], signature: &[u8]) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&self.pub_key) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        key.verify(msg, &signature).is_ok()
    }
}

/// An ordered, address-unique set of validators.
///
/// The set is sorted by address on construction so its hash does not depend on the order
/// the validators were supplied in. Deserialization goes through the same checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Validator>", into = "Vec<Validator>")]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    /// Builds a set, rejecting empty input, duplicates and malformed validators.
    ///
    /// # Errors
    /// Returns an error if the set is empty, an address repeats, an address does not match
    /// its key, a key is invalid, a voting power is not positive or the total power exceeds
    /// [`MAX_TOTAL_VOTING_POWER`].
    pub fn new(mut validators: Vec<Validator>) -> Result<Self, Error> {
        ensure!(!validators.is_empty(), Error::EmptyValidatorSet);
        let mut total: i64 = 0;
        for validator in &validators {
            validator.validate()?;
            total = total
                .checked_add(validator.voting_power)
                .filter(|total| *total <= MAX_TOTAL_VOTING_POWER)
                .ok_or(Error::TotalVotingPowerTooLarge {
                    max: MAX_TOTAL_VOTING_POWER,
                })?;
        }
        validators.sort_by(|a, b| a.address.cmp(&b.address));
        if let Some(pair) = validators.windows(2).find(|w| w[0].address == w[1].address) {
            return Err(Error::DuplicateValidator(pair[0].address));
        }
        Ok(Self { validators })
    }

    /// Validators sorted by address.
    #[must_use]
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Number of validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Always false; an empty set cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Looks up a validator by address.
    #[must_use]
    pub fn get(&self, address: &Address) -> Option<&Validator> {
        self.validators
            .binary_search_by(|v| v.address.cmp(address))
            .ok()
            .map(|i| &self.validators[i])
    }

    /// Sum of all voting power, at most [`MAX_TOTAL_VOTING_POWER`].
    #[must_use]
    pub fn total_voting_power(&self) -> i64 {
        self.validators.iter().map(|v| v.voting_power).sum()
    }

    /// Deterministic hash, matched against `Header::validators_hash`.
    #[must_use]
    pub fn hash(&self) -> Hash {
        let items: Vec<Vec<u8>> = self.validators.iter().map(Validator::hash_bytes).collect();
        simple_hash_from_byte_vectors(&items)
    }

    /// Checks that strictly more than two thirds of this set's voting power signed `commit`.
    ///
    /// Votes from addresses outside the set are ignored. Returns the signed voting power.
    ///
    /// # Errors
    /// Returns an error if a vote does not match the commit, a validator voted twice, a
    /// signature is invalid or the signed power does not reach the quorum.
    pub fn verify_commit(&self, chain_id: &str, commit: &Commit) -> Result<i64, Error> {
        let mut seen = BTreeSet::new();
        let mut signed: i64 = 0;

        for vote in &commit.votes {
            let address = vote.validator_address;
            ensure!(
                commit.matches(vote),
                Error::VoteMismatch {
                    address,
                    height: commit.height,
                }
            );
            let Some(validator) = self.get(&address) else {
                continue;
            };
            ensure!(
                seen.insert(address),
                Error::DuplicateVote {
                    address,
                    height: commit.height,
                }
            );
            ensure!(
                validator.verify_signature(&vote.sign_bytes(chain_id), &vote.signature),
                Error::InvalidSignature {
                    address,
                    height: commit.height,
                }
            );
            signed += validator.voting_power;
        }

        let total = self.total_voting_power();
        ensure!(
            i128::from(signed) * 3 > i128::from(total) * 2,
            Error::InsufficientVotingPower {
                height: commit.height,
                signed,
                total,
            }
        );
        Ok(signed)
    }
}

impl TryFrom<Vec<Validator>> for ValidatorSet {
    type Error = Error;

    fn try_from(validators: Vec<Validator>) -> Result<Self, Self::Error> {
        Self::new(validators)
    }
}

impl From<ValidatorSet> for Vec<Validator> {
    fn from(set: ValidatorSet) -> Self {
        set.validators
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_utils::TestValidators;

    const CHAIN_ID: &str = "test-chain";

    #[test]
    fn hash_is_independent_of_input_order() {
        let vals = TestValidators::new(0, 4, 10);
        let mut reversed = vals.validator_set().validators().to_vec();
        reversed.reverse();
        let set = ValidatorSet::new(reversed).unwrap();
        assert_eq!(set.hash(), vals.validator_set().hash());
    }

    #[test]
    fn hash_changes_with_power() {
        let a = TestValidators::with_powers(0, &[10, 10, 10]);
        let b = TestValidators::with_powers(0, &[10, 10, 11]);
        assert_ne!(a.validator_set().hash(), b.validator_set().hash());
    }

    #[test]
    fn rejects_empty_and_duplicate_sets() {
        assert_eq!(ValidatorSet::new(vec![]), Err(Error::EmptyValidatorSet));

        let v = TestValidators::new(0, 1, 10).validator_set().validators()[0].clone();
        assert_eq!(
            ValidatorSet::new(vec![v.clone(), v.clone()]),
            Err(Error::DuplicateValidator(v.address))
        );
    }

    #[test]
    fn rejects_forged_address_and_zero_power() {
        let mut v = TestValidators::new(0, 1, 10).validator_set().validators()[0].clone();
        let real = v.address;
        v.address = Address([9; 20]);
        assert_eq!(
            ValidatorSet::new(vec![v.clone()]),
            Err(Error::AddressMismatch {
                expected: real,
                found: Address([9; 20]),
            })
        );

        v.address = real;
        v.voting_power = 0;
        assert!(matches!(
            ValidatorSet::new(vec![v]),
            Err(Error::NonPositiveVotingPower { power: 0, .. })
        ));
    }

    #[rstest]
    #[case(&[MAX_TOTAL_VOTING_POWER, 1])]
    #[case(&[i64::MAX, i64::MAX])]
    #[case(&[i64::MAX / 2, i64::MAX / 2, i64::MAX / 2])]
    fn rejects_oversized_total_power(#[case] powers: &[i64]) {
        let mut validators = TestValidators::new(0, powers.len(), 10)
            .validator_set()
            .validators()
            .to_vec();
        for (validator, power) in validators.iter_mut().zip(powers) {
            validator.voting_power = *power;
        }
        assert_eq!(
            ValidatorSet::new(validators),
            Err(Error::TotalVotingPowerTooLarge {
                max: MAX_TOTAL_VOTING_POWER,
            })
        );
    }

    #[test]
    fn largest_total_power_still_reaches_quorum() {
        let vals = TestValidators::new(0, 2, 10);
        let mut validators = vals.validator_set().validators().to_vec();
        validators[0].voting_power = MAX_TOTAL_VOTING_POWER - 1;
        validators[1].voting_power = 1;
        let set = ValidatorSet::new(validators).unwrap();
        assert_eq!(set.total_voting_power(), MAX_TOTAL_VOTING_POWER);

        let checkpoint = vals.checkpoint(CHAIN_ID, 4, 2);
        assert_eq!(
            set.verify_commit(CHAIN_ID, &checkpoint.commit),
            Ok(MAX_TOTAL_VOTING_POWER)
        );
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let v = TestValidators::new(0, 1, 10).validator_set().validators()[0].clone();
        let json = serde_json::to_string(&vec![v.clone(), v]).unwrap();
        assert!(serde_json::from_str::<ValidatorSet>(&json).is_err());

        let set = TestValidators::new(0, 3, 10).validator_set();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(serde_json::from_str::<ValidatorSet>(&json).unwrap(), set);
    }

    // 5 validators with power 10 each: quorum needs 3 * signed > 100.
    #[rstest]
    #[case(5, true)]
    #[case(4, true)]
    #[case(3, false)]
    #[case(2, false)]
    fn quorum_is_strictly_more_than_two_thirds(#[case] signers: usize, #[case] ok: bool) {
        let vals = TestValidators::new(0, 5, 10);
        let checkpoint = vals.checkpoint(CHAIN_ID, 100, signers);
        let res = vals.validator_set().verify_commit(CHAIN_ID, &checkpoint.commit);
        if ok {
            assert_eq!(res, Ok(signers as i64 * 10));
        } else {
            assert_eq!(
                res,
                Err(Error::InsufficientVotingPower {
                    height: 100,
                    signed: signers as i64 * 10,
                    total: 50,
                })
            );
        }
    }

    #[test]
    fn exactly_two_thirds_is_not_enough() {
        let vals = TestValidators::new(0, 3, 10);
        let checkpoint = vals.checkpoint(CHAIN_ID, 7, 2);
        assert!(vals
            .validator_set()
            .verify_commit(CHAIN_ID, &checkpoint.commit)
            .unwrap_err()
            .is_quorum_failure());
    }

    #[test]
    fn unknown_signers_are_ignored() {
        let trusted = TestValidators::new(0, 4, 10);
        let outsiders = TestValidators::new(10, 2, 10);
        let mut checkpoint = trusted.checkpoint(CHAIN_ID, 3, 3);
        let foreign = outsiders.sign(CHAIN_ID, &checkpoint.header, 2);
        checkpoint.commit.votes.extend(foreign.votes);

        let signed = trusted
            .validator_set()
            .verify_commit(CHAIN_ID, &checkpoint.commit)
            .unwrap();
        assert_eq!(signed, 30);
    }

    #[test]
    fn duplicate_votes_are_rejected() {
        let vals = TestValidators::new(0, 4, 10);
        let mut checkpoint = vals.checkpoint(CHAIN_ID, 3, 2);
        let first = checkpoint.commit.votes[0].clone();
        checkpoint.commit.votes.push(first.clone());
        assert_eq!(
            vals.validator_set().verify_commit(CHAIN_ID, &checkpoint.commit),
            Err(Error::DuplicateVote {
                address: first.validator_address,
                height: 3,
            })
        );
    }

    #[test]
    fn bad_signature_is_rejected() {
        let vals = TestValidators::new(0, 4, 10);
        let mut checkpoint = vals.checkpoint(CHAIN_ID, 3, 4);
        checkpoint.commit.votes[1].signature[0] ^= 0xff;
        let address = checkpoint.commit.votes[1].validator_address;
        assert_eq!(
            vals.validator_set().verify_commit(CHAIN_ID, &checkpoint.commit),
            Err(Error::InvalidSignature { address, height: 3 })
        );
    }

    #[test]
    fn signature_for_other_chain_is_rejected() {
        let vals = TestValidators::new(0, 4, 10);
        let checkpoint = vals.checkpoint("other-chain", 3, 4);
        assert!(matches!(
            vals.validator_set().verify_commit(CHAIN_ID, &checkpoint.commit),
            Err(Error::InvalidSignature { .. })
        ));
    }

    #[test]
    fn vote_for_other_round_is_rejected() {
        let vals = TestValidators::new(0, 4, 10);
        let mut checkpoint = vals.checkpoint(CHAIN_ID, 3, 4);
        checkpoint.commit.votes[0].round = 5;
        assert!(matches!(
            vals.validator_set().verify_commit(CHAIN_ID, &checkpoint.commit),
            Err(Error::VoteMismatch { height: 3, .. })
        ));
    }
}
