//! Test utilities: deterministic validator keys and checkpoint signing.

#[cfg(any(test, feature = "test-utils"))]
pub use fixtures::*;

#[allow(
    missing_docs,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation,
    clippy::must_use_candidate
)]
#[cfg(any(test, feature = "test-utils"))]
mod fixtures {
    use ed25519_dalek::{Signer, SigningKey};

    use crate::{
        checkpoint::Checkpoint,
        commit::{canonical_sign_bytes, Commit, Vote},
        hash::{sha256, Address, Hash},
        header::Header,
        seed::Seed,
        validators::{Validator, ValidatorSet},
    };

    /// Base block time used by generated headers, in unix nanoseconds.
    pub const GENESIS_TIME: u64 = 1_700_000_000_000_000_000;

    /// A validator set whose private keys are known, derived from fixed seeds.
    ///
    /// Key `i` of a set created with `start` is `[start + i + 1; 32]`, so sets with
    /// disjoint `start..start + count` ranges never share a validator.
    #[derive(Clone)]
    pub struct TestValidators {
        keys: Vec<SigningKey>,
        powers: Vec<i64>,
    }

    impl TestValidators {
        pub fn new(start: u8, count: usize, power: i64) -> Self {
            Self::with_powers(start, &vec![power; count])
        }

        pub fn with_powers(start: u8, powers: &[i64]) -> Self {
            let keys = (0..powers.len())
                .map(|i| SigningKey::from_bytes(&[start + i as u8 + 1; 32]))
                .collect();
            Self {
                keys,
                powers: powers.to_vec(),
            }
        }

        /// Concatenates two key sets, e.g. to model a partially rotated set.
        pub fn extend(&self, other: &Self) -> Self {
            let mut out = self.clone();
            out.keys.extend(other.keys.iter().cloned());
            out.powers.extend(other.powers.iter().copied());
            out
        }

        pub fn validator_set(&self) -> ValidatorSet {
            let validators = self
                .keys
                .iter()
                .zip(&self.powers)
                .map(|(key, power)| Validator::new(key.verifying_key().to_bytes(), *power))
                .collect();
            ValidatorSet::new(validators).expect("test validators are valid")
        }

        /// A header at `height` naming this set as its validators.
        pub fn header(&self, chain_id: &str, height: u64) -> Header {
            Header {
                chain_id: chain_id.to_string(),
                height,
                time: GENESIS_TIME + height,
                last_block_hash: sha256(&height.saturating_sub(1).to_be_bytes()),
                last_commit_hash: Hash::EMPTY,
                data_hash: Hash::EMPTY,
                validators_hash: self.validator_set().hash(),
                app_hash: sha256(format!("app-{height}").as_bytes()),
            }
        }

        /// A commit for `header` signed by the first `signers` keys.
        pub fn sign(&self, chain_id: &str, header: &Header, signers: usize) -> Commit {
            let block_hash = header.hash();
            let msg = canonical_sign_bytes(chain_id, header.height, 0, &block_hash);
            let votes = self
                .keys
                .iter()
                .take(signers)
                .map(|key| Vote {
                    validator_address: Address::from_public_key(&key.verifying_key().to_bytes()),
                    height: header.height,
                    round: 0,
                    block_hash,
                    signature: key.sign(&msg).to_bytes().to_vec(),
                })
                .collect();
            Commit {
                height: header.height,
                round: 0,
                block_hash,
                votes,
            }
        }

        /// Signs an arbitrary header with the first `signers` keys.
        pub fn sign_header(&self, header: Header, signers: usize) -> Checkpoint {
            let commit = self.sign(&header.chain_id, &header, signers);
            Checkpoint { header, commit }
        }

        pub fn checkpoint(&self, chain_id: &str, height: u64, signers: usize) -> Checkpoint {
            self.sign_header(self.header(chain_id, height), signers)
        }

        /// A seed at `height` signed by every key of the set.
        pub fn seed(&self, chain_id: &str, height: u64) -> Seed {
            Seed {
                checkpoint: self.checkpoint(chain_id, height, self.keys.len()),
                validators: self.validator_set(),
            }
        }
    }
}
