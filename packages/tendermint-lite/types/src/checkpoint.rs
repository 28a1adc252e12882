//! A header together with the commit that signed it, and the proof binding checks on it.

use serde::{Deserialize, Serialize};
use tendermint_lite_utils::ensure;

use crate::{
    commit::Commit,
    error::Error,
    hash::Hash,
    header::Header,
    merkle::simple_hash_from_byte_vectors,
    proof::{tx_hashes, Proof, TxProof},
};

/// A header plus its quorum-signed commit. Never mutated once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// The signed header.
    pub header: Header,
    /// Votes committing the header's block.
    pub commit: Commit,
}

impl Checkpoint {
    /// Height of the checkpoint.
    #[must_use]
    pub const fn height(&self) -> u64 {
        self.header.height
    }

    /// Validators hash named by the header.
    #[must_use]
    pub const fn validators_hash(&self) -> &Hash {
        &self.header.validators_hash
    }

    /// Structural checks that do not need a validator set.
    ///
    /// # Errors
    /// Returns an error on a wrong chain id, a zero height, a header/commit height or hash
    /// mismatch, or a commit without votes.
    pub fn validate_basic(&self, chain_id: &str) -> Result<(), Error> {
        ensure!(
            self.header.chain_id == chain_id,
            Error::ChainIdMismatch {
                expected: chain_id.to_string(),
                found: self.header.chain_id.clone(),
            }
        );
        ensure!(self.header.height >= 1, Error::InvalidHeight);
        ensure!(
            self.commit.height == self.header.height,
            Error::HeightMismatch {
                header: self.header.height,
                commit: self.commit.height,
            }
        );
        let header_hash = self.header.hash();
        ensure!(
            self.commit.block_hash == header_hash,
            Error::BlockHashMismatch {
                height: self.header.height,
                header: header_hash,
                commit: self.commit.block_hash,
            }
        );
        ensure!(
            !self.commit.votes.is_empty(),
            Error::EmptyCommit(self.header.height)
        );
        Ok(())
    }

    /// Checks that `proof` shows `(key, value)` under this header's app hash.
    ///
    /// This says nothing about whether the header itself is trusted.
    ///
    /// # Errors
    /// Returns an error if the proof is for another height, its root is not the app hash,
    /// or it does not verify.
    pub fn check_app_state<P: Proof + ?Sized>(
        &self,
        key: &[u8],
        value: &[u8],
        proof: &P,
    ) -> Result<(), Error> {
        self.check_proof_height(proof.height())?;
        let root = proof.root();
        ensure!(
            root == self.header.app_hash,
            Error::AppHashMismatch {
                height: self.header.height,
                expected: self.header.app_hash,
                found: root,
            }
        );
        ensure!(
            proof.verify(key, value, &self.header.app_hash),
            Error::InvalidProof {
                height: self.header.height,
            }
        );
        Ok(())
    }

    /// Checks that `txs` are exactly the transactions hashed into the data hash.
    ///
    /// # Errors
    /// Returns [`Error::DataHashMismatch`] if they are not.
    pub fn check_txs<T: AsRef<[u8]>>(&self, txs: &[T]) -> Result<(), Error> {
        let found = simple_hash_from_byte_vectors(&tx_hashes(txs));
        ensure!(
            found == self.header.data_hash,
            Error::DataHashMismatch {
                height: self.header.height,
                expected: self.header.data_hash,
                found,
            }
        );
        Ok(())
    }

    /// Checks that `proof` shows its transaction under this header's data hash.
    ///
    /// # Errors
    /// Returns an error if the proof is for another height, leads to another root or its
    /// Merkle path is invalid.
    pub fn check_tx_proof(&self, proof: &TxProof) -> Result<(), Error> {
        self.check_proof_height(proof.height)?;
        ensure!(
            proof.root_hash == self.header.data_hash,
            Error::DataHashMismatch {
                height: self.header.height,
                expected: self.header.data_hash,
                found: proof.root_hash,
            }
        );
        ensure!(
            proof.is_valid(),
            Error::InvalidProof {
                height: self.header.height,
            }
        );
        Ok(())
    }

    fn check_proof_height(&self, proof_height: u64) -> Result<(), Error> {
        ensure!(
            proof_height == self.header.height,
            Error::ProofHeightMismatch {
                header: self.header.height,
                proof: proof_height,
            }
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hash::sha256, test_utils::TestValidators};

    const CHAIN_ID: &str = "test-chain";

    struct FixedProof {
        height: u64,
        root: Hash,
        valid: bool,
    }

    impl Proof for FixedProof {
        fn height(&self) -> u64 {
            self.height
        }

        fn root(&self) -> Hash {
            self.root
        }

        fn verify(&self, _key: &[u8], _value: &[u8], root: &Hash) -> bool {
            self.valid && *root == self.root
        }
    }

    fn checkpoint() -> Checkpoint {
        TestValidators::new(0, 4, 10).checkpoint(CHAIN_ID, 12, 4)
    }

    #[test]
    fn valid_checkpoint_passes_basic_validation() {
        assert_eq!(checkpoint().validate_basic(CHAIN_ID), Ok(()));
    }

    #[test]
    fn wrong_chain_id_is_structural() {
        assert!(matches!(
            checkpoint().validate_basic("other"),
            Err(Error::ChainIdMismatch { .. })
        ));
    }

    #[test]
    fn height_and_hash_must_match_commit() {
        let mut cp = checkpoint();
        cp.commit.height = 13;
        assert_eq!(
            cp.validate_basic(CHAIN_ID),
            Err(Error::HeightMismatch {
                header: 12,
                commit: 13
            })
        );

        let mut cp = checkpoint();
        cp.header.app_hash = sha256(b"rewritten");
        assert!(matches!(
            cp.validate_basic(CHAIN_ID),
            Err(Error::BlockHashMismatch { height: 12, .. })
        ));
    }

    #[test]
    fn commit_without_votes_is_rejected() {
        let mut cp = checkpoint();
        cp.commit.votes.clear();
        assert_eq!(cp.validate_basic(CHAIN_ID), Err(Error::EmptyCommit(12)));
    }

    #[test]
    fn app_state_binding() {
        let cp = checkpoint();
        let good = FixedProof {
            height: 12,
            root: cp.header.app_hash,
            valid: true,
        };
        assert_eq!(cp.check_app_state(b"k", b"v", &good), Ok(()));

        let wrong_height = FixedProof { height: 11, ..good };
        assert_eq!(
            cp.check_app_state(b"k", b"v", &wrong_height),
            Err(Error::ProofHeightMismatch {
                header: 12,
                proof: 11
            })
        );

        let wrong_root = FixedProof {
            height: 12,
            root: Hash::EMPTY,
            valid: true,
        };
        assert!(matches!(
            cp.check_app_state(b"k", b"v", &wrong_root),
            Err(Error::AppHashMismatch { .. })
        ));

        let invalid = FixedProof {
            height: 12,
            root: cp.header.app_hash,
            valid: false,
        };
        assert_eq!(
            cp.check_app_state(b"k", b"v", &invalid),
            Err(Error::InvalidProof { height: 12 })
        );
    }

    #[test]
    fn txs_and_tx_proofs_bind_to_data_hash() {
        let vals = TestValidators::new(0, 4, 10);
        let txs = vec![b"send 1".to_vec(), b"send 2".to_vec(), b"send 3".to_vec()];
        let mut header = vals.header(CHAIN_ID, 12);
        header.data_hash = simple_hash_from_byte_vectors(&tx_hashes(&txs));
        let cp = vals.sign_header(header, 4);

        assert_eq!(cp.check_txs(&txs), Ok(()));
        assert!(matches!(
            cp.check_txs(&txs[..2]),
            Err(Error::DataHashMismatch { height: 12, .. })
        ));

        let proof = TxProof::new(12, &txs, 2).unwrap();
        assert_eq!(cp.check_tx_proof(&proof), Ok(()));

        let other_height = TxProof::new(13, &txs, 2).unwrap();
        assert!(matches!(
            cp.check_tx_proof(&other_height),
            Err(Error::ProofHeightMismatch { .. })
        ));

        let foreign = TxProof::new(12, &[b"elsewhere"], 0).unwrap();
        assert!(matches!(
            cp.check_tx_proof(&foreign),
            Err(Error::DataHashMismatch { .. })
        ));

        let mut forged = proof;
        forged.tx = b"send 999".to_vec();
        assert_eq!(
            cp.check_tx_proof(&forged),
            Err(Error::InvalidProof { height: 12 })
        );
    }
}
