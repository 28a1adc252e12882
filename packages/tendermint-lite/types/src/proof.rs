//! The proof capability consumed by checkpoint binding, and transaction inclusion proofs.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

use crate::{
    hash::{sha256, Hash},
    merkle::SimpleProof,
};

/// A Merkle proof that some key/value pair is part of an application state root.
///
/// The tree format is opaque to the certifiers; only these three operations are used.
pub trait Proof {
    /// Height of the block whose header carries the proven root.
    fn height(&self) -> u64;

    /// Root the proof leads to.
    fn root(&self) -> Hash;

    /// Whether the proof shows `(key, value)` under `root`.
    fn verify(&self, key: &[u8], value: &[u8], root: &Hash) -> bool;
}

/// Proof that one transaction is part of a block's data hash.
///
/// Transaction leaves are the SHA-256 hashes of the raw transactions.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxProof {
    /// Height of the block containing the transaction.
    pub height: u64,
    /// Data hash the proof leads to.
    pub root_hash: Hash,
    /// Raw transaction bytes.
    #[serde_as(as = "Hex")]
    pub tx: Vec<u8>,
    /// Merkle path of the transaction hash.
    pub proof: SimpleProof,
}

impl TxProof {
    /// Builds the proof for `txs[index]` of the block at `height`. `None` if out of range.
    #[must_use]
    pub fn new<T: AsRef<[u8]>>(height: u64, txs: &[T], index: usize) -> Option<Self> {
        let (root_hash, mut proofs) = SimpleProof::from_byte_vectors(&tx_hashes(txs));
        if index >= proofs.len() {
            return None;
        }
        Some(Self {
            height,
            root_hash,
            tx: txs[index].as_ref().to_vec(),
            proof: proofs.swap_remove(index),
        })
    }

    /// Whether the Merkle path proves `tx` under `root_hash`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.proof.verify(&self.root_hash, sha256(&self.tx).as_ref())
    }
}

/// Leaf items for a list of transactions.
pub(crate) fn tx_hashes<T: AsRef<[u8]>>(txs: &[T]) -> Vec<Hash> {
    txs.iter().map(|tx| sha256(tx.as_ref())).collect()
}
