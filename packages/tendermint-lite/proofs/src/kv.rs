//! Inclusion proofs for a key/value map hashed as a simple Merkle tree.
//!
//! The map is hashed in key order. Each entry becomes the leaf item
//! `len(key) as u64 big-endian || key || sha256(value)`, so the tree commits to values
//! without storing them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use tendermint_lite_types::{
    hash::sha256,
    merkle::{simple_hash_from_byte_vectors, SimpleProof},
    Hash, Proof,
};

/// Leaf item for one map entry.
#[must_use]
pub fn kv_leaf(key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut leaf = Vec::with_capacity(8 + key.len() + 32);
    leaf.extend_from_slice(&(key.len() as u64).to_be_bytes());
    leaf.extend_from_slice(key);
    leaf.extend_from_slice(sha256(value).as_ref());
    leaf
}

fn leaves(entries: &BTreeMap<Vec<u8>, Vec<u8>>) -> Vec<Vec<u8>> {
    entries
        .iter()
        .map(|(key, value)| kv_leaf(key, value))
        .collect()
}

/// Root of a key/value map, the value a header's app hash commits to.
#[must_use]
pub fn kv_root(entries: &BTreeMap<Vec<u8>, Vec<u8>>) -> Hash {
    simple_hash_from_byte_vectors(&leaves(entries))
}

/// Proof that one key maps to a value in the application state at some height.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::module_name_repetitions)]
pub struct KvProof {
    /// Height of the block whose app hash is `root_hash`.
    pub height: u64,
    /// Root of the map.
    pub root_hash: Hash,
    /// The proven key.
    #[serde_as(as = "Hex")]
    pub key: Vec<u8>,
    /// Merkle path of the entry's leaf.
    pub proof: SimpleProof,
}

impl KvProof {
    /// Builds the proof for `key`, or `None` if the map does not contain it.
    #[must_use]
    pub fn build(height: u64, entries: &BTreeMap<Vec<u8>, Vec<u8>>, key: &[u8]) -> Option<Self> {
        let index = entries.keys().position(|k| k.as_slice() == key)?;
        let (root_hash, mut proofs) = SimpleProof::from_byte_vectors(&leaves(entries));
        Some(Self {
            height,
            root_hash,
            key: key.to_vec(),
            proof: proofs.swap_remove(index),
        })
    }
}

impl Proof for KvProof {
    fn height(&self) -> u64 {
        self.height
    }

    fn root(&self) -> Hash {
        self.root_hash
    }

    fn verify(&self, key: &[u8], value: &[u8], root: &Hash) -> bool {
        self.key == key && self.root_hash == *root && self.proof.verify(root, &kv_leaf(key, value))
    }
}
