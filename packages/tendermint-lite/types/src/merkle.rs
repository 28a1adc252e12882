//! Simple Merkle tree over SHA-256 with domain-separated leaves and inner nodes.
//!
//! Leaves hash as `sha256(0x00 || item)`, inner nodes as `sha256(0x01 || left || right)`.
//! A list of `n > 1` items is split at the largest power of two strictly below `n`.

use serde::{Deserialize, Serialize};

use crate::hash::{sha256, Hash};

const LEAF_PREFIX: u8 = 0;
const INNER_PREFIX: u8 = 1;

/// Hash of a single leaf item.
#[must_use]
pub fn leaf_hash(item: &[u8]) -> Hash {
    let mut buf = Vec::with_capacity(1 + item.len());
    buf.push(LEAF_PREFIX);
    buf.extend_from_slice(item);
    sha256(&buf)
}

/// Hash of an inner node.
#[must_use]
pub fn inner_hash(left: &Hash, right: &Hash) -> Hash {
    let mut buf = Vec::with_capacity(1 + 2 * left.0.len());
    buf.push(INNER_PREFIX);
    buf.extend_from_slice(&left.0);
    buf.extend_from_slice(&right.0);
    sha256(&buf)
}

/// Root of the tree built over `items`. The empty list hashes to `sha256("")`.
#[must_use]
pub fn simple_hash_from_byte_vectors<T: AsRef<[u8]>>(items: &[T]) -> Hash {
    let leaves: Vec<Hash> = items.iter().map(|item| leaf_hash(item.as_ref())).collect();
    root_from_leaves(&leaves)
}

fn root_from_leaves(leaves: &[Hash]) -> Hash {
    match leaves {
        [] => sha256(&[]),
        [leaf] => *leaf,
        _ => {
            let k = split_point(leaves.len());
            inner_hash(&root_from_leaves(&leaves[..k]), &root_from_leaves(&leaves[k..]))
        }
    }
}

/// Largest power of two strictly less than `n`. Requires `n >= 2`.
const fn split_point(n: usize) -> usize {
    1 << (usize::BITS - 1 - (n - 1).leading_zeros())
}

/// Inclusion proof for one item of a simple Merkle tree.
///
/// `aunts` lists sibling hashes from the bottom of the tree to the top.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleProof {
    /// Number of items in the tree.
    pub total: u64,
    /// Position of the proven item.
    pub index: u64,
    /// Leaf hash of the proven item.
    pub leaf_hash: Hash,
    /// Sibling hashes, innermost first.
    pub aunts: Vec<Hash>,
}

impl SimpleProof {
    /// Builds the root and one proof per item.
    #[must_use]
    pub fn from_byte_vectors<T: AsRef<[u8]>>(items: &[T]) -> (Hash, Vec<Self>) {
        let leaves: Vec<Hash> = items.iter().map(|item| leaf_hash(item.as_ref())).collect();
        let total = leaves.len() as u64;
        let proofs = (0..leaves.len())
            .map(|index| Self {
                total,
                index: index as u64,
                leaf_hash: leaves[index],
                aunts: aunts_for(&leaves, index),
            })
            .collect();
        (root_from_leaves(&leaves), proofs)
    }

    /// Recomputes the root this proof commits to, or `None` if the proof is malformed.
    #[must_use]
    pub fn compute_root(&self) -> Option<Hash> {
        compute_hash_from_aunts(self.index, self.total, self.leaf_hash, &self.aunts)
    }

    /// Checks that `item` is the proven leaf and that the path leads to `root`.
    #[must_use]
    pub fn verify(&self, root: &Hash, item: &[u8]) -> bool {
        leaf_hash(item) == self.leaf_hash && self.compute_root().as_ref() == Some(root)
    }
}

fn aunts_for(leaves: &[Hash], index: usize) -> Vec<Hash> {
    if leaves.len() <= 1 {
        return Vec::new();
    }
    let k = split_point(leaves.len());
    if index < k {
        let mut aunts = aunts_for(&leaves[..k], index);
        aunts.push(root_from_leaves(&leaves[k..]));
        aunts
    } else {
        let mut aunts = aunts_for(&leaves[k..], index - k);
        aunts.push(root_from_leaves(&leaves[..k]));
        aunts
    }
}

fn compute_hash_from_aunts(index: u64, total: u64, leaf: Hash, aunts: &[Hash]) -> Option<Hash> {
    if index >= total {
        return None;
    }
    if total == 1 {
        return aunts.is_empty().then_some(leaf);
    }
    let (top, rest) = aunts.split_last()?;
    let num_left = split_point(usize::try_from(total).ok()?) as u64;
    if index < num_left {
        let left = compute_hash_from_aunts(index, num_left, leaf, rest)?;
        Some(inner_hash(&left, top))
    } else {
        let right = compute_hash_from_aunts(index - num_left, total - num_left, leaf, rest)?;
        Some(inner_hash(top, &right))
    }
}
