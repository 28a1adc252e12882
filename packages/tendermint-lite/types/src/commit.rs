//! Precommit votes and the commit that bundles them.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use tendermint_lite_utils::serde::number_as_string;

use crate::hash::{Address, Hash};

/// A single validator's precommit for a block.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Address of the signing validator.
    pub validator_address: Address,
    /// Height voted on.
    #[serde(with = "number_as_string")]
    pub height: u64,
    /// Consensus round of the vote.
    pub round: u32,
    /// Hash of the block voted for.
    pub block_hash: Hash,
    /// ed25519 signature over [`Vote::sign_bytes`].
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
}

impl Vote {
    /// Canonical bytes a validator signs for this vote on `chain_id`.
    #[must_use]
    pub fn sign_bytes(&self, chain_id: &str) -> Vec<u8> {
        canonical_sign_bytes(chain_id, self.height, self.round, &self.block_hash)
    }
}

/// Canonical precommit sign bytes: a JSON object with lexicographically ordered keys.
#[must_use]
pub fn canonical_sign_bytes(chain_id: &str, height: u64, round: u32, block_hash: &Hash) -> Vec<u8> {
    serde_json::json!({
        "block_hash": block_hash.to_hex(),
        "chain_id": chain_id,
        "height": height.to_string(),
        "round": round.to_string(),
        "type": "precommit",
    })
    .to_string()
    .into_bytes()
}

/// The votes that committed a block at one height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Height of the committed block.
    #[serde(with = "number_as_string")]
    pub height: u64,
    /// Round in which the block was committed.
    pub round: u32,
    /// Hash of the committed block.
    pub block_hash: Hash,
    /// Precommits, in validator order.
    pub votes: Vec<Vote>,
}

impl Commit {
    /// Returns true if `vote` is for this commit's height, round and block.
    #[must_use]
    pub fn matches(&self, vote: &Vote) -> bool {
        vote.height == self.height && vote.round == self.round && vote.block_hash == self.block_hash
    }
}
