//! Block header as produced by consensus.

use serde::{Deserialize, Serialize};
use tendermint_lite_utils::serde::number_as_string;

use crate::{hash::Hash, merkle::simple_hash_from_byte_vectors};

/// Block header. Immutable once produced by consensus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Chain the block belongs to.
    pub chain_id: String,
    /// Block height, starting at 1.
    #[serde(with = "number_as_string")]
    pub height: u64,
    /// Block time in unix nanoseconds.
    #[serde(with = "number_as_string")]
    pub time: u64,
    /// Hash of the previous block.
    pub last_block_hash: Hash,
    /// Hash of the commit for the previous block.
    pub last_commit_hash: Hash,
    /// Merkle root of the block's transactions.
    pub data_hash: Hash,
    /// Hash of the validator set that signs this block.
    pub validators_hash: Hash,
    /// Application state root after the previous block.
    pub app_hash: Hash,
}

impl Header {
    /// Block hash: the simple Merkle root over the header fields in declaration order.
    #[must_use]
    pub fn hash(&self) -> Hash {
        let height = self.height.to_be_bytes();
        let time = self.time.to_be_bytes();
        let fields: [&[u8]; 8] = [
            self.chain_id.as_bytes(),
            &height,
            &time,
            self.last_block_hash.as_ref(),
            self.last_commit_hash.as_ref(),
            self.data_hash.as_ref(),
            self.validators_hash.as_ref(),
            self.app_hash.as_ref(),
        ];
        simple_hash_from_byte_vectors(&fields)
    }
}
