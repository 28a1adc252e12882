//! This module defines [`Error`].

use crate::hash::{Address, Hash};

/// Verification errors for checkpoints, validator sets and proofs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum Error {
    /// Header belongs to another chain
    #[error("chain id mismatch, expected ({expected}) but found ({found})")]
    ChainIdMismatch {
        /// Chain id the verifier is bound to
        expected: String,
        /// Chain id in the header
        found: String,
    },

    /// Heights start at 1
    #[error("header height must be at least 1")]
    InvalidHeight,

    /// Commit and header disagree on height
    #[error("commit height ({commit}) does not match header height ({header})")]
    HeightMismatch {
        /// Header height
        header: u64,
        /// Commit height
        commit: u64,
    },

    /// Commit is for a different block than the header
    #[error("commit at height {height} is for block ({commit}) but header hashes to ({header})")]
    BlockHashMismatch {
        /// Checkpoint height
        height: u64,
        /// Hash of the header
        header: Hash,
        /// Block hash in the commit
        commit: Hash,
    },

    /// Commit carries no votes at all
    #[error("commit at height {0} has no votes")]
    EmptyCommit(u64),

    /// A vote is for another height, round or block than its commit
    #[error("vote from {address} does not match the commit at height {height}")]
    VoteMismatch {
        /// Voting validator
        address: Address,
        /// Commit height
        height: u64,
    },

    /// The same validator voted twice in one commit
    #[error("duplicate vote from {address} at height {height}")]
    DuplicateVote {
        /// Voting validator
        address: Address,
        /// Commit height
        height: u64,
    },

    /// Signature does not verify under the validator's key
    #[error("invalid signature from {address} at height {height}")]
    InvalidSignature {
        /// Voting validator
        address: Address,
        /// Commit height
        height: u64,
    },

    /// Validator sets must not be empty
    #[error("validator set is empty")]
    EmptyValidatorSet,

    /// Validator listed twice
    #[error("duplicate validator {0}")]
    DuplicateValidator(Address),

    /// Public key bytes are not a valid ed25519 key
    #[error("invalid public key for validator {0}")]
    InvalidPublicKey(Address),

    /// Declared address does not derive from the public key
    #[error("validator address mismatch, expected ({expected}) but found ({found})")]
    AddressMismatch {
        /// Address derived from the key
        expected: Address,
        /// Declared address
        found: Address,
    },

    /// Voting power must be positive
    #[error("validator {address} has non-positive voting power {power}")]
    NonPositiveVotingPower {
        /// Validator address
        address: Address,
        /// Declared power
        power: i64,
    },

    /// Combined voting power exceeds [`crate::validators::MAX_TOTAL_VOTING_POWER`]
    #[error("total voting power of the validator set exceeds {max}")]
    TotalVotingPowerTooLarge {
        /// Largest accepted total
        max: i64,
    },

    /// Less than two thirds of the voting power signed
    #[error(
        "insufficient voting power at height {height}: signed {signed} of {total}, need more than 2/3"
    )]
    InsufficientVotingPower {
        /// Checkpoint height
        height: u64,
        /// Power whose signatures verified
        signed: i64,
        /// Total power of the set
        total: i64,
    },

    /// Header names a validator set other than the trusted one
    #[error("validators changed at height {height}, trusted ({expected}) but header names ({found})")]
    ValidatorsChanged {
        /// Checkpoint height
        height: u64,
        /// Hash of the trusted set
        expected: Hash,
        /// Validators hash in the header
        found: Hash,
    },

    /// Proof was produced for another height than the checkpoint
    #[error("proof height ({proof}) does not match checkpoint height ({header})")]
    ProofHeightMismatch {
        /// Checkpoint height
        header: u64,
        /// Height claimed by the proof
        proof: u64,
    },

    /// Proof root is not the header's app hash
    #[error("app hash mismatch at height {height}, header has ({expected}) but proof has ({found})")]
    AppHashMismatch {
        /// Checkpoint height
        height: u64,
        /// App hash in the header
        expected: Hash,
        /// Root of the proof
        found: Hash,
    },

    /// The Merkle path does not prove the claimed data
    #[error("proof does not verify at height {height}")]
    InvalidProof {
        /// Checkpoint height
        height: u64,
    },

    /// Transactions do not hash to the header's data hash
    #[error("data hash mismatch at height {height}, header has ({expected}) but found ({found})")]
    DataHashMismatch {
        /// Checkpoint height
        height: u64,
        /// Data hash in the header
        expected: Hash,
        /// Computed or claimed root
        found: Hash,
    },
}

impl Error {
    /// True for the one failure an inquiring certifier may recover from.
    #[must_use]
    pub const fn is_validators_changed(&self) -> bool {
        matches!(self, Self::ValidatorsChanged { .. })
    }

    /// True for insufficient signed voting power.
    #[must_use]
    pub const fn is_quorum_failure(&self) -> bool {
        matches!(self, Self::InsufficientVotingPower { .. })
    }
}
