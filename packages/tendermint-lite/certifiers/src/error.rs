//! This module defines [`CertifierError`] and [`ProviderError`].

use std::path::PathBuf;

use tendermint_lite_types::{Error, Hash};

/// Errors returned by certifiers.
#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum CertifierError {
    /// The checkpoint failed structural, validator set or quorum checks
    #[error(transparent)]
    Verification(#[from] Error),

    /// A validator set update must move trust forward
    #[error("update at height {proposed} is not after the trusted height {trusted}")]
    PastTime {
        /// Currently trusted height
        trusted: u64,
        /// Height of the rejected update
        proposed: u64,
    },

    /// Reserved: the validator set changed more than the configured threshold allows.
    /// Updates do not currently check overlap, so this is never returned.
    #[error("validator set changed too much between heights {trusted} and {proposed}")]
    TooMuchChange {
        /// Currently trusted height
        trusted: u64,
        /// Height of the rejected update
        proposed: u64,
    },

    /// Reserved for a multi-hop search between trusted and target heights, which is not
    /// implemented. Never returned.
    #[error("no chain of validator set transitions from height {trusted} to height {target}")]
    NoPathFound {
        /// Currently trusted height
        trusted: u64,
        /// Height that could not be reached
        target: u64,
    },

    /// The trust store failed while looking up or persisting a seed
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl CertifierError {
    /// True when the checkpoint names a validator set other than the trusted one.
    #[must_use]
    pub const fn is_validators_changed(&self) -> bool {
        matches!(self, Self::Verification(err) if err.is_validators_changed())
    }

    /// True when the signed voting power was below the quorum.
    #[must_use]
    pub const fn is_quorum_failure(&self) -> bool {
        matches!(self, Self::Verification(err) if err.is_quorum_failure())
    }
}

/// Errors returned by seed providers.
#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ProviderError {
    /// No seed at or below the height
    #[error("no seed found at or below height {0}")]
    HeightNotFound(u64),

    /// No seed for the validator set hash
    #[error("no seed found for validators hash {0}")]
    HashNotFound(Hash),

    /// The seed is not internally consistent
    #[error("invalid seed: {0}")]
    InvalidSeed(#[from] Error),

    /// The store cannot name a file for this height
    #[error("height {height} exceeds the maximum storable height {max}")]
    HeightOutOfRange {
        /// Rejected height
        height: u64,
        /// Largest height the store supports
        max: u64,
    },

    /// Commit and validator set fetched from a node do not belong together
    #[error(
        "source returned validators ({validators}) for height {height} but the header names ({header})"
    )]
    InconsistentSource {
        /// Height queried
        height: u64,
        /// Validators hash in the fetched header
        header: Hash,
        /// Hash of the fetched validator set
        validators: Hash,
    },

    /// The remote data source failed
    #[error(transparent)]
    Source(#[from] anyhow::Error),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes are not a seed in the store's encoding
    #[error("failed to decode seed from {path}: {reason}")]
    Decode {
        /// File that failed to decode
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// A seed could not be encoded
    #[error("failed to encode seed: {0}")]
    Encode(String),
}

impl ProviderError {
    /// True for lookups that found nothing, as opposed to failures of the store itself.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::HeightNotFound(_) | Self::HashNotFound(_))
    }
}
