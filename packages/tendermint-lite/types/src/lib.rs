//! Data model for the tendermint-lite certifiers: headers, commits, checkpoints, validator
//! sets and seeds, together with the quorum check and the proof binding checks that only
//! need a single checkpoint.
#![doc = include_str!("../README.md")]
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod checkpoint;
pub mod commit;
pub mod error;
pub mod hash;
pub mod header;
pub mod merkle;
pub mod proof;
pub mod seed;
pub mod validators;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use checkpoint::Checkpoint;
pub use commit::{Commit, Vote};
pub use error::Error;
pub use hash::{Address, Hash};
pub use header::Header;
pub use proof::{Proof, TxProof};
pub use seed::Seed;
pub use validators::{Validator, ValidatorSet};
