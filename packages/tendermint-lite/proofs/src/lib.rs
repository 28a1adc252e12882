//! Proofs of application state and transactions, and the [`Auditor`] that only trusts them
//! under a certified checkpoint.
#![doc = include_str!("../README.md")]
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

#[cfg(test)]
use serde_json as _;

pub mod auditor;
pub mod error;
pub mod kv;

pub use auditor::Auditor;
pub use error::AuditError;
pub use kv::{kv_root, KvProof};
