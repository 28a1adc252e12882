//! Certifiers that decide whether a checkpoint can be trusted, and the providers that store
//! the seeds they learn from.
//!
//! - [`StaticCertifier`] trusts one fixed validator set.
//! - [`DynamicCertifier`] can move to a new validator set with a forward-moving update.
//! - [`InquiringCertifier`] asks a [`Provider`] for the missing transition when the validator
//!   set has rotated.
#![doc = include_str!("../README.md")]
#![deny(
    clippy::nursery,
    clippy::pedantic,
    warnings,
    missing_docs,
    unused_crate_dependencies
)]

pub mod certifier;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod inquiring;
pub mod provider;
pub mod static_certifier;

pub use certifier::Certifier;
pub use config::{CertifierConfig, ConfigError};
pub use dynamic::{DynamicCertifier, TrustThreshold};
pub use error::{CertifierError, ProviderError};
pub use inquiring::InquiringCertifier;
pub use provider::{
    latest_seed, CacheProvider, FileProvider, MemoryProvider, NodeProvider, Provider,
    SeedEncoding, Source,
};
pub use static_certifier::StaticCertifier;
