//! Defines the configuration for a certifier backed by a local trust store.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tendermint_lite_types::Seed;

use crate::{
    dynamic::{DynamicCertifier, TrustThreshold},
    error::{CertifierError, ProviderError},
    inquiring::InquiringCertifier,
    provider::{FileProvider, Provider, SeedEncoding},
};

/// The configuration for a certifier and its file-backed trust store.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[allow(clippy::module_name_repetitions)]
pub struct CertifierConfig {
    /// The chain identifier headers must carry.
    pub chain_id: String,
    /// Root directory of the trust store.
    pub trust_dir: PathBuf,
    /// Format of the seed files.
    #[serde(default)]
    pub encoding: SeedEncoding,
    /// Largest accepted validator set change per update. Recorded but not enforced.
    #[serde(default)]
    pub change_threshold: Option<TrustThreshold>,
}

/// Errors raised while loading a configuration.
#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not a valid configuration
    #[error("config error at {path}: {message}")]
    Parse {
        /// JSON path of the offending field
        path: String,
        /// Deserializer message
        message: String,
    },

    /// The change threshold is not a fraction in `(0, 1]`
    #[error("invalid change threshold {numerator}/{denominator}")]
    InvalidThreshold {
        /// Numerator of the rejected fraction
        numerator: u64,
        /// Denominator of the rejected fraction
        denominator: u64,
    },
}

impl CertifierConfig {
    /// Creates a configuration with default encoding and no change threshold.
    #[must_use]
    pub fn new(chain_id: impl Into<String>, trust_dir: impl Into<PathBuf>) -> Self {
        Self {
            chain_id: chain_id.into(),
            trust_dir: trust_dir.into(),
            encoding: SeedEncoding::default(),
            change_threshold: None,
        }
    }

    /// Parses a JSON configuration, reporting the path of the first bad field.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed input and
    /// [`ConfigError::InvalidThreshold`] on an out of range threshold.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let config: Self = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            ConfigError::Parse {
                path: e.path().to_string(),
                message: e.inner().to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`CertifierConfig::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Checks values serde cannot.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidThreshold`] on an out of range threshold.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        match self.change_threshold {
            Some(threshold) if !threshold.is_valid() => Err(ConfigError::InvalidThreshold {
                numerator: threshold.numerator,
                denominator: threshold.denominator,
            }),
            _ => Ok(()),
        }
    }

    /// Opens the configured trust store.
    ///
    /// # Errors
    /// Returns an error if the store directories cannot be created.
    pub fn file_provider(&self) -> Result<FileProvider, ProviderError> {
        FileProvider::open(&self.trust_dir, self.encoding)
    }

    /// A dynamic certifier trusting `seed`, carrying the configured threshold.
    ///
    /// # Errors
    /// Returns an error if `seed` is not consistent for the configured chain.
    pub fn dynamic_certifier(&self, seed: &Seed) -> Result<DynamicCertifier, CertifierError> {
        let certifier = DynamicCertifier::from_seed(self.chain_id.clone(), seed)?;
        Ok(match self.change_threshold {
            Some(threshold) => certifier.with_change_threshold(threshold),
            None => certifier,
        })
    }

    /// An inquiring certifier trusting `seed` and recording it in `provider`.
    ///
    /// # Errors
    /// Returns an error if `seed` is not consistent for the configured chain or cannot be
    /// stored.
    pub fn inquiring_certifier<P: Provider>(
        &self,
        seed: Seed,
        provider: P,
    ) -> Result<InquiringCertifier<P>, CertifierError> {
        let certifier = InquiringCertifier::new(self.chain_id.clone(), seed, provider)?;
        Ok(match self.change_threshold {
            Some(threshold) => certifier.with_change_threshold(threshold),
            None => certifier,
        })
    }
}
