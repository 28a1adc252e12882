//! Disk-backed seed store.
//!
//! Layout under the root directory:
//!
//! ```text
//! checkpoints/000000000042.tsd   seed by height
//! validators/<hex hash>.tsd      seed by validators hash
//! ```
//!
//! Files are written once and never replaced.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tendermint_lite_types::{Hash, Seed};
use tracing::debug;

use super::Provider;
use crate::error::ProviderError;

/// Largest height that fits the fixed-width file names.
pub const MAX_HEIGHT: u64 = 999_999_999_999;

const CHECKPOINTS_DIR: &str = "checkpoints";
const VALIDATORS_DIR: &str = "validators";
const EXTENSION: &str = "tsd";
const BINARY_MAGIC: &[u8; 4] = b"TLS1";

/// On-disk format of a seed file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedEncoding {
    /// `TLS1` followed by the bincode encoding.
    #[default]
    Binary,
    /// Plain JSON.
    Json,
}

impl SeedEncoding {
    /// Encodes a seed.
    ///
    /// # Errors
    /// Returns [`ProviderError::Encode`] if serialization fails.
    pub fn encode(self, seed: &Seed) -> Result<Vec<u8>, ProviderError> {
        match self {
            Self::Binary => {
                let body =
                    bincode::serialize(seed).map_err(|e| ProviderError::Encode(e.to_string()))?;
                Ok([BINARY_MAGIC.as_slice(), body.as_slice()].concat())
            }
            Self::Json => {
                serde_json::to_vec(seed).map_err(|e| ProviderError::Encode(e.to_string()))
            }
        }
    }

    /// Decodes a seed read from `path`. Bytes in the other encoding are rejected.
    ///
    /// # Errors
    /// Returns [`ProviderError::Decode`] if `bytes` are not a seed in this encoding.
    pub fn decode(self, bytes: &[u8], path: &Path) -> Result<Seed, ProviderError> {
        let decode_err = |reason: String| ProviderError::Decode {
            path: path.to_path_buf(),
            reason,
        };
        match self {
            Self::Binary => {
                let body = bytes
                    .strip_prefix(BINARY_MAGIC.as_slice())
                    .ok_or_else(|| decode_err("missing binary seed header".to_string()))?;
                bincode::deserialize(body).map_err(|e| decode_err(e.to_string()))
            }
            Self::Json => {
                let mut de = serde_json::Deserializer::from_slice(bytes);
                serde_path_to_error::deserialize(&mut de).map_err(|e| decode_err(e.to_string()))
            }
        }
    }
}

/// Stores each seed twice, once per index, as individual files under a root directory.
#[derive(Clone, Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FileProvider {
    root: PathBuf,
    encoding: SeedEncoding,
}

impl FileProvider {
    /// Opens a store rooted at `root`, creating the directories if needed.
    ///
    /// # Errors
    /// Returns [`ProviderError::Io`] if the directories cannot be created.
    pub fn open(root: impl Into<PathBuf>, encoding: SeedEncoding) -> Result<Self, ProviderError> {
        let root = root.into();
        fs::create_dir_all(root.join(CHECKPOINTS_DIR))?;
        fs::create_dir_all(root.join(VALIDATORS_DIR))?;
        Ok(Self { root, encoding })
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Encoding used for reads and writes.
    #[must_use]
    pub const fn encoding(&self) -> SeedEncoding {
        self.encoding
    }

    fn height_path(&self, height: u64) -> PathBuf {
        self.root
            .join(CHECKPOINTS_DIR)
            .join(format!("{height:012}.{EXTENSION}"))
    }

    fn hash_path(&self, hash: &Hash) -> PathBuf {
        self.root
            .join(VALIDATORS_DIR)
            .join(format!("{}.{EXTENSION}", hash.to_hex()))
    }

    /// Heights present in the height index, ascending.
    fn stored_heights(&self) -> Result<Vec<u64>, ProviderError> {
        let mut heights = Vec::new();
        for entry in fs::read_dir(self.root.join(CHECKPOINTS_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(height) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<u64>().ok())
            {
                heights.push(height);
            }
        }
        heights.sort_unstable();
        Ok(heights)
    }

    fn read_seed(&self, path: &Path) -> Result<Seed, ProviderError> {
        let bytes = fs::read(path)?;
        let seed = self.encoding.decode(&bytes, path)?;
        seed.validate()?;
        Ok(seed)
    }

    /// Writes `bytes` to `path` unless the file already exists.
    fn write_new(path: &Path, bytes: &[u8]) -> Result<(), ProviderError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        match file.persist_noclobber(path) {
            Ok(_) => Ok(()),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "seed file already present");
                Ok(())
            }
            Err(err) => Err(err.error.into()),
        }
    }
}

impl Provider for FileProvider {
    #[tracing::instrument(skip_all, fields(height = seed.height()))]
    fn store_seed(&self, seed: &Seed) -> Result<(), ProviderError> {
        let height = seed.height();
        if height > MAX_HEIGHT {
            return Err(ProviderError::HeightOutOfRange {
                height,
                max: MAX_HEIGHT,
            });
        }
        seed.validate()?;

        let bytes = self.encoding.encode(seed)?;
        Self::write_new(&self.height_path(height), &bytes)?;
        Self::write_new(&self.hash_path(&seed.validators_hash()), &bytes)?;
        debug!(root = %self.root.display(), "stored seed on disk");
        Ok(())
    }

    fn get_by_height(&self, height: u64) -> Result<Seed, ProviderError> {
        let target = height.min(MAX_HEIGHT);
        let heights = self.stored_heights()?;
        let idx = heights.partition_point(|&h| h <= target);
        if idx == 0 {
            return Err(ProviderError::HeightNotFound(height));
        }
        self.read_seed(&self.height_path(heights[idx - 1]))
    }

    fn get_by_hash(&self, hash: &Hash) -> Result<Seed, ProviderError> {
        match self.read_seed(&self.hash_path(hash)) {
            Err(ProviderError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Err(ProviderError::HashNotFound(*hash))
            }
            result => result,
        }
    }
}
