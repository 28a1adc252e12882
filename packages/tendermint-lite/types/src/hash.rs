//! Fixed-size digests and validator addresses.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use sha2::{Digest, Sha256};

/// Length of a [`Hash`] in bytes.
pub const HASH_LENGTH: usize = 32;

/// Length of an [`Address`] in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// A SHA-256 digest. Encoded as lower-case hex in JSON.
#[serde_as]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash(#[serde_as(as = "Hex")] pub [u8; HASH_LENGTH]);

impl Hash {
    /// The all-zero hash, used where a header field is absent.
    pub const EMPTY: Self = Self([0; HASH_LENGTH]);

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Lower-case hex form, also used as the on-disk key for the validator hash index.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex string of exactly [`HASH_LENGTH`] bytes.
    ///
    /// # Errors
    /// Returns an error if the input is not valid hex or has the wrong length.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut out = [0; HASH_LENGTH];
        hex::decode_to_slice(s, &mut out)?;
        Ok(Self(out))
    }
}

impl From<[u8; HASH_LENGTH]> for Hash {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({self})")
    }
}

/// A validator address: the first 20 bytes of the SHA-256 of its public key.
#[serde_as]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(#[serde_as(as = "Hex")] pub [u8; ADDRESS_LENGTH]);

impl Address {
    /// Derives the address of an ed25519 public key.
    #[must_use]
    pub fn from_public_key(pub_key: &[u8]) -> Self {
        let digest = sha256(pub_key);
        let mut out = [0; ADDRESS_LENGTH];
        out.copy_from_slice(&digest.0[..ADDRESS_LENGTH]);
        Self(out)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

/// SHA-256 of `data`.
#[must_use]
pub fn sha256(data: &[u8]) -> Hash {
    Hash(Sha256::digest(data).into())
}
