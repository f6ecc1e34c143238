//! SHA-256 digest wrapper used for content addressing.

use crate::FilesError;
use std::fmt;

/// A SHA-256 digest in canonical form (64 lowercase hex characters).
///
/// Once constructed, the contained digest is guaranteed canonical, so
/// storage paths derived from it are consistent everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Hash(String);

impl Sha256Hash {
    /// Wraps a raw 32-byte digest, encoding it as lowercase hex.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Validates and wraps a digest string.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidDigest`] unless the input is exactly
    /// 64 lowercase hex characters.
    pub fn parse(input: &str) -> Result<Self, FilesError> {
        if Self::is_canonical(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(FilesError::InvalidDigest(input.to_owned()))
    }

    /// Returns true if `input` is 64 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 64
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns the digest as a hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Sha256Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Sha256Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Sha256Hash::parse(&s).map_err(serde::de::Error::custom)
    }
}
