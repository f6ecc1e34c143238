//! Canonical patient record identifiers.

use crate::{UuidError, UuidResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// A patient record identifier in canonical form (32 lowercase hex
/// characters, no hyphens).
///
/// The wrapper guarantees that, once constructed, the contained UUID is
/// canonical, so sharded path derivation is the same everywhere an id is
/// used.
///
/// # Construction
/// - [`RecordId::new`] mints a fresh identifier when a patient record is
///   created.
/// - [`RecordId::parse`] validates an externally supplied identifier.
///
/// # Display format
/// Displaying or serialising a `RecordId` always produces the canonical
/// 32-character lowercase hex form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(Uuid);

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordId {
    /// Mints a new identifier for a freshly created patient record.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and wraps an identifier string that must already be in
    /// canonical form.
    ///
    /// This does **not** normalise other common UUID forms (hyphenated or
    /// uppercase); callers must supply the canonical representation.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if Self::is_canonical(input) {
            // is_canonical guarantees valid hex, so parse_str succeeds
            let uuid = Uuid::parse_str(input).expect("is_canonical guarantees valid UUID");
            return Ok(Self(uuid));
        }
        Err(UuidError::InvalidInput(format!(
            "record id must be 32 lowercase hex characters without hyphens, got: '{}'",
            input
        )))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// Purely syntactic: exactly 32 bytes, lowercase hex only.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` where `s1`/`s2` are the first
    /// four hex characters of this identifier.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_canonical() {
        let id = RecordId::new();
        assert!(RecordId::is_canonical(&id.to_string()));
    }

    #[test]
    fn parse_accepts_canonical_form() {
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(id.to_string(), "550e8400e29b41d4a716446655440000");
    }

    #[test]
    fn parse_rejects_non_canonical_forms() {
        // hyphenated
        assert!(RecordId::parse("550e8400-e29b-41d4-a716-446655440000").is_err());
        // uppercase
        assert!(RecordId::parse("550E8400E29B41D4A716446655440000").is_err());
        // wrong length
        assert!(RecordId::parse("550e8400").is_err());
        // non-hex
        assert!(RecordId::parse("550e8400e29b41d4a716446655440zzz0").is_err());
    }

    #[test]
    fn sharded_dir_uses_first_four_hex_chars() {
        let id = RecordId::parse("abcdef00112233445566778899aabbcc").unwrap();
        let dir = id.sharded_dir(Path::new("/data/records"));
        assert_eq!(
            dir,
            Path::new("/data/records/ab/cd/abcdef00112233445566778899aabbcc")
        );
    }

    #[test]
    fn serde_round_trip_is_canonical_string() {
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400e29b41d4a716446655440000\"");
        let back: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
