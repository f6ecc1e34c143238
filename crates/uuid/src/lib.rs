//! Record identifiers and sharded-path utilities.
//!
//! HFR stores each patient record under a directory derived from its
//! identifier. To keep path derivation deterministic and consistent across
//! the codebase, identifiers use a *canonical* representation: **32
//! lowercase hexadecimal characters** (no hyphens).
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the same value you would get from
//! `Uuid::new_v4().simple().to_string()`. Canonical form is *required* for
//! externally supplied identifiers (CLI arguments, URL path segments); use
//! [`RecordId::parse`] to validate an input string. Non-canonical values
//! (uppercase, hyphenated, wrong length, non-hex) are rejected.
//!
//! ## Sharded directory layout
//! For a canonical identifier `u`, record data lives under
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`, which bounds the fan-out of any
//! single directory regardless of how many records exist.

mod id;

pub use id::{RecordId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
