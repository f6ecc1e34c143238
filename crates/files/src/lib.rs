//! HFR attachment storage.
//!
//! This crate stores the binary imaging attachments (X-ray and MRI images)
//! that follow-up visits may carry. The design separates semantic data from
//! binary bytes:
//!
//! - The patient record document holds only opaque *references* to
//!   attachments, never the bytes.
//! - Bytes are stored content-addressed by SHA-256 inside the owning
//!   record's directory, so deleting a patient record directory removes its
//!   attachments with it.
//! - No global or cross-record binary namespace exists.
//!
//! ## Record-scoped storage layout
//!
//! ```text
//! records/
//! └── <s1>/<s2>/<record_id>/
//!     ├── record.json
//!     └── files/
//!         └── sha256/
//!             └── ab/
//!                 └── cd/
//!                     └── abcdef…   # full hash as filename
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use hfr_files::AttachmentService;
//! use hfr_uuid::RecordId;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let records_dir = Path::new("hfr_data/records");
//! let record_id = RecordId::parse("550e8400e29b41d4a716446655440000")?;
//!
//! let service = AttachmentService::new(records_dir, record_id)?;
//! let stored = service.put(b"...image bytes...", "xray.png")?;
//! let bytes = service.resolve(stored.reference.as_str())?;
//! # Ok(())
//! # }
//! ```

mod attachments;
mod digest;

pub use attachments::{AttachmentService, StoredAttachment, FILES_FOLDER_NAME};
pub use digest::Sha256Hash;
pub use hfr_uuid::RecordId;

/// Errors that can occur during attachment operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Records root directory does not exist or is not a directory
    #[error("Invalid records directory: {0}")]
    InvalidRecordsDirectory(String),

    /// Reference validation failed (malformed or potential directory traversal)
    #[error("Invalid attachment reference: {0}")]
    InvalidReference(String),

    /// Digest string was not 64 lowercase hex characters
    #[error("Invalid SHA-256 digest: {0}")]
    InvalidDigest(String),

    /// No attachment stored under the given reference
    #[error("Attachment not found: {0}")]
    NotFound(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
