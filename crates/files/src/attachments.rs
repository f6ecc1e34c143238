//! Record-scoped attachment storage service.
//!
//! [`AttachmentService`] manages the binary files attached to one patient
//! record. Files are stored content-addressed: the SHA-256 hash of the
//! content is the identifier, which gives deduplication (the same image
//! attached to two visit slots is stored once), integrity (content can be
//! verified against its reference), and deterministic paths.
//!
//! The service is scoped to a single record. References it hands out are
//! relative to that record's directory and are the only thing the record
//! document stores; resolving a reference re-derives the storage path from
//! the embedded hash, so a crafted reference cannot escape the record's
//! `files/` directory.

use crate::{FilesError, Sha256Hash};
use chrono::{DateTime, Utc};
use hfr_types::NonEmptyText;
use hfr_uuid::RecordId;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-record directory holding attachment binaries.
pub const FILES_FOLDER_NAME: &str = "files";

/// Subdirectory naming the hash algorithm used for content addressing.
const HASH_DIR_NAME: &str = "sha256";

/// Metadata for a stored attachment.
///
/// `reference` is the opaque value the patient record carries in its
/// `xray_path`/`mri_path` fields; everything else is descriptive.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StoredAttachment {
    /// Opaque reference, relative to the record root
    /// (`files/sha256/<s1>/<s2>/<hash>`)
    pub reference: NonEmptyText,

    /// Hexadecimal digest of the attachment content
    pub hash: Sha256Hash,

    /// Size of the attachment in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), if available
    ///
    /// Best-effort detection from the content; not authoritative.
    pub media_type: Option<NonEmptyText>,

    /// Filename the attachment was uploaded with
    pub original_filename: NonEmptyText,

    /// UTC timestamp when the attachment was stored
    pub stored_at: DateTime<Utc>,
}

/// Service for managing the attachments of a single patient record.
///
/// # Design
///
/// - Record-scoped: each instance is bound to one record id
/// - Content-addressed: attachments are identified by their SHA-256 hash
/// - Idempotent: storing identical bytes twice yields the same reference
/// - Defensive: references are validated before any path is touched
#[derive(Debug)]
pub struct AttachmentService {
    /// Canonicalised root directory containing all record directories
    records_dir: PathBuf,

    /// Identifier of the record this service is scoped to
    record_id: RecordId,
}

impl AttachmentService {
    /// Creates a new `AttachmentService` scoped to one record.
    ///
    /// The record's own directory is not required to exist yet: during
    /// patient creation attachments are stored before the record document
    /// is first written, and `put` creates directories on demand.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidRecordsDirectory`] if `records_dir`
    /// does not exist, is not a directory, or cannot be canonicalised.
    pub fn new(records_dir: &Path, record_id: RecordId) -> Result<Self, FilesError> {
        if !records_dir.is_dir() {
            return Err(FilesError::InvalidRecordsDirectory(format!(
                "not a directory: {}",
                records_dir.display()
            )));
        }

        let records_dir = records_dir.canonicalize().map_err(|e| {
            FilesError::InvalidRecordsDirectory(format!(
                "cannot canonicalize {}: {}",
                records_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            records_dir,
            record_id,
        })
    }

    /// Stores attachment bytes in this record's content-addressed storage.
    ///
    /// Computes the SHA-256 hash of `bytes` and writes them under
    /// `files/sha256/<s1>/<s2>/<hash>` inside the record directory. If the
    /// same content is already present the existing file is left untouched
    /// and the same reference is returned, so attaching one image to two
    /// visit slots is not an error.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Attachment content (typically a multipart upload field)
    /// * `original_filename` - Filename supplied by the uploader; blank
    ///   values fall back to `"unknown"`
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::Io`] if directory creation or the file write
    /// fails.
    pub fn put(&self, bytes: &[u8], original_filename: &str) -> Result<StoredAttachment, FilesError> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash_bytes: [u8; 32] = hasher.finalize().into();
        let hash = Sha256Hash::from_bytes(&hash_bytes);

        let reference = relative_reference(&hash);
        let storage_path = self.record_dir().join(reference.as_str());

        // Content-addressed: identical bytes already stored means nothing
        // to write.
        if !storage_path.exists() {
            if let Some(parent) = storage_path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    FilesError::Io(std::io::Error::new(
                        e.kind(),
                        format!("failed to create storage directory {}: {}", parent.display(), e),
                    ))
                })?;
            }

            fs::write(&storage_path, bytes).map_err(|e| {
                FilesError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to write attachment to {}: {}", storage_path.display(), e),
                ))
            })?;
        }

        let original_filename = NonEmptyText::new(original_filename)
            .unwrap_or_else(|_| NonEmptyText::new("unknown").expect("literal is non-empty"));

        let media_type = infer::get(bytes)
            .map(|kind| NonEmptyText::new(kind.mime_type()).expect("mime type is non-empty"));

        Ok(StoredAttachment {
            reference,
            hash,
            size_bytes: bytes.len() as u64,
            media_type,
            original_filename,
            stored_at: Utc::now(),
        })
    }

    /// Retrieves attachment bytes by reference.
    ///
    /// The reference must be one previously returned by [`put`]; its
    /// embedded hash is validated and the storage path re-derived from it,
    /// so traversal-style references are rejected before any filesystem
    /// access.
    ///
    /// # Errors
    ///
    /// - [`FilesError::InvalidReference`] / [`FilesError::InvalidDigest`]
    ///   if the reference is malformed
    /// - [`FilesError::NotFound`] if no attachment is stored under it
    /// - [`FilesError::Io`] if the read fails
    ///
    /// [`put`]: AttachmentService::put
    pub fn resolve(&self, reference: &str) -> Result<Vec<u8>, FilesError> {
        let hash = parse_reference(reference)?;
        let storage_path = self.record_dir().join(relative_reference(&hash).as_str());

        if !storage_path.is_file() {
            return Err(FilesError::NotFound(reference.to_owned()));
        }

        fs::read(&storage_path).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read attachment from {}: {}", storage_path.display(), e),
            ))
        })
    }

    /// Returns this record's directory under the records root.
    fn record_dir(&self) -> PathBuf {
        self.record_id.sharded_dir(&self.records_dir)
    }
}

/// Builds the relative reference for a digest:
/// `files/sha256/<s1>/<s2>/<hash>`.
fn relative_reference(hash: &Sha256Hash) -> NonEmptyText {
    let hex = hash.as_str();
    let s1 = &hex[0..2];
    let s2 = &hex[2..4];
    NonEmptyText::new(format!(
        "{}/{}/{}/{}/{}",
        FILES_FOLDER_NAME, HASH_DIR_NAME, s1, s2, hex
    ))
    .expect("computed reference is non-empty")
}

/// Validates a reference and extracts its digest.
///
/// Accepts exactly the shape produced by [`relative_reference`]; anything
/// else (extra segments, `..`, mismatched shards) is rejected.
fn parse_reference(reference: &str) -> Result<Sha256Hash, FilesError> {
    let mut segments = reference.split('/');

    let malformed = || FilesError::InvalidReference(reference.to_owned());

    if segments.next() != Some(FILES_FOLDER_NAME) {
        return Err(malformed());
    }
    if segments.next() != Some(HASH_DIR_NAME) {
        return Err(malformed());
    }

    let s1 = segments.next().ok_or_else(malformed)?;
    let s2 = segments.next().ok_or_else(malformed)?;
    let hex = segments.next().ok_or_else(malformed)?;

    if segments.next().is_some() {
        return Err(malformed());
    }

    let hash = Sha256Hash::parse(hex)?;

    if s1 != &hex[0..2] || s2 != &hex[2..4] {
        return Err(malformed());
    }

    Ok(hash)
}
