//! # HFR Core
//!
//! Core business logic for the HFR (Hip Follow-up Registry) patient record
//! system.
//!
//! This crate contains pure data operations and record persistence:
//! - Harris Hip Score assessment model and scoring
//! - Follow-up visit records and their update semantics
//! - The patient record aggregate (demographics + three follow-up slots)
//! - Sharded JSON document storage under the configured data directory
//!
//! **No API concerns**: HTTP servers, multipart handling, or service
//! interfaces belong in `api-rest`.

pub mod config;
pub mod error;
pub mod followup;
pub mod hhs;
pub mod patient;
pub mod store;

pub use config::{CoreConfig, DEFAULT_DATA_DIR};
pub use error::{RecordError, RecordResult};
pub use followup::{AttachmentKind, FollowUpRecord};
pub use hhs::{Deformity, HhsAssessment, RomDegrees};
pub use patient::{Demographics, FollowUps, PatientRecord, PatientSummary, PatientView};
pub use store::RecordStore;

pub use hfr_types::{FollowUpKey, NonEmptyText, Sex};
pub use hfr_uuid::RecordId;
