//! Follow-up visit records.
//!
//! A follow-up record holds one visit's clinical measurements: free-text
//! scores, an optional structured Harris Hip Score assessment, and
//! optional references to imaging attachments.
//!
//! Two fields deserve care:
//!
//! - `hhs_score` is free text. It is *derived* from the structured
//!   assessment when the assessment is edited ([`with_assessment`]), but a
//!   clinician may also hand-type a value that contradicts the assessment.
//!   Both are stored as given; nothing recomputes the text score on read.
//! - Attachment references are monotonic: an update that carries no new
//!   image keeps the existing reference. There is no detach operation.
//!
//! [`with_assessment`]: FollowUpRecord::with_assessment

use crate::hhs::HhsAssessment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two imaging attachment slots a visit can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Xray,
    Mri,
}

impl AttachmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentKind::Xray => "xray",
            AttachmentKind::Mri => "mri",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xray" => Ok(AttachmentKind::Xray),
            "mri" => Ok(AttachmentKind::Mri),
            other => Err(format!("unknown attachment kind: '{}'", other)),
        }
    }
}

/// One follow-up visit's data.
///
/// A value object: updates replace whole fields, never patch inside them.
/// All three slots of a patient record exist from creation; an untouched
/// slot is simply the default (empty) record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRecord {
    /// VAS pain rating as entered (0-10 by convention, not enforced)
    #[serde(rename = "painScore", default)]
    pub pain_score: String,

    /// Free-text range-of-motion note (distinct from the structured ROM
    /// inside the detailed assessment)
    #[serde(default)]
    pub rom: String,

    /// Free-text limb length discrepancy / abductor score
    #[serde(default)]
    pub loda: String,

    /// Harris Hip Score total as text; derived or hand-entered
    #[serde(rename = "hhsScore", default)]
    pub hhs_score: String,

    /// Structured assessment backing `hhs_score`, when captured
    #[serde(rename = "hhsDetailed", default)]
    pub hhs_detailed: Option<HhsAssessment>,

    /// Reference to the visit's X-ray attachment
    #[serde(default)]
    pub xray_path: Option<String>,

    /// Reference to the visit's MRI attachment
    #[serde(default)]
    pub mri_path: Option<String>,
}

impl FollowUpRecord {
    /// Sets the structured assessment and its derived text score together.
    ///
    /// After this call `hhs_score` always equals the stringified total of
    /// `hhs_detailed`; callers can never observe the two out of sync. This
    /// is the only place the text score is derived — later hand edits to
    /// `hhs_score` are kept as typed.
    pub fn with_assessment(mut self, assessment: HhsAssessment) -> Self {
        self.hhs_score = assessment.total().to_string();
        self.hhs_detailed = Some(assessment);
        self
    }

    /// Replaces an attachment reference, or keeps the current one.
    ///
    /// A present `reference` always replaces; an absent one leaves the
    /// existing reference untouched. Attachments can therefore only be
    /// added or replaced, never cleared.
    pub fn with_attachment(mut self, kind: AttachmentKind, reference: Option<String>) -> Self {
        if let Some(reference) = reference {
            match kind {
                AttachmentKind::Xray => self.xray_path = Some(reference),
                AttachmentKind::Mri => self.mri_path = Some(reference),
            }
        }
        self
    }

    /// Applies an incoming update to this slot.
    ///
    /// Scalar fields and the structured assessment are taken wholesale
    /// from `incoming` — including a hand-typed `hhs_score` that may
    /// contradict `hhs_detailed`. Attachment references follow the
    /// monotonic rule: an update without a reference keeps the existing
    /// one.
    pub fn merged(&self, incoming: FollowUpRecord) -> FollowUpRecord {
        FollowUpRecord {
            xray_path: incoming.xray_path.or_else(|| self.xray_path.clone()),
            mri_path: incoming.mri_path.or_else(|| self.mri_path.clone()),
            ..incoming
        }
    }
}
