//! The patient record aggregate.
//!
//! A patient record is the unit of create/read/update/delete: baseline
//! demographics plus exactly three follow-up visit slots (`fu1`, `fu2`,
//! `fu3`). The slot set is fixed — three named fields, not a growable
//! list — so "exactly three visits" holds by construction.
//!
//! The aggregate serialises to the same document shape the registry's
//! clients exchange: a `patientData` object and a `followUps` object keyed
//! by slot name.

use crate::followup::FollowUpRecord;
use chrono::{DateTime, Utc};
use hfr_types::{FollowUpKey, Sex};
use hfr_uuid::RecordId;
use serde::{Deserialize, Serialize};

/// Baseline patient demographics and history.
///
/// All fields are free text as captured on the baseline form; clinical
/// plausibility is deliberately not validated here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub address: String,
    /// Date of surgery as entered (calendar date kept as text)
    #[serde(rename = "dateOfSurgery", default)]
    pub date_of_surgery: String,
    /// Drug history
    #[serde(rename = "drugHx", default)]
    pub drug_hx: String,
    /// Past medical history
    #[serde(default)]
    pub pmh: String,
    /// Past surgical history
    #[serde(default)]
    pub psh: String,
}

/// The three follow-up visit slots of a patient record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUps {
    #[serde(default)]
    pub fu1: FollowUpRecord,
    #[serde(default)]
    pub fu2: FollowUpRecord,
    #[serde(default)]
    pub fu3: FollowUpRecord,
}

impl FollowUps {
    pub fn get(&self, key: FollowUpKey) -> &FollowUpRecord {
        match key {
            FollowUpKey::First => &self.fu1,
            FollowUpKey::Second => &self.fu2,
            FollowUpKey::Third => &self.fu3,
        }
    }

    pub fn get_mut(&mut self, key: FollowUpKey) -> &mut FollowUpRecord {
        match key {
            FollowUpKey::First => &mut self.fu1,
            FollowUpKey::Second => &mut self.fu2,
            FollowUpKey::Third => &mut self.fu3,
        }
    }

    /// Slots in visit order.
    pub fn iter(&self) -> impl Iterator<Item = (FollowUpKey, &FollowUpRecord)> + '_ {
        FollowUpKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }
}

/// A complete patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Minted at creation, never reassigned
    pub id: RecordId,
    /// Creation timestamp; drives listing order
    pub created_at: DateTime<Utc>,
    #[serde(rename = "patientData")]
    pub demographics: Demographics,
    #[serde(rename = "followUps")]
    pub follow_ups: FollowUps,
}

impl PatientRecord {
    /// Creates a new record with a freshly minted id.
    ///
    /// All three follow-up slots exist from the start; callers typically
    /// supply empty defaults for visits that have not happened yet.
    pub fn create(demographics: Demographics, follow_ups: FollowUps) -> Self {
        Self {
            id: RecordId::new(),
            created_at: Utc::now(),
            demographics,
            follow_ups,
        }
    }

    /// Applies an update to this record, keeping its identity.
    ///
    /// Demographics are replaced wholesale — the data layer never patches
    /// individual fields. Each follow-up slot goes through
    /// [`FollowUpRecord::merged`], so attachment references survive
    /// updates that carry no replacement image.
    pub fn apply_update(&mut self, demographics: Demographics, follow_ups: FollowUps) {
        self.demographics = demographics;
        for key in FollowUpKey::ALL {
            let merged = self.get_follow_up(key).merged(follow_ups.get(key).clone());
            *self.follow_ups.get_mut(key) = merged;
        }
    }

    pub fn get_follow_up(&self, key: FollowUpKey) -> &FollowUpRecord {
        self.follow_ups.get(key)
    }

    /// Flattened representation for the presentation boundary.
    pub fn to_view(&self) -> PatientView {
        PatientView {
            patient_data: self.summary(),
            follow_ups: self.follow_ups.clone(),
        }
    }

    /// Identity and demographics only, as used by listings.
    pub fn summary(&self) -> PatientSummary {
        PatientSummary {
            id: self.id.to_string(),
            demographics: self.demographics.clone(),
            created_at: self.created_at,
        }
    }
}

/// Identity plus demographics, the listing row for one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: String,
    #[serde(flatten)]
    pub demographics: Demographics,
    pub created_at: DateTime<Utc>,
}

/// Full record view: demographics plus the three follow-up slots with any
/// structured assessment present in structured form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientView {
    #[serde(rename = "patientData")]
    pub patient_data: PatientSummary,
    #[serde(rename = "followUps")]
    pub follow_ups: FollowUps,
}
