//! Patient record persistence.
//!
//! Records are stored as JSON documents in a sharded directory tree:
//!
//! ```text
//! <data_dir>/records/<s1>/<s2>/<id>/record.json
//! ```
//!
//! where `s1`/`s2` are the first four hex characters of the record id.
//! Attachment binaries live inside the same `<id>/` directory (see the
//! `hfr_files` crate), so removing a record directory removes everything
//! the patient owns.
//!
//! Saves are atomic: the document is written to a temporary file and
//! renamed into place, so a failed save never leaves a half-updated record
//! visible to readers.

use crate::config::CoreConfig;
use crate::error::{RecordError, RecordResult};
use crate::patient::{PatientRecord, PatientSummary};
use hfr_uuid::RecordId;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the record document inside a record directory.
pub const RECORD_FILE_NAME: &str = "record.json";

/// Scratch name used to make saves atomic.
const RECORD_TMP_FILE_NAME: &str = "record.json.tmp";

/// Store for patient record documents.
#[derive(Clone, Debug)]
pub struct RecordStore {
    cfg: Arc<CoreConfig>,
}

impl RecordStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Returns the sharded directory for a record id.
    ///
    /// This is the same directory the attachment service stores binaries
    /// under; the store and the attachment service must agree on it.
    pub fn record_dir(&self, id: &RecordId) -> PathBuf {
        id.sharded_dir(&self.cfg.records_dir())
    }

    /// Persists a record, creating or replacing its document.
    ///
    /// The write goes through a temporary file and a rename; on any
    /// failure the previously saved document (if one exists) is still
    /// intact.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if the record directory cannot be created,
    /// serialization fails, or the write/rename fails.
    pub fn save(&self, record: &PatientRecord) -> RecordResult<()> {
        let dir = self.record_dir(&record.id);
        fs::create_dir_all(&dir).map_err(RecordError::RecordDirCreation)?;

        let json =
            serde_json::to_string_pretty(record).map_err(RecordError::Serialization)?;

        let tmp_path = dir.join(RECORD_TMP_FILE_NAME);
        let final_path = dir.join(RECORD_FILE_NAME);

        fs::write(&tmp_path, json).map_err(RecordError::FileWrite)?;
        fs::rename(&tmp_path, &final_path).map_err(RecordError::FileWrite)?;

        Ok(())
    }

    /// Loads a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if no document exists for the id;
    /// read and parse failures surface as their own variants.
    pub fn get(&self, id: &RecordId) -> RecordResult<PatientRecord> {
        let path = self.record_dir(id).join(RECORD_FILE_NAME);
        if !path.is_file() {
            return Err(RecordError::NotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&path).map_err(RecordError::FileRead)?;
        serde_json::from_str(&contents).map_err(RecordError::Deserialization)
    }

    /// Lists all patient summaries, most recently created first.
    ///
    /// Walks the sharded tree and reads every `record.json`. A document
    /// that fails to parse is logged as a warning and skipped rather than
    /// failing the whole listing.
    pub fn list(&self) -> Vec<PatientSummary> {
        let mut summaries = Vec::new();

        for record_dir in self.walk_record_dirs() {
            let doc_path = record_dir.join(RECORD_FILE_NAME);
            if !doc_path.is_file() {
                continue;
            }

            let contents = match fs::read_to_string(&doc_path) {
                Ok(contents) => contents,
                Err(_) => continue,
            };

            match serde_json::from_str::<PatientRecord>(&contents) {
                Ok(record) => summaries.push(record.summary()),
                Err(_) => {
                    tracing::warn!("failed to parse record document: {}", doc_path.display());
                }
            }
        }

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Deletes a record and everything under its directory, including
    /// follow-up data and attachment binaries.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotFound`] if no document exists for the id.
    pub fn delete(&self, id: &RecordId) -> RecordResult<()> {
        let dir = self.record_dir(id);
        if !dir.join(RECORD_FILE_NAME).is_file() {
            return Err(RecordError::NotFound(id.to_string()));
        }

        fs::remove_dir_all(&dir).map_err(RecordError::RecordRemoval)
    }

    /// Iterates the leaf record directories of the sharded tree.
    fn walk_record_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();

        let s1_iter = match fs::read_dir(self.cfg.records_dir()) {
            Ok(it) => it,
            Err(_) => return dirs,
        };
        for s1 in s1_iter.flatten() {
            if !s1.path().is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(s1.path()) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for s2 in s2_iter.flatten() {
                if !s2.path().is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(s2.path()) {
                    Ok(it) => it,
                    Err(_) => continue,
                };
                for id_entry in id_iter.flatten() {
                    if id_entry.path().is_dir() {
                        dirs.push(id_entry.path());
                    }
                }
            }
        }

        dirs
    }
}

/// Convenience used by binaries: a store rooted at `data_dir`.
pub fn open(data_dir: &Path) -> RecordResult<RecordStore> {
    let cfg = CoreConfig::new(data_dir.to_path_buf())?;
    Ok(RecordStore::new(Arc::new(cfg)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::followup::AttachmentKind;
    use crate::hhs::HhsAssessment;
    use crate::patient::{Demographics, FollowUps};
    use chrono::Duration;
    use hfr_types::Sex;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> RecordStore {
        open(&temp.path().join("data")).unwrap()
    }

    fn sample_record() -> PatientRecord {
        let demographics = Demographics {
            name: "B. Example".to_owned(),
            age: "58".to_owned(),
            sex: Sex::Male,
            date_of_surgery: "2025-11-02".to_owned(),
            ..Demographics::default()
        };

        let mut follow_ups = FollowUps::default();
        follow_ups.fu1 = follow_ups
            .fu1
            .clone()
            .with_assessment(HhsAssessment::default())
            .with_attachment(AttachmentKind::Xray, Some("files/sha256/ab/cd/scan".to_owned()));

        PatientRecord::create(demographics, follow_ups)
    }

    #[test]
    fn save_then_get_round_trips_field_by_field() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let record = sample_record();
        store.save(&record).unwrap();

        let loaded = store.get(&record.id).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn save_leaves_no_scratch_file_behind() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let record = sample_record();
        store.save(&record).unwrap();

        let dir = store.record_dir(&record.id);
        assert!(dir.join(RECORD_FILE_NAME).is_file());
        assert!(!dir.join("record.json.tmp").exists());
    }

    #[test]
    fn save_replaces_an_existing_document() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let mut record = sample_record();
        store.save(&record).unwrap();

        record.demographics.name = "B. Example-Jones".to_owned();
        store.save(&record).unwrap();

        let loaded = store.get(&record.id).unwrap();
        assert_eq!(loaded.demographics.name, "B. Example-Jones");
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let result = store.get(&RecordId::new());

        assert!(matches!(result, Err(RecordError::NotFound(_))));
    }

    #[test]
    fn list_orders_most_recent_first() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let mut older = sample_record();
        older.created_at = older.created_at - Duration::days(2);
        older.demographics.name = "Older".to_owned();

        let mut newer = sample_record();
        newer.demographics.name = "Newer".to_owned();

        store.save(&older).unwrap();
        store.save(&newer).unwrap();

        let summaries = store.list();
        let names: Vec<&str> = summaries
            .iter()
            .map(|s| s.demographics.name.as_str())
            .collect();
        assert_eq!(names, vec!["Newer", "Older"]);
    }

    #[test]
    fn list_skips_unparseable_documents() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let record = sample_record();
        store.save(&record).unwrap();

        // plant a corrupt document in a second record directory
        let corrupt_dir = store.record_dir(&RecordId::new());
        fs::create_dir_all(&corrupt_dir).unwrap();
        fs::write(corrupt_dir.join(RECORD_FILE_NAME), "not json").unwrap();

        let summaries = store.list();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, record.id.to_string());
    }

    #[test]
    fn delete_removes_the_whole_record_directory() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let record = sample_record();
        store.save(&record).unwrap();

        // attachment binary inside the record directory
        let files_dir = store.record_dir(&record.id).join("files/sha256/ab/cd");
        fs::create_dir_all(&files_dir).unwrap();
        fs::write(files_dir.join("scan"), b"bytes").unwrap();

        store.delete(&record.id).unwrap();

        assert!(!store.record_dir(&record.id).exists());
        assert!(matches!(
            store.get(&record.id),
            Err(RecordError::NotFound(_))
        ));
        assert!(store.list().is_empty());
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let result = store.delete(&RecordId::new());

        assert!(matches!(result, Err(RecordError::NotFound(_))));
    }
}
