//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into
//! core services as `Arc<CoreConfig>`. The intent is to avoid reading
//! process-wide environment variables during request handling, which can
//! lead to inconsistent behaviour in multi-threaded runtimes and test
//! harnesses.

use crate::error::{RecordError, RecordResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Default data directory when `HFR_DATA_DIR` is not set.
pub const DEFAULT_DATA_DIR: &str = "./hfr_data";

/// Name of the subdirectory holding patient record directories.
const RECORDS_DIR_NAME: &str = "records";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig` rooted at `data_dir`.
    ///
    /// Ensures the records subdirectory exists so that stores constructed
    /// from this config can assume a valid root.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::StorageDirCreation`] if the records
    /// directory cannot be created.
    pub fn new(data_dir: PathBuf) -> RecordResult<Self> {
        let cfg = Self { data_dir };
        fs::create_dir_all(cfg.records_dir()).map_err(RecordError::StorageDirCreation)?;
        Ok(cfg)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Root directory of the sharded patient record tree.
    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join(RECORDS_DIR_NAME)
    }
}
