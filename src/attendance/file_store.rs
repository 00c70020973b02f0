use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;

use super::store::AttendanceStore;

/// The whole attendance log as one JSON array in a single file.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the
/// original.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl AttendanceStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            // nothing recorded yet
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<AttendanceRecord> = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), count = records.len(), "Loaded attendance file");
        Ok(records)
    }

    async fn save(&self, records: &[AttendanceRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec(records)
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

        let tmp = self.tmp_path();
        let mut file = File::create(&tmp)?;
        file.write_all(&json)?;
        // contents must be on disk before the rename publishes them
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), count = records.len(), "Saved attendance file");
        Ok(())
    }
}
