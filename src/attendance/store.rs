use std::sync::RwLock;

use anyhow::Context;
use tracing::info;

use crate::config::{Config, StoreKind};
use crate::db::init_db;
use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;

use super::file_store::JsonFileStore;
use super::mysql_store::MySqlStore;

/// Persistence backend for the attendance log.
///
/// Backends hold the whole log; `load` returns it in insertion order.
#[allow(async_fn_in_trait)]
pub trait AttendanceStore {
    async fn load(&self) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn save(&self, records: &[AttendanceRecord]) -> Result<(), StoreError>;

    async fn append(&self, record: AttendanceRecord) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        records.push(record);
        self.save(&records).await
    }
}

/// Process-local store, contents are lost on restart
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<AttendanceRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<AttendanceRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl AttendanceStore for InMemoryStore {
    async fn load(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::StorageUnavailable("in-memory store poisoned".into()))?;
        Ok(records.clone())
    }

    async fn save(&self, records: &[AttendanceRecord]) -> Result<(), StoreError> {
        let mut stored = self
            .records
            .write()
            .map_err(|_| StoreError::StorageUnavailable("in-memory store poisoned".into()))?;
        *stored = records.to_vec();
        Ok(())
    }

    async fn append(&self, record: AttendanceRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::StorageUnavailable("in-memory store poisoned".into()))?
            .push(record);
        Ok(())
    }
}

/// Backend picked at startup from `STORE_BACKEND`
pub enum StoreBackend {
    Memory(InMemoryStore),
    File(JsonFileStore),
    MySql(MySqlStore),
}

impl StoreBackend {
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let backend = match config.store_backend {
            StoreKind::Memory => StoreBackend::Memory(InMemoryStore::new()),
            StoreKind::File => StoreBackend::File(JsonFileStore::new(&config.store_path)),
            StoreKind::Mysql => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL must be set for the mysql store")?;
                let pool = init_db(url)
                    .await
                    .context("Failed to connect to database")?;
                let store = MySqlStore::new(pool);
                store.ensure_schema().await?;
                StoreBackend::MySql(store)
            }
        };

        info!(backend = backend.name(), "Attendance store ready");
        Ok(backend)
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Memory(_) => "memory",
            StoreBackend::File(_) => "file",
            StoreBackend::MySql(_) => "mysql",
        }
    }
}

impl AttendanceStore for StoreBackend {
    async fn load(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        match self {
            StoreBackend::Memory(s) => s.load().await,
            StoreBackend::File(s) => s.load().await,
            StoreBackend::MySql(s) => s.load().await,
        }
    }

    async fn save(&self, records: &[AttendanceRecord]) -> Result<(), StoreError> {
        match self {
            StoreBackend::Memory(s) => s.save(records).await,
            StoreBackend::File(s) => s.save(records).await,
            StoreBackend::MySql(s) => s.save(records).await,
        }
    }

    async fn append(&self, record: AttendanceRecord) -> Result<(), StoreError> {
        match self {
            StoreBackend::Memory(s) => s.append(record).await,
            StoreBackend::File(s) => s.append(record).await,
            StoreBackend::MySql(s) => s.append(record).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::EventType;
    use chrono::{Local, TimeZone};

    fn record(employee_id: &str, secs: i64) -> AttendanceRecord {
        let at = Local.timestamp_opt(secs, 0).unwrap();
        AttendanceRecord::new(employee_id, "Jane", "north", EventType::CheckIn, at)
    }

    #[actix_web::test]
    async fn empty_store_loads_nothing() {
        let store = InMemoryStore::new();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn append_keeps_insertion_order() {
        let store = InMemoryStore::new();
        store.append(record("E1", 200)).await.unwrap();
        store.append(record("E2", 100)).await.unwrap();

        let loaded = store.load().await.unwrap();
        let ids: Vec<_> = loaded.iter().map(|r| r.employee_id.as_str()).collect();
        assert_eq!(ids, vec!["E1", "E2"]);
    }

    #[actix_web::test]
    async fn save_replaces_the_whole_log() {
        let store = InMemoryStore::with_records(vec![record("E1", 1), record("E2", 2)]);
        store.save(&[record("E3", 3)]).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].employee_id, "E3");
    }

    #[actix_web::test]
    async fn backend_dispatches_to_inner_store() {
        let backend = StoreBackend::Memory(InMemoryStore::new());
        backend.append(record("E1", 1)).await.unwrap();

        assert_eq!(backend.name(), "memory");
        assert_eq!(backend.load().await.unwrap().len(), 1);
    }
}
