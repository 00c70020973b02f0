use sqlx::{FromRow, MySqlPool};
use tracing::{debug, error};

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;

use super::store::AttendanceStore;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS attendance_records (
        seq BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
        id VARCHAR(191) NOT NULL,
        employee_id VARCHAR(128) NOT NULL,
        employee_name VARCHAR(255) NOT NULL,
        branch VARCHAR(128) NOT NULL,
        event_type VARCHAR(32) NOT NULL,
        `date` VARCHAR(32) NOT NULL,
        `time` VARCHAR(32) NOT NULL,
        `timestamp` BIGINT NOT NULL,
        INDEX idx_attendance_employee (employee_id, `timestamp`)
    )
"#;

const INSERT_RECORD: &str = r#"
    INSERT INTO attendance_records
        (id, employee_id, employee_name, branch, event_type, `date`, `time`, `timestamp`)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

#[derive(FromRow)]
struct AttendanceRow {
    id: String,
    employee_id: String,
    employee_name: String,
    branch: String,
    event_type: String,
    date: String,
    time: String,
    timestamp: i64,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            employee_name: row.employee_name,
            branch: row.branch,
            event_type: row.event_type.into(),
            date: row.date,
            time: row.time,
            timestamp: row.timestamp,
        }
    }
}

/// Attendance log kept in the `attendance_records` table.
///
/// `seq` preserves insertion order so `load` matches the other backends.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create attendance_records table");
                StoreError::from(e)
            })?;
        Ok(())
    }
}

impl AttendanceStore for MySqlStore {
    async fn load(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, employee_id, employee_name, branch, event_type, `date`, `time`, `timestamp`
            FROM attendance_records
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded attendance rows");
        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    async fn save(&self, records: &[AttendanceRecord]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM attendance_records")
            .execute(&mut *tx)
            .await?;

        for record in records {
            bind_record(sqlx::query(INSERT_RECORD), record)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn append(&self, record: AttendanceRecord) -> Result<(), StoreError> {
        bind_record(sqlx::query(INSERT_RECORD), &record)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn bind_record<'q>(
    query: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
    record: &'q AttendanceRecord,
) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
    query
        .bind(&record.id)
        .bind(&record.employee_id)
        .bind(&record.employee_name)
        .bind(&record.branch)
        .bind(record.event_type.as_str())
        .bind(&record.date)
        .bind(&record.time)
        .bind(record.timestamp)
}
