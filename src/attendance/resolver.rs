use chrono::{DateTime, Local};
use futures::lock::Mutex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::{AttendanceError, StoreError};
use crate::model::attendance::{AttendanceRecord, EventType};

use super::store::AttendanceStore;

pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// What the time clock expects an employee to log next, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextEvent {
    pub event_type: EventType,
    pub reason: &'static str,
}

impl NextEvent {
    fn new(event_type: EventType, reason: &'static str) -> Self {
        Self { event_type, reason }
    }
}

/// Next event given the employee's latest record.
///
/// Only the latest record matters. There is no terminal state: every input
/// yields an event.
pub fn next_event(previous: Option<&AttendanceRecord>, target_branch: &str) -> NextEvent {
    let Some(previous) = previous else {
        return NextEvent::new(EventType::CheckIn, "first entry of the day");
    };

    match previous.event_type {
        EventType::CheckOut => NextEvent::new(EventType::CheckIn, "re-entry after leaving"),
        EventType::CheckIn if previous.branch == target_branch => {
            NextEvent::new(EventType::CheckOut, "leaving the current branch")
        }
        EventType::CheckIn => NextEvent::new(
            EventType::Transfer,
            "moved to a different branch without checking out",
        ),
        EventType::Transfer => {
            NextEvent::new(EventType::CheckOut, "must check out after a transfer")
        }
        EventType::Unknown(_) => NextEvent::new(EventType::CheckIn, "fallback default"),
    }
}

/// Reads an unreachable store as an empty list. Corrupt data still fails.
pub fn empty_if_unavailable(
    result: Result<Vec<AttendanceRecord>, StoreError>,
) -> Result<Vec<AttendanceRecord>, StoreError> {
    match result {
        Err(StoreError::StorageUnavailable(reason)) => {
            warn!(%reason, "Attendance storage unavailable, serving empty list");
            Ok(Vec::new())
        }
        other => other,
    }
}

fn newest_first(records: &mut [AttendanceRecord]) {
    // stable: equal timestamps keep storage order
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Append-only attendance log over an injected store.
pub struct AttendanceResolver<S> {
    store: S,
    // serializes read-modify-write within this process
    write_lock: Mutex<()>,
}

impl<S: AttendanceStore> AttendanceResolver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.store.load().await
    }

    /// Like `list_all`, but an unreachable store reads as an empty log.
    /// Corrupt data is still reported.
    pub async fn list_all_or_empty(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        empty_if_unavailable(self.store.load().await)
    }

    pub async fn most_recent(
        &self,
        employee_id: &str,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let records = self.store.load().await?;
        Ok(latest_for(records, employee_id.trim()))
    }

    pub async fn determine_next(
        &self,
        employee_id: &str,
        target_branch: &str,
    ) -> Result<NextEvent, StoreError> {
        let previous = self.most_recent(employee_id).await?;
        Ok(next_event(previous.as_ref(), target_branch.trim()))
    }

    pub async fn record_event(
        &self,
        employee_id: &str,
        employee_name: &str,
        target_branch: &str,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.record_event_at(employee_id, employee_name, target_branch, Local::now())
            .await
    }

    /// Records the next expected event as of `at`.
    #[instrument(name = "record_attendance", skip(self, employee_name, at))]
    pub async fn record_event_at(
        &self,
        employee_id: &str,
        employee_name: &str,
        target_branch: &str,
        at: DateTime<Local>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let employee_id = employee_id.trim();
        let target_branch = target_branch.trim();

        if employee_id.is_empty() {
            return Err(AttendanceError::Validation("employee_id must not be empty".into()));
        }
        if target_branch.is_empty() {
            return Err(AttendanceError::Validation("branch must not be empty".into()));
        }

        let _guard = self.write_lock.lock().await;

        let records = self.store.load().await?;
        let candidate_id = crate::model::attendance::record_id(employee_id, at.timestamp_millis());
        if records.iter().any(|r| r.id == candidate_id) {
            warn!(id = %candidate_id, "Rejecting duplicate attendance submission");
            return Err(AttendanceError::DuplicateSubmission(candidate_id));
        }

        let previous = latest_for(records, employee_id);
        let next = next_event(previous.as_ref(), target_branch);
        debug!(event_type = %next.event_type, reason = next.reason, "Resolved next event");

        let record = AttendanceRecord::new(
            employee_id,
            employee_name.trim(),
            target_branch,
            next.event_type,
            at,
        );

        self.store.append(record.clone()).await?;

        info!(id = %record.id, event_type = %record.event_type, "Attendance recorded");
        Ok(record)
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records = self.store.load().await?;
        newest_first(&mut records);
        records.truncate(limit);
        Ok(records)
    }

    pub async fn history(
        &self,
        employee_id: &str,
        limit: usize,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records: Vec<_> = self
            .store
            .load()
            .await?
            .into_iter()
            .filter(|r| r.employee_id == employee_id.trim())
            .collect();
        newest_first(&mut records);
        records.truncate(limit);
        Ok(records)
    }
}

fn latest_for(records: Vec<AttendanceRecord>, employee_id: &str) -> Option<AttendanceRecord> {
    let mut mine: Vec<_> = records
        .into_iter()
        .filter(|r| r.employee_id == employee_id)
        .collect();
    newest_first(&mut mine);
    mine.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::store::InMemoryStore;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn record(
        employee_id: &str,
        branch: &str,
        event_type: EventType,
        offset_min: i64,
    ) -> AttendanceRecord {
        AttendanceRecord::new(
            employee_id,
            "Jane",
            branch,
            event_type,
            base() + Duration::minutes(offset_min),
        )
    }

    fn resolver() -> AttendanceResolver<InMemoryStore> {
        AttendanceResolver::new(InMemoryStore::new())
    }

    #[test]
    fn no_history_means_check_in() {
        let next = next_event(None, "north");
        assert_eq!(next.event_type, EventType::CheckIn);
        assert_eq!(next.reason, "first entry of the day");
    }

    #[test]
    fn check_in_then_same_branch_checks_out_other_branch_transfers() {
        let prev = record("E1", "north", EventType::CheckIn, 0);

        assert_eq!(next_event(Some(&prev), "north").event_type, EventType::CheckOut);
        assert_eq!(next_event(Some(&prev), "south").event_type, EventType::Transfer);
    }

    #[test]
    fn transfer_and_check_out_ignore_branch() {
        let transfer = record("E1", "south", EventType::Transfer, 0);
        let check_out = record("E1", "north", EventType::CheckOut, 0);

        for branch in ["north", "south", "east"] {
            assert_eq!(next_event(Some(&transfer), branch).event_type, EventType::CheckOut);
            assert_eq!(next_event(Some(&check_out), branch).event_type, EventType::CheckIn);
        }
    }

    #[test]
    fn unknown_previous_event_falls_back_to_check_in() {
        let prev = record("E1", "north", EventType::Unknown("break".into()), 0);
        let next = next_event(Some(&prev), "north");

        assert_eq!(next.event_type, EventType::CheckIn);
        assert_eq!(next.reason, "fallback default");
    }

    #[actix_web::test]
    async fn most_recent_filters_by_employee_and_picks_latest() {
        let store = InMemoryStore::with_records(vec![
            record("E1", "north", EventType::CheckIn, 0),
            record("E2", "north", EventType::CheckIn, 30),
            record("E1", "north", EventType::CheckOut, 10),
        ]);
        let resolver = AttendanceResolver::new(store);

        let latest = resolver.most_recent("E1").await.unwrap().unwrap();
        assert_eq!(latest.event_type, EventType::CheckOut);
        assert!(resolver.most_recent("E9").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn scenario_check_in_then_check_out_or_transfer() {
        let resolver = resolver();

        let next = resolver.determine_next("E1", "north").await.unwrap();
        assert_eq!(next.event_type, EventType::CheckIn);

        let stored = resolver
            .record_event_at("E1", "Jane", "north", base())
            .await
            .unwrap();
        assert_eq!(stored.event_type, EventType::CheckIn);
        assert_eq!(stored.employee_name, "Jane");

        let at_north = resolver.determine_next("E1", "north").await.unwrap();
        let at_south = resolver.determine_next("E1", "south").await.unwrap();
        assert_eq!(at_north.event_type, EventType::CheckOut);
        assert_eq!(at_south.event_type, EventType::Transfer);
    }

    #[actix_web::test]
    async fn recorded_event_is_the_most_recent() {
        let resolver = resolver();
        resolver
            .record_event_at("E1", "Jane", "north", base())
            .await
            .unwrap();
        let second = resolver
            .record_event_at("E1", "Jane", "south", base() + Duration::minutes(5))
            .await
            .unwrap();

        assert_eq!(second.event_type, EventType::Transfer);
        assert_eq!(resolver.most_recent("E1").await.unwrap(), Some(second));
    }

    #[actix_web::test]
    async fn full_shift_walks_the_state_machine() {
        let resolver = resolver();
        let steps = [
            ("north", EventType::CheckIn),
            ("south", EventType::Transfer),
            ("south", EventType::CheckOut),
            ("east", EventType::CheckIn),
            ("east", EventType::CheckOut),
        ];

        for (i, (branch, expected)) in steps.into_iter().enumerate() {
            let at = base() + Duration::minutes(i as i64);
            let stored = resolver.record_event_at("E1", "Jane", branch, at).await.unwrap();
            assert_eq!(stored.event_type, expected, "step {i} at {branch}");
        }
    }

    #[actix_web::test]
    async fn recent_is_bounded_descending_and_idempotent() {
        let resolver = resolver();
        for i in 0..15 {
            let employee = format!("E{}", i % 4);
            resolver
                .record_event_at(&employee, "Jane", "north", base() + Duration::seconds(i))
                .await
                .unwrap();
        }

        let first = resolver.recent(DEFAULT_RECENT_LIMIT).await.unwrap();
        let second = resolver.recent(DEFAULT_RECENT_LIMIT).await.unwrap();

        assert_eq!(first.len(), DEFAULT_RECENT_LIMIT);
        assert!(first.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert_eq!(first, second);
        assert_eq!(resolver.recent(100).await.unwrap().len(), 15);
    }

    #[actix_web::test]
    async fn history_only_returns_that_employee() {
        let resolver = resolver();
        resolver.record_event_at("E1", "Jane", "north", base()).await.unwrap();
        resolver
            .record_event_at("E2", "Omar", "north", base() + Duration::seconds(1))
            .await
            .unwrap();
        resolver
            .record_event_at("E1", "Jane", "north", base() + Duration::seconds(2))
            .await
            .unwrap();

        let history = resolver.history("E1", 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| r.employee_id == "E1"));
        assert_eq!(history[0].event_type, EventType::CheckOut);
    }

    #[actix_web::test]
    async fn same_millisecond_resubmission_is_rejected() {
        let resolver = resolver();
        resolver.record_event_at("E1", "Jane", "north", base()).await.unwrap();

        let err = resolver
            .record_event_at("E1", "Jane", "north", base())
            .await
            .unwrap_err();

        assert!(matches!(err, AttendanceError::DuplicateSubmission(_)));
        assert_eq!(resolver.list_all().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn blank_inputs_are_rejected_before_touching_the_store() {
        let resolver = resolver();

        let err = resolver.record_event_at("  ", "Jane", "north", base()).await.unwrap_err();
        assert!(matches!(err, AttendanceError::Validation(_)));

        let err = resolver.record_event_at("E1", "Jane", "", base()).await.unwrap_err();
        assert!(matches!(err, AttendanceError::Validation(_)));

        assert!(resolver.list_all().await.unwrap().is_empty());
    }

    #[test]
    fn only_unavailable_storage_degrades_to_empty() {
        let unavailable = Err(StoreError::StorageUnavailable("no disk".into()));
        let corrupt = Err(StoreError::CorruptData("bad json".into()));

        assert!(empty_if_unavailable(unavailable).unwrap().is_empty());
        assert!(matches!(empty_if_unavailable(corrupt), Err(StoreError::CorruptData(_))));
    }

    #[actix_web::test]
    async fn padded_inputs_resolve_like_recording_does() {
        let resolver = resolver();
        resolver
            .record_event_at(" E1 ", "Jane", "north ", base())
            .await
            .unwrap();

        let next = resolver.determine_next("E1 ", " north").await.unwrap();
        assert_eq!(next.event_type, EventType::CheckOut);

        let stored = resolver
            .record_event_at("E1", "Jane", "north ", base() + Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(stored.event_type, next.event_type);
        assert_eq!(resolver.history(" E1", 10).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn equal_timestamps_keep_storage_order() {
        let first = record("E1", "north", EventType::CheckIn, 0);
        let mut second = record("E1", "south", EventType::Transfer, 0);
        second.id = "E1_other".into();
        let resolver =
            AttendanceResolver::new(InMemoryStore::with_records(vec![first.clone(), second]));

        assert_eq!(resolver.most_recent("E1").await.unwrap(), Some(first));
    }
}
