use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use utoipa::ToSchema;

/// Kind of time-clock event.
///
/// Stored as a kebab-case string. Anything the service does not recognise
/// is kept verbatim in `Unknown` so a foreign record never breaks a load.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(from = "String", into = "String")]
pub enum EventType {
    CheckIn,
    CheckOut,
    Transfer,
    #[strum(default)]
    Unknown(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::CheckIn => "check-in",
            EventType::CheckOut => "check-out",
            EventType::Transfer => "transfer",
            EventType::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EventType {
    fn from(raw: String) -> Self {
        match raw.parse() {
            Ok(event_type) => event_type,
            Err(_) => EventType::Unknown(raw),
        }
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

pub const DATE_FORMAT: &str = "%d/%m/%Y";
pub const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "E1_1767254400000",
        "employeeId": "E1",
        "employeeName": "Jane",
        "branch": "north",
        "eventType": "check-in",
        "date": "01/01/2026",
        "time": "08:00:00",
        "timestamp": 1767254400000i64
    })
)]
pub struct AttendanceRecord {
    #[schema(example = "E1_1767254400000")]
    pub id: String,

    #[schema(example = "E1")]
    pub employee_id: String,

    #[schema(example = "Jane")]
    pub employee_name: String,

    #[schema(example = "north")]
    pub branch: String,

    #[schema(example = "check-in", value_type = String)]
    pub event_type: EventType,

    /// Display only, do not sort on it
    #[schema(example = "01/01/2026")]
    pub date: String,

    /// Display only, do not sort on it
    #[schema(example = "08:00:00")]
    pub time: String,

    /// Epoch milliseconds
    #[schema(example = 1767254400000i64)]
    pub timestamp: i64,
}

impl AttendanceRecord {
    pub fn new(
        employee_id: &str,
        employee_name: &str,
        branch: &str,
        event_type: EventType,
        at: DateTime<Local>,
    ) -> Self {
        let timestamp = at.timestamp_millis();

        Self {
            id: record_id(employee_id, timestamp),
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            branch: branch.to_string(),
            event_type,
            date: at.format(DATE_FORMAT).to_string(),
            time: at.format(TIME_FORMAT).to_string(),
            timestamp,
        }
    }
}

pub fn record_id(employee_id: &str, timestamp: i64) -> String {
    format!("{}_{}", employee_id, timestamp)
}
