use crate::attendance::resolver::empty_if_unavailable;
use crate::attendance::{AttendanceResolver, StoreBackend};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AttendanceError;
use crate::model::attendance::AttendanceRecord;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

pub type AppResolver = AttendanceResolver<StoreBackend>;

/// Upper bound for `limit` query parameters
const MAX_LIMIT: usize = 500;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct RecordAttendance {
    #[schema(example = "E1")]
    pub employee_id: String,
    #[schema(example = "Jane")]
    pub employee_name: String,
    #[schema(example = "north")]
    pub branch: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    #[schema(example = 10)]
    /// Maximum number of records, defaults to the configured recent limit
    pub limit: Option<usize>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct NextEventQuery {
    #[schema(example = "E1")]
    pub employee_id: String,
    #[schema(example = "north")]
    /// Branch the employee is at now
    pub branch: String,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "employee_id": "E1",
    "branch": "north",
    "event_type": "check-out",
    "reason": "leaving the current branch"
}))]
pub struct NextEventResponse {
    pub employee_id: String,
    pub branch: String,
    #[schema(example = "check-out")]
    pub event_type: String,
    #[schema(example = "leaving the current branch")]
    pub reason: String,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub total: usize,
}

fn effective_limit(requested: Option<usize>, config: &Config) -> usize {
    requested.unwrap_or(config.recent_limit).min(MAX_LIMIT)
}

fn list_response(records: Vec<AttendanceRecord>) -> HttpResponse {
    HttpResponse::Ok().json(AttendanceListResponse {
        total: records.len(),
        data: records,
    })
}

/// Record the next attendance event for an employee
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = RecordAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 400, description = "Blank employee_id or branch", body = Object, example = json!({
            "message": "branch must not be empty"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Duplicate submission"),
        (status = 503, description = "Attendance storage unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn record_event(
    auth: AuthUser,
    resolver: web::Data<AppResolver>,
    payload: web::Json<RecordAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_access_to(payload.employee_id.trim())?;

    let record = resolver
        .record_event(&payload.employee_id, &payload.employee_name, &payload.branch)
        .await
        .map_err(|e| {
            if !matches!(e, AttendanceError::Validation(_)) {
                error!(
                    error = %e,
                    employee_id = %payload.employee_id,
                    "Recording attendance failed"
                );
            }
            e
        })?;

    Ok(HttpResponse::Created().json(record))
}

/// List every stored attendance record
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (
            status = 200,
            description = "All attendance records in storage order",
            body = AttendanceListResponse
        ),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager/Admin only"),
        (status = 500, description = "Stored data is corrupt")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_all(
    auth: AuthUser,
    resolver: web::Data<AppResolver>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let records = resolver
        .list_all_or_empty()
        .await
        .map_err(AttendanceError::from)?;

    Ok(list_response(records))
}

/// Most recent attendance records across all employees
#[utoipa::path(
    get,
    path = "/api/attendance/recent",
    params(LimitQuery),
    responses(
        (status = 200, description = "Newest records first", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Stored data is corrupt")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn recent(
    _auth: AuthUser,
    resolver: web::Data<AppResolver>,
    config: web::Data<Config>,
    query: web::Query<LimitQuery>,
) -> actix_web::Result<impl Responder> {
    let limit = effective_limit(query.limit, &config);

    let records =
        empty_if_unavailable(resolver.recent(limit).await).map_err(AttendanceError::from)?;

    Ok(list_response(records))
}

/// What the employee is expected to log next at a branch
#[utoipa::path(
    get,
    path = "/api/attendance/next",
    params(NextEventQuery),
    responses(
        (status = 200, description = "Next expected event", body = NextEventResponse),
        (status = 400, description = "Blank employee_id or branch"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 503, description = "Attendance storage unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn next_event(
    auth: AuthUser,
    resolver: web::Data<AppResolver>,
    query: web::Query<NextEventQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = query.employee_id.trim();
    let branch = query.branch.trim();

    if employee_id.is_empty() || branch.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "employee_id and branch are required"
        })));
    }

    auth.require_access_to(employee_id)?;

    let next = resolver
        .determine_next(employee_id, branch)
        .await
        .map_err(AttendanceError::from)?;

    Ok(HttpResponse::Ok().json(NextEventResponse {
        employee_id: employee_id.to_string(),
        branch: branch.to_string(),
        event_type: next.event_type.to_string(),
        reason: next.reason.to_string(),
    }))
}

/// Latest attendance record of one employee
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}/latest",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Latest record", body = AttendanceRecord),
        (status = 404, description = "No attendance recorded", body = Object, example = json!({
            "message": "No attendance recorded for this employee"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 503, description = "Attendance storage unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn latest(
    auth: AuthUser,
    resolver: web::Data<AppResolver>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_access_to(&employee_id)?;

    let record = resolver
        .most_recent(&employee_id)
        .await
        .map_err(AttendanceError::from)?;

    match record {
        Some(r) => Ok(HttpResponse::Ok().json(r)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "No attendance recorded for this employee"
        }))),
    }
}

/// Attendance history of one employee, newest first
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}/history",
    params(
        ("employee_id", Path, description = "Employee ID"),
        LimitQuery
    ),
    responses(
        (status = 200, description = "Employee history", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 503, description = "Attendance storage unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn history(
    auth: AuthUser,
    resolver: web::Data<AppResolver>,
    config: web::Data<Config>,
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_access_to(&employee_id)?;

    let limit = effective_limit(query.limit, &config);
    let records = resolver
        .history(&employee_id, limit)
        .await
        .map_err(AttendanceError::from)?;

    Ok(list_response(records))
}
