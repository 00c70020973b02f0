use crate::api::attendance::{
    AttendanceListResponse, LimitQuery, NextEventQuery, NextEventResponse, RecordAttendance,
};
use crate::model::attendance::AttendanceRecord;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time Clock API",
        version = "0.1.0",
        description = r#"
## Branch Time Clock

Attendance log for store staff. Each submission records the event the
employee is expected to log next:

- **check-in** on first entry or after a check-out
- **check-out** when leaving the branch they checked in at, or after a transfer
- **transfer** when showing up at another branch without checking out

### Security
All endpoints require a **JWT Bearer** token issued by the console backend.
Employees may only see and record their own attendance; listing every record
is limited to **admin** and **manager**.
"#,
    ),
    paths(
        crate::api::attendance::record_event,
        crate::api::attendance::list_all,
        crate::api::attendance::recent,
        crate::api::attendance::next_event,
        crate::api::attendance::latest,
        crate::api::attendance::history
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceListResponse,
            RecordAttendance,
            NextEventQuery,
            NextEventResponse,
            LimitQuery
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Time clock APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
