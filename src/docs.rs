use crate::api::attendance::CheckInReq;
use crate::api::leave_request::CreateLeave;
use crate::api::stats::DayKindView;
use crate::model::attendance::{AttendanceRecord, ManualLog, PresenceMarker};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::role::Role;
use crate::model::user::{Location, PresenceStatus, User};
use crate::service::attendance::StatusView;
use crate::service::directory::ProfileUpdate;
use crate::service::reports::ReportRow;
use crate::service::stats::{Breakdown, DayKind, DayOverview, MonthlyStats, YearlyStats};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Attendance Tracker

Check-in/check-out tracking, leave requests and attendance statistics for a
small organization.

### 🔹 Key Features
- **Attendance**
  - Check in with a location, check out into a daily log, log time by hand
- **Leave Management**
  - Apply for leave, approve or reject requests; approved days appear in the log
- **Statistics**
  - Monthly and financial-year summaries with late penalties, seven-day overview
- **Reports**
  - Flat attendance report joined with user details

### 🔐 Security
Every endpoint expects a **JWT Bearer** access token.
Approvals, reports and cross-user reads are restricted to **Administrator**.
"#,
    ),
    paths(
        crate::api::attendance::get_status,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::add_manual_log,
        crate::api::attendance::get_logs,
        crate::api::attendance::get_all_logs,
        crate::api::attendance::get_unsynced_logs,
        crate::api::attendance::mark_synced,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::pending_leaves,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::stats::monthly,
        crate::api::stats::yearly,
        crate::api::stats::weekly,
        crate::api::stats::day_kind_of,

        crate::api::reports::attendance_report,

        crate::api::users::list_users,
        crate::api::users::me,
        crate::api::users::update_me,
        crate::api::users::reset_data
    ),
    components(
        schemas(
            CheckInReq,
            StatusView,
            AttendanceRecord,
            ManualLog,
            PresenceMarker,
            CreateLeave,
            LeaveRequest,
            LeaveStatus,
            Role,
            User,
            Location,
            PresenceStatus,
            ProfileUpdate,
            ReportRow,
            Breakdown,
            MonthlyStats,
            YearlyStats,
            DayOverview,
            DayKind,
            DayKindView
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Check-in, check-out and attendance logs"),
        (name = "Leave", description = "Leave requests and decisions"),
        (name = "Stats", description = "Attendance statistics"),
        (name = "Reports", description = "Attendance reports"),
        (name = "Users", description = "User directory"),
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
