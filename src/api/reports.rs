use crate::auth::auth::AuthUser;
use crate::service::Services;
use actix_web::{HttpResponse, Responder, web};

/// Attendance report, one row per log joined with its user
#[utoipa::path(
    get,
    path = "/api/reports/attendance",
    responses(
        (status = 200, description = "Report rows, newest date first", body = Vec<crate::service::reports::ReportRow>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Reports"
)]
pub async fn attendance_report(
    auth: AuthUser,
    services: web::Data<Services>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let rows = services.reports.attendance_report().await?;
    Ok(HttpResponse::Ok().json(rows))
}
