use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::attendance::{AttendanceId, ManualLog};
use crate::service::Services;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    #[schema(example = 9.9312)]
    pub lat: f64,
    #[schema(example = 76.2673)]
    pub lng: f64,
    #[schema(example = "Head Office")]
    pub address: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct LogsQuery {
    /// Whose logs to list; defaults to the caller
    pub user_id: Option<String>,
}

/// Current presence state of the caller
#[utoipa::path(
    get,
    path = "/api/attendance/status",
    responses(
        (status = 200, description = "Presence state", body = crate::service::attendance::StatusView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_status(
    auth: AuthUser,
    services: web::Data<Services>,
) -> Result<impl Responder, AppError> {
    let status = services.ledger.get_status(&auth.session()).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = CheckInReq,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_check_in", skip(services, payload), fields(user_id = %auth.user_id))]
pub async fn check_in(
    auth: AuthUser,
    services: web::Data<Services>,
    payload: web::Json<CheckInReq>,
) -> Result<impl Responder, AppError> {
    let payload = payload.into_inner();
    let user = services
        .ledger
        .check_in(&auth.session(), payload.lat, payload.lng, payload.address)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "lastCheckIn": user.last_check_in,
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "User is not checked in", body = Object, example = json!({
            "message": "User is not checked in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Record id collision")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_check_out", skip(services), fields(user_id = %auth.user_id))]
pub async fn check_out(
    auth: AuthUser,
    services: web::Data<Services>,
) -> Result<impl Responder, AppError> {
    let record = services.ledger.check_out(&auth.session()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Log a time entry by hand
#[utoipa::path(
    post,
    path = "/api/attendance/manual",
    request_body = ManualLog,
    responses(
        (status = 201, description = "Manual log created", body = crate::model::attendance::AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Record id collision")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn add_manual_log(
    auth: AuthUser,
    services: web::Data<Services>,
    payload: web::Json<ManualLog>,
) -> Result<impl Responder, AppError> {
    let record = services
        .ledger
        .add_manual_log(&auth.session(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// Attendance logs, most recent first
#[utoipa::path(
    get,
    path = "/api/attendance/logs",
    params(LogsQuery),
    responses(
        (status = 200, description = "Logs of one user", body = Vec<crate::model::attendance::AttendanceRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_logs(
    auth: AuthUser,
    services: web::Data<Services>,
    query: web::Query<LogsQuery>,
) -> actix_web::Result<impl Responder> {
    if let Some(user_id) = query.user_id.as_deref() {
        auth.require_self_or_admin(user_id)?;
    }

    let logs = services
        .ledger
        .get_logs(&auth.session(), query.user_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(logs))
}

/// Every attendance log (admin)
#[utoipa::path(
    get,
    path = "/api/attendance/all",
    responses(
        (status = 200, description = "All logs", body = Vec<crate::model::attendance::AttendanceRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_all_logs(
    auth: AuthUser,
    services: web::Data<Services>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let logs = services.ledger.get_all_logs().await?;
    Ok(HttpResponse::Ok().json(logs))
}

/// Logs not yet pushed upstream (admin)
#[utoipa::path(
    get,
    path = "/api/attendance/unsynced",
    responses(
        (status = 200, description = "Unsynced logs", body = Vec<crate::model::attendance::AttendanceRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_unsynced_logs(
    auth: AuthUser,
    services: web::Data<Services>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let logs = services.ledger.get_unsynced_logs().await?;
    Ok(HttpResponse::Ok().json(logs))
}

/// Flag one log as synced (admin)
#[utoipa::path(
    put,
    path = "/api/attendance/{record_id}/synced",
    params(
        ("record_id" = String, Path, description = "Attendance record id")
    ),
    responses(
        (status = 200, description = "Record marked synced", body = crate::model::attendance::AttendanceRecord),
        (status = 400, description = "Malformed record id"),
        (status = 404, description = "Record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn mark_synced(
    auth: AuthUser,
    services: web::Data<Services>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id: AttendanceId = path
        .into_inner()
        .parse()
        .map_err(actix_web::error::ErrorBadRequest)?;

    let record = services.ledger.mark_synced(&id).await?;
    Ok(HttpResponse::Ok().json(record))
}
