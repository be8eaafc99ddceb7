use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceType;
use crate::model::leave_request::{LeaveStatus, NewLeave};
use crate::service::Services;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeave {
    #[schema(example = "2024-06-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    #[schema(example = "Casual Leave", value_type = String)]
    pub kind: AttendanceType,
    #[serde(default)]
    #[schema(example = "Family function")]
    pub reason: String,
}

/// Apply for leave. Dates are taken as given; an end before the start files
/// a request that covers no days.
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body = CreateLeave,
    responses(
        (status = 201, description = "Leave submitted", body = crate::model::leave_request::LeaveRequest),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(name = "leave_create", skip(services, payload), fields(user_id = %auth.user_id))]
pub async fn create_leave(
    auth: AuthUser,
    services: web::Data<Services>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let leave = services
        .leaves
        .request_leave(NewLeave {
            user_id: auth.user_id.clone(),
            start_date: payload.start_date,
            end_date: payload.end_date,
            kind: payload.kind,
            reason: payload.reason,
        })
        .await?;

    Ok(HttpResponse::Created().json(leave))
}

/// Leave history of the caller
#[utoipa::path(
    get,
    path = "/api/leave/mine",
    responses(
        (status = 200, description = "Caller's leave requests", body = Vec<crate::model::leave_request::LeaveRequest>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leaves(
    auth: AuthUser,
    services: web::Data<Services>,
) -> actix_web::Result<impl Responder> {
    let leaves = services.leaves.get_user_leaves(&auth.user_id).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/// Pending leave requests, newest application first
#[utoipa::path(
    get,
    path = "/api/leave/pending",
    responses(
        (status = 200, description = "Pending leave requests", body = Vec<crate::model::leave_request::LeaveRequest>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    services: web::Data<Services>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let leaves = services.leaves.get_pending_leaves().await?;
    Ok(HttpResponse::Ok().json(leaves))
}

async fn decide(
    auth: AuthUser,
    services: web::Data<Services>,
    leave_id: String,
    status: LeaveStatus,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;

    let leave = services
        .leaves
        .update_leave_status(&leave_id, status, &auth.user_id)
        .await?;

    info!(leave_id = %leave.id, status = %leave.status, "leave decided");
    Ok(HttpResponse::Ok().json(leave))
}

/// Approve leave
#[utoipa::path(
    put,
    path = "/api/leave/{id}/approve",
    params(
        ("id" = String, Path, description = "Leave request id")
    ),
    responses(
        (status = 200, description = "Leave approved", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Leave already decided"),
        (status = 404, description = "Leave not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    services: web::Data<Services>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    decide(auth, services, path.into_inner(), LeaveStatus::Approved).await
}

/// Reject leave
#[utoipa::path(
    put,
    path = "/api/leave/{id}/reject",
    params(
        ("id" = String, Path, description = "Leave request id")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Leave already decided"),
        (status = 404, description = "Leave not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    services: web::Data<Services>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    decide(auth, services, path.into_inner(), LeaveStatus::Rejected).await
}
