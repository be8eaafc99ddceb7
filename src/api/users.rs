use crate::auth::auth::AuthUser;
use crate::service::Services;
use crate::service::directory::ProfileUpdate;
use actix_web::{HttpResponse, Responder, web};
use tracing::instrument;

/// All users (admin)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Every registered user", body = Vec<crate::model::user::User>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    services: web::Data<Services>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let users = services.directory.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Profile of the caller
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Caller profile", body = crate::model::user::User),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn me(auth: AuthUser, services: web::Data<Services>) -> actix_web::Result<impl Responder> {
    let user = services.directory.get_user(&auth.user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Update the caller's profile
#[utoipa::path(
    put,
    path = "/api/users/me",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = crate::model::user::User),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(name = "users_update_profile", skip(services, payload), fields(user_id = %auth.user_id))]
pub async fn update_me(
    auth: AuthUser,
    services: web::Data<Services>,
    payload: web::Json<ProfileUpdate>,
) -> actix_web::Result<impl Responder> {
    let user = services
        .directory
        .update_profile(&auth.user_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Wipe users and attendance (admin). Leave requests are kept.
#[utoipa::path(
    post,
    path = "/api/users/reset",
    responses(
        (status = 204, description = "Users and attendance cleared"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
#[instrument(name = "users_reset", skip(services), fields(user_id = %auth.user_id))]
pub async fn reset_data(
    auth: AuthUser,
    services: web::Data<Services>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    services.directory.reset_data().await?;
    Ok(HttpResponse::NoContent().finish())
}
