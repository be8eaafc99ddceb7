use crate::auth::auth::AuthUser;
use crate::service::Services;
use crate::service::stats::{DayKind, day_kind};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams)]
pub struct StatsQuery {
    /// Defaults to the caller
    pub user_id: Option<String>,
}

impl StatsQuery {
    fn target(&self, auth: &AuthUser) -> actix_web::Result<String> {
        match self.user_id.as_deref() {
            Some(user_id) => {
                auth.require_self_or_admin(user_id)?;
                Ok(user_id.to_string())
            }
            None => Ok(auth.user_id.clone()),
        }
    }
}

/// Current-month summary
#[utoipa::path(
    get,
    path = "/api/stats/monthly",
    params(StatsQuery),
    responses(
        (status = 200, description = "Monthly stats", body = crate::service::stats::MonthlyStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Stats"
)]
pub async fn monthly(
    auth: AuthUser,
    services: web::Data<Services>,
    query: web::Query<StatsQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = query.target(&auth)?;
    let stats = services.stats.get_user_monthly_stats(&user_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Financial-year summary
#[utoipa::path(
    get,
    path = "/api/stats/yearly",
    params(StatsQuery),
    responses(
        (status = 200, description = "Yearly stats", body = crate::service::stats::YearlyStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Stats"
)]
pub async fn yearly(
    auth: AuthUser,
    services: web::Data<Services>,
    query: web::Query<StatsQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = query.target(&auth)?;
    let stats = services.stats.get_user_yearly_stats(&user_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Present and on-leave head counts for the last seven days
#[utoipa::path(
    get,
    path = "/api/stats/weekly",
    responses(
        (status = 200, description = "Seven-day overview", body = Vec<crate::service::stats::DayOverview>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Stats"
)]
pub async fn weekly(
    auth: AuthUser,
    services: web::Data<Services>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let overview = services.stats.weekly_overview().await?;
    Ok(HttpResponse::Ok().json(overview))
}

#[derive(Deserialize, IntoParams)]
pub struct DayKindQuery {
    /// Calendar date, `YYYY-MM-DD`
    #[param(value_type = String, example = "2024-06-08")]
    pub date: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct DayKindView {
    #[schema(example = "2024-06-08", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub kind: DayKind,
}

/// Work day, half day or holiday under the office calendar
#[utoipa::path(
    get,
    path = "/api/stats/day-kind",
    params(DayKindQuery),
    responses(
        (status = 200, description = "Kind of the given day", body = DayKindView),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Stats"
)]
pub async fn day_kind_of(
    _auth: AuthUser,
    query: web::Query<DayKindQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date;
    Ok(HttpResponse::Ok().json(DayKindView {
        date,
        kind: day_kind(date),
    }))
}
