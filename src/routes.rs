use crate::{
    api::{attendance, leave_request, reports, stats, users},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let scope = web::scope(&config.api_prefix)
        .service(
            web::scope("/attendance")
                .service(web::resource("/status").route(web::get().to(attendance::get_status)))
                .service(web::resource("/check-in").route(web::post().to(attendance::check_in)))
                .service(web::resource("/check-out").route(web::post().to(attendance::check_out)))
                .service(
                    web::resource("/manual").route(web::post().to(attendance::add_manual_log)),
                )
                .service(web::resource("/logs").route(web::get().to(attendance::get_logs)))
                .service(web::resource("/all").route(web::get().to(attendance::get_all_logs)))
                .service(
                    web::resource("/unsynced").route(web::get().to(attendance::get_unsynced_logs)),
                )
                // /attendance/{record_id}/synced
                .service(
                    web::resource("/{record_id}/synced")
                        .route(web::put().to(attendance::mark_synced)),
                ),
        )
        .service(
            web::scope("/leave")
                .service(web::resource("").route(web::post().to(leave_request::create_leave)))
                .service(web::resource("/mine").route(web::get().to(leave_request::my_leaves)))
                .service(
                    web::resource("/pending").route(web::get().to(leave_request::pending_leaves)),
                )
                // /leave/{id}/approve
                .service(
                    web::resource("/{id}/approve")
                        .route(web::put().to(leave_request::approve_leave)),
                )
                // /leave/{id}/reject
                .service(
                    web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
                ),
        )
        .service(
            web::scope("/stats")
                .service(web::resource("/monthly").route(web::get().to(stats::monthly)))
                .service(web::resource("/yearly").route(web::get().to(stats::yearly)))
                .service(web::resource("/weekly").route(web::get().to(stats::weekly)))
                .service(web::resource("/day-kind").route(web::get().to(stats::day_kind_of))),
        )
        .service(
            web::scope("/reports").service(
                web::resource("/attendance").route(web::get().to(reports::attendance_report)),
            ),
        )
        .service(
            web::scope("/users")
                .service(web::resource("").route(web::get().to(users::list_users)))
                .service(
                    web::resource("/me")
                        .route(web::get().to(users::me))
                        .route(web::put().to(users::update_me)),
                )
                .service(web::resource("/reset").route(web::post().to(users::reset_data))),
        );

    // Middleware registered last runs first: rate limit, then authentication.
    let scope = scope.wrap(from_fn(auth_middleware));
    match build_limiter(config.rate_protected_per_min) {
        Some(limiter) => cfg.service(scope.wrap(limiter)),
        None => {
            tracing::warn!(
                per_min = config.rate_protected_per_min,
                "invalid rate limit, serving without limiter"
            );
            cfg.service(scope)
        }
    };
}
