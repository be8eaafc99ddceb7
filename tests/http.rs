mod common;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{App, test};
use attendance_tracker::auth::jwt::generate_access_token;
use attendance_tracker::config::Config;
use attendance_tracker::model::role::Role;
use attendance_tracker::routes;
use chrono::Duration;
use common::{Harness, utc};
use serde_json::{Value, json};

const SECRET: &str = "test-secret";

fn config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        jwt_secret: SECRET.into(),
        server_addr: "127.0.0.1:0".into(),
        rate_protected_per_min: 1000,
        api_prefix: "/api".into(),
        utc_offset_minutes: 0,
        seed_default_users: true,
    }
}

fn bearer(user_id: &str, username: &str, role: Role) -> (&'static str, String) {
    let token = generate_access_token(user_id, username, role, SECRET, 3600).unwrap();
    ("Authorization", format!("Bearer {}", token))
}

fn staff_token() -> (&'static str, String) {
    bearer("staff01", "Jomit", Role::Staff)
}

fn admin_token() -> (&'static str, String) {
    bearer("admin01", "Admin", Role::Admin)
}

fn req(builder: test::TestRequest) -> test::TestRequest {
    builder.peer_addr("127.0.0.1:40000".parse().unwrap())
}

macro_rules! app {
    ($h:expr) => {{
        let config = config();
        test::init_service(
            App::new()
                .app_data(Data::new($h.services.clone()))
                .app_data(Data::new(config.clone()))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let h = Harness::at(utc(2024, 6, 3, 9, 0)).await;
    let app = app!(h);

    let resp = test::call_service(
        &app,
        req(test::TestRequest::get().uri("/api/attendance/status")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn check_in_and_out_over_http() {
    let h = Harness::at(utc(2024, 6, 3, 8, 45)).await;
    let app = app!(h);

    let resp = test::call_service(
        &app,
        req(test::TestRequest::post().uri("/api/attendance/check-in"))
            .insert_header(staff_token())
            .set_json(json!({"lat": 9.93, "lng": 76.26, "address": "Head Office"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let status: Value = test::call_and_read_body_json(
        &app,
        req(test::TestRequest::get().uri("/api/attendance/status"))
            .insert_header(staff_token())
            .to_request(),
    )
    .await;
    assert_eq!(status["status"], "in");

    h.clock.advance(Duration::minutes(135));

    let record: Value = test::call_and_read_body_json(
        &app,
        req(test::TestRequest::post().uri("/api/attendance/check-out"))
            .insert_header(staff_token())
            .to_request(),
    )
    .await;
    assert_eq!(record["duration"], "2h 15m");
    assert_eq!(record["checkIn"], "08:45");
    assert_eq!(record["type"], "Office");
    assert_eq!(record["userId"], "staff01");

    let resp = test::call_service(
        &app,
        req(test::TestRequest::post().uri("/api/attendance/check-out"))
            .insert_header(staff_token())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User is not checked in");
}

#[actix_web::test]
async fn staff_cannot_reach_admin_routes() {
    let h = Harness::at(utc(2024, 6, 3, 9, 0)).await;
    let app = app!(h);

    for uri in [
        "/api/attendance/all",
        "/api/leave/pending",
        "/api/reports/attendance",
        "/api/attendance/logs?user_id=admin01",
    ] {
        let resp = test::call_service(
            &app,
            req(test::TestRequest::get().uri(uri))
                .insert_header(staff_token())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[actix_web::test]
async fn leave_flow_over_http() {
    let h = Harness::at(utc(2024, 5, 20, 10, 0)).await;
    let app = app!(h);

    let leave: Value = test::call_and_read_body_json(
        &app,
        req(test::TestRequest::post().uri("/api/leave"))
            .insert_header(staff_token())
            .set_json(json!({
                "startDate": "2024-06-01",
                "endDate": "2024-06-03",
                "type": "Casual Leave",
                "reason": "Family function"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(leave["status"], "Pending");
    let leave_id = leave["id"].as_str().unwrap().to_string();

    let pending: Value = test::call_and_read_body_json(
        &app,
        req(test::TestRequest::get().uri("/api/leave/pending"))
            .insert_header(admin_token())
            .to_request(),
    )
    .await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let approved: Value = test::call_and_read_body_json(
        &app,
        req(test::TestRequest::put().uri(&format!("/api/leave/{}/approve", leave_id)))
            .insert_header(admin_token())
            .to_request(),
    )
    .await;
    assert_eq!(approved["status"], "Approved");
    assert_eq!(approved["actionBy"], "admin01");

    let logs: Value = test::call_and_read_body_json(
        &app,
        req(test::TestRequest::get().uri("/api/attendance/logs"))
            .insert_header(staff_token())
            .to_request(),
    )
    .await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0]["id"], "att_staff01_2024-06-03");
    assert_eq!(logs[0]["location"], "On Leave");

    let resp = test::call_service(
        &app,
        req(test::TestRequest::put().uri("/api/leave/l0/approve"))
            .insert_header(admin_token())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn profile_can_be_read_and_updated() {
    let h = Harness::at(utc(2024, 6, 3, 9, 0)).await;
    let app = app!(h);

    let user: Value = test::call_and_read_body_json(
        &app,
        req(test::TestRequest::put().uri("/api/users/me"))
            .insert_header(staff_token())
            .set_json(json!({"phone": "+91 90000 00000"}))
            .to_request(),
    )
    .await;
    assert_eq!(user["phone"], "+91 90000 00000");
    assert_eq!(user["dept"], "IT Department");

    let me: Value = test::call_and_read_body_json(
        &app,
        req(test::TestRequest::get().uri("/api/users/me"))
            .insert_header(staff_token())
            .to_request(),
    )
    .await;
    assert_eq!(me["username"], "Jomit");
    assert_eq!(me["phone"], "+91 90000 00000");
}

#[actix_web::test]
async fn day_kind_follows_the_office_calendar() {
    let h = Harness::at(utc(2024, 6, 3, 9, 0)).await;
    let app = app!(h);

    for (day, kind) in [
        ("2024-06-01", "Half Day"),
        ("2024-06-08", "Holiday"),
        ("2024-06-09", "Holiday"),
        ("2024-06-10", "Work Day"),
    ] {
        let body: Value = test::call_and_read_body_json(
            &app,
            req(test::TestRequest::get().uri(&format!("/api/stats/day-kind?date={}", day)))
                .insert_header(staff_token())
                .to_request(),
        )
        .await;
        assert_eq!(body["kind"], kind, "{}", day);
        assert_eq!(body["date"], day);
    }
}

#[actix_web::test]
async fn reset_is_admin_only_and_keeps_leaves() {
    let h = Harness::at(utc(2024, 6, 3, 9, 0)).await;
    let app = app!(h);

    test::call_service(
        &app,
        req(test::TestRequest::post().uri("/api/leave"))
            .insert_header(staff_token())
            .set_json(json!({"startDate": "2024-06-10", "endDate": "2024-06-10", "type": "Sick Leave"}))
            .to_request(),
    )
    .await;

    let resp = test::call_service(
        &app,
        req(test::TestRequest::post().uri("/api/users/reset"))
            .insert_header(staff_token())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = test::call_service(
        &app,
        req(test::TestRequest::post().uri("/api/users/reset"))
            .insert_header(admin_token())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let users: Value = test::call_and_read_body_json(
        &app,
        req(test::TestRequest::get().uri("/api/users"))
            .insert_header(admin_token())
            .to_request(),
    )
    .await;
    assert_eq!(users, json!([]));

    let pending = h.services.leaves.get_pending_leaves().await.unwrap();
    assert_eq!(pending.len(), 1);
}

#[actix_web::test]
async fn inverted_leave_range_is_filed_as_is() {
    let h = Harness::at(utc(2024, 6, 3, 9, 0)).await;
    let app = app!(h);

    let resp = test::call_service(
        &app,
        req(test::TestRequest::post().uri("/api/leave"))
            .insert_header(staff_token())
            .set_json(json!({"startDate": "2024-06-12", "endDate": "2024-06-10", "type": "Sick Leave"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let leave: Value = test::read_body_json(resp).await;

    let id = leave["id"].as_str().unwrap().to_string();
    let resp = test::call_service(
        &app,
        req(test::TestRequest::put().uri(&format!("/api/leave/{}/approve", id)))
            .insert_header(admin_token())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(h.services.ledger.get_all_logs().await.unwrap().is_empty());
}
