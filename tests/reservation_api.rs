//! End-to-end HTTP tests for accounts, catalog and seat reservation.

mod common;

use axum::http::StatusCode;
use axum::http::header::RETRY_AFTER;
use serde_json::json;

use common::TestApp;
use moviez_core::types::ShowtimeId;

fn days(n: i64) -> chrono::Duration {
    chrono::Duration::days(n)
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], "memory");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new().await;
    let token = app.register_and_login("alice").await;

    let me = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["username"], "alice");
    assert_eq!(me.data()["role"], "USER");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.register_and_login("bob").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "bob",
                "email": "other@example.com",
                "password": "password123",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "INVALID_STATE");
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = TestApp::new().await;
    app.register_and_login("carol").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "carol", "password": "wrong-password1" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/reservations", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/reservations", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_management_is_admin_only() {
    let app = TestApp::new().await;
    let user = app.register_and_login("dave").await;

    let response = app
        .request(
            "POST",
            "/api/movies",
            Some(json!({ "title": "Heat", "genre": "Crime" })),
            Some(&user),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let created = app
        .request(
            "POST",
            "/api/movies",
            Some(json!({ "title": "Heat", "genre": "Crime" })),
            Some(&admin),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.data()["id"].as_str().unwrap().to_string();

    let updated = app
        .request(
            "PUT",
            &format!("/api/movies/{id}"),
            Some(json!({ "description": "L.A. crime saga" })),
            Some(&admin),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["description"], "L.A. crime saga");
    assert_eq!(updated.data()["title"], "Heat");

    let listed = app.request("GET", "/api/movies?page=1&per_page=5", None, None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.data()["total_items"], 1);

    let deleted = app
        .request("DELETE", &format!("/api/movies/{id}"), None, Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let missing = app.request("GET", &format!("/api/movies/{id}"), None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reserve_conflict_cancel_rebook_scenario() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let showtime = app.create_showtime(&admin, days(3), 100).await;
    let alice = app.register_and_login("alice").await;
    let bob = app.register_and_login("bob").await;
    let reserve_path = format!("/api/showtimes/{showtime}/reservations");

    let first = app
        .request(
            "POST",
            &reserve_path,
            Some(json!({ "seat_numbers": [25, 26] })),
            Some(&alice),
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED, "{:?}", first.body);
    assert_eq!(first.data()["status"], "ACTIVE");
    let reservation_id = first.data()["id"].as_str().unwrap().to_string();

    let conflict = app
        .request(
            "POST",
            &reserve_path,
            Some(json!({ "seat_numbers": [26, 27] })),
            Some(&bob),
        )
        .await;
    assert_eq!(conflict.status, StatusCode::CONFLICT);
    assert_eq!(conflict.body["error"], "SEAT_CONFLICT");
    assert_eq!(conflict.body["details"]["conflicting_seats"], json!([26]));

    let seats = app
        .request("GET", &format!("/api/showtimes/{showtime}/seats"), None, None)
        .await;
    assert_eq!(seats.data()["held_seats"], json!([25, 26]));
    assert_eq!(seats.data()["available"], 98);

    let forbidden = app
        .request(
            "POST",
            &format!("/api/reservations/{reservation_id}/cancel"),
            None,
            Some(&bob),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let cancelled = app
        .request(
            "POST",
            &format!("/api/reservations/{reservation_id}/cancel"),
            None,
            Some(&alice),
        )
        .await;
    assert_eq!(cancelled.status, StatusCode::OK);
    assert_eq!(cancelled.data()["status"], "CANCELLED");

    let rebooked = app
        .request(
            "POST",
            &reserve_path,
            Some(json!({ "seat_numbers": [25, 26] })),
            Some(&bob),
        )
        .await;
    assert_eq!(rebooked.status, StatusCode::CREATED);

    let mine = app.request("GET", "/api/reservations", None, Some(&alice)).await;
    assert_eq!(mine.data().as_array().unwrap().len(), 1);
    assert_eq!(mine.data()[0]["status"], "CANCELLED");
}

#[tokio::test]
async fn test_invalid_seat_requests_are_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let showtime = app.create_showtime(&admin, days(1), 10).await;
    let user = app.register_and_login("erin").await;
    let path = format!("/api/showtimes/{showtime}/reservations");

    for seats in [json!([]), json!([0]), json!([11]), json!([3, 3])] {
        let response = app
            .request("POST", &path, Some(json!({ "seat_numbers": seats })), Some(&user))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{seats}");
        assert_eq!(response.body["error"], "INVALID_REQUEST");
    }

    let unknown = app
        .request(
            "POST",
            &format!("/api/showtimes/{}/reservations", ShowtimeId::new()),
            Some(json!({ "seat_numbers": [1] })),
            Some(&user),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_reservation_body_uses_error_envelope() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let showtime = app.create_showtime(&admin, days(1), 10).await;
    let user = app.register_and_login("ivan").await;
    let path = format!("/api/showtimes/{showtime}/reservations");

    for body in [
        json!({ "seat_numbers": [3000000000u64] }),
        json!({ "seat_numbers": ["seven"] }),
        json!({ "seats": [1] }),
    ] {
        let response = app.request("POST", &path, Some(body.clone()), Some(&user)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.body["error"], "INVALID_REQUEST");
    }

    let seats = app
        .request("GET", &format!("/api/showtimes/{showtime}/seats"), None, Some(&user))
        .await;
    assert_eq!(seats.data()["held_seats"], json!([]));
}

#[tokio::test]
async fn test_cancel_inside_lead_window_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let showtime = app
        .create_showtime(&admin, chrono::Duration::minutes(20), 50)
        .await;
    let user = app.register_and_login("frank").await;

    let reserved = app
        .request(
            "POST",
            &format!("/api/showtimes/{showtime}/reservations"),
            Some(json!({ "seat_numbers": [1] })),
            Some(&user),
        )
        .await;
    assert_eq!(reserved.status, StatusCode::CREATED);
    let id = reserved.data()["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/cancel"),
            None,
            Some(&user),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "INVALID_STATE");
}

#[tokio::test]
async fn test_busy_showtime_returns_503_with_retry_after() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let showtime = app.create_showtime(&admin, days(2), 50).await;
    let user = app.register_and_login("gina").await;

    let showtime_id: ShowtimeId = serde_json::from_value(json!(showtime)).unwrap();
    let guard = app.state.reservation_service.guard();
    let _held = guard.acquire(showtime_id).await.unwrap();

    let response = app
        .request(
            "POST",
            &format!("/api/showtimes/{showtime}/reservations"),
            Some(json!({ "seat_numbers": [1] })),
            Some(&user),
        )
        .await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "BUSY");
    assert!(response.headers.get(RETRY_AFTER).is_some());
}

#[tokio::test]
async fn test_reservation_visibility_and_admin_views() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let showtime = app.create_showtime(&admin, days(2), 50).await;
    let owner = app.register_and_login("hank").await;
    let other = app.register_and_login("ivy").await;

    let reserved = app
        .request(
            "POST",
            &format!("/api/showtimes/{showtime}/reservations"),
            Some(json!({ "seat_numbers": [5, 6] })),
            Some(&owner),
        )
        .await;
    let id = reserved.data()["id"].as_str().unwrap().to_string();

    let hidden = app
        .request("GET", &format!("/api/reservations/{id}"), None, Some(&other))
        .await;
    assert_eq!(hidden.status, StatusCode::FORBIDDEN);

    let seen = app
        .request("GET", &format!("/api/reservations/{id}"), None, Some(&admin))
        .await;
    assert_eq!(seen.status, StatusCode::OK);
    assert_eq!(seen.data()["seat_numbers"], json!([5, 6]));

    let listing_path = format!("/api/admin/showtimes/{showtime}/reservations");
    let denied = app.request("GET", &listing_path, None, Some(&owner)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    let listing = app.request("GET", &listing_path, None, Some(&admin)).await;
    assert_eq!(listing.data().as_array().unwrap().len(), 1);

    let reconcile = app
        .request(
            "POST",
            "/api/admin/ledger/reconcile",
            Some(json!({ "showtime_id": showtime })),
            Some(&admin),
        )
        .await;
    assert_eq!(reconcile.status, StatusCode::OK);
    assert_eq!(reconcile.data()[0]["drift"], false);
    assert_eq!(reconcile.data()[0]["stored"], json!([5, 6]));

    let reconcile_all = app
        .request("POST", "/api/admin/ledger/reconcile", None, Some(&admin))
        .await;
    assert_eq!(reconcile_all.status, StatusCode::OK);
}

#[tokio::test]
async fn test_showtime_queries_and_deletion() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let showtime = app.create_showtime(&admin, days(5), 40).await;

    let from = chrono::Utc::now() + days(4);
    let to = chrono::Utc::now() + days(6);
    let window = app
        .request(
            "GET",
            &format!(
                "/api/showtimes?from={}&to={}",
                from.format("%Y-%m-%dT%H:%M:%SZ"),
                to.format("%Y-%m-%dT%H:%M:%SZ")
            ),
            None,
            None,
        )
        .await;
    assert_eq!(window.status, StatusCode::OK, "{:?}", window.body);
    assert_eq!(window.data().as_array().unwrap().len(), 1);

    let detail = app
        .request("GET", &format!("/api/showtimes/{showtime}"), None, None)
        .await;
    let movie_id = detail.data()["movie_id"].as_str().unwrap().to_string();
    let by_movie = app
        .request("GET", &format!("/api/movies/{movie_id}/showtimes"), None, None)
        .await;
    assert_eq!(by_movie.data().as_array().unwrap().len(), 1);

    let blocked = app
        .request("DELETE", &format!("/api/movies/{movie_id}"), None, Some(&admin))
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);

    let deleted = app
        .request("DELETE", &format!("/api/showtimes/{showtime}"), None, Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app
        .request("GET", &format!("/api/showtimes/{showtime}/seats"), None, None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_showtime_schedule_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let movie = app
        .request(
            "POST",
            "/api/movies",
            Some(json!({ "title": "Up", "genre": "Animation" })),
            Some(&admin),
        )
        .await;
    let movie_id = movie.data()["id"].as_str().unwrap().to_string();
    let start = chrono::Utc::now() + days(1);

    let backwards = app
        .request(
            "POST",
            "/api/showtimes",
            Some(json!({
                "movie_id": movie_id,
                "start_time": start,
                "end_time": start - chrono::Duration::hours(1),
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);

    let defaulted = app
        .request(
            "POST",
            "/api/showtimes",
            Some(json!({
                "movie_id": movie_id,
                "start_time": start,
                "end_time": start + chrono::Duration::hours(2),
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(defaulted.status, StatusCode::CREATED);
    assert_eq!(defaulted.data()["capacity"], 100);
}
