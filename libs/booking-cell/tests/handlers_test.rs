// libs/booking-cell/tests/handlers_test.rs
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::router::booking_routes;
use shared_utils::test_utils::{MockStoreResponses, TestConfig, TestIdentity};

async fn create_test_app(mock_server: &MockServer) -> Router {
    booking_routes(TestConfig::with_postgrest_url(&mock_server.uri()).to_arc())
}

fn status_update_row(booking_id: &str, old_status: Option<&str>, new_status: &str) -> Value {
    json!({
        "id": Uuid::new_v4().to_string(),
        "booking_id": booking_id,
        "old_status": old_status,
        "new_status": new_status,
        "updated_by": Uuid::new_v4().to_string(),
        "reason": "Booking created",
        "created_at": "2026-01-10T10:00:00Z"
    })
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ==============================================================================
// IDENTITY ENFORCEMENT
// ==============================================================================

#[tokio::test]
async fn requests_without_identity_headers_are_unauthenticated() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn count_is_served_without_identity_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(query_param("select", "count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "count": 7 }])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let request = Request::builder()
        .method("GET")
        .uri("/count")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["count"], 7);
}

// ==============================================================================
// CREATION
// ==============================================================================

#[tokio::test]
async fn create_booking_returns_the_stored_row() {
    let mock_server = MockServer::start().await;
    let caller = TestIdentity::patient();
    let booking_id = Uuid::new_v4().to_string();

    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::booking_row(&booking_id, &caller.user_id, "pending")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/booking_status_updates"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            status_update_row(&booking_id, None, "pending")
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let request = caller.request(
        "POST",
        "/",
        Some(json!({
            "call_type": "urgent",
            "symptoms": "fever",
            "address": "Tverskaya 1",
            "latitude": 55.7558,
            "longitude": 37.6176
        })),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["id"], booking_id);
    assert_eq!(body["status"], "pending");
}

// ==============================================================================
// ACCESS CONTROL OVER HTTP
// ==============================================================================

#[tokio::test]
async fn strangers_get_forbidden_on_read() {
    let mock_server = MockServer::start().await;
    let booking_id = Uuid::new_v4().to_string();
    let owner_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::booking_row(&booking_id, &owner_id, "pending")
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let stranger = TestIdentity::patient();
    let request = stranger.request("GET", &format!("/{}", booking_id), None);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn patients_cannot_assign_doctors() {
    let mock_server = MockServer::start().await;
    let caller = TestIdentity::patient();
    let booking_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::booking_row(&booking_id, &caller.user_id, "pending")
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let request = caller.request("PUT", &format!("/{}/assign?doctor_id=d-1", booking_id), None);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ==============================================================================
// TRANSITION CONFLICTS
// ==============================================================================

#[tokio::test]
async fn assigning_a_cancelled_booking_conflicts() {
    let mock_server = MockServer::start().await;
    let booking_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::booking_row(&booking_id, "p-1", "cancelled")
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let dispatcher = TestIdentity::admin();
    let request =
        dispatcher.request("PUT", &format!("/{}/assign?doctor_id=d-1", booking_id), None);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = read_json(response).await;
    assert_eq!(body["error"], "Cannot transition booking with status: cancelled");
}

#[tokio::test]
async fn losing_the_transition_race_conflicts() {
    let mock_server = MockServer::start().await;
    let booking_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreResponses::booking_row(&booking_id, "p-1", "pending")
        ])))
        .mount(&mock_server)
        .await;

    // The conditional update matches nothing: a concurrent writer already
    // moved the row on.
    Mock::given(method("PATCH"))
        .and(path("/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .and(query_param("status", "eq.pending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let dispatcher = TestIdentity::admin();
    let request =
        dispatcher.request("PUT", &format!("/{}/assign?doctor_id=d-1", booking_id), None);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn predicate_characters_in_ids_do_not_widen_the_lookup() {
    let mock_server = MockServer::start().await;

    // The whole id must arrive as one predicate value; an unescaped `&`
    // would split it into a second, attacker-chosen predicate.
    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(query_param("id", "eq.evil&status=eq.cancelled"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let caller = TestIdentity::admin();
    let request = caller.request("GET", "/evil%26status%3Deq.cancelled", None);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_bookings_are_not_found() {
    let mock_server = MockServer::start().await;
    let booking_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/bookings"))
        .and(query_param("id", format!("eq.{}", booking_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let caller = TestIdentity::admin();
    let request = caller.request("GET", &format!("/{}", booking_id), None);

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
