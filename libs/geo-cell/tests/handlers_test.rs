// libs/geo-cell/tests/handlers_test.rs
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use geo_cell::router::geo_routes;
use shared_utils::test_utils::{MockStoreResponses, TestConfig, TestIdentity};

async fn create_test_app(mock_server: &MockServer) -> Router {
    geo_routes(TestConfig::with_postgrest_url(&mock_server.uri()).to_arc())
}

fn candidate_row(doctor_id: &str, lat: f64, lon: f64) -> Value {
    let location_id = Uuid::new_v4().to_string();
    let mut row = MockStoreResponses::availability_row(doctor_id, &location_id, "therapist");
    row["location"] = MockStoreResponses::location_row(&location_id, doctor_id, "doctor", lat, lon);
    row
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ==============================================================================
// SEARCH
// ==============================================================================

#[tokio::test]
async fn nearby_search_is_public_and_sorted() {
    let mock_server = MockServer::start().await;

    // Unavailable doctors never leave the store: the read itself carries
    // the availability predicate.
    Mock::given(method("GET"))
        .and(path("/doctor_availability"))
        .and(query_param("is_available", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            candidate_row("d-far", 55.7758, 37.6176),
            candidate_row("d-near", 55.7568, 37.6176),
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let request = Request::builder()
        .method("GET")
        .uri("/doctors/nearby?lat=55.7558&lon=37.6176&radius=5")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let doctors = body.as_array().unwrap();
    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0]["doctor_id"], "d-near");
    assert_eq!(doctors[1]["doctor_id"], "d-far");
    assert!(doctors[0]["distance"].as_f64().unwrap() < doctors[1]["distance"].as_f64().unwrap());
    assert!(doctors[0]["estimated_arrival_time"].is_i64());
}

#[tokio::test]
async fn nearby_search_applies_the_radius() {
    let mock_server = MockServer::start().await;

    // Roughly 63 km north of the query point.
    Mock::given(method("GET"))
        .and(path("/doctor_availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            candidate_row("d-far", 56.3258, 37.6176),
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let request = Request::builder()
        .method("GET")
        .uri("/doctors/nearby?lat=55.7558&lon=37.6176")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

// ==============================================================================
// TRACKING
// ==============================================================================

#[tokio::test]
async fn tracking_requires_identity_headers() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;

    let request = Request::builder()
        .method("POST")
        .uri("/track")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "latitude": 55.7558, "longitude": 37.6176 }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tracking_upserts_and_appends_history() {
    let mock_server = MockServer::start().await;
    let caller = TestIdentity::patient();
    let location_id = Uuid::new_v4().to_string();

    Mock::given(method("POST"))
        .and(path("/locations"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreResponses::location_row(&location_id, &caller.user_id, "patient", 55.7558, 37.6176)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/location_history"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": Uuid::new_v4().to_string(),
            "user_id": caller.user_id,
            "latitude": 55.7558,
            "longitude": 37.6176,
            "address": "Moscow",
            "accuracy": 10.0,
            "recorded_at": "2026-01-10T10:00:00Z"
        }])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let request = caller.request(
        "POST",
        "/track",
        Some(json!({
            "latitude": 55.7558,
            "longitude": 37.6176,
            "address": "Moscow",
            "accuracy": 10.0
        })),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["location"]["id"], location_id);
    assert_eq!(body["message"], "Location tracked successfully");
}

#[tokio::test]
async fn predicate_characters_in_user_ids_stay_one_predicate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations"))
        .and(query_param("user_id", "eq.a&is_active=eq.false"))
        .and(query_param("is_active", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let request = Request::builder()
        .method("GET")
        .uri("/location/a%26is_active%3Deq.false")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_locations_are_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server).await;
    let request = Request::builder()
        .method("GET")
        .uri("/location/nobody")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

#[tokio::test]
async fn patients_cannot_update_availability() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server).await;

    let caller = TestIdentity::patient();
    let request = caller.request("PUT", "/availability", Some(json!({ "is_available": true })));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ==============================================================================
// GEOCODING
// ==============================================================================

#[tokio::test]
async fn unresolvable_addresses_are_bad_requests() {
    let geocoder_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "GeoObjectCollection": { "featureMember": [] } }
        })))
        .mount(&geocoder_server)
        .await;

    let config = TestConfig {
        geocoder_url: geocoder_server.uri(),
        ..Default::default()
    };
    let app = geo_routes(config.to_arc());

    let request = Request::builder()
        .method("POST")
        .uri("/geocode")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "address": "nowhere at all" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn geocoding_returns_coordinates() {
    let geocoder_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "GeoObjectCollection": {
                    "featureMember": [{
                        "GeoObject": {
                            "metaDataProperty": {
                                "GeocoderMetaData": { "text": "Москва, Тверская улица, 1" }
                            },
                            "Point": { "pos": "37.6176 55.7558" }
                        }
                    }]
                }
            }
        })))
        .mount(&geocoder_server)
        .await;

    let config = TestConfig {
        geocoder_url: geocoder_server.uri(),
        ..Default::default()
    };
    let app = geo_routes(config.to_arc());

    let request = Request::builder()
        .method("POST")
        .uri("/geocode")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "address": "Тверская 1" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert!((body["latitude"].as_f64().unwrap() - 55.7558).abs() < 1e-9);
    assert!((body["longitude"].as_f64().unwrap() - 37.6176).abs() < 1e-9);
}
