use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::identity::{Identity, Role};

pub struct TestConfig {
    pub postgrest_url: String,
    pub postgrest_api_key: String,
    pub geocoder_url: String,
    pub geocoder_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            postgrest_url: "http://localhost:3999".to_string(),
            postgrest_api_key: "test-service-key".to_string(),
            geocoder_url: "http://localhost:3998".to_string(),
            geocoder_api_key: "test-geocoder-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_postgrest_url(url: &str) -> Self {
        Self {
            postgrest_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            postgrest_url: self.postgrest_url.clone(),
            postgrest_api_key: self.postgrest_api_key.clone(),
            geocoder_url: self.geocoder_url.clone(),
            geocoder_api_key: self.geocoder_api_key.clone(),
            geocoder_timeout_ms: 500,
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestIdentity {
    pub user_id: String,
    pub role: Role,
}

impl TestIdentity {
    pub fn new(role: Role) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            role,
        }
    }

    pub fn patient() -> Self {
        Self::new(Role::Patient)
    }

    pub fn doctor() -> Self {
        Self::new(Role::Doctor)
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    pub fn to_identity(&self) -> Identity {
        Identity::new(self.user_id.clone(), Some(self.role))
    }

    /// Build a request carrying the gateway identity headers.
    pub fn request(&self, method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-User-ID", &self.user_id)
            .header("X-User-Role", self.role.to_string())
            .header("content-type", "application/json");

        match body {
            Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }
}

/// Canned PostgREST row payloads used by handler tests.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn booking_row(id: &str, patient_id: &str, status: &str) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": null,
            "clinic_id": null,
            "call_type": "urgent",
            "symptoms": "fever",
            "address": "Tverskaya 1",
            "latitude": 55.7558,
            "longitude": 37.6176,
            "status": status,
            "priority": "normal",
            "scheduled_time": null,
            "created_at": "2026-01-10T10:00:00Z",
            "updated_at": "2026-01-10T10:00:00Z",
            "assigned_at": null,
            "started_at": null,
            "completed_at": null,
            "cancelled_at": null,
            "notes": null,
            "estimated_duration": 60,
            "actual_duration": null,
            "estimated_price": 2500.0,
            "final_price": null,
            "is_emergency": false,
            "emergency_type": null
        })
    }

    pub fn location_row(id: &str, user_id: &str, user_type: &str, lat: f64, lon: f64) -> Value {
        json!({
            "id": id,
            "user_id": user_id,
            "user_type": user_type,
            "latitude": lat,
            "longitude": lon,
            "address": "Moscow",
            "accuracy": 10.0,
            "is_active": true,
            "created_at": "2026-01-10T10:00:00Z",
            "updated_at": "2026-01-10T10:00:00Z"
        })
    }

    pub fn availability_row(doctor_id: &str, location_id: &str, specialization: &str) -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "doctor_id": doctor_id,
            "is_available": true,
            "current_location_id": location_id,
            "specialization": specialization,
            "rating": 4.8,
            "experience_years": 12,
            "created_at": "2026-01-10T10:00:00Z",
            "updated_at": "2026-01-10T10:00:00Z"
        })
    }
}
