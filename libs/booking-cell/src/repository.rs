// libs/booking-cell/src/repository.rs
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{
    Booking, BookingError, BookingListFilter, BookingMessage, BookingStatus, BookingStatusUpdate,
    TransitionPatch,
};

/// Storage seam for the lifecycle manager. Relationships are explicit
/// foreign-key lookups; there is no lazy-loaded object graph.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert_booking(&self, booking: &Booking) -> Result<Booking, BookingError>;

    async fn fetch_booking(&self, id: &str) -> Result<Option<Booking>, BookingError>;

    async fn list_bookings(&self, filter: &BookingListFilter) -> Result<Vec<Booking>, BookingError>;

    async fn count_bookings(&self) -> Result<i64, BookingError>;

    /// Conditional update keyed on the expected current status. Returns
    /// `None` when no row matched, i.e. a concurrent transition won the race
    /// or the booking does not exist.
    async fn apply_transition(
        &self,
        id: &str,
        expected: BookingStatus,
        new_status: BookingStatus,
        patch: TransitionPatch,
    ) -> Result<Option<Booking>, BookingError>;

    async fn append_status_update(&self, update: &BookingStatusUpdate) -> Result<(), BookingError>;

    async fn list_status_updates(
        &self,
        booking_id: &str,
    ) -> Result<Vec<BookingStatusUpdate>, BookingError>;

    async fn insert_message(&self, message: &BookingMessage) -> Result<BookingMessage, BookingError>;

    async fn list_messages(
        &self,
        booking_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BookingMessage>, BookingError>;
}

// ==============================================================================
// POSTGREST IMPLEMENTATION
// ==============================================================================

pub struct PostgrestBookingRepository {
    store: PostgrestClient,
}

impl PostgrestBookingRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: PostgrestClient::new(config),
        }
    }
}

#[derive(Deserialize)]
struct CountRow {
    count: i64,
}

fn db_err(e: anyhow::Error) -> BookingError {
    BookingError::Database(e.to_string())
}

#[async_trait]
impl BookingRepository for PostgrestBookingRepository {
    async fn insert_booking(&self, booking: &Booking) -> Result<Booking, BookingError> {
        let row = serde_json::to_value(booking)
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let mut rows: Vec<Booking> = self
            .store
            .insert_returning("bookings", row)
            .await
            .map_err(db_err)?;

        rows.pop()
            .ok_or_else(|| BookingError::Database("insert returned no row".to_string()))
    }

    async fn fetch_booking(&self, id: &str) -> Result<Option<Booking>, BookingError> {
        let path = format!("/bookings?id=eq.{}", urlencoding::encode(id));
        let mut rows: Vec<Booking> = self
            .store
            .request(Method::GET, &path, None)
            .await
            .map_err(db_err)?;

        Ok(rows.pop())
    }

    async fn list_bookings(&self, filter: &BookingListFilter) -> Result<Vec<Booking>, BookingError> {
        let mut predicates = Vec::new();
        if let Some(patient_id) = &filter.patient_id {
            predicates.push(format!("patient_id=eq.{}", urlencoding::encode(patient_id)));
        }
        if let Some(doctor_id) = &filter.doctor_id {
            predicates.push(format!("doctor_id=eq.{}", urlencoding::encode(doctor_id)));
        }
        if let Some(status) = filter.status {
            predicates.push(format!("status=eq.{}", status));
        }
        predicates.push("order=created_at.desc".to_string());
        predicates.push(format!("limit={}", filter.limit));
        predicates.push(format!("offset={}", filter.offset));

        let path = format!("/bookings?{}", predicates.join("&"));
        debug!("Listing bookings: {}", path);

        self.store.request(Method::GET, &path, None).await.map_err(db_err)
    }

    async fn count_bookings(&self) -> Result<i64, BookingError> {
        let rows: Vec<CountRow> = self
            .store
            .request(Method::GET, "/bookings?select=count", None)
            .await
            .map_err(db_err)?;

        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }

    async fn apply_transition(
        &self,
        id: &str,
        expected: BookingStatus,
        new_status: BookingStatus,
        patch: TransitionPatch,
    ) -> Result<Option<Booking>, BookingError> {
        let mut update = Map::new();
        update.insert("status".to_string(), json!(new_status));
        update.insert("updated_at".to_string(), json!(Utc::now()));

        if let Some(doctor_id) = &patch.doctor_id {
            update.insert("doctor_id".to_string(), json!(doctor_id));
        }
        if patch.clear_doctor_id {
            update.insert("doctor_id".to_string(), Value::Null);
        }
        if let Some(at) = patch.assigned_at {
            update.insert("assigned_at".to_string(), json!(at));
        }
        if let Some(at) = patch.started_at {
            update.insert("started_at".to_string(), json!(at));
        }
        if let Some(at) = patch.completed_at {
            update.insert("completed_at".to_string(), json!(at));
        }
        if let Some(at) = patch.cancelled_at {
            update.insert("cancelled_at".to_string(), json!(at));
        }
        if let Some(duration) = patch.actual_duration {
            update.insert("actual_duration".to_string(), json!(duration));
        }
        if let Some(price) = patch.final_price {
            update.insert("final_price".to_string(), json!(price));
        }
        if let Some(notes) = &patch.notes {
            update.insert("notes".to_string(), json!(notes));
        }
        if let Some(emergency_type) = patch.emergency_type {
            update.insert("emergency_type".to_string(), json!(emergency_type));
        }

        // The status predicate makes the write a compare-and-swap: of two
        // concurrent transitions at most one sees a matching row.
        let predicates = format!("id=eq.{}&status=eq.{}", urlencoding::encode(id), expected);
        let mut rows: Vec<Booking> = self
            .store
            .update_where("bookings", &predicates, Value::Object(update))
            .await
            .map_err(db_err)?;

        Ok(rows.pop())
    }

    async fn append_status_update(&self, update: &BookingStatusUpdate) -> Result<(), BookingError> {
        let row = serde_json::to_value(update)
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let _rows: Vec<BookingStatusUpdate> = self
            .store
            .insert_returning("booking_status_updates", row)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn list_status_updates(
        &self,
        booking_id: &str,
    ) -> Result<Vec<BookingStatusUpdate>, BookingError> {
        let path = format!(
            "/booking_status_updates?booking_id=eq.{}&order=created_at.asc",
            urlencoding::encode(booking_id)
        );
        self.store.request(Method::GET, &path, None).await.map_err(db_err)
    }

    async fn insert_message(&self, message: &BookingMessage) -> Result<BookingMessage, BookingError> {
        let row = serde_json::to_value(message)
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let mut rows: Vec<BookingMessage> = self
            .store
            .insert_returning("booking_messages", row)
            .await
            .map_err(db_err)?;

        rows.pop()
            .ok_or_else(|| BookingError::Database("insert returned no row".to_string()))
    }

    async fn list_messages(
        &self,
        booking_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BookingMessage>, BookingError> {
        let path = format!(
            "/booking_messages?booking_id=eq.{}&order=created_at.desc&limit={}&offset={}",
            urlencoding::encode(booking_id),
            limit,
            offset
        );
        self.store.request(Method::GET, &path, None).await.map_err(db_err)
    }
}
