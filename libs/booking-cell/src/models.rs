// libs/booking-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// A dispatch request from a patient for a doctor visit or consultation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: Option<String>,
    pub clinic_id: Option<String>,

    pub call_type: CallType,
    pub symptoms: Option<String>,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub status: BookingStatus,
    pub priority: Priority,

    pub scheduled_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,

    pub notes: Option<String>,
    pub estimated_duration: Option<i32>,
    pub actual_duration: Option<i32>,
    pub estimated_price: Option<f64>,
    pub final_price: Option<f64>,

    pub is_emergency: bool,
    pub emergency_type: Option<EmergencyType>,
}

impl Booking {
    pub fn new(patient_id: &str, request: CreateBookingRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            doctor_id: None,
            clinic_id: None,
            call_type: request.call_type,
            symptoms: request.symptoms,
            address: request.address,
            latitude: request.latitude,
            longitude: request.longitude,
            status: BookingStatus::Pending,
            priority: request.priority.unwrap_or(Priority::Normal),
            scheduled_time: request.scheduled_time,
            created_at: now,
            updated_at: now,
            assigned_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
            notes: request.notes,
            estimated_duration: request.estimated_duration,
            actual_duration: None,
            estimated_price: request.estimated_price,
            final_price: None,
            is_emergency: matches!(request.priority, Some(Priority::Emergency)),
            emergency_type: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Assigned => write!(f, "assigned"),
            BookingStatus::InProgress => write!(f, "in_progress"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    Urgent,
    Scheduled,
    Consultation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Emergency,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyType {
    Danger,
    Complex,
    HospitalTransfer,
}

// ==============================================================================
// AUDIT TRAIL AND MESSAGING
// ==============================================================================

/// Append-only audit row. One row per successful state-changing call,
/// including creation (`old_status` null).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusUpdate {
    pub id: String,
    pub booking_id: String,
    pub old_status: Option<BookingStatus>,
    pub new_status: BookingStatus,
    pub updated_by: String,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BookingStatusUpdate {
    pub fn record(
        booking_id: &str,
        old_status: Option<BookingStatus>,
        new_status: BookingStatus,
        updated_by: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: booking_id.to_string(),
            old_status,
            new_status,
            updated_by: updated_by.to_string(),
            reason: Some(reason.into()),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingMessage {
    pub id: String,
    pub booking_id: String,
    pub sender_id: String,
    pub sender_role: String,
    pub message_type: MessageType,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Image,
    Voice,
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Text
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub call_type: CallType,
    pub symptoms: Option<String>,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub estimated_duration: Option<i32>,
    pub estimated_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteBookingRequest {
    pub actual_duration: Option<i32>,
    pub final_price: Option<f64>,
    pub notes: Option<String>,
    pub emergency_type: Option<EmergencyType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub message_type: MessageType,
}

/// Caller-scoped listing filter. Exactly one of `doctor_id`/`patient_id` is
/// set for non-admin callers; both stay `None` for admins.
#[derive(Debug, Clone, Default)]
pub struct BookingListFilter {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub status: Option<BookingStatus>,
    pub limit: i64,
    pub offset: i64,
}

/// Field changes carried by a status transition. Applied together with the
/// status flip in one conditional update so concurrent writers cannot
/// interleave.
#[derive(Debug, Clone, Default)]
pub struct TransitionPatch {
    pub doctor_id: Option<String>,
    /// Null out `doctor_id`. Cancellation releases the assignment so that
    /// `doctor_id` is set exactly on assigned, in-progress, and completed
    /// bookings; the audit trail keeps who was assigned.
    pub clear_doctor_id: bool,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub actual_duration: Option<i32>,
    pub final_price: Option<f64>,
    pub notes: Option<String>,
    pub emergency_type: Option<EmergencyType>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking not found")]
    NotFound,

    #[error("Access denied")]
    AccessDenied,

    #[error("Cannot transition booking with status: {0}")]
    InvalidTransition(BookingStatus),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}
