// libs/booking-cell/src/services/booking.rs
use chrono::Utc;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::identity::Identity;

use crate::models::{
    Booking, BookingError, BookingMessage, BookingStatus, BookingStatusUpdate,
    CompleteBookingRequest, CreateBookingRequest, SendMessageRequest, TransitionPatch,
};
use crate::policy::{authorize, list_scope, BookingAction};
use crate::repository::{BookingRepository, PostgrestBookingRepository};
use crate::services::lifecycle::BookingLifecycle;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const DEFAULT_MESSAGE_LIMIT: i64 = 50;

pub struct BookingService<R: BookingRepository> {
    repository: R,
}

impl BookingService<PostgrestBookingRepository> {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repository: PostgrestBookingRepository::new(config),
        }
    }
}

impl<R: BookingRepository> BookingService<R> {
    pub fn with_repository(repository: R) -> Self {
        Self { repository }
    }

    /// Create a booking in `pending` state. The authenticated caller becomes
    /// the owning patient regardless of role.
    pub async fn create_booking(
        &self,
        identity: &Identity,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        if request.address.trim().is_empty() {
            return Err(BookingError::Validation("Address is required".to_string()));
        }

        let booking = Booking::new(&identity.user_id, request);
        let booking = self.repository.insert_booking(&booking).await?;

        self.repository
            .append_status_update(&BookingStatusUpdate::record(
                &booking.id,
                None,
                BookingStatus::Pending,
                &identity.user_id,
                "Booking created",
            ))
            .await?;

        info!("Booking {} created for patient {}", booking.id, booking.patient_id);
        Ok(booking)
    }

    pub async fn get_booking(
        &self,
        identity: &Identity,
        booking_id: &str,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch_existing(booking_id).await?;
        authorize(identity, &booking, BookingAction::Read)?;
        Ok(booking)
    }

    pub async fn list_bookings(
        &self,
        identity: &Identity,
        status: Option<BookingStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Booking>, BookingError> {
        let filter = list_scope(
            identity,
            status,
            limit.unwrap_or(DEFAULT_LIST_LIMIT),
            offset.unwrap_or(0),
        )?;
        self.repository.list_bookings(&filter).await
    }

    pub async fn count_bookings(&self) -> Result<i64, BookingError> {
        self.repository.count_bookings().await
    }

    pub async fn assign_doctor(
        &self,
        identity: &Identity,
        booking_id: &str,
        doctor_id: &str,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch_existing(booking_id).await?;
        authorize(identity, &booking, BookingAction::Assign)?;
        BookingLifecycle::validate_transition(booking.status, BookingStatus::Assigned)?;

        let patch = TransitionPatch {
            doctor_id: Some(doctor_id.to_string()),
            assigned_at: Some(Utc::now()),
            ..Default::default()
        };

        self.transition(
            identity,
            &booking,
            BookingStatus::Assigned,
            patch,
            format!("Doctor {} assigned", doctor_id),
        )
        .await
    }

    pub async fn start_booking(
        &self,
        identity: &Identity,
        booking_id: &str,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch_existing(booking_id).await?;
        // A never-assigned booking has no doctor to authorize against, so
        // the state machine answers first: starting it is an invalid
        // transition for every caller.
        if booking.doctor_id.is_none() {
            BookingLifecycle::validate_transition(booking.status, BookingStatus::InProgress)?;
        }
        authorize(identity, &booking, BookingAction::Start)?;
        BookingLifecycle::validate_transition(booking.status, BookingStatus::InProgress)?;

        let patch = TransitionPatch {
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        self.transition(identity, &booking, BookingStatus::InProgress, patch, "Booking started")
            .await
    }

    pub async fn complete_booking(
        &self,
        identity: &Identity,
        booking_id: &str,
        request: CompleteBookingRequest,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch_existing(booking_id).await?;
        if booking.doctor_id.is_none() {
            BookingLifecycle::validate_transition(booking.status, BookingStatus::Completed)?;
        }
        authorize(identity, &booking, BookingAction::Complete)?;
        BookingLifecycle::validate_transition(booking.status, BookingStatus::Completed)?;

        let patch = TransitionPatch {
            completed_at: Some(Utc::now()),
            actual_duration: request.actual_duration,
            final_price: request.final_price,
            notes: request.notes,
            emergency_type: request.emergency_type,
            ..Default::default()
        };

        self.transition(identity, &booking, BookingStatus::Completed, patch, "Booking completed")
            .await
    }

    pub async fn cancel_booking(
        &self,
        identity: &Identity,
        booking_id: &str,
        reason: Option<String>,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch_existing(booking_id).await?;
        authorize(identity, &booking, BookingAction::Cancel)?;
        BookingLifecycle::validate_transition(booking.status, BookingStatus::Cancelled)?;

        let patch = TransitionPatch {
            cancelled_at: Some(Utc::now()),
            clear_doctor_id: booking.doctor_id.is_some(),
            ..Default::default()
        };

        self.transition(
            identity,
            &booking,
            BookingStatus::Cancelled,
            patch,
            reason.unwrap_or_else(|| "Booking cancelled".to_string()),
        )
        .await
    }

    pub async fn send_message(
        &self,
        identity: &Identity,
        booking_id: &str,
        request: SendMessageRequest,
    ) -> Result<BookingMessage, BookingError> {
        if request.content.trim().is_empty() {
            return Err(BookingError::Validation("Message content is required".to_string()));
        }

        let booking = self.fetch_existing(booking_id).await?;
        authorize(identity, &booking, BookingAction::Message)?;

        let message = BookingMessage {
            id: uuid::Uuid::new_v4().to_string(),
            booking_id: booking.id.clone(),
            sender_id: identity.user_id.clone(),
            sender_role: identity
                .role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            message_type: request.message_type,
            content: request.content,
            created_at: Utc::now(),
        };

        self.repository.insert_message(&message).await
    }

    pub async fn get_messages(
        &self,
        identity: &Identity,
        booking_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<BookingMessage>, BookingError> {
        let booking = self.fetch_existing(booking_id).await?;
        authorize(identity, &booking, BookingAction::Message)?;

        self.repository
            .list_messages(
                booking_id,
                limit.unwrap_or(DEFAULT_MESSAGE_LIMIT),
                offset.unwrap_or(0),
            )
            .await
    }

    /// Audit trail for a booking, oldest first, matching transition order.
    pub async fn get_status_history(
        &self,
        identity: &Identity,
        booking_id: &str,
    ) -> Result<Vec<BookingStatusUpdate>, BookingError> {
        let booking = self.fetch_existing(booking_id).await?;
        authorize(identity, &booking, BookingAction::Read)?;

        self.repository.list_status_updates(booking_id).await
    }

    async fn fetch_existing(&self, booking_id: &str) -> Result<Booking, BookingError> {
        self.repository
            .fetch_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound)
    }

    /// Apply a guarded transition and append its audit row. The conditional
    /// update is keyed on the status observed above; when a concurrent
    /// writer got there first the update matches nothing and the call fails
    /// with the status that actually won.
    async fn transition(
        &self,
        identity: &Identity,
        booking: &Booking,
        new_status: BookingStatus,
        patch: TransitionPatch,
        reason: impl Into<String>,
    ) -> Result<Booking, BookingError> {
        let expected = booking.status;
        let updated = self
            .repository
            .apply_transition(&booking.id, expected, new_status, patch)
            .await?;

        let updated = match updated {
            Some(updated) => updated,
            None => {
                let current = self.fetch_existing(&booking.id).await?;
                debug!(
                    "Transition of booking {} to {} lost to concurrent update, now {}",
                    booking.id, new_status, current.status
                );
                return Err(BookingError::InvalidTransition(current.status));
            }
        };

        self.repository
            .append_status_update(&BookingStatusUpdate::record(
                &updated.id,
                Some(expected),
                new_status,
                &identity.user_id,
                reason,
            ))
            .await?;

        info!("Booking {} transitioned {} -> {}", updated.id, expected, new_status);
        Ok(updated)
    }
}
