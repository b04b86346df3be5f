// libs/booking-cell/src/policy.rs
use shared_models::identity::{Identity, Role};
use tracing::debug;

use crate::models::{Booking, BookingError, BookingListFilter, BookingStatus};

/// Actions an actor can attempt against a booking. Every read and write path
/// funnels through `authorize` so the role rules live in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Read,
    Assign,
    Start,
    Complete,
    Cancel,
    Message,
}

pub fn authorize(
    identity: &Identity,
    booking: &Booking,
    action: BookingAction,
) -> Result<(), BookingError> {
    let is_owner = booking.patient_id == identity.user_id;
    let is_assigned_doctor = booking.doctor_id.as_deref() == Some(identity.user_id.as_str());

    let allowed = match action {
        BookingAction::Read | BookingAction::Message => {
            identity.is_admin() || is_owner || is_assigned_doctor
        }
        BookingAction::Assign => identity.is_dispatcher(),
        BookingAction::Start | BookingAction::Complete => is_assigned_doctor,
        BookingAction::Cancel => identity.is_admin() || is_owner || is_assigned_doctor,
    };

    if allowed {
        Ok(())
    } else {
        debug!(
            "Denied {:?} on booking {} for user {}",
            action, booking.id, identity.user_id
        );
        Err(BookingError::AccessDenied)
    }
}

/// Scope a listing to what the caller may see: doctors their assignments,
/// patients their own bookings, admins everything.
pub fn list_scope(
    identity: &Identity,
    status: Option<BookingStatus>,
    limit: i64,
    offset: i64,
) -> Result<BookingListFilter, BookingError> {
    let mut filter = BookingListFilter {
        status,
        limit,
        offset,
        ..Default::default()
    };

    match identity.role {
        Some(Role::Doctor) => filter.doctor_id = Some(identity.user_id.clone()),
        Some(Role::Patient) => filter.patient_id = Some(identity.user_id.clone()),
        Some(Role::Admin) => {}
        _ => return Err(BookingError::AccessDenied),
    }

    Ok(filter)
}
