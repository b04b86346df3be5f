// libs/booking-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{BookingError, BookingStatus};

/// Booking state machine. `completed` and `cancelled` are terminal; every
/// other transition follows the dispatch flow
/// pending -> assigned -> in_progress -> completed, with cancellation
/// allowed from any non-terminal state.
pub struct BookingLifecycle;

impl BookingLifecycle {
    pub fn valid_transitions(current: BookingStatus) -> Vec<BookingStatus> {
        match current {
            BookingStatus::Pending => vec![BookingStatus::Assigned, BookingStatus::Cancelled],
            BookingStatus::Assigned => vec![BookingStatus::InProgress, BookingStatus::Cancelled],
            BookingStatus::InProgress => vec![BookingStatus::Completed, BookingStatus::Cancelled],
            // Terminal states - no transitions allowed
            BookingStatus::Completed => vec![],
            BookingStatus::Cancelled => vec![],
        }
    }

    pub fn validate_transition(
        current: BookingStatus,
        next: BookingStatus,
    ) -> Result<(), BookingError> {
        debug!("Validating status transition {} -> {}", current, next);

        if !Self::valid_transitions(current).contains(&next) {
            warn!("Invalid status transition attempted: {} -> {}", current, next);
            return Err(BookingError::InvalidTransition(current));
        }

        Ok(())
    }
}
