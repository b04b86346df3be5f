// libs/geo-cell/src/services/availability.rs
use tracing::info;

use shared_config::AppConfig;
use shared_models::identity::Identity;

use crate::models::{DoctorAvailability, GeoError, UpdateAvailabilityRequest};
use crate::repository::{GeoRepository, PostgrestGeoRepository};

pub struct AvailabilityService<R: GeoRepository> {
    repository: R,
}

impl AvailabilityService<PostgrestGeoRepository> {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repository: PostgrestGeoRepository::new(config),
        }
    }
}

impl<R: GeoRepository> AvailabilityService<R> {
    pub fn with_repository(repository: R) -> Self {
        Self { repository }
    }

    /// Upsert the caller's availability record. Doctors only, each acting
    /// on their own id; the record is linked to whatever active location is
    /// currently tracked for them.
    pub async fn update_availability(
        &self,
        identity: &Identity,
        request: UpdateAvailabilityRequest,
    ) -> Result<DoctorAvailability, GeoError> {
        if !identity.is_doctor() {
            return Err(GeoError::AccessDenied(
                "Only doctors can update availability".to_string(),
            ));
        }

        let current_location_id = self
            .repository
            .fetch_active_location(&identity.user_id)
            .await?
            .map(|location| location.id);

        let availability = self
            .repository
            .upsert_availability(&identity.user_id, &request, current_location_id)
            .await?;

        info!(
            "Doctor {} availability set to {}",
            identity.user_id, request.is_available
        );
        Ok(availability)
    }
}
