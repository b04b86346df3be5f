// libs/geo-cell/src/services/search.rs
use std::cmp::Ordering;

use tracing::debug;

use shared_config::AppConfig;

use crate::models::{DoctorCandidate, GeoError, NearbyDoctor};
use crate::repository::{GeoRepository, PostgrestGeoRepository};
use crate::services::distance::{estimated_arrival_minutes, haversine_km};

pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

pub struct NearbySearchService<R: GeoRepository> {
    repository: R,
}

impl NearbySearchService<PostgrestGeoRepository> {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repository: PostgrestGeoRepository::new(config),
        }
    }
}

impl<R: GeoRepository> NearbySearchService<R> {
    pub fn with_repository(repository: R) -> Self {
        Self { repository }
    }

    /// Rank available doctors around a query point. Candidates are re-read
    /// from the store on every call; doctor positions move too often to be
    /// worth caching.
    pub async fn find_nearby_doctors(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
        specialization: Option<&str>,
        limit: usize,
    ) -> Result<Vec<NearbyDoctor>, GeoError> {
        let candidates = self.repository.list_available_doctors(specialization).await?;
        debug!(
            "Ranking {} candidate doctors within {} km of ({}, {})",
            candidates.len(),
            radius_km,
            latitude,
            longitude
        );

        let mut ranked: Vec<(f64, DoctorCandidate)> = candidates
            .into_iter()
            .map(|candidate| {
                let distance = haversine_km(
                    latitude,
                    longitude,
                    candidate.location.latitude,
                    candidate.location.longitude,
                );
                (distance, candidate)
            })
            .filter(|(distance, _)| *distance <= radius_km)
            .collect();

        // Doctor id tiebreak keeps equal-distance orderings stable.
        ranked.sort_by(|(da, a), (db, b)| {
            da.partial_cmp(db)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.availability.doctor_id.cmp(&b.availability.doctor_id))
        });
        ranked.truncate(limit);

        Ok(ranked
            .into_iter()
            .map(|(distance, candidate)| NearbyDoctor {
                doctor_id: candidate.availability.doctor_id,
                distance: (distance * 100.0).round() / 100.0,
                latitude: candidate.location.latitude,
                longitude: candidate.location.longitude,
                address: candidate.location.address,
                specialization: candidate.availability.specialization,
                rating: candidate.availability.rating,
                experience_years: candidate.availability.experience_years,
                estimated_arrival_time: estimated_arrival_minutes(distance),
            })
            .collect())
    }
}
