pub mod availability;
pub mod distance;
pub mod geocoding;
pub mod search;
pub mod tracking;

pub use availability::AvailabilityService;
pub use geocoding::GeocodingService;
pub use search::NearbySearchService;
pub use tracking::LocationTrackingService;
