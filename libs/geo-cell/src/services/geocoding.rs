// libs/geo-cell/src/services/geocoding.rs
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::GeoError;

/// Client for the external geocoding collaborator. Carries its own request
/// timeout so a slow geocoder cannot stall the tracking write it decorates.
pub struct GeocodingService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeocodingService {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.geocoder_timeout_ms))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.geocoder_url.clone(),
            api_key: config.geocoder_api_key.clone(),
        }
    }

    /// Resolve coordinates to a human-readable address. Best-effort: any
    /// failure is reported as an error for the caller to log and ignore.
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Result<Option<String>, GeoError> {
        if self.api_key.is_empty() {
            debug!("Geocoder API key not configured, skipping reverse geocoding");
            return Ok(None);
        }

        let data = self
            .lookup(&format!("{},{}", longitude, latitude))
            .await?;

        let address = first_feature(&data)
            .and_then(|obj| {
                obj.pointer("/metaDataProperty/GeocoderMetaData/text")
                    .and_then(Value::as_str)
            })
            .map(str::to_string);

        Ok(address)
    }

    /// Resolve an address to coordinates.
    pub async fn geocode(&self, address: &str) -> Result<Option<(f64, f64)>, GeoError> {
        if self.api_key.is_empty() {
            warn!("Geocoder API key not configured");
            return Ok(None);
        }

        let data = self.lookup(address).await?;

        let coords = first_feature(&data)
            .and_then(|obj| obj.pointer("/Point/pos").and_then(Value::as_str))
            .and_then(|pos| {
                // The geocoder returns "lon lat".
                let mut parts = pos.split_whitespace();
                let lon: f64 = parts.next()?.parse().ok()?;
                let lat: f64 = parts.next()?.parse().ok()?;
                Some((lat, lon))
            });

        Ok(coords)
    }

    async fn lookup(&self, geocode: &str) -> Result<Value, GeoError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("format", "json"),
                ("geocode", geocode),
                ("lang", "ru_RU"),
            ])
            .send()
            .await
            .map_err(|e| GeoError::Geocoding(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeoError::Geocoding(format!(
                "geocoder returned {}",
                response.status()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GeoError::Geocoding(e.to_string()))
    }
}

fn first_feature(data: &Value) -> Option<&Value> {
    data.pointer("/response/GeoObjectCollection/featureMember")?
        .as_array()?
        .first()?
        .get("GeoObject")
}
