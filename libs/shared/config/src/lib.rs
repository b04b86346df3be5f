use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub postgrest_url: String,
    pub postgrest_api_key: String,
    pub geocoder_url: String,
    pub geocoder_api_key: String,
    pub geocoder_timeout_ms: u64,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            postgrest_url: env::var("POSTGREST_URL")
                .unwrap_or_else(|_| {
                    warn!("POSTGREST_URL not set, using empty value");
                    String::new()
                }),
            postgrest_api_key: env::var("POSTGREST_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("POSTGREST_API_KEY not set, using empty value");
                    String::new()
                }),
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| {
                    warn!("GEOCODER_URL not set, using default");
                    "https://geocode-maps.yandex.ru/1.x".to_string()
                }),
            geocoder_api_key: env::var("GEOCODER_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("GEOCODER_API_KEY not set, reverse geocoding disabled");
                    String::new()
                }),
            geocoder_timeout_ms: env::var("GEOCODER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.postgrest_url.is_empty()
    }

    pub fn is_geocoder_configured(&self) -> bool {
        !self.geocoder_url.is_empty() && !self.geocoder_api_key.is_empty()
    }
}
