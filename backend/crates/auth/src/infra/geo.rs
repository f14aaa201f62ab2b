//! HTTP Geolocation Resolver
//!
//! Resolves an IP to a coarse location through a city-level lookup API
//! (ip-api.com JSON format). Strictly best-effort; the caller stores the
//! access record without a location on any failure.

use serde::Deserialize;

use crate::domain::entity::access_record::GeoLocation;
use crate::domain::repository::{GeoError, GeoResolver};

/// reqwest-backed geolocation resolver
#[derive(Clone)]
pub struct HttpGeoResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeoResolver {
    /// `base_url` without a trailing slash, e.g. `http://ip-api.com/json`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct LookupResponse {
    status: String,
    country: Option<String>,
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    message: Option<String>,
}

impl GeoResolver for HttpGeoResolver {
    async fn lookup(&self, ip: &str) -> Result<GeoLocation, GeoError> {
        let url = format!("{}/{}", self.base_url, ip);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeoError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeoError::Unavailable(format!(
                "lookup returned status {}",
                response.status()
            )));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| GeoError::Http(e.to_string()))?;

        if body.status != "success" {
            return Err(GeoError::Unavailable(
                body.message.unwrap_or_else(|| "lookup failed".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(GeoLocation {
                country: body.country,
                city: body.city,
                latitude,
                longitude,
            }),
            _ => Err(GeoError::Unavailable("no coordinates in response".to_string())),
        }
    }
}
