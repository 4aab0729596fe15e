//! Address geocoding.
//!
//! The `Geocoder` trait is the seam the collection-point service depends on;
//! `NominatimGeocoder` talks to an OpenStreetMap Nominatim compatible search API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// A latitude/longitude pair. `(0.0, 0.0)` is the "unresolved" marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const UNRESOLVED: Coordinates = Coordinates { lat: 0.0, lon: 0.0 };

    pub fn is_resolved(&self) -> bool {
        !(self.lat == 0.0 && self.lon == 0.0)
    }
}

/// One geocoding match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeocodeHit {
    pub coordinates: Coordinates,
    pub display_name: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-form address; `Ok(None)` when nothing matched.
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeHit>, GeocodeError>;
}

/// Geocoder that never resolves anything. Used when geocoding is switched off.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        Ok(None)
    }
}

#[derive(Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    region_suffix: String,
}

impl NominatimGeocoder {
    /// `region_suffix` is appended to every query (e.g. `"João Pessoa, PB, Brasil"`)
    /// to bias results towards the served city.
    pub fn new(base_url: &str, user_agent: &str, region_suffix: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            region_suffix: region_suffix.trim().to_string(),
        })
    }

    fn query_for(&self, address: &str) -> String {
        if self.region_suffix.is_empty() {
            address.trim().to_string()
        } else {
            format!("{}, {}", address.trim(), self.region_suffix)
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let query = self.query_for(address);
        debug!(%query, "geocoding address");
        let resp = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;
        let json = resp
            .json::<serde_json::Value>()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))?;
        parse_search_response(&json)
    }
}

/// Nominatim answers with an array of places whose `lat`/`lon` are decimal strings.
pub fn parse_search_response(json: &serde_json::Value) -> Result<Option<GeocodeHit>, GeocodeError> {
    let places = json
        .as_array()
        .ok_or_else(|| GeocodeError::Parse("expected a JSON array".into()))?;
    let Some(first) = places.first() else { return Ok(None) };
    let coord = |key: &str| -> Result<f64, GeocodeError> {
        match first.get(key) {
            Some(serde_json::Value::String(s)) => s
                .parse::<f64>()
                .map_err(|e| GeocodeError::Parse(format!("{key}: {e}"))),
            Some(serde_json::Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| GeocodeError::Parse(format!("{key}: not a float"))),
            _ => Err(GeocodeError::Parse(format!("missing {key}"))),
        }
    };
    let coordinates = Coordinates { lat: coord("lat")?, lon: coord("lon")? };
    let display_name = first
        .get("display_name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    Ok(Some(GeocodeHit { coordinates, display_name }))
}

/// Free-form lookup used by the map widget: errors and misses collapse to `None`.
pub async fn geocode_address<G: Geocoder + ?Sized>(geocoder: &G, address: &str) -> Option<GeocodeHit> {
    if address.trim().is_empty() {
        return None;
    }
    match geocoder.geocode(address).await {
        Ok(hit) => hit,
        Err(e) => {
            tracing::warn!(error = %e, %address, "geocoding failed");
            None
        }
    }
}
