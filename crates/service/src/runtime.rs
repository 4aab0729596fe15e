//! Runtime environment helpers
//!
//! Wires configuration into storage and the geocoder so binaries only depend
//! on `service` and `configs`.

use std::{sync::Arc, time::Duration};

use common::geocode::{DisabledGeocoder, Geocoder, NominatimGeocoder};
use configs::{AppConfig, GeocoderConfig, StorageConfig};
use tracing::{info, warn};

use crate::storage::Storage;

/// Ensure data and upload directories exist; warn on a missing static root.
pub async fn ensure_env(cfg: &StorageConfig) -> anyhow::Result<()> {
    common::env::ensure_env(
        &cfg.static_dir,
        &cfg.data_dir,
        &cfg.upload_dir().to_string_lossy(),
    )
    .await
}

/// Prepare directories and open every collection.
pub async fn bootstrap(cfg: &AppConfig) -> anyhow::Result<Storage> {
    ensure_env(&cfg.storage).await?;
    let storage = Storage::open(&cfg.storage).await?;
    Ok(storage)
}

/// Nominatim client when enabled; otherwise, or if the client cannot be
/// built, a geocoder that resolves nothing.
pub fn build_geocoder(cfg: &GeocoderConfig) -> Arc<dyn Geocoder> {
    if !cfg.enabled {
        info!("geocoding disabled");
        return Arc::new(DisabledGeocoder);
    }
    match NominatimGeocoder::new(
        &cfg.base_url,
        &cfg.user_agent,
        &cfg.region_suffix,
        Duration::from_secs(cfg.timeout_secs),
    ) {
        Ok(g) => Arc::new(g),
        Err(e) => {
            warn!(error = %e, "geocoder unavailable; collection points will be stored unresolved");
            Arc::new(DisabledGeocoder)
        }
    }
}
