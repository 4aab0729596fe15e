//! Drop-off locations, geocoded when created.

use std::sync::Arc;

use common::geocode::{Coordinates, Geocoder};
use models::{identity::new_id, CollectionPoint, WasteType};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{actor::Actor, errors::ServiceError, storage::Storage};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CollectionPointInput {
    pub name: String,
    /// Waste type slug, e.g. `"pilhas"`.
    pub kind: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
}

impl CollectionPointInput {
    pub fn address(&self) -> String {
        format!("{}, {} - {}", self.street.trim(), self.number.trim(), self.neighborhood.trim())
    }

    fn validate(&self) -> Result<(), ServiceError> {
        let fields = [
            ("name", &self.name),
            ("type", &self.kind),
            ("street", &self.street),
            ("number", &self.number),
            ("neighborhood", &self.neighborhood),
        ];
        match fields.iter().find(|(_, v)| v.trim().is_empty()) {
            Some((field, _)) => Err(ServiceError::Validation(format!("{field} is required"))),
            None => Ok(()),
        }
    }
}

/// One entry of the waste information page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WasteCategory {
    pub kind: WasteType,
    pub title: &'static str,
    pub guidance: &'static str,
    pub points: Vec<CollectionPoint>,
}

#[derive(Clone)]
pub struct CollectionPointService {
    storage: Storage,
    geocoder: Arc<dyn Geocoder>,
}

impl CollectionPointService {
    pub fn new(storage: Storage, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { storage, geocoder }
    }

    /// Admin only. A failed or empty geocode stores the point at `(0.0, 0.0)`.
    #[instrument(skip(self, actor, input), fields(name = %input.name))]
    pub async fn add(&self, actor: &Actor, input: CollectionPointInput) -> Result<CollectionPoint, ServiceError> {
        actor.require_admin("manage collection points")?;
        input.validate()?;
        let address = input.address();
        let coords = self.locate(&address).await;

        let point = CollectionPoint {
            id: new_id(),
            name: input.name.trim().to_string(),
            kind: input.kind.trim().to_lowercase(),
            address,
            lat: coords.lat,
            lon: coords.lon,
            extra: Default::default(),
        };
        self.storage.collection_points.append(point.clone()).await?;
        info!(point_id = %point.id, located = point.is_located(), "collection_point_added");
        Ok(point)
    }

    async fn locate(&self, address: &str) -> Coordinates {
        match self.geocoder.geocode(address).await {
            Ok(Some(hit)) => hit.coordinates,
            Ok(None) => {
                warn!(%address, "address not found by geocoder; storing unresolved coordinates");
                Coordinates::UNRESOLVED
            }
            Err(e) => {
                warn!(%address, error = %e, "geocoding failed; storing unresolved coordinates");
                Coordinates::UNRESOLVED
            }
        }
    }

    /// Admin only. Returns whether the point existed.
    pub async fn delete(&self, actor: &Actor, point_id: &str) -> Result<bool, ServiceError> {
        actor.require_admin("manage collection points")?;
        let removed = self
            .storage
            .collection_points
            .update(|points| {
                let before = points.len();
                points.retain(|p| p.id != point_id);
                Ok(points.len() != before)
            })
            .await?;
        if removed {
            info!(%point_id, "collection_point_deleted");
        }
        Ok(removed)
    }

    pub async fn list(&self) -> Vec<CollectionPoint> {
        self.storage.collection_points.read_all().await
    }

    pub async fn by_type(&self, kind: WasteType) -> Vec<CollectionPoint> {
        self.list().await.into_iter().filter(|p| p.waste_type() == kind).collect()
    }

    /// The known waste categories in display order, each with its points.
    /// Points of unknown type are only reachable through `list`.
    pub async fn catalog(&self) -> Vec<WasteCategory> {
        let points = self.list().await;
        WasteType::CATALOG
            .iter()
            .map(|&kind| WasteCategory {
                kind,
                title: kind.title(),
                guidance: kind.guidance(),
                points: points.iter().filter(|p| p.waste_type() == kind).cloned().collect(),
            })
            .collect()
    }
}

impl std::fmt::Debug for CollectionPointService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionPointService").field("storage", &self.storage).finish_non_exhaustive()
    }
}
