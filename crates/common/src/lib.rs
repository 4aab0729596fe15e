//! Shared runtime helpers: logging setup, startup directory checks and the
//! geocoding client used for collection points.

pub mod env;
pub mod geocode;
pub mod utils;

pub use geocode::{Coordinates, GeocodeError, Geocoder};
