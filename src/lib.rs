//! # MediMap
//!
//! Nearby hospitals and pharmacies on an interactive map.
//!
//! A [`MapView`] binds facility lists to a map surface created through an
//! injected [`MapProvider`]. Every facility becomes a marker whose popup shows
//! its details and the great-circle distance from the user's position (or the
//! configured center when the position is unknown). The user's position comes
//! from an injected [`LocationProvider`].

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod location;
pub mod prelude;
pub mod provider;
pub mod routes;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    builder::MapViewBuilder,
    config::{MapStyleProfile, MapViewConfig},
    geo::{distance_km, format_distance_km, LatLng, LatLngBounds},
    map::{LocationTicket, MapState, MapView},
};

pub use data::{bhubaneswar, Dataset, Facility, FacilityGroup, FacilityKind};

pub use input::{EventHandled, MapEvent};

pub use layers::{FacilityMarker, MarkerSet};

pub use location::{FixedLocation, IpLocation, LocationError, LocationProvider, UnavailableLocation};

#[cfg(feature = "tokio-runtime")]
pub use location::TimeoutLocation;

pub use provider::{Credentials, HeadlessProvider, MapProvider, ProviderError};

pub use routes::Route;

pub use ui::{MarkerStyle, PopupAction, PopupContent};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

pub type Error = MapError;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("No map provider credentials were supplied")]
    MissingCredentials,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
