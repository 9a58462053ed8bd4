//! Core constants for the medical map: default view, marker styling and
//! provider-facing defaults.

use crate::core::geo::LatLng;

/// Mean Earth radius used by the distance utility, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fallback map center (Bhubaneswar).
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 20.296,
    lng: 85.824,
};

/// Initial zoom level of a freshly created surface.
pub const DEFAULT_ZOOM: u8 = 12;

/// Provider SDK channel requested on load.
pub const DEFAULT_PROVIDER_VERSION: &str = "weekly";

/// Provider SDK libraries requested on load.
pub const DEFAULT_PROVIDER_LIBRARIES: [&str; 2] = ["places", "geometry"];

/// How long a single geolocation attempt may take.
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 10_000;

/// Hospital marker: red circle with a white cross.
pub const HOSPITAL_MARKER_COLOR: &str = "#dc2626";
pub const HOSPITAL_MARKER_SIZE: u32 = 32;

/// Pharmacy marker: green circle with a white cross.
pub const PHARMACY_MARKER_COLOR: &str = "#16a34a";
pub const PHARMACY_MARKER_SIZE: u32 = 28;

/// "Your Location" marker: blue dot.
pub const USER_MARKER_COLOR: &str = "#3b82f6";
pub const USER_MARKER_SIZE: u32 = 24;

/// Title of the user location marker.
pub const USER_MARKER_TITLE: &str = "Your Location";

/// Shown when the provider refuses to load.
pub const PROVIDER_LOAD_ERROR_MESSAGE: &str =
    "Failed to load the map. Please check your API key.";

/// Where users obtain a provider key.
pub const API_KEY_HELP_URL: &str =
    "https://developers.google.com/maps/documentation/javascript/get-api-key";

/// Base of the external "directions" link.
pub const DIRECTIONS_BASE_URL: &str = "https://maps.google.com/";
