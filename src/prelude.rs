//! Prelude module for common medimap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use medimap::prelude::*;`

pub use crate::core::{
    builder::MapViewBuilder,
    config::{MapStyleProfile, MapViewConfig, StyleRule},
    geo::{distance_km, format_distance_km, LatLng, LatLngBounds},
    map::{LocationSelectCallback, LocationTicket, MapState, MapView},
};

pub use crate::data::{bhubaneswar, Dataset, Facility, FacilityGroup, FacilityKind};

pub use crate::input::{EventHandled, MapEvent};

pub use crate::layers::{plan_markers, FacilityMarker, MarkerPlan, MarkerSet};

pub use crate::location::{
    FixedLocation, IpLocation, LocationError, LocationProvider, UnavailableLocation,
};

#[cfg(feature = "tokio-runtime")]
pub use crate::location::TimeoutLocation;

pub use crate::provider::{
    Credentials, EventTarget, HeadlessProvider, LoadOptions, MapProvider, MarkerId,
    MarkerOptions, PopupId, ProviderError, SurfaceId, SurfaceOptions,
};

pub use crate::routes::Route;

pub use crate::ui::{MarkerGlyph, MarkerStyle, PopupAction, PopupContent, PopupTracker};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
