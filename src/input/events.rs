use serde::{Deserialize, Serialize};

use crate::{
    core::geo::LatLng,
    provider::{MarkerId, SurfaceId},
};

/// Click events delivered by a mapping provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
    /// Click on the map surface itself (not on a marker)
    Click { surface: SurfaceId, lat_lng: LatLng },
    /// Click on a marker
    MarkerClick { marker: MarkerId },
}

/// Whether the view acted on an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl MapEvent {
    /// Gets the geographic position associated with this event, if any
    pub fn lat_lng(&self) -> Option<LatLng> {
        match self {
            MapEvent::Click { lat_lng, .. } => Some(*lat_lng),
            MapEvent::MarkerClick { .. } => None,
        }
    }

    pub fn is_marker_event(&self) -> bool {
        matches!(self, MapEvent::MarkerClick { .. })
    }
}
