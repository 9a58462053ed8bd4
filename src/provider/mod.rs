//! The external mapping provider seam.
//!
//! The map view never talks to a concrete mapping SDK. Everything it needs
//! (loading the SDK, creating a surface, markers and popups, subscribing to
//! clicks) goes through [`MapProvider`], so a real SDK binding and the
//! in-memory [`HeadlessProvider`] are interchangeable.

pub mod headless;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        config::StyleRule,
        constants::{DEFAULT_PROVIDER_LIBRARIES, DEFAULT_PROVIDER_VERSION},
        geo::LatLng,
    },
    input::events::MapEvent,
    ui::{popup::PopupContent, style::MarkerStyle},
};

pub use headless::HeadlessProvider;

macro_rules! handle_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle_id!(SurfaceId, "surface");
handle_id!(MarkerId, "marker");
handle_id!(PopupId, "popup");

/// Errors reported by a mapping provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("provider rejected the credentials")]
    InvalidCredentials,

    #[error("provider failed to load: {0}")]
    LoadFailed(String),

    #[error("provider has not been loaded")]
    NotLoaded,

    #[error("unknown surface {0}")]
    UnknownSurface(SurfaceId),

    #[error("unknown marker {0}")]
    UnknownMarker(MarkerId),

    #[error("unknown popup {0}")]
    UnknownPopup(PopupId),
}

/// API credentials for the mapping provider.
///
/// `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials(String);

impl Credentials {
    /// Trims `key`; blank keys are not credentials.
    pub fn new(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            None
        } else {
            Some(Self(key.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credentials").field(&"<redacted>").finish()
    }
}

/// What the provider SDK should load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub version: String,
    pub libraries: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            version: DEFAULT_PROVIDER_VERSION.to_string(),
            libraries: DEFAULT_PROVIDER_LIBRARIES
                .iter()
                .map(|l| l.to_string())
                .collect(),
        }
    }
}

/// Options for a new map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOptions {
    pub center: LatLng,
    pub zoom: u8,
    pub styles: Vec<StyleRule>,
}

/// Options for a new marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub title: String,
    pub icon: MarkerStyle,
}

/// Something the view can subscribe to clicks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Surface(SurfaceId),
    Marker(MarkerId),
}

/// A mapping SDK as seen by the map view.
///
/// Only `load` suspends. Everything else mirrors the synchronous constructor
/// calls of browser mapping SDKs.
#[async_trait]
pub trait MapProvider: Send {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Loads the SDK with `credentials`. Called once per credential value.
    async fn load(
        &mut self,
        credentials: &Credentials,
        options: &LoadOptions,
    ) -> Result<(), ProviderError>;

    fn create_surface(&mut self, options: &SurfaceOptions) -> Result<SurfaceId, ProviderError>;

    /// Removes a surface together with its markers, popups and subscriptions.
    fn destroy_surface(&mut self, surface: SurfaceId);

    fn create_marker(
        &mut self,
        surface: SurfaceId,
        options: &MarkerOptions,
    ) -> Result<MarkerId, ProviderError>;

    /// Removes a single marker together with its popup.
    fn remove_marker(&mut self, marker: MarkerId);

    /// Creates a popup anchored on `marker`. It starts closed.
    fn create_popup(
        &mut self,
        marker: MarkerId,
        content: &PopupContent,
    ) -> Result<PopupId, ProviderError>;

    fn open_popup(&mut self, popup: PopupId) -> Result<(), ProviderError>;

    fn close_popup(&mut self, popup: PopupId);

    /// Starts delivering click events for `target`.
    fn subscribe(&mut self, target: EventTarget) -> Result<(), ProviderError>;

    /// Stops delivering click events for `target`.
    fn unsubscribe(&mut self, target: EventTarget);

    /// Events that happened since the last call, oldest first.
    fn drain_events(&mut self) -> Vec<MapEvent>;
}
