//! Configuration for the map view.
//!
//! A [`MapViewConfig`] can be built in code, parsed from JSON and then
//! overridden from the environment. Map styling follows the same preset
//! approach: pick a [`MapStyleProfile`] and resolve it to provider style rules.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    core::{
        constants::{DEFAULT_CENTER, DEFAULT_LOCATION_TIMEOUT_MS, DEFAULT_ZOOM},
        geo::LatLng,
    },
    provider::{Credentials, LoadOptions},
    Error, Result,
};

/// Environment variable holding the provider API key.
pub const ENV_API_KEY: &str = "MEDIMAP_API_KEY";
/// Environment variable holding the center as `lat,lng`.
pub const ENV_CENTER: &str = "MEDIMAP_CENTER";
/// Environment variable holding the zoom level.
pub const ENV_ZOOM: &str = "MEDIMAP_ZOOM";

/// One provider styling rule, e.g. hide labels of points of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRule {
    pub feature_type: String,
    pub element_type: String,
    pub visible: bool,
}

impl StyleRule {
    pub fn hide(feature_type: &str, element_type: &str) -> Self {
        Self {
            feature_type: feature_type.to_string(),
            element_type: element_type.to_string(),
            visible: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStyleProfile {
    /// Provider defaults
    Default,
    /// Hide point-of-interest labels so facility markers stand out
    HidePoiLabels,
    Custom(Vec<StyleRule>),
}

impl MapStyleProfile {
    pub fn resolve(&self) -> Vec<StyleRule> {
        match self {
            Self::Default => Vec::new(),
            Self::HidePoiLabels => vec![StyleRule::hide("poi", "labels")],
            Self::Custom(rules) => rules.clone(),
        }
    }
}

impl Default for MapStyleProfile {
    fn default() -> Self {
        Self::HidePoiLabels
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    /// Fallback reference point and initial surface center
    pub center: LatLng,
    pub zoom: u8,
    /// Provider API key; `None` starts the view in the credential-entry state
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub load: LoadOptions,
    pub style: MapStyleProfile,
    pub location_timeout_ms: u64,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            api_key: None,
            load: LoadOptions::default(),
            style: MapStyleProfile::default(),
            location_timeout_ms: DEFAULT_LOCATION_TIMEOUT_MS,
        }
    }
}

impl std::fmt::Debug for MapViewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapViewConfig")
            .field("center", &self.center)
            .field("zoom", &self.zoom)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("load", &self.load)
            .field("style", &self.style)
            .field("location_timeout_ms", &self.location_timeout_ms)
            .finish()
    }
}

impl MapViewConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapViewConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Applies `MEDIMAP_API_KEY`, `MEDIMAP_CENTER` and `MEDIMAP_ZOOM`.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(center) = lookup(ENV_CENTER) {
            self.center = parse_lat_lng(&center)?;
        }
        if let Some(zoom) = lookup(ENV_ZOOM) {
            self.zoom = zoom
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{}: invalid zoom '{}'", ENV_ZOOM, zoom)))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center.is_valid() {
            return Err(Error::InvalidCoordinates(self.center.to_string()));
        }
        Ok(())
    }

    /// Non-blank credentials, if configured.
    pub fn credentials(&self) -> Option<Credentials> {
        self.api_key.as_deref().and_then(Credentials::new)
    }

    pub fn location_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.location_timeout_ms)
    }
}

/// Parses `"lat,lng"`.
pub fn parse_lat_lng(value: &str) -> Result<LatLng> {
    let invalid = || Error::InvalidCoordinates(value.to_string());
    let (lat, lng) = value.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

    let position = LatLng::new(lat, lng);
    if position.is_valid() {
        Ok(position)
    } else {
        Err(invalid())
    }
}
