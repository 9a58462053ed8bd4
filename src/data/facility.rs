use serde::{Deserialize, Serialize};

use crate::core::geo::LatLng;
use crate::ui::style::MarkerStyle;

/// What kind of facility a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityKind {
    Hospital,
    Pharmacy,
}

impl Default for FacilityKind {
    fn default() -> Self {
        FacilityKind::Hospital
    }
}

impl std::fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacilityKind::Hospital => write!(f, "hospital"),
            FacilityKind::Pharmacy => write!(f, "pharmacy"),
        }
    }
}

/// A hospital or pharmacy record.
///
/// `category` carries the dataset's free-form `type` string ("Government",
/// "24x7 Pharmacy", ...). Coordinates are taken as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    #[serde(default)]
    pub kind: FacilityKind,
    #[serde(rename = "type")]
    pub category: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
}

impl Facility {
    pub fn hospital(
        name: impl Into<String>,
        category: impl Into<String>,
        address: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FacilityKind::Hospital,
            category: category.into(),
            address: address.into(),
            phone: None,
            lat,
            lng,
            hours: None,
        }
    }

    pub fn pharmacy(
        name: impl Into<String>,
        category: impl Into<String>,
        address: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            kind: FacilityKind::Pharmacy,
            ..Self::hospital(name, category, address, lat, lng)
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_hours(mut self, hours: impl Into<String>) -> Self {
        self.hours = Some(hours.into());
        self
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Phone number, ignoring blank entries.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    pub fn hours(&self) -> Option<&str> {
        self.hours.as_deref().map(str::trim).filter(|h| !h.is_empty())
    }
}

/// A list of facilities sharing one marker style.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityGroup {
    pub marker_style: MarkerStyle,
    pub list: Vec<Facility>,
}

impl FacilityGroup {
    pub fn new(marker_style: MarkerStyle, list: Vec<Facility>) -> Self {
        Self { marker_style, list }
    }

    pub fn hospitals(list: Vec<Facility>) -> Self {
        Self::new(MarkerStyle::hospital(), list)
    }

    pub fn pharmacies(list: Vec<Facility>) -> Self {
        Self::new(MarkerStyle::pharmacy(), list)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
