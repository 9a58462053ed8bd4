use serde::{Deserialize, Serialize};

use crate::core::constants::DIRECTIONS_BASE_URL;
use crate::core::geo::{format_distance_km, LatLng};
use crate::data::facility::Facility;

/// Something the user can do from a facility popup.
///
/// Actions are plain data; the host decides how to dispatch them (open a
/// dialer, open a browser tab, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PopupAction {
    Call { phone: String },
    Directions { destination: LatLng },
}

impl PopupAction {
    pub fn label(&self) -> &'static str {
        match self {
            PopupAction::Call { .. } => "Call",
            PopupAction::Directions { .. } => "Directions",
        }
    }

    /// Link the action resolves to.
    pub fn href(&self) -> String {
        match self {
            PopupAction::Call { phone } => {
                let dialable: String = phone
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '+')
                    .collect();
                format!("tel:{}", dialable)
            }
            PopupAction::Directions { destination } => {
                format!(
                    "{}?q={},{}",
                    DIRECTIONS_BASE_URL, destination.lat, destination.lng
                )
            }
        }
    }
}

/// Detail popup shown for a facility marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupContent {
    pub title: String,
    pub subtitle: String,
    pub address: String,
    /// Distance from the reference point in kilometres
    pub distance_km: f64,
    pub hours: Option<String>,
    pub phone: Option<String>,
    pub actions: Vec<PopupAction>,
}

impl PopupContent {
    /// Builds the popup for `facility`, `distance_km` away from the reference point.
    pub fn for_facility(facility: &Facility, distance_km: f64) -> Self {
        let phone = facility.phone().map(str::to_string);
        let mut actions = Vec::with_capacity(2);
        if let Some(phone) = &phone {
            actions.push(PopupAction::Call {
                phone: phone.clone(),
            });
        }
        actions.push(PopupAction::Directions {
            destination: facility.position(),
        });

        Self {
            title: facility.name.clone(),
            subtitle: facility.category.clone(),
            address: facility.address.clone(),
            distance_km,
            hours: facility.hours().map(str::to_string),
            phone,
            actions,
        }
    }

    /// `Distance: 3.2 km`
    pub fn distance_label(&self) -> String {
        format!("Distance: {}", format_distance_km(self.distance_km))
    }

    pub fn action(&self, label: &str) -> Option<&PopupAction> {
        self.actions.iter().find(|a| a.label() == label)
    }
}

impl std::fmt::Display for PopupContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.subtitle)?;
        writeln!(f, "{}", self.address)?;
        write!(f, "{}", self.distance_label())?;
        if let Some(hours) = &self.hours {
            write!(f, "\nHours: {}", hours)?;
        }
        if let Some(phone) = &self.phone {
            write!(f, "\nPhone: {}", phone)?;
        }
        Ok(())
    }
}

/// Tracks which popup the controller has opened, so that opening a new one
/// closes the previous one first.
#[derive(Debug, Default)]
pub struct PopupTracker<K> {
    open: Option<K>,
}

impl<K: Copy + PartialEq> PopupTracker<K> {
    pub fn new() -> Self {
        Self { open: None }
    }

    /// Records `key` as open and returns the popup that must be closed, if any.
    pub fn open(&mut self, key: K) -> Option<K> {
        match self.open.replace(key) {
            Some(previous) if previous != key => Some(previous),
            _ => None,
        }
    }

    pub fn close(&mut self) -> Option<K> {
        self.open.take()
    }

    pub fn current(&self) -> Option<K> {
        self.open
    }
}
