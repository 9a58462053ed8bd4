use crate::{
    core::geo::{format_distance_km, LatLng},
    data::facility::{Facility, FacilityGroup},
    provider::{MarkerId, MarkerOptions, PopupId},
    ui::{popup::PopupContent, style::MarkerStyle},
};

/// A facility marker before it exists on a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPlan {
    /// Index of the facility group the marker came from
    pub group: usize,
    pub facility: Facility,
    pub style: MarkerStyle,
    /// Distance from the reference point in kilometres
    pub distance_km: f64,
    pub popup: PopupContent,
}

impl MarkerPlan {
    pub fn new(group: usize, facility: &Facility, style: &MarkerStyle, reference: LatLng) -> Self {
        let distance_km = reference.distance_to(&facility.position());
        Self {
            group,
            facility: facility.clone(),
            style: style.clone(),
            distance_km,
            popup: PopupContent::for_facility(facility, distance_km),
        }
    }

    pub fn options(&self) -> MarkerOptions {
        MarkerOptions {
            position: self.facility.position(),
            title: self.facility.name.clone(),
            icon: self.style.clone(),
        }
    }
}

/// One marker per facility, in group order, each measured from `reference`.
///
/// Coordinates are not validated; out-of-range records are logged and still
/// planned.
pub fn plan_markers(groups: &[FacilityGroup], reference: LatLng) -> Vec<MarkerPlan> {
    let capacity = groups.iter().map(FacilityGroup::len).sum();
    let mut plans = Vec::with_capacity(capacity);

    for (index, group) in groups.iter().enumerate() {
        for facility in &group.list {
            if !facility.position().is_valid() {
                log::warn!(
                    "Facility '{}' has out-of-range coordinates {}",
                    facility.name,
                    facility.position()
                );
            }
            plans.push(MarkerPlan::new(index, facility, &group.marker_style, reference));
        }
    }

    plans
}

/// A facility marker rendered on the current surface.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityMarker {
    pub id: MarkerId,
    pub popup_id: PopupId,
    pub plan: MarkerPlan,
}

impl FacilityMarker {
    pub fn new(id: MarkerId, popup_id: PopupId, plan: MarkerPlan) -> Self {
        Self { id, popup_id, plan }
    }

    pub fn facility(&self) -> &Facility {
        &self.plan.facility
    }

    pub fn position(&self) -> LatLng {
        self.plan.facility.position()
    }

    pub fn distance_km(&self) -> f64 {
        self.plan.distance_km
    }

    /// Distance as shown to the user, e.g. `3.2 km`.
    pub fn distance_label(&self) -> String {
        format_distance_km(self.plan.distance_km)
    }

    pub fn popup(&self) -> &PopupContent {
        &self.plan.popup
    }
}
