//! Map view builder for fluent configuration
//!
//! [`MapViewBuilder`] collects configuration, facility groups and the click
//! callback, then hands them to a [`MapView`] bound to a provider and a
//! location source.

use crate::{
    core::{
        config::{MapStyleProfile, MapViewConfig},
        geo::LatLng,
        map::{LocationSelectCallback, MapView},
    },
    data::{
        dataset::Dataset,
        facility::{Facility, FacilityGroup},
    },
    location::LocationProvider,
    provider::{LoadOptions, MapProvider},
    Result,
};

/// Builder for creating and configuring map views
#[derive(Default)]
pub struct MapViewBuilder {
    config: MapViewConfig,
    groups: Vec<FacilityGroup>,
    on_location_select: Option<LocationSelectCallback>,
}

impl MapViewBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn with_config(mut self, config: MapViewConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the fallback reference point and initial center
    pub fn with_center(mut self, center: LatLng) -> Self {
        self.config.center = center;
        self
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.config.zoom = zoom;
        self
    }

    /// Set the provider API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn with_style(mut self, style: MapStyleProfile) -> Self {
        self.config.style = style;
        self
    }

    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.config.load = load;
        self
    }

    /// Add a facility group rendered with its own marker style
    pub fn with_group(mut self, group: FacilityGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_hospitals(self, hospitals: Vec<Facility>) -> Self {
        self.with_group(FacilityGroup::hospitals(hospitals))
    }

    pub fn with_pharmacies(self, pharmacies: Vec<Facility>) -> Self {
        self.with_group(FacilityGroup::pharmacies(pharmacies))
    }

    /// Add every group of a dataset
    pub fn with_dataset(mut self, dataset: &Dataset) -> Self {
        self.groups.extend(dataset.groups());
        self
    }

    /// Report clicks on the map surface
    pub fn on_location_select<F>(mut self, callback: F) -> Self
    where
        F: FnMut(LatLng) + Send + 'static,
    {
        self.on_location_select = Some(Box::new(callback));
        self
    }

    /// Validate the configuration and build the view
    pub fn build<P, L>(self, provider: P, locator: L) -> Result<MapView<P, L>>
    where
        P: MapProvider,
        L: LocationProvider,
    {
        self.config.validate()?;

        let mut view = MapView::new(provider, locator, self.config);
        view.set_facility_groups(self.groups);
        if let Some(callback) = self.on_location_select {
            view.set_on_location_select(callback);
        }
        Ok(view)
    }
}
