use std::sync::Arc;

use crate::{
    core::{
        config::MapViewConfig,
        constants::{PROVIDER_LOAD_ERROR_MESSAGE, USER_MARKER_TITLE},
        geo::LatLng,
    },
    data::facility::FacilityGroup,
    input::events::{EventHandled, MapEvent},
    layers::{
        manager::MarkerSet,
        marker::{plan_markers, FacilityMarker},
    },
    location::{LocationError, LocationProvider},
    provider::{
        Credentials, EventTarget, MapProvider, MarkerId, MarkerOptions, ProviderError, SurfaceId,
        SurfaceOptions,
    },
    ui::{popup::PopupTracker, style::MarkerStyle},
    Error, Result,
};

/// Lifecycle of a map view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapState {
    /// No credentials yet; the host should show the credential-entry form.
    AwaitingCredentials,
    /// Credentials present, session being (re)built.
    Initializing,
    /// Surface and markers are live.
    Ready,
    /// The provider failed. Holds the message to show the user.
    Error(String),
}

impl std::fmt::Display for MapState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapState::AwaitingCredentials => write!(f, "awaiting credentials"),
            MapState::Initializing => write!(f, "initializing"),
            MapState::Ready => write!(f, "ready"),
            MapState::Error(message) => write!(f, "error: {}", message),
        }
    }
}

/// Host callback for clicks on the map surface.
pub type LocationSelectCallback = Box<dyn FnMut(LatLng) + Send>;

/// Identifies the session a location lookup was started for.
///
/// Results delivered with a ticket from a torn-down session are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationTicket {
    generation: u64,
}

/// Binds a facility list and a reference point to a provider map surface.
///
/// Every input change that affects what is drawn rebuilds the markers from
/// scratch; center and zoom changes also recreate the surface.
pub struct MapView<P, L> {
    provider: P,
    locator: Arc<L>,
    config: MapViewConfig,
    groups: Vec<FacilityGroup>,
    credentials: Option<Credentials>,
    /// Credentials the provider SDK is currently loaded with
    loaded_with: Option<Credentials>,
    state: MapState,
    user_location: Option<LatLng>,
    location_attempted: bool,
    surface: Option<SurfaceId>,
    user_marker: Option<MarkerId>,
    markers: MarkerSet,
    popups: PopupTracker<MarkerId>,
    on_location_select: Option<LocationSelectCallback>,
    generation: u64,
}

impl<P, L> MapView<P, L>
where
    P: MapProvider,
    L: LocationProvider,
{
    pub fn new(provider: P, locator: L, config: MapViewConfig) -> Self {
        Self::with_shared_locator(provider, Arc::new(locator), config)
    }

    pub fn with_shared_locator(provider: P, locator: Arc<L>, config: MapViewConfig) -> Self {
        let credentials = config.credentials();
        let state = if credentials.is_some() {
            MapState::Initializing
        } else {
            MapState::AwaitingCredentials
        };

        Self {
            provider,
            locator,
            config,
            groups: Vec::new(),
            credentials,
            loaded_with: None,
            state,
            user_location: None,
            location_attempted: false,
            surface: None,
            user_marker: None,
            markers: MarkerSet::new(),
            popups: PopupTracker::new(),
            on_location_select: None,
            generation: 0,
        }
    }

    /// Accepts credentials from the entry form. Blank input is rejected.
    pub fn submit_credentials(&mut self, key: &str) -> Result<()> {
        let credentials = Credentials::new(key).ok_or(Error::MissingCredentials)?;
        let changed = self.credentials.as_ref() != Some(&credentials);

        if !changed && self.state == MapState::Ready {
            return Ok(());
        }

        self.teardown_session();
        if changed {
            // A new key starts a new session: location is resolved again.
            self.reset_session();
        }
        self.credentials = Some(credentials);
        self.state = MapState::Initializing;
        log::debug!("Credentials submitted, map view initializing");
        Ok(())
    }

    /// Runs a full activation: loads the provider, renders the markers and
    /// resolves the user's location once. Returns whether the view is ready.
    ///
    /// Location lookup and provider loading run concurrently. A resolved
    /// location rebuilds the markers against it.
    pub async fn activate(&mut self) -> bool {
        if self.credentials.is_none() {
            self.state = MapState::AwaitingCredentials;
            log::debug!("No credentials, waiting for the user to enter a key");
            return false;
        }

        if self.location_attempted {
            return self.initialize().await;
        }

        self.location_attempted = true;
        let ticket = self.location_ticket();
        let locator = Arc::clone(&self.locator);
        let (ready, outcome) =
            futures::future::join(self.initialize(), locator.resolve_once()).await;
        self.apply_location(ticket, outcome);

        ready && self.is_ready()
    }

    /// Loads the provider if needed and renders the session with the current
    /// reference point. Returns whether the view is ready.
    pub async fn initialize(&mut self) -> bool {
        let Some(credentials) = self.credentials.clone() else {
            self.state = MapState::AwaitingCredentials;
            return false;
        };

        self.state = MapState::Initializing;

        if self.loaded_with.as_ref() != Some(&credentials) {
            log::debug!(
                "Loading map provider '{}' ({})",
                self.provider.name(),
                self.config.load.version
            );
            if let Err(error) = self.provider.load(&credentials, &self.config.load).await {
                self.fail(error);
                return false;
            }
            self.loaded_with = Some(credentials);
        }

        if let Err(error) = self.build_session(true) {
            self.fail(error);
            return false;
        }
        true
    }

    /// Ticket for a location lookup started now.
    pub fn location_ticket(&self) -> LocationTicket {
        LocationTicket {
            generation: self.generation,
        }
    }

    /// Delivers a location lookup result. Returns whether it was applied.
    ///
    /// Stale tickets and failures are ignored; failures keep the configured
    /// center as the reference point. The first resolved position of a
    /// session sticks.
    pub fn apply_location(
        &mut self,
        ticket: LocationTicket,
        outcome: std::result::Result<LatLng, LocationError>,
    ) -> bool {
        if ticket.generation != self.generation {
            log::debug!("Discarding location result from a torn-down session");
            return false;
        }
        self.location_attempted = true;

        match outcome {
            Ok(position) => {
                if self.user_location.is_some() {
                    return false;
                }
                log::debug!(
                    "Location resolved via '{}': {}",
                    self.locator.name(),
                    position
                );
                self.user_location = Some(position);
                self.rebuild(false);
                true
            }
            Err(error) => {
                log::debug!(
                    "Geolocation unavailable ({}), using default center {}",
                    error,
                    self.config.center
                );
                false
            }
        }
    }

    pub fn set_facility_groups(&mut self, groups: Vec<FacilityGroup>) {
        self.groups = groups;
        self.rebuild(false);
    }

    pub fn set_center(&mut self, center: LatLng) {
        if self.config.center != center {
            self.config.center = center;
            self.rebuild(true);
        }
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        if self.config.zoom != zoom {
            self.config.zoom = zoom;
            self.rebuild(true);
        }
    }

    /// Reports every click on the map surface to `callback`.
    pub fn set_on_location_select<F>(&mut self, callback: F)
    where
        F: FnMut(LatLng) + Send + 'static,
    {
        self.on_location_select = Some(Box::new(callback));
        self.rebuild(false);
    }

    pub fn clear_on_location_select(&mut self) {
        if self.on_location_select.take().is_some() {
            self.rebuild(false);
        }
    }

    /// Drains provider events and dispatches them. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let events = self.provider.drain_events();
        events
            .into_iter()
            .filter(|event| self.handle_event(event.clone()) == EventHandled::Handled)
            .count()
    }

    pub fn handle_event(&mut self, event: MapEvent) -> EventHandled {
        if self.state != MapState::Ready {
            return EventHandled::NotHandled;
        }

        match event {
            MapEvent::MarkerClick { marker } => self.open_marker_popup(marker),
            MapEvent::Click { surface, lat_lng } => {
                if self.surface != Some(surface) {
                    return EventHandled::NotHandled;
                }
                match self.on_location_select.as_mut() {
                    Some(callback) => {
                        callback(lat_lng);
                        EventHandled::Handled
                    }
                    None => EventHandled::NotHandled,
                }
            }
        }
    }

    fn open_marker_popup(&mut self, marker: MarkerId) -> EventHandled {
        let Some(popup) = self.markers.get(marker).map(|m| m.popup_id) else {
            return EventHandled::NotHandled;
        };

        if let Some(previous) = self.popups.open(marker) {
            if let Some(previous) = self.markers.get(previous) {
                self.provider.close_popup(previous.popup_id);
            }
        }

        match self.provider.open_popup(popup) {
            Ok(()) => EventHandled::Handled,
            Err(error) => {
                log::warn!("Could not open popup for {}: {}", marker, error);
                self.popups.close();
                EventHandled::NotHandled
            }
        }
    }

    /// Closes the popup opened by the last marker click, if any.
    pub fn close_popup(&mut self) {
        if let Some(marker) = self.popups.close() {
            if let Some(marker) = self.markers.get(marker) {
                self.provider.close_popup(marker.popup_id);
            }
        }
    }

    /// Ends the session. Late location results for it are discarded; the
    /// next activation resolves the location again.
    pub fn teardown(&mut self) {
        self.teardown_session();
        self.reset_session();
        self.state = if self.credentials.is_some() {
            MapState::Initializing
        } else {
            MapState::AwaitingCredentials
        };
        log::debug!("Map view torn down");
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == MapState::Ready
    }

    pub fn awaiting_credentials(&self) -> bool {
        self.state == MapState::AwaitingCredentials
    }

    /// Message for the user when the provider failed.
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            MapState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Where distances are measured from: the resolved user location, else the center.
    pub fn reference_point(&self) -> LatLng {
        self.user_location.unwrap_or(self.config.center)
    }

    pub fn user_location(&self) -> Option<LatLng> {
        self.user_location
    }

    pub fn center(&self) -> LatLng {
        self.config.center
    }

    pub fn zoom(&self) -> u8 {
        self.config.zoom
    }

    pub fn config(&self) -> &MapViewConfig {
        &self.config
    }

    pub fn facility_groups(&self) -> &[FacilityGroup] {
        &self.groups
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn marker_for(&self, id: MarkerId) -> Option<&FacilityMarker> {
        self.markers.get(id)
    }

    pub fn user_marker(&self) -> Option<MarkerId> {
        self.user_marker
    }

    /// Marker whose popup is open.
    pub fn open_popup(&self) -> Option<&FacilityMarker> {
        self.popups.current().and_then(|id| self.markers.get(id))
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn locator(&self) -> Arc<L> {
        Arc::clone(&self.locator)
    }

    fn rebuild(&mut self, recreate_surface: bool) {
        if self.state != MapState::Ready {
            return;
        }
        if let Err(error) = self.build_session(recreate_surface) {
            self.fail(error);
        }
    }

    fn build_session(&mut self, recreate_surface: bool) -> std::result::Result<(), ProviderError> {
        self.state = MapState::Initializing;
        self.clear_markers();

        let surface = match self.surface {
            Some(surface) if !recreate_surface => surface,
            _ => self.replace_surface()?,
        };

        let target = EventTarget::Surface(surface);
        if self.on_location_select.is_some() {
            self.provider.subscribe(target)?;
        } else {
            self.provider.unsubscribe(target);
        }

        let reference = self.reference_point();
        for plan in plan_markers(&self.groups, reference) {
            let marker = self.provider.create_marker(surface, &plan.options())?;
            let popup = self.provider.create_popup(marker, &plan.popup)?;
            self.provider.subscribe(EventTarget::Marker(marker))?;
            self.markers.insert(FacilityMarker::new(marker, popup, plan));
        }

        if let Some(position) = self.user_location {
            let marker = self.provider.create_marker(
                surface,
                &MarkerOptions {
                    position,
                    title: USER_MARKER_TITLE.to_string(),
                    icon: MarkerStyle::user_location(),
                },
            )?;
            self.user_marker = Some(marker);
        }

        self.state = MapState::Ready;
        log::debug!(
            "Rendered {} facility markers on {} measured from {}",
            self.markers.len(),
            surface,
            reference
        );
        Ok(())
    }

    fn replace_surface(&mut self) -> std::result::Result<SurfaceId, ProviderError> {
        if let Some(old) = self.surface.take() {
            self.provider.destroy_surface(old);
        }
        let surface = self.provider.create_surface(&SurfaceOptions {
            center: self.config.center,
            zoom: self.config.zoom,
            styles: self.config.style.resolve(),
        })?;
        self.surface = Some(surface);
        Ok(surface)
    }

    fn clear_markers(&mut self) {
        self.popups.close();
        for marker in self.markers.drain() {
            self.provider.remove_marker(marker.id);
        }
        if let Some(marker) = self.user_marker.take() {
            self.provider.remove_marker(marker);
        }
    }

    fn teardown_session(&mut self) {
        self.clear_markers();
        if let Some(surface) = self.surface.take() {
            self.provider.destroy_surface(surface);
        }
    }

    /// Invalidates outstanding location tickets and forgets the resolved position.
    fn reset_session(&mut self) {
        self.generation += 1;
        self.user_location = None;
        self.location_attempted = false;
    }

    fn fail(&mut self, error: ProviderError) {
        log::error!("Map provider '{}' failed: {}", self.provider.name(), error);
        self.teardown_session();
        self.loaded_with = None;
        self.state = MapState::Error(PROVIDER_LOAD_ERROR_MESSAGE.to_string());
    }
}
