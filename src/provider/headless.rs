//! In-memory mapping provider.
//!
//! Keeps every surface, marker, popup and subscription in plain maps and lets
//! the host simulate clicks. The desktop app uses it as its map backend and
//! the test suite uses it to observe exactly what the map view asked for.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::{
    input::events::MapEvent,
    prelude::{HashMap, HashSet},
    provider::{
        Credentials, EventTarget, LoadOptions, MapProvider, MarkerId, MarkerOptions, PopupId,
        ProviderError, SurfaceId, SurfaceOptions,
    },
    ui::popup::PopupContent,
    LatLng,
};

/// Which keys `load` accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyPolicy {
    AcceptAny,
    AcceptOnly(Vec<String>),
    /// Every load fails with this error
    Fail(ProviderError),
}

#[derive(Debug, Clone)]
pub struct SurfaceRecord {
    pub options: SurfaceOptions,
    pub markers: Vec<MarkerId>,
}

#[derive(Debug, Clone)]
pub struct MarkerRecord {
    pub surface: SurfaceId,
    pub options: MarkerOptions,
    /// SVG markup the icon was rendered to
    pub icon_svg: String,
    pub popup: Option<PopupId>,
}

#[derive(Debug, Clone)]
pub struct PopupRecord {
    pub marker: MarkerId,
    pub content: PopupContent,
    pub open: bool,
}

pub struct HeadlessProvider {
    policy: KeyPolicy,
    loaded_with: Option<Credentials>,
    load_calls: Vec<LoadOptions>,
    next_id: u64,
    surfaces: HashMap<SurfaceId, SurfaceRecord>,
    markers: HashMap<MarkerId, MarkerRecord>,
    popups: HashMap<PopupId, PopupRecord>,
    subscriptions: HashSet<EventTarget>,
    events: VecDeque<MapEvent>,
}

impl HeadlessProvider {
    pub fn new() -> Self {
        Self::with_policy(KeyPolicy::AcceptAny)
    }

    pub fn with_policy(policy: KeyPolicy) -> Self {
        Self {
            policy,
            loaded_with: None,
            load_calls: Vec::new(),
            next_id: 1,
            surfaces: HashMap::default(),
            markers: HashMap::default(),
            popups: HashMap::default(),
            subscriptions: HashSet::default(),
            events: VecDeque::new(),
        }
    }

    /// Accepts only the given keys.
    pub fn accepting<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_policy(KeyPolicy::AcceptOnly(
            keys.into_iter().map(Into::into).collect(),
        ))
    }

    /// Fails every load with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::with_policy(KeyPolicy::Fail(error))
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn ensure_loaded(&self) -> Result<(), ProviderError> {
        if self.loaded_with.is_some() {
            Ok(())
        } else {
            Err(ProviderError::NotLoaded)
        }
    }

    /// Simulates a click on the surface. Queued only when someone subscribed.
    pub fn click_map(&mut self, surface: SurfaceId, lat_lng: LatLng) -> bool {
        let subscribed = self.surfaces.contains_key(&surface)
            && self.subscriptions.contains(&EventTarget::Surface(surface));
        if subscribed {
            self.events.push_back(MapEvent::Click { surface, lat_lng });
        }
        subscribed
    }

    /// Simulates a click on a marker. Queued only when someone subscribed.
    pub fn click_marker(&mut self, marker: MarkerId) -> bool {
        let subscribed = self.markers.contains_key(&marker)
            && self.subscriptions.contains(&EventTarget::Marker(marker));
        if subscribed {
            self.events.push_back(MapEvent::MarkerClick { marker });
        }
        subscribed
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.len()
    }

    pub fn last_load_options(&self) -> Option<&LoadOptions> {
        self.load_calls.last()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_with.is_some()
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn surface(&self, surface: SurfaceId) -> Option<&SurfaceRecord> {
        self.surfaces.get(&surface)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn marker(&self, marker: MarkerId) -> Option<&MarkerRecord> {
        self.markers.get(&marker)
    }

    /// Markers on `surface`, in creation order.
    pub fn markers_on(&self, surface: SurfaceId) -> Vec<(MarkerId, &MarkerOptions)> {
        self.surfaces
            .get(&surface)
            .map(|record| {
                record
                    .markers
                    .iter()
                    .filter_map(|id| self.markers.get(id).map(|m| (*id, &m.options)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn popup(&self, popup: PopupId) -> Option<&PopupRecord> {
        self.popups.get(&popup)
    }

    pub fn popup_count(&self) -> usize {
        self.popups.len()
    }

    /// Open popups as `(popup, anchor marker)`, sorted by popup id.
    pub fn open_popups(&self) -> Vec<(PopupId, MarkerId)> {
        let mut open: Vec<_> = self
            .popups
            .iter()
            .filter(|(_, p)| p.open)
            .map(|(id, p)| (*id, p.marker))
            .collect();
        open.sort();
        open
    }

    pub fn is_subscribed(&self, target: EventTarget) -> bool {
        self.subscriptions.contains(&target)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Default for HeadlessProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MapProvider for HeadlessProvider {
    fn name(&self) -> &str {
        "headless"
    }

    async fn load(
        &mut self,
        credentials: &Credentials,
        options: &LoadOptions,
    ) -> Result<(), ProviderError> {
        self.load_calls.push(options.clone());

        let accepted = match &self.policy {
            KeyPolicy::AcceptAny => Ok(()),
            KeyPolicy::AcceptOnly(keys) => {
                if keys.iter().any(|k| k == credentials.expose()) {
                    Ok(())
                } else {
                    Err(ProviderError::InvalidCredentials)
                }
            }
            KeyPolicy::Fail(error) => Err(error.clone()),
        };

        match accepted {
            Ok(()) => {
                self.loaded_with = Some(credentials.clone());
                Ok(())
            }
            Err(error) => {
                self.loaded_with = None;
                Err(error)
            }
        }
    }

    fn create_surface(&mut self, options: &SurfaceOptions) -> Result<SurfaceId, ProviderError> {
        self.ensure_loaded()?;
        let id = SurfaceId(self.next_id());
        self.surfaces.insert(
            id,
            SurfaceRecord {
                options: options.clone(),
                markers: Vec::new(),
            },
        );
        Ok(id)
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        if let Some(record) = self.surfaces.remove(&surface) {
            for marker in record.markers {
                self.remove_marker(marker);
            }
        }
        self.subscriptions.remove(&EventTarget::Surface(surface));
        self.events.retain(|event| match event {
            MapEvent::Click { surface: s, .. } => *s != surface,
            MapEvent::MarkerClick { .. } => true,
        });
    }

    fn create_marker(
        &mut self,
        surface: SurfaceId,
        options: &MarkerOptions,
    ) -> Result<MarkerId, ProviderError> {
        self.ensure_loaded()?;
        if !self.surfaces.contains_key(&surface) {
            return Err(ProviderError::UnknownSurface(surface));
        }

        let id = MarkerId(self.next_id());
        self.markers.insert(
            id,
            MarkerRecord {
                surface,
                options: options.clone(),
                icon_svg: options.icon.icon_svg(),
                popup: None,
            },
        );
        if let Some(record) = self.surfaces.get_mut(&surface) {
            record.markers.push(id);
        }
        Ok(id)
    }

    fn remove_marker(&mut self, marker: MarkerId) {
        if let Some(record) = self.markers.remove(&marker) {
            if let Some(popup) = record.popup {
                self.popups.remove(&popup);
            }
            if let Some(surface) = self.surfaces.get_mut(&record.surface) {
                surface.markers.retain(|m| *m != marker);
            }
        }
        self.subscriptions.remove(&EventTarget::Marker(marker));
        self.events
            .retain(|event| *event != MapEvent::MarkerClick { marker });
    }

    fn create_popup(
        &mut self,
        marker: MarkerId,
        content: &PopupContent,
    ) -> Result<PopupId, ProviderError> {
        self.ensure_loaded()?;
        if !self.markers.contains_key(&marker) {
            return Err(ProviderError::UnknownMarker(marker));
        }

        let id = PopupId(self.next_id());
        if let Some(record) = self.markers.get_mut(&marker) {
            // One popup per marker; a replaced popup goes away.
            if let Some(previous) = record.popup.replace(id) {
                self.popups.remove(&previous);
            }
        }
        self.popups.insert(
            id,
            PopupRecord {
                marker,
                content: content.clone(),
                open: false,
            },
        );
        Ok(id)
    }

    fn open_popup(&mut self, popup: PopupId) -> Result<(), ProviderError> {
        let record = self
            .popups
            .get_mut(&popup)
            .ok_or(ProviderError::UnknownPopup(popup))?;
        record.open = true;
        Ok(())
    }

    fn close_popup(&mut self, popup: PopupId) {
        if let Some(record) = self.popups.get_mut(&popup) {
            record.open = false;
        }
    }

    fn subscribe(&mut self, target: EventTarget) -> Result<(), ProviderError> {
        match target {
            EventTarget::Surface(surface) if !self.surfaces.contains_key(&surface) => {
                return Err(ProviderError::UnknownSurface(surface));
            }
            EventTarget::Marker(marker) if !self.markers.contains_key(&marker) => {
                return Err(ProviderError::UnknownMarker(marker));
            }
            _ => {}
        }
        self.subscriptions.insert(target);
        Ok(())
    }

    fn unsubscribe(&mut self, target: EventTarget) {
        self.subscriptions.remove(&target);
    }

    fn drain_events(&mut self) -> Vec<MapEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::style::MarkerStyle;

    fn creds(key: &str) -> Credentials {
        Credentials::new(key).unwrap()
    }

    fn surface_options() -> SurfaceOptions {
        SurfaceOptions {
            center: LatLng::new(20.296, 85.824),
            zoom: 12,
            styles: Vec::new(),
        }
    }

    fn marker_options(title: &str) -> MarkerOptions {
        MarkerOptions {
            position: LatLng::new(20.3, 85.8),
            title: title.to_string(),
            icon: MarkerStyle::hospital(),
        }
    }

    #[tokio::test]
    async fn test_key_policy() {
        let mut provider = HeadlessProvider::accepting(["good-key"]);
        let options = LoadOptions::default();

        assert_eq!(
            provider.load(&creds("bad-key"), &options).await,
            Err(ProviderError::InvalidCredentials)
        );
        assert!(!provider.is_loaded());
        assert!(provider.load(&creds("good-key"), &options).await.is_ok());
        assert!(provider.is_loaded());
        assert_eq!(provider.load_calls(), 2);
    }

    #[tokio::test]
    async fn test_nothing_before_load() {
        let mut provider = HeadlessProvider::new();
        assert_eq!(
            provider.create_surface(&surface_options()),
            Err(ProviderError::NotLoaded)
        );
    }

    #[tokio::test]
    async fn test_destroy_surface_cascades() {
        let mut provider = HeadlessProvider::new();
        provider
            .load(&creds("k"), &LoadOptions::default())
            .await
            .unwrap();

        let surface = provider.create_surface(&surface_options()).unwrap();
        let marker = provider
            .create_marker(surface, &marker_options("A"))
            .unwrap();
        let popup = provider
            .create_popup(
                marker,
                &PopupContent {
                    title: "A".into(),
                    subtitle: String::new(),
                    address: String::new(),
                    distance_km: 0.0,
                    hours: None,
                    phone: None,
                    actions: Vec::new(),
                },
            )
            .unwrap();
        provider.subscribe(EventTarget::Marker(marker)).unwrap();
        provider.subscribe(EventTarget::Surface(surface)).unwrap();
        provider.open_popup(popup).unwrap();
        assert_eq!(provider.open_popups(), vec![(popup, marker)]);

        provider.destroy_surface(surface);
        assert_eq!(provider.surface_count(), 0);
        assert_eq!(provider.marker_count(), 0);
        assert_eq!(provider.popup_count(), 0);
        assert_eq!(provider.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_marker_records_rendered_icon() {
        let mut provider = HeadlessProvider::new();
        provider
            .load(&creds("k"), &LoadOptions::default())
            .await
            .unwrap();
        let surface = provider.create_surface(&surface_options()).unwrap();
        let marker = provider
            .create_marker(surface, &marker_options("A"))
            .unwrap();

        let record = provider.marker(marker).unwrap();
        assert_eq!(record.icon_svg, MarkerStyle::hospital().icon_svg());
        assert!(record.icon_svg.contains("#dc2626"));
    }

    #[tokio::test]
    async fn test_clicks_need_subscription() {
        let mut provider = HeadlessProvider::new();
        provider
            .load(&creds("k"), &LoadOptions::default())
            .await
            .unwrap();
        let surface = provider.create_surface(&surface_options()).unwrap();
        let marker = provider
            .create_marker(surface, &marker_options("A"))
            .unwrap();

        assert!(!provider.click_map(surface, LatLng::new(1.0, 2.0)));
        assert!(!provider.click_marker(marker));
        assert!(provider.drain_events().is_empty());

        provider.subscribe(EventTarget::Surface(surface)).unwrap();
        assert!(provider.click_map(surface, LatLng::new(1.0, 2.0)));
        assert_eq!(
            provider.drain_events(),
            vec![MapEvent::Click {
                surface,
                lat_lng: LatLng::new(1.0, 2.0)
            }]
        );
        assert!(provider.drain_events().is_empty());
    }
}
