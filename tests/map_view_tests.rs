use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use medimap::{
    constants::{PROVIDER_LOAD_ERROR_MESSAGE, USER_MARKER_TITLE},
    prelude::*,
};

/// Integration tests driving a map view through the headless provider
#[cfg(test)]
mod map_view_tests {
    use super::*;

    fn hospitals() -> Vec<Facility> {
        vec![
            Facility::hospital("AIIMS", "Government", "Sijua, Patrapada", 20.2327, 85.7740)
                .with_phone("0674-2476789"),
            Facility::hospital("Capital Hospital", "Government", "Unit 6", 20.2599, 85.8239),
        ]
    }

    fn pharmacies() -> Vec<Facility> {
        vec![Facility::pharmacy(
            "Apollo Pharmacy",
            "Retail",
            "Saheed Nagar",
            20.2879,
            85.8446,
        )
        .with_hours("24x7")]
    }

    /// Resolves to a fixed position and counts lookups.
    struct CountingLocation {
        position: LatLng,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LocationProvider for CountingLocation {
        fn name(&self) -> &str {
            "counting"
        }

        async fn resolve_once(&self) -> std::result::Result<LatLng, LocationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.position)
        }
    }

    /// Headless provider that can be told to fail after loading succeeded.
    struct FaultyProvider {
        inner: HeadlessProvider,
        /// Markers that may still be created before `create_marker` fails
        markers_left: Option<usize>,
        fail_surfaces: bool,
    }

    impl FaultyProvider {
        fn new() -> Self {
            Self {
                inner: HeadlessProvider::new(),
                markers_left: None,
                fail_surfaces: false,
            }
        }

        fn fail_after_markers(&mut self, count: usize) {
            self.markers_left = Some(count);
        }

        fn heal(&mut self) {
            self.markers_left = None;
            self.fail_surfaces = false;
        }
    }

    #[async_trait]
    impl MapProvider for FaultyProvider {
        fn name(&self) -> &str {
            "faulty"
        }

        async fn load(
            &mut self,
            credentials: &Credentials,
            options: &LoadOptions,
        ) -> std::result::Result<(), ProviderError> {
            self.inner.load(credentials, options).await
        }

        fn create_surface(
            &mut self,
            options: &SurfaceOptions,
        ) -> std::result::Result<SurfaceId, ProviderError> {
            if self.fail_surfaces {
                return Err(ProviderError::LoadFailed("surface refused".to_string()));
            }
            self.inner.create_surface(options)
        }

        fn destroy_surface(&mut self, surface: SurfaceId) {
            self.inner.destroy_surface(surface)
        }

        fn create_marker(
            &mut self,
            surface: SurfaceId,
            options: &MarkerOptions,
        ) -> std::result::Result<MarkerId, ProviderError> {
            if let Some(left) = self.markers_left.as_mut() {
                if *left == 0 {
                    return Err(ProviderError::LoadFailed("marker refused".to_string()));
                }
                *left -= 1;
            }
            self.inner.create_marker(surface, options)
        }

        fn remove_marker(&mut self, marker: MarkerId) {
            self.inner.remove_marker(marker)
        }

        fn create_popup(
            &mut self,
            marker: MarkerId,
            content: &PopupContent,
        ) -> std::result::Result<PopupId, ProviderError> {
            self.inner.create_popup(marker, content)
        }

        fn open_popup(&mut self, popup: PopupId) -> std::result::Result<(), ProviderError> {
            self.inner.open_popup(popup)
        }

        fn close_popup(&mut self, popup: PopupId) {
            self.inner.close_popup(popup)
        }

        fn subscribe(&mut self, target: EventTarget) -> std::result::Result<(), ProviderError> {
            self.inner.subscribe(target)
        }

        fn unsubscribe(&mut self, target: EventTarget) {
            self.inner.unsubscribe(target)
        }

        fn drain_events(&mut self) -> Vec<MapEvent> {
            self.inner.drain_events()
        }
    }

    fn all_groups() -> Vec<FacilityGroup> {
        vec![
            FacilityGroup::hospitals(hospitals()),
            FacilityGroup::pharmacies(pharmacies()),
        ]
    }

    fn faulty_view() -> MapView<FaultyProvider, UnavailableLocation> {
        let mut view = MapView::new(
            FaultyProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );
        view.set_facility_groups(all_groups());
        view
    }

    fn assert_failed_clean(view: &MapView<FaultyProvider, UnavailableLocation>) {
        assert_eq!(
            view.state(),
            &MapState::Error(PROVIDER_LOAD_ERROR_MESSAGE.to_string())
        );
        assert!(view.markers().is_empty());
        assert!(view.surface().is_none());
        assert!(view.user_marker().is_none());
        assert_eq!(view.provider().inner.surface_count(), 0);
        assert_eq!(view.provider().inner.marker_count(), 0);
        assert_eq!(view.provider().inner.popup_count(), 0);
    }

    fn key_config() -> MapViewConfig {
        MapViewConfig {
            api_key: Some("valid-key".to_string()),
            ..Default::default()
        }
    }

    fn view_with<L: LocationProvider>(
        provider: HeadlessProvider,
        locator: L,
        config: MapViewConfig,
    ) -> MapView<HeadlessProvider, L> {
        let mut view = MapView::new(provider, locator, config);
        view.set_facility_groups(all_groups());
        view
    }

    #[tokio::test]
    async fn test_failed_location_measures_from_center() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );

        assert!(view.activate().await);
        assert_eq!(view.user_location(), None);
        assert_eq!(view.reference_point(), view.center());
        assert!(view.user_marker().is_none());

        for marker in view.markers().iter() {
            assert_eq!(
                marker.distance_km(),
                distance_km(view.center(), marker.position())
            );
        }
    }

    #[tokio::test]
    async fn test_resolved_location_measures_from_user() {
        let here = LatLng::new(20.35, 85.81);
        let mut view = view_with(HeadlessProvider::new(), FixedLocation(here), key_config());

        assert!(view.activate().await);
        assert_eq!(view.user_location(), Some(here));
        assert_eq!(view.reference_point(), here);

        for marker in view.markers().iter() {
            assert_eq!(marker.distance_km(), distance_km(here, marker.position()));
            assert_eq!(
                marker.popup().distance_label(),
                format!("Distance: {}", format_distance_km(marker.distance_km()))
            );
        }

        let user_marker = view.user_marker().unwrap();
        let record = view.provider().marker(user_marker).unwrap();
        assert_eq!(record.options.title, USER_MARKER_TITLE);
        assert_eq!(record.options.position, here);
        assert_eq!(record.options.icon, MarkerStyle::user_location());
        assert!(record.popup.is_none());
    }

    #[tokio::test]
    async fn test_late_location_recomputes_all_distances() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation(LocationError::Unavailable("no fix yet".to_string())),
            key_config(),
        );
        assert!(view.activate().await);
        let before: Vec<f64> = view.markers().iter().map(|m| m.distance_km()).collect();

        let late = LatLng::new(20.2879, 85.8446);
        let ticket = view.location_ticket();
        assert!(view.apply_location(ticket, Ok(late)));

        let after: Vec<f64> = view.markers().iter().map(|m| m.distance_km()).collect();
        assert_eq!(after.len(), before.len());
        assert_ne!(after, before);
        for marker in view.markers().iter() {
            assert_eq!(marker.distance_km(), distance_km(late, marker.position()));
        }
        // The pharmacy sits on the user's position.
        assert_eq!(view.markers().iter().last().unwrap().distance_label(), "0.0 km");
    }

    #[tokio::test]
    async fn test_first_location_sticks_for_the_session() {
        let here = LatLng::new(20.35, 85.81);
        let mut view = view_with(HeadlessProvider::new(), FixedLocation(here), key_config());
        view.activate().await;

        let ticket = view.location_ticket();
        assert!(!view.apply_location(ticket, Ok(LatLng::new(20.0, 85.0))));
        assert_eq!(view.user_location(), Some(here));
    }

    #[tokio::test]
    async fn test_stale_location_is_discarded() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );
        view.activate().await;
        let ticket = view.location_ticket();

        view.teardown();
        assert!(!view.apply_location(ticket, Ok(LatLng::new(20.35, 85.81))));
        assert_eq!(view.user_location(), None);
        assert_eq!(view.provider().marker_count(), 0);
        assert_eq!(view.provider().surface_count(), 0);
    }

    #[tokio::test]
    async fn test_no_credentials_never_loads_provider() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            MapViewConfig::default(),
        );

        assert!(!view.activate().await);
        assert!(view.awaiting_credentials());
        assert_eq!(view.provider().load_calls(), 0);
        assert_eq!(view.provider().surface_count(), 0);

        assert!(matches!(
            view.submit_credentials("   "),
            Err(MapError::MissingCredentials)
        ));
        assert!(view.awaiting_credentials());
    }

    #[tokio::test]
    async fn test_submitted_credentials_activate_the_map() {
        let mut view = view_with(
            HeadlessProvider::accepting(["good-key"]),
            UnavailableLocation::denied(),
            MapViewConfig::default(),
        );

        view.submit_credentials(" good-key ").unwrap();
        assert_eq!(view.state(), &MapState::Initializing);
        assert!(view.activate().await);
        assert_eq!(view.provider().load_calls(), 1);
        assert_eq!(view.markers().len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_credentials_show_error_and_no_markers() {
        let mut view = view_with(
            HeadlessProvider::accepting(["good-key"]),
            UnavailableLocation::denied(),
            key_config(),
        );

        assert!(!view.activate().await);
        assert_eq!(view.error_message(), Some(PROVIDER_LOAD_ERROR_MESSAGE));
        assert!(!view.error_message().unwrap().is_empty());
        assert!(view.markers().is_empty());
        assert_eq!(view.provider().marker_count(), 0);
        assert_eq!(view.provider().surface_count(), 0);

        // Retrying with a good key recovers.
        view.submit_credentials("good-key").unwrap();
        assert!(view.activate().await);
        assert_eq!(view.markers().len(), 3);
        assert_eq!(view.error_message(), None);
    }

    #[tokio::test]
    async fn test_one_marker_per_facility() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );
        view.activate().await;

        let surface = view.surface().unwrap();
        assert_eq!(view.markers().len(), 3);
        assert_eq!(view.provider().markers_on(surface).len(), 3);
        assert_eq!(view.provider().popup_count(), 3);

        let titles: Vec<_> = view
            .markers()
            .iter()
            .map(|m| m.facility().name.clone())
            .collect();
        assert_eq!(titles, vec!["AIIMS", "Capital Hospital", "Apollo Pharmacy"]);

        let styles: Vec<_> = view
            .markers()
            .iter()
            .map(|m| view.provider().marker(m.id).unwrap().options.icon.clone())
            .collect();
        assert_eq!(
            styles,
            vec![
                MarkerStyle::hospital(),
                MarkerStyle::hospital(),
                MarkerStyle::pharmacy()
            ]
        );
    }

    #[tokio::test]
    async fn test_list_change_replaces_markers() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );
        view.activate().await;
        let old_ids = view.markers().ids();

        view.set_facility_groups(vec![FacilityGroup::pharmacies(pharmacies())]);
        assert_eq!(view.markers().len(), 1);
        assert_eq!(view.provider().marker_count(), 1);
        for id in old_ids {
            assert!(view.provider().marker(id).is_none());
        }

        view.set_facility_groups(Vec::new());
        assert!(view.markers().is_empty());
        assert_eq!(view.provider().marker_count(), 0);
        assert!(view.is_ready());
    }

    #[tokio::test]
    async fn test_at_most_one_popup_open() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );
        view.activate().await;
        let ids = view.markers().ids();

        for id in &ids {
            assert!(view.provider_mut().click_marker(*id));
            assert_eq!(view.process_events(), 1);
            assert_eq!(view.provider().open_popups().len(), 1);
            assert_eq!(view.open_popup().unwrap().id, *id);
        }

        view.close_popup();
        assert!(view.provider().open_popups().is_empty());
        assert!(view.open_popup().is_none());
    }

    #[tokio::test]
    async fn test_popup_content_for_facility() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );
        view.activate().await;

        let aiims = view.markers().iter().next().unwrap().clone();
        let popup = aiims.popup();
        assert_eq!(popup.title, "AIIMS");
        assert_eq!(
            popup.action("Call").unwrap().href(),
            "tel:06742476789".to_string()
        );
        assert_eq!(
            popup.action("Directions").unwrap().href(),
            format!("https://maps.google.com/?q={},{}", 20.2327, 85.7740)
        );

        let apollo = view.markers().iter().last().unwrap();
        assert!(apollo.popup().action("Call").is_none());
        assert_eq!(apollo.popup().hours.as_deref(), Some("24x7"));
    }

    #[tokio::test]
    async fn test_map_click_reaches_callback_once() {
        let clicks = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&clicks);

        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );
        view.set_on_location_select(move |position| sink.lock().unwrap().push(position));
        view.activate().await;

        let surface = view.surface().unwrap();
        let target = LatLng::new(20.30, 85.83);
        assert!(view.provider_mut().click_map(surface, target));
        assert_eq!(view.process_events(), 1);
        assert_eq!(*clicks.lock().unwrap(), vec![target]);

        // Marker clicks open popups but never report a location.
        let marker = view.markers().ids()[0];
        view.provider_mut().click_marker(marker);
        view.process_events();
        assert_eq!(clicks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_map_click_without_callback_is_ignored() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );
        view.activate().await;

        let surface = view.surface().unwrap();
        assert!(!view.provider().is_subscribed(EventTarget::Surface(surface)));
        assert!(!view
            .provider_mut()
            .click_map(surface, LatLng::new(20.3, 85.8)));
        assert_eq!(view.process_events(), 0);
    }

    #[tokio::test]
    async fn test_center_change_recreates_surface() {
        let mut view = view_with(
            HeadlessProvider::new(),
            UnavailableLocation::denied(),
            key_config(),
        );
        view.activate().await;
        let first = view.surface().unwrap();

        let center = LatLng::new(20.30, 85.85);
        view.set_center(center);
        let second = view.surface().unwrap();

        assert_ne!(first, second);
        assert!(view.provider().surface(first).is_none());
        assert_eq!(view.provider().surface(second).unwrap().options.center, center);
        assert_eq!(view.provider().load_calls(), 1);
        for marker in view.markers().iter() {
            assert_eq!(marker.distance_km(), distance_km(center, marker.position()));
        }
    }

    #[tokio::test]
    async fn test_reactivation_after_teardown() {
        let here = LatLng::new(20.35, 85.81);
        let mut view = view_with(HeadlessProvider::new(), FixedLocation(here), key_config());
        view.activate().await;
        view.teardown();
        assert!(view.user_location().is_none());

        assert!(view.activate().await);
        assert_eq!(view.user_location(), Some(here));
        assert_eq!(view.provider().load_calls(), 1);
        assert_eq!(view.provider().surface_count(), 1);
        assert_eq!(view.provider().marker_count(), 4);
    }

    #[tokio::test]
    async fn test_builtin_dataset_renders() {
        let mut view = MapViewBuilder::new()
            .with_api_key("valid-key")
            .with_dataset(bhubaneswar())
            .with_style(MapStyleProfile::HidePoiLabels)
            .build(HeadlessProvider::new(), UnavailableLocation::denied())
            .unwrap();

        assert!(view.activate().await);
        assert_eq!(view.markers().len(), bhubaneswar().len());

        let surface = view.surface().unwrap();
        let styles = &view.provider().surface(surface).unwrap().options.styles;
        assert_eq!(styles, &vec![StyleRule::hide("poi", "labels")]);
    }

    #[tokio::test]
    async fn test_new_credentials_start_a_new_session() {
        let calls = Arc::new(AtomicUsize::new(0));
        let here = LatLng::new(20.35, 85.81);
        let mut view = view_with(
            HeadlessProvider::new(),
            CountingLocation {
                position: here,
                calls: Arc::clone(&calls),
            },
            key_config(),
        );

        assert!(view.activate().await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let ticket = view.location_ticket();

        view.submit_credentials("other-key").unwrap();
        assert_eq!(view.user_location(), None);
        assert!(!view.apply_location(ticket, Ok(LatLng::new(20.0, 85.0))));

        assert!(view.activate().await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(view.provider().load_calls(), 2);
        assert_eq!(view.user_location(), Some(here));

        // The same key again keeps the running session.
        view.submit_credentials("other-key").unwrap();
        assert!(view.is_ready());
        assert_eq!(view.user_location(), Some(here));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_marker_failure_after_load_shows_error() {
        let mut view = faulty_view();
        view.provider_mut().fail_after_markers(1);

        assert!(!view.activate().await);
        assert_eq!(view.provider().inner.load_calls(), 1);
        assert_failed_clean(&view);

        view.provider_mut().heal();
        view.submit_credentials("valid-key").unwrap();
        assert!(view.activate().await);
        assert_eq!(view.markers().len(), 3);
        assert_eq!(view.error_message(), None);
    }

    #[tokio::test]
    async fn test_surface_failure_shows_error() {
        let mut view = faulty_view();
        view.provider_mut().fail_surfaces = true;

        assert!(!view.activate().await);
        assert_failed_clean(&view);
    }

    #[tokio::test]
    async fn test_failure_during_list_rebuild() {
        let mut view = faulty_view();
        assert!(view.activate().await);
        assert_eq!(view.markers().len(), 3);

        view.provider_mut().fail_after_markers(2);
        view.set_facility_groups(all_groups());
        assert_failed_clean(&view);
    }

    #[tokio::test]
    async fn test_failure_during_location_rebuild() {
        let mut view = faulty_view();
        assert!(view.activate().await);

        view.provider_mut().fail_after_markers(3);
        let ticket = view.location_ticket();
        assert!(view.apply_location(ticket, Ok(LatLng::new(20.35, 85.81))));
        // The three facility markers fit, the user's marker does not.
        assert_failed_clean(&view);
    }
}
