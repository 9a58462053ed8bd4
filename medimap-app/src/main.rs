use std::sync::{Arc, Mutex};
use std::time::Duration;

use medimap::{
    constants::{API_KEY_HELP_URL, DEFAULT_CENTER},
    core::config::parse_lat_lng,
    prelude::*,
};
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Where the user's position comes from: `ip` (default), `off`, or `lat,lng`.
const ENV_LOCATION: &str = "MEDIMAP_LOCATION";

type Locator = Box<dyn LocationProvider>;
type View = MapView<HeadlessProvider, Locator>;
type LocationOutcome = std::result::Result<LatLng, LocationError>;

/// Standalone viewer for nearby hospitals and pharmacies
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = MapViewConfig::default().with_env_overrides()?;
    let locator = locator_from_env(config.location_timeout());
    let route = Route::resolve(
        &std::env::args()
            .nth(1)
            .unwrap_or_else(|| "/demo/medical-map".to_string()),
    );
    // Owned runtime: eframe blocks the main thread, so no #[tokio::main].
    let rt = tokio::runtime::Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("MediMap - Nearby Hospitals & Pharmacies"),
        ..Default::default()
    };

    eframe::run_native(
        "medimap-app",
        options,
        Box::new(move |cc| Box::new(MediMapApp::new(cc, rt, config, locator, route))),
    )?;

    Ok(())
}

fn locator_from_env(timeout: Duration) -> Locator {
    match std::env::var(ENV_LOCATION).ok().as_deref().map(str::trim) {
        Some("off") => Box::new(UnavailableLocation::denied()),
        Some(value) if value != "ip" => match parse_lat_lng(value) {
            Ok(position) => Box::new(FixedLocation(position)),
            Err(e) => {
                log::warn!("Ignoring {}: {}", ENV_LOCATION, e);
                Box::new(UnavailableLocation::denied())
            }
        },
        _ => match IpLocation::new(timeout) {
            Ok(ip) => Box::new(TimeoutLocation::new(ip, timeout)),
            Err(e) => {
                log::warn!("IP location disabled: {}", e);
                Box::new(UnavailableLocation(e))
            }
        },
    }
}

/// The main application struct
struct MediMapApp {
    rt: tokio::runtime::Runtime,
    route: Route,
    path_input: String,
    view: View,
    key_input: String,
    /// Pending location lookup for the current session
    location: Option<(LocationTicket, oneshot::Receiver<LocationOutcome>)>,
    selections: Arc<Mutex<Vec<LatLng>>>,
}

impl MediMapApp {
    fn new(
        _cc: &eframe::CreationContext<'_>,
        rt: tokio::runtime::Runtime,
        config: MapViewConfig,
        locator: Locator,
        route: Route,
    ) -> Self {
        let selections = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&selections);

        let mut view = MapView::new(HeadlessProvider::new(), locator, config);
        view.set_facility_groups(bhubaneswar().groups());
        view.set_on_location_select(move |position| {
            log::info!("Location selected: {}", position);
            if let Ok(mut selections) = sink.lock() {
                selections.push(position);
            }
        });

        let mut app = Self {
            rt,
            route: Route::Home,
            path_input: String::new(),
            view,
            key_input: String::new(),
            location: None,
            selections,
        };
        app.set_route(route);
        app
    }

    fn set_route(&mut self, route: Route) {
        if self.route == Route::MedicalMap && route != Route::MedicalMap {
            self.view.teardown();
            self.location = None;
        }

        self.route = route;
        self.path_input = route.path().unwrap_or_default().to_string();

        if route == Route::MedicalMap && self.view.state() == &MapState::Initializing {
            self.activate();
        }
    }

    /// Renders the map, then looks up the user's position in the background.
    fn activate(&mut self) {
        if !self.rt.block_on(self.view.initialize()) {
            return;
        }
        if self.location.is_some() || self.view.user_location().is_some() {
            return;
        }

        let ticket = self.view.location_ticket();
        let locator = self.view.locator();
        let (tx, rx) = oneshot::channel();
        self.rt.spawn(async move {
            let _ = tx.send(locator.resolve_once().await);
        });
        self.location = Some((ticket, rx));
    }

    fn poll_location(&mut self, ctx: &egui::Context) {
        let Some((ticket, rx)) = self.location.as_mut() else {
            return;
        };
        let ticket = *ticket;

        match rx.try_recv() {
            Ok(outcome) => {
                self.location = None;
                self.view.apply_location(ticket, outcome);
            }
            Err(TryRecvError::Empty) => ctx.request_repaint_after(Duration::from_millis(200)),
            Err(TryRecvError::Closed) => self.location = None,
        }
    }

    fn route_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for route in Route::ALL {
                if ui
                    .selectable_label(self.route == route, route.title())
                    .clicked()
                {
                    self.set_route(route);
                }
            }
        });
        ui.horizontal(|ui| {
            ui.label("Path:");
            let response = ui.text_edit_singleline(&mut self.path_input);
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Go").clicked() || submitted {
                let route = Route::resolve(&self.path_input);
                self.set_route(route);
            }
        });
    }

    fn credential_card(&mut self, ui: &mut egui::Ui) {
        let submit = egui::Frame::group(ui.style())
            .show(ui, |ui| {
                ui.heading("Google Maps API Key Required");
                ui.label("Enter an API key to see hospitals and pharmacies near you.");
                if let Some(message) = self.view.error_message() {
                    ui.colored_label(egui::Color32::from_rgb(220, 38, 38), message);
                }
                ui.add(
                    egui::TextEdit::singleline(&mut self.key_input)
                        .password(true)
                        .hint_text("API key"),
                );
                let submit = ui
                    .add_enabled(
                        !self.key_input.trim().is_empty(),
                        egui::Button::new("Load Map"),
                    )
                    .clicked();
                ui.hyperlink_to("Get an API key", API_KEY_HELP_URL);
                submit
            })
            .inner;

        if submit {
            match self.view.submit_credentials(&self.key_input) {
                Ok(()) => {
                    // A changed key invalidates the pending lookup's ticket.
                    self.location = None;
                    self.activate();
                }
                Err(e) => log::warn!("Credentials rejected: {}", e),
            }
        }
    }

    fn map_sketch(&mut self, ui: &mut egui::Ui) {
        let Some(surface) = self.view.surface() else {
            return;
        };

        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
        painter.rect_filled(response.rect, 4.0, egui::Color32::from_rgb(236, 240, 241));

        let markers: Vec<(MarkerId, MarkerOptions)> = self
            .view
            .provider()
            .markers_on(surface)
            .into_iter()
            .map(|(id, options)| (id, options.clone()))
            .collect();
        let projection = Projection::fit(
            response.rect.shrink(24.0),
            markers
                .iter()
                .map(|(_, options)| options.position)
                .chain([self.view.center()]),
        );
        let open = self.view.open_popup().map(|marker| marker.id);
        let hover = response.hover_pos();

        for (id, options) in &markers {
            let pos = projection.to_screen(options.position);
            let radius = marker_radius(&options.icon);
            let (r, g, b) = options.icon.fill_rgb().unwrap_or((128, 128, 128));
            let border = if open == Some(*id) {
                egui::Color32::BLACK
            } else {
                egui::Color32::WHITE
            };
            painter.circle(
                pos,
                radius,
                egui::Color32::from_rgb(r, g, b),
                egui::Stroke::new(options.icon.border_width.max(1.0), border),
            );
            if hover.map_or(false, |h| h.distance(pos) <= radius) {
                painter.text(
                    pos - egui::vec2(0.0, radius + 2.0),
                    egui::Align2::CENTER_BOTTOM,
                    &options.title,
                    egui::FontId::proportional(13.0),
                    egui::Color32::BLACK,
                );
            }
        }

        if response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let hit = markers.iter().rev().find(|(_, options)| {
                    pointer.distance(projection.to_screen(options.position))
                        <= marker_radius(&options.icon)
                });
                let provider = self.view.provider_mut();
                match hit {
                    Some((id, _)) => provider.click_marker(*id),
                    None => provider.click_map(surface, projection.to_lat_lng(pointer)),
                };
                self.view.process_events();
            }
        }
    }

    fn details_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Details");
        ui.separator();

        match self.view.open_popup().map(|marker| marker.popup().clone()) {
            Some(popup) => {
                ui.strong(&popup.title);
                ui.label(&popup.subtitle);
                ui.label(&popup.address);
                ui.label(popup.distance_label());
                if let Some(hours) = &popup.hours {
                    ui.label(format!("Hours: {}", hours));
                }
                ui.horizontal(|ui| {
                    for action in &popup.actions {
                        ui.hyperlink_to(action.label(), action.href());
                    }
                });
                if ui.button("Close").clicked() {
                    self.view.close_popup();
                }
            }
            None => {
                ui.label("Click a marker to see details.");
            }
        }

        ui.separator();
        ui.heading("Nearby");
        let from = if self.view.user_location().is_some() {
            "your location"
        } else {
            "the map center"
        };
        ui.label(format!("Distances from {}", from));

        let mut nearby: Vec<(MarkerId, String, f64)> = self
            .view
            .markers()
            .iter()
            .map(|m| (m.id, m.facility().name.clone(), m.distance_km()))
            .collect();
        nearby.sort_by(|a, b| a.2.total_cmp(&b.2));

        egui::ScrollArea::vertical().show(ui, |ui| {
            for (id, name, distance) in nearby {
                let label = format!("{} ({})", name, format_distance_km(distance));
                if ui.link(label).clicked() {
                    self.view.provider_mut().click_marker(id);
                    self.view.process_events();
                }
            }
        });

        if let Some(last) = self.selections.lock().ok().and_then(|s| s.last().copied()) {
            ui.separator();
            ui.label(format!("Last selected: {}", last));
        }
    }

    fn placeholder_page(&mut self, ui: &mut egui::Ui) {
        if self.route == Route::NotFound {
            ui.heading("404");
            ui.label("There is no page at this path.");
            if ui.button("Go home").clicked() {
                self.set_route(Route::Home);
            }
        } else {
            ui.heading(self.route.title());
            ui.label("This page is not part of the desktop viewer.");
        }
    }
}

impl eframe::App for MediMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_location(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.route_bar(ui);
        });

        let map_ready = self.route == Route::MedicalMap && self.view.is_ready();
        if map_ready {
            egui::SidePanel::right("details_panel")
                .resizable(true)
                .show(ctx, |ui| self.details_panel(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.route != Route::MedicalMap {
                self.placeholder_page(ui);
                return;
            }

            ui.heading(Route::MedicalMap.title());
            match self.view.state().clone() {
                MapState::AwaitingCredentials | MapState::Error(_) => self.credential_card(ui),
                MapState::Initializing => {
                    ui.spinner();
                }
                MapState::Ready => self.map_sketch(ui),
            }
        });
    }
}

/// Linear lat/lng to screen mapping over the bounds of the drawn markers.
struct Projection {
    bounds: LatLngBounds,
    rect: egui::Rect,
}

impl Projection {
    fn fit(rect: egui::Rect, points: impl IntoIterator<Item = LatLng>) -> Self {
        let mut bounds = LatLngBounds::from_points(points)
            .unwrap_or_else(|| LatLngBounds::new(DEFAULT_CENTER, DEFAULT_CENTER));
        let span = bounds.span();
        let pad_lat = (span.lat * 0.1).max(0.005);
        let pad_lng = (span.lng * 0.1).max(0.005);
        bounds.south_west.lat -= pad_lat;
        bounds.south_west.lng -= pad_lng;
        bounds.north_east.lat += pad_lat;
        bounds.north_east.lng += pad_lng;
        Self { bounds, rect }
    }

    fn to_screen(&self, position: LatLng) -> egui::Pos2 {
        let span = self.bounds.span();
        let x = (position.lng - self.bounds.south_west.lng) / span.lng;
        let y = (self.bounds.north_east.lat - position.lat) / span.lat;
        egui::pos2(
            self.rect.left() + x as f32 * self.rect.width(),
            self.rect.top() + y as f32 * self.rect.height(),
        )
    }

    fn to_lat_lng(&self, pos: egui::Pos2) -> LatLng {
        let span = self.bounds.span();
        let x = ((pos.x - self.rect.left()) / self.rect.width()) as f64;
        let y = ((pos.y - self.rect.top()) / self.rect.height()) as f64;
        LatLng::new(
            self.bounds.north_east.lat - y * span.lat,
            self.bounds.south_west.lng + x * span.lng,
        )
    }
}

fn marker_radius(style: &MarkerStyle) -> f32 {
    style.size as f32 / 3.0
}
