use medimap::prelude::*;

/// Drives a map view without any UI, using the in-memory provider
fn main() -> medimap::Result<()> {
    env_logger::init();

    println!("MediMap Headless Example");
    println!("========================");

    let config = MapViewConfig::default().with_env_overrides()?;
    let key = config
        .api_key
        .clone()
        .unwrap_or_else(|| "demo-key".to_string());

    let mut view = MapViewBuilder::new()
        .with_config(config)
        .with_dataset(bhubaneswar())
        .on_location_select(|position| println!("   Selected location: {}", position))
        .build(HeadlessProvider::new(), FixedLocation(LatLng::new(20.2961, 85.8245)))?;

    if view.awaiting_credentials() {
        println!("No {} set, using a demo key", medimap::core::config::ENV_API_KEY);
        view.submit_credentials(&key)?;
    }

    let rt = tokio::runtime::Runtime::new()?;
    let ready = rt.block_on(view.activate());
    if !ready {
        println!("Map failed: {}", view.error_message().unwrap_or("unknown error"));
        return Ok(());
    }

    println!("\nReference point: {}", view.reference_point());
    println!("Markers:");
    for marker in view.markers().iter() {
        println!(
            "   {:<32} {:>8}  ({})",
            marker.facility().name,
            marker.distance_label(),
            marker.facility().kind
        );
    }

    // Open two popups in a row; only the last stays open.
    let ids = view.markers().ids();
    for id in ids.iter().take(2) {
        view.provider_mut().click_marker(*id);
        view.process_events();
    }
    if let Some(open) = view.open_popup() {
        println!("\nOpen popup:\n{}", open.popup());
        for action in &open.popup().actions {
            println!("   [{}] {}", action.label(), action.href());
        }
    }

    if let Some(surface) = view.surface() {
        view.provider_mut().click_map(surface, LatLng::new(20.30, 85.83));
        view.process_events();
    }

    view.teardown();
    println!("\nTorn down: {} markers left on the provider", view.provider().marker_count());

    Ok(())
}
