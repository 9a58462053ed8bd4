pub mod manager;
pub mod marker;

pub use manager::MarkerSet;
pub use marker::{plan_markers, FacilityMarker, MarkerPlan};
