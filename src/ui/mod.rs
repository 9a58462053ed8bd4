pub mod popup;
pub mod style;

pub use popup::{PopupAction, PopupContent, PopupTracker};

pub use style::{MarkerGlyph, MarkerStyle};
