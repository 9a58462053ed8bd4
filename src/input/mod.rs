pub mod events;

pub use events::{EventHandled, MapEvent};
