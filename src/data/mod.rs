pub mod dataset;
pub mod facility;

pub use dataset::{bhubaneswar, Dataset};
pub use facility::{Facility, FacilityGroup, FacilityKind};
