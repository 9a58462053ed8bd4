use crate::{
    layers::marker::FacilityMarker,
    prelude::HashMap,
    provider::MarkerId,
};

/// The facility markers of one map session, in render order
pub struct MarkerSet {
    /// All markers indexed by ID
    markers: HashMap<MarkerId, FacilityMarker>,
    /// Marker IDs in the order they were created
    order: Vec<MarkerId>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self {
            markers: HashMap::default(),
            order: Vec::new(),
        }
    }

    /// Adds a marker. A marker with the same ID replaces the old one in place.
    pub fn insert(&mut self, marker: FacilityMarker) {
        let id = marker.id;
        if self.markers.insert(id, marker).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: MarkerId) -> Option<&FacilityMarker> {
        self.markers.get(&id)
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.markers.contains_key(&id)
    }

    /// Markers in render order
    pub fn iter(&self) -> impl Iterator<Item = &FacilityMarker> {
        self.order.iter().filter_map(|id| self.markers.get(id))
    }

    pub fn ids(&self) -> Vec<MarkerId> {
        self.order.clone()
    }

    /// Removes every marker, returning them in render order.
    pub fn drain(&mut self) -> Vec<FacilityMarker> {
        let order = std::mem::take(&mut self.order);
        let mut drained = Vec::with_capacity(order.len());
        for id in order {
            if let Some(marker) = self.markers.remove(&id) {
                drained.push(marker);
            }
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::new()
    }
}
