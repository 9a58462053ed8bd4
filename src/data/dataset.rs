//! Facility datasets: the built-in Bhubaneswar collections and JSON loading
//! for custom ones.

use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::data::facility::{Facility, FacilityGroup, FacilityKind};
use crate::Result;

/// Hospitals and pharmacies for one area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub hospitals: Vec<Facility>,
    #[serde(default)]
    pub pharmacies: Vec<Facility>,
}

impl Dataset {
    pub fn new(hospitals: Vec<Facility>, pharmacies: Vec<Facility>) -> Self {
        let mut dataset = Self {
            hospitals,
            pharmacies,
        };
        dataset.normalize_kinds();
        dataset
    }

    /// Parses a dataset of the form `{"hospitals": [...], "pharmacies": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut dataset: Dataset = serde_json::from_str(json)?;
        dataset.normalize_kinds();
        log::debug!(
            "Loaded dataset with {} hospitals and {} pharmacies",
            dataset.hospitals.len(),
            dataset.pharmacies.len()
        );
        Ok(dataset)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// The list a record sits in decides its kind.
    fn normalize_kinds(&mut self) {
        for hospital in &mut self.hospitals {
            hospital.kind = FacilityKind::Hospital;
        }
        for pharmacy in &mut self.pharmacies {
            pharmacy.kind = FacilityKind::Pharmacy;
        }
    }

    /// Hospital and pharmacy groups, styled for the map.
    pub fn groups(&self) -> Vec<FacilityGroup> {
        vec![
            FacilityGroup::hospitals(self.hospitals.clone()),
            FacilityGroup::pharmacies(self.pharmacies.clone()),
        ]
    }

    pub fn len(&self) -> usize {
        self.hospitals.len() + self.pharmacies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static BHUBANESWAR: Lazy<Dataset> = Lazy::new(|| {
    Dataset::new(
        vec![
            Facility::hospital(
                "AIIMS Bhubaneswar",
                "Government Multi-speciality",
                "Sijua, Patrapada, Bhubaneswar 751019",
                20.2309,
                85.7752,
            )
            .with_phone("0674-2476789"),
            Facility::hospital(
                "Capital Hospital",
                "Government",
                "Unit 6, Bhubaneswar 751001",
                20.2599,
                85.8239,
            )
            .with_phone("0674-2391983"),
            Facility::hospital(
                "SUM Ultimate Medicare",
                "Private Multi-speciality",
                "K8 Kalinga Nagar, Bhubaneswar 751003",
                20.2832,
                85.7721,
            )
            .with_phone("0674-3500500"),
            Facility::hospital(
                "KIMS Hospital",
                "Private Teaching Hospital",
                "KIIT Road, Patia, Bhubaneswar 751024",
                20.3533,
                85.8126,
            )
            .with_phone("0674-7111000"),
            Facility::hospital(
                "Apollo Hospitals",
                "Private Multi-speciality",
                "Plot 251, Sainik School Road, Bhubaneswar 751005",
                20.3045,
                85.8338,
            ),
        ],
        vec![
            Facility::pharmacy(
                "Apollo Pharmacy Saheed Nagar",
                "24x7 Pharmacy",
                "Saheed Nagar, Bhubaneswar 751007",
                20.2890,
                85.8450,
            )
            .with_phone("0674-2545454")
            .with_hours("Open 24 hours"),
            Facility::pharmacy(
                "MedPlus Jaydev Vihar",
                "Retail Pharmacy",
                "Jaydev Vihar, Bhubaneswar 751013",
                20.2985,
                85.8195,
            )
            .with_hours("8:00 AM - 11:00 PM"),
            Facility::pharmacy(
                "Jan Aushadhi Kendra",
                "Generic Medicines",
                "Capital Hospital Campus, Unit 6, Bhubaneswar 751001",
                20.2603,
                85.8247,
            )
            .with_hours("9:00 AM - 8:00 PM"),
            Facility::pharmacy(
                "Wellness Forever Patia",
                "Retail Pharmacy",
                "Patia Square, Bhubaneswar 751024",
                20.3512,
                85.8201,
            )
            .with_phone("0674-2725100")
            .with_hours("7:00 AM - 12:00 AM"),
        ],
    )
});

/// The built-in Bhubaneswar dataset.
pub fn bhubaneswar() -> &'static Dataset {
    &BHUBANESWAR
}
