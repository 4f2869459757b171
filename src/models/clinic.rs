use serde::{Deserialize, Serialize};

use super::feature::{Feature, LatLng};

pub const DEFAULT_CLINIC_ICON: &str = "🏥";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub name: String,
    pub icon: String,
    pub order: u32,
}

/// Specialties offered by the data service, kept in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialtyCatalog {
    specialties: Vec<Specialty>,
}

impl SpecialtyCatalog {
    pub fn new(mut specialties: Vec<Specialty>) -> Self {
        specialties.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        specialties.dedup_by(|a, b| a.name == b.name);
        Self { specialties }
    }

    pub fn get(&self, name: &str) -> Option<&Specialty> {
        self.specialties.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn icon_for(&self, name: &str) -> &str {
        self.get(name)
            .map(|s| s.icon.as_str())
            .unwrap_or(DEFAULT_CLINIC_ICON)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specialty> {
        self.specialties.iter()
    }

    pub fn len(&self) -> usize {
        self.specialties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specialties.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClinicProperties {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub specialties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clinic {
    pub name: String,
    pub address: String,
    pub specialties: Vec<String>,
    pub location: LatLng,
}

impl Clinic {
    /// `None` when the feature is not a point with usable coordinates.
    pub fn from_feature(feature: Feature<ClinicProperties>) -> Option<Self> {
        let location = feature.point()?;
        Some(Self {
            name: feature.properties.name,
            address: feature.properties.address,
            specialties: feature.properties.specialties,
            location,
        })
    }
}
