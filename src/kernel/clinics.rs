//! Clinic markers: one primary icon per clinic chosen by specialty priority,
//! plus a count badge for multi-specialty clinics.

use super::layers::{Marker, MarkerGroup};
use crate::models::{Clinic, Specialty, SpecialtyCatalog, DEFAULT_CLINIC_ICON};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicPopup {
    pub name: String,
    pub address: String,
    /// `(icon, specialty)` in the clinic's own order.
    pub specialties: Vec<(String, String)>,
}

/// Known specialty with the lowest `order` among the clinic's specialties.
pub fn primary_specialty<'a>(
    clinic: &Clinic,
    catalog: &'a SpecialtyCatalog,
) -> Option<&'a Specialty> {
    clinic
        .specialties
        .iter()
        .filter_map(|name| catalog.get(name))
        .min_by_key(|s| s.order)
}

pub fn popup(clinic: &Clinic, catalog: &SpecialtyCatalog) -> ClinicPopup {
    ClinicPopup {
        name: clinic.name.clone(),
        address: clinic.address.clone(),
        specialties: clinic
            .specialties
            .iter()
            .map(|name| (catalog.icon_for(name).to_string(), name.clone()))
            .collect(),
    }
}

/// Markers for one clinic: the primary icon first, then the badge if any.
pub fn clinic_markers(clinic: &Clinic, catalog: &SpecialtyCatalog) -> Vec<Marker> {
    let icon = primary_specialty(clinic, catalog)
        .map(|s| s.icon.clone())
        .unwrap_or_else(|| DEFAULT_CLINIC_ICON.to_string());

    let mut markers = vec![Marker {
        group: MarkerGroup::ClinicIcon,
        position: clinic.location,
        text: icon,
        size: (24, 24),
        anchor: (12, 12),
        popup: Some(popup(clinic, catalog)),
    }];

    let total = clinic.specialties.len();
    if total > 1 {
        markers.push(Marker {
            group: MarkerGroup::ClinicBadge,
            position: clinic.location,
            text: total.to_string(),
            size: (12, 12),
            // Negative x anchor pushes the badge to the upper right.
            anchor: (-6, 18),
            popup: None,
        });
    }
    markers
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/clinics.rs"]
mod tests;
