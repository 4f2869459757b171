//! Map layer commands and the marker registry.
//!
//! The kernel never talks to a map directly. Every visible change is described
//! by a [`LayerCommand`]; the render backend applies them in order.

use slotmap::{new_key_type, SlotMap};

use super::clinics::ClinicPopup;
use super::detail::{ChartSpec, DetailPanel};
use super::weights::LegendGrid;
use crate::models::{LatLng, LatLngBounds, Rgba, Specialty, VillageKey};

new_key_type! { pub struct MarkerId; }

pub const COUNTY_FILL: Rgba = Rgba::new(0x00, 0x80, 0x00, 1.0);
pub const STROKE_COLOR: Rgba = Rgba::new(0x00, 0x00, 0x00, 1.0);
pub const COUNTY_STROKE_WEIGHT: u8 = 2;

/// Village outline weight for a zoom level.
pub fn stroke_weight(zoom: u8) -> u8 {
    match zoom {
        0..=14 => 1,
        15..=16 => 2,
        _ => 3,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerGroup {
    CountyLabel,
    VillageLabel,
    ClinicIcon,
    ClinicBadge,
}

impl MarkerGroup {
    pub fn is_clinic(self) -> bool {
        matches!(self, Self::ClinicIcon | Self::ClinicBadge)
    }
}

/// A div-style marker: text content, box size and the anchor offset inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub group: MarkerGroup,
    pub position: LatLng,
    pub text: String,
    pub size: (u16, u16),
    pub anchor: (i16, i16),
    pub popup: Option<ClinicPopup>,
}

impl Marker {
    pub fn county_label(name: &str, position: LatLng) -> Self {
        Self {
            group: MarkerGroup::CountyLabel,
            position,
            text: name.to_string(),
            size: (100, 20),
            anchor: (50, 10),
            popup: None,
        }
    }

    pub fn village_label(name: &str, position: LatLng) -> Self {
        Self {
            group: MarkerGroup::VillageLabel,
            position,
            text: name.to_string(),
            size: (80, 16),
            anchor: (40, 8),
            popup: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountyShape {
    pub name: String,
    pub geometry: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VillageShape {
    pub key: VillageKey,
    pub county: String,
    pub geometry: serde_json::Value,
    pub fill: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerCommand {
    ShowCountyPolygons(Vec<CountyShape>),
    SetCountyStyle {
        county: String,
        fill_opacity: f32,
        stroke_opacity: f32,
    },
    ShowVillagePolygons {
        shapes: Vec<VillageShape>,
        stroke_weight: u8,
    },
    RemoveVillagePolygons,
    SetVillageStrokeWeight(u8),
    RecolorVillages(Vec<(VillageKey, Rgba)>),
    AddMarker {
        id: MarkerId,
        marker: Marker,
    },
    RemoveMarker(MarkerId),
    SetView {
        center: LatLng,
        zoom: u8,
    },
    FitBounds {
        bounds: LatLngBounds,
        padding: u16,
    },
    /// Back button, weight sliders and clinic controls.
    SetModeControlsVisible(bool),
    SetSliders {
        income: u8,
        density: u8,
    },
    ShowLegend(LegendGrid),
    HideLegend,
    ShowSpecialtyOptions(Vec<Specialty>),
    SpecialtyOptionsUnavailable,
    ClearSpecialtySelection,
    ShowPanel(DetailPanel),
    HidePanel,
    CreateChart(ChartSpec),
    DestroyChart,
    SetLoading(bool),
    Alert(String),
}

/// Owns every marker id handed to the backend, grouped so a transition can
/// tear down exactly what it created.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: SlotMap<MarkerId, MarkerGroup>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, marker: Marker) -> LayerCommand {
        let id = self.markers.insert(marker.group);
        LayerCommand::AddMarker { id, marker }
    }

    pub fn clear_group(&mut self, group: MarkerGroup) -> Vec<LayerCommand> {
        let ids: Vec<MarkerId> = self
            .markers
            .iter()
            .filter(|(_, g)| **g == group)
            .map(|(id, _)| id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.markers.remove(id).map(|_| LayerCommand::RemoveMarker(id)))
            .collect()
    }

    pub fn count(&self, group: MarkerGroup) -> usize {
        self.markers.values().filter(|g| **g == group).count()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.markers.contains_key(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/layers.rs"]
mod tests;
