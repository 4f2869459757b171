use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use super::layers::MarkerRegistry;
use super::weights::WeightController;
use crate::kernel::services::ports::MapConfig;
use crate::models::{County, SpecialtyCatalog, Village, VillageTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    County,
    Village { county: String },
}

impl ViewMode {
    pub fn is_village(&self) -> bool {
        matches!(self, Self::Village { .. })
    }

    pub fn current_county(&self) -> Option<&str> {
        match self {
            Self::County => None,
            Self::Village { county } => Some(county),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Villages,
    VillageColors,
    Legend,
    Clinics,
    Detail,
}

/// Latest generation issued per request kind. Only a response carrying the
/// latest generation may touch state.
#[derive(Debug, Default)]
pub struct RequestGenerations {
    next_id: u64,
    latest: FxHashMap<RequestKind, u64>,
}

impl RequestGenerations {
    pub fn issue(&mut self, kind: RequestKind) -> u64 {
        self.next_id += 1;
        self.latest.insert(kind, self.next_id);
        self.next_id
    }

    pub fn is_current(&self, kind: RequestKind, request_id: u64) -> bool {
        self.latest.get(&kind) == Some(&request_id)
    }

    /// Makes every outstanding request of this kind stale.
    pub fn invalidate(&mut self, kind: RequestKind) {
        self.latest.remove(&kind);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    Unavailable,
}

#[derive(Debug, Default)]
pub struct PanelState {
    pub open: Option<VillageTarget>,
    pub chart_live: bool,
}

pub struct AppState {
    pub config: MapConfig,
    pub mode: ViewMode,
    pub zoom: u8,
    pub counties: Vec<County>,
    pub villages: Vec<Village>,
    /// County whose fill is hidden while its villages are shown.
    pub hidden_county: Option<String>,
    pub village_stroke: u8,
    pub weights: WeightController,
    pub catalog: SpecialtyCatalog,
    pub catalog_status: CatalogStatus,
    pub selected_specialties: BTreeSet<String>,
    pub markers: MarkerRegistry,
    pub panel: PanelState,
    pub requests: RequestGenerations,
    pub legend_visible: bool,
    pub controls_visible: bool,
    pub loading: u32,
}

impl AppState {
    pub fn new(config: MapConfig) -> Self {
        let weights = WeightController::new(config.weight_debounce);
        Self {
            zoom: config.initial_zoom,
            config,
            mode: ViewMode::County,
            counties: Vec::new(),
            villages: Vec::new(),
            hidden_county: None,
            village_stroke: 1,
            weights,
            catalog: SpecialtyCatalog::default(),
            catalog_status: CatalogStatus::Loading,
            selected_specialties: BTreeSet::new(),
            markers: MarkerRegistry::new(),
            panel: PanelState::default(),
            requests: RequestGenerations::default(),
            legend_visible: false,
            controls_visible: false,
            loading: 0,
        }
    }

    pub fn county(&self, name: &str) -> Option<&County> {
        self.counties.iter().find(|c| c.name == name)
    }

    pub fn is_village_mode(&self) -> bool {
        self.mode.is_village()
    }

    pub fn current_county(&self) -> Option<&str> {
        self.mode.current_county()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/state.rs"]
mod tests;
