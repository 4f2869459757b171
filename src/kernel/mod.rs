//! Headless application core (state/action/effect).

pub mod action;
pub mod clinics;
pub mod detail;
pub mod effect;
pub mod layers;
pub mod services;
pub mod state;
pub mod store;
pub mod weights;

pub use action::Action;
pub use detail::{ChartSpec, DetailPanel};
pub use effect::Effect;
pub use layers::{LayerCommand, Marker, MarkerGroup, MarkerId, MarkerRegistry};
pub use state::{AppState, CatalogStatus, RequestKind, ViewMode};
pub use store::{DispatchResult, Store};
pub use weights::{LegendGrid, WeightController};
