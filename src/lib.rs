//! villagemap - county/village bivariate map dashboard
//!
//! Layout:
//! - models: wire types and domain values (regions, colors, clinics, series)
//! - kernel: state, actions, effects and the store that turns one into the others
//! - kernel::services: data service port, HTTP adapter, async runtime, settings
//! - ui: map backends that execute layer commands
//! - app: the dashboard loop and console commands

pub mod app;
pub mod kernel;
pub mod models;
pub mod ui;
