//! Dashboard: owns the store and feeds its commands to a map backend.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::mpsc::Receiver;

use thiserror::Error;

use crate::kernel::services::adapters::{AppMessage, AsyncRuntime};
use crate::kernel::services::ports::{ApiError, MapConfig};
use crate::kernel::{Action, AppState, CatalogStatus, Store};
use crate::ui::backend::MapBackend;

mod bridge;
mod tick;

const LOG_BUFFER_CAP: usize = 2000;
const MAX_LOG_DRAIN_PER_TICK: usize = 1024;
const MAX_MESSAGE_DRAIN_PER_TICK: usize = 256;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("data service is not reachable ({0}); start the backend and try again")]
    HealthCheck(#[source] ApiError),
}

pub struct Dashboard<B: MapBackend> {
    store: Store,
    runtime: AsyncRuntime,
    rx: Receiver<AppMessage>,
    backend: B,
    /// Effects started whose message has not come back yet.
    in_flight: usize,
    log_rx: Option<Receiver<String>>,
    logs: VecDeque<String>,
}

impl<B: MapBackend> Dashboard<B> {
    pub fn new(
        config: MapConfig,
        runtime: AsyncRuntime,
        rx: Receiver<AppMessage>,
        backend: B,
        log_rx: Option<Receiver<String>>,
    ) -> Self {
        Self {
            store: Store::new(AppState::new(config)),
            runtime,
            rx,
            backend,
            in_flight: 0,
            log_rx,
            logs: VecDeque::new(),
        }
    }

    /// Probes the data service, then shows the initial view and requests
    /// counties and the specialty catalog.
    pub fn start(&mut self) -> Result<(), StartupError> {
        let health = self
            .runtime
            .block_on(self.runtime.source().health())
            .map_err(|e| {
                tracing::error!(error = %e, "health check failed");
                StartupError::HealthCheck(e)
            })?;
        tracing::info!(status = %health.status, "data service reachable");
        self.dispatch(Action::Started);
        Ok(())
    }

    pub fn dispatch(&mut self, action: Action) -> bool {
        self.dispatch_kernel(action)
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn logs(&self) -> impl Iterator<Item = &str> {
        self.logs.iter().map(String::as_str)
    }

    pub fn status(&self) -> String {
        let state = self.state();
        let weights = state.weights.weights();
        let mut out = String::new();

        let mode = match state.current_county() {
            Some(county) => format!("village view of {county}"),
            None => "county view".to_string(),
        };
        let _ = writeln!(out, "mode: {mode}, zoom {}", state.zoom);
        let _ = writeln!(
            out,
            "weights: income {}% density {}%",
            weights.income_percent(),
            weights.density_percent()
        );
        let _ = writeln!(
            out,
            "counties: {}, villages: {}",
            state.counties.len(),
            state.villages.len()
        );
        let catalog = match state.catalog_status {
            CatalogStatus::Loading => "loading".to_string(),
            CatalogStatus::Ready => format!("{} available", state.catalog.len()),
            CatalogStatus::Unavailable => "unavailable".to_string(),
        };
        let selected: Vec<&str> = state.selected_specialties.iter().map(String::as_str).collect();
        let _ = writeln!(
            out,
            "specialties: {catalog}; selected: {}",
            if selected.is_empty() {
                "none".to_string()
            } else {
                selected.join(", ")
            }
        );
        if let Some(target) = &state.panel.open {
            let _ = writeln!(out, "panel: {}", target.label());
        }
        if self.in_flight > 0 {
            let _ = writeln!(out, "requests in flight: {}", self.in_flight);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/app/dashboard.rs"]
mod tests;
