use std::future::Future;
use std::io;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use super::message::AppMessage;
use crate::kernel::services::ports::DataSource;
use crate::kernel::Effect;

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
    source: Arc<dyn DataSource>,
    tx: Sender<AppMessage>,
}

impl AsyncRuntime {
    pub fn new(source: Arc<dyn DataSource>, tx: Sender<AppMessage>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            source,
            tx,
        })
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Starts the data-service call an effect describes. The result arrives
    /// later as an [`AppMessage`].
    pub fn run(&self, effect: Effect) {
        let source = &self.source;
        match effect {
            Effect::LoadCounties => {
                let call = source.counties();
                self.spawn(async move { AppMessage::CountiesLoaded(call.await) });
            }
            Effect::LoadSpecialties => {
                let call = source.clinic_specialties();
                self.spawn(async move { AppMessage::SpecialtiesLoaded(call.await) });
            }
            Effect::LoadVillages {
                request_id,
                county,
                weights,
            } => {
                let call = source.villages(&county, weights);
                self.spawn(async move {
                    AppMessage::VillagesLoaded {
                        request_id,
                        county,
                        weights,
                        result: call.await,
                    }
                });
            }
            Effect::LoadVillageColors {
                request_id,
                county,
                weights,
            } => {
                let call = source.villages(&county, weights);
                self.spawn(async move {
                    AppMessage::VillageColorsLoaded {
                        request_id,
                        result: call.await,
                    }
                });
            }
            Effect::LoadLegend {
                request_id,
                weights,
            } => {
                let call = source.bivariate_colors(weights);
                self.spawn(async move {
                    AppMessage::LegendLoaded {
                        request_id,
                        result: call.await,
                    }
                });
            }
            Effect::LoadClinics {
                request_id,
                county,
                specialties,
            } => {
                let call = source.clinics(&county, &specialties);
                self.spawn(async move {
                    AppMessage::ClinicsLoaded {
                        request_id,
                        result: call.await,
                    }
                });
            }
            Effect::LoadVillageDetail { request_id, target } => {
                let salary = source.village_salary(&target);
                let population = source.village_population(&target);
                self.spawn(async move {
                    let result = tokio::try_join!(salary, population);
                    AppMessage::VillageDetailLoaded {
                        request_id,
                        target,
                        result,
                    }
                });
            }
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = AppMessage> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let message = task.await;
            if tx.send(message).is_err() {
                tracing::debug!("message receiver dropped");
            }
        });
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime/async_runtime.rs"]
mod tests;
