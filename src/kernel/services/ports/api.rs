//! Contract of the remote data service.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    ClinicProperties, ColorMatrix, CountyProperties, FeatureCollection, PopulationPoint,
    SalaryPoint, Specialty, VillageProperties, VillageTarget, WeightPair,
};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub type ApiFuture<T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'static>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOp {
    Health,
    Counties,
    Villages,
    VillageSalary,
    VillagePopulation,
    BivariateColors,
    ClinicSpecialties,
    Clinics,
}

impl ApiOp {
    pub fn label(self) -> &'static str {
        match self {
            Self::Health => "health check",
            Self::Counties => "load counties",
            Self::Villages => "load villages",
            Self::VillageSalary => "load village salary",
            Self::VillagePopulation => "load village population",
            Self::BivariateColors => "load bivariate colors",
            Self::ClinicSpecialties => "load clinic specialties",
            Self::Clinics => "load clinics",
        }
    }
}

impl fmt::Display for ApiOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{op}: HTTP {status}: {message}")]
    Status {
        op: ApiOp,
        status: u16,
        message: String,
    },
    #[error("{op}: request failed: {message}")]
    Transport { op: ApiOp, message: String },
    #[error("{op}: invalid response: {message}")]
    Decode { op: ApiOp, message: String },
}

impl ApiError {
    pub fn op(&self) -> ApiOp {
        match self {
            Self::Status { op, .. } | Self::Transport { op, .. } | Self::Decode { op, .. } => *op,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

/// Remote data service. Futures own everything they need so they can be
/// spawned onto the runtime.
pub trait DataSource: Send + Sync {
    fn health(&self) -> ApiFuture<HealthStatus>;

    fn counties(&self) -> ApiFuture<FeatureCollection<CountyProperties>>;

    fn villages(
        &self,
        county: &str,
        weights: WeightPair,
    ) -> ApiFuture<FeatureCollection<VillageProperties>>;

    fn village_salary(&self, target: &VillageTarget) -> ApiFuture<Vec<SalaryPoint>>;

    fn village_population(&self, target: &VillageTarget) -> ApiFuture<Vec<PopulationPoint>>;

    fn bivariate_colors(&self, weights: WeightPair) -> ApiFuture<ColorMatrix>;

    fn clinic_specialties(&self) -> ApiFuture<Vec<Specialty>>;

    fn clinics(
        &self,
        county: &str,
        specialties: &[String],
    ) -> ApiFuture<FeatureCollection<ClinicProperties>>;
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/api.rs"]
mod tests;
