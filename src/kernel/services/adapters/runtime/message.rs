use crate::kernel::services::ports::ApiResult;
use crate::kernel::Action;
use crate::models::{
    ClinicProperties, ColorMatrix, CountyProperties, FeatureCollection, PopulationPoint,
    SalaryPoint, Specialty, VillageProperties, VillageTarget, WeightPair,
};

/// Completed data-service call, sent from a runtime task back to the UI loop.
#[derive(Debug)]
pub enum AppMessage {
    CountiesLoaded(ApiResult<FeatureCollection<CountyProperties>>),
    SpecialtiesLoaded(ApiResult<Vec<Specialty>>),
    VillagesLoaded {
        request_id: u64,
        county: String,
        weights: WeightPair,
        result: ApiResult<FeatureCollection<VillageProperties>>,
    },
    VillageColorsLoaded {
        request_id: u64,
        result: ApiResult<FeatureCollection<VillageProperties>>,
    },
    LegendLoaded {
        request_id: u64,
        result: ApiResult<ColorMatrix>,
    },
    ClinicsLoaded {
        request_id: u64,
        result: ApiResult<FeatureCollection<ClinicProperties>>,
    },
    VillageDetailLoaded {
        request_id: u64,
        target: VillageTarget,
        result: ApiResult<(Vec<SalaryPoint>, Vec<PopulationPoint>)>,
    },
}

impl AppMessage {
    pub fn into_action(self) -> Action {
        match self {
            Self::CountiesLoaded(result) => Action::CountiesLoaded(result),
            Self::SpecialtiesLoaded(result) => Action::SpecialtiesLoaded(result),
            Self::VillagesLoaded {
                request_id,
                county,
                weights,
                result,
            } => Action::VillagesLoaded {
                request_id,
                county,
                weights,
                result,
            },
            Self::VillageColorsLoaded { request_id, result } => {
                Action::VillageColorsLoaded { request_id, result }
            }
            Self::LegendLoaded { request_id, result } => {
                Action::LegendLoaded { request_id, result }
            }
            Self::ClinicsLoaded { request_id, result } => {
                Action::ClinicsLoaded { request_id, result }
            }
            Self::VillageDetailLoaded {
                request_id,
                target,
                result,
            } => Action::VillageDetailLoaded {
                request_id,
                target,
                result,
            },
        }
    }
}
