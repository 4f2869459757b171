use std::time::Instant;

use crate::kernel::services::ports::ApiResult;
use crate::models::{
    ClinicProperties, ColorMatrix, CountyProperties, FeatureCollection, PopulationPoint,
    SalaryPoint, Slider, Specialty, VillageProperties, VillageTarget, WeightPair,
};

#[derive(Debug, Clone)]
pub enum Action {
    /// Health check passed; show the initial view and request base data.
    Started,
    Tick {
        now: Instant,
    },
    CountyClicked {
        county: String,
    },
    VillageClicked(VillageTarget),
    BackToCounties,
    /// Close button or a click on the map background.
    ClosePanel,
    ZoomChanged {
        zoom: u8,
    },
    SetWeight {
        slider: Slider,
        percent: u8,
        now: Instant,
    },
    ToggleSpecialty {
        name: String,
        selected: bool,
    },
    CountiesLoaded(ApiResult<FeatureCollection<CountyProperties>>),
    SpecialtiesLoaded(ApiResult<Vec<Specialty>>),
    VillagesLoaded {
        request_id: u64,
        county: String,
        /// Weights the villages were requested with.
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
