use crate::models::{VillageTarget, WeightPair};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadCounties,
    LoadSpecialties,
    LoadVillages {
        request_id: u64,
        county: String,
        weights: WeightPair,
    },
    LoadVillageColors {
        request_id: u64,
        county: String,
        weights: WeightPair,
    },
    LoadLegend {
        request_id: u64,
        weights: WeightPair,
    },
    LoadClinics {
        request_id: u64,
        county: String,
        specialties: Vec<String>,
    },
    /// Salary and population, fetched together; both must succeed.
    LoadVillageDetail {
        request_id: u64,
        target: VillageTarget,
    },
}
