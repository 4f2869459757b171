//! Data model shared by the kernel, the data service and the render backends.

pub mod clinic;
pub mod color;
pub mod feature;
pub mod region;
pub mod series;
pub mod weights;

pub use clinic::{Clinic, ClinicProperties, Specialty, SpecialtyCatalog, DEFAULT_CLINIC_ICON};
pub use color::{ColorMatrix, ColorMatrixError, Rgba, INCOME_COLORS, MATRIX_LEVELS};
pub use feature::{Feature, FeatureCollection, LatLng, LatLngBounds};
pub use region::{County, CountyProperties, Village, VillageKey, VillageProperties, VillageTarget};
pub use series::{PopulationPoint, SalaryPoint};
pub use weights::{Slider, WeightPair};
