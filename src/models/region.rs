use serde::{Deserialize, Serialize};

use super::color::{Rgba, INCOME_COLORS};
use super::feature::{anchor, lenient_coord, Feature, LatLng};

pub const VILLAGE_FILL_ALPHA: f32 = 0.75;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountyProperties {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub center_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub center_lon: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VillageProperties {
    pub name: String,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub district: String,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub center_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub center_lon: Option<f64>,
    #[serde(default)]
    pub bivariate_color: Option<String>,
    #[serde(default)]
    pub income_level: Option<u8>,
    #[serde(default)]
    pub density_level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct County {
    pub name: String,
    /// Server-supplied label anchor; also the view center in village mode.
    pub center: LatLng,
    pub geometry: serde_json::Value,
}

impl County {
    /// `None` when the server omitted either anchor coordinate.
    pub fn from_feature(feature: Feature<CountyProperties>) -> Option<Self> {
        let center = anchor(feature.properties.center_lat, feature.properties.center_lon)?;
        Some(Self {
            name: feature.properties.name,
            center,
            geometry: feature.geometry,
        })
    }
}

/// Identity of a village across re-fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VillageKey {
    pub name: String,
    pub district: String,
}

impl VillageKey {
    pub fn new(name: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            district: district.into(),
        }
    }
}

/// A village as addressed by the salary/population endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VillageTarget {
    pub county: String,
    pub district: String,
    pub name: String,
}

impl VillageTarget {
    pub fn new(
        county: impl Into<String>,
        district: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            county: county.into(),
            district: district.into(),
            name: name.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !(self.county.trim().is_empty()
            || self.district.trim().is_empty()
            || self.name.trim().is_empty())
    }

    pub fn key(&self) -> VillageKey {
        VillageKey::new(self.name.clone(), self.district.clone())
    }

    /// `{county}{district}{village}`, the way the place is written locally.
    pub fn label(&self) -> String {
        format!("{}{}{}", self.county, self.district, self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Village {
    pub key: VillageKey,
    pub county: String,
    pub center: LatLng,
    pub geometry: serde_json::Value,
    pub bivariate_color: Option<Rgba>,
    pub income_level: Option<u8>,
}

impl Village {
    pub fn from_feature(feature: Feature<VillageProperties>) -> Option<Self> {
        let props = feature.properties;
        let center = anchor(props.center_lat, props.center_lon)?;
        let bivariate_color = props.bivariate_color.as_deref().and_then(|hex| {
            let parsed = Rgba::from_hex(hex, VILLAGE_FILL_ALPHA);
            if parsed.is_none() {
                tracing::warn!(village = %props.name, color = %hex, "unparseable bivariate color");
            }
            parsed
        });
        Some(Self {
            key: VillageKey::new(props.name, props.district),
            county: props.county,
            center,
            geometry: feature.geometry,
            bivariate_color,
            income_level: props.income_level,
        })
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn district(&self) -> &str {
        &self.key.district
    }

    pub fn target(&self) -> VillageTarget {
        VillageTarget::new(
            self.county.clone(),
            self.key.district.clone(),
            self.key.name.clone(),
        )
    }

    /// Bivariate color when present, otherwise the income palette.
    pub fn fill_color(&self) -> Rgba {
        if let Some(color) = self.bivariate_color {
            return color;
        }
        let level = self.income_level.unwrap_or(0) as usize;
        let hex = INCOME_COLORS.get(level).copied().unwrap_or(INCOME_COLORS[0]);
        Rgba::from_hex(hex, 1.0).unwrap_or(Rgba::new(0xfe, 0xe5, 0xd9, 1.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/region.rs"]
mod tests;
