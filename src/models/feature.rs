//! GeoJSON-shaped wire containers and coordinates.
//!
//! Geometry is kept as raw JSON: the controller never inspects polygon rings,
//! it only hands them to the render backend.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub const fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection<P> {
    #[serde(default)]
    pub features: Vec<Feature<P>>,
}

impl<P> Default for FeatureCollection<P> {
    fn default() -> Self {
        Self {
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature<P> {
    pub properties: P,
    #[serde(default)]
    pub geometry: serde_json::Value,
}

impl<P> Feature<P> {
    /// `[lon, lat]` of a GeoJSON `Point` geometry.
    pub fn point(&self) -> Option<LatLng> {
        let coords = self.geometry.get("coordinates")?.as_array()?;
        let lng = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        (lat.is_finite() && lng.is_finite()).then_some(LatLng::new(lat, lng))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts a coordinate sent either as a JSON number or as a numeric string.
/// Anything unparseable is treated as missing.
pub(crate) fn lenient_coord<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    }
    .filter(|v| v.is_finite()))
}

pub(crate) fn anchor(lat: Option<f64>, lon: Option<f64>) -> Option<LatLng> {
    Some(LatLng::new(lat?, lon?))
}

#[cfg(test)]
#[path = "../../tests/unit/models/feature.rs"]
mod tests;
