use std::time::Duration;

use crate::models::{LatLng, LatLngBounds};

#[derive(Clone, Debug)]
pub struct MapConfig {
    pub initial_center: LatLng,
    pub initial_zoom: u8,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Zoom used when centering on a county.
    pub village_zoom: u8,
    /// Below this zoom village mode falls back to county mode.
    pub county_exit_zoom: u8,
    pub home_bounds: LatLngBounds,
    pub fit_padding: u16,
    pub weight_debounce: Duration,
    pub county_fill_opacity: f32,
    pub county_stroke_opacity: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_center: LatLng::new(23.8, 120.9),
            initial_zoom: 8,
            min_zoom: 6,
            max_zoom: 18,
            village_zoom: 11,
            county_exit_zoom: 9,
            home_bounds: LatLngBounds::new(LatLng::new(22.0, 120.0), LatLng::new(25.0, 122.0)),
            fit_padding: 20,
            weight_debounce: Duration::from_millis(300),
            county_fill_opacity: 0.7,
            county_stroke_opacity: 1.0,
        }
    }
}

impl MapConfig {
    pub fn clamp_zoom(&self, zoom: u8) -> u8 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
