#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Income,
    Density,
}

/// Income/density weighting. Held as the income slider percentage so the two
/// sliders are complementary by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightPair {
    income_percent: u8,
}

impl Default for WeightPair {
    fn default() -> Self {
        Self { income_percent: 50 }
    }
}

impl WeightPair {
    pub fn from_income_percent(percent: u8) -> Self {
        Self {
            income_percent: percent.min(100),
        }
    }

    pub fn from_slider(slider: Slider, percent: u8) -> Self {
        let percent = percent.min(100);
        match slider {
            Slider::Income => Self::from_income_percent(percent),
            Slider::Density => Self::from_income_percent(100 - percent),
        }
    }

    pub fn income_percent(self) -> u8 {
        self.income_percent
    }

    pub fn density_percent(self) -> u8 {
        100 - self.income_percent
    }

    pub fn percent(self, slider: Slider) -> u8 {
        match slider {
            Slider::Income => self.income_percent(),
            Slider::Density => self.density_percent(),
        }
    }

    pub fn income(self) -> f64 {
        f64::from(self.income_percent) / 100.0
    }

    pub fn density(self) -> f64 {
        f64::from(self.density_percent()) / 100.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/weights.rs"]
mod tests;
