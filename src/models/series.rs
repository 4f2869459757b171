//! Salary and population time series as returned by the data service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryPoint {
    #[serde(rename = "年份", alias = "year")]
    pub year: i32,
    #[serde(rename = "中位數", alias = "median")]
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationPoint {
    #[serde(rename = "年份", alias = "year", default)]
    pub year: Option<i32>,
    #[serde(rename = "月份", alias = "month", default)]
    pub month: Option<u8>,
    #[serde(rename = "統計年月", alias = "yearMonth", default)]
    pub year_month: String,
    #[serde(rename = "戶數", alias = "households", default)]
    pub households: u64,
    #[serde(rename = "人口數", alias = "population")]
    pub population: u64,
}

impl PopulationPoint {
    /// Explicit year, falling back to the `YYYY/MM` prefix of `year_month`.
    pub fn year(&self) -> Option<i32> {
        self.year.or_else(|| {
            self.year_month
                .split(|c: char| c == '/' || c == '-')
                .next()
                .and_then(|y| y.trim().parse().ok())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/series.rs"]
mod tests;
