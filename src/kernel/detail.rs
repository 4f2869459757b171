//! Salary/population detail panel: tables plus a dual-axis chart whose series
//! share one merged year axis.

use std::collections::BTreeMap;

use crate::models::{PopulationPoint, SalaryPoint, VillageTarget};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Pads the observed range by 10% on each side, never below zero.
    /// Empty series fall back to `default`.
    pub fn suggested(values: &[Option<f64>], default: AxisRange) -> Self {
        let mut present = values.iter().flatten().copied();
        let Some(first) = present.next() else {
            return default;
        };
        let (min, max) = present.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let pad = (max - min) * 0.1;
        Self {
            min: (min - pad).max(0.0),
            max: max + pad,
        }
    }
}

pub const SALARY_AXIS_DEFAULT: AxisRange = AxisRange { min: 0.0, max: 100.0 };
pub const POPULATION_AXIS_DEFAULT: AxisRange = AxisRange {
    min: 0.0,
    max: 10_000.0,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub years: Vec<i32>,
    /// Aligned to `years`; `None` is a gap.
    pub salary: Vec<Option<f64>>,
    pub salary_axis: AxisRange,
    /// Absent when the village has no population samples at all.
    pub population: Option<Vec<Option<f64>>>,
    pub population_axis: Option<AxisRange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryRow {
    pub year: i32,
    pub median: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRow {
    pub year_month: String,
    pub households: String,
    pub population: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailPanel {
    pub target: VillageTarget,
    pub title: String,
    pub salary_rows: Vec<SalaryRow>,
    pub population_rows: Vec<PopulationRow>,
    pub chart: ChartSpec,
}

/// Mean population per year; multiple monthly samples in a year are averaged.
pub fn population_by_year(points: &[PopulationPoint]) -> BTreeMap<i32, f64> {
    let mut sums: BTreeMap<i32, (u64, u32)> = BTreeMap::new();
    for point in points {
        let Some(year) = point.year() else {
            tracing::warn!(year_month = %point.year_month, "population sample without a year");
            continue;
        };
        let entry = sums.entry(year).or_insert((0, 0));
        entry.0 += point.population;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(year, (sum, n))| (year, sum as f64 / f64::from(n)))
        .collect()
}

/// Sorted, deduplicated union of both series' years.
pub fn merged_years(salary: &[SalaryPoint], population: &BTreeMap<i32, f64>) -> Vec<i32> {
    let mut years: Vec<i32> = salary
        .iter()
        .map(|p| p.year)
        .chain(population.keys().copied())
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

pub fn align_salary(years: &[i32], salary: &[SalaryPoint]) -> Vec<Option<f64>> {
    years
        .iter()
        .map(|year| salary.iter().find(|p| p.year == *year).map(|p| p.median))
        .collect()
}

pub fn align_population(years: &[i32], by_year: &BTreeMap<i32, f64>) -> Vec<Option<f64>> {
    years.iter().map(|year| by_year.get(year).copied()).collect()
}

pub fn build_chart(
    title: String,
    salary: &[SalaryPoint],
    population: &[PopulationPoint],
) -> ChartSpec {
    let by_year = population_by_year(population);
    let years = merged_years(salary, &by_year);
    let salary_series = align_salary(&years, salary);
    let salary_axis = AxisRange::suggested(&salary_series, SALARY_AXIS_DEFAULT);

    let (population_series, population_axis) = if population.is_empty() {
        (None, None)
    } else {
        let series = align_population(&years, &by_year);
        let axis = AxisRange::suggested(&series, POPULATION_AXIS_DEFAULT);
        (Some(series), Some(axis))
    };

    ChartSpec {
        title,
        years,
        salary: salary_series,
        salary_axis,
        population: population_series,
        population_axis,
    }
}

pub fn build_panel(
    target: VillageTarget,
    salary: &[SalaryPoint],
    population: &[PopulationPoint],
) -> DetailPanel {
    let place = target.label();
    let mut salary_rows: Vec<SalaryRow> = salary
        .iter()
        .map(|p| SalaryRow {
            year: p.year,
            median: group_thousands(p.median.round() as i64),
        })
        .collect();
    salary_rows.sort_by_key(|row| row.year);

    let population_rows = population
        .iter()
        .map(|p| PopulationRow {
            year_month: p.year_month.clone(),
            households: group_thousands(p.households as i64),
            population: group_thousands(p.population as i64),
        })
        .collect();

    DetailPanel {
        title: format!("{place} salary and population"),
        chart: build_chart(format!("{place} salary and population trend"), salary, population),
        target,
        salary_rows,
        population_rows,
    }
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/detail.rs"]
mod tests;
