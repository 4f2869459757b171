//! Line-oriented backend that narrates layer commands to a writer.

use std::io::{self, Write};

use crate::kernel::detail::AxisRange;
use crate::kernel::{ChartSpec, DetailPanel, LayerCommand, LegendGrid, MarkerGroup};
use crate::ui::backend::MapBackend;

pub struct ConsoleBackend<W: Write> {
    out: W,
}

impl ConsoleBackend<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleBackend<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            tracing::debug!(error = %e, "console write failed");
        }
    }

    fn print_panel(&mut self, panel: &DetailPanel) {
        self.line(&format!("== {} ==", panel.title));
        if panel.salary_rows.is_empty() {
            self.line("  salary: no data");
        } else {
            self.line("  year    median salary");
            for row in &panel.salary_rows {
                self.line(&format!("  {:<6}  {:>13}", row.year, row.median));
            }
        }
        if panel.population_rows.is_empty() {
            self.line("  population: no data");
        } else {
            self.line("  period      households   population");
            for row in &panel.population_rows {
                self.line(&format!(
                    "  {:<10}  {:>10}   {:>10}",
                    row.year_month, row.households, row.population
                ));
            }
        }
    }

    fn print_chart(&mut self, chart: &ChartSpec) {
        self.line(&format!("-- {} --", chart.title));
        let years: Vec<String> = chart.years.iter().map(i32::to_string).collect();
        self.line(&format!("  years:      {}", years.join(" ")));
        self.line(&format!(
            "  salary:     {}  {}",
            series_text(&chart.salary),
            axis_text(chart.salary_axis)
        ));
        if let (Some(series), Some(axis)) = (&chart.population, chart.population_axis) {
            self.line(&format!(
                "  population: {}  {}",
                series_text(series),
                axis_text(axis)
            ));
        }
    }

    fn print_legend(&mut self, legend: &LegendGrid) {
        self.line("legend (rows: density high→low, columns: income low→high)");
        for row in &legend.rows {
            let cells: Vec<&str> = row.iter().map(|cell| cell.color.as_str()).collect();
            self.line(&format!("  {}", cells.join(" ")));
        }
    }
}

fn series_text(values: &[Option<f64>]) -> String {
    values
        .iter()
        .map(|v| match v {
            Some(v) => format!("{v:.0}"),
            None => "-".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn axis_text(axis: AxisRange) -> String {
    format!("[{:.0}..{:.0}]", axis.min, axis.max)
}

impl<W: Write> MapBackend for ConsoleBackend<W> {
    fn apply(&mut self, command: LayerCommand) {
        match command {
            LayerCommand::ShowCountyPolygons(shapes) => {
                self.line(&format!("map: {} counties", shapes.len()));
            }
            LayerCommand::SetCountyStyle {
                county,
                fill_opacity,
                ..
            } => {
                if fill_opacity == 0.0 {
                    self.line(&format!("map: {county} hidden"));
                } else {
                    self.line(&format!("map: {county} restored"));
                }
            }
            LayerCommand::ShowVillagePolygons {
                shapes,
                stroke_weight,
            } => {
                self.line(&format!(
                    "map: {} villages (outline {stroke_weight})",
                    shapes.len()
                ));
            }
            LayerCommand::RemoveVillagePolygons => self.line("map: villages removed"),
            LayerCommand::SetVillageStrokeWeight(weight) => {
                self.line(&format!("map: village outline {weight}"))
            }
            LayerCommand::RecolorVillages(colors) => {
                self.line(&format!("map: {} villages recolored", colors.len()))
            }
            LayerCommand::AddMarker { marker, .. } => {
                if marker.group != MarkerGroup::ClinicIcon {
                    return;
                }
                let Some(popup) = marker.popup else {
                    return;
                };
                let specialties: Vec<String> = popup
                    .specialties
                    .iter()
                    .map(|(icon, name)| format!("{icon} {name}"))
                    .collect();
                self.line(&format!(
                    "clinic {} {} ({:.5}, {:.5}) {} | {}",
                    marker.text,
                    popup.name,
                    marker.position.lat,
                    marker.position.lng,
                    popup.address,
                    specialties.join(", ")
                ));
            }
            LayerCommand::RemoveMarker(_) => {}
            LayerCommand::SetView { center, zoom } => self.line(&format!(
                "view: ({:.4}, {:.4}) zoom {zoom}",
                center.lat, center.lng
            )),
            LayerCommand::FitBounds { bounds, .. } => self.line(&format!(
                "view: fit ({:.1}, {:.1})-({:.1}, {:.1})",
                bounds.south_west.lat,
                bounds.south_west.lng,
                bounds.north_east.lat,
                bounds.north_east.lng
            )),
            LayerCommand::SetModeControlsVisible(visible) => {
                if visible {
                    self.line("controls: back, weights, clinics");
                }
            }
            LayerCommand::SetSliders { income, density } => {
                self.line(&format!("weights: income {income}% density {density}%"))
            }
            LayerCommand::ShowLegend(legend) => self.print_legend(&legend),
            LayerCommand::HideLegend => {}
            LayerCommand::ShowSpecialtyOptions(options) => {
                let names: Vec<String> = options
                    .iter()
                    .map(|s| format!("{} {}", s.icon, s.name))
                    .collect();
                self.line(&format!("specialties: {}", names.join(", ")));
            }
            LayerCommand::SpecialtyOptionsUnavailable => {
                self.line("specialties: unavailable")
            }
            LayerCommand::ClearSpecialtySelection => self.line("specialties: selection cleared"),
            LayerCommand::ShowPanel(panel) => self.print_panel(&panel),
            LayerCommand::HidePanel => self.line("panel closed"),
            LayerCommand::CreateChart(chart) => self.print_chart(&chart),
            LayerCommand::DestroyChart => {}
            LayerCommand::SetLoading(loading) => {
                if loading {
                    self.line("loading...");
                }
            }
            LayerCommand::Alert(message) => self.line(&format!("! {message}")),
        }
    }

    fn apply_all(&mut self, commands: Vec<LayerCommand>) {
        let mut labels = 0usize;
        for command in commands {
            if let LayerCommand::AddMarker { marker, .. } = &command {
                if !marker.group.is_clinic() {
                    labels += 1;
                    continue;
                }
            }
            self.apply(command);
        }
        if labels > 0 {
            self.line(&format!("map: {labels} labels"));
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/ui/backend/console.rs"]
mod tests;
