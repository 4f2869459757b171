use super::clinics::clinic_markers;
use super::detail::build_panel;
use super::layers::{stroke_weight, CountyShape, LayerCommand, Marker, MarkerGroup, VillageShape};
use super::state::{CatalogStatus, RequestKind};
use super::weights::LegendGrid;
use super::{Action, AppState, Effect, ViewMode};
use crate::kernel::services::ports::ApiResult;
use crate::models::region::VILLAGE_FILL_ALPHA;
use crate::models::{
    Clinic, ClinicProperties, ColorMatrix, County, CountyProperties, FeatureCollection,
    PopulationPoint, Rgba, SalaryPoint, Specialty, SpecialtyCatalog, Village, VillageKey,
    VillageProperties, VillageTarget, WeightPair,
};

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub commands: Vec<LayerCommand>,
    pub state_changed: bool,
}

#[derive(Default)]
struct Frame {
    effects: Vec<Effect>,
    commands: Vec<LayerCommand>,
    changed: bool,
}

impl Frame {
    fn finish(self) -> DispatchResult {
        DispatchResult {
            effects: self.effects,
            commands: self.commands,
            state_changed: self.changed,
        }
    }
}

pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        let mut out = Frame::default();
        match action {
            Action::Started => self.start(&mut out),
            Action::Tick { now } => {
                if self.state.weights.poll(now) {
                    self.refresh_colors(&mut out);
                }
            }
            Action::CountyClicked { county } => self.request_villages(county, &mut out),
            Action::VillageClicked(target) => self.request_detail(target, &mut out),
            Action::BackToCounties => {
                if self.state.is_village_mode() {
                    self.back_to_counties(&mut out);
                }
            }
            Action::ClosePanel => self.close_panel(&mut out),
            Action::ZoomChanged { zoom } => self.zoom_changed(zoom, &mut out),
            Action::SetWeight {
                slider,
                percent,
                now,
            } => {
                out.changed = self.state.weights.set(slider, percent, now);
                let weights = self.state.weights.weights();
                tracing::debug!(
                    income = weights.income(),
                    density = weights.density(),
                    "weights updated"
                );
                out.commands.push(LayerCommand::SetSliders {
                    income: weights.income_percent(),
                    density: weights.density_percent(),
                });
            }
            Action::ToggleSpecialty { name, selected } => {
                self.toggle_specialty(name, selected, &mut out)
            }
            Action::CountiesLoaded(result) => self.counties_loaded(result, &mut out),
            Action::SpecialtiesLoaded(result) => self.specialties_loaded(result, &mut out),
            Action::VillagesLoaded {
                request_id,
                county,
                weights,
                result,
            } => {
                self.end_loading(&mut out);
                if self.accept(RequestKind::Villages, request_id) {
                    match result {
                        Ok(collection) => {
                            self.enter_village_mode(county, weights, collection, &mut out)
                        }
                        Err(e) => {
                            tracing::error!(county = %county, error = %e, "village load failed");
                            out.commands.push(LayerCommand::Alert(format!(
                                "Failed to load villages for {county}: {e}"
                            )));
                        }
                    }
                }
            }
            Action::VillageColorsLoaded { request_id, result } => {
                self.end_loading(&mut out);
                if self.accept(RequestKind::VillageColors, request_id) {
                    self.village_colors_loaded(result, &mut out);
                }
            }
            Action::LegendLoaded { request_id, result } => {
                if self.accept(RequestKind::Legend, request_id) {
                    self.legend_loaded(result, &mut out);
                }
            }
            Action::ClinicsLoaded { request_id, result } => {
                self.end_loading(&mut out);
                if self.accept(RequestKind::Clinics, request_id) {
                    self.clinics_loaded(result, &mut out);
                }
            }
            Action::VillageDetailLoaded {
                request_id,
                target,
                result,
            } => {
                self.end_loading(&mut out);
                if self.accept(RequestKind::Detail, request_id) {
                    self.detail_loaded(target, result, &mut out);
                }
            }
        }
        out.finish()
    }

    /// Consumes the generation if `request_id` is the latest for `kind`.
    fn accept(&mut self, kind: RequestKind, request_id: u64) -> bool {
        if !self.state.requests.is_current(kind, request_id) {
            tracing::debug!(?kind, request_id, "dropping stale response");
            return false;
        }
        self.state.requests.invalidate(kind);
        true
    }

    fn begin_loading(&mut self, out: &mut Frame) {
        if self.state.loading == 0 {
            out.commands.push(LayerCommand::SetLoading(true));
        }
        self.state.loading += 1;
    }

    fn end_loading(&mut self, out: &mut Frame) {
        if self.state.loading == 0 {
            return;
        }
        self.state.loading -= 1;
        if self.state.loading == 0 {
            out.commands.push(LayerCommand::SetLoading(false));
        }
    }

    fn start(&mut self, out: &mut Frame) {
        let config = &self.state.config;
        out.commands.push(LayerCommand::SetView {
            center: config.initial_center,
            zoom: config.initial_zoom,
        });
        self.state.zoom = config.initial_zoom;

        let weights = self.state.weights.weights();
        out.commands.push(LayerCommand::SetSliders {
            income: weights.income_percent(),
            density: weights.density_percent(),
        });

        self.begin_loading(out);
        out.effects.push(Effect::LoadCounties);
        out.effects.push(Effect::LoadSpecialties);
        out.changed = true;
    }

    fn counties_loaded(
        &mut self,
        result: ApiResult<FeatureCollection<CountyProperties>>,
        out: &mut Frame,
    ) {
        self.end_loading(out);
        let collection = match result {
            Ok(collection) => collection,
            Err(e) => {
                tracing::error!(error = %e, "county load failed");
                out.commands
                    .push(LayerCommand::Alert(format!("Failed to load counties: {e}")));
                return;
            }
        };

        let counties: Vec<County> = collection
            .features
            .into_iter()
            .filter_map(|feature| {
                let name = feature.properties.name.clone();
                let county = County::from_feature(feature);
                if county.is_none() {
                    tracing::warn!(county = %name, "county without label anchor skipped");
                }
                county
            })
            .collect();
        tracing::info!(count = counties.len(), "counties loaded");

        out.commands.push(LayerCommand::ShowCountyPolygons(
            counties
                .iter()
                .map(|c| CountyShape {
                    name: c.name.clone(),
                    geometry: c.geometry.clone(),
                })
                .collect(),
        ));
        self.state.counties = counties;
        if !self.state.is_village_mode() {
            self.show_county_labels(out);
        }
        out.changed = true;
    }

    fn specialties_loaded(&mut self, result: ApiResult<Vec<Specialty>>, out: &mut Frame) {
        match result {
            Ok(specialties) => {
                self.state.catalog = SpecialtyCatalog::new(specialties);
                self.state.catalog_status = CatalogStatus::Ready;
                tracing::info!(count = self.state.catalog.len(), "clinic specialties loaded");
                out.commands.push(LayerCommand::ShowSpecialtyOptions(
                    self.state.catalog.iter().cloned().collect(),
                ));
            }
            Err(e) => {
                tracing::error!(error = %e, "clinic specialty load failed");
                self.state.catalog_status = CatalogStatus::Unavailable;
                out.commands.push(LayerCommand::SpecialtyOptionsUnavailable);
            }
        }
        out.changed = true;
    }

    fn request_villages(&mut self, county: String, out: &mut Frame) {
        if self.state.county(&county).is_none() {
            tracing::warn!(county = %county, "click on unknown county");
            out.commands
                .push(LayerCommand::Alert(format!("Unknown county: {county}")));
            return;
        }
        let request_id = self.state.requests.issue(RequestKind::Villages);
        tracing::info!(county = %county, request_id, "loading villages");
        self.begin_loading(out);
        out.effects.push(Effect::LoadVillages {
            request_id,
            county,
            weights: self.state.weights.weights(),
        });
    }

    fn enter_village_mode(
        &mut self,
        county: String,
        requested: WeightPair,
        collection: FeatureCollection<VillageProperties>,
        out: &mut Frame,
    ) {
        let Some(center) = self.state.county(&county).map(|c| c.center) else {
            tracing::warn!(county = %county, "villages arrived for unknown county");
            return;
        };

        self.teardown_village_layers(out);
        out.commands.extend(self.state.markers.clear_group(MarkerGroup::CountyLabel));
        self.restore_hidden_county(out);
        out.commands.push(LayerCommand::SetCountyStyle {
            county: county.clone(),
            fill_opacity: 0.0,
            stroke_opacity: 0.0,
        });
        self.state.hidden_county = Some(county.clone());

        let villages: Vec<Village> = collection
            .features
            .into_iter()
            .filter_map(|feature| {
                let name = feature.properties.name.clone();
                let village = Village::from_feature(feature);
                if village.is_none() {
                    tracing::warn!(village = %name, "village without label anchor skipped");
                }
                village
            })
            .collect();

        let zoom = self.state.config.village_zoom;
        let stroke = stroke_weight(zoom);
        self.state.zoom = zoom;
        self.state.village_stroke = stroke;
        out.commands.push(LayerCommand::ShowVillagePolygons {
            shapes: villages
                .iter()
                .map(|v| VillageShape {
                    key: v.key.clone(),
                    county: v.county.clone(),
                    geometry: v.geometry.clone(),
                    fill: v.fill_color(),
                })
                .collect(),
            stroke_weight: stroke,
        });
        for village in &villages {
            let marker = Marker::village_label(village.name(), village.center);
            out.commands.push(self.state.markers.add(marker));
        }
        tracing::info!(county = %county, villages = villages.len(), "entered village view");
        self.state.villages = villages;

        out.commands.push(LayerCommand::SetView { center, zoom });
        if !self.state.controls_visible {
            self.state.controls_visible = true;
            out.commands.push(LayerCommand::SetModeControlsVisible(true));
        }
        self.state.mode = ViewMode::Village { county };
        out.changed = true;

        // Villages carry the colors of the weights they were requested with.
        // A slider move since then with no debounce left to fire would never
        // be applied.
        let current = self.state.weights.weights();
        if requested != current && self.state.weights.deadline().is_none() {
            tracing::debug!(
                requested = requested.income_percent(),
                current = current.income_percent(),
                "weights moved while villages were loading"
            );
            self.refresh_colors(out);
            return;
        }

        let request_id = self.state.requests.issue(RequestKind::Legend);
        out.effects.push(Effect::LoadLegend {
            request_id,
            weights: current,
        });
    }

    fn back_to_counties(&mut self, out: &mut Frame) {
        tracing::info!(county = ?self.state.current_county(), "returning to county view");
        self.teardown_village_layers(out);
        self.state.weights.cancel();
        self.restore_hidden_county(out);
        self.show_county_labels(out);
        out.commands.push(LayerCommand::FitBounds {
            bounds: self.state.config.home_bounds,
            padding: self.state.config.fit_padding,
        });
        if self.state.controls_visible {
            self.state.controls_visible = false;
            out.commands.push(LayerCommand::SetModeControlsVisible(false));
        }
        if self.state.legend_visible {
            self.state.legend_visible = false;
            out.commands.push(LayerCommand::HideLegend);
        }
        self.close_panel(out);
        self.state.mode = ViewMode::County;

        let requests = &mut self.state.requests;
        for kind in [
            RequestKind::Villages,
            RequestKind::VillageColors,
            RequestKind::Legend,
            RequestKind::Clinics,
            RequestKind::Detail,
        ] {
            requests.invalidate(kind);
        }
        out.changed = true;
    }

    /// Removes village polygons, village labels and clinic markers, and drops
    /// the specialty selection.
    fn teardown_village_layers(&mut self, out: &mut Frame) {
        if self.state.is_village_mode() {
            out.commands.push(LayerCommand::RemoveVillagePolygons);
        }
        self.state.villages.clear();
        out.commands.extend(self.state.markers.clear_group(MarkerGroup::VillageLabel));
        self.clear_clinic_markers(out);
        if !self.state.selected_specialties.is_empty() {
            self.state.selected_specialties.clear();
            out.commands.push(LayerCommand::ClearSpecialtySelection);
        }
        self.state.requests.invalidate(RequestKind::Clinics);
        self.state.requests.invalidate(RequestKind::VillageColors);
    }

    fn clear_clinic_markers(&mut self, out: &mut Frame) {
        out.commands.extend(self.state.markers.clear_group(MarkerGroup::ClinicIcon));
        out.commands.extend(self.state.markers.clear_group(MarkerGroup::ClinicBadge));
    }

    fn restore_hidden_county(&mut self, out: &mut Frame) {
        if let Some(county) = self.state.hidden_county.take() {
            out.commands.push(LayerCommand::SetCountyStyle {
                county,
                fill_opacity: self.state.config.county_fill_opacity,
                stroke_opacity: self.state.config.county_stroke_opacity,
            });
        }
    }

    fn show_county_labels(&mut self, out: &mut Frame) {
        let AppState {
            counties, markers, ..
        } = &mut self.state;
        out.commands.extend(markers.clear_group(MarkerGroup::CountyLabel));
        for county in counties.iter() {
            out.commands
                .push(markers.add(Marker::county_label(&county.name, county.center)));
        }
    }

    fn close_panel(&mut self, out: &mut Frame) {
        if self.state.panel.open.take().is_some() {
            out.commands.push(LayerCommand::HidePanel);
            out.changed = true;
        }
        if self.state.panel.chart_live {
            self.state.panel.chart_live = false;
            out.commands.push(LayerCommand::DestroyChart);
        }
    }

    fn zoom_changed(&mut self, zoom: u8, out: &mut Frame) {
        out.changed = self.state.zoom != zoom;
        self.state.zoom = zoom;

        if !self.state.is_village_mode() {
            if self.state.markers.count(MarkerGroup::CountyLabel) == 0
                && !self.state.counties.is_empty()
            {
                self.show_county_labels(out);
            }
            return;
        }

        if zoom < self.state.config.county_exit_zoom {
            tracing::info!(zoom, "zoomed out of village view");
            self.back_to_counties(out);
            return;
        }

        out.commands.extend(self.state.markers.clear_group(MarkerGroup::CountyLabel));
        let stroke = stroke_weight(zoom);
        if stroke != self.state.village_stroke {
            self.state.village_stroke = stroke;
            out.commands.push(LayerCommand::SetVillageStrokeWeight(stroke));
        }
    }

    fn refresh_colors(&mut self, out: &mut Frame) {
        let Some(county) = self.state.current_county().map(str::to_string) else {
            tracing::debug!("weight change outside village view; nothing to recolor");
            return;
        };
        let weights = self.state.weights.weights();

        let request_id = self.state.requests.issue(RequestKind::VillageColors);
        self.begin_loading(out);
        out.effects.push(Effect::LoadVillageColors {
            request_id,
            county,
            weights,
        });

        let request_id = self.state.requests.issue(RequestKind::Legend);
        out.effects.push(Effect::LoadLegend {
            request_id,
            weights,
        });
    }

    fn village_colors_loaded(
        &mut self,
        result: ApiResult<FeatureCollection<VillageProperties>>,
        out: &mut Frame,
    ) {
        let collection = match result {
            Ok(collection) => collection,
            Err(e) => {
                tracing::error!(error = %e, "village recolor failed");
                out.commands.push(LayerCommand::Alert(format!(
                    "Failed to reload village colors: {e}"
                )));
                return;
            }
        };

        let mut recolored = Vec::new();
        for feature in collection.features {
            let props = feature.properties;
            let Some(hex) = props.bivariate_color else {
                continue;
            };
            let key = VillageKey::new(props.name, props.district);
            let Some(village) = self.state.villages.iter_mut().find(|v| v.key == key) else {
                continue;
            };
            match Rgba::from_hex(&hex, VILLAGE_FILL_ALPHA) {
                Some(color) => {
                    village.bivariate_color = Some(color);
                    recolored.push((key, color));
                }
                None => {
                    tracing::warn!(village = %key.name, color = %hex, "unparseable bivariate color")
                }
            }
        }

        tracing::debug!(count = recolored.len(), "villages recolored");
        if !recolored.is_empty() {
            out.commands.push(LayerCommand::RecolorVillages(recolored));
            out.changed = true;
        }
    }

    fn legend_loaded(&mut self, result: ApiResult<ColorMatrix>, out: &mut Frame) {
        match result {
            Ok(matrix) => {
                if !self.state.is_village_mode() {
                    return;
                }
                out.commands
                    .push(LayerCommand::ShowLegend(LegendGrid::from_matrix(&matrix)));
                self.state.legend_visible = true;
                out.changed = true;
            }
            Err(e) => {
                tracing::error!(error = %e, "legend load failed");
                out.commands
                    .push(LayerCommand::Alert(format!("Failed to update legend: {e}")));
            }
        }
    }

    fn toggle_specialty(&mut self, name: String, selected: bool, out: &mut Frame) {
        let Some(county) = self.state.current_county().map(str::to_string) else {
            tracing::debug!(specialty = %name, "specialty toggle outside village view ignored");
            return;
        };
        if !self.state.catalog.contains(&name) {
            tracing::warn!(specialty = %name, "unknown specialty");
            return;
        }

        let changed = if selected {
            self.state.selected_specialties.insert(name)
        } else {
            self.state.selected_specialties.remove(&name)
        };
        if !changed {
            return;
        }
        out.changed = true;

        if self.state.selected_specialties.is_empty() {
            self.state.requests.invalidate(RequestKind::Clinics);
            self.clear_clinic_markers(out);
            return;
        }

        let request_id = self.state.requests.issue(RequestKind::Clinics);
        self.begin_loading(out);
        out.effects.push(Effect::LoadClinics {
            request_id,
            county,
            specialties: self.state.selected_specialties.iter().cloned().collect(),
        });
    }

    fn clinics_loaded(
        &mut self,
        result: ApiResult<FeatureCollection<ClinicProperties>>,
        out: &mut Frame,
    ) {
        let collection = match result {
            Ok(collection) => collection,
            Err(e) => {
                tracing::error!(error = %e, "clinic load failed");
                out.commands
                    .push(LayerCommand::Alert(format!("Failed to load clinics: {e}")));
                return;
            }
        };

        self.clear_clinic_markers(out);
        let AppState {
            catalog, markers, ..
        } = &mut self.state;
        let mut clinics = 0usize;
        for feature in collection.features {
            let name = feature.properties.name.clone();
            let Some(clinic) = Clinic::from_feature(feature) else {
                tracing::warn!(clinic = %name, "clinic without coordinates skipped");
                continue;
            };
            clinics += 1;
            for marker in clinic_markers(&clinic, catalog) {
                out.commands.push(markers.add(marker));
            }
        }
        tracing::info!(clinics, markers = markers.count(MarkerGroup::ClinicIcon)
            + markers.count(MarkerGroup::ClinicBadge), "clinic markers rebuilt");
        out.changed = true;
    }

    fn request_detail(&mut self, target: VillageTarget, out: &mut Frame) {
        if !target.is_complete() {
            tracing::error!(?target, "village click without county/district/name");
            out.commands.push(LayerCommand::Alert(
                "Missing village data; cannot load salary information".to_string(),
            ));
            return;
        }
        let request_id = self.state.requests.issue(RequestKind::Detail);
        tracing::info!(village = %target.label(), request_id, "loading village detail");
        self.begin_loading(out);
        out.effects
            .push(Effect::LoadVillageDetail { request_id, target });
    }

    fn detail_loaded(
        &mut self,
        target: VillageTarget,
        result: ApiResult<(Vec<SalaryPoint>, Vec<PopulationPoint>)>,
        out: &mut Frame,
    ) {
        let (salary, population) = match result {
            Ok(series) => series,
            Err(e) => {
                tracing::error!(
                    county = %target.county,
                    district = %target.district,
                    village = %target.name,
                    error = %e,
                    "village detail failed"
                );
                let message = if e.is_not_found() {
                    format!("No data found for {}", target.label())
                } else {
                    format!("Failed to load data for {}: {e}", target.label())
                };
                out.commands.push(LayerCommand::Alert(message));
                return;
            }
        };

        let panel = build_panel(target.clone(), &salary, &population);
        let chart = panel.chart.clone();
        if self.state.panel.chart_live {
            out.commands.push(LayerCommand::DestroyChart);
        }
        out.commands.push(LayerCommand::ShowPanel(panel));
        out.commands.push(LayerCommand::CreateChart(chart));
        self.state.panel.open = Some(target);
        self.state.panel.chart_live = true;
        out.changed = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
