use super::*;
use crate::kernel::services::ports::{ApiError, ApiOp, MapConfig};
use crate::models::{LatLng, Slider, WeightPair};
use serde_json::json;
use std::time::{Duration, Instant};

const HUALIEN: &str = "Hualien County";
const TAITUNG: &str = "Taitung County";

fn new_store() -> Store {
    Store::new(AppState::new(MapConfig::default()))
}

fn counties() -> FeatureCollection<CountyProperties> {
    serde_json::from_value(json!({
        "type": "FeatureCollection",
        "features": [
            {
                "properties": { "name": HUALIEN, "center_lat": 23.7, "center_lon": 121.4 },
                "geometry": { "type": "Polygon", "coordinates": [] }
            },
            {
                "properties": { "name": TAITUNG, "center_lat": "22.9", "center_lon": "121.1" },
                "geometry": { "type": "Polygon", "coordinates": [] }
            },
            { "properties": { "name": "Nowhere" } }
        ]
    }))
    .unwrap()
}

fn villages(county: &str) -> FeatureCollection<VillageProperties> {
    serde_json::from_value(json!({
        "features": [
            {
                "properties": {
                    "name": "Minsheng", "county": county, "district": "Hualien City",
                    "center_lat": 23.98, "center_lon": 121.6, "bivariate_color": "#aabbcc"
                }
            },
            {
                "properties": {
                    "name": "Guohua", "county": county, "district": "Hualien City",
                    "center_lat": 23.97, "center_lon": 121.61, "income_level": 3
                }
            },
            {
                "properties": { "name": "Lost", "county": county, "district": "Hualien City" }
            }
        ]
    }))
    .unwrap()
}

fn specialties() -> Vec<Specialty> {
    vec![
        Specialty {
            name: "Dentistry".to_string(),
            icon: "🦷".to_string(),
            order: 1,
        },
        Specialty {
            name: "Pediatrics".to_string(),
            icon: "👶".to_string(),
            order: 2,
        },
    ]
}

fn clinics() -> FeatureCollection<ClinicProperties> {
    serde_json::from_value(json!({
        "features": [
            {
                "properties": { "name": "A", "address": "a", "specialties": ["Pediatrics", "Dentistry"] },
                "geometry": { "type": "Point", "coordinates": [121.6, 23.98] }
            },
            {
                "properties": { "name": "B", "address": "b", "specialties": ["Pediatrics"] },
                "geometry": { "type": "Point", "coordinates": [121.5, 23.9] }
            },
            {
                "properties": { "name": "C", "address": "c", "specialties": ["Pediatrics"] },
                "geometry": null
            }
        ]
    }))
    .unwrap()
}

fn matrix() -> ColorMatrix {
    ColorMatrix::new(vec![vec!["#123456".to_string(); 9]; 9]).unwrap()
}

fn not_found(op: ApiOp) -> ApiError {
    ApiError::Status {
        op,
        status: 404,
        message: "not found".to_string(),
    }
}

fn transport(op: ApiOp) -> ApiError {
    ApiError::Transport {
        op,
        message: "connection refused".to_string(),
    }
}

fn loaded_store() -> Store {
    let mut store = new_store();
    store.dispatch(Action::Started);
    store.dispatch(Action::CountiesLoaded(Ok(counties())));
    store.dispatch(Action::SpecialtiesLoaded(Ok(specialties())));
    store
}

fn request_id(result: &DispatchResult) -> u64 {
    match result.effects.first() {
        Some(Effect::LoadVillages { request_id, .. })
        | Some(Effect::LoadVillageColors { request_id, .. })
        | Some(Effect::LoadLegend { request_id, .. })
        | Some(Effect::LoadClinics { request_id, .. })
        | Some(Effect::LoadVillageDetail { request_id, .. }) => *request_id,
        other => panic!("expected a request effect, got {other:?}"),
    }
}

fn requested_weights(result: &DispatchResult) -> WeightPair {
    match result.effects.first() {
        Some(Effect::LoadVillages { weights, .. }) => *weights,
        other => panic!("expected LoadVillages, got {other:?}"),
    }
}

fn recolor_weights(result: &DispatchResult) -> Option<WeightPair> {
    result.effects.iter().find_map(|effect| match effect {
        Effect::LoadVillageColors { weights, .. } => Some(*weights),
        _ => None,
    })
}

fn legend_id(result: &DispatchResult) -> u64 {
    result
        .effects
        .iter()
        .find_map(|effect| match effect {
            Effect::LoadLegend { request_id, .. } => Some(*request_id),
            _ => None,
        })
        .expect("legend effect")
}

fn enter_county(store: &mut Store, county: &str) -> DispatchResult {
    let clicked = store.dispatch(Action::CountyClicked {
        county: county.to_string(),
    });
    store.dispatch(Action::VillagesLoaded {
        request_id: request_id(&clicked),
        county: county.to_string(),
        weights: requested_weights(&clicked),
        result: Ok(villages(county)),
    })
}

fn alerts(result: &DispatchResult) -> Vec<&str> {
    result
        .commands
        .iter()
        .filter_map(|c| match c {
            LayerCommand::Alert(message) => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

fn target() -> VillageTarget {
    VillageTarget::new(HUALIEN, "Hualien City", "Minsheng")
}

#[test]
fn test_started_requests_catalogs() {
    let mut store = new_store();
    let result = store.dispatch(Action::Started);

    assert_eq!(
        result.effects,
        vec![Effect::LoadCounties, Effect::LoadSpecialties]
    );
    assert!(result.commands.contains(&LayerCommand::SetLoading(true)));
    assert!(result.commands.contains(&LayerCommand::SetSliders {
        income: 50,
        density: 50
    }));
    assert!(result.state_changed);
}

#[test]
fn test_counties_loaded_labels_only_anchored_counties() {
    let mut store = new_store();
    store.dispatch(Action::Started);
    let result = store.dispatch(Action::CountiesLoaded(Ok(counties())));

    assert_eq!(store.state().counties.len(), 2);
    assert_eq!(store.state().markers.count(MarkerGroup::CountyLabel), 2);
    let shapes = result.commands.iter().find_map(|c| match c {
        LayerCommand::ShowCountyPolygons(shapes) => Some(shapes.len()),
        _ => None,
    });
    assert_eq!(shapes, Some(2));
    assert!(result.commands.contains(&LayerCommand::SetLoading(false)));
}

#[test]
fn test_counties_failure_alerts() {
    let mut store = new_store();
    store.dispatch(Action::Started);
    let result = store.dispatch(Action::CountiesLoaded(Err(transport(ApiOp::Counties))));
    assert_eq!(alerts(&result).len(), 1);
    assert!(store.state().counties.is_empty());
}

#[test]
fn test_specialty_catalog_failure_is_not_fatal() {
    let mut store = new_store();
    let result = store.dispatch(Action::SpecialtiesLoaded(Err(transport(
        ApiOp::ClinicSpecialties,
    ))));

    assert_eq!(store.state().catalog_status, CatalogStatus::Unavailable);
    assert_eq!(
        result.commands,
        vec![LayerCommand::SpecialtyOptionsUnavailable]
    );
}

#[test]
fn test_county_click_requests_villages_with_current_weights() {
    let mut store = loaded_store();
    let now = Instant::now();
    store.dispatch(Action::SetWeight {
        slider: Slider::Income,
        percent: 70,
        now,
    });
    let result = store.dispatch(Action::CountyClicked {
        county: HUALIEN.to_string(),
    });

    let Some(Effect::LoadVillages {
        county, weights, ..
    }) = result.effects.first()
    else {
        panic!("expected LoadVillages, got {:?}", result.effects);
    };
    assert_eq!(county, HUALIEN);
    assert_eq!(weights.income_percent(), 70);
    assert_eq!(weights.density_percent(), 30);
    assert_eq!(store.state().mode, ViewMode::County);
}

#[test]
fn test_unknown_county_click_alerts_without_request() {
    let mut store = loaded_store();
    let result = store.dispatch(Action::CountyClicked {
        county: "Atlantis".to_string(),
    });
    assert!(result.effects.is_empty());
    assert_eq!(alerts(&result).len(), 1);
}

#[test]
fn test_entering_village_mode() {
    let mut store = loaded_store();
    let result = enter_county(&mut store, HUALIEN);
    let state = store.state();

    assert_eq!(state.current_county(), Some(HUALIEN));
    assert_eq!(state.zoom, 11);
    assert_eq!(state.hidden_county.as_deref(), Some(HUALIEN));
    assert_eq!(state.villages.len(), 2);
    assert_eq!(state.markers.count(MarkerGroup::CountyLabel), 0);
    assert_eq!(state.markers.count(MarkerGroup::VillageLabel), 2);
    assert!(state.controls_visible);

    assert!(result.commands.contains(&LayerCommand::SetCountyStyle {
        county: HUALIEN.to_string(),
        fill_opacity: 0.0,
        stroke_opacity: 0.0,
    }));
    assert!(result.commands.contains(&LayerCommand::SetView {
        center: LatLng::new(23.7, 121.4),
        zoom: 11,
    }));
    assert!(result
        .commands
        .contains(&LayerCommand::SetModeControlsVisible(true)));
    assert!(result
        .effects
        .iter()
        .any(|e| matches!(e, Effect::LoadLegend { .. })));

    let fills = result.commands.iter().find_map(|c| match c {
        LayerCommand::ShowVillagePolygons {
            shapes,
            stroke_weight,
        } => Some((shapes.clone(), *stroke_weight)),
        _ => None,
    });
    let (shapes, stroke) = fills.expect("village polygons");
    assert_eq!(stroke, 1);
    assert_eq!(shapes[0].fill, Rgba::new(0xaa, 0xbb, 0xcc, 0.75));
    assert_eq!(shapes[1].fill, Rgba::from_hex("#fb6a4a", 1.0).unwrap());
}

#[test]
fn test_only_latest_village_response_applies() {
    let mut store = loaded_store();
    let first = store.dispatch(Action::CountyClicked {
        county: HUALIEN.to_string(),
    });
    let second = store.dispatch(Action::CountyClicked {
        county: TAITUNG.to_string(),
    });

    let stale = store.dispatch(Action::VillagesLoaded {
        request_id: request_id(&first),
        county: HUALIEN.to_string(),
        weights: requested_weights(&first),
        result: Ok(villages(HUALIEN)),
    });
    assert!(!stale.state_changed);
    assert_eq!(store.state().mode, ViewMode::County);

    store.dispatch(Action::VillagesLoaded {
        request_id: request_id(&second),
        county: TAITUNG.to_string(),
        weights: requested_weights(&second),
        result: Ok(villages(TAITUNG)),
    });
    assert_eq!(store.state().current_county(), Some(TAITUNG));
}

#[test]
fn test_village_failure_keeps_current_view() {
    let mut store = loaded_store();
    let clicked = store.dispatch(Action::CountyClicked {
        county: HUALIEN.to_string(),
    });
    let result = store.dispatch(Action::VillagesLoaded {
        request_id: request_id(&clicked),
        county: HUALIEN.to_string(),
        weights: requested_weights(&clicked),
        result: Err(transport(ApiOp::Villages)),
    });

    assert_eq!(store.state().mode, ViewMode::County);
    assert_eq!(store.state().markers.count(MarkerGroup::CountyLabel), 2);
    assert_eq!(alerts(&result).len(), 1);
    assert!(result.commands.contains(&LayerCommand::SetLoading(false)));
}

#[test]
fn test_switching_county_restores_previous_fill() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let result = enter_county(&mut store, TAITUNG);

    assert!(result.commands.contains(&LayerCommand::RemoveVillagePolygons));
    assert!(result.commands.contains(&LayerCommand::SetCountyStyle {
        county: HUALIEN.to_string(),
        fill_opacity: 0.7,
        stroke_opacity: 1.0,
    }));
    assert_eq!(store.state().hidden_county.as_deref(), Some(TAITUNG));
    assert_eq!(store.state().markers.count(MarkerGroup::VillageLabel), 2);
}

#[test]
fn test_back_to_counties_restores_county_view() {
    let mut store = loaded_store();
    let entered = enter_county(&mut store, HUALIEN);
    store.dispatch(Action::LegendLoaded {
        request_id: legend_id(&entered),
        result: Ok(matrix()),
    });
    let clicked = store.dispatch(Action::VillageClicked(target()));
    store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&clicked),
        target: target(),
        result: Ok((vec![SalaryPoint { year: 2020, median: 500.0 }], vec![])),
    });

    let result = store.dispatch(Action::BackToCounties);
    let state = store.state();

    assert_eq!(state.mode, ViewMode::County);
    assert!(state.villages.is_empty());
    assert_eq!(state.hidden_county, None);
    assert_eq!(state.markers.count(MarkerGroup::CountyLabel), 2);
    assert_eq!(state.markers.count(MarkerGroup::VillageLabel), 0);
    assert!(!state.controls_visible);
    assert!(!state.legend_visible);
    assert!(state.panel.open.is_none());
    assert!(!state.panel.chart_live);

    for expected in [
        LayerCommand::RemoveVillagePolygons,
        LayerCommand::HideLegend,
        LayerCommand::HidePanel,
        LayerCommand::DestroyChart,
        LayerCommand::SetModeControlsVisible(false),
        LayerCommand::FitBounds {
            bounds: MapConfig::default().home_bounds,
            padding: 20,
        },
    ] {
        assert!(result.commands.contains(&expected), "missing {expected:?}");
    }
}

#[test]
fn test_back_to_counties_in_county_mode_is_noop() {
    let mut store = loaded_store();
    let result = store.dispatch(Action::BackToCounties);
    assert!(result.commands.is_empty());
    assert!(!result.state_changed);
}

#[test]
fn test_responses_after_exit_are_ignored() {
    let mut store = loaded_store();
    let entered = enter_county(&mut store, HUALIEN);
    let clicked = store.dispatch(Action::VillageClicked(target()));
    store.dispatch(Action::BackToCounties);

    let legend = store.dispatch(Action::LegendLoaded {
        request_id: legend_id(&entered),
        result: Ok(matrix()),
    });
    assert!(legend.commands.is_empty());

    let detail = store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&clicked),
        target: target(),
        result: Ok((vec![], vec![])),
    });
    assert!(!detail
        .commands
        .iter()
        .any(|c| matches!(c, LayerCommand::ShowPanel(_))));
    assert!(store.state().panel.open.is_none());
}

#[test]
fn test_zooming_out_leaves_village_mode() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);

    store.dispatch(Action::ZoomChanged { zoom: 9 });
    assert!(store.state().is_village_mode());

    let result = store.dispatch(Action::ZoomChanged { zoom: 8 });
    assert_eq!(store.state().mode, ViewMode::County);
    assert!(result.commands.contains(&LayerCommand::RemoveVillagePolygons));

    store.dispatch(Action::ZoomChanged { zoom: 12 });
    assert_eq!(store.state().mode, ViewMode::County);
}

#[test]
fn test_zoom_updates_village_stroke_weight() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);

    let result = store.dispatch(Action::ZoomChanged { zoom: 15 });
    assert_eq!(
        result.commands,
        vec![LayerCommand::SetVillageStrokeWeight(2)]
    );

    let result = store.dispatch(Action::ZoomChanged { zoom: 16 });
    assert!(result.commands.is_empty());

    let result = store.dispatch(Action::ZoomChanged { zoom: 17 });
    assert_eq!(
        result.commands,
        vec![LayerCommand::SetVillageStrokeWeight(3)]
    );
}

#[test]
fn test_weight_changes_debounce_into_one_refresh() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let start = Instant::now();

    for (i, percent) in [55u8, 60, 65, 70].into_iter().enumerate() {
        let result = store.dispatch(Action::SetWeight {
            slider: Slider::Income,
            percent,
            now: start + Duration::from_millis(i as u64 * 100),
        });
        assert!(result.effects.is_empty());
        assert!(result.commands.contains(&LayerCommand::SetSliders {
            income: percent,
            density: 100 - percent,
        }));
    }

    let early = store.dispatch(Action::Tick {
        now: start + Duration::from_millis(500),
    });
    assert!(early.effects.is_empty());

    let fired = store.dispatch(Action::Tick {
        now: start + Duration::from_millis(600),
    });
    assert_eq!(fired.effects.len(), 2);
    let Effect::LoadVillageColors {
        county, weights, ..
    } = &fired.effects[0]
    else {
        panic!("expected LoadVillageColors, got {:?}", fired.effects);
    };
    assert_eq!(county, HUALIEN);
    assert_eq!(weights.income_percent(), 70);
    assert!(matches!(fired.effects[1], Effect::LoadLegend { .. }));

    let later = store.dispatch(Action::Tick {
        now: start + Duration::from_secs(5),
    });
    assert!(later.effects.is_empty());
}

#[test]
fn test_weight_change_in_county_mode_only_moves_sliders() {
    let mut store = loaded_store();
    let start = Instant::now();
    store.dispatch(Action::SetWeight {
        slider: Slider::Density,
        percent: 80,
        now: start,
    });
    let result = store.dispatch(Action::Tick {
        now: start + Duration::from_secs(1),
    });
    assert!(result.effects.is_empty());
    assert_eq!(store.state().weights.weights().income_percent(), 20);
}

#[test]
fn test_recolor_updates_matching_villages() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let start = Instant::now();
    store.dispatch(Action::SetWeight {
        slider: Slider::Income,
        percent: 90,
        now: start,
    });
    let fired = store.dispatch(Action::Tick {
        now: start + Duration::from_millis(300),
    });

    let recolored: FeatureCollection<VillageProperties> = serde_json::from_value(json!({
        "features": [
            { "properties": { "name": "Guohua", "district": "Hualien City", "bivariate_color": "#010203" } },
            { "properties": { "name": "Guohua", "district": "Elsewhere", "bivariate_color": "#ffffff" } }
        ]
    }))
    .unwrap();
    let result = store.dispatch(Action::VillageColorsLoaded {
        request_id: request_id(&fired),
        result: Ok(recolored),
    });

    let color = Rgba::new(1, 2, 3, 0.75);
    assert_eq!(
        result.commands,
        vec![
            LayerCommand::SetLoading(false),
            LayerCommand::RecolorVillages(vec![(
                VillageKey::new("Guohua", "Hualien City"),
                color
            )]),
        ]
    );
    let guohua = store
        .state()
        .villages
        .iter()
        .find(|v| v.name() == "Guohua")
        .unwrap();
    assert_eq!(guohua.fill_color(), color);
}

#[test]
fn test_stale_legend_is_dropped() {
    let mut store = loaded_store();
    let entered = enter_county(&mut store, HUALIEN);
    let start = Instant::now();
    store.dispatch(Action::SetWeight {
        slider: Slider::Income,
        percent: 10,
        now: start,
    });
    let fired = store.dispatch(Action::Tick {
        now: start + Duration::from_millis(300),
    });

    let stale = store.dispatch(Action::LegendLoaded {
        request_id: legend_id(&entered),
        result: Ok(matrix()),
    });
    assert!(stale.commands.is_empty());

    let fresh = store.dispatch(Action::LegendLoaded {
        request_id: legend_id(&fired),
        result: Ok(matrix()),
    });
    assert!(matches!(fresh.commands[..], [LayerCommand::ShowLegend(_)]));
    assert!(store.state().legend_visible);
}

#[test]
fn test_specialty_toggle_ignored_in_county_mode() {
    let mut store = loaded_store();
    let result = store.dispatch(Action::ToggleSpecialty {
        name: "Dentistry".to_string(),
        selected: true,
    });
    assert!(result.effects.is_empty());
    assert!(store.state().selected_specialties.is_empty());
}

#[test]
fn test_specialty_selection_drives_clinic_requests() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);

    store.dispatch(Action::ToggleSpecialty {
        name: "Pediatrics".to_string(),
        selected: true,
    });
    let result = store.dispatch(Action::ToggleSpecialty {
        name: "Dentistry".to_string(),
        selected: true,
    });
    let Some(Effect::LoadClinics {
        county,
        specialties,
        ..
    }) = result.effects.first()
    else {
        panic!("expected LoadClinics, got {:?}", result.effects);
    };
    assert_eq!(county, HUALIEN);
    assert_eq!(
        specialties,
        &vec!["Dentistry".to_string(), "Pediatrics".to_string()]
    );

    let unknown = store.dispatch(Action::ToggleSpecialty {
        name: "Acupuncture".to_string(),
        selected: true,
    });
    assert!(unknown.effects.is_empty());
}

#[test]
fn test_clinics_loaded_builds_markers() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let toggled = store.dispatch(Action::ToggleSpecialty {
        name: "Pediatrics".to_string(),
        selected: true,
    });
    store.dispatch(Action::ClinicsLoaded {
        request_id: request_id(&toggled),
        result: Ok(clinics()),
    });

    let markers = &store.state().markers;
    assert_eq!(markers.count(MarkerGroup::ClinicIcon), 2);
    assert_eq!(markers.count(MarkerGroup::ClinicBadge), 1);

    let cleared = store.dispatch(Action::ToggleSpecialty {
        name: "Pediatrics".to_string(),
        selected: false,
    });
    assert!(cleared.effects.is_empty());
    assert_eq!(
        cleared
            .commands
            .iter()
            .filter(|c| matches!(c, LayerCommand::RemoveMarker(_)))
            .count(),
        3
    );
    assert_eq!(store.state().markers.count(MarkerGroup::ClinicIcon), 0);
}

#[test]
fn test_clinic_failure_keeps_markers() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let first = store.dispatch(Action::ToggleSpecialty {
        name: "Pediatrics".to_string(),
        selected: true,
    });
    store.dispatch(Action::ClinicsLoaded {
        request_id: request_id(&first),
        result: Ok(clinics()),
    });
    let second = store.dispatch(Action::ToggleSpecialty {
        name: "Dentistry".to_string(),
        selected: true,
    });
    let result = store.dispatch(Action::ClinicsLoaded {
        request_id: request_id(&second),
        result: Err(transport(ApiOp::Clinics)),
    });

    assert_eq!(alerts(&result).len(), 1);
    assert_eq!(store.state().markers.count(MarkerGroup::ClinicIcon), 2);
}

#[test]
fn test_leaving_village_mode_clears_clinics_and_selection() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let toggled = store.dispatch(Action::ToggleSpecialty {
        name: "Pediatrics".to_string(),
        selected: true,
    });
    store.dispatch(Action::ClinicsLoaded {
        request_id: request_id(&toggled),
        result: Ok(clinics()),
    });

    let result = store.dispatch(Action::BackToCounties);
    assert!(result
        .commands
        .contains(&LayerCommand::ClearSpecialtySelection));
    assert!(store.state().selected_specialties.is_empty());
    assert_eq!(store.state().markers.count(MarkerGroup::ClinicIcon), 0);
    assert_eq!(store.state().markers.count(MarkerGroup::ClinicBadge), 0);
}

#[test]
fn test_incomplete_village_click_alerts_without_request() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let result = store.dispatch(Action::VillageClicked(VillageTarget::new(
        HUALIEN, " ", "Minsheng",
    )));
    assert!(result.effects.is_empty());
    assert_eq!(alerts(&result).len(), 1);
}

#[test]
fn test_detail_panel_replaces_chart() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let series = (
        vec![SalaryPoint {
            year: 2020,
            median: 500.0,
        }],
        vec![],
    );

    let clicked = store.dispatch(Action::VillageClicked(target()));
    let first = store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&clicked),
        target: target(),
        result: Ok(series.clone()),
    });
    assert!(!first.commands.contains(&LayerCommand::DestroyChart));
    assert!(first
        .commands
        .iter()
        .any(|c| matches!(c, LayerCommand::CreateChart(_))));

    let clicked = store.dispatch(Action::VillageClicked(target()));
    let second = store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&clicked),
        target: target(),
        result: Ok(series),
    });
    let destroy = second
        .commands
        .iter()
        .position(|c| *c == LayerCommand::DestroyChart)
        .expect("old chart destroyed");
    let create = second
        .commands
        .iter()
        .position(|c| matches!(c, LayerCommand::CreateChart(_)))
        .expect("new chart created");
    assert!(destroy < create);
    assert_eq!(store.state().panel.open, Some(target()));
}

#[test]
fn test_detail_not_found_message() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let clicked = store.dispatch(Action::VillageClicked(target()));
    let result = store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&clicked),
        target: target(),
        result: Err(not_found(ApiOp::VillageSalary)),
    });

    assert_eq!(
        alerts(&result),
        vec!["No data found for Hualien CountyHualien CityMinsheng"]
    );
    assert!(store.state().panel.open.is_none());
}

#[test]
fn test_only_latest_detail_response_applies() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let other = VillageTarget::new(HUALIEN, "Hualien City", "Guohua");

    let first = store.dispatch(Action::VillageClicked(target()));
    let second = store.dispatch(Action::VillageClicked(other.clone()));

    store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&second),
        target: other.clone(),
        result: Ok((vec![], vec![])),
    });
    let late = store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&first),
        target: target(),
        result: Ok((vec![], vec![])),
    });

    assert!(!late.state_changed);
    assert_eq!(store.state().panel.open, Some(other));
}

#[test]
fn test_close_panel() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let clicked = store.dispatch(Action::VillageClicked(target()));
    store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&clicked),
        target: target(),
        result: Ok((vec![], vec![])),
    });

    let result = store.dispatch(Action::ClosePanel);
    assert_eq!(
        result.commands,
        vec![LayerCommand::HidePanel, LayerCommand::DestroyChart]
    );
    let again = store.dispatch(Action::ClosePanel);
    assert!(again.commands.is_empty());
}

#[test]
fn test_loading_indicator_spans_concurrent_requests() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);

    let detail = store.dispatch(Action::VillageClicked(target()));
    assert!(detail.commands.contains(&LayerCommand::SetLoading(true)));
    let clinics_req = store.dispatch(Action::ToggleSpecialty {
        name: "Dentistry".to_string(),
        selected: true,
    });
    assert!(!clinics_req.commands.contains(&LayerCommand::SetLoading(true)));

    let first_done = store.dispatch(Action::ClinicsLoaded {
        request_id: request_id(&clinics_req),
        result: Ok(FeatureCollection::default()),
    });
    assert!(!first_done.commands.contains(&LayerCommand::SetLoading(false)));

    let last_done = store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&detail),
        target: target(),
        result: Err(transport(ApiOp::VillagePopulation)),
    });
    assert!(last_done.commands.contains(&LayerCommand::SetLoading(false)));
    assert_eq!(store.state().loading, 0);
}

#[test]
fn test_weight_moved_while_villages_load_recolors_on_entry() {
    let mut store = loaded_store();
    let start = Instant::now();
    let clicked = store.dispatch(Action::CountyClicked {
        county: HUALIEN.to_string(),
    });
    assert_eq!(requested_weights(&clicked).income_percent(), 50);

    store.dispatch(Action::SetWeight {
        slider: Slider::Income,
        percent: 80,
        now: start,
    });
    // The quiet period ends while still in county view, so nothing recolors yet.
    let quiet = store.dispatch(Action::Tick {
        now: start + Duration::from_millis(400),
    });
    assert!(quiet.effects.is_empty());

    let entered = store.dispatch(Action::VillagesLoaded {
        request_id: request_id(&clicked),
        county: HUALIEN.to_string(),
        weights: requested_weights(&clicked),
        result: Ok(villages(HUALIEN)),
    });
    assert_eq!(store.state().current_county(), Some(HUALIEN));
    let weights = recolor_weights(&entered).expect("recolor on entry");
    assert_eq!(weights.income_percent(), 80);
    let legends: Vec<u8> = entered
        .effects
        .iter()
        .filter_map(|e| match e {
            Effect::LoadLegend { weights, .. } => Some(weights.income_percent()),
            _ => None,
        })
        .collect();
    assert_eq!(legends, vec![80]);
}

#[test]
fn test_unchanged_weights_enter_without_recolor() {
    let mut store = loaded_store();
    let entered = enter_county(&mut store, HUALIEN);
    assert!(recolor_weights(&entered).is_none());
}

#[test]
fn test_weight_moved_while_switching_county_still_recolors() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let start = Instant::now();

    let clicked = store.dispatch(Action::CountyClicked {
        county: TAITUNG.to_string(),
    });
    store.dispatch(Action::SetWeight {
        slider: Slider::Income,
        percent: 80,
        now: start,
    });
    let entered = store.dispatch(Action::VillagesLoaded {
        request_id: request_id(&clicked),
        county: TAITUNG.to_string(),
        weights: requested_weights(&clicked),
        result: Ok(villages(TAITUNG)),
    });
    assert_eq!(store.state().current_county(), Some(TAITUNG));
    assert!(recolor_weights(&entered).is_none());
    assert!(store.state().weights.deadline().is_some());

    let fired = store.dispatch(Action::Tick {
        now: start + Duration::from_secs(5),
    });
    let Some(Effect::LoadVillageColors {
        county, weights, ..
    }) = fired.effects.first()
    else {
        panic!("expected LoadVillageColors, got {:?}", fired.effects);
    };
    assert_eq!(county, TAITUNG);
    assert_eq!(weights.income_percent(), 80);
}

#[test]
fn test_back_to_counties_cancels_pending_recolor() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let start = Instant::now();
    store.dispatch(Action::SetWeight {
        slider: Slider::Income,
        percent: 80,
        now: start,
    });
    store.dispatch(Action::BackToCounties);
    assert!(store.state().weights.deadline().is_none());
}

#[test]
fn test_population_failure_keeps_open_panel() {
    let mut store = loaded_store();
    enter_county(&mut store, HUALIEN);
    let other = VillageTarget::new(HUALIEN, "Hualien City", "Guohua");

    let clicked = store.dispatch(Action::VillageClicked(target()));
    store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&clicked),
        target: target(),
        result: Ok((
            vec![SalaryPoint {
                year: 2020,
                median: 500.0,
            }],
            vec![],
        )),
    });

    // Salary and population are joined, so a population error fails the pair.
    let clicked = store.dispatch(Action::VillageClicked(other.clone()));
    let result = store.dispatch(Action::VillageDetailLoaded {
        request_id: request_id(&clicked),
        target: other,
        result: Err(transport(ApiOp::VillagePopulation)),
    });

    assert_eq!(alerts(&result).len(), 1);
    assert!(!result.commands.iter().any(|c| matches!(
        c,
        LayerCommand::DestroyChart | LayerCommand::HidePanel | LayerCommand::ShowPanel(_)
    )));
    assert_eq!(store.state().panel.open, Some(target()));
    assert!(store.state().panel.chart_live);
}
