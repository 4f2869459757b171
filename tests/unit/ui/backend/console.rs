use super::*;
use crate::kernel::detail::build_panel;
use crate::kernel::{Marker, MarkerRegistry};
use crate::models::{LatLng, SalaryPoint, VillageTarget};

fn render(commands: Vec<LayerCommand>) -> String {
    let mut backend = ConsoleBackend::new(Vec::new());
    backend.apply_all(commands);
    String::from_utf8(backend.into_inner()).unwrap()
}

#[test]
fn test_labels_are_summarized() {
    let mut registry = MarkerRegistry::new();
    let commands = (0..3)
        .map(|i| registry.add(Marker::village_label(&format!("v{i}"), LatLng::new(23.0, 121.0))))
        .collect();
    assert_eq!(render(commands), "map: 3 labels\n");
}

#[test]
fn test_alert_and_sliders() {
    let out = render(vec![
        LayerCommand::SetSliders {
            income: 70,
            density: 30,
        },
        LayerCommand::Alert("Failed to load counties".to_string()),
    ]);
    assert_eq!(
        out,
        "weights: income 70% density 30%\n! Failed to load counties\n"
    );
}

#[test]
fn test_panel_and_chart_text() {
    let target = VillageTarget::new("花蓮縣", "花蓮市", "民生里");
    let panel = build_panel(
        target,
        &[SalaryPoint {
            year: 2020,
            median: 1234.0,
        }],
        &[],
    );
    let chart = panel.chart.clone();
    let out = render(vec![
        LayerCommand::ShowPanel(panel),
        LayerCommand::CreateChart(chart),
    ]);

    assert!(out.starts_with("== 花蓮縣花蓮市民生里 salary and population =="));
    assert!(out.contains("1,234"));
    assert!(out.contains("population: no data"));
    assert!(out.contains("years:      2020"));
    assert!(!out.contains("population: 1"));
}

#[test]
fn test_clinic_badges_are_not_counted_as_labels() {
    let mut registry = MarkerRegistry::new();
    let position = LatLng::new(23.97, 121.6);
    let badge = Marker {
        group: MarkerGroup::ClinicBadge,
        position,
        text: "3".to_string(),
        size: (12, 12),
        anchor: (-6, 18),
        popup: None,
    };
    let commands = vec![
        registry.add(Marker::county_label("花蓮縣", position)),
        registry.add(badge),
    ];
    assert_eq!(render(commands), "map: 1 labels\n");
}
