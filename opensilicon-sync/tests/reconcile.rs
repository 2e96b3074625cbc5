//! End-to-end reconciliation scenarios.

use std::collections::BTreeMap;

use opensilicon_core::{DeviceKind, Geometry, NetlistDevice, ParamValue, Technology};
use opensilicon_extract::{extract, CancelToken, ExtractionOptions};
use opensilicon_sync::{
    back_annotate, build_back_annotations, reconcile, reconcile_with_lvs, LvsDeviceMatch,
    LvsMatchStatus, LvsParamCheck, LvsResult, SchematicDevice, SyncActionKind, SyncOptions,
    SyncStatus, PARASITIC_C_KEY, PARASITIC_R_KEY,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn layout_device(name: &str, kind: DeviceKind, w: f64, l: f64) -> NetlistDevice {
    let mut terminals = BTreeMap::new();
    for (i, t) in ["drain", "gate", "source"].iter().enumerate() {
        terminals.insert(t.to_string(), format!("{}_n{}", name, i));
    }
    let body = if kind == DeviceKind::Pmos { "VDD" } else { "GND" };
    terminals.insert("body".to_string(), body.to_string());
    NetlistDevice {
        name: name.to_string(),
        kind,
        model: kind.to_string(),
        terminals,
        params: [("w".to_string(), w), ("l".to_string(), l)].into_iter().collect(),
        source_geometry: vec![0, 1],
    }
}

fn schematic() -> Vec<SchematicDevice> {
    vec![
        SchematicDevice::new("M0", DeviceKind::Nmos)
            .with_param("w", 0.42)
            .with_param("l", 0.15)
            .with_pin("D", "out")
            .with_pin("G", "in")
            .with_pin("S", "GND")
            .with_pin("B", "GND"),
        SchematicDevice::new("M1", DeviceKind::Pmos)
            .with_param("w", 0.84)
            .with_param("l", 0.15),
        SchematicDevice::new("R0", DeviceKind::Resistor),
    ]
}

fn layout() -> Vec<NetlistDevice> {
    vec![
        layout_device("M0", DeviceKind::Nmos, 0.42, 0.15),
        layout_device("M1", DeviceKind::Pmos, 0.80, 0.15),
        layout_device("M2", DeviceKind::Nmos, 0.42, 0.15),
    ]
}

#[test]
fn test_end_to_end_reconciliation() {
    init_logging();
    let report = reconcile(&schematic(), &layout(), &SyncOptions::default());

    assert_eq!(report.mappings.len(), 4);
    assert_eq!(report.mapping("M0").unwrap().status(), SyncStatus::Synced);
    assert_eq!(report.mapping("R0").unwrap().status(), SyncStatus::MissingLayout);
    assert_eq!(report.mapping("M2").unwrap().status(), SyncStatus::MissingSchematic);

    let m1 = report.mapping("M1").unwrap();
    assert_eq!(m1.status(), SyncStatus::ParamMismatch);
    assert_eq!(m1.deltas.len(), 1);
    assert_eq!(m1.deltas[0].name, "w");
    assert!((m1.deltas[0].percent_diff.unwrap() - 4.76).abs() < 1e-9);

    let s = &report.summary;
    assert_eq!(s.synced, 1);
    assert_eq!(s.param_mismatches, 1);
    assert_eq!(s.missing_in_layout, 1);
    assert_eq!(s.missing_in_schematic, 1);
    assert_eq!(s.net_mismatches, 0);
    assert_eq!(s.bucket_total(), report.mappings.len());

    let kinds: Vec<_> = report.actions.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            SyncActionKind::CreateLayoutDevice,
            SyncActionKind::CreateSchematicSymbol,
            SyncActionKind::UpdateLayoutParams,
            SyncActionKind::UpdateSchematicParams,
        ]
    );
    assert!(report.actions.windows(2).all(|w| w[0].priority <= w[1].priority));
}

#[test]
fn test_report_serializes_for_ui() {
    let report = reconcile(&schematic(), &layout(), &SyncOptions::default());
    let json = report.to_json().unwrap();
    assert!(json.contains("\"param-mismatch\""));
    assert!(json.contains("\"create-layout-device\""));
    assert!(json.contains("\"missingInLayout\": 1"));
}

#[test]
fn test_lvs_refinement_is_authoritative() {
    init_logging();
    let lvs = LvsResult {
        matches: vec![LvsDeviceMatch {
            schematic_device: "M1".into(),
            layout_device: "M1".into(),
            status: LvsMatchStatus::Match,
            layout_geometry: vec![10, 11],
            parameters: vec![LvsParamCheck {
                name: "w".into(),
                schematic_value: Some(0.84.into()),
                layout_value: Some(0.80.into()),
                within_tolerance: true,
            }],
        }],
    };
    let report = reconcile_with_lvs(&schematic(), &layout(), &lvs, &SyncOptions::default());
    let m1 = report.mapping("M1").unwrap();
    assert_eq!(m1.status(), SyncStatus::Synced);
    assert_eq!(m1.layout_geometry, vec![10, 11]);
    assert_eq!(report.summary.synced, 2);
    assert_eq!(report.summary.param_mismatches, 0);
    assert!(report
        .actions
        .iter()
        .all(|a| a.kind != SyncActionKind::UpdateLayoutParams));
}

#[test]
fn test_extract_then_back_annotate() {
    init_logging();
    let geometries = vec![
        Geometry::rect("diff", 0.0, 0.0, 1.0, 0.8),
        Geometry::rect("poly", 0.4, -0.2, 0.55, 1.0),
    ];
    let netlist = extract(
        &geometries,
        &Technology::sky130(),
        &ExtractionOptions::default(),
        &CancelToken::new(),
    )
    .unwrap();

    let schematic = vec![SchematicDevice::new("m0", DeviceKind::Nmos)
        .with_param("w", 0.84)
        .with_param("l", 0.15)];
    let before = schematic.clone();

    let annotations = build_back_annotations(&netlist);
    assert_eq!(annotations.len(), 1);

    let updates = back_annotate(&annotations, &schematic);
    let params = updates.get(&schematic[0].id).unwrap();
    match params["w"] {
        ParamValue::Number(w) => assert!((w - 0.8).abs() < 1e-10),
        ref other => panic!("unexpected w {:?}", other),
    }
    match params["l"] {
        ParamValue::Number(l) => assert!((l - 0.15).abs() < 1e-10),
        ref other => panic!("unexpected l {:?}", other),
    }
    assert!(params.contains_key(PARASITIC_R_KEY));
    assert!(params.contains_key(PARASITIC_C_KEY));
    assert_eq!(params.len(), 4);
    assert_eq!(schematic, before);
}
