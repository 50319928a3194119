use chempath_core::{
    config::{DemoConfig, DeploymentMode},
    demo::DemoPipeline,
    error::PipelineError,
    export::{export_json_string, export_report, export_structured, import_structured},
    model::{Compensation, CompoundRecord, CompoundResult, SimulationBatch, SynthesisPathway},
    run_state::RunState,
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::BTreeMap;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn batch() -> SimulationBatch {
    let a = CompoundResult::new(CompoundRecord {
        name:                               "Withanoside IV".to_string(),
        qsar_score:                         9.87,
        binding_affinity:                   7.42,
        bioavailability_percent:            62.4,
        bioavailability_improvement_factor: 289.9,
        development_confidence_percent:     87,
        safety_enhancement:                 -1.25,
        synthesis_pathway:                  SynthesisPathway::Traditional,
        optimal_solvent:                    "ghee".to_string(),
        enhancers:                          vec!["piperine".to_string(), "honey".to_string()],
        sustainability_score:               8.9,
        cultural_preservation_score:        9.35,
        compensation:                       Some(Compensation {
            amount:    8760.0,
            record_id: "COMP-20260504-0001".to_string(),
        }),
    })
    .unwrap();
    let b = CompoundResult::new(CompoundRecord {
        name:                               "Withanolide D".to_string(),
        qsar_score:                         8.1,
        binding_affinity:                   6.93,
        bioavailability_percent:            48.0,
        bioavailability_improvement_factor: 0.1 + 0.2,
        development_confidence_percent:     74,
        safety_enhancement:                 12.0,
        synthesis_pathway:                  SynthesisPathway::Hybrid,
        optimal_solvent:                    "sesame_oil".to_string(),
        enhancers:                          vec![],
        sustainability_score:               7.0,
        cultural_preservation_score:        7.5,
        compensation:                       None,
    })
    .unwrap();
    SimulationBatch::new(
        "Ashwagandha (Withania somnifera)",
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 15).unwrap(),
        vec![a, b],
        BTreeMap::from([
            ("speed_improvement".to_string(), "54.3%".to_string()),
            ("accuracy_enhancement".to_string(), "42.8%".to_string()),
        ]),
    )
    .unwrap()
}

// ── Structured export ────────────────────────────────────────────────────────

#[test]
fn structured_export_round_trips() {
    let original = batch();
    let value = export_structured(&original).unwrap();
    let rebuilt = import_structured(value).unwrap();
    assert_eq!(rebuilt, original);
}

#[test]
fn structured_export_round_trips_through_text() {
    let original = batch();
    let text = export_json_string(&original).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(import_structured(value).unwrap(), original);
}

#[test]
fn structured_export_uses_stable_keys() {
    let value = export_structured(&batch()).unwrap();

    let top: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    for key in ["plant_name", "timestamp", "compounds", "performance_metrics", "total_compensation"] {
        assert!(top.contains(&key), "missing top-level key {key}");
    }

    let c = &value["compounds"][0];
    for key in [
        "name",
        "qsar_score",
        "binding_affinity",
        "bioavailability_percent",
        "bioavailability_improvement_factor",
        "development_confidence_percent",
        "safety_enhancement",
        "synthesis_pathway",
        "optimal_solvent",
        "enhancers",
        "sustainability_score",
        "cultural_preservation_score",
        "compensation",
    ] {
        assert!(c.get(key).is_some(), "missing compound key {key}");
    }
    assert_eq!(c["synthesis_pathway"], "traditional");
    assert_eq!(c["compensation"]["amount"], 8760.0);
    assert_eq!(c["compensation"]["record_id"], "COMP-20260504-0001");
    assert!(value["compounds"][1]["compensation"].is_null());
    assert_eq!(value["total_compensation"], 8760.0);
    assert_eq!(value["performance_metrics"]["speed_improvement"], "54.3%");
}

#[test]
fn import_rejects_unknown_pathway_as_validation_error() {
    let mut value = export_structured(&batch()).unwrap();
    value["compounds"][0]["synthesis_pathway"] = json!("alchemical");
    assert!(matches!(import_structured(value), Err(PipelineError::Validation(_))));
}

#[test]
fn import_rejects_out_of_range_values() {
    let mut value = export_structured(&batch()).unwrap();
    value["compounds"][1]["bioavailability_percent"] = json!(150.0);
    assert!(matches!(import_structured(value), Err(PipelineError::Validation(_))));
}

#[test]
fn import_rejects_out_of_range_confidence_as_validation_error() {
    for bad in [json!(300), json!(101), json!(-5)] {
        let mut value = export_structured(&batch()).unwrap();
        value["compounds"][0]["development_confidence_percent"] = bad.clone();
        assert!(
            matches!(import_structured(value), Err(PipelineError::Validation(_))),
            "confidence {bad} was not rejected as a validation error"
        );
    }
}

#[test]
fn import_rejects_tampered_total() {
    let mut value = export_structured(&batch()).unwrap();
    value["total_compensation"] = json!(9999.0);
    assert!(matches!(import_structured(value), Err(PipelineError::Validation(_))));
}

#[test]
fn import_rejects_empty_compound_list() {
    let mut value = export_structured(&batch()).unwrap();
    value["compounds"] = json!([]);
    value["total_compensation"] = json!(0.0);
    assert!(matches!(import_structured(value), Err(PipelineError::Validation(_))));
}

#[test]
fn import_rejects_structurally_broken_input() {
    let value = json!({ "plant_name": "X" });
    assert!(matches!(import_structured(value), Err(PipelineError::Serialization(_))));
}

#[test]
fn demo_batch_round_trips() {
    let config = DemoConfig::default_test();
    let plant = config.plant("ashwagandha").unwrap();
    let mut state = RunState::new();
    let original = DemoPipeline::new(&config, DeploymentMode::Standalone, 2024)
        .run(plant, Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(), &mut state)
        .unwrap();
    let rebuilt = import_structured(export_structured(&original).unwrap()).unwrap();
    assert_eq!(rebuilt, original);
}

// ── Text report ──────────────────────────────────────────────────────────────

#[test]
fn report_sections_appear_in_fixed_order() {
    let report = export_report(&batch()).unwrap();
    let positions: Vec<usize> = [
        "Plant:     Ashwagandha (Withania somnifera)",
        "Timestamp: 2026-05-04 09:30:15 UTC",
        "METRICS",
        "COMPOUNDS",
        "COMPENSATION",
        "FINDINGS",
    ]
    .iter()
    .map(|needle| report.find(needle).unwrap_or_else(|| panic!("missing {needle:?}")))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "sections out of order: {positions:?}");
}

#[test]
fn report_findings_are_derived_from_data() {
    let report = export_report(&batch()).unwrap();
    let findings = &report[report.find("FINDINGS").unwrap()..];
    assert!(findings.contains("average bioavailability 55.20% across 2 compounds"));
    assert!(findings.contains("up to 289.9x"));
    assert!(findings.contains("highest development confidence: Withanoside IV"));
    assert!(findings.contains("1 traditional, 1 hybrid"));
    assert!(findings.contains("1 of 2 compounds carry compensation records totalling 8760.00"));
}

#[test]
fn report_lists_each_compound_and_the_total() {
    let report = export_report(&batch()).unwrap();
    let table = &report[report.find("COMPOUNDS").unwrap()..report.find("COMPENSATION").unwrap()];
    assert!(table.contains("Withanoside IV"));
    assert!(table.contains("Withanolide D"));
    assert!(table.contains("enhancers: piperine, honey"));
    assert!(table.contains("enhancers: none"));

    let comp = &report[report.find("COMPENSATION").unwrap()..report.find("FINDINGS").unwrap()];
    assert!(comp.contains("COMP-20260504-0001"));
    assert!(comp.contains("TOTAL"));
    assert!(comp.contains("8760.00"));
}

#[test]
fn report_formatting_errors_surface_as_pipeline_errors() {
    let err: PipelineError = std::fmt::Error.into();
    assert!(matches!(err, PipelineError::Format(_)));
    assert!(export_report(&batch()).is_ok());
}

#[test]
fn report_is_stable() {
    let b = batch();
    assert_eq!(export_report(&b).unwrap(), export_report(&b).unwrap());
}
