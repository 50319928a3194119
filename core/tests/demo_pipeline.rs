use chempath_core::{
    aggregate::summarize_batch,
    config::{DemoConfig, DeploymentMode, PlantProfile},
    demo::DemoPipeline,
    error::PipelineError,
    run_state::{RunState, RunStatus},
};
use chrono::{DateTime, TimeZone, Utc};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap()
}

fn ashwagandha(config: &DemoConfig) -> PlantProfile {
    config.plant("ashwagandha").unwrap().clone()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Same seed, same profile, same timestamp: byte-identical exports.
#[test]
fn same_seed_produces_identical_batches() {
    let config = DemoConfig::default_test();
    let plant = ashwagandha(&config);

    let mut state_a = RunState::new();
    let mut state_b = RunState::new();
    let a = DemoPipeline::new(&config, DeploymentMode::Standalone, 0xDEAD_BEEF)
        .run(&plant, ts(), &mut state_a)
        .unwrap();
    let b = DemoPipeline::new(&config, DeploymentMode::Standalone, 0xDEAD_BEEF)
        .run(&plant, ts(), &mut state_b)
        .unwrap();

    assert_eq!(a, b);
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
}

#[test]
fn different_seeds_produce_different_batches() {
    let config = DemoConfig::default_test();
    let plant = ashwagandha(&config);

    let a = DemoPipeline::new(&config, DeploymentMode::Standalone, 42)
        .run(&plant, ts(), &mut RunState::new())
        .unwrap();
    let b = DemoPipeline::new(&config, DeploymentMode::Standalone, 99)
        .run(&plant, ts(), &mut RunState::new())
        .unwrap();

    assert_ne!(a, b, "Different seeds produced identical batches; seed is not being used");
}

#[test]
fn batch_covers_every_profile_compound_in_order() {
    let config = DemoConfig::default_test();
    let plant = ashwagandha(&config);
    let batch = DemoPipeline::new(&config, DeploymentMode::Standalone, 7)
        .run(&plant, ts(), &mut RunState::new())
        .unwrap();

    let names: Vec<&str> = batch.compounds().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Withanoside IV", "Withanoside VI", "Withanolide D"]);
    assert_eq!(batch.plant_name(), "Ashwagandha (Withania somnifera)");
    assert_eq!(batch.timestamp(), ts());
    assert_eq!(batch.performance_metrics()["speed_improvement"], "54.3%");

    for c in batch.compounds() {
        assert!(config.parameters.solvents.contains(&c.optimal_solvent));
        assert!(!c.enhancers.is_empty());
        assert!(c.enhancers.len() <= config.parameters.max_enhancers);
    }
}

#[test]
fn compensation_follows_contribution_value() {
    let config = DemoConfig::default_test();
    let plant = ashwagandha(&config);
    let batch = DemoPipeline::new(&config, DeploymentMode::Standalone, 7)
        .run(&plant, ts(), &mut RunState::new())
        .unwrap();

    // 0.92*0.4 + 0.4*0.2 + 0.9*0.2 + 0.9*0.2 = 0.808 → 8080.00
    let first = batch.compounds()[0].compensation.as_ref().unwrap();
    assert!((first.amount - 8080.0).abs() < 1e-6, "amount was {}", first.amount);
    assert_eq!(first.record_id, "COMP-20260504-0001");

    let third = batch.compounds()[2].compensation.as_ref().unwrap();
    assert_eq!(third.record_id, "COMP-20260504-0003");

    let summary = summarize_batch(&batch).unwrap();
    assert!((summary.total_compensation - batch.total_compensation()).abs() < 1e-9);
}

#[test]
fn disabled_compensation_yields_zero_total() {
    let mut config = DemoConfig::default_test();
    config.parameters.compensation.enabled = false;
    let plant = ashwagandha(&config);
    let batch = DemoPipeline::new(&config, DeploymentMode::Bundle, 3)
        .run(&plant, ts(), &mut RunState::new())
        .unwrap();

    assert!(batch.compounds().iter().all(|c| c.compensation.is_none()));
    assert_eq!(batch.total_compensation(), 0.0);
    assert_eq!(batch.performance_metrics()["speed_improvement"], "58.7%");
}

#[test]
fn run_state_ends_completed_with_result() {
    let config = DemoConfig::default_test();
    let plant = ashwagandha(&config);
    let mut state = RunState::new();
    let batch = DemoPipeline::new(&config, DeploymentMode::Standalone, 11)
        .run(&plant, ts(), &mut state)
        .unwrap();

    assert_eq!(state.status, RunStatus::Completed);
    assert_eq!(state.progress, 100);
    assert_eq!(state.result(), Some(&batch));
    assert!(state.error.is_none());
}

#[test]
fn plant_without_compounds_fails_and_exposes_no_result() {
    let config = DemoConfig::default_test();
    let mut plant = ashwagandha(&config);
    plant.compounds.clear();

    let mut state = RunState::new();
    let err = DemoPipeline::new(&config, DeploymentMode::Standalone, 1)
        .run(&plant, ts(), &mut state)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Validation(_)));
    assert_eq!(state.status, RunStatus::Failed);
    assert!(state.result().is_none());
    assert!(state.error.is_some());
}

#[test]
fn run_refuses_a_state_that_is_already_running() {
    let config = DemoConfig::default_test();
    let plant = ashwagandha(&config);
    let mut state = RunState::new();
    state.start("someone else's run").unwrap();

    let err = DemoPipeline::new(&config, DeploymentMode::Standalone, 1)
        .run(&plant, ts(), &mut state)
        .unwrap_err();
    assert!(matches!(err, PipelineError::RunAlreadyActive));
    assert!(state.is_running());
}

#[test]
fn bundled_data_dir_loads() {
    let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
    let config = DemoConfig::load(data_dir).unwrap();
    assert!(config.plant("ashwagandha").is_some());
    assert!(config.plant("turmeric").is_some());
    assert_eq!(config.deployment_modes.len(), 3);

    let plant = config.plant("turmeric").unwrap();
    let batch = DemoPipeline::new(&config, DeploymentMode::Ecosystem, 5)
        .run(plant, ts(), &mut RunState::new())
        .unwrap();
    assert_eq!(batch.performance_metrics()["processing_capacity"], "78,000 optimizations/hour");
}
