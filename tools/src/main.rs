//! chempath-runner: headless runner for the compound results pipeline.
//!
//! Usage:
//!   chempath-runner --plant ashwagandha --seed 12345 --mode standalone
//!   chempath-runner --plant turmeric --sort bioavailability --pathway hybrid
//!   chempath-runner --format json --db runs.db
//!   chempath-runner --ipc-mode
//!
//! Numbers produced by the demo pipeline are illustrative, not measured.

use anyhow::{Context, Result};
use chempath_core::{
    aggregate::{
        chart_series, filter_by_pathway_name, pathway_distribution, scatter_series, sort,
        summarize_batch,
    },
    config::{DemoConfig, DeploymentMode},
    demo::DemoPipeline,
    export::{export_json_string, export_report, export_structured},
    model::CompoundResult,
    run_state::RunState,
    store::ResultStore,
    types::format_score,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Run {
        plant: String,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        mode: Option<String>,
    },
    Status,
    Summary,
    Sort {
        key: String,
    },
    Filter {
        #[serde(default)]
        pathway: Option<String>,
    },
    Chart {
        metric: String,
    },
    Scatter {
        x: String,
        y: String,
    },
    Distribution,
    Export,
    Report,
    Quit,
}

struct RunnerArgs {
    seed:     u64,
    mode:     DeploymentMode,
    plant:    String,
    data_dir: String,
    db:       Option<String>,
    sort_key: String,
    pathway:  Option<String>,
    format:   String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let runner = RunnerArgs {
        seed:     parse_arg(&args, "--seed", 42u64),
        mode:     string_arg(&args, "--mode")
            .as_deref()
            .map_or(DeploymentMode::Standalone, DeploymentMode::parse_or_default),
        plant:    string_arg(&args, "--plant").unwrap_or_else(|| "ashwagandha".into()),
        data_dir: string_arg(&args, "--data-dir").unwrap_or_else(|| "./data".into()),
        db:       string_arg(&args, "--db"),
        sort_key: string_arg(&args, "--sort").unwrap_or_else(|| "default".into()),
        pathway:  string_arg(&args, "--pathway"),
        format:   string_arg(&args, "--format").unwrap_or_else(|| "report".into()),
    };

    let config = DemoConfig::load(&runner.data_dir)?;

    if ipc_mode {
        return run_ipc_loop(&config, runner.seed, runner.mode);
    }

    let plant = config
        .plant(&runner.plant)
        .with_context(|| format!("Unknown plant '{}' in {}", runner.plant, runner.data_dir))?;

    let mut state = RunState::new();
    let batch = DemoPipeline::new(&config, runner.mode, runner.seed).run(
        plant,
        chrono::Utc::now(),
        &mut state,
    )?;

    if let Some(db) = &runner.db {
        let store = ResultStore::open(db)?;
        store.migrate()?;
        let run_id = format!("run-{}-{}", runner.seed, batch.timestamp().timestamp());
        store.insert_run(&run_id, runner.seed, runner.mode.as_str(), env!("CARGO_PKG_VERSION"))?;
        store.save_batch(&run_id, &batch)?;
        log::info!("archived {run_id} in {db}");
    }

    match runner.format.as_str() {
        "json" => println!("{}", export_json_string(&batch)?),
        other => {
            if other != "report" {
                log::warn!("Unknown format '{other}', printing report");
            }
            print!("{}", export_report(&batch)?);
            let view = sort(
                &filter_by_pathway_name(batch.compounds(), runner.pathway.as_deref())?,
                &runner.sort_key,
            )?;
            print_view(&runner, &view);
        }
    }
    Ok(())
}

fn print_view(runner: &RunnerArgs, view: &[CompoundResult]) {
    println!();
    println!(
        "=== VIEW (sort: {}, pathway: {}) ===",
        runner.sort_key,
        runner.pathway.as_deref().unwrap_or("all")
    );
    if view.is_empty() {
        println!("  (no compounds match)");
    }
    for c in view {
        println!(
            "  {:<24} bioav {:>5.1}% | conf {:>3}% | qsar {:>5.2} | {} | preservation {}",
            c.name,
            c.bioavailability_percent,
            c.development_confidence_percent,
            c.qsar_score,
            c.synthesis_pathway,
            format_score(c.cultural_preservation_score),
        );
    }
}

fn run_ipc_loop(config: &DemoConfig, default_seed: u64, default_mode: DeploymentMode) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut state = RunState::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "{}", serde_json::json!({ "error": e.to_string() }))?;
                stdout.flush()?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        let reply = match handle_command(config, &mut state, cmd, default_seed, default_mode) {
            Ok(value) => value,
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    config: &DemoConfig,
    state: &mut RunState,
    cmd: IpcCommand,
    default_seed: u64,
    default_mode: DeploymentMode,
) -> Result<serde_json::Value> {
    if let IpcCommand::Run { plant, seed, mode } = &cmd {
        let profile = config
            .plant(plant)
            .with_context(|| format!("Unknown plant '{plant}'"))?;
        let mode = mode.as_deref().map_or(default_mode, DeploymentMode::parse_or_default);
        DemoPipeline::new(config, mode, seed.unwrap_or(default_seed)).run(
            profile,
            chrono::Utc::now(),
            state,
        )?;
        return Ok(serde_json::json!({ "status": "completed" }));
    }
    if let IpcCommand::Status = cmd {
        return Ok(serde_json::json!({
            "status": state.status,
            "progress": state.progress,
            "current_step": state.current_step,
            "error": state.error,
        }));
    }

    let batch = state
        .result()
        .context("No completed run; send a run command first")?;
    let compounds = batch.compounds();
    let value = match cmd {
        IpcCommand::Summary => serde_json::to_value(summarize_batch(batch)?)?,
        IpcCommand::Sort { key } => serde_json::to_value(sort(compounds, &key)?)?,
        IpcCommand::Filter { pathway } => {
            serde_json::to_value(filter_by_pathway_name(compounds, pathway.as_deref())?)?
        }
        IpcCommand::Chart { metric } => serde_json::to_value(chart_series(compounds, &metric)?)?,
        IpcCommand::Scatter { x, y } => serde_json::to_value(scatter_series(compounds, &x, &y)?)?,
        IpcCommand::Distribution => serde_json::to_value(pathway_distribution(compounds))?,
        IpcCommand::Export => export_structured(batch)?,
        IpcCommand::Report => serde_json::json!({ "report": export_report(batch)? }),
        IpcCommand::Run { .. } | IpcCommand::Status | IpcCommand::Quit => {
            serde_json::json!({ "error": "unexpected command" })
        }
    };
    Ok(value)
}

fn string_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
