//! Export payloads: the structured mapping and the plain-text report.
//!
//! STRUCTURED: keys match the model field names exactly. Importing an export
//! re-runs every model validation, so `import_structured(export_structured(b))`
//! is equal to `b`.
//!
//! REPORT LAYOUT (fixed order):
//!   1. Header: plant name, timestamp
//!   2. Metrics: performance metrics, then summary statistics
//!   3. Compounds: one table row per compound, batch order
//!   4. Compensation: one line per record, then the total
//!   5. Findings: statements derived from the data only

use crate::{
    aggregate::{pathway_distribution, summarize_batch, Summary},
    error::PipelineResult,
    model::{RawBatch, SimulationBatch},
    types::format_score,
};
use serde_json::Value;
use std::fmt::Write;

pub fn export_structured(batch: &SimulationBatch) -> PipelineResult<Value> {
    Ok(serde_json::to_value(batch)?)
}

pub fn import_structured(value: Value) -> PipelineResult<SimulationBatch> {
    let raw: RawBatch = serde_json::from_value(value)?;
    Ok(SimulationBatch::try_from(raw)?)
}

pub fn export_json_string(batch: &SimulationBatch) -> PipelineResult<String> {
    Ok(serde_json::to_string_pretty(batch)?)
}

const RULE_WIDTH: usize = 78;

pub fn export_report(batch: &SimulationBatch) -> PipelineResult<String> {
    let summary = summarize_batch(batch)?;
    let mut out = String::new();
    write_report(&mut out, batch, &summary)?;
    Ok(out)
}

fn write_report(out: &mut String, batch: &SimulationBatch, summary: &Summary) -> std::fmt::Result {
    // ── Header ──
    writeln!(out, "COMPOUND OPTIMIZATION REPORT")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Plant:     {}", batch.plant_name())?;
    writeln!(out, "Timestamp: {}", batch.timestamp().format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out)?;

    // ── Metrics ──
    section(out, "METRICS")?;
    if batch.performance_metrics().is_empty() {
        writeln!(out, "(no performance metrics recorded)")?;
    }
    for (name, value) in batch.performance_metrics() {
        writeln!(out, "{:<32} {}", name, value)?;
    }
    writeln!(out, "{:<32} {}", "compound_count", summary.compound_count)?;
    writeln!(out, "{:<32} {:.2}%", "average_bioavailability", summary.average_bioavailability)?;
    writeln!(
        out,
        "{:<32} {}",
        "average_cultural_preservation",
        format_score(summary.average_cultural_preservation)
    )?;
    writeln!(out, "{:<32} {:.1}x", "average_improvement_factor", summary.average_improvement_factor)?;
    writeln!(out, "{:<32} {:.1}%", "average_confidence", summary.average_confidence)?;
    writeln!(out)?;

    // ── Compounds ──
    section(out, "COMPOUNDS")?;
    writeln!(
        out,
        "{:<24} {:>6} {:>7} {:>8} {:>9} {:>5} {:>8}  {:<11} {:<12}",
        "name", "qsar", "bind", "bioav%", "improve", "conf", "safety", "pathway", "solvent"
    )?;
    for c in batch.compounds() {
        writeln!(
            out,
            "{:<24} {:>6.2} {:>7.2} {:>8.1} {:>8.1}x {:>5} {:>+8.2}  {:<11} {:<12}",
            c.name,
            c.qsar_score,
            c.binding_affinity,
            c.bioavailability_percent,
            c.bioavailability_improvement_factor,
            c.development_confidence_percent,
            c.safety_enhancement,
            c.synthesis_pathway.as_str(),
            c.optimal_solvent,
        )?;
        writeln!(
            out,
            "    sustainability {}  cultural preservation {}  enhancers: {}",
            format_score(c.sustainability_score),
            format_score(c.cultural_preservation_score),
            if c.enhancers.is_empty() { "none".to_string() } else { c.enhancers.join(", ") },
        )?;
    }
    writeln!(out)?;

    // ── Compensation ──
    section(out, "COMPENSATION")?;
    let mut any = false;
    for c in batch.compounds() {
        if let Some(comp) = &c.compensation {
            any = true;
            writeln!(out, "{:<24} {:<24} {:>14.2}", c.name, comp.record_id, comp.amount)?;
        }
    }
    if !any {
        writeln!(out, "(no compensation records)")?;
    }
    writeln!(out, "{:<49} {:>14.2}", "TOTAL", batch.total_compensation())?;
    writeln!(out)?;

    // ── Findings ──
    section(out, "FINDINGS")?;
    writeln!(
        out,
        "- average bioavailability {:.2}% across {} compounds",
        summary.average_bioavailability, summary.compound_count
    )?;
    writeln!(
        out,
        "- bioavailability improvement factor ranges up to {:.1}x (mean {:.1}x)",
        summary.max_improvement_factor, summary.average_improvement_factor
    )?;
    writeln!(
        out,
        "- highest development confidence: {} (mean {:.1}%)",
        summary.lead_compound, summary.average_confidence
    )?;
    let pathways: Vec<String> = pathway_distribution(batch.compounds())
        .into_iter()
        .filter(|p| p.value > 0.0)
        .map(|p| format!("{} {}", p.value as usize, p.label))
        .collect();
    writeln!(out, "- synthesis pathways: {}", pathways.join(", "))?;
    let compensated = batch.compounds().iter().filter(|c| c.compensation.is_some()).count();
    writeln!(
        out,
        "- {} of {} compounds carry compensation records totalling {:.2}",
        compensated, summary.compound_count, batch.total_compensation()
    )?;
    Ok(())
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.len()))
}
