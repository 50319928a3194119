//! Presentation aggregator: summary statistics, ordered and filtered views,
//! and chart-ready series over a batch's compounds.
//!
//! Every function here borrows its input and allocates a new output.
//! Nothing here mutates a batch.

use crate::{
    error::{PipelineError, PipelineResult},
    model::{compensation_total, CompoundResult, SimulationBatch, SynthesisPathway},
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, str::FromStr};

// ── Summary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub average_bioavailability:       f64,
    pub average_cultural_preservation: f64,
    pub total_compensation:            f64,
    pub compound_count:                usize,
    pub average_improvement_factor:    f64,
    pub max_improvement_factor:        f64,
    pub average_confidence:            f64,
    pub average_safety_enhancement:    f64,
    /// Highest development confidence; the earliest compound wins ties.
    pub lead_compound:                 String,
}

/// Summary statistics over a compound sequence.
pub fn summarize(compounds: &[CompoundResult]) -> PipelineResult<Summary> {
    let Some(first) = compounds.first() else {
        return Err(PipelineError::EmptyBatch);
    };

    let mut lead = first;
    for c in &compounds[1..] {
        if c.development_confidence_percent > lead.development_confidence_percent {
            lead = c;
        }
    }

    Ok(Summary {
        average_bioavailability:       mean(compounds, |c| c.bioavailability_percent),
        average_cultural_preservation: mean(compounds, |c| c.cultural_preservation_score),
        total_compensation:            compensation_total(compounds),
        compound_count:                compounds.len(),
        average_improvement_factor:    mean(compounds, |c| c.bioavailability_improvement_factor),
        max_improvement_factor:        compounds
            .iter()
            .map(|c| c.bioavailability_improvement_factor)
            .fold(f64::NEG_INFINITY, f64::max),
        average_confidence:            mean(compounds, |c| f64::from(c.development_confidence_percent)),
        average_safety_enhancement:    mean(compounds, |c| c.safety_enhancement),
        lead_compound:                 lead.name.clone(),
    })
}

fn mean(compounds: &[CompoundResult], field: impl Fn(&CompoundResult) -> f64) -> f64 {
    compounds.iter().map(field).sum::<f64>() / compounds.len() as f64
}

pub fn summarize_batch(batch: &SimulationBatch) -> PipelineResult<Summary> {
    summarize(batch.compounds())
}

// ── Sorting ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Bioavailability,
    Confidence,
    Qsar,
    /// Original batch order.
    Default,
}

impl FromStr for SortKey {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bioavailability" => Ok(Self::Bioavailability),
            "confidence"      => Ok(Self::Confidence),
            "qsar"            => Ok(Self::Qsar),
            "default"         => Ok(Self::Default),
            other => Err(PipelineError::InvalidSortKey { key: other.to_string() }),
        }
    }
}

/// Sort by a key name. Unknown names are an error, never a silent default.
pub fn sort(compounds: &[CompoundResult], key: &str) -> PipelineResult<Vec<CompoundResult>> {
    let key: SortKey = key.parse()?;
    Ok(sort_by_key(compounds, key))
}

/// Descending for every metric key, stable on ties. `Default` returns a
/// copy of the input order.
pub fn sort_by_key(compounds: &[CompoundResult], key: SortKey) -> Vec<CompoundResult> {
    let mut out = compounds.to_vec();
    match key {
        SortKey::Default => {}
        SortKey::Bioavailability => {
            out.sort_by(|a, b| descending(a.bioavailability_percent, b.bioavailability_percent))
        }
        SortKey::Confidence => {
            out.sort_by(|a, b| b.development_confidence_percent.cmp(&a.development_confidence_percent))
        }
        SortKey::Qsar => out.sort_by(|a, b| descending(a.qsar_score, b.qsar_score)),
    }
    out
}

// Numeric equality, so -0.0 and 0.0 tie. NaN never reaches a CompoundResult.
fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

// ── Filtering ────────────────────────────────────────────────────────────────

/// Compounds on the given pathway, in their original relative order.
/// `None` returns every compound.
pub fn filter_by_pathway(
    compounds: &[CompoundResult],
    pathway: Option<SynthesisPathway>,
) -> Vec<CompoundResult> {
    compounds
        .iter()
        .filter(|c| pathway.map_or(true, |p| c.synthesis_pathway == p))
        .cloned()
        .collect()
}

/// As `filter_by_pathway`, taking the pathway by name.
pub fn filter_by_pathway_name(
    compounds: &[CompoundResult],
    pathway: Option<&str>,
) -> PipelineResult<Vec<CompoundResult>> {
    let pathway = pathway.map(str::parse::<SynthesisPathway>).transpose()?;
    Ok(filter_by_pathway(compounds, pathway))
}

// ── Chart series ─────────────────────────────────────────────────────────────

/// A numeric compound field that can be charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMetric {
    QsarScore,
    BindingAffinity,
    BioavailabilityPercent,
    BioavailabilityImprovementFactor,
    DevelopmentConfidencePercent,
    SafetyEnhancement,
    SustainabilityScore,
    CulturalPreservationScore,
    CompensationAmount,
}

impl ChartMetric {
    pub fn value_of(&self, c: &CompoundResult) -> f64 {
        match self {
            Self::QsarScore                        => c.qsar_score,
            Self::BindingAffinity                  => c.binding_affinity,
            Self::BioavailabilityPercent           => c.bioavailability_percent,
            Self::BioavailabilityImprovementFactor => c.bioavailability_improvement_factor,
            Self::DevelopmentConfidencePercent     => f64::from(c.development_confidence_percent),
            Self::SafetyEnhancement                => c.safety_enhancement,
            Self::SustainabilityScore              => c.sustainability_score,
            Self::CulturalPreservationScore        => c.cultural_preservation_score,
            Self::CompensationAmount               => c.compensation_amount(),
        }
    }
}

impl FromStr for ChartMetric {
    type Err = PipelineError;

    /// Accepts the structured-export field name, or the short sort-key alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "qsar_score" | "qsar"                                  => Ok(Self::QsarScore),
            "binding_affinity"                                     => Ok(Self::BindingAffinity),
            "bioavailability_percent" | "bioavailability"          => Ok(Self::BioavailabilityPercent),
            "bioavailability_improvement_factor" | "improvement"   => Ok(Self::BioavailabilityImprovementFactor),
            "development_confidence_percent" | "confidence"        => Ok(Self::DevelopmentConfidencePercent),
            "safety_enhancement"                                   => Ok(Self::SafetyEnhancement),
            "sustainability_score" | "sustainability"              => Ok(Self::SustainabilityScore),
            "cultural_preservation_score" | "cultural_preservation" => Ok(Self::CulturalPreservationScore),
            "compensation_amount" | "compensation"                 => Ok(Self::CompensationAmount),
            other => Err(PipelineError::UnknownMetric { metric: other.to_string() }),
        }
    }
}

/// One bar / radar spoke / pie slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x:     f64,
    pub y:     f64,
    pub label: String,
}

/// `(compound name, metric value)` pairs in input order.
pub fn chart_series(compounds: &[CompoundResult], metric: &str) -> PipelineResult<Vec<SeriesPoint>> {
    let metric: ChartMetric = metric.parse()?;
    Ok(series_for(compounds, metric))
}

pub fn series_for(compounds: &[CompoundResult], metric: ChartMetric) -> Vec<SeriesPoint> {
    compounds
        .iter()
        .map(|c| SeriesPoint { label: c.name.clone(), value: metric.value_of(c) })
        .collect()
}

/// `(x, y, label)` points. Both metric names are resolved before any
/// point is produced.
pub fn scatter_series(
    compounds: &[CompoundResult],
    x_metric: &str,
    y_metric: &str,
) -> PipelineResult<Vec<ScatterPoint>> {
    let x: ChartMetric = x_metric.parse()?;
    let y: ChartMetric = y_metric.parse()?;
    Ok(compounds
        .iter()
        .map(|c| ScatterPoint { x: x.value_of(c), y: y.value_of(c), label: c.name.clone() })
        .collect())
}

/// Compound count per pathway, every pathway listed in enumeration order
/// (zero counts included).
pub fn pathway_distribution(compounds: &[CompoundResult]) -> Vec<SeriesPoint> {
    SynthesisPathway::ALL
        .iter()
        .map(|p| SeriesPoint {
            label: p.as_str().to_string(),
            value: compounds.iter().filter(|c| c.synthesis_pathway == *p).count() as f64,
        })
        .collect()
}
