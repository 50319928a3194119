//! The result model: one simulation run's output.
//!
//! RULES:
//!   - A CompoundResult or SimulationBatch only exists once validated.
//!   - A batch is immutable after construction. A new run produces a new batch.
//!   - total_compensation is always recomputed from the compounds, never stored
//!     independently.
//!   - Deserialization goes through the same validation as construction.

use crate::{
    error::ValidationError,
    types::{RecordId, QSAR_SCORE_MAX, SCORE_SCALE, TOTAL_EPSILON},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, collections::HashSet, fmt, ops::Deref, str::FromStr};

// ── Synthesis pathway ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisPathway {
    Traditional,
    Synthetic,
    Hybrid,
}

impl SynthesisPathway {
    /// Fixed enumeration order, used wherever pathways are listed.
    pub const ALL: [SynthesisPathway; 3] = [Self::Traditional, Self::Synthetic, Self::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traditional => "traditional",
            Self::Synthetic   => "synthetic",
            Self::Hybrid      => "hybrid",
        }
    }
}

impl fmt::Display for SynthesisPathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SynthesisPathway {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traditional" => Ok(Self::Traditional),
            "synthetic"   => Ok(Self::Synthetic),
            "hybrid"      => Ok(Self::Hybrid),
            other => Err(ValidationError::UnknownPathway { value: other.to_string() }),
        }
    }
}

// ── Compound ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compensation {
    pub amount:    f64,
    pub record_id: RecordId,
}

/// The plain field set of one compound. Not validated by itself;
/// pass it to `CompoundResult::new` to obtain a checked value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundRecord {
    pub name:                               String,
    pub qsar_score:                         f64,
    pub binding_affinity:                   f64,
    pub bioavailability_percent:            f64,
    pub bioavailability_improvement_factor: f64,
    pub development_confidence_percent:     u8,
    pub safety_enhancement:                 f64,
    pub synthesis_pathway:                  SynthesisPathway,
    pub optimal_solvent:                    String,
    pub enhancers:                          Vec<String>,
    pub sustainability_score:               f64,
    pub cultural_preservation_score:        f64,
    pub compensation:                       Option<Compensation>,
}

impl CompoundRecord {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let name = &self.name;

        check_finite(name, "binding_affinity", self.binding_affinity)?;
        check_finite(name, "safety_enhancement", self.safety_enhancement)?;
        check_range(name, "qsar_score", self.qsar_score, 0.0, QSAR_SCORE_MAX)?;
        check_range(name, "bioavailability_percent", self.bioavailability_percent, 0.0, 100.0)?;
        check_range(
            name,
            "bioavailability_improvement_factor",
            self.bioavailability_improvement_factor,
            0.0,
            f64::INFINITY,
        )?;
        check_range(
            name,
            "development_confidence_percent",
            f64::from(self.development_confidence_percent),
            0.0,
            100.0,
        )?;
        check_range(name, "sustainability_score", self.sustainability_score, 0.0, SCORE_SCALE)?;
        check_range(
            name,
            "cultural_preservation_score",
            self.cultural_preservation_score,
            0.0,
            SCORE_SCALE,
        )?;

        if let Some(comp) = &self.compensation {
            check_range(name, "compensation.amount", comp.amount, 0.0, f64::INFINITY)?;
            if comp.record_id.trim().is_empty() {
                return Err(ValidationError::EmptyRecordId { compound: name.clone() });
            }
        }
        Ok(())
    }
}

fn check_finite(compound: &str, field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { compound: compound.to_string(), field })
    }
}

fn check_range(
    compound: &str,
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    check_finite(compound, field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            compound: compound.to_string(),
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// One optimized compound's metrics, checked against the model invariants.
/// Fields are readable through `Deref`; there is no mutable access.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompoundResult {
    record: CompoundRecord,
}

impl CompoundResult {
    pub fn new(record: CompoundRecord) -> Result<Self, ValidationError> {
        record.validate()?;
        Ok(Self { record })
    }

    pub fn compensation_amount(&self) -> f64 {
        self.record.compensation.as_ref().map_or(0.0, |c| c.amount)
    }

    pub fn into_record(self) -> CompoundRecord {
        self.record
    }
}

impl Deref for CompoundResult {
    type Target = CompoundRecord;

    fn deref(&self) -> &CompoundRecord {
        &self.record
    }
}

// ── Batch ────────────────────────────────────────────────────────────────────

/// One completed run: a plant's compound results plus display metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBatch")]
pub struct SimulationBatch {
    plant_name:          String,
    timestamp:           DateTime<Utc>,
    compounds:           Vec<CompoundResult>,
    performance_metrics: BTreeMap<String, String>,
    total_compensation:  f64,
}

impl SimulationBatch {
    pub fn new(
        plant_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        compounds: Vec<CompoundResult>,
        performance_metrics: BTreeMap<String, String>,
    ) -> Result<Self, ValidationError> {
        if compounds.is_empty() {
            return Err(ValidationError::NoCompounds);
        }
        let mut seen = HashSet::with_capacity(compounds.len());
        for c in &compounds {
            if !seen.insert(c.name.as_str()) {
                return Err(ValidationError::DuplicateName { name: c.name.clone() });
            }
        }
        let total_compensation = compensation_total(&compounds);
        Ok(Self {
            plant_name: plant_name.into(),
            timestamp,
            compounds,
            performance_metrics,
            total_compensation,
        })
    }

    /// Build a batch whose total was supplied by an outside party.
    /// The supplied value must agree with the recomputed one.
    pub fn with_supplied_total(
        plant_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        compounds: Vec<CompoundResult>,
        performance_metrics: BTreeMap<String, String>,
        supplied_total: f64,
    ) -> Result<Self, ValidationError> {
        let batch = Self::new(plant_name, timestamp, compounds, performance_metrics)?;
        if !supplied_total.is_finite()
            || (supplied_total - batch.total_compensation).abs() > TOTAL_EPSILON
        {
            return Err(ValidationError::TotalMismatch {
                supplied: supplied_total,
                computed: batch.total_compensation,
            });
        }
        Ok(batch)
    }

    pub fn plant_name(&self) -> &str {
        &self.plant_name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn compounds(&self) -> &[CompoundResult] {
        &self.compounds
    }

    pub fn performance_metrics(&self) -> &BTreeMap<String, String> {
        &self.performance_metrics
    }

    pub fn total_compensation(&self) -> f64 {
        self.total_compensation
    }
}

/// Sum of all present compensation amounts, 0 when none.
pub fn compensation_total(compounds: &[CompoundResult]) -> f64 {
    compounds.iter().map(CompoundResult::compensation_amount).sum()
}

// ── Wire shape ───────────────────────────────────────────────────────────────
// The pathway arrives as a string and confidence as a wide integer; an
// unknown pathway or out-of-range confidence is a ValidationError, not a
// parse error.

#[derive(Debug, Deserialize)]
pub(crate) struct RawCompound {
    name:                               String,
    qsar_score:                         f64,
    binding_affinity:                   f64,
    bioavailability_percent:            f64,
    bioavailability_improvement_factor: f64,
    development_confidence_percent:     i64,
    safety_enhancement:                 f64,
    synthesis_pathway:                  String,
    optimal_solvent:                    String,
    #[serde(default)]
    enhancers:                          Vec<String>,
    sustainability_score:               f64,
    cultural_preservation_score:        f64,
    #[serde(default)]
    compensation:                       Option<Compensation>,
}

impl TryFrom<RawCompound> for CompoundResult {
    type Error = ValidationError;

    fn try_from(raw: RawCompound) -> Result<Self, Self::Error> {
        let confidence = u8::try_from(raw.development_confidence_percent)
            .ok()
            .filter(|c| *c <= 100)
            .ok_or_else(|| ValidationError::OutOfRange {
                compound: raw.name.clone(),
                field:    "development_confidence_percent",
                value:    raw.development_confidence_percent as f64,
                min:      0.0,
                max:      100.0,
            })?;
        CompoundResult::new(CompoundRecord {
            synthesis_pathway:                  raw.synthesis_pathway.parse()?,
            name:                               raw.name,
            qsar_score:                         raw.qsar_score,
            binding_affinity:                   raw.binding_affinity,
            bioavailability_percent:            raw.bioavailability_percent,
            bioavailability_improvement_factor: raw.bioavailability_improvement_factor,
            development_confidence_percent:     confidence,
            safety_enhancement:                 raw.safety_enhancement,
            optimal_solvent:                    raw.optimal_solvent,
            enhancers:                          raw.enhancers,
            sustainability_score:               raw.sustainability_score,
            cultural_preservation_score:        raw.cultural_preservation_score,
            compensation:                       raw.compensation,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBatch {
    plant_name:          String,
    timestamp:           DateTime<Utc>,
    compounds:           Vec<RawCompound>,
    #[serde(default)]
    performance_metrics: BTreeMap<String, String>,
    #[serde(default)]
    total_compensation:  Option<f64>,
}

impl TryFrom<RawBatch> for SimulationBatch {
    type Error = ValidationError;

    fn try_from(raw: RawBatch) -> Result<Self, Self::Error> {
        let compounds = raw
            .compounds
            .into_iter()
            .map(CompoundResult::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        match raw.total_compensation {
            Some(total) => SimulationBatch::with_supplied_total(
                raw.plant_name,
                raw.timestamp,
                compounds,
                raw.performance_metrics,
                total,
            ),
            None => SimulationBatch::new(
                raw.plant_name,
                raw.timestamp,
                compounds,
                raw.performance_metrics,
            ),
        }
    }
}
