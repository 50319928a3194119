//! Demo pipeline: a seeded stand-in for the compound optimization step.
//!
//! The numbers produced here are illustrative. Nothing below models real
//! chemistry: every figure is drawn from a bounded range, shaped only by the
//! plant profile's confidence and importance weights.
//!
//! STAGE ORDER (per compound, fixed):
//!   1. Binding: score each solvent, keep the best
//!   2. QSAR: bioactivity score
//!   3. Synthesis: pathway and its sustainability/preservation scores
//!   4. ADMET: enhancers, bioavailability, improvement, safety, confidence
//!   5. Compensation: deterministic from the profile, no randomness
//!
//! RULES:
//!   - All randomness flows through the RngBank seeded with the run seed.
//!   - Same seed + same profile + same timestamp => identical batch.
//!   - The RunState only receives a batch once every compound validated.

use crate::{
    config::{CompoundProfile, DemoConfig, DeploymentMode, PlantProfile},
    error::{PipelineError, PipelineResult},
    model::{Compensation, CompoundRecord, CompoundResult, SimulationBatch, SynthesisPathway},
    rng::{RngBank, StageRng, StageSlot},
    run_state::RunState,
    types::{QSAR_SCORE_MAX, SCORE_SCALE},
};
use chrono::{DateTime, Utc};

pub struct DemoPipeline<'a> {
    config: &'a DemoConfig,
    mode:   DeploymentMode,
    seed:   u64,
}

struct StageRngs {
    binding:   StageRng,
    qsar:      StageRng,
    synthesis: StageRng,
    admet:     StageRng,
}

impl<'a> DemoPipeline<'a> {
    pub fn new(config: &'a DemoConfig, mode: DeploymentMode, seed: u64) -> Self {
        Self { config, mode, seed }
    }

    /// Generate one batch for `plant`, reporting progress into `state`.
    /// On failure the state records the error and no result.
    pub fn run(
        &self,
        plant: &PlantProfile,
        timestamp: DateTime<Utc>,
        state: &mut RunState,
    ) -> PipelineResult<SimulationBatch> {
        state.start(format!("Initializing pipeline ({})", self.mode.as_str()))?;
        log::info!(
            "demo: run started plant={} mode={} seed={}",
            plant.id,
            self.mode.as_str(),
            self.seed
        );

        match self.generate(plant, timestamp, state) {
            Ok(batch) => {
                log::info!(
                    "demo: run complete plant={} compounds={} total_compensation={:.2}",
                    plant.id,
                    batch.compounds().len(),
                    batch.total_compensation()
                );
                state.complete(batch.clone());
                Ok(batch)
            }
            Err(e) => {
                log::warn!("demo: run failed plant={}: {e}", plant.id);
                state.fail(e.to_string());
                Err(e)
            }
        }
    }

    fn generate(
        &self,
        plant: &PlantProfile,
        timestamp: DateTime<Utc>,
        state: &mut RunState,
    ) -> PipelineResult<SimulationBatch> {
        state.advance(10, format!("Loading {} plant profile...", plant.display_name()));

        let bank = RngBank::new(self.seed);
        let mut rngs = StageRngs {
            binding:   bank.for_stage(StageSlot::Binding),
            qsar:      bank.for_stage(StageSlot::Qsar),
            synthesis: bank.for_stage(StageSlot::Synthesis),
            admet:     bank.for_stage(StageSlot::Admet),
        };

        let n = plant.compounds.len();
        let mut compounds = Vec::with_capacity(n);
        for (i, profile) in plant.compounds.iter().enumerate() {
            let progress = 20 + (70 * i / n.max(1)) as u8;
            state.advance(progress, format!("Processing compound {}/{n}: {}...", i + 1, profile.name));

            let record = self.compound(plant, i, profile, timestamp, &mut rngs)?;
            log::debug!(
                "demo: {} bioavailability={:.1}% improvement={:.1}x pathway={}",
                record.name,
                record.bioavailability_percent,
                record.bioavailability_improvement_factor,
                record.synthesis_pathway
            );
            compounds.push(CompoundResult::new(record)?);
        }

        state.advance(95, "Finalizing results...");
        let metrics = self
            .config
            .performance_for(self.mode)
            .map(|p| p.as_metrics())
            .unwrap_or_default();
        Ok(SimulationBatch::new(plant.display_name(), timestamp, compounds, metrics)?)
    }

    fn compound(
        &self,
        plant: &PlantProfile,
        index: usize,
        profile: &CompoundProfile,
        timestamp: DateTime<Utc>,
        rngs: &mut StageRngs,
    ) -> PipelineResult<CompoundRecord> {
        let params = &self.config.parameters;
        let importance = profile.traditional_importance;

        // 1. Binding: best solvent wins, first on ties.
        let mut best: Option<(&str, f64)> = None;
        for solvent in &params.solvents {
            let affinity = rngs.binding.uniform(5.0, 8.5) + 0.5 * importance;
            if best.map_or(true, |(_, b)| affinity > b) {
                best = Some((solvent.as_str(), affinity));
            }
        }
        let Some((solvent, binding_affinity)) = best else {
            return Err(PipelineError::Other(anyhow::anyhow!(
                "no solvents configured for the binding stage"
            )));
        };

        // 2. QSAR
        let qsar_score = (4.0 + 6.0 * importance
            + rngs.qsar.uniform(0.0, 2.0) * plant.bioactivity_confidence)
            .clamp(0.0, QSAR_SCORE_MAX);

        // 3. Synthesis
        let pathway = if importance >= 0.9 {
            SynthesisPathway::Traditional
        } else if rngs.synthesis.chance(0.5) {
            SynthesisPathway::Hybrid
        } else {
            SynthesisPathway::Synthetic
        };
        let (sustain_range, preserve_range) = match pathway {
            SynthesisPathway::Traditional => ((7.5, 9.5), (8.5, 10.0)),
            SynthesisPathway::Hybrid      => ((6.5, 8.5), (6.5, 8.5)),
            SynthesisPathway::Synthetic   => ((4.0, 7.0), (3.0, 6.0)),
        };
        let sustainability_score = rngs
            .synthesis
            .uniform(sustain_range.0, sustain_range.1)
            .clamp(0.0, SCORE_SCALE);
        let cultural_preservation_score = rngs
            .synthesis
            .uniform(preserve_range.0, preserve_range.1)
            .clamp(0.0, SCORE_SCALE);

        // 4. ADMET
        let enhancers = self.draw_enhancers(&mut rngs.admet);
        let bioavailability = (rngs.admet.uniform(35.0, 70.0) + 3.0 * enhancers.len() as f64).min(100.0);
        let untreated = rngs.admet.uniform(0.25, 1.5);
        let improvement = bioavailability / untreated;
        let safety_enhancement = rngs.admet.uniform(-2.0, 20.0);
        let optimization_score = rngs.admet.uniform(0.75, 1.0);
        let confidence = (plant.bioactivity_confidence * optimization_score).clamp(0.0, 1.0);

        // 5. Compensation
        let comp_cfg = &params.compensation;
        let compensation = comp_cfg.enabled.then(|| {
            let value = (plant.bioactivity_confidence * 0.4
                + comp_cfg.knowledge_type_weight * 0.2
                + plant.community_consensus * 0.2
                + importance * 0.2)
                .min(1.0);
            Compensation {
                amount:    round2(comp_cfg.base_amount * value * 10.0),
                record_id: format!(
                    "{}-{}-{:04}",
                    comp_cfg.record_prefix,
                    timestamp.format("%Y%m%d"),
                    index + 1
                ),
            }
        });

        Ok(CompoundRecord {
            name:                               profile.name.clone(),
            qsar_score:                         round2(qsar_score),
            binding_affinity:                   round2(binding_affinity),
            bioavailability_percent:            round1(bioavailability),
            bioavailability_improvement_factor: round1(improvement),
            development_confidence_percent:     (confidence * 100.0).round() as u8,
            safety_enhancement:                 round2(safety_enhancement),
            synthesis_pathway:                  pathway,
            optimal_solvent:                    solvent.to_string(),
            enhancers,
            sustainability_score:               round2(sustainability_score),
            cultural_preservation_score:        round2(cultural_preservation_score),
            compensation,
        })
    }

    /// 1..=max distinct enhancers, in draw order.
    fn draw_enhancers(&self, rng: &mut StageRng) -> Vec<String> {
        let params = &self.config.parameters;
        let mut pool: Vec<&String> = params.enhancers.iter().collect();
        let max = params.max_enhancers.min(pool.len());
        if max == 0 {
            return Vec::new();
        }
        let count = 1 + rng.next_u64_below(max as u64) as usize;
        log::debug!("demo[{}]: drawing {count} of {} enhancers", rng.name, pool.len());
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let idx = rng.next_u64_below(pool.len() as u64) as usize;
            out.push(pool.swap_remove(idx).clone());
        }
        out
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
