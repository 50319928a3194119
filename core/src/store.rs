//! SQLite run archive.
//!
//! RULE: Only store.rs talks to the database.
//! Batches are archived as their structured export and re-validated on load,
//! so a stored batch can never bypass the model invariants.

use crate::{
    error::PipelineResult,
    export::{export_structured, import_structured},
    model::SimulationBatch,
    types::RunId,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id:             RunId,
    pub seed:               u64,
    pub deployment_mode:    String,
    pub version:            String,
    pub started_at:         String,
    /// None until a batch is saved for the run.
    pub plant_name:         Option<String>,
    pub compound_count:     Option<usize>,
    pub total_compensation: Option<f64>,
}

pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    /// Open (or create) the archive at `path`.
    pub fn open(path: &str) -> PipelineResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory archive (used in tests).
    pub fn in_memory() -> PipelineResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PipelineResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_results.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        deployment_mode: &str,
        version: &str,
    ) -> PipelineResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, deployment_mode, version, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                seed as i64,
                deployment_mode,
                version,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn list_runs(&self) -> PipelineResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.run_id, r.seed, r.deployment_mode, r.version, r.started_at,
                    b.plant_name, b.compound_count, b.total_compensation
             FROM run r LEFT JOIN batch b ON b.run_id = r.run_id
             ORDER BY r.started_at ASC, r.run_id ASC",
        )?;
        let runs = stmt
            .query_map([], |row| {
                Ok(RunRecord {
                    run_id:             row.get(0)?,
                    seed:               row.get::<_, i64>(1)? as u64,
                    deployment_mode:    row.get(2)?,
                    version:            row.get(3)?,
                    started_at:         row.get(4)?,
                    plant_name:         row.get(5)?,
                    compound_count:     row.get::<_, Option<i64>>(6)?.map(|n| n as usize),
                    total_compensation: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    // ── Batch ──────────────────────────────────────────────────

    /// Archive the batch of a run. A run holds at most one batch.
    pub fn save_batch(&self, run_id: &str, batch: &SimulationBatch) -> PipelineResult<()> {
        let json = serde_json::to_string(&export_structured(batch)?)?;
        self.conn.execute(
            "INSERT INTO batch (run_id, plant_name, compound_count, total_compensation, batch_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                batch.plant_name(),
                batch.compounds().len() as i64,
                batch.total_compensation(),
                json
            ],
        )?;
        log::debug!("store: archived batch for run {run_id}");
        Ok(())
    }

    pub fn load_batch(&self, run_id: &str) -> PipelineResult<Option<SimulationBatch>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT batch_json FROM batch WHERE run_id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => {
                let value: serde_json::Value = serde_json::from_str(&json)?;
                Ok(Some(import_structured(value)?))
            }
            None => Ok(None),
        }
    }
}
