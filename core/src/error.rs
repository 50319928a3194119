use thiserror::Error;

/// A malformed compound or batch, rejected at construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Batch has no compounds")]
    NoCompounds,

    #[error("Compound name must not be empty")]
    EmptyName,

    #[error("Duplicate compound name '{name}'")]
    DuplicateName { name: String },

    #[error("Field '{field}' of '{compound}' out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        compound: String,
        field:    &'static str,
        value:    f64,
        min:      f64,
        max:      f64,
    },

    #[error("Field '{field}' of '{compound}' is not a finite number")]
    NotFinite {
        compound: String,
        field:    &'static str,
    },

    #[error("Unknown synthesis pathway '{value}'")]
    UnknownPathway { value: String },

    #[error("Compensation for '{compound}' has an empty record id")]
    EmptyRecordId { compound: String },

    #[error("Total compensation mismatch: supplied {supplied}, computed {computed}")]
    TotalMismatch { supplied: f64, computed: f64 },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Aggregate requested over zero compounds")]
    EmptyBatch,

    #[error("Invalid sort key '{key}' (expected bioavailability, confidence, qsar or default)")]
    InvalidSortKey { key: String },

    #[error("Unknown chart metric '{metric}'")]
    UnknownMetric { metric: String },

    #[error("A run is already in progress")]
    RunAlreadyActive,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Report formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
