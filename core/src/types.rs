//! Shared primitive types used across the crate.

/// The canonical run identifier.
pub type RunId = String;

/// Opaque attribution/payment record identifier.
pub type RecordId = String;

/// Upper bound of the fixed scale shared by sustainability and
/// cultural preservation scores. Scores are stored as plain numbers
/// on this scale; the scale is only attached when displayed.
pub const SCORE_SCALE: f64 = 10.0;

/// Upper bound of the QSAR score domain.
pub const QSAR_SCORE_MAX: f64 = 15.0;

/// Tolerance when checking a supplied compensation total against the
/// recomputed one.
pub const TOTAL_EPSILON: f64 = 1e-6;

/// Render a score on the fixed scale, e.g. `8.50/10`.
pub fn format_score(score: f64) -> String {
    format!("{score:.2}/{SCORE_SCALE:.0}")
}
