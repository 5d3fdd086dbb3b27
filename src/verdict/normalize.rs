/// Result normalization
///
/// Canonicalizes column case and real-number precision before comparison.
/// Row and column order are left untouched; ordering is the evaluator's concern.
use crate::config::types::{ResultSet, Scalar};

/// Round to two decimal places, half away from zero.
///
/// Absorbs floating point drift from aggregates such as `AVG`.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reals are rounded; integers, text and null pass through.
pub fn normalize_scalar(value: &Scalar) -> Scalar {
    match value {
        Scalar::Real(r) => Scalar::Real(round_to_cents(*r)),
        other => other.clone(),
    }
}

/// Normalize a raw result.
///
/// Returns `None` when there is no result or the statement produced no
/// tabular output.
pub fn normalize(raw: Option<&ResultSet>) -> Option<ResultSet> {
    let raw = raw?;
    if !raw.is_tabular() {
        return None;
    }

    Some(ResultSet {
        columns: raw.columns.iter().map(|c| c.to_lowercase()).collect(),
        rows: raw
            .rows
            .iter()
            .map(|row| row.iter().map(normalize_scalar).collect())
            .collect(),
    })
}

/// The result a run is judged on: the first statement that produced tabular output.
pub fn primary_result(results: &[ResultSet]) -> Option<&ResultSet> {
    results.iter().find(|r| r.is_tabular())
}
