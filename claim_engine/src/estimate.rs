/// Claim Engine — Estimate Calculator
///
/// Pure functions over `EstimateData`. Rates are read from the estimate,
/// never from constants. Paint labor hours and paint material hours are
/// kept equal: editing one edits both.

use crate::domain::EstimateData;

/// An hours field that can be edited while an estimate is open for revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateField {
    BodyLaborHours,
    PaintLaborHours,
}

/// parts + body labor + paint labor + paint materials.
pub fn compute_total(estimate: &EstimateData) -> f64 {
    let parts: f64 = estimate.parts.iter().map(|p| p.cost).sum();
    parts
        + estimate.labor.body.cost()
        + estimate.labor.paint.cost()
        + estimate.materials.paint.cost()
}

/// Return a copy of `estimate` with `field` set to `hours` and the total rewritten.
pub fn recompute_estimate(
    estimate: &EstimateData,
    field: EstimateField,
    hours: f64,
) -> EstimateData {
    let mut next = estimate.clone();
    match field {
        EstimateField::BodyLaborHours => {
            next.labor.body.hours = hours;
        }
        EstimateField::PaintLaborHours => {
            next.labor.paint.hours = hours;
            next.materials.paint.hours = hours;
        }
    }
    next.total = compute_total(&next);
    next
}

/// Read a raw form value as hours. Anything that is not a finite,
/// non-negative number reads as zero.
pub fn parse_hours(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

/// Whether the stored total matches the computed one.
pub fn total_is_consistent(estimate: &EstimateData) -> bool {
    (compute_total(estimate) - estimate.total).abs() < 1e-6
}
