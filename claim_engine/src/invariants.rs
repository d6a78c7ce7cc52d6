/// Claim Engine — Invariant Checks
///
/// Non-panicking validation of a snapshot. Returns the first failure.
/// Live transitions preserve every check by construction; replayed
/// scripts and decoded snapshots are external input and get checked.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::{ApprovalType, ClaimSnapshot, ClaimStatus, RateLine};
use crate::estimate::{compute_total, total_is_consistent};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("[INVARIANT:estimate_total] stored total {stored} differs from computed {computed}")]
    TotalDrift { stored: f64, computed: f64 },
    #[error("[INVARIANT:hours] {line} has invalid hours {hours}")]
    InvalidHours { line: &'static str, hours: f64 },
    #[error("[INVARIANT:unique_event_ids] duplicate history event id {0:?}")]
    DuplicateEventId(String),
    #[error("[INVARIANT:percentage] {field} is {value}, must be within 0..=100")]
    PercentageOutOfRange { field: String, value: u8 },
    #[error("[INVARIANT:correspondence] status {status} requires {field}")]
    MissingCorrespondence { status: ClaimStatus, field: &'static str },
}

pub fn validate_invariants(snapshot: &ClaimSnapshot) -> Result<(), InvariantViolation> {
    check_hours(snapshot)?;
    check_total(snapshot)?;
    check_unique_event_ids(snapshot)?;
    check_percentages(snapshot)?;
    check_correspondence(snapshot)?;
    Ok(())
}

fn check_hours(snapshot: &ClaimSnapshot) -> Result<(), InvariantViolation> {
    let est = &snapshot.estimate;
    let lines: [(&'static str, &RateLine); 3] = [
        ("labor.body", &est.labor.body),
        ("labor.paint", &est.labor.paint),
        ("materials.paint", &est.materials.paint),
    ];
    for (line, rate_line) in lines {
        if !rate_line.hours.is_finite() || rate_line.hours < 0.0 {
            return Err(InvariantViolation::InvalidHours {
                line,
                hours: rate_line.hours,
            });
        }
    }
    Ok(())
}

fn check_total(snapshot: &ClaimSnapshot) -> Result<(), InvariantViolation> {
    if total_is_consistent(&snapshot.estimate) {
        return Ok(());
    }
    Err(InvariantViolation::TotalDrift {
        stored: snapshot.estimate.total,
        computed: compute_total(&snapshot.estimate),
    })
}

fn check_unique_event_ids(snapshot: &ClaimSnapshot) -> Result<(), InvariantViolation> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for event in &snapshot.history {
        if !seen.insert(event.id.as_str()) {
            return Err(InvariantViolation::DuplicateEventId(event.id.clone()));
        }
    }
    Ok(())
}

fn check_percentages(snapshot: &ClaimSnapshot) -> Result<(), InvariantViolation> {
    let ai = &snapshot.ai_assessment;
    if ai.repair_match_confidence > 100 {
        return Err(InvariantViolation::PercentageOutOfRange {
            field: "aiAssessment.repairMatchConfidence".to_string(),
            value: ai.repair_match_confidence,
        });
    }
    for (i, option) in ai.matched_guidance.iter().enumerate() {
        if option.similarity > 100 {
            return Err(InvariantViolation::PercentageOutOfRange {
                field: format!("aiAssessment.matchedGuidance[{}].similarity", i),
                value: option.similarity,
            });
        }
    }
    Ok(())
}

/// Statuses entered by a correspondence-setting transition must carry it.
fn check_correspondence(snapshot: &ClaimSnapshot) -> Result<(), InvariantViolation> {
    let missing = |field| InvariantViolation::MissingCorrespondence {
        status: snapshot.status,
        field,
    };
    let approval = snapshot.adjuster_approval.as_ref().map(|a| a.approval_type);
    match snapshot.status {
        ClaimStatus::AdjustorApproved if approval != Some(ApprovalType::Approved) => {
            Err(missing("adjusterApproval(Approved)"))
        }
        ClaimStatus::EstimateRevisedByAdjuster if approval != Some(ApprovalType::Revised) => {
            Err(missing("adjusterApproval(Revised)"))
        }
        ClaimStatus::ReturnedToAgent if snapshot.return_details.is_none() => {
            Err(missing("returnDetails"))
        }
        ClaimStatus::ReturnedByRepairShop if snapshot.shop_return_details.is_none() => {
            Err(missing("shopReturnDetails"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateCard;
    use crate::domain::{EventRole, HistoryEvent};
    use crate::state::blank_snapshot;
    use time::macros::datetime;

    fn blank() -> ClaimSnapshot {
        blank_snapshot("CL-INV", &RateCard::default())
    }

    #[test]
    fn test_blank_snapshot_is_valid() {
        assert_eq!(validate_invariants(&blank()), Ok(()));
    }

    #[test]
    fn test_total_drift_detected() {
        let mut s = blank();
        s.estimate.labor.body.hours = 1.0;
        assert!(matches!(
            validate_invariants(&s),
            Err(InvariantViolation::TotalDrift { computed, .. }) if computed == 95.0
        ));
    }

    #[test]
    fn test_duplicate_event_id_detected() {
        let event = HistoryEvent {
            id: "evt_1".to_string(),
            timestamp: datetime!(2025-07-20 10:00 UTC),
            user: "AI Assistant".to_string(),
            role: EventRole::Ai,
            action: "Initial Analysis Complete".to_string(),
            notes: None,
        };
        let mut s = blank();
        s.history = vec![event.clone(), event];
        assert_eq!(
            validate_invariants(&s),
            Err(InvariantViolation::DuplicateEventId("evt_1".to_string()))
        );
    }

    #[test]
    fn test_returned_status_requires_details() {
        let mut s = blank();
        s.status = ClaimStatus::ReturnedToAgent;
        assert!(matches!(
            validate_invariants(&s),
            Err(InvariantViolation::MissingCorrespondence { field: "returnDetails", .. })
        ));
    }

    #[test]
    fn test_confidence_range() {
        let mut s = blank();
        s.ai_assessment.repair_match_confidence = 101;
        assert!(matches!(
            validate_invariants(&s),
            Err(InvariantViolation::PercentageOutOfRange { value: 101, .. })
        ));
    }
}
