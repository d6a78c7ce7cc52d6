/// Claim Engine — Guidance Selection
///
/// Swaps the active estimate for one of the precomputed repair options.
/// The option list itself is never reordered or shortened; which option
/// is highlighted is tracked by the caller as `Option<usize>`.

use thiserror::Error;

use crate::domain::{ClaimSnapshot, GuidanceOption, UserRole};
use crate::history::{append_live, new_event};
use crate::transitions::TransitionContext;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGuidanceIndex {
    #[error("guidance index {index} is out of range ({len} options)")]
    OutOfRange { index: usize, len: usize },
    #[error("guidance option {index} carries no estimate")]
    MissingEstimate { index: usize },
}

/// History label recorded when an option is chosen.
pub fn selection_label(repair_type: &str) -> String {
    format!("Selected repair option: \"{}\"", repair_type)
}

/// Selection to use when a fresh option list arrives.
pub fn default_selection(options: &[GuidanceOption]) -> Option<usize> {
    if options.is_empty() {
        None
    } else {
        Some(0)
    }
}

/// Apply option `index`, or report why it cannot be applied.
pub fn try_select_guidance(
    snapshot: &ClaimSnapshot,
    index: usize,
    role: UserRole,
    ctx: &TransitionContext<'_>,
) -> Result<ClaimSnapshot, InvalidGuidanceIndex> {
    let options = &snapshot.ai_assessment.matched_guidance;
    let option = options.get(index).ok_or(InvalidGuidanceIndex::OutOfRange {
        index,
        len: options.len(),
    })?;
    let estimate = option
        .estimate
        .as_ref()
        .ok_or(InvalidGuidanceIndex::MissingEstimate { index })?;

    let mut next = snapshot.clone();
    next.estimate = estimate.clone();
    next.ai_assessment.suggested_repair = option.repair_type.clone();
    next.ai_assessment.repair_match_confidence = option.similarity;

    let event = new_event(
        ctx.clock,
        ctx.roster.display_name(role),
        role.into(),
        selection_label(&option.repair_type),
        None,
    );
    append_live(&mut next.history, event);

    tracing::debug!(claim = %next.id, index, repair = %option.repair_type, "guidance selected");
    Ok(next)
}

/// Apply option `index`. Invalid indexes are a silent no-op: the input
/// snapshot and `selected` come back unchanged.
pub fn select_guidance(
    snapshot: &ClaimSnapshot,
    selected: Option<usize>,
    index: usize,
    role: UserRole,
    ctx: &TransitionContext<'_>,
) -> (ClaimSnapshot, Option<usize>) {
    match try_select_guidance(snapshot, index, role, ctx) {
        Ok(next) => (next, Some(index)),
        Err(reason) => {
            tracing::debug!(claim = %snapshot.id, %reason, "guidance selection ignored");
            (snapshot.clone(), selected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use crate::config::{RateCard, Roster};
    use crate::domain::{Confidence, EstimateData, GuidanceKind, Part};
    use crate::state::{blank_estimate, blank_snapshot};
    use time::macros::datetime;
    use time::Duration;

    fn option(
        kind: GuidanceKind,
        repair: &str,
        similarity: u8,
        estimate: Option<EstimateData>,
    ) -> GuidanceOption {
        GuidanceOption {
            kind,
            confidence: Confidence::Medium,
            source: "test".to_string(),
            similarity,
            repair_type: repair.to_string(),
            description: String::new(),
            justification: String::new(),
            estimate,
        }
    }

    fn with_options() -> ClaimSnapshot {
        let mut replacement = blank_estimate(&RateCard::default());
        replacement.parts.push(Part {
            name: "Rear Quarter Panel".to_string(),
            cost: 450.0,
        });
        replacement.total = 450.0;

        let mut s = blank_snapshot("CL-TEST", &RateCard::default());
        s.ai_assessment.matched_guidance = vec![
            option(
                GuidanceKind::PrimaryRecommendation,
                "PDR",
                92,
                Some(blank_estimate(&RateCard::default())),
            ),
            option(GuidanceKind::SecondaryOption, "Fill & Paint", 74, None),
            option(GuidanceKind::EscalationScenario, "Panel Replacement", 45, Some(replacement)),
        ];
        s
    }

    #[test]
    fn test_select_replaces_estimate_and_assessment() {
        let clock = SteppingClock::new(datetime!(2025-07-21 09:00 UTC), Duration::seconds(1));
        let roster = Roster::default();
        let ctx = TransitionContext::new(&clock, &roster);
        let before = with_options();

        let (after, selected) = select_guidance(&before, Some(0), 2, UserRole::Adjuster, &ctx);
        assert_eq!(selected, Some(2));
        assert_eq!(after.estimate.total, 450.0);
        assert_eq!(after.ai_assessment.suggested_repair, "Panel Replacement");
        assert_eq!(after.ai_assessment.repair_match_confidence, 45);
        assert_eq!(after.ai_assessment.matched_guidance, before.ai_assessment.matched_guidance);
        assert_eq!(after.history.len(), 1);
        assert_eq!(
            after.history[0].action,
            "Selected repair option: \"Panel Replacement\""
        );
        assert_eq!(after.history[0].user, "Jane Mitchell, Adjuster");
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let clock = SteppingClock::new(datetime!(2025-07-21 09:00 UTC), Duration::seconds(1));
        let roster = Roster::default();
        let ctx = TransitionContext::new(&clock, &roster);
        let before = with_options();

        let (after, selected) = select_guidance(&before, Some(1), 99, UserRole::Agent, &ctx);
        assert_eq!(after, before);
        assert_eq!(selected, Some(1));
        assert_eq!(
            try_select_guidance(&before, 99, UserRole::Agent, &ctx).unwrap_err(),
            InvalidGuidanceIndex::OutOfRange { index: 99, len: 3 }
        );
    }

    #[test]
    fn test_missing_estimate_is_noop() {
        let clock = SteppingClock::new(datetime!(2025-07-21 09:00 UTC), Duration::seconds(1));
        let roster = Roster::default();
        let ctx = TransitionContext::new(&clock, &roster);
        let before = with_options();

        let (after, selected) = select_guidance(&before, None, 1, UserRole::Agent, &ctx);
        assert_eq!(after, before);
        assert_eq!(selected, None);
    }

    #[test]
    fn test_default_selection() {
        assert_eq!(default_selection(&[]), None);
        assert_eq!(default_selection(&with_options().ai_assessment.matched_guidance), Some(0));
    }
}
