/// Claim Engine — Centralized Transition Logic
///
/// ALL lifecycle mutation lives here. Each action has exactly one row in
/// `TRANSITIONS`; a request is checked against its row once (role, then
/// source status, then note) and either fails without touching anything
/// or produces a new snapshot with exactly one history event appended.

use thiserror::Error;

use crate::clock::Clock;
use crate::config::Roster;
use crate::domain::{
    AdjusterApproval, ApprovalType, ClaimSnapshot, ClaimStatus, ReturnDetails, UserRole,
};
use crate::events::{Action, TransitionOutcome};
use crate::history::{append_live, new_event};

use crate::domain::ClaimStatus::*;

// ---------------------------------------------------------------------------
// Table types
// ---------------------------------------------------------------------------

/// Which roles may invoke a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGate {
    Only(UserRole),
    Any,
}

impl RoleGate {
    pub fn permits(self, role: UserRole) -> bool {
        match self {
            RoleGate::Only(required) => required == role,
            RoleGate::Any => true,
        }
    }
}

/// Statuses a transition may start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    OneOf(&'static [ClaimStatus]),
    AnyExcept(&'static [ClaimStatus]),
}

impl SourceStatus {
    pub fn permits(self, status: ClaimStatus) -> bool {
        match self {
            SourceStatus::OneOf(allowed) => allowed.contains(&status),
            SourceStatus::AnyExcept(denied) => !denied.contains(&status),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteRule {
    Optional,
    Required,
}

/// Snapshot mutation beyond the status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Sets `adjusterApproval` and `adjusterNote`.
    Approval(ApprovalType),
    /// Sets `returnDetails`.
    ReturnToAgent,
    /// Sets `shopReturnDetails`.
    ShopReturn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub action: Action,
    pub role: RoleGate,
    pub from: SourceStatus,
    /// `None` leaves the status unchanged.
    pub to: Option<ClaimStatus>,
    pub label: &'static str,
    pub note: NoteRule,
    pub effect: Effect,
    /// `None` keeps the acting role in control.
    pub hands_off_to: Option<UserRole>,
    pub ends_estimate_edit: bool,
}

const ADJUSTER_REVIEW: &[ClaimStatus] = &[PendingAdjusterReview, ReturnedByRepairShop];

pub static TRANSITIONS: [TransitionRule; 11] = [
    TransitionRule {
        action: Action::ForwardToAdjuster,
        role: RoleGate::Only(UserRole::Agent),
        from: SourceStatus::OneOf(&[AiEstimateSuggested]),
        to: Some(PendingAdjusterReview),
        label: "Forwarded to Adjuster",
        note: NoteRule::Optional,
        effect: Effect::None,
        hands_off_to: Some(UserRole::Adjuster),
        ends_estimate_edit: false,
    },
    TransitionRule {
        action: Action::ResubmitToAdjuster,
        role: RoleGate::Only(UserRole::Agent),
        from: SourceStatus::OneOf(&[ReturnedToAgent]),
        to: Some(PendingAdjusterReview),
        label: "Re-submitted to Adjuster",
        note: NoteRule::Optional,
        effect: Effect::None,
        hands_off_to: Some(UserRole::Adjuster),
        ends_estimate_edit: false,
    },
    TransitionRule {
        action: Action::ApproveEstimate,
        role: RoleGate::Only(UserRole::Adjuster),
        from: SourceStatus::OneOf(ADJUSTER_REVIEW),
        to: Some(AdjustorApproved),
        label: "Estimate Approved",
        note: NoteRule::Optional,
        effect: Effect::Approval(ApprovalType::Approved),
        hands_off_to: Some(UserRole::Agent),
        ends_estimate_edit: false,
    },
    TransitionRule {
        action: Action::ReviseEstimate,
        role: RoleGate::Only(UserRole::Adjuster),
        from: SourceStatus::OneOf(ADJUSTER_REVIEW),
        to: Some(EstimateRevisedByAdjuster),
        label: "Estimate Edited",
        note: NoteRule::Required,
        effect: Effect::Approval(ApprovalType::Revised),
        hands_off_to: Some(UserRole::Agent),
        ends_estimate_edit: true,
    },
    TransitionRule {
        action: Action::RequestInformation,
        role: RoleGate::Only(UserRole::Adjuster),
        from: SourceStatus::OneOf(ADJUSTER_REVIEW),
        to: Some(ReturnedToAgent),
        label: "Returned for Information",
        note: NoteRule::Required,
        effect: Effect::ReturnToAgent,
        hands_off_to: Some(UserRole::Agent),
        ends_estimate_edit: false,
    },
    TransitionRule {
        action: Action::RouteToShop,
        role: RoleGate::Only(UserRole::Agent),
        from: SourceStatus::OneOf(&[AdjustorApproved, EstimateRevisedByAdjuster]),
        to: Some(RoutedToRepairShop),
        label: "Routed to Repair Shop",
        note: NoteRule::Optional,
        effect: Effect::None,
        hands_off_to: Some(UserRole::RepairShop),
        ends_estimate_edit: false,
    },
    TransitionRule {
        action: Action::AcceptJob,
        role: RoleGate::Only(UserRole::RepairShop),
        from: SourceStatus::OneOf(&[RoutedToRepairShop]),
        to: Some(RepairInProgress),
        label: "Job Accepted by Repair Shop",
        note: NoteRule::Optional,
        effect: Effect::None,
        hands_off_to: None,
        ends_estimate_edit: false,
    },
    TransitionRule {
        action: Action::CompleteRepair,
        role: RoleGate::Only(UserRole::RepairShop),
        from: SourceStatus::OneOf(&[RepairInProgress]),
        to: Some(RepairComplete),
        label: "Repair Marked as Complete",
        note: NoteRule::Optional,
        effect: Effect::None,
        hands_off_to: Some(UserRole::Agent),
        ends_estimate_edit: false,
    },
    TransitionRule {
        action: Action::ReturnToAdjuster,
        role: RoleGate::Only(UserRole::RepairShop),
        from: SourceStatus::OneOf(&[RoutedToRepairShop, RepairInProgress]),
        to: Some(ReturnedByRepairShop),
        label: "Estimate Returned by Shop",
        note: NoteRule::Required,
        effect: Effect::ShopReturn,
        hands_off_to: Some(UserRole::Adjuster),
        ends_estimate_edit: false,
    },
    TransitionRule {
        action: Action::CloseClaim,
        role: RoleGate::Only(UserRole::Agent),
        from: SourceStatus::OneOf(&[RepairComplete]),
        to: Some(ClaimClosed),
        label: "Claim Closed",
        note: NoteRule::Optional,
        effect: Effect::None,
        hands_off_to: None,
        ends_estimate_edit: false,
    },
    TransitionRule {
        action: Action::AddNote,
        role: RoleGate::Any,
        from: SourceStatus::AnyExcept(&[ClaimClosed]),
        to: None,
        label: "Note Added",
        note: NoteRule::Required,
        effect: Effect::None,
        hands_off_to: None,
        ends_estimate_edit: false,
    },
];

// ---------------------------------------------------------------------------
// Errors & context
// ---------------------------------------------------------------------------

/// A transition precondition that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("{action} requires role {required}, acting role was {actual}")]
    WrongRole {
        action: Action,
        required: UserRole,
        actual: UserRole,
    },
    #[error("{action} is not allowed while the claim is {status}")]
    WrongStatus { action: Action, status: ClaimStatus },
    #[error("{action} requires a non-empty note")]
    MissingNote { action: Action },
}

/// Collaborators a transition needs besides the snapshot.
#[derive(Clone, Copy)]
pub struct TransitionContext<'a> {
    pub clock: &'a dyn Clock,
    pub roster: &'a Roster,
}

impl<'a> TransitionContext<'a> {
    pub fn new(clock: &'a dyn Clock, roster: &'a Roster) -> Self {
        Self { clock, roster }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// The table row for `action`.
pub fn rule_for(action: Action) -> &'static TransitionRule {
    let row = match action {
        Action::ForwardToAdjuster => 0,
        Action::ResubmitToAdjuster => 1,
        Action::ApproveEstimate => 2,
        Action::ReviseEstimate => 3,
        Action::RequestInformation => 4,
        Action::RouteToShop => 5,
        Action::AcceptJob => 6,
        Action::CompleteRepair => 7,
        Action::ReturnToAdjuster => 8,
        Action::CloseClaim => 9,
        Action::AddNote => 10,
    };
    &TRANSITIONS[row]
}

/// Check every precondition without applying anything.
pub fn check_transition(
    snapshot: &ClaimSnapshot,
    action: Action,
    role: UserRole,
    note: &str,
) -> Result<&'static TransitionRule, InvalidTransition> {
    let rule = rule_for(action);

    if let RoleGate::Only(required) = rule.role {
        if required != role {
            return Err(InvalidTransition::WrongRole {
                action,
                required,
                actual: role,
            });
        }
    }

    if !rule.from.permits(snapshot.status) {
        return Err(InvalidTransition::WrongStatus {
            action,
            status: snapshot.status,
        });
    }

    if rule.note == NoteRule::Required && note.trim().is_empty() {
        return Err(InvalidTransition::MissingNote { action });
    }

    Ok(rule)
}

/// Actions `role` may attempt from `status`, in table order.
/// Note requirements are not considered.
pub fn available_actions(status: ClaimStatus, role: UserRole) -> Vec<Action> {
    TRANSITIONS
        .iter()
        .filter(|r| r.role.permits(role) && r.from.permits(status))
        .map(|r| r.action)
        .collect()
}

/// Apply `action` by `role` to `snapshot`.
/// The input snapshot is never mutated; on error nothing is produced.
pub fn apply_transition(
    snapshot: &ClaimSnapshot,
    action: Action,
    role: UserRole,
    note: &str,
    ctx: &TransitionContext<'_>,
) -> Result<TransitionOutcome, InvalidTransition> {
    let rule = check_transition(snapshot, action, role, note)?;

    let event = new_event(
        ctx.clock,
        ctx.roster.display_name(role),
        role.into(),
        rule.label,
        Some(note),
    );
    let at = event.timestamp;
    let event_id = event.id.clone();

    let mut next = snapshot.clone();
    match rule.effect {
        Effect::None => {}
        Effect::Approval(approval_type) => {
            next.adjuster_note = note.to_string();
            next.adjuster_approval = Some(AdjusterApproval {
                name: ctx.roster.display_name(role).to_string(),
                date: at,
                approval_type,
            });
        }
        Effect::ReturnToAgent => {
            next.return_details = Some(ReturnDetails {
                note: note.to_string(),
                date: at,
            });
        }
        Effect::ShopReturn => {
            next.shop_return_details = Some(ReturnDetails {
                note: note.to_string(),
                date: at,
            });
        }
    }
    if let Some(to) = rule.to {
        next.status = to;
    }
    append_live(&mut next.history, event);

    tracing::debug!(
        claim = %next.id,
        %action,
        %role,
        from = %snapshot.status,
        to = %next.status,
        "transition applied"
    );

    Ok(TransitionOutcome {
        snapshot: next,
        next_active_role: rule.hands_off_to.unwrap_or(role),
        ends_estimate_edit: rule.ends_estimate_edit,
        event_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use crate::config::RateCard;
    use crate::domain::EventRole;
    use crate::state::{blank_snapshot, DEFAULT_CLAIM_ID};
    use crate::history::{is_sorted, HistoryOrder};
    use time::macros::datetime;
    use time::Duration;

    fn clock() -> SteppingClock {
        SteppingClock::new(datetime!(2025-07-21 09:00 UTC), Duration::minutes(5))
    }

    fn at(status: ClaimStatus) -> ClaimSnapshot {
        let mut s = blank_snapshot(DEFAULT_CLAIM_ID, &RateCard::default());
        s.status = status;
        s
    }

    fn note_for(rule: &TransitionRule) -> &'static str {
        match rule.note {
            NoteRule::Required => "need clearer photo",
            NoteRule::Optional => "",
        }
    }

    #[test]
    fn test_every_action_has_one_rule() {
        for action in Action::ALL {
            assert_eq!(TRANSITIONS.iter().filter(|r| r.action == action).count(), 1);
        }
    }

    #[test]
    fn test_rule_for_returns_matching_row() {
        for action in Action::ALL {
            assert_eq!(rule_for(action).action, action);
        }
    }

    #[test]
    fn test_valid_combinations_apply_table_row() {
        let clock = clock();
        let roster = Roster::default();
        let ctx = TransitionContext::new(&clock, &roster);

        for rule in TRANSITIONS.iter() {
            for status in ClaimStatus::ALL {
                if !rule.from.permits(status) {
                    continue;
                }
                for role in UserRole::ALL {
                    if !rule.role.permits(role) {
                        continue;
                    }
                    let before = at(status);
                    let out = apply_transition(&before, rule.action, role, note_for(rule), &ctx)
                        .unwrap_or_else(|e| panic!("{:?} from {:?}: {}", rule.action, status, e));
                    assert_eq!(out.snapshot.status, rule.to.unwrap_or(status));
                    assert_eq!(out.snapshot.history.len(), 1);
                    assert_eq!(out.snapshot.history[0].action, rule.label);
                    assert_eq!(out.snapshot.history[0].role, EventRole::from(role));
                    assert_eq!(out.snapshot.history[0].id, out.event_id);
                    assert_eq!(out.next_active_role, rule.hands_off_to.unwrap_or(role));
                }
            }
        }
    }

    #[test]
    fn test_invalid_combinations_are_rejected() {
        let clock = clock();
        let roster = Roster::default();
        let ctx = TransitionContext::new(&clock, &roster);

        for rule in TRANSITIONS.iter() {
            for status in ClaimStatus::ALL {
                for role in UserRole::ALL {
                    if rule.role.permits(role) && rule.from.permits(status) {
                        continue;
                    }
                    let before = at(status);
                    let err = apply_transition(&before, rule.action, role, "a note", &ctx)
                        .expect_err("combination should be rejected");
                    if rule.role.permits(role) {
                        assert!(matches!(err, InvalidTransition::WrongStatus { .. }));
                    } else {
                        assert!(matches!(err, InvalidTransition::WrongRole { .. }));
                    }
                    assert!(before.history.is_empty());
                    assert_eq!(before.status, status);
                }
            }
        }
    }

    #[test]
    fn test_required_note_is_enforced() {
        let clock = clock();
        let roster = Roster::default();
        let ctx = TransitionContext::new(&clock, &roster);
        let before = at(PendingAdjusterReview);

        let err = apply_transition(
            &before,
            Action::RequestInformation,
            UserRole::Adjuster,
            "   ",
            &ctx,
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidTransition::MissingNote {
                action: Action::RequestInformation
            }
        );

        let err = apply_transition(
            &at(RepairInProgress),
            Action::ReturnToAdjuster,
            UserRole::RepairShop,
            "",
            &ctx,
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidTransition::MissingNote {
                action: Action::ReturnToAdjuster
            }
        );
    }

    #[test]
    fn test_role_is_checked_before_status() {
        let err = check_transition(&at(ClaimClosed), Action::ApproveEstimate, UserRole::Agent, "")
            .unwrap_err();
        assert!(matches!(err, InvalidTransition::WrongRole { required: UserRole::Adjuster, .. }));
    }

    #[test]
    fn test_request_info_sets_return_details() {
        let clock = clock();
        let roster = Roster::default();
        let ctx = TransitionContext::new(&clock, &roster);
        let out = apply_transition(
            &at(PendingAdjusterReview),
            Action::RequestInformation,
            UserRole::Adjuster,
            "need clearer photo",
            &ctx,
        )
        .unwrap();
        let s = &out.snapshot;
        assert_eq!(s.status, ReturnedToAgent);
        assert_eq!(s.return_details.as_ref().unwrap().note, "need clearer photo");
        assert_eq!(s.return_details.as_ref().unwrap().date, s.history[0].timestamp);
        assert!(s.adjuster_approval.is_none());
        assert!(s.shop_return_details.is_none());
        assert_eq!(s.history[0].action, "Returned for Information");
        assert_eq!(s.history[0].user, "Jane Mitchell, Adjuster");
        assert_eq!(out.next_active_role, UserRole::Agent);
    }

    #[test]
    fn test_approve_and_revise_set_only_approval() {
        let clock = clock();
        let roster = Roster::default();
        let ctx = TransitionContext::new(&clock, &roster);

        let approved = apply_transition(
            &at(PendingAdjusterReview),
            Action::ApproveEstimate,
            UserRole::Adjuster,
            "",
            &ctx,
        )
        .unwrap();
        let approval = approved.snapshot.adjuster_approval.as_ref().unwrap();
        assert_eq!(approval.approval_type, ApprovalType::Approved);
        assert_eq!(approval.name, "Jane Mitchell, Adjuster");
        assert!(approved.snapshot.history[0].notes.is_none());
        assert!(!approved.ends_estimate_edit);
        assert!(approved.snapshot.return_details.is_none());

        let revised = apply_transition(
            &at(ReturnedByRepairShop),
            Action::ReviseEstimate,
            UserRole::Adjuster,
            "hours adjusted",
            &ctx,
        )
        .unwrap();
        assert_eq!(revised.snapshot.status, EstimateRevisedByAdjuster);
        assert_eq!(revised.snapshot.adjuster_note, "hours adjusted");
        assert_eq!(
            revised.snapshot.adjuster_approval.as_ref().unwrap().approval_type,
            ApprovalType::Revised
        );
        assert!(revised.ends_estimate_edit);
    }

    #[test]
    fn test_live_history_is_newest_first() {
        let clock = clock();
        let roster = Roster::default();
        let ctx = TransitionContext::new(&clock, &roster);

        let s = at(AiEstimateSuggested);
        let s = apply_transition(&s, Action::ForwardToAdjuster, UserRole::Agent, "", &ctx)
            .unwrap()
            .snapshot;
        let s = apply_transition(&s, Action::AddNote, UserRole::Adjuster, "looking", &ctx)
            .unwrap()
            .snapshot;
        let s = apply_transition(&s, Action::ApproveEstimate, UserRole::Adjuster, "ok", &ctx)
            .unwrap()
            .snapshot;

        assert_eq!(s.history.len(), 3);
        assert_eq!(s.history[0].action, "Estimate Approved");
        assert_eq!(s.history[2].action, "Forwarded to Adjuster");
        assert!(is_sorted(&s.history, HistoryOrder::Descending));
    }

    #[test]
    fn test_add_note_blocked_when_closed() {
        assert!(available_actions(ClaimClosed, UserRole::Agent).is_empty());
        assert_eq!(
            available_actions(RepairComplete, UserRole::Agent),
            vec![Action::CloseClaim, Action::AddNote]
        );
        assert_eq!(
            available_actions(RoutedToRepairShop, UserRole::RepairShop),
            vec![Action::AcceptJob, Action::ReturnToAdjuster, Action::AddNote]
        );
    }
}
