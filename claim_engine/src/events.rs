/// Claim Engine — Action Definitions
///
/// Actions are pure data. They name intent only; what an action is
/// allowed to do lives in the transition table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{ClaimSnapshot, UserRole};

/// A role-initiated operation on a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ForwardToAdjuster,
    ResubmitToAdjuster,
    ApproveEstimate,
    ReviseEstimate,
    RequestInformation,
    RouteToShop,
    AcceptJob,
    CompleteRepair,
    ReturnToAdjuster,
    CloseClaim,
    AddNote,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::ForwardToAdjuster,
        Action::ResubmitToAdjuster,
        Action::ApproveEstimate,
        Action::ReviseEstimate,
        Action::RequestInformation,
        Action::RouteToShop,
        Action::AcceptJob,
        Action::CompleteRepair,
        Action::ReturnToAdjuster,
        Action::CloseClaim,
        Action::AddNote,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Action::ForwardToAdjuster => "forward_to_adjuster",
            Action::ResubmitToAdjuster => "resubmit_to_adjuster",
            Action::ApproveEstimate => "approve_estimate",
            Action::ReviseEstimate => "revise_estimate",
            Action::RequestInformation => "request_information",
            Action::RouteToShop => "route_to_shop",
            Action::AcceptJob => "accept_job",
            Action::CompleteRepair => "complete_repair",
            Action::ReturnToAdjuster => "return_to_adjuster",
            Action::CloseClaim => "close_claim",
            Action::AddNote => "add_note",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    pub snapshot: ClaimSnapshot,
    /// The role the workflow hands control to next.
    pub next_active_role: UserRole,
    /// Whether an open estimate edit is closed by this transition.
    pub ends_estimate_edit: bool,
    /// Id of the history event the transition appended.
    pub event_id: String,
}
