//! Session manager — one claim, one explicit context object.
//!
//! The session owns the current snapshot, the active role, the selected
//! guidance option and the estimate-edit flag. Every mutation goes
//! through the kernel; a rejected operation leaves the session as it was.
//! Concurrency: `SharedSession` puts one session behind a Mutex.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use claim_engine::clock::{Clock, SystemClock};
use claim_engine::domain::{ClaimSnapshot, EstimateData, HistoryEvent, UserRole};
use claim_engine::estimate::{parse_hours, recompute_estimate, EstimateField};
use claim_engine::events::Action;
use claim_engine::guidance;
use claim_engine::hashing::canonical_hash;
use claim_engine::history::{ordered, HistoryOrder};
use claim_engine::state::blank_snapshot;
use claim_engine::transitions::{self, apply_transition, InvalidTransition, TransitionContext};

use crate::config::SessionConfig;
use crate::replay::{replay_from, ReplayOutcome};
use crate::script::ScriptStep;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateEditError {
    #[error("estimate is not in edit mode")]
    NotEditable,
}

/// An isolated claim session.
pub struct ClaimSession {
    config: SessionConfig,
    clock: Box<dyn Clock>,
    snapshot: ClaimSnapshot,
    active_role: UserRole,
    selected_guidance: Option<usize>,
    estimate_editable: bool,
}

impl ClaimSession {
    /// New session on a blank claim, stamping events with wall-clock time.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: SessionConfig, clock: Box<dyn Clock>) -> Self {
        let snapshot = blank_snapshot(&config.claim_id, &config.rates);
        Self {
            active_role: config.initial_role,
            config,
            clock,
            snapshot,
            selected_guidance: None,
            estimate_editable: false,
        }
    }

    /// Run `action` as `role`. On success the active role moves to the
    /// role the rule hands off to.
    pub fn apply(
        &mut self,
        action: Action,
        role: UserRole,
        note: &str,
    ) -> Result<&ClaimSnapshot, InvalidTransition> {
        let ctx = TransitionContext::new(self.clock.as_ref(), &self.config.roster);
        let outcome = match apply_transition(&self.snapshot, action, role, note, &ctx) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    claim = %self.snapshot.id,
                    %action,
                    %role,
                    error = %err,
                    "transition rejected"
                );
                return Err(err);
            }
        };

        self.snapshot = outcome.snapshot;
        self.active_role = outcome.next_active_role;
        if outcome.ends_estimate_edit {
            self.estimate_editable = false;
        }
        Ok(&self.snapshot)
    }

    /// Run `action` as the current active role.
    pub fn act(&mut self, action: Action, note: &str) -> Result<&ClaimSnapshot, InvalidTransition> {
        self.apply(action, self.active_role, note)
    }

    /// Choose guidance option `index`. Out-of-range or estimate-less
    /// options change nothing. Returns the selection after the call.
    pub fn select_guidance(&mut self, index: usize) -> Option<usize> {
        let ctx = TransitionContext::new(self.clock.as_ref(), &self.config.roster);
        let (next, selected) = guidance::select_guidance(
            &self.snapshot,
            self.selected_guidance,
            index,
            self.active_role,
            &ctx,
        );
        self.snapshot = next;
        self.selected_guidance = selected;
        selected
    }

    pub fn set_estimate_editable(&mut self, editable: bool) {
        self.estimate_editable = editable;
    }

    /// Set the hours on one estimate line from raw user input and
    /// recompute the total. Unparseable input counts as zero hours.
    pub fn edit_estimate(
        &mut self,
        field: EstimateField,
        raw: &str,
    ) -> Result<&EstimateData, EstimateEditError> {
        if !self.estimate_editable {
            return Err(EstimateEditError::NotEditable);
        }
        let hours = parse_hours(raw);
        self.snapshot.estimate = recompute_estimate(&self.snapshot.estimate, field, hours);
        tracing::debug!(
            claim = %self.snapshot.id,
            ?field,
            hours,
            total = self.snapshot.estimate.total,
            "estimate edited"
        );
        Ok(&self.snapshot.estimate)
    }

    /// Jump to step `target` of a script. The snapshot is rebuilt from
    /// scratch; guidance selection and edit mode reset, the active role stays.
    pub fn navigate(&mut self, steps: &[ScriptStep], target: i64) -> &ClaimSnapshot {
        let blank = blank_snapshot(&self.config.claim_id, &self.config.rates);
        let ReplayOutcome {
            snapshot,
            selected_guidance,
            ..
        } = replay_from(blank, steps, target);
        self.snapshot = snapshot;
        self.selected_guidance = selected_guidance;
        self.estimate_editable = false;
        &self.snapshot
    }

    /// Actions the active role may take in the current status.
    pub fn available_actions(&self) -> Vec<Action> {
        transitions::available_actions(self.snapshot.status, self.active_role)
    }

    pub fn history(&self, order: HistoryOrder) -> Vec<&HistoryEvent> {
        ordered(&self.snapshot.history, order)
    }

    pub fn current_hash(&self) -> Result<String, serde_json::Error> {
        canonical_hash(&self.snapshot)
    }

    pub fn snapshot(&self) -> &ClaimSnapshot {
        &self.snapshot
    }

    pub fn active_role(&self) -> UserRole {
        self.active_role
    }

    /// Switch the acting role by hand.
    pub fn set_active_role(&mut self, role: UserRole) {
        self.active_role = role;
    }

    pub fn selected_guidance(&self) -> Option<usize> {
        self.selected_guidance
    }

    pub fn estimate_editable(&self) -> bool {
        self.estimate_editable
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Thread-safe session handle using Mutex.
pub struct SharedSession {
    inner: Mutex<ClaimSession>,
}

impl SharedSession {
    pub fn new(session: ClaimSession) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    // A panic mid-operation cannot leave a half-applied snapshot behind,
    // so a poisoned lock still guards a consistent session.
    fn lock(&self) -> MutexGuard<'_, ClaimSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply under lock; returns a copy of the new snapshot.
    pub fn apply(
        &self,
        action: Action,
        role: UserRole,
        note: &str,
    ) -> Result<ClaimSnapshot, InvalidTransition> {
        self.lock().apply(action, role, note).cloned()
    }

    pub fn act(&self, action: Action, note: &str) -> Result<ClaimSnapshot, InvalidTransition> {
        self.lock().act(action, note).cloned()
    }

    pub fn select_guidance(&self, index: usize) -> Option<usize> {
        self.lock().select_guidance(index)
    }

    pub fn navigate(&self, steps: &[ScriptStep], target: i64) -> ClaimSnapshot {
        self.lock().navigate(steps, target).clone()
    }

    pub fn snapshot(&self) -> ClaimSnapshot {
        self.lock().snapshot().clone()
    }

    pub fn active_role(&self) -> UserRole {
        self.lock().active_role()
    }

    pub fn current_hash(&self) -> Result<String, serde_json::Error> {
        self.lock().current_hash()
    }

    pub fn into_inner(self) -> ClaimSession {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
