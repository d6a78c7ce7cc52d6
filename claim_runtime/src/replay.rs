//! Replay orchestrator — rebuild a snapshot from a scripted transcript.
//!
//! Folds steps `0..=target` over a fresh blank snapshot. Each step's
//! patch is merged in order, history entries are collected across all
//! steps and sorted oldest first. Pure on its inputs: the same steps and
//! target always yield the same snapshot and hash.

use claim_engine::config::RateCard;
use claim_engine::domain::ClaimSnapshot;
use claim_engine::hashing::canonical_hash;
use claim_engine::history::{sort_history, HistoryOrder};
use claim_engine::invariants::validate_invariants;
use claim_engine::state::blank_snapshot;

use crate::script::{
    AiAssessmentPatch, ClaimPatch, EstimatePatch, RepairRoutingPatch, ScriptStep, VehicleInfoPatch,
};

/// Result of replaying a script up to some step.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub snapshot: ClaimSnapshot,
    /// `Some(0)` when any replayed step brought guidance options.
    pub selected_guidance: Option<usize>,
    /// Number of steps folded (0 for a negative target).
    pub applied_steps: usize,
}

/// Replay `steps` up to `target` over a blank snapshot with `base_id`.
pub fn replay_script(steps: &[ScriptStep], target: i64, base_id: &str) -> ReplayOutcome {
    replay_from(blank_snapshot(base_id, &RateCard::default()), steps, target)
}

/// Replay `steps` up to `target` over the given blank snapshot.
///
/// A negative target yields `blank` untouched; a target past the end
/// is clamped to the last step.
pub fn replay_from(blank: ClaimSnapshot, steps: &[ScriptStep], target: i64) -> ReplayOutcome {
    let count = clamp_target(target, steps.len());

    let mut snapshot = blank;
    let mut history = Vec::new();
    let mut offers_guidance = false;

    for step in &steps[..count] {
        let Some(patch) = &step.update else { continue };
        offers_guidance |= patch.offers_guidance();
        if let Some(events) = &patch.history {
            history.extend(events.iter().cloned());
        }
        merge_patch(&mut snapshot, patch);
    }

    sort_history(&mut history, HistoryOrder::Ascending);
    snapshot.history = history;

    if let Err(violation) = validate_invariants(&snapshot) {
        tracing::warn!(claim = %snapshot.id, %violation, "replayed snapshot violates invariants");
    }
    tracing::debug!(
        claim = %snapshot.id,
        steps = count,
        status = %snapshot.status,
        events = snapshot.history.len(),
        "script replayed"
    );

    ReplayOutcome {
        selected_guidance: offers_guidance.then_some(0),
        snapshot,
        applied_steps: count,
    }
}

/// Canonical hash of the snapshot replayed to `target`.
pub fn rebuild_hash(
    steps: &[ScriptStep],
    target: i64,
    base_id: &str,
) -> Result<String, serde_json::Error> {
    canonical_hash(&replay_script(steps, target, base_id).snapshot)
}

/// Replay the same input twice and compare hashes.
///
/// Returns the shared hash, or `None` if the two runs disagree.
pub fn verify_determinism(
    steps: &[ScriptStep],
    target: i64,
    base_id: &str,
) -> Result<Option<String>, serde_json::Error> {
    let first = rebuild_hash(steps, target, base_id)?;
    let second = rebuild_hash(steps, target, base_id)?;
    if first != second {
        tracing::warn!(%first, %second, "replay produced different hashes");
        return Ok(None);
    }
    Ok(Some(first))
}

/// Number of steps to fold for `target` over a script of `len` steps.
fn clamp_target(target: i64, len: usize) -> usize {
    if target < 0 {
        if len > 0 {
            tracing::debug!(target, len, "replay target below range, using blank snapshot");
        }
        return 0;
    }
    let wanted = usize::try_from(target).map_or(usize::MAX, |t| t.saturating_add(1));
    if wanted > len {
        tracing::debug!(target, len, "replay target past end, clamped to last step");
        return len;
    }
    wanted
}

fn merge_patch(snapshot: &mut ClaimSnapshot, patch: &ClaimPatch) {
    set(&mut snapshot.status, &patch.status);
    set(&mut snapshot.policyholder, &patch.policyholder);
    set(&mut snapshot.incident_date, &patch.incident_date);
    set(&mut snapshot.location, &patch.location);
    set(&mut snapshot.incident_description, &patch.incident_description);
    set(&mut snapshot.damage_photos, &patch.damage_photos);
    set(&mut snapshot.adjuster_note, &patch.adjuster_note);
    if let Some(approval) = &patch.adjuster_approval {
        snapshot.adjuster_approval = Some(approval.clone());
    }
    if let Some(details) = &patch.return_details {
        snapshot.return_details = Some(details.clone());
    }
    if let Some(details) = &patch.shop_return_details {
        snapshot.shop_return_details = Some(details.clone());
    }

    if let Some(p) = &patch.vehicle_info {
        merge_vehicle(snapshot, p);
    }
    if let Some(p) = &patch.ai_assessment {
        merge_assessment(snapshot, p);
    }
    if let Some(p) = &patch.estimate {
        merge_estimate(snapshot, p);
    }
    if let Some(p) = &patch.repair_routing {
        merge_routing(snapshot, p);
    }
}

fn merge_vehicle(snapshot: &mut ClaimSnapshot, p: &VehicleInfoPatch) {
    let v = &mut snapshot.vehicle_info;
    set(&mut v.make_model, &p.make_model);
    set(&mut v.vin, &p.vin);
    set(&mut v.license_plate, &p.license_plate);
}

fn merge_assessment(snapshot: &mut ClaimSnapshot, p: &AiAssessmentPatch) {
    let ai = &mut snapshot.ai_assessment;
    set(&mut ai.incident_type, &p.incident_type);
    set(&mut ai.vehicle_status, &p.vehicle_status);
    set(&mut ai.damage_area, &p.damage_area);
    set(&mut ai.damage_description, &p.damage_description);
    set(&mut ai.suggested_repair, &p.suggested_repair);
    set(&mut ai.repair_match_confidence, &p.repair_match_confidence);
    set(&mut ai.notes, &p.notes);
    set(&mut ai.reference, &p.reference);
    set(&mut ai.justification, &p.justification);
    set(&mut ai.matched_guidance, &p.matched_guidance);
}

// `labor` and `materials` replace as whole objects; `total` is stored as given.
fn merge_estimate(snapshot: &mut ClaimSnapshot, p: &EstimatePatch) {
    let e = &mut snapshot.estimate;
    set(&mut e.parts, &p.parts);
    set(&mut e.labor, &p.labor);
    set(&mut e.materials, &p.materials);
    set(&mut e.total, &p.total);
    set(&mut e.notes, &p.notes);
    set(&mut e.watermark, &p.watermark);
}

fn merge_routing(snapshot: &mut ClaimSnapshot, p: &RepairRoutingPatch) {
    let r = &mut snapshot.repair_routing;
    set(&mut r.shop_name, &p.shop_name);
    set(&mut r.routing_status, &p.routing_status);
}

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim_engine::domain::ClaimStatus;
    use crate::script::{sample_script, Speaker};

    fn step(update: Option<ClaimPatch>) -> ScriptStep {
        ScriptStep {
            role: Speaker::Assistant,
            content: String::new(),
            images: Vec::new(),
            update,
        }
    }

    #[test]
    fn test_clamp_target() {
        assert_eq!(clamp_target(-1, 5), 0);
        assert_eq!(clamp_target(0, 5), 1);
        assert_eq!(clamp_target(4, 5), 5);
        assert_eq!(clamp_target(99, 5), 5);
        assert_eq!(clamp_target(i64::MAX, 5), 5);
        assert_eq!(clamp_target(0, 0), 0);
    }

    #[test]
    fn test_negative_target_is_blank() {
        let steps = sample_script().unwrap();
        let out = replay_script(&steps, -1, "CL-1");
        assert_eq!(out.snapshot, blank_snapshot("CL-1", &RateCard::default()));
        assert_eq!(out.selected_guidance, None);
        assert_eq!(out.applied_steps, 0);
    }

    #[test]
    fn test_later_patch_wins_and_nested_fields_merge() {
        let first = ClaimPatch {
            location: Some("Tempe, AZ".to_string()),
            vehicle_info: Some(VehicleInfoPatch {
                make_model: Some("2021 Honda Civic".to_string()),
                vin: Some("VIN1".to_string()),
                license_plate: None,
            }),
            ..ClaimPatch::default()
        };
        let second = ClaimPatch {
            location: Some("Phoenix, AZ".to_string()),
            vehicle_info: Some(VehicleInfoPatch {
                license_plate: Some("ABC123".to_string()),
                ..VehicleInfoPatch::default()
            }),
            ..ClaimPatch::default()
        };
        let steps = vec![step(Some(first)), step(None), step(Some(second))];
        let out = replay_script(&steps, 2, "CL-1");
        assert_eq!(out.snapshot.location, "Phoenix, AZ");
        assert_eq!(out.snapshot.vehicle_info.make_model, "2021 Honda Civic");
        assert_eq!(out.snapshot.vehicle_info.vin, "VIN1");
        assert_eq!(out.snapshot.vehicle_info.license_plate, "ABC123");
        assert_eq!(out.snapshot.status, ClaimStatus::ClaimCreated);
    }

    #[test]
    fn test_patched_total_is_stored_verbatim() {
        let patch = ClaimPatch {
            estimate: Some(EstimatePatch {
                total: Some(1.0),
                ..EstimatePatch::default()
            }),
            ..ClaimPatch::default()
        };
        let out = replay_script(&[step(Some(patch))], 0, "CL-1");
        assert_eq!(out.snapshot.estimate.total, 1.0);
        assert_eq!(out.snapshot.estimate.labor.body.rate, 95.0);
    }
}
