/// Claim Engine — Core Domain Types
///
/// Pure data. No behaviour, no transition logic.
/// Field names serialize in camelCase so snapshots and script patches
/// share one wire shape with the presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ── Status & Roles ─────────────────────────────────────────────────

/// The closed set of lifecycle states a claim moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    #[serde(rename = "Claim Created")]
    ClaimCreated,
    #[serde(rename = "AI Estimate Suggested")]
    AiEstimateSuggested,
    #[serde(rename = "Pending Adjuster Review")]
    PendingAdjusterReview,
    #[serde(rename = "Returned to Agent")]
    ReturnedToAgent,
    #[serde(rename = "Estimate Revised by Adjuster")]
    EstimateRevisedByAdjuster,
    #[serde(rename = "Adjustor Approved")]
    AdjustorApproved,
    #[serde(rename = "Routed to Repair Shop")]
    RoutedToRepairShop,
    #[serde(rename = "Returned by Repair Shop")]
    ReturnedByRepairShop,
    #[serde(rename = "Repair In Progress")]
    RepairInProgress,
    #[serde(rename = "Repair Complete")]
    RepairComplete,
    #[serde(rename = "Claim Closed")]
    ClaimClosed,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 11] = [
        ClaimStatus::ClaimCreated,
        ClaimStatus::AiEstimateSuggested,
        ClaimStatus::PendingAdjusterReview,
        ClaimStatus::ReturnedToAgent,
        ClaimStatus::EstimateRevisedByAdjuster,
        ClaimStatus::AdjustorApproved,
        ClaimStatus::RoutedToRepairShop,
        ClaimStatus::ReturnedByRepairShop,
        ClaimStatus::RepairInProgress,
        ClaimStatus::RepairComplete,
        ClaimStatus::ClaimClosed,
    ];

    /// Display label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            ClaimStatus::ClaimCreated => "Claim Created",
            ClaimStatus::AiEstimateSuggested => "AI Estimate Suggested",
            ClaimStatus::PendingAdjusterReview => "Pending Adjuster Review",
            ClaimStatus::ReturnedToAgent => "Returned to Agent",
            ClaimStatus::EstimateRevisedByAdjuster => "Estimate Revised by Adjuster",
            ClaimStatus::AdjustorApproved => "Adjustor Approved",
            ClaimStatus::RoutedToRepairShop => "Routed to Repair Shop",
            ClaimStatus::ReturnedByRepairShop => "Returned by Repair Shop",
            ClaimStatus::RepairInProgress => "Repair In Progress",
            ClaimStatus::RepairComplete => "Repair Complete",
            ClaimStatus::ClaimClosed => "Claim Closed",
        }
    }

    /// Parse a display label back into a status.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five coarse milestones a claim progresses through. Several
/// statuses share a stage; stages are ordered by lifecycle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifecycleStage {
    #[serde(rename = "Claim Created")]
    ClaimCreated,
    #[serde(rename = "AI Estimate")]
    AiEstimate,
    #[serde(rename = "Adjuster Approval")]
    AdjusterApproval,
    #[serde(rename = "Repair")]
    Repair,
    #[serde(rename = "Claim Closed")]
    ClaimClosed,
}

impl LifecycleStage {
    pub const ALL: [LifecycleStage; 5] = [
        LifecycleStage::ClaimCreated,
        LifecycleStage::AiEstimate,
        LifecycleStage::AdjusterApproval,
        LifecycleStage::Repair,
        LifecycleStage::ClaimClosed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LifecycleStage::ClaimCreated => "Claim Created",
            LifecycleStage::AiEstimate => "AI Estimate",
            LifecycleStage::AdjusterApproval => "Adjuster Approval",
            LifecycleStage::Repair => "Repair",
            LifecycleStage::ClaimClosed => "Claim Closed",
        }
    }

    /// Zero-based position in the lifecycle.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ClaimStatus {
    /// The milestone this status belongs to. A completed repair already
    /// counts as the closing stage, since closing is all that remains.
    pub fn stage(self) -> LifecycleStage {
        match self {
            ClaimStatus::ClaimCreated => LifecycleStage::ClaimCreated,
            ClaimStatus::AiEstimateSuggested | ClaimStatus::ReturnedToAgent => {
                LifecycleStage::AiEstimate
            }
            ClaimStatus::PendingAdjusterReview
            | ClaimStatus::EstimateRevisedByAdjuster
            | ClaimStatus::ReturnedByRepairShop
            | ClaimStatus::AdjustorApproved => LifecycleStage::AdjusterApproval,
            ClaimStatus::RoutedToRepairShop | ClaimStatus::RepairInProgress => {
                LifecycleStage::Repair
            }
            ClaimStatus::RepairComplete | ClaimStatus::ClaimClosed => LifecycleStage::ClaimClosed,
        }
    }

    /// Whether the claim is finished. Only `Claim Closed` is; `Repair
    /// Complete` shares its stage but still awaits closing.
    pub fn is_terminal(self) -> bool {
        self == ClaimStatus::ClaimClosed
    }
}

/// A human participant that can act on a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    Agent,
    Adjuster,
    RepairShop,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Agent, UserRole::Adjuster, UserRole::RepairShop];

    pub fn key(self) -> &'static str {
        match self {
            UserRole::Agent => "agent",
            UserRole::Adjuster => "adjuster",
            UserRole::RepairShop => "repairShop",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.key() == key)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Who a history event is attributed to: a participant or the scripted assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventRole {
    #[serde(rename = "agent")]
    Agent,
    #[serde(rename = "adjuster")]
    Adjuster,
    #[serde(rename = "repairShop")]
    RepairShop,
    #[serde(rename = "AI")]
    Ai,
}

impl From<UserRole> for EventRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Agent => EventRole::Agent,
            UserRole::Adjuster => EventRole::Adjuster,
            UserRole::RepairShop => EventRole::RepairShop,
        }
    }
}

// ── History ────────────────────────────────────────────────────────

/// One entry in a claim's history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryEvent {
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub user: String,
    pub role: EventRole,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ── Vehicle & Photos ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VehicleInfo {
    pub make_model: String,
    pub vin: String,
    pub license_plate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DamagePhoto {
    pub url: String,
    pub caption: String,
}

// ── Estimate ───────────────────────────────────────────────────────

/// Hours billed at a per-hour rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLine {
    pub hours: f64,
    pub rate: f64,
}

impl RateLine {
    pub fn cost(&self) -> f64 {
        self.hours * self.rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Part {
    pub name: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Labor {
    pub body: RateLine,
    pub paint: RateLine,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Materials {
    pub paint: RateLine,
}

/// A repair estimate. `total` is derived from the other fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimateData {
    pub parts: Vec<Part>,
    pub labor: Labor,
    pub materials: Materials,
    pub total: f64,
    pub notes: String,
    pub watermark: String,
}

// ── AI Assessment & Guidance ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidanceKind {
    #[serde(rename = "Primary Recommendation")]
    PrimaryRecommendation,
    #[serde(rename = "Secondary Option")]
    SecondaryOption,
    #[serde(rename = "Escalation Scenario")]
    EscalationScenario,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// One precomputed repair alternative attached to the AI assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GuidanceOption {
    #[serde(rename = "type")]
    pub kind: GuidanceKind,
    pub confidence: Confidence,
    pub source: String,
    pub similarity: u8,
    pub repair_type: String,
    pub description: String,
    pub justification: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<EstimateData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AiAssessment {
    pub incident_type: String,
    pub vehicle_status: String,
    pub damage_area: String,
    pub damage_description: String,
    pub suggested_repair: String,
    pub repair_match_confidence: u8,
    pub notes: String,
    pub reference: String,
    pub justification: Vec<String>,
    pub matched_guidance: Vec<GuidanceOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RepairRouting {
    pub shop_name: String,
    pub routing_status: String,
}

// ── Correspondence ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalType {
    Approved,
    Revised,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdjusterApproval {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(rename = "type")]
    pub approval_type: ApprovalType,
}

/// A note sent back down the chain, with the instant it was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReturnDetails {
    pub note: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

// ── Snapshot ───────────────────────────────────────────────────────

/// Complete claim state at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClaimSnapshot {
    pub id: String,
    pub policyholder: String,
    pub incident_date: String,
    pub location: String,
    pub status: ClaimStatus,
    pub vehicle_info: VehicleInfo,
    pub incident_description: String,
    pub damage_photos: Vec<DamagePhoto>,
    pub ai_assessment: AiAssessment,
    pub estimate: EstimateData,
    pub repair_routing: RepairRouting,
    pub adjuster_note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjuster_approval: Option<AdjusterApproval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_details: Option<ReturnDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_return_details: Option<ReturnDetails>,
    pub history: Vec<HistoryEvent>,
}
