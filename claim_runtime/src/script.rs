//! Script provider — the scripted transcript the replayer folds.
//!
//! A script is an ordered list of chat steps. `content` and `images`
//! are opaque to the runtime; only `update` is inspected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use claim_engine::domain::{
    AdjusterApproval, ClaimStatus, DamagePhoto, GuidanceOption, HistoryEvent, Labor, Materials,
    Part, ReturnDetails,
};

const SAMPLE_SCRIPT: &str = include_str!("../data/sample_script.json");

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Who speaks a step in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    pub role: Speaker,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<ClaimPatch>,
}

/// Partial snapshot carried by a step. Top-level fields replace;
/// nested objects merge key by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClaimPatch {
    pub status: Option<ClaimStatus>,
    pub policyholder: Option<String>,
    pub incident_date: Option<String>,
    pub location: Option<String>,
    pub incident_description: Option<String>,
    pub damage_photos: Option<Vec<DamagePhoto>>,
    pub adjuster_note: Option<String>,
    pub adjuster_approval: Option<AdjusterApproval>,
    pub return_details: Option<ReturnDetails>,
    pub shop_return_details: Option<ReturnDetails>,
    pub vehicle_info: Option<VehicleInfoPatch>,
    pub ai_assessment: Option<AiAssessmentPatch>,
    pub estimate: Option<EstimatePatch>,
    pub repair_routing: Option<RepairRoutingPatch>,
    pub history: Option<Vec<HistoryEvent>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VehicleInfoPatch {
    pub make_model: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AiAssessmentPatch {
    pub incident_type: Option<String>,
    pub vehicle_status: Option<String>,
    pub damage_area: Option<String>,
    pub damage_description: Option<String>,
    pub suggested_repair: Option<String>,
    pub repair_match_confidence: Option<u8>,
    pub notes: Option<String>,
    pub reference: Option<String>,
    pub justification: Option<Vec<String>>,
    pub matched_guidance: Option<Vec<GuidanceOption>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EstimatePatch {
    pub parts: Option<Vec<Part>>,
    pub labor: Option<Labor>,
    pub materials: Option<Materials>,
    pub total: Option<f64>,
    pub notes: Option<String>,
    pub watermark: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RepairRoutingPatch {
    pub shop_name: Option<String>,
    pub routing_status: Option<String>,
}

impl ClaimPatch {
    /// Whether this patch brings a non-empty set of guidance options.
    pub fn offers_guidance(&self) -> bool {
        self.ai_assessment
            .as_ref()
            .and_then(|ai| ai.matched_guidance.as_ref())
            .is_some_and(|g| !g.is_empty())
    }
}

/// Parse a script from its JSON form.
pub fn load_script(json: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// The bundled five-step demo transcript.
pub fn sample_script() -> Result<Vec<ScriptStep>, ScriptError> {
    load_script(SAMPLE_SCRIPT)
}
