/// Claim Engine — State Construction

use crate::config::RateCard;
use crate::domain::{
    AiAssessment, ClaimSnapshot, ClaimStatus, EstimateData, Labor, Materials, RateLine,
    RepairRouting, VehicleInfo,
};

/// Identifier given to the demo claim when the host supplies none.
pub const DEFAULT_CLAIM_ID: &str = "CL-CAZ8WZEF";

/// Routing status of a claim that has not been sent to a shop.
pub const NOT_YET_ROUTED: &str = "Not Yet Routed";

/// Create a fresh, empty snapshot: empty strings, zero hours, the given rates.
pub fn blank_snapshot(id: &str, rates: &RateCard) -> ClaimSnapshot {
    ClaimSnapshot {
        id: id.to_string(),
        policyholder: String::new(),
        incident_date: String::new(),
        location: String::new(),
        status: ClaimStatus::ClaimCreated,
        vehicle_info: VehicleInfo::default(),
        incident_description: String::new(),
        damage_photos: Vec::new(),
        ai_assessment: AiAssessment::default(),
        estimate: blank_estimate(rates),
        repair_routing: RepairRouting {
            shop_name: String::new(),
            routing_status: NOT_YET_ROUTED.to_string(),
        },
        adjuster_note: String::new(),
        adjuster_approval: None,
        return_details: None,
        shop_return_details: None,
        history: Vec::new(),
    }
}

/// Zero-hour estimate carrying the rate card.
pub fn blank_estimate(rates: &RateCard) -> EstimateData {
    EstimateData {
        parts: Vec::new(),
        labor: Labor {
            body: RateLine { hours: 0.0, rate: rates.body },
            paint: RateLine { hours: 0.0, rate: rates.paint },
        },
        materials: Materials {
            paint: RateLine { hours: 0.0, rate: rates.materials_paint },
        },
        total: 0.0,
        notes: String::new(),
        watermark: String::new(),
    }
}
