/// Claim Engine — Configuration Values
///
/// Rates and display names are data injected by the host, with the demo
/// values as defaults.

use serde::{Deserialize, Serialize};

use crate::domain::UserRole;

/// Per-hour rates applied to a blank estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateCard {
    pub body: f64,
    pub paint: f64,
    pub materials_paint: f64,
}

impl Default for RateCard {
    fn default() -> Self {
        Self {
            body: 95.0,
            paint: 95.0,
            materials_paint: 45.0,
        }
    }
}

/// Display names recorded in history for each acting role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Roster {
    pub agent: String,
    pub adjuster: String,
    pub repair_shop: String,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            agent: "Alex Chen, Agent".to_string(),
            adjuster: "Jane Mitchell, Adjuster".to_string(),
            repair_shop: "Rivera Auto Body".to_string(),
        }
    }
}

impl Roster {
    pub fn display_name(&self, role: UserRole) -> &str {
        match role {
            UserRole::Agent => &self.agent,
            UserRole::Adjuster => &self.adjuster,
            UserRole::RepairShop => &self.repair_shop,
        }
    }
}
