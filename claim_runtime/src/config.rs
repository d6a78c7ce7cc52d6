//! Session configuration, loadable from TOML.
//!
//! ```toml
//! claim_id = "CL-CAZ8WZEF"
//! initial_role = "agent"
//!
//! [rates]
//! body = 95.0
//!
//! [roster]
//! adjuster = "Sam Ortiz, Adjuster"
//! ```
//!
//! Every key is optional; missing keys take the demo defaults.

use serde::{Deserialize, Serialize};

use claim_engine::config::{RateCard, Roster};
use claim_engine::domain::UserRole;
use claim_engine::state::DEFAULT_CLAIM_ID;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub claim_id: String,
    pub initial_role: UserRole,
    pub rates: RateCard,
    pub roster: Roster,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            claim_id: DEFAULT_CLAIM_ID.to_string(),
            initial_role: UserRole::Agent,
            rates: RateCard::default(),
            roster: Roster::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}
