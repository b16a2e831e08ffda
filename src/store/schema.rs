use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::session::workout::PlanTemplate;

pub const SCHEMA_VERSION: u32 = 1;

/// All weekly templates of one user, keyed by lower-cased weekday.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlansData {
    pub schema_version: u32,
    #[serde(default)]
    pub plans: BTreeMap<String, PlanTemplate>,
}

impl Default for PlansData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            plans: BTreeMap::new(),
        }
    }
}

impl PlansData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
