//! Session configuration.

use declink_common::limits;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoweringOptions {
    /// Fake overrides carry value parameters without default expressions.
    pub skip_fake_override_defaults: bool,
    /// Forward override conflicts to the diagnostic sink. The fallback choice
    /// is made either way.
    pub report_override_conflicts: bool,
    /// Longest supertype chain followed before giving up.
    pub max_hierarchy_depth: usize,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            skip_fake_override_defaults: true,
            report_override_conflicts: true,
            max_hierarchy_depth: limits::MAX_HIERARCHY_DEPTH,
        }
    }
}
