// SPDX-License-Identifier: PMPL-1.0-or-later
//! Frame tree configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// How `is_updated` is decided for property frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateTracking {
    /// Compare current extracted values with the values seen at load time.
    #[default]
    Compare,
    /// Every property frame reports itself as updated.
    Always,
}

/// Configuration for a [`FrameTree`](crate::FrameTree).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Prefixes added on top of the standard ones (e.g. `scm`, `doc`).
    pub prefixes: BTreeMap<String, String>,
    /// Values created per property by `fill_from_schema` when the schema
    /// gives no minimum cardinality.
    pub default_min_values: u32,
    /// Nesting depth beyond which `fill_from_schema` stops creating objects.
    pub max_fill_depth: usize,
    pub update_tracking: UpdateTracking,
    /// Drop repeated identical values when extracting a property.
    pub dedupe_extracted: bool,
}

impl FrameConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FrameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), iri.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_fill_depth == 0 {
            return Err(FrameError::InvalidConfig("max_fill_depth must be at least 1".into()));
        }
        if let Some((prefix, _)) = self.prefixes.iter().find(|(p, iri)| p.is_empty() || iri.is_empty()) {
            return Err(FrameError::InvalidConfig(format!("empty prefix mapping '{prefix}'")));
        }
        Ok(())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            prefixes: BTreeMap::new(),
            default_min_values: 1,
            max_fill_depth: 8,
            update_tracking: UpdateTracking::Compare,
            dedupe_extracted: true,
        }
    }
}
