// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rules over frame trees: a [`FramePattern`] plus the effects it applies.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use termview_frame::{EffectKey, Effects, FrameId, FrameTree};

use crate::error::Result;
use crate::frame_pattern::FramePattern;

/// A frame rule. The default (empty) pattern matches every frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRule {
    #[serde(default)]
    pub pattern: FramePattern,
    #[serde(default)]
    pub rule: Effects,
}

impl FrameRule {
    pub fn new(pattern: FramePattern) -> Self {
        Self {
            pattern,
            rule: Effects::default(),
        }
    }

    pub fn with_effects(mut self, effects: Effects) -> Self {
        self.rule = effects;
        self
    }

    pub fn pattern(&self) -> &FramePattern {
        &self.pattern
    }

    pub fn effects(&self) -> &Effects {
        &self.rule
    }

    pub fn matches(&self, tree: &FrameTree, id: FrameId) -> bool {
        self.pattern.check_frame(tree, id)
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn set_pattern(&mut self, pattern: &Value) -> Result<()> {
        self.pattern = serde_json::from_value(pattern.clone())?;
        Ok(())
    }

    /// Rules whose pattern matches frame `id`, in list order.
    pub fn test_rules<'r>(rules: &'r [FrameRule], tree: &FrameTree, id: FrameId) -> Vec<&'r FrameRule> {
        rules.iter().filter(|r| r.matches(tree, id)).collect()
    }

    /// Like [`FrameRule::test_rules`], keeping only rules that set `action`.
    pub fn test_rules_for<'r>(
        rules: &'r [FrameRule],
        tree: &FrameTree,
        id: FrameId,
        action: EffectKey,
    ) -> Vec<&'r FrameRule> {
        rules
            .iter()
            .filter(|r| r.rule.has(action) && r.matches(tree, id))
            .collect()
    }

    /// Fold the effects of matched rules; later rules win per key.
    pub fn fold_effects<'r, I>(matches: I) -> Effects
    where
        I: IntoIterator<Item = &'r FrameRule>,
    {
        Effects::fold(matches.into_iter().map(|r| &r.rule))
    }
}

impl fmt::Display for FrameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let effects = serde_json::to_string(&self.rule).map_err(|_| fmt::Error)?;
        write!(f, "{} => {}", self.pattern, effects)
    }
}
