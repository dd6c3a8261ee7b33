// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule sets as authored and stored: table, graph and frame rules in one
//! JSON document.
//!
//! ```json
//! {
//!   "table": [{"pattern": {"scope": "row", "rownum": "<3"}, "rule": {"hidden": true}}],
//!   "graph": [],
//!   "frame": [{"pattern": {"scope": "data", "label": "/^Name"}, "rule": {"renderer": "String"}}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::comparison::{Comparison, NumberTest};
use crate::constraint::Constraint;
use crate::error::{Result, RuleError};
use crate::frame_pattern::FramePattern;
use crate::frame_rule::FrameRule;
use crate::pattern::{validate_regex, Scope, TerminusPattern};
use crate::woql_rule::WoqlRule;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub table: Vec<WoqlRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub graph: Vec<WoqlRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frame: Vec<FrameRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a rule set.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let set: RuleSet = serde_json::from_str(text)?;
        set.validate()?;
        debug!(
            table = set.table.len(),
            graph = set.graph.len(),
            frame = set.frame.len(),
            "Loaded rule set"
        );
        Ok(set)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let set: RuleSet = serde_json::from_reader(reader)?;
        set.validate()?;
        Ok(set)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.table.len() + self.graph.len() + self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject rules that could never be evaluated: malformed comparisons,
    /// regular expressions that do not compile, and frame patterns whose
    /// declared scope rules them out.
    pub fn validate(&self) -> Result<()> {
        for rule in self.table.iter().chain(&self.graph) {
            let pattern = rule.pattern();
            validate_basics(&pattern.basics)?;
            for list in pattern.constraints.values() {
                list.iter().try_for_each(validate_constraint)?;
            }
            if let Some(rownum) = &pattern.rownum {
                validate_number(rownum)?;
            }
        }
        for rule in &self.frame {
            validate_frame_pattern(&rule.pattern)?;
        }
        Ok(())
    }
}

fn validate_number(test: &NumberTest) -> Result<()> {
    if let NumberTest::Expr(expr) = test {
        expr.parse::<Comparison>()?;
    }
    Ok(())
}

fn validate_constraint(constraint: &Constraint) -> Result<()> {
    if let Constraint::OneOf(values) = constraint {
        for text in values.iter().filter_map(Value::as_str) {
            validate_regex(text)?;
        }
    }
    Ok(())
}

fn validate_basics(basics: &TerminusPattern) -> Result<()> {
    match &basics.value {
        Some(constraint) => validate_constraint(constraint),
        None => Ok(()),
    }
}

fn validate_frame_pattern(pattern: &FramePattern) -> Result<()> {
    validate_basics(&pattern.basics)?;
    if let Some(labels) = &pattern.label {
        labels.iter().try_for_each(|l| validate_regex(l))?;
    }
    if let Some(depth) = &pattern.depth {
        validate_number(depth)?;
    }
    match pattern.basics.scope {
        Some(Scope::Data) if !pattern.children.is_empty() => {
            return Err(RuleError::InvalidPattern("data frames have no children".to_string()));
        }
        Some(Scope::Object) if pattern.range.is_some() => {
            return Err(RuleError::InvalidPattern("object frames have no range".to_string()));
        }
        _ => {}
    }
    if let Some(parent) = &pattern.parent {
        validate_frame_pattern(parent)?;
    }
    pattern.children.iter().try_for_each(validate_frame_pattern)
}
