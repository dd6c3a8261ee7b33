// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rules over query results: a [`WoqlPattern`] plus the effects it applies.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use termview_frame::{normalize_variable, EffectKey, Effects};

use crate::comparison::NumberTest;
use crate::constraint::Constraint;
use crate::error::Result;
use crate::pattern::Scope;
use crate::woql_pattern::{Row, WoqlPattern};

/// A table/graph rule.
///
/// Built fluently:
///
/// ```
/// use termview_frame::Effects;
/// use termview_rules::WoqlRule;
///
/// let rule = WoqlRule::new()
///     .row()
///     .v("status")
///     .in_values(["active", "pending"])
///     .with_effects(Effects::new().color([0, 160, 0]));
/// assert_eq!(rule.pattern().constraints["status"].len(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WoqlRule {
    #[serde(default)]
    pub pattern: WoqlPattern,
    #[serde(default)]
    pub rule: Effects,
    /// Variables the next `in_values`/`filter` call applies to.
    #[serde(skip)]
    current_variables: Vec<String>,
}

impl PartialEq for WoqlRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.rule == other.rule
    }
}

fn normalized<I, S>(vars: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    vars.into_iter().map(|v| normalize_variable(v.as_ref())).collect()
}

impl WoqlRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(&self) -> &WoqlPattern {
        &self.pattern
    }

    pub fn effects(&self) -> &Effects {
        &self.rule
    }

    pub fn current_variables(&self) -> &[String] {
        &self.current_variables
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.pattern.basics.scope = Some(scope);
        self
    }

    pub fn row(self) -> Self {
        self.scope(Scope::Row)
    }

    pub fn column<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scope(Scope::Column).vars(columns)
    }

    pub fn cell<I, S>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scope(Scope::Cell).vars(columns)
    }

    pub fn node<I, S>(self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scope(Scope::Node).vars(nodes)
    }

    /// Edge scope between two node variables; constraints then apply to the target.
    pub fn edge(mut self, source: Option<&str>, target: Option<&str>) -> Self {
        self = self.scope(Scope::Edge);
        if let Some(source) = source {
            let source = normalize_variable(source);
            self.pattern.variables = vec![source.clone()];
            self.current_variables = vec![source.clone()];
            self.pattern.source = Some(source);
        }
        if let Some(target) = target {
            let target = normalize_variable(target);
            if source.is_none() {
                self.pattern.variables = vec![target.clone()];
            }
            self.current_variables = vec![target.clone()];
            self.pattern.target = Some(target);
        }
        self
    }

    /// Limit the pattern to these variables and make them current.
    pub fn vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.pattern.variables = normalized(vars);
        self.current_variables = self.pattern.variables.clone();
        self
    }

    /// Make one variable current without limiting the pattern to it.
    pub fn v(mut self, var: &str) -> Self {
        self.current_variables = vec![normalize_variable(var)];
        self
    }

    pub fn rownum(mut self, test: impl Into<NumberTest>) -> Self {
        self.pattern.rownum = Some(test.into());
        self
    }

    pub fn literal(mut self, literal: bool) -> Self {
        self.pattern.basics.literal = Some(literal);
        self
    }

    pub fn type_<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pattern.basics.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn value(mut self, constraint: Constraint) -> Self {
        self.pattern.basics.value = Some(constraint);
        self
    }

    fn constrain(mut self, constraint: Constraint) -> Self {
        let targets = if self.current_variables.is_empty() {
            self.pattern.variables.clone()
        } else {
            self.current_variables.clone()
        };
        for var in targets {
            self.pattern.constraints.entry(var).or_default().push(constraint.clone());
        }
        self
    }

    /// Current variables must take one of `values`. Calls accumulate as AND.
    pub fn in_values<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constrain(Constraint::one_of(values))
    }

    /// Current variables must pass `test`. Calls accumulate as AND.
    pub fn filter<F>(self, test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.constrain(Constraint::test(test))
    }

    pub fn with_effects(mut self, effects: Effects) -> Self {
        self.rule = effects;
        self
    }

    pub fn effects_mut(&mut self) -> &mut Effects {
        &mut self.rule
    }

    fn wants(&self, action: Option<EffectKey>) -> bool {
        action.map_or(true, |key| self.rule.has(key))
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Replace the pattern with one read from JSON.
    pub fn set_pattern(&mut self, pattern: &Value) -> Result<()> {
        self.pattern = serde_json::from_value(pattern.clone())?;
        self.current_variables.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rule-list matching. `action` keeps only rules whose effects set it.
    // ------------------------------------------------------------------

    pub fn match_row<'r>(
        rules: &'r [WoqlRule],
        row: &Row,
        rownum: usize,
        action: Option<EffectKey>,
    ) -> Vec<&'r WoqlRule> {
        rules
            .iter()
            .filter(|r| r.wants(action) && r.pattern.match_row(row, rownum))
            .collect()
    }

    pub fn match_column<'r>(rules: &'r [WoqlRule], key: &str, action: Option<EffectKey>) -> Vec<&'r WoqlRule> {
        rules
            .iter()
            .filter(|r| r.wants(action) && r.pattern.match_column(key))
            .collect()
    }

    pub fn match_cell<'r>(
        rules: &'r [WoqlRule],
        row: &Row,
        key: &str,
        rownum: usize,
        action: Option<EffectKey>,
    ) -> Vec<&'r WoqlRule> {
        rules
            .iter()
            .filter(|r| r.wants(action) && r.pattern.match_cell(row, key, rownum))
            .collect()
    }

    pub fn match_node<'r>(
        rules: &'r [WoqlRule],
        row: &Row,
        key: &str,
        nid: Option<usize>,
        action: Option<EffectKey>,
    ) -> Vec<&'r WoqlRule> {
        rules
            .iter()
            .filter(|r| r.wants(action) && r.pattern.match_node(row, key, nid))
            .collect()
    }

    pub fn match_pair<'r>(
        rules: &'r [WoqlRule],
        row: &Row,
        source: &str,
        target: &str,
        action: Option<EffectKey>,
    ) -> Vec<&'r WoqlRule> {
        rules
            .iter()
            .filter(|r| r.wants(action) && r.pattern.match_pair(row, source, target))
            .collect()
    }

    /// Fold the effects of matched rules; later rules win per key.
    pub fn fold_effects<'r, I>(matches: I) -> Effects
    where
        I: IntoIterator<Item = &'r WoqlRule>,
    {
        Effects::fold(matches.into_iter().map(|r| &r.rule))
    }
}

impl fmt::Display for WoqlRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let effects = serde_json::to_string(&self.rule).map_err(|_| fmt::Error)?;
        write!(f, "{} => {}", self.pattern, effects)
    }
}
