// SPDX-License-Identifier: PMPL-1.0-or-later
//! Patterns over tabular and graph query results.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use termview_frame::{normalize_variable, Namespaces, VARIABLE_PREFIX};

use crate::comparison::NumberTest;
use crate::constraint::Constraint;
use crate::pattern::{test_value, Scope, TerminusPattern};

/// One result row: variable name to JSON-LD value.
pub type Row = Map<String, Value>;

/// Value of `variable` in a row, whatever form the row keys use.
pub fn row_value<'a>(row: &'a Row, variable: &str) -> Option<&'a Value> {
    let name = normalize_variable(variable);
    row.get(&name)
        .or_else(|| row.get(&format!("{VARIABLE_PREFIX}{name}")))
        .or_else(|| {
            Namespaces::standard_ref()
                .iri("v")
                .and_then(|iri| row.get(&format!("{iri}{name}")))
        })
}

/// A pattern over rows, columns, cells, graph nodes and edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WoqlPattern {
    #[serde(flatten)]
    pub basics: TerminusPattern,
    /// Columns (or node variables) the pattern is limited to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,
    /// Per-variable value tests; all must hold.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", serialize_with = "serialize_constraints")]
    pub constraints: BTreeMap<String, Vec<Constraint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rownum: Option<NumberTest>,
}

/// Predicates cannot be written out; variables left without constraints are dropped.
fn serialize_constraints<S: Serializer>(
    constraints: &BTreeMap<String, Vec<Constraint>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let kept: Vec<(&String, Vec<&Constraint>)> = constraints
        .iter()
        .map(|(var, list)| (var, list.iter().filter(|c| c.is_serializable()).collect::<Vec<_>>()))
        .filter(|(_, list)| !list.is_empty())
        .collect();
    let mut map = serializer.serialize_map(Some(kept.len()))?;
    for (var, list) in kept {
        map.serialize_entry(var, &list)?;
    }
    map.end()
}

impl WoqlPattern {
    fn scope_is(&self, scope: Scope) -> bool {
        self.basics.scope.map_or(true, |own| own.accepts(scope))
    }

    fn limits_to(&self, key: &str) -> bool {
        let key = normalize_variable(key);
        self.variables.is_empty() || self.variables.iter().any(|v| *v == key)
    }

    fn rownum_matches(&self, rownum: usize) -> bool {
        self.rownum.as_ref().map_or(true, |test| test.matches(rownum as f64))
    }

    /// Every per-variable constraint holds on `row`.
    pub fn test_variable_constraints(&self, row: &Row) -> bool {
        self.constraints.iter().all(|(var, list)| match row_value(row, var) {
            Some(value) => list.iter().all(|c| test_value(value, c)),
            None => false,
        })
    }

    pub fn match_row(&self, row: &Row, rownum: usize) -> bool {
        self.rownum_matches(rownum) && self.scope_is(Scope::Row) && self.test_variable_constraints(row)
    }

    /// Column patterns must be scoped `column` explicitly.
    pub fn match_column(&self, key: &str) -> bool {
        self.basics.scope == Some(Scope::Column) && self.limits_to(key)
    }

    /// A cell is tested under `column` scope; patterns scoped `cell` are accepted too.
    pub fn match_cell(&self, row: &Row, key: &str, rownum: usize) -> bool {
        if !self.rownum_matches(rownum) {
            return false;
        }
        let scope = if self.basics.scope == Some(Scope::Cell) {
            Scope::Cell
        } else {
            Scope::Column
        };
        let value = row_value(row, key).unwrap_or(&Value::Null);
        self.basics.test_basics(scope, value) && self.limits_to(key) && self.test_variable_constraints(row)
    }

    pub fn match_node(&self, row: &Row, key: &str, nid: Option<usize>) -> bool {
        if let Some(nid) = nid {
            if !self.rownum_matches(nid) {
                return false;
            }
        }
        let value = row_value(row, key).unwrap_or(&Value::Null);
        self.basics.test_basics(Scope::Node, value) && self.limits_to(key) && self.test_variable_constraints(row)
    }

    /// Edge between the nodes bound to `source` and `target`.
    pub fn match_pair(&self, row: &Row, source: &str, target: &str) -> bool {
        if !self.scope_is(Scope::Edge) {
            return false;
        }
        if let Some(own) = &self.source {
            if normalize_variable(own) != normalize_variable(source) {
                return false;
            }
        }
        if let Some(own) = &self.target {
            if normalize_variable(own) != normalize_variable(target) {
                return false;
            }
        }
        self.test_variable_constraints(row)
    }
}

impl fmt::Display for WoqlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if !self.variables.is_empty() {
            let vars: Vec<String> = self.variables.iter().map(|v| format!("'{v}'")).collect();
            let _ = write!(out, ".vars({})", vars.join(", "));
        }
        self.basics.write_basics(&mut out);
        if self.source.is_some() || self.target.is_some() {
            let _ = write!(
                out,
                ".edge('{}', '{}')",
                self.source.as_deref().unwrap_or_default(),
                self.target.as_deref().unwrap_or_default()
            );
        }
        if let Some(rownum) = &self.rownum {
            let _ = write!(out, ".rownum({rownum})");
        }
        for (var, list) in &self.constraints {
            let _ = write!(out, ".v('{var}')");
            for constraint in list {
                match constraint {
                    Constraint::OneOf(_) => {
                        let _ = write!(out, ".in({constraint})");
                    }
                    Constraint::Test(_) => out.push_str(".filter(<fn>)"),
                }
            }
        }
        f.write_str(out.trim_start_matches('.'))
    }
}
