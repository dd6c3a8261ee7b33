// SPDX-License-Identifier: PMPL-1.0-or-later
//! Pattern primitives shared by table and frame rules.
//!
//! A [`TerminusPattern`] is a conjunction of optional tests. An unset field
//! does not constrain anything.

use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use termview_frame::Namespaces;
use tracing::{debug, warn};

use crate::comparison::{as_number, Comparison, NumberTest};
use crate::constraint::Constraint;
use crate::error::{Result, RuleError};

const REGEX_CACHE_LIMIT: usize = 256;
const SCHEMA_PREFIX: &str = "scm";
const DATATYPE_PREFIX: &str = "xsd";

/// The kind of unit a pattern applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Row,
    Column,
    Cell,
    Edge,
    Node,
    Object,
    Property,
    Data,
    /// Any frame.
    #[serde(rename = "*")]
    Any,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Row => "row",
            Scope::Column => "column",
            Scope::Cell => "cell",
            Scope::Edge => "edge",
            Scope::Node => "node",
            Scope::Object => "object",
            Scope::Property => "property",
            Scope::Data => "data",
            Scope::Any => "*",
        }
    }

    /// Whether a pattern scoped `self` accepts a unit of scope `other`.
    pub fn accepts(self, other: Scope) -> bool {
        self == Scope::Any || self == other
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "row" => Scope::Row,
            "column" => Scope::Column,
            "cell" => Scope::Cell,
            "edge" => Scope::Edge,
            "node" => Scope::Node,
            "object" => Scope::Object,
            "property" => Scope::Property,
            "data" => Scope::Data,
            "*" => Scope::Any,
            other => return Err(RuleError::InvalidPattern(format!("unknown scope '{other}'"))),
        })
    }
}

/// Optional tests shared by every pattern kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminusPattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<bool>,
    /// Accepted `@type`s.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none", with = "one_or_many")]
    pub types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "code_only")]
    pub value: Option<Constraint>,
}

fn code_only(value: &Option<Constraint>) -> bool {
    !value.as_ref().is_some_and(Constraint::is_serializable)
}

impl TerminusPattern {
    pub fn is_empty(&self) -> bool {
        self.literal.is_none() && self.types.is_none() && self.scope.is_none() && self.value.is_none()
    }

    /// Scope, declared type, literal-ness and value tests against one candidate.
    pub fn test_basics(&self, scope: Scope, value: &Value) -> bool {
        if let Some(own) = self.scope {
            if !own.accepts(scope) {
                return false;
            }
        }
        if let Some(types) = &self.types {
            let Some(declared) = value.get("@type").and_then(Value::as_str) else {
                return false;
            };
            if !types.iter().any(|t| class_ids_match(Namespaces::standard_ref(), t, declared)) {
                return false;
            }
        }
        if let Some(literal) = self.literal {
            if is_literal(value) != literal {
                return false;
            }
        }
        if let Some(constraint) = &self.value {
            if !test_value(value, constraint) {
                return false;
            }
        }
        true
    }

    /// Builder-form rendering of the set fields, e.g. `.scope('row').literal(true)`.
    pub(crate) fn write_basics(&self, out: &mut String) {
        if let Some(scope) = self.scope {
            let _ = write!(out, ".scope('{scope}')");
        }
        if let Some(literal) = self.literal {
            let _ = write!(out, ".literal({literal})");
        }
        if let Some(types) = &self.types {
            let quoted: Vec<String> = types.iter().map(|t| format!("'{t}'")).collect();
            let _ = write!(out, ".type({})", quoted.join(", "));
        }
        if let Some(value) = &self.value {
            let _ = write!(out, ".value({value})");
        }
    }
}

/// Whether a JSON-LD value is a `@value` literal.
pub fn is_literal(value: &Value) -> bool {
    value.get("@value").is_some()
}

/// The bare scalar of a JSON-LD literal or reference.
pub fn unwrap_value(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map.get("@value").or_else(|| map.get("@id")).unwrap_or(value),
        other => other,
    }
}

/// Test a candidate against a constraint.
///
/// Predicates get the unwrapped value. Lists match if any element
/// string-matches or number-matches the unwrapped value.
pub fn test_value(value: &Value, constraint: &Constraint) -> bool {
    let value = unwrap_value(value);
    match constraint {
        Constraint::Test(f) => f(value),
        Constraint::OneOf(accepted) => accepted
            .iter()
            .any(|c| string_match(c, value) || number_match(c, value)),
    }
}

/// `/`-prefixed constraints are regular expressions, anything else must be equal.
pub fn string_match(constraint: &Value, candidate: &Value) -> bool {
    let Value::String(constraint) = constraint else {
        return false;
    };
    if let Some(expr) = constraint.strip_prefix('/') {
        let expr = expr.strip_suffix('/').unwrap_or(expr);
        let text = match candidate {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return false,
        };
        return with_regex(expr, |re| re.is_match(&text));
    }
    candidate.as_str() == Some(constraint.as_str())
}

/// Bare numbers must be equal; operator strings (`">45"`) are comparisons.
pub fn number_match(constraint: &Value, candidate: &Value) -> bool {
    match constraint {
        Value::Number(n) => match (n.as_f64(), as_number(candidate)) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => false,
        },
        Value::String(expr) if Comparison::looks_like(expr) => {
            NumberTest::Expr(expr.clone()).matches_value(candidate)
        }
        Value::Bool(_) => constraint == candidate,
        _ => false,
    }
}

fn with_regex(expr: &str, f: impl FnOnce(&Regex) -> bool) -> bool {
    static CACHE: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let Ok(mut cache) = cache.lock() else {
        warn!("Regex cache poisoned; no match");
        return false;
    };
    if let Some(re) = cache.get(expr) {
        return f(re);
    }
    match Regex::new(expr) {
        Ok(re) => {
            if cache.len() >= REGEX_CACHE_LIMIT {
                cache.clear();
            }
            let matched = f(&re);
            cache.insert(expr.to_string(), re);
            matched
        }
        Err(e) => {
            debug!(pattern = %expr, error = %e, "Invalid regular expression; no match");
            false
        }
    }
}

/// Check that a `/`-prefixed constraint compiles.
pub fn validate_regex(constraint: &str) -> Result<()> {
    if let Some(expr) = constraint.strip_prefix('/') {
        let expr = expr.strip_suffix('/').unwrap_or(expr);
        Regex::new(expr).map_err(|source| RuleError::InvalidRegex {
            pattern: constraint.to_string(),
            source,
        })?;
    }
    Ok(())
}

fn with_default_prefix(id: &str, prefix: &str) -> String {
    if id.contains(':') {
        id.to_string()
    } else {
        format!("{prefix}:{id}")
    }
}

/// Identifier equality under prefix expansion.
pub fn ids_match(ns: &Namespaces, a: &str, b: &str) -> bool {
    ns.ids_match(a, b)
}

/// Class ids; a bare name is read as a schema id.
pub fn class_ids_match(ns: &Namespaces, a: &str, b: &str) -> bool {
    ns.ids_match(&with_default_prefix(a, SCHEMA_PREFIX), &with_default_prefix(b, SCHEMA_PREFIX))
}

/// Property ids; a bare name is read as a schema id.
pub fn property_ids_match(ns: &Namespaces, a: &str, b: &str) -> bool {
    class_ids_match(ns, a, b)
}

/// Ranges are classes or datatypes; a bare name may be either.
pub fn range_ids_match(ns: &Namespaces, a: &str, b: &str) -> bool {
    class_ids_match(ns, a, b)
        || ns.ids_match(&with_default_prefix(a, DATATYPE_PREFIX), &with_default_prefix(b, DATATYPE_PREFIX))
}

/// Serde helper accepting a single string or a list of strings.
pub(crate) mod one_or_many {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S: Serializer>(value: &Option<Vec<String>>, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
        Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(|v| match v {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(list) => list,
        }))
    }
}
