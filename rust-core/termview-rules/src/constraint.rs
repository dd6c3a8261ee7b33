// SPDX-License-Identifier: PMPL-1.0-or-later
//! Value constraints: a list of accepted values or a predicate.

use std::fmt;
use std::sync::Arc;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Predicate over an unwrapped candidate value.
pub type ValueTest = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// What a candidate value must satisfy.
///
/// `OneOf` is written as a JSON array (a single value is read as a
/// one-element list). `Test` exists only in code and serializes as `null`.
#[derive(Clone)]
pub enum Constraint {
    OneOf(Vec<Value>),
    Test(ValueTest),
}

impl Constraint {
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Constraint::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn test<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Constraint::Test(Arc::new(f))
    }

    /// Whether this constraint survives serialization.
    pub fn is_serializable(&self) -> bool {
        matches!(self, Constraint::OneOf(_))
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            Constraint::Test(_) => f.write_str("Test(<fn>)"),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::OneOf(values) => {
                let parts: Vec<String> = values.iter().map(Value::to_string).collect();
                f.write_str(&parts.join(", "))
            }
            Constraint::Test(_) => f.write_str("<fn>"),
        }
    }
}

/// Lists compare by content; predicates by identity.
impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Constraint::OneOf(a), Constraint::OneOf(b)) => a == b,
            (Constraint::Test(a), Constraint::Test(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Constraint::OneOf(values) => values.serialize(serializer),
            Constraint::Test(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Constraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(values) => Constraint::OneOf(values),
            single => Constraint::OneOf(vec![single]),
        })
    }
}

impl From<Vec<Value>> for Constraint {
    fn from(values: Vec<Value>) -> Self {
        Constraint::OneOf(values)
    }
}
