// SPDX-License-Identifier: PMPL-1.0-or-later
//! Cardinality restrictions.
//!
//! A [`Restriction`] bounds how many values a property may carry. Zero means
//! "unconstrained" for either bound. Several restrictions on the same
//! property combine by AND: the tightest non-zero bound wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// A `{min, max}` cardinality bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Restriction {
    #[serde(default)]
    pub min: u32,
    #[serde(default)]
    pub max: u32,
}

impl Restriction {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Exactly `n` values.
    pub fn exactly(n: u32) -> Self {
        Self { min: n, max: n }
    }

    /// True if either bound is set.
    pub fn has_card_restriction(&self) -> bool {
        self.min != 0 || self.max != 0
    }

    /// AND-combine two restrictions.
    pub fn and(self, other: Restriction) -> Restriction {
        let max = match (self.max, other.max) {
            (0, m) | (m, 0) => m,
            (a, b) => a.min(b),
        };
        Restriction {
            min: self.min.max(other.min),
            max,
        }
    }

    /// AND-combine any number of restrictions.
    pub fn combine<I>(restrictions: I) -> Restriction
    where
        I: IntoIterator<Item = Restriction>,
    {
        restrictions
            .into_iter()
            .fold(Restriction::default(), Restriction::and)
    }

    /// Whether a property holding `count` values satisfies this restriction.
    pub fn allows_count(&self, count: usize) -> bool {
        let count = count as u64;
        (self.min == 0 || count >= u64::from(self.min))
            && (self.max == 0 || count <= u64::from(self.max))
    }

    /// Read a restriction from its class-frame representation.
    ///
    /// Accepts `"none"`/`null`, `{min, max}`, the OWL-style
    /// `cardinality`/`minCardinality`/`maxCardinality` keys, and
    /// `{"type": "and", "operands": [...]}` which is AND-merged.
    pub fn from_json(value: &Value) -> Result<Restriction, SchemaError> {
        match value {
            Value::Null => Ok(Restriction::default()),
            Value::String(s) if s == "none" => Ok(Restriction::default()),
            Value::Array(items) => items
                .iter()
                .map(Restriction::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Restriction::combine),
            Value::Object(map) => {
                if map.get("type").and_then(Value::as_str) == Some("and") {
                    let operands = map.get("operands").ok_or_else(|| {
                        SchemaError::InvalidRestriction("'and' restriction without operands".into())
                    })?;
                    return Restriction::from_json(operands);
                }
                let mut parts = Vec::new();
                for (key, raw) in map {
                    let read = |raw: &Value| {
                        as_count(raw).ok_or_else(|| {
                            SchemaError::InvalidRestriction(format!("{key} is not a count: {raw}"))
                        })
                    };
                    match key.as_str() {
                        "min" | "minCardinality" => parts.push(Restriction::new(read(raw)?, 0)),
                        "max" | "maxCardinality" => parts.push(Restriction::new(0, read(raw)?)),
                        "cardinality" => parts.push(Restriction::exactly(read(raw)?)),
                        _ => {}
                    }
                }
                Ok(Restriction::combine(parts))
            }
            other => Err(SchemaError::InvalidRestriction(other.to_string())),
        }
    }
}

fn as_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get("@value").and_then(as_count),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_and_merge_takes_tightest_bounds() {
        let merged = Restriction::new(1, 0).and(Restriction::new(0, 3));
        assert_eq!(merged, Restriction::new(1, 3));

        let merged = Restriction::new(0, 2).and(Restriction::new(0, 5));
        assert_eq!(merged, Restriction::new(0, 2));

        let merged = Restriction::combine([
            Restriction::new(1, 0),
            Restriction::new(2, 9),
            Restriction::new(0, 4),
        ]);
        assert_eq!(merged, Restriction::new(2, 4));
    }

    #[test]
    fn test_has_card_restriction() {
        assert!(!Restriction::default().has_card_restriction());
        assert!(Restriction::new(1, 0).has_card_restriction());
        assert!(Restriction::new(0, 1).has_card_restriction());
    }

    #[test]
    fn test_allows_count() {
        let r = Restriction::new(1, 2);
        assert!(!r.allows_count(0));
        assert!(r.allows_count(1));
        assert!(r.allows_count(2));
        assert!(!r.allows_count(3));
        assert!(Restriction::default().allows_count(100));
    }

    #[test]
    fn test_from_json_forms() {
        assert_eq!(Restriction::from_json(&json!("none")).unwrap(), Restriction::default());
        assert_eq!(
            Restriction::from_json(&json!({"min": 1, "max": 2})).unwrap(),
            Restriction::new(1, 2)
        );
        assert_eq!(
            Restriction::from_json(&json!({"cardinality": {"@value": 1, "@type": "xsd:nonNegativeInteger"}}))
                .unwrap(),
            Restriction::exactly(1)
        );
        assert_eq!(
            Restriction::from_json(&json!({
                "type": "and",
                "operands": [{"minCardinality": 1}, {"maxCardinality": "3"}]
            }))
            .unwrap(),
            Restriction::new(1, 3)
        );
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Restriction::from_json(&json!({"min": "lots"})).is_err());
        assert!(Restriction::from_json(&json!(true)).is_err());
    }
}
