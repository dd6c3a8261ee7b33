// SPDX-License-Identifier: PMPL-1.0-or-later
//! Data frames: one literal or one document reference.

use serde_json::Value;

use crate::classframe::{ClassFrame, ClassFrameId};
use crate::restriction::Restriction;

/// A leaf value of a property.
///
/// `range_value` is the JSON-LD value as loaded. Edits go into `contents`,
/// which overrides the loaded scalar until [`DataFrame::reset`] is called.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    /// Subject id of the owning document.
    pub domain_value: String,
    pub predicate: String,
    pub range: String,
    pub range_value: Value,
    pub restriction: Restriction,
    pub label: Option<String>,
    pub comment: Option<String>,
    pub(crate) contents: Option<Value>,
    pub(crate) cframe: ClassFrameId,
}

impl DataFrame {
    pub(crate) fn from_value(
        domain_value: &str,
        predicate: &str,
        cframe: ClassFrameId,
        classframe: &ClassFrame,
        value: Value,
    ) -> Self {
        let range = value
            .get("@type")
            .and_then(Value::as_str)
            .unwrap_or(&classframe.range)
            .to_string();
        Self {
            domain_value: domain_value.to_string(),
            predicate: predicate.to_string(),
            range,
            range_value: value,
            restriction: classframe.restriction,
            label: classframe.label.clone(),
            comment: classframe.comment.clone(),
            contents: None,
            cframe,
        }
    }

    pub fn cframe(&self) -> ClassFrameId {
        self.cframe
    }

    /// Whether this value points at another document rather than holding a literal.
    pub fn is_reference(&self) -> bool {
        match &self.range_value {
            Value::String(_) => true,
            Value::Object(map) => map.contains_key("@id") && !map.contains_key("@value"),
            _ => false,
        }
    }

    /// The current scalar: edited contents, or the loaded `@value`/`@id`.
    pub fn get(&self) -> Value {
        self.contents
            .clone()
            .unwrap_or_else(|| unwrap_scalar(&self.range_value))
    }

    pub fn set(&mut self, contents: impl Into<Value>) {
        self.contents = Some(contents.into());
    }

    /// Blank the value without removing the frame.
    pub fn clear(&mut self) {
        self.contents = Some(Value::String(String::new()));
    }

    /// Drop edits and go back to the loaded value.
    pub fn reset(&mut self) {
        self.contents = None;
    }

    pub fn is_edited(&self) -> bool {
        self.contents.is_some()
    }

    /// The JSON-LD value with edits substituted in.
    pub fn value(&self) -> Value {
        match &self.contents {
            Some(contents) => substitute(&self.range_value, contents),
            None => self.range_value.clone(),
        }
    }

    /// The JSON-LD value for serialization; empty values extract to nothing.
    pub fn extract(&self) -> Option<Value> {
        non_empty(self.value())
    }

    /// What [`DataFrame::extract`] returned before any edit.
    pub fn original_extract(&self) -> Option<Value> {
        non_empty(self.range_value.clone())
    }
}

fn unwrap_scalar(value: &Value) -> Value {
    match value {
        Value::Object(map) => map
            .get("@value")
            .or_else(|| map.get("@id"))
            .cloned()
            .unwrap_or_else(|| value.clone()),
        other => other.clone(),
    }
}

fn substitute(original: &Value, contents: &Value) -> Value {
    match original {
        Value::Object(map) if map.contains_key("@value") => {
            let mut map = map.clone();
            map.insert("@value".to_string(), contents.clone());
            Value::Object(map)
        }
        Value::Object(map) if map.contains_key("@id") => {
            let mut map = map.clone();
            map.insert("@id".to_string(), contents.clone());
            Value::Object(map)
        }
        _ => contents.clone(),
    }
}

fn is_blank_scalar(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn non_empty(value: Value) -> Option<Value> {
    let blank = match &value {
        Value::Object(map) => match map.get("@value").or_else(|| map.get("@id")) {
            Some(inner) => is_blank_scalar(inner),
            None => map.is_empty(),
        },
        other => is_blank_scalar(other),
    };
    (!blank).then_some(value)
}
