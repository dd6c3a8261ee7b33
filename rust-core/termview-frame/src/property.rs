// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property frames: one property slot of one object and its values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::classframe::ClassFrameId;
use crate::data::DataFrame;
use crate::error::{FrameError, Result};
use crate::namespace::mint_blank_node;
use crate::object::ObjectFrame;
use crate::tree::{Frame, FrameId, FrameKind, FrameTree};

/// One property of an object frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFrame {
    pub predicate: String,
    pub(crate) cframe: ClassFrameId,
    pub(crate) values: Vec<FrameId>,
    /// Extracted values at load (or fill) time.
    pub(crate) original: Vec<Value>,
}

impl PropertyFrame {
    pub(crate) fn new(predicate: impl Into<String>, cframe: ClassFrameId) -> Self {
        Self {
            predicate: predicate.into(),
            cframe,
            values: Vec::new(),
            original: Vec::new(),
        }
    }

    pub fn cframe(&self) -> ClassFrameId {
        self.cframe
    }

    pub fn values(&self) -> &[FrameId] {
        &self.values
    }

    pub fn original(&self) -> &[Value] {
        &self.original
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Value-list edits gated by the property's cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardAction {
    Add,
    Clone,
    Delete,
}

impl FrameTree {
    /// Whether `action` keeps the property within its cardinality.
    ///
    /// The tree does not enforce this; editors ask before mutating.
    pub fn card_control_allows(&self, property: FrameId, action: CardAction) -> bool {
        let Ok(prop) = self.property(property) else {
            return false;
        };
        let Some(restriction) = self.schema.get(prop.cframe).map(|cf| cf.restriction) else {
            return true;
        };
        let count = prop.values.len() as u64;
        match action {
            CardAction::Add | CardAction::Clone => {
                restriction.max == 0 || count < u64::from(restriction.max)
            }
            CardAction::Delete => restriction.min == 0 || count > u64::from(restriction.min),
        }
    }

    /// Extracted values of a property, in order.
    pub fn property_values(&self, property: FrameId) -> Vec<Value> {
        let Ok(prop) = self.property(property) else {
            return Vec::new();
        };
        let mut out: Vec<Value> = Vec::with_capacity(prop.values.len());
        for value in prop.values.iter().filter_map(|v| self.extract(*v)) {
            if self.config.dedupe_extracted && out.contains(&value) {
                continue;
            }
            out.push(value);
        }
        out
    }

    /// Append a value frame built from `value` to a property.
    ///
    /// Nested objects (object-property values carrying `@type` or any
    /// property of their own) become object frames and are loaded
    /// recursively. A bare `{"@id": ..}` stays a reference.
    pub(crate) fn push_value(&mut self, property: FrameId, value: &Value) -> Result<FrameId> {
        let prop = self.property(property)?;
        let predicate = prop.predicate.clone();
        let cframe = self.schema.resolve_operand(prop.cframe, value);
        let owner = self
            .parent(property)
            .ok_or(FrameError::NotFound(property))?;
        let domain = self.object(owner)?.subjid.clone();
        let classframe = self
            .schema
            .get(cframe)
            .ok_or_else(|| FrameError::UnknownProperty {
                class: self.subject_class(owner).unwrap_or_default().to_string(),
                property: predicate.clone(),
            })?;

        let nested = classframe.is_object() && value.as_object().is_some_and(is_nested_document);
        let id = if nested {
            let cls = value
                .get("@type")
                .and_then(Value::as_str)
                .unwrap_or(&classframe.range)
                .to_string();
            let explicit = value.get("@id").and_then(Value::as_str);
            let subjid = explicit.map(String::from).unwrap_or_else(mint_blank_node);
            let mut object = ObjectFrame::new(&cls, subjid, self.schema.class_frames(&cls));
            object.explicit_id = explicit.is_some();
            let child = self.insert(Frame::Object(object), Some(property));
            self.load_into(child, value)?;
            child
        } else {
            let data = DataFrame::from_value(&domain, &predicate, cframe, classframe, value.clone());
            self.insert(Frame::Data(data), Some(property))
        };
        self.property_mut(property)?.values.push(id);
        Ok(id)
    }

    /// Append an empty, schema-compliant value.
    pub(crate) fn push_empty(&mut self, property: FrameId) -> Result<FrameId> {
        let cframe = self.property(property)?.cframe;
        let empty = self.schema.empty_value(cframe);
        let id = self.push_value(property, &empty)?;
        if self.kind(id) == Some(FrameKind::Object) {
            if let Ok(object) = self.object_mut(id) {
                object.new_doc = true;
                object.explicit_id = false;
            }
        }
        Ok(id)
    }

    /// Remove the value at `index` from a property.
    pub fn remove_value(&mut self, property: FrameId, index: usize) -> Result<()> {
        let prop = self.property_mut(property)?;
        let len = prop.values.len();
        if index >= len {
            return Err(FrameError::IndexOutOfRange { index, len });
        }
        let removed = prop.values.remove(index);
        self.release(removed);
        debug!(property = %property, index, "Removed property value");
        Ok(())
    }

    /// Duplicate the value at `index` and append the copy.
    pub fn clone_value(&mut self, property: FrameId, index: usize) -> Result<FrameId> {
        let prop = self.property(property)?;
        let len = prop.values.len();
        let source = *prop
            .values
            .get(index)
            .ok_or(FrameError::IndexOutOfRange { index, len })?;
        let mut value = self
            .extract(source)
            .unwrap_or_else(|| self.schema.empty_value(prop.cframe));
        if self.kind(source) == Some(FrameKind::Object) {
            if let Some(map) = value.as_object_mut() {
                map.remove("@id");
            }
        }
        self.push_value(property, &value)
    }
}

fn is_nested_document(map: &Map<String, Value>) -> bool {
    !map.contains_key("@value") && map.keys().any(|k| k == "@type" || !k.starts_with('@'))
}
