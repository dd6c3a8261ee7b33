// SPDX-License-Identifier: PMPL-1.0-or-later
//! Schema cache: an arena of [`ClassFrame`]s addressed by `(class, property)`.
//!
//! Class frames are loaded from the server's class-frame responses. Invalid
//! entries are logged and skipped so that one broken property never stops
//! the rest of a class from loading.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::classframe::{literal_text, ChoiceElement, ClassFrame, ClassFrameId, FrameType};
use crate::error::SchemaError;
use crate::namespace::{mint_blank_node, Namespaces};
use crate::restriction::Restriction;

/// Wire shape of one class frame in a class-frame response.
#[derive(Debug, Deserialize)]
struct RawClassFrame {
    #[serde(rename = "type", alias = "@type")]
    frame_type: FrameType,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default, alias = "predicate")]
    property: Option<String>,
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    label: Option<Value>,
    #[serde(default)]
    comment: Option<Value>,
    #[serde(default)]
    restriction: Option<Value>,
    #[serde(default)]
    frame: Vec<Value>,
    #[serde(default)]
    operands: Vec<Value>,
    #[serde(default)]
    elements: Vec<Value>,
}

/// Arena of class frames plus the namespace map used to key them.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    frames: Vec<ClassFrame>,
    index: BTreeMap<(String, String), ClassFrameId>,
    namespaces: Namespaces,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespaces(namespaces: Namespaces) -> Self {
        Self {
            namespaces,
            ..Self::default()
        }
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn namespaces_mut(&mut self) -> &mut Namespaces {
        &mut self.namespaces
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, id: ClassFrameId) -> Option<&ClassFrame> {
        self.frames.get(id.0)
    }

    fn key(&self, class: &str, property: &str) -> (String, String) {
        (self.namespaces.expand(class), self.namespaces.expand(property))
    }

    /// Class frame for `property` of `class`.
    pub fn lookup(&self, class: &str, property: &str) -> Option<ClassFrameId> {
        self.index.get(&self.key(class, property)).copied()
    }

    /// Every registered property of `class`, keyed by property id as declared.
    pub fn class_frames(&self, class: &str) -> BTreeMap<String, ClassFrameId> {
        let class = self.namespaces.expand(class);
        self.index
            .iter()
            .filter(|((c, _), _)| *c == class)
            .map(|(_, id)| (self.frames[id.0].predicate.clone(), *id))
            .collect()
    }

    fn push(&mut self, frame: ClassFrame) -> ClassFrameId {
        let id = ClassFrameId(self.frames.len());
        self.frames.push(frame);
        id
    }

    /// Add a class frame and register it under its `(domain, predicate)`.
    pub fn insert(&mut self, frame: ClassFrame) -> ClassFrameId {
        let key = self.key(&frame.domain, &frame.predicate);
        let id = self.push(frame);
        self.index.insert(key, id);
        id
    }

    /// Add a logic frame over `operands`, which are stored but not registered.
    pub fn insert_logic(&mut self, frame: ClassFrame, operands: Vec<ClassFrame>) -> ClassFrameId {
        let ids = operands.into_iter().map(|op| self.push(op)).collect();
        self.insert(frame.with_frame(ids))
    }

    /// Add an object-property frame whose range class is described by `nested`.
    pub fn insert_object(&mut self, frame: ClassFrame, nested: Vec<ClassFrame>) -> ClassFrameId {
        let ids = nested.into_iter().map(|cf| self.insert(cf)).collect();
        self.insert(frame.with_frame(ids))
    }

    /// Load a class-frame response for `class`.
    ///
    /// Returns the problems found; the offending frames are skipped.
    pub fn load_class_frames(&mut self, class: &str, raw: &Value) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        let Some(items) = raw.as_array() else {
            warn!(class = %class, "Class frame response is not a list");
            errors.push(SchemaError::NotAList(class.to_string()));
            return errors;
        };
        for item in items {
            if let Err(e) = self.load_raw(class, None, item, true, &mut errors) {
                warn!(class = %class, error = %e, "Skipping invalid class frame");
                errors.push(e);
            }
        }
        debug!(class = %class, frames = self.frames.len(), skipped = errors.len(), "Class frames loaded");
        errors
    }

    fn load_raw(
        &mut self,
        class: &str,
        property: Option<&str>,
        raw: &Value,
        register: bool,
        errors: &mut Vec<SchemaError>,
    ) -> Result<ClassFrameId, SchemaError> {
        let name = raw
            .get("property")
            .and_then(Value::as_str)
            .or(property)
            .unwrap_or("<unnamed>")
            .to_string();
        let parsed: RawClassFrame =
            serde_json::from_value(raw.clone()).map_err(|e| SchemaError::InvalidFrame {
                property: name.clone(),
                reason: e.to_string(),
            })?;

        let domain = parsed.domain.unwrap_or_else(|| class.to_string());
        let predicate = parsed.property.or_else(|| property.map(String::from)).unwrap_or_default();
        let range = parsed.range.unwrap_or_default();
        let restriction = match &parsed.restriction {
            Some(r) => Restriction::from_json(r)?,
            None => Restriction::default(),
        };

        let mut frame = ClassFrame::new(domain, predicate, range, parsed.frame_type)
            .with_restriction(restriction);
        frame.label = parsed.label.as_ref().and_then(literal_text);
        frame.comment = parsed.comment.as_ref().and_then(literal_text);

        match parsed.frame_type {
            FrameType::Object => {
                let nested_class = frame.range.clone();
                for item in &parsed.frame {
                    match self.load_raw(&nested_class, None, item, true, errors) {
                        Ok(id) => frame.frame.push(id),
                        Err(e) => {
                            warn!(class = %nested_class, error = %e, "Skipping invalid nested class frame");
                            errors.push(e);
                        }
                    }
                }
            }
            FrameType::And | FrameType::Or | FrameType::Xor => {
                let operands = if parsed.operands.is_empty() { &parsed.frame } else { &parsed.operands };
                for item in operands {
                    let domain = frame.domain.clone();
                    let predicate = frame.predicate.clone();
                    match self.load_raw(&domain, Some(&predicate), item, false, errors) {
                        Ok(id) => frame.frame.push(id),
                        Err(e) => {
                            warn!(property = %predicate, error = %e, "Skipping invalid logic operand");
                            errors.push(e);
                        }
                    }
                }
            }
            FrameType::OneOf => {
                frame.elements = parsed.elements.iter().filter_map(choice_element).collect();
            }
            FrameType::Datatype | FrameType::Document => {}
        }

        if !frame.is_valid() {
            return Err(SchemaError::InvalidFrame {
                property: name,
                reason: format!("incomplete {} frame", frame.frame_type),
            });
        }

        Ok(if register { self.insert(frame) } else { self.push(frame) })
    }

    /// Invent a class frame for a property the schema does not describe,
    /// guessing its type from a sample value.
    pub fn synthesize(&mut self, class: &str, property: &str, sample: &Value) -> ClassFrameId {
        let sample = match sample {
            Value::Array(items) => items.first().unwrap_or(&Value::Null),
            other => other,
        };
        let declared = sample.get("@type").and_then(Value::as_str);
        let (frame_type, range) = match sample {
            Value::Object(map) if map.contains_key("@value") => {
                (FrameType::Datatype, declared.unwrap_or("xsd:string"))
            }
            Value::Object(map) if map.keys().any(|k| !k.starts_with('@')) => {
                (FrameType::Object, declared.unwrap_or("owl:Thing"))
            }
            Value::Object(_) | Value::String(_) => (FrameType::Document, declared.unwrap_or("owl:Thing")),
            Value::Number(_) => (FrameType::Datatype, "xsd:decimal"),
            Value::Bool(_) => (FrameType::Datatype, "xsd:boolean"),
            _ => (FrameType::Datatype, "xsd:string"),
        };
        debug!(class = %class, property = %property, frame_type = %frame_type, "Synthesized class frame");
        let mut frame = ClassFrame::new(class, property, range, frame_type);
        frame.synthesized = true;
        self.insert(frame)
    }

    /// For a logic frame, the operand whose range matches the value's `@type`
    /// (falling back to the first operand). Other frames resolve to themselves.
    pub fn resolve_operand(&self, id: ClassFrameId, value: &Value) -> ClassFrameId {
        let Some(frame) = self.get(id) else {
            return id;
        };
        if !frame.is_logic() {
            return id;
        }
        let declared = value.get("@type").and_then(Value::as_str);
        declared
            .and_then(|t| {
                frame.frame.iter().copied().find(|op| {
                    self.get(*op)
                        .is_some_and(|cf| self.namespaces.ids_match(&cf.range, t))
                })
            })
            .or_else(|| frame.frame.first().copied())
            .unwrap_or(id)
    }

    /// An empty JSON-LD value compliant with the class frame.
    pub fn empty_value(&self, id: ClassFrameId) -> Value {
        let Some(frame) = self.get(id) else {
            return Value::Null;
        };
        match frame.frame_type {
            FrameType::Datatype => json!({"@type": frame.range, "@value": ""}),
            FrameType::Object => json!({"@type": frame.range, "@id": mint_blank_node()}),
            FrameType::Document | FrameType::OneOf => json!({"@id": ""}),
            FrameType::And | FrameType::Or | FrameType::Xor => match frame.frame.first() {
                Some(op) => self.empty_value(*op),
                None => Value::Null,
            },
        }
    }
}

fn choice_element(raw: &Value) -> Option<ChoiceElement> {
    match raw {
        Value::String(id) => Some(ChoiceElement {
            id: id.clone(),
            label: None,
            comment: None,
        }),
        Value::Object(map) => {
            let id = map
                .get("class")
                .or_else(|| map.get("@id"))
                .and_then(Value::as_str)?;
            Some(ChoiceElement {
                id: id.to_string(),
                label: map.get("label").and_then(literal_text),
                comment: map.get("comment").and_then(literal_text),
            })
        }
        _ => None,
    }
}
