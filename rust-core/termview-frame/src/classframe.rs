// SPDX-License-Identifier: PMPL-1.0-or-later
//! Class frames: the schema template for one property of one class.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::restriction::Restriction;

/// Index of a [`ClassFrame`] inside a [`Schema`](crate::Schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassFrameId(pub(crate) usize);

impl ClassFrameId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What kind of value a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameType {
    /// Literal-valued property.
    #[serde(rename = "datatypeProperty")]
    Datatype,
    /// Property holding nested objects.
    #[serde(rename = "objectProperty")]
    Object,
    /// Property holding references to other documents.
    #[serde(rename = "document")]
    Document,
    /// Choice among a fixed list of identifiers.
    #[serde(rename = "oneOf")]
    OneOf,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "xor")]
    Xor,
}

impl FrameType {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameType::Datatype => "datatypeProperty",
            FrameType::Object => "objectProperty",
            FrameType::Document => "document",
            FrameType::OneOf => "oneOf",
            FrameType::And => "and",
            FrameType::Or => "or",
            FrameType::Xor => "xor",
        }
    }

    pub fn is_logic(self) -> bool {
        matches!(self, FrameType::And | FrameType::Or | FrameType::Xor)
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One permitted value of a `oneOf` property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceElement {
    pub id: String,
    pub label: Option<String>,
    pub comment: Option<String>,
}

/// Schema template for one property of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFrame {
    /// Owning class.
    pub domain: String,
    /// Property id.
    pub predicate: String,
    /// Value type, or target class.
    pub range: String,
    pub frame_type: FrameType,
    /// Nested schema (object properties) or operands (logic frames).
    pub frame: Vec<ClassFrameId>,
    /// Options of a `oneOf` frame.
    pub elements: Vec<ChoiceElement>,
    pub restriction: Restriction,
    pub label: Option<String>,
    pub comment: Option<String>,
    /// Invented at load time for a property the schema does not describe.
    pub synthesized: bool,
}

impl ClassFrame {
    pub fn new(
        domain: impl Into<String>,
        predicate: impl Into<String>,
        range: impl Into<String>,
        frame_type: FrameType,
    ) -> Self {
        Self {
            domain: domain.into(),
            predicate: predicate.into(),
            range: range.into(),
            frame_type,
            frame: Vec::new(),
            elements: Vec::new(),
            restriction: Restriction::default(),
            label: None,
            comment: None,
            synthesized: false,
        }
    }

    pub fn with_restriction(mut self, restriction: Restriction) -> Self {
        self.restriction = restriction;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_elements(mut self, elements: Vec<ChoiceElement>) -> Self {
        self.elements = elements;
        self
    }

    pub(crate) fn with_frame(mut self, frame: Vec<ClassFrameId>) -> Self {
        self.frame = frame;
        self
    }

    /// Whether the frame carries everything its type needs.
    pub fn is_valid(&self) -> bool {
        if self.predicate.is_empty() {
            return false;
        }
        match self.frame_type {
            FrameType::Datatype | FrameType::Object | FrameType::Document => !self.range.is_empty(),
            FrameType::OneOf => !self.elements.is_empty(),
            FrameType::And | FrameType::Or | FrameType::Xor => !self.frame.is_empty(),
        }
    }

    /// Short category name used by `frame_type` rule patterns.
    pub fn ftype(&self) -> &'static str {
        match self.frame_type {
            FrameType::Datatype => "data",
            FrameType::Object => "object",
            FrameType::Document => "document",
            FrameType::OneOf => "oneOf",
            FrameType::And | FrameType::Or | FrameType::Xor => "logic",
        }
    }

    pub fn is_data(&self) -> bool {
        self.frame_type == FrameType::Datatype
    }

    pub fn is_object(&self) -> bool {
        self.frame_type == FrameType::Object
    }

    pub fn is_document(&self) -> bool {
        self.frame_type == FrameType::Document
    }

    pub fn is_choice(&self) -> bool {
        self.frame_type == FrameType::OneOf
    }

    pub fn is_logic(&self) -> bool {
        self.frame_type.is_logic()
    }

    pub fn has_restriction(&self) -> bool {
        self.restriction.has_card_restriction()
    }

    /// Values of this property are leaves (literals or references).
    pub fn holds_leaves(&self) -> bool {
        !matches!(self.frame_type, FrameType::Object)
    }

    pub fn choice(&self, id: &str) -> Option<&ChoiceElement> {
        self.elements.iter().find(|e| e.id == id)
    }
}

/// Text of a label/comment that may be a plain string or a `@value` literal.
pub(crate) fn literal_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("@value").and_then(literal_text),
        _ => None,
    }
}
