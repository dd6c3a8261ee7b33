// SPDX-License-Identifier: PMPL-1.0-or-later
//! Patterns over frame trees.
//!
//! [`FramePattern::check_frame`] runs each set test in a fixed order and
//! stops at the first failure. Frames that cannot be inspected (released
//! ids, missing labels) fail the test instead of raising an error.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use termview_frame::{Frame, FrameId, FrameKind, FrameTree};
use tracing::{debug, warn};

use crate::comparison::NumberTest;
use crate::constraint::Constraint;
use crate::pattern::{
    class_ids_match, ids_match, one_or_many, property_ids_match, range_ids_match, string_match,
    test_value, Scope, TerminusPattern,
};

/// Edit status of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameStatus {
    Updated,
    New,
    Unchanged,
}

impl FrameStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameStatus::Updated => "updated",
            FrameStatus::New => "new",
            FrameStatus::Unchanged => "unchanged",
        }
    }
}

/// Scope a frame reports for itself.
pub fn renderer_type(tree: &FrameTree, id: FrameId) -> Option<Scope> {
    tree.kind(id).map(|kind| match kind {
        FrameKind::Object => Scope::Object,
        FrameKind::Property => Scope::Property,
        FrameKind::Data => Scope::Data,
    })
}

/// A pattern over object, property and data frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FramePattern {
    #[serde(flatten)]
    pub basics: TerminusPattern,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "one_or_many")]
    pub subject: Option<Vec<String>>,
    #[serde(rename = "subjectClass", default, skip_serializing_if = "Option::is_none", with = "one_or_many")]
    pub subject_class: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "one_or_many")]
    pub range: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "one_or_many")]
    pub property: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "one_or_many")]
    pub frame_type: Option<Vec<String>>,
    /// Accepted labels; `/`-prefixed entries are regular expressions.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "one_or_many")]
    pub label: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<NumberTest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FrameStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<FramePattern>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FramePattern>,
}

fn strings<I, S>(items: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(items.into_iter().map(Into::into).collect())
}

impl FramePattern {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Builder
    // ------------------------------------------------------------------

    pub fn scope(mut self, scope: Scope) -> Self {
        self.basics.scope = Some(scope);
        self
    }

    pub fn literal(mut self, literal: bool) -> Self {
        self.basics.literal = Some(literal);
        self
    }

    pub fn type_<I: IntoIterator<Item = S>, S: Into<String>>(mut self, types: I) -> Self {
        self.basics.types = strings(types);
        self
    }

    pub fn value(mut self, constraint: Constraint) -> Self {
        self.basics.value = Some(constraint);
        self
    }

    pub fn subject<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.subject = strings(ids);
        self
    }

    pub fn subject_class<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.subject_class = strings(ids);
        self
    }

    pub fn range<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.range = strings(ids);
        self
    }

    pub fn property<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ids: I) -> Self {
        self.property = strings(ids);
        self
    }

    pub fn frame_type<I: IntoIterator<Item = S>, S: Into<String>>(mut self, types: I) -> Self {
        self.frame_type = strings(types);
        self
    }

    pub fn label<I: IntoIterator<Item = S>, S: Into<String>>(mut self, labels: I) -> Self {
        self.label = strings(labels);
        self
    }

    pub fn depth(mut self, test: impl Into<NumberTest>) -> Self {
        self.depth = Some(test.into());
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn status(mut self, status: FrameStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn parent(mut self, parent: FramePattern) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn children<I: IntoIterator<Item = FramePattern>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }

    // ------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------

    /// Run every set test against one frame, in order, stopping at the first failure.
    pub fn check_frame(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(rtype) = renderer_type(tree, id) else {
            warn!(frame = %id, "Frame has no renderer type; rule does not match");
            return false;
        };
        self.check_scope(rtype)
            && !self.illegal_rule_type(rtype)
            && self.check_frame_type(tree, id)
            && self.check_label(tree, id)
            && self.check_subject(tree, id)
            && self.check_subject_class(tree, id)
            && self.check_property(tree, id)
            && self.check_depth(tree, id)
            && self.check_range(tree, id)
            && self.check_value(tree, id)
            && self.check_types(tree, id)
            && self.check_literal(tree, id)
            && self.check_parent(tree, id)
            && self.check_children(rtype, tree, id)
            && self.check_index(rtype, tree, id)
            && self.check_status(tree, id)
    }

    pub fn check_scope(&self, rtype: Scope) -> bool {
        self.basics.scope.map_or(true, |scope| scope.accepts(rtype))
    }

    /// Structurally impossible patterns: data frames have no children,
    /// objects have no range.
    pub fn illegal_rule_type(&self, rtype: Scope) -> bool {
        let scope = match self.basics.scope {
            Some(Scope::Any) | None => rtype,
            Some(scope) => scope,
        };
        let illegal = match scope {
            Scope::Data => !self.children.is_empty(),
            Scope::Object => self.range.is_some(),
            _ => false,
        };
        if illegal {
            debug!(scope = %scope, "Pattern combines fields its scope cannot have");
        }
        illegal
    }

    pub fn check_frame_type(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(accepted) = &self.frame_type else {
            return true;
        };
        tree.frame_type(id)
            .is_some_and(|actual| accepted.iter().any(|t| t == actual))
    }

    pub fn check_label(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(accepted) = &self.label else {
            return true;
        };
        let Some(label) = tree.label(id) else {
            debug!(frame = %id, "Frame has no label");
            return false;
        };
        let label = Value::String(label);
        accepted
            .iter()
            .any(|c| string_match(&Value::String(c.clone()), &label))
    }

    pub fn check_subject(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(accepted) = &self.subject else {
            return true;
        };
        tree.subject_id(id)
            .is_some_and(|subject| accepted.iter().any(|s| ids_match(tree.namespaces(), s, subject)))
    }

    pub fn check_subject_class(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(accepted) = &self.subject_class else {
            return true;
        };
        tree.subject_class(id)
            .is_some_and(|cls| accepted.iter().any(|c| class_ids_match(tree.namespaces(), c, cls)))
    }

    pub fn check_property(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(accepted) = &self.property else {
            return true;
        };
        tree.predicate(id)
            .is_some_and(|prop| accepted.iter().any(|p| property_ids_match(tree.namespaces(), p, prop)))
    }

    pub fn check_depth(&self, tree: &FrameTree, id: FrameId) -> bool {
        self.depth
            .as_ref()
            .map_or(true, |test| test.matches(tree.depth(id) as f64))
    }

    pub fn check_range(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(accepted) = &self.range else {
            return true;
        };
        tree.range(id)
            .is_some_and(|range| accepted.iter().any(|r| range_ids_match(tree.namespaces(), r, range)))
    }

    /// Data frames test their value, objects their subject id, properties
    /// any of their leaf values.
    pub fn check_value(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(constraint) = &self.basics.value else {
            return true;
        };
        match tree.frame(id) {
            Some(Frame::Data(d)) => test_value(&d.value(), constraint),
            Some(Frame::Object(o)) => test_value(&Value::String(o.subjid().to_string()), constraint),
            Some(Frame::Property(p)) => p.values().iter().any(|v| match tree.data(*v) {
                Ok(d) => test_value(&d.value(), constraint),
                Err(_) => false,
            }),
            None => false,
        }
    }

    /// Declared type: a data frame's range, an object's class, a property's range.
    pub fn check_types(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(accepted) = &self.basics.types else {
            return true;
        };
        let declared = match tree.frame(id) {
            Some(Frame::Data(d)) => Some(d.range.as_str()),
            Some(Frame::Object(o)) => Some(o.cls()),
            Some(Frame::Property(_)) => tree.range(id),
            None => None,
        };
        declared.is_some_and(|t| accepted.iter().any(|a| range_ids_match(tree.namespaces(), a, t)))
    }

    pub fn check_literal(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(literal) = self.basics.literal else {
            return true;
        };
        let is_literal = match tree.frame(id) {
            Some(Frame::Data(d)) => !d.is_reference(),
            Some(Frame::Property(_)) => literal_property(tree, id),
            Some(Frame::Object(_)) => false,
            None => return false,
        };
        is_literal == literal
    }

    pub fn check_parent(&self, tree: &FrameTree, id: FrameId) -> bool {
        let Some(parent_pattern) = &self.parent else {
            return true;
        };
        tree.parent(id)
            .is_some_and(|parent| parent_pattern.check_frame(tree, parent))
    }

    /// Every child pattern is met by at least one child: property frames of
    /// an object, values of a property.
    pub fn check_children(&self, rtype: Scope, tree: &FrameTree, id: FrameId) -> bool {
        if self.children.is_empty() {
            return true;
        }
        let kids = match rtype {
            Scope::Object | Scope::Property => tree.children(id),
            _ => return false,
        };
        self.children
            .iter()
            .all(|pattern| kids.iter().any(|kid| pattern.check_frame(tree, *kid)))
    }

    /// Position within the owning property; data frames only.
    pub fn check_index(&self, rtype: Scope, tree: &FrameTree, id: FrameId) -> bool {
        let Some(index) = self.index else {
            return true;
        };
        rtype == Scope::Data && tree.index(id) == Some(index)
    }

    pub fn check_status(&self, tree: &FrameTree, id: FrameId) -> bool {
        match self.status {
            None => true,
            Some(FrameStatus::Updated) => tree.is_updated(id),
            Some(FrameStatus::New) => tree.is_new(id),
            Some(FrameStatus::Unchanged) => !tree.is_updated(id),
        }
    }

    fn write_builder(&self, out: &mut String) {
        fn list(out: &mut String, name: &str, items: &Option<Vec<String>>) {
            if let Some(items) = items {
                let quoted: Vec<String> = items.iter().map(|i| format!("'{i}'")).collect();
                let _ = write!(out, ".{name}({})", quoted.join(", "));
            }
        }
        self.basics.write_basics(out);
        list(out, "frame_type", &self.frame_type);
        list(out, "label", &self.label);
        list(out, "subject", &self.subject);
        list(out, "subjectClass", &self.subject_class);
        list(out, "property", &self.property);
        if let Some(depth) = &self.depth {
            let _ = write!(out, ".depth({depth})");
        }
        list(out, "range", &self.range);
        if let Some(parent) = &self.parent {
            let _ = write!(out, ".parent({parent})");
        }
        if !self.children.is_empty() {
            let kids: Vec<String> = self.children.iter().map(ToString::to_string).collect();
            let _ = write!(out, ".children({})", kids.join(", "));
        }
        if let Some(index) = self.index {
            let _ = write!(out, ".index({index})");
        }
        if let Some(status) = self.status {
            let _ = write!(out, ".status('{}')", status.as_str());
        }
    }
}

impl fmt::Display for FramePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_builder(&mut out);
        write!(f, "pattern(){out}")
    }
}

/// A property is literal when its frame is a datatype frame. A logic frame
/// is judged by the operands its values resolved to, or by its first operand
/// while it holds no values.
fn literal_property(tree: &FrameTree, id: FrameId) -> bool {
    let Some(classframe) = tree.classframe(id) else {
        return false;
    };
    if !classframe.is_logic() {
        return classframe.is_data();
    }
    let values = tree.children(id);
    if values.is_empty() {
        return classframe
            .frame
            .first()
            .and_then(|op| tree.schema().get(*op))
            .is_some_and(|op| op.is_data());
    }
    values
        .into_iter()
        .any(|value| tree.classframe(value).is_some_and(|cf| cf.is_data()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use termview_frame::{ClassFrame, FrameType, Schema};

    fn tree() -> (FrameTree, FrameId) {
        let mut schema = Schema::new();
        schema.insert(ClassFrame::new("scm:Person", "scm:name", "xsd:string", FrameType::Datatype).with_label("Name"));
        schema.insert_object(
            ClassFrame::new("scm:Person", "scm:address", "scm:Address", FrameType::Object),
            vec![ClassFrame::new("scm:Address", "scm:street", "xsd:string", FrameType::Datatype)],
        );
        let mut tree = FrameTree::with_schema(schema);
        let root = tree.new_object("scm:Person", None);
        tree.load_jsonld_document(
            root,
            &json!({
                "@id": "doc:alice",
                "@type": "scm:Person",
                "scm:name": {"@value": "Alice", "@type": "xsd:string"},
                "scm:address": {"@type": "scm:Address", "scm:street": {"@value": "Main St", "@type": "xsd:string"}}
            }),
        )
        .unwrap();
        (tree, root)
    }

    fn first_value(tree: &FrameTree, object: FrameId, property: &str) -> FrameId {
        let prop = tree.property_frame(object, property).unwrap();
        tree.property(prop).unwrap().values()[0]
    }

    #[test]
    fn test_empty_pattern_matches_every_frame() {
        let (tree, root) = tree();
        let p = FramePattern::new();
        assert!(tree.descendants(root).into_iter().all(|id| p.check_frame(&tree, id)));
    }

    #[test]
    fn test_data_with_children_is_illegal() {
        let (tree, root) = tree();
        let p = FramePattern::new()
            .scope(Scope::Data)
            .children([FramePattern::new()]);
        assert!(p.illegal_rule_type(Scope::Data));
        assert!(tree.descendants(root).into_iter().all(|id| !p.check_frame(&tree, id)));
    }

    #[test]
    fn test_object_with_range_is_illegal() {
        let (tree, root) = tree();
        let p = FramePattern::new().scope(Scope::Object).range(["xsd:string"]);
        assert!(!p.check_frame(&tree, root));
    }

    #[test]
    fn test_depth_scenario() {
        let (tree, root) = tree();
        let address = first_value(&tree, root, "scm:address");
        let street = first_value(&tree, address, "scm:street");
        let p = FramePattern::new().depth(">0");
        assert!(!p.check_frame(&tree, root));
        assert!(p.check_frame(&tree, address));
        assert!(p.check_frame(&tree, street));
        assert!(!FramePattern::new().depth(">1").check_frame(&tree, street));
    }

    #[test]
    fn test_property_and_class_filters() {
        let (tree, root) = tree();
        let name = first_value(&tree, root, "scm:name");
        let p = FramePattern::new()
            .scope(Scope::Data)
            .property(["name"])
            .subject_class(["Person"])
            .subject(["doc:alice"])
            .range(["xsd:string"])
            .type_(["xsd:string"])
            .literal(true)
            .value(Constraint::one_of(["/^Al"]))
            .index(0)
            .label(["Name"])
            .frame_type(["data"]);
        assert!(p.check_frame(&tree, name));
        assert!(!p.clone().property(["street"]).check_frame(&tree, name));
        assert!(!p.clone().index(1).check_frame(&tree, name));
        assert!(!p.clone().literal(false).check_frame(&tree, name));
    }

    #[test]
    fn test_parent_and_children() {
        let (tree, root) = tree();
        let address = first_value(&tree, root, "scm:address");
        let street = first_value(&tree, address, "scm:street");

        let inside_address = FramePattern::new().parent(FramePattern::new().property(["scm:street"]));
        assert!(inside_address.check_frame(&tree, street));

        let has_both = FramePattern::new().scope(Scope::Object).children([
            FramePattern::new().property(["scm:name"]),
            FramePattern::new().property(["scm:address"]),
        ]);
        assert!(has_both.check_frame(&tree, root));
        let wants_missing = FramePattern::new().scope(Scope::Object).children([
            FramePattern::new().property(["scm:name"]),
            FramePattern::new().property(["scm:email"]),
        ]);
        assert!(!wants_missing.check_frame(&tree, root));
    }

    #[test]
    fn test_property_scope_children_checks_values() {
        let (tree, root) = tree();
        let name = tree.property_frame(root, "scm:name").unwrap();
        let p = FramePattern::new()
            .scope(Scope::Property)
            .children([FramePattern::new().value(Constraint::one_of(["Alice"]))]);
        assert!(p.check_frame(&tree, name));
        let p = FramePattern::new()
            .scope(Scope::Property)
            .children([FramePattern::new().value(Constraint::one_of(["Bob"]))]);
        assert!(!p.check_frame(&tree, name));
    }

    #[test]
    fn test_status() {
        let (mut tree, root) = tree();
        let name = first_value(&tree, root, "scm:name");
        let unchanged = FramePattern::new().status(FrameStatus::Unchanged);
        let updated = FramePattern::new().status(FrameStatus::Updated);
        assert!(unchanged.check_frame(&tree, name));
        tree.data_mut(name).unwrap().set("Alicia");
        assert!(updated.check_frame(&tree, name));
        assert!(!FramePattern::new().status(FrameStatus::New).check_frame(&tree, root));
    }

    #[test]
    fn test_logic_property_literal_by_operand() {
        let mut schema = Schema::new();
        let errors = schema.load_class_frames(
            "scm:Event",
            &json!([
                {"type": "or", "property": "scm:held", "operands": [
                    {"type": "datatypeProperty", "range": "xsd:date"},
                    {"type": "datatypeProperty", "range": "xsd:gYear"}
                ]},
                {"type": "xor", "property": "scm:venue", "operands": [
                    {"type": "document", "range": "scm:Place"},
                    {"type": "datatypeProperty", "range": "xsd:string"}
                ]}
            ]),
        );
        assert!(errors.is_empty());
        let mut tree = FrameTree::with_schema(schema);
        let root = tree.new_object("scm:Event", Some("doc:launch"));
        tree.load_jsonld_document(
            root,
            &json!({
                "@id": "doc:launch",
                "@type": "scm:Event",
                "scm:held": {"@value": "2024", "@type": "xsd:gYear"},
                "scm:venue": {"@id": "doc:hall", "@type": "scm:Place"}
            }),
        )
        .unwrap();

        let literal = FramePattern::new().scope(Scope::Property).literal(true);
        let held = tree.property_frame(root, "scm:held").unwrap();
        let venue = tree.property_frame(root, "scm:venue").unwrap();
        assert!(literal.check_frame(&tree, held));
        assert!(!literal.check_frame(&tree, venue));
        assert!(FramePattern::new().literal(false).check_frame(&tree, venue));
    }

    #[test]
    fn test_released_frames_fail_closed() {
        let (mut tree, root) = tree();
        let name = first_value(&tree, root, "scm:name");
        tree.remove_property(root, "scm:name").unwrap();
        assert!(!FramePattern::new().check_frame(&tree, name));
    }

    #[test]
    fn test_json_round_trip() {
        let p = FramePattern::new()
            .scope(Scope::Data)
            .subject_class(["scm:Person"])
            .depth(">1")
            .status(FrameStatus::New)
            .parent(FramePattern::new().property(["scm:address"]));
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["subjectClass"], json!(["scm:Person"]));
        assert_eq!(v["parent"]["property"], json!(["scm:address"]));
        let back: FramePattern = serde_json::from_value(v).unwrap();
        assert_eq!(back, p);

        let single: FramePattern = serde_json::from_value(json!({"property": "scm:name"})).unwrap();
        assert_eq!(single.property, Some(vec!["scm:name".to_string()]));
    }

    #[test]
    fn test_display() {
        let p = FramePattern::new().scope(Scope::Data).depth(">1");
        assert_eq!(p.to_string(), "pattern().scope('data').depth('>1')");
    }
}
