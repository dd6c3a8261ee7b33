// SPDX-License-Identifier: PMPL-1.0-or-later
//! The frame arena.
//!
//! A [`FrameTree`] owns every frame of one or more documents in a flat slot
//! vector. Frames refer to each other by [`FrameId`]; each slot records its
//! parent, so walking up and down the tree never needs shared ownership.
//! Released slots go on a free list and are reused; a per-slot generation
//! keeps ids of released frames from reaching the new occupant.
//! Object, property and data specific operations live in `impl FrameTree`
//! blocks in their own modules.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classframe::ClassFrame;
use crate::config::{FrameConfig, UpdateTracking};
use crate::data::DataFrame;
use crate::effects::Effects;
use crate::error::{FrameError, Result};
use crate::namespace::{is_blank_node, Namespaces};
use crate::object::ObjectFrame;
use crate::property::PropertyFrame;
use crate::schema::Schema;

const RDFS_LABEL: &str = "rdfs:label";
const RDFS_COMMENT: &str = "rdfs:comment";

/// Handle of a frame inside a [`FrameTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId {
    index: usize,
    generation: u32,
}

impl FrameId {
    /// Slot number in the arena.
    pub fn index(self) -> usize {
        self.index
    }

    /// How many times the slot had been released when this id was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generation {
            0 => write!(f, "#{}", self.index),
            generation => write!(f, "#{}.{}", self.index, generation),
        }
    }
}

/// The three kinds of frame node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Object,
    Property,
    Data,
}

impl FrameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::Object => "object",
            FrameKind::Property => "property",
            FrameKind::Data => "data",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A frame node.
#[derive(Debug, Clone)]
pub enum Frame {
    Object(ObjectFrame),
    Property(PropertyFrame),
    Data(DataFrame),
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Object(_) => FrameKind::Object,
            Frame::Property(_) => FrameKind::Property,
            Frame::Data(_) => FrameKind::Data,
        }
    }
}

/// One arena slot.
#[derive(Debug, Clone)]
pub struct Node {
    pub frame: Frame,
    pub parent: Option<FrameId>,
    /// Effects folded onto this node by rule traversal.
    pub display_options: Effects,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of frames sharing one schema.
#[derive(Debug, Clone)]
pub struct FrameTree {
    pub(crate) schema: Schema,
    pub(crate) config: FrameConfig,
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl FrameTree {
    pub fn new(mut schema: Schema, config: FrameConfig) -> Self {
        for (prefix, iri) in &config.prefixes {
            schema.namespaces_mut().insert(prefix.clone(), iri.clone());
        }
        Self {
            schema,
            config,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn with_schema(schema: Schema) -> Self {
        Self::new(schema, FrameConfig::default())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut Schema {
        &mut self.schema
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    pub fn namespaces(&self) -> &Namespaces {
        self.schema.namespaces()
    }

    /// Number of live frames.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of slots allocated, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top-level object frames.
    pub fn roots(&self) -> Vec<FrameId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match &slot.node {
                Some(Node { frame: Frame::Object(_), parent: None, .. }) => Some(FrameId {
                    index,
                    generation: slot.generation,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn node(&self, id: FrameId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn node_mut(&mut self, id: FrameId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.node(id).map(|n| &n.frame)
    }

    pub fn kind(&self, id: FrameId) -> Option<FrameKind> {
        self.frame(id).map(Frame::kind)
    }

    pub fn parent(&self, id: FrameId) -> Option<FrameId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn object(&self, id: FrameId) -> Result<&ObjectFrame> {
        match self.frame(id) {
            Some(Frame::Object(o)) => Ok(o),
            Some(_) => Err(FrameError::WrongKind { id, expected: FrameKind::Object }),
            None => Err(FrameError::NotFound(id)),
        }
    }

    pub fn property(&self, id: FrameId) -> Result<&PropertyFrame> {
        match self.frame(id) {
            Some(Frame::Property(p)) => Ok(p),
            Some(_) => Err(FrameError::WrongKind { id, expected: FrameKind::Property }),
            None => Err(FrameError::NotFound(id)),
        }
    }

    pub fn data(&self, id: FrameId) -> Result<&DataFrame> {
        match self.frame(id) {
            Some(Frame::Data(d)) => Ok(d),
            Some(_) => Err(FrameError::WrongKind { id, expected: FrameKind::Data }),
            None => Err(FrameError::NotFound(id)),
        }
    }

    pub(crate) fn object_mut(&mut self, id: FrameId) -> Result<&mut ObjectFrame> {
        match self.node_mut(id).map(|n| &mut n.frame) {
            Some(Frame::Object(o)) => Ok(o),
            Some(_) => Err(FrameError::WrongKind { id, expected: FrameKind::Object }),
            None => Err(FrameError::NotFound(id)),
        }
    }

    pub(crate) fn property_mut(&mut self, id: FrameId) -> Result<&mut PropertyFrame> {
        match self.node_mut(id).map(|n| &mut n.frame) {
            Some(Frame::Property(p)) => Ok(p),
            Some(_) => Err(FrameError::WrongKind { id, expected: FrameKind::Property }),
            None => Err(FrameError::NotFound(id)),
        }
    }

    pub fn data_mut(&mut self, id: FrameId) -> Result<&mut DataFrame> {
        match self.node_mut(id).map(|n| &mut n.frame) {
            Some(Frame::Data(d)) => Ok(d),
            Some(_) => Err(FrameError::WrongKind { id, expected: FrameKind::Data }),
            None => Err(FrameError::NotFound(id)),
        }
    }

    pub fn display_options(&self, id: FrameId) -> Option<&Effects> {
        self.node(id).map(|n| &n.display_options)
    }

    pub fn display_options_mut(&mut self, id: FrameId) -> Option<&mut Effects> {
        self.node_mut(id).map(|n| &mut n.display_options)
    }

    pub(crate) fn insert(&mut self, frame: Frame, parent: Option<FrameId>) -> FrameId {
        let node = Node {
            frame,
            parent,
            display_options: Effects::default(),
        };
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index) {
                slot.node = Some(node);
                return FrameId {
                    index,
                    generation: slot.generation,
                };
            }
        }
        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        FrameId { index, generation: 0 }
    }

    /// Free a frame and everything below it.
    pub(crate) fn release(&mut self, id: FrameId) {
        if self.node(id).is_none() {
            return;
        }
        for child in self.children(id) {
            self.release(child);
        }
        if let Some(slot) = self.slots.get_mut(id.index) {
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }

    /// Direct children: property frames of an object, values of a property.
    pub fn children(&self, id: FrameId) -> Vec<FrameId> {
        match self.frame(id) {
            Some(Frame::Object(o)) => o.properties.values().copied().collect(),
            Some(Frame::Property(p)) => p.values.clone(),
            Some(Frame::Data(_)) | None => Vec::new(),
        }
    }

    /// Depth-first pre-order visit of `id` and everything below it.
    pub fn walk<F>(&mut self, id: FrameId, visit: &mut F)
    where
        F: FnMut(&mut FrameTree, FrameId),
    {
        if self.node(id).is_none() {
            warn!(frame = %id, "Walk reached a released frame");
            return;
        }
        visit(self, id);
        for child in self.children(id) {
            self.walk(child, visit);
        }
    }

    /// `id` and its descendants in pre-order.
    pub fn descendants(&self, id: FrameId) -> Vec<FrameId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if self.node(next).is_none() {
                continue;
            }
            out.push(next);
            let mut kids = self.children(next);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Class frame backing a property or data frame.
    pub fn classframe(&self, id: FrameId) -> Option<&ClassFrame> {
        let cf = match self.frame(id)? {
            Frame::Property(p) => p.cframe,
            Frame::Data(d) => d.cframe,
            Frame::Object(_) => return None,
        };
        self.schema.get(cf)
    }

    /// The object frame a frame belongs to (an object owns itself).
    pub fn owner(&self, id: FrameId) -> Option<FrameId> {
        match self.kind(id)? {
            FrameKind::Object => Some(id),
            FrameKind::Property => self.parent(id),
            FrameKind::Data => self.parent(id).and_then(|p| self.parent(p)),
        }
    }

    /// Nesting depth: top-level documents and their properties/values are 0.
    pub fn depth(&self, id: FrameId) -> usize {
        match self.kind(id) {
            Some(FrameKind::Object) => self.parent(id).map_or(0, |p| self.depth(p) + 1),
            Some(FrameKind::Property | FrameKind::Data) => self.parent(id).map_or(0, |p| self.depth(p)),
            None => 0,
        }
    }

    /// Human readable label.
    pub fn label(&self, id: FrameId) -> Option<String> {
        match self.frame(id)? {
            Frame::Object(o) => self.first_text(o, RDFS_LABEL),
            Frame::Property(p) => Some(
                self.schema
                    .get(p.cframe)
                    .and_then(|cf| cf.label.clone())
                    .unwrap_or_else(|| self.namespaces().shorten(&p.predicate)),
            ),
            Frame::Data(d) => Some(
                d.label
                    .clone()
                    .unwrap_or_else(|| self.namespaces().shorten(&d.predicate)),
            ),
        }
    }

    pub fn comment(&self, id: FrameId) -> Option<String> {
        match self.frame(id)? {
            Frame::Object(o) => self.first_text(o, RDFS_COMMENT),
            Frame::Property(p) => self.schema.get(p.cframe).and_then(|cf| cf.comment.clone()),
            Frame::Data(d) => d.comment.clone(),
        }
    }

    fn first_text(&self, object: &ObjectFrame, property: &str) -> Option<String> {
        let ns = self.namespaces();
        let prop = object
            .properties
            .iter()
            .find(|(key, _)| ns.ids_match(key, property))
            .map(|(_, id)| *id)?;
        let first = self.property(prop).ok()?.values.first().copied()?;
        let value = self.data(first).ok()?.get();
        value.as_str().map(String::from).or_else(|| Some(value.to_string()))
    }

    /// Subject id of the document node a frame belongs to.
    pub fn subject_id(&self, id: FrameId) -> Option<&str> {
        match self.frame(id)? {
            Frame::Data(d) => Some(&d.domain_value),
            _ => Some(&self.object(self.owner(id)?).ok()?.subjid),
        }
    }

    /// Class of the object a frame belongs to.
    pub fn subject_class(&self, id: FrameId) -> Option<&str> {
        Some(&self.object(self.owner(id)?).ok()?.cls)
    }

    /// Property id: the slot an object sits in, or the property itself.
    pub fn predicate(&self, id: FrameId) -> Option<&str> {
        match self.frame(id)? {
            Frame::Object(_) => self.predicate(self.parent(id)?),
            Frame::Property(p) => Some(&p.predicate),
            Frame::Data(d) => Some(&d.predicate),
        }
    }

    /// Declared range of a property or data frame.
    pub fn range(&self, id: FrameId) -> Option<&str> {
        match self.frame(id)? {
            Frame::Object(_) => None,
            Frame::Property(_) => self.classframe(id).map(|cf| cf.range.as_str()),
            Frame::Data(d) => Some(&d.range),
        }
    }

    /// Category name used by `frame_type` patterns.
    pub fn frame_type(&self, id: FrameId) -> Option<&'static str> {
        match self.kind(id)? {
            FrameKind::Object if self.parent(id).is_none() => Some("document"),
            FrameKind::Object => Some("object"),
            FrameKind::Property | FrameKind::Data => self.classframe(id).map(ClassFrame::ftype),
        }
    }

    /// Position of a value frame inside its property.
    pub fn index(&self, id: FrameId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.property(parent).ok()?.values.iter().position(|v| *v == id)
    }

    /// True when the frame belongs to a document without a permanent id.
    pub fn is_new(&self, id: FrameId) -> bool {
        self.subject_id(id).is_some_and(is_blank_node)
    }

    /// Whether the frame differs from what was loaded.
    pub fn is_updated(&self, id: FrameId) -> bool {
        match self.frame(id) {
            Some(Frame::Data(d)) => d.extract() != d.original_extract(),
            Some(Frame::Property(p)) => match self.config.update_tracking {
                UpdateTracking::Always => true,
                UpdateTracking::Compare => self.property_values(id) != p.original,
            },
            Some(Frame::Object(o)) => {
                let always = self.config.update_tracking == UpdateTracking::Always
                    && !o.properties.is_empty();
                always || o.baseline.as_ref() != self.extract(id).as_ref()
            }
            None => false,
        }
    }
}
