// SPDX-License-Identifier: PMPL-1.0-or-later
//! Termview Frame
//!
//! Schema-aware, editable representation of JSON-LD documents.
//! Class frames loaded from the server describe what each property of a
//! class may hold; a [`FrameTree`] holds object, property and data frames
//! for one or more documents and re-serializes them losslessly.

pub mod classframe;
pub mod config;
pub mod data;
pub mod effects;
pub mod error;
pub mod namespace;
pub mod object;
pub mod property;
pub mod restriction;
pub mod schema;
pub mod tree;

pub use classframe::{ChoiceElement, ClassFrame, ClassFrameId, FrameType};
pub use config::{FrameConfig, UpdateTracking};
pub use data::DataFrame;
pub use effects::{EffectKey, Effects};
pub use error::{FrameError, FrameIssue, Result, SchemaError};
pub use namespace::{
    is_blank_node, mint_blank_node, normalize_variable, Namespaces, BLANK_NODE_PREFIX, VARIABLE_PREFIX,
};
pub use object::ObjectFrame;
pub use property::{CardAction, PropertyFrame};
pub use restriction::Restriction;
pub use schema::Schema;
pub use tree::{Frame, FrameId, FrameKind, FrameTree, Node};
