// SPDX-License-Identifier: PMPL-1.0-or-later
//! Frame model error types.
//!
//! Schema problems are reported through [`SchemaError`]; the loader logs and
//! skips the offending class frame instead of aborting. Operations on a
//! [`FrameTree`](crate::FrameTree) return [`FrameError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::{FrameId, FrameKind};

/// Errors raised while reading class-frame schema responses.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("invalid class frame for {property}: {reason}")]
    InvalidFrame { property: String, reason: String },

    #[error("invalid restriction: {0}")]
    InvalidRestriction(String),

    #[error("class frame response for {0} is not a list")]
    NotAList(String),
}

/// Errors raised by frame tree operations.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("frame not found: {0}")]
    NotFound(FrameId),

    #[error("frame {id} is not a {expected} frame")]
    WrongKind { id: FrameId, expected: FrameKind },

    #[error("unknown property {property} for class {class}")]
    UnknownProperty { class: String, property: String },

    #[error("value index {index} out of range ({len} values)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crate-level result alias using [`FrameError`].
pub type Result<T> = std::result::Result<T, FrameError>;

/// A non-fatal problem recorded on an object frame while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameIssue {
    /// Property the problem was found on.
    pub property: String,
    /// What went wrong.
    pub message: String,
}

impl FrameIssue {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}
