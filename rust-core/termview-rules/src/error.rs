// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule engine error types.
//!
//! Only rule authoring can fail. Matching never returns an error: a
//! predicate that cannot be evaluated counts as a non-match.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("invalid comparison '{0}'")]
    InvalidComparison(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;
