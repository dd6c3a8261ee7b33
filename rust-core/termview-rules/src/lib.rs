// SPDX-License-Identifier: PMPL-1.0-or-later
//! Termview Rules
//!
//! Declarative display rules. A rule pairs a pattern with a bag of display
//! effects: [`WoqlRule`]s match rows, columns, cells, nodes and edges of
//! query results; [`FrameRule`]s match frames of a
//! [`termview_frame::FrameTree`] and are applied over a whole tree by
//! [`FrameFilter::mfilter`].

pub mod comparison;
pub mod constraint;
pub mod error;
pub mod frame_pattern;
pub mod frame_rule;
pub mod pattern;
pub mod ruleset;
pub mod traversal;
pub mod woql_pattern;
pub mod woql_rule;

pub use comparison::{as_number, CmpOp, Comparison, NumberTest};
pub use constraint::{Constraint, ValueTest};
pub use error::{Result, RuleError};
pub use frame_pattern::{renderer_type, FramePattern, FrameStatus};
pub use frame_rule::FrameRule;
pub use pattern::{Scope, TerminusPattern};
pub use ruleset::RuleSet;
pub use traversal::FrameFilter;
pub use woql_pattern::{row_value, Row, WoqlPattern};
pub use woql_rule::WoqlRule;
