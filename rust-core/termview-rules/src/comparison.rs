// SPDX-License-Identifier: PMPL-1.0-or-later
//! Numeric comparisons written as operator-prefixed strings (`">45"`, `"<=3"`).
//!
//! Expressions are parsed into an operator and an operand up front and
//! evaluated directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::RuleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
        }
    }

    fn eval(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
        }
    }
}

// Longest operators first so "<=" is not read as "<".
const OPERATORS: [(&str, CmpOp); 8] = [
    ("<=", CmpOp::Le),
    (">=", CmpOp::Ge),
    ("==", CmpOp::Eq),
    ("!=", CmpOp::Ne),
    ("<", CmpOp::Lt),
    (">", CmpOp::Gt),
    ("=", CmpOp::Eq),
    ("!", CmpOp::Ne),
];

/// `candidate <op> operand`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub op: CmpOp,
    pub operand: f64,
}

impl Comparison {
    pub fn new(op: CmpOp, operand: f64) -> Self {
        Self { op, operand }
    }

    pub fn matches(&self, candidate: f64) -> bool {
        self.op.eval(candidate, self.operand)
    }

    /// Whether `text` starts with a comparison operator.
    pub fn looks_like(text: &str) -> bool {
        let text = text.trim_start();
        OPERATORS.iter().any(|(sym, _)| text.starts_with(sym))
    }
}

impl FromStr for Comparison {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (op, rest) = OPERATORS
            .iter()
            .find_map(|(sym, op)| text.strip_prefix(sym).map(|rest| (*op, rest)))
            .unwrap_or((CmpOp::Eq, text));
        let operand: f64 = rest
            .trim()
            .parse()
            .map_err(|_| RuleError::InvalidComparison(s.to_string()))?;
        if !operand.is_finite() {
            return Err(RuleError::InvalidComparison(s.to_string()));
        }
        Ok(Comparison { op, operand })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.operand)
    }
}

/// An exact number or a comparison expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberTest {
    Exact(Number),
    Expr(String),
}

impl NumberTest {
    pub fn matches(&self, candidate: f64) -> bool {
        match self {
            NumberTest::Exact(n) => n.as_f64() == Some(candidate),
            NumberTest::Expr(expr) => match expr.parse::<Comparison>() {
                Ok(cmp) => cmp.matches(candidate),
                Err(e) => {
                    debug!(expr = %expr, error = %e, "Numeric test failed to parse; no match");
                    false
                }
            },
        }
    }

    /// Test a JSON value (number, numeric string or `@value` literal).
    pub fn matches_value(&self, value: &Value) -> bool {
        as_number(value).is_some_and(|n| self.matches(n))
    }
}

impl From<u64> for NumberTest {
    fn from(n: u64) -> Self {
        NumberTest::Exact(n.into())
    }
}

impl From<i64> for NumberTest {
    fn from(n: i64) -> Self {
        NumberTest::Exact(n.into())
    }
}

impl From<&str> for NumberTest {
    fn from(expr: &str) -> Self {
        NumberTest::Expr(expr.to_string())
    }
}

impl fmt::Display for NumberTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberTest::Exact(n) => write!(f, "{n}"),
            NumberTest::Expr(expr) => write!(f, "'{expr}'"),
        }
    }
}

/// Numeric reading of a JSON value, unwrapping `@value`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok().filter(|n: &f64| n.is_finite()),
        Value::Object(map) => map.get("@value").and_then(as_number),
        _ => None,
    }
}
