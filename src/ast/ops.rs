//! Closed enumerations of the expression language and their canonical symbols
//!
//! Every enum here is exhaustive: each variant maps to exactly one non-empty
//! symbol and there is no fallback arm, so an unknown operator cannot exist.

use serde::{Deserialize, Serialize};

/// Binary operators of arithmetic, comparison and set expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    Lt,
    Eq,
    Ne,
    Ge,
    Le,
    And,
    Or,
}

impl BinaryOpKind {
    /// Get all operators for iteration
    pub fn all() -> &'static [BinaryOpKind] {
        &[
            Self::Add,
            Self::Sub,
            Self::Mul,
            Self::Div,
            Self::Mod,
            Self::Gt,
            Self::Lt,
            Self::Eq,
            Self::Ne,
            Self::Ge,
            Self::Le,
            Self::And,
            Self::Or,
        ]
    }

    /// Canonical symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    /// Whether the operator compares rather than computes
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Gt | Self::Lt | Self::Eq | Self::Ne | Self::Ge | Self::Le
        )
    }
}

impl std::fmt::Display for BinaryOpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregations over the samples of a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

impl AggregationKind {
    /// Get all aggregations for iteration
    pub fn all() -> &'static [AggregationKind] {
        &[Self::Sum, Self::Avg, Self::Min, Self::Max, Self::Count]
    }

    /// Canonical symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Count => "COUNT",
        }
    }
}

impl std::fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of value an expression evaluates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Scalar,
    Vector,
    Matrix,
    String,
}

impl ResultKind {
    /// Get all result kinds for iteration
    pub fn all() -> &'static [ResultKind] {
        &[Self::Scalar, Self::Vector, Self::Matrix, Self::String]
    }

    /// Canonical name, also used as the JSON envelope type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vector => "vector",
            Self::Matrix => "matrix",
            Self::String => "string",
        }
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a label matcher compares a label value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOp {
    /// Exact match
    Equal,
    /// Exact mismatch
    NotEqual,
    /// Regular expression match
    RegexMatch,
    /// Regular expression mismatch
    RegexNoMatch,
}

impl MatchOp {
    /// Get all match operators for iteration
    pub fn all() -> &'static [MatchOp] {
        &[
            Self::Equal,
            Self::NotEqual,
            Self::RegexMatch,
            Self::RegexNoMatch,
        ]
    }

    /// Canonical symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::RegexMatch => "=~",
            Self::RegexNoMatch => "!~",
        }
    }
}

impl std::fmt::Display for MatchOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
