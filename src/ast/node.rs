//! Expression tree nodes
//!
//! A [`Node`] is partitioned by the kind of value it evaluates to, so the
//! result kind of any node is known structurally and every consumer matches
//! exhaustively over exactly four cases.
//!
//! Trees are built once (normally by an external parser) and never mutated.
//! Children are owned by their parent.

use super::ops::{AggregationKind, BinaryOpKind, MatchOp, ResultKind};
use crate::model::METRIC_NAME_LABEL;
use std::time::Duration;

/// Any expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(ScalarNode),
    Vector(VectorNode),
    Matrix(MatrixNode),
    String(StringNode),
}

impl Node {
    /// The kind of value this node evaluates to
    pub fn kind(&self) -> ResultKind {
        match self {
            Self::Scalar(_) => ResultKind::Scalar,
            Self::Vector(_) => ResultKind::Vector,
            Self::Matrix(_) => ResultKind::Matrix,
            Self::String(_) => ResultKind::String,
        }
    }
}

impl From<ScalarNode> for Node {
    fn from(node: ScalarNode) -> Self {
        Self::Scalar(node)
    }
}

impl From<VectorNode> for Node {
    fn from(node: VectorNode) -> Self {
        Self::Vector(node)
    }
}

impl From<MatrixNode> for Node {
    fn from(node: MatrixNode) -> Self {
        Self::Matrix(node)
    }
}

impl From<StringNode> for Node {
    fn from(node: StringNode) -> Self {
        Self::String(node)
    }
}

/// A call of a named function
///
/// The same shape serves scalar, vector and string functions; which one it is
/// follows from where the call sits in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Function name as written
    pub name: String,
    /// Arguments in call order
    pub args: Vec<Node>,
}

impl FunctionCall {
    /// Create a call with no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Builder method: append an argument
    pub fn arg(mut self, arg: impl Into<Node>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Expressions evaluating to a single number
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarNode {
    Literal(f64),
    Call(FunctionCall),
    Arith(Box<ScalarArith>),
}

impl ScalarNode {
    /// A numeric literal
    pub fn literal(value: f64) -> Self {
        Self::Literal(value)
    }

    /// A scalar function call
    pub fn call(call: FunctionCall) -> Self {
        Self::Call(call)
    }

    /// `(lhs op rhs)` over two scalars
    pub fn arith(op: BinaryOpKind, lhs: ScalarNode, rhs: ScalarNode) -> Self {
        Self::Arith(Box::new(ScalarArith { op, lhs, rhs }))
    }
}

/// Binary expression over two scalars
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarArith {
    pub op: BinaryOpKind,
    pub lhs: ScalarNode,
    pub rhs: ScalarNode,
}

/// Expressions evaluating to an instant vector
#[derive(Debug, Clone, PartialEq)]
pub enum VectorNode {
    Selector(VectorSelector),
    Call(FunctionCall),
    Aggregation(Box<VectorAggregation>),
    Arith(Box<VectorArith>),
}

impl VectorNode {
    /// A series selector
    pub fn selector(selector: VectorSelector) -> Self {
        Self::Selector(selector)
    }

    /// A vector function call
    pub fn call(call: FunctionCall) -> Self {
        Self::Call(call)
    }

    /// An aggregation without grouping labels
    pub fn aggregate(kind: AggregationKind, vector: VectorNode) -> Self {
        Self::Aggregation(Box::new(VectorAggregation {
            kind,
            group_by: Vec::new(),
            vector,
        }))
    }

    /// An aggregation grouped by the given labels
    pub fn aggregate_by<I, S>(kind: AggregationKind, vector: VectorNode, group_by: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Aggregation(Box::new(VectorAggregation {
            kind,
            group_by: group_by.into_iter().map(Into::into).collect(),
            vector,
        }))
    }

    /// `(lhs op rhs)` where at least one side is normally a vector
    pub fn arith(op: BinaryOpKind, lhs: impl Into<Node>, rhs: impl Into<Node>) -> Self {
        Self::Arith(Box::new(VectorArith {
            op,
            lhs: lhs.into(),
            rhs: rhs.into(),
        }))
    }
}

/// Aggregation of a vector expression
#[derive(Debug, Clone, PartialEq)]
pub struct VectorAggregation {
    pub kind: AggregationKind,
    /// Grouping labels in declared order; empty means aggregate everything
    pub group_by: Vec<String>,
    pub vector: VectorNode,
}

/// Binary expression with at least one vector operand
#[derive(Debug, Clone, PartialEq)]
pub struct VectorArith {
    pub op: BinaryOpKind,
    pub lhs: Node,
    pub rhs: Node,
}

/// Expressions evaluating to a range of samples per series
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixNode {
    Selector(MatrixSelector),
}

impl MatrixNode {
    /// A range selector
    pub fn selector(selector: MatrixSelector) -> Self {
        Self::Selector(selector)
    }
}

/// Expressions evaluating to text
#[derive(Debug, Clone, PartialEq)]
pub enum StringNode {
    Literal(String),
    Call(FunctionCall),
}

impl StringNode {
    /// A string literal
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// A string function call
    pub fn call(call: FunctionCall) -> Self {
        Self::Call(call)
    }
}

/// A constraint on one label of a series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatcher {
    pub name: String,
    pub op: MatchOp,
    pub value: String,
}

impl LabelMatcher {
    /// Create a matcher
    pub fn new(name: impl Into<String>, op: MatchOp, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op,
            value: value.into(),
        }
    }

    /// `name="value"`
    pub fn equal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, MatchOp::Equal, value)
    }

    /// Matcher on the reserved metric name label
    pub fn metric_name(name: impl Into<String>) -> Self {
        Self::equal(METRIC_NAME_LABEL, name)
    }

    /// Whether this matcher pins the metric name
    ///
    /// Only an equality matcher on the reserved label names the metric; a
    /// regex or negated matcher on it is an ordinary label constraint.
    pub fn is_metric_name(&self) -> bool {
        self.name == METRIC_NAME_LABEL && self.op == MatchOp::Equal
    }
}

/// Selects the latest sample of every matching series
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorSelector {
    pub matchers: Vec<LabelMatcher>,
}

impl VectorSelector {
    /// Selector with no matchers
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector on a metric name
    pub fn metric(name: impl Into<String>) -> Self {
        Self::new().matcher(LabelMatcher::metric_name(name))
    }

    /// Builder method: add a matcher
    pub fn matcher(mut self, matcher: LabelMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// Builder method: add an equality matcher
    pub fn label(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.matcher(LabelMatcher::equal(name, value))
    }

    /// Value of the first metric name matcher, if any
    pub fn metric_name(&self) -> Option<&str> {
        self.matchers
            .iter()
            .find(|m| m.is_metric_name())
            .map(|m| m.value.as_str())
    }

    /// Turn into a range selector over the given window
    pub fn range(self, range: Duration) -> MatrixSelector {
        MatrixSelector {
            matchers: self.matchers,
            range,
        }
    }
}

/// Selects all samples of every matching series within a trailing window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixSelector {
    pub matchers: Vec<LabelMatcher>,
    pub range: Duration,
}

impl MatrixSelector {
    /// The equivalent instant selector, without the window
    pub fn as_vector_selector(&self) -> VectorSelector {
        VectorSelector {
            matchers: self.matchers.clone(),
        }
    }
}
