//! Query Expression Tree
//!
//! Types for an already-parsed query expression:
//!
//! - **ops**: closed operator and kind enumerations with canonical symbols
//! - **node**: the node tree, partitioned by result kind
//!
//! Parsing text into these types is not part of this crate; trees are built by
//! a parser elsewhere or with the builder helpers on each node type.
//!
//! # Example
//!
//! ```rust
//! use promview::ast::*;
//!
//! let rate = VectorNode::aggregate_by(
//!     AggregationKind::Sum,
//!     VectorNode::selector(VectorSelector::metric("http_requests_total").label("job", "api")),
//!     ["instance"],
//! );
//!
//! assert_eq!(
//!     rate.to_string(),
//!     r#"SUM(http_requests_total{job="api"}) BY (instance)"#
//! );
//! ```

mod node;
mod ops;

pub use node::{
    FunctionCall, LabelMatcher, MatrixNode, MatrixSelector, Node, ScalarArith, ScalarNode,
    StringNode, VectorAggregation, VectorArith, VectorNode, VectorSelector,
};
pub use ops::{AggregationKind, BinaryOpKind, MatchOp, ResultKind};
