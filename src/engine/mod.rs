//! Evaluation collaborators
//!
//! The renderers never compute values themselves. A query engine plugs in
//! through two traits:
//!
//! - [`QueryPreparer`] acquires whatever context (storage handles, preloaded
//!   chunks) evaluation at one instant needs, returning a [`PreparedQuery`]
//! - [`Evaluator`] computes the value of a node, one method per result kind
//!
//! [`ContextGuard`] owns a prepared query for the duration of one call and
//! closes it exactly once when dropped.

use crate::ast::{MatrixNode, Node, ScalarNode, StringNode, VectorNode};
use crate::model::{Matrix, Timestamp, Vector};
use crate::stats::TimerGroup;

/// Error type returned by collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for collaborator calls
pub type EvalResult<T> = Result<T, BoxError>;

/// Computes the value of a node at one instant
pub trait Evaluator {
    fn eval_scalar(&self, node: &ScalarNode, timestamp: Timestamp) -> EvalResult<f64>;

    fn eval_vector(&self, node: &VectorNode, timestamp: Timestamp) -> EvalResult<Vector>;

    fn eval_matrix(&self, node: &MatrixNode, timestamp: Timestamp) -> EvalResult<Matrix>;

    fn eval_string(&self, node: &StringNode, timestamp: Timestamp) -> EvalResult<String>;
}

/// Acquires the evaluation context for one query
///
/// Implementations own the storage they read from. Preparation may block.
pub trait QueryPreparer {
    fn prepare(
        &self,
        node: &Node,
        timestamp: Timestamp,
        stats: &TimerGroup,
    ) -> EvalResult<Box<dyn PreparedQuery>>;
}

/// A prepared evaluation context that must be released after use
pub trait PreparedQuery {
    /// Release everything acquired during preparation
    fn close(&mut self);
}

/// Closes a prepared query when dropped
pub struct ContextGuard {
    inner: Option<Box<dyn PreparedQuery>>,
}

impl ContextGuard {
    /// Take ownership of a prepared query
    pub fn new(prepared: Box<dyn PreparedQuery>) -> Self {
        Self {
            inner: Some(prepared),
        }
    }

    /// Close now instead of at the end of scope
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut prepared) = self.inner.take() {
            prepared.close();
            tracing::trace!("Released prepared query context");
        }
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ContextGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextGuard")
            .field("open", &self.inner.is_some())
            .finish()
    }
}
