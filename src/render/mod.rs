//! Rendering of expressions and evaluated values
//!
//! - **Text**: human-readable lines for scalars, vectors and matrices
//! - **JSON**: a versioned `{type, value, version}` envelope
//! - **Expr**: canonical source text for expression trees
//! - **DOT**: Graphviz graphs of expression trees
//! - **Dispatch**: evaluate a node and render the result in one step

pub mod dispatch;
pub mod dot;
pub mod duration;
pub mod error;
pub mod expr;
pub mod json;
pub mod text;

pub use dispatch::{coerce_to_vector, render_value, Dispatcher, OutputFormat};
pub use dot::{configured_dot_graph, node_tree_to_dot, to_dot_graph};
pub use duration::{CanonicalDuration, DurationFormatter};
pub use error::{RenderError, RenderResult};
pub use expr::render_expr_with;
pub use json::{error_to_json, typed_value_to_json, ScalarPayload, JSON_FORMAT_VERSION};
pub use text::{format_value, scalar_to_text};
