//! # Promview
//!
//! Rendering layer for a time-series query language: turns expression trees
//! and their evaluated results into text, JSON and Graphviz output.
//!
//! ## Modules
//!
//! - [`ast`]: Typed expression tree
//! - [`model`]: Evaluated values (scalars, vectors, matrices, strings)
//! - [`render`]: Text, JSON, expression and DOT renderers plus the dispatcher
//! - [`engine`]: Evaluator and query-preparation collaborator traits
//! - [`stats`]: Per-query phase timers
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust
//! use promview::ast::{AggregationKind, Node, VectorNode, VectorSelector};
//! use promview::model::{Metric, Sample, Timestamp, Value, Vector};
//! use promview::render::{render_value, to_dot_graph, OutputFormat};
//!
//! let node: Node = VectorNode::aggregate(
//!     AggregationKind::Sum,
//!     VectorNode::selector(VectorSelector::metric("up")),
//! )
//! .into();
//! assert_eq!(node.to_string(), "SUM(up)");
//! assert!(to_dot_graph(&node, "query").starts_with("digraph"));
//!
//! let ts = Timestamp::from_secs(10);
//! let value = Value::Vector(Vector::new().push(Sample::new(Metric::named("up"), 1.0, ts)));
//! assert_eq!(render_value(&value, ts, OutputFormat::Text), "up => 1 @[10]");
//! ```

pub mod ast;
pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod render;
pub mod stats;

pub use config::Config;
pub use render::{Dispatcher, OutputFormat, RenderError, RenderResult};
