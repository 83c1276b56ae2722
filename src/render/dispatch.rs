//! Evaluate-and-render entry points
//!
//! # Pipeline
//!
//! ```text
//! start TotalEvalTime
//!   prepare (TotalQueryPreparationTime) → ContextGuard
//!   evaluate (InnerEvalTime)            → Value
//!   render as text | JSON  /  coerce to Vector
//! drop ContextGuard (closes the prepared query), stop TotalEvalTime
//! ```
//!
//! A preparation failure is returned to the caller and evaluation is skipped.

use super::error::{RenderError, RenderResult};
use super::json::{typed_value_to_json, ScalarPayload};
use super::text::scalar_to_text;
use crate::ast::{Node, ResultKind};
use crate::config::OutputConfig;
use crate::engine::{ContextGuard, Evaluator, QueryPreparer};
use crate::model::{Metric, Sample, Timestamp, Value, Vector, STRING_VALUE_LABEL};
use crate::stats::{QueryTiming, TimerGroup};
use serde::{Deserialize, Serialize};

/// Output formats for evaluated values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Versioned JSON envelope
    Json,
}

impl OutputFormat {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Render an evaluated value in the given format
pub fn render_value(value: &Value, timestamp: Timestamp, format: OutputFormat) -> String {
    match (format, value) {
        (OutputFormat::Text, Value::Scalar(scalar)) => scalar_to_text(*scalar, timestamp),
        (OutputFormat::Text, Value::Vector(vector)) => vector.to_string(),
        (OutputFormat::Text, Value::Matrix(matrix)) => matrix.to_string(),
        (OutputFormat::Text, Value::String(text)) => text.clone(),
        (OutputFormat::Json, Value::Scalar(scalar)) => {
            typed_value_to_json(&ScalarPayload(*scalar), ResultKind::Scalar)
        }
        (OutputFormat::Json, Value::Vector(vector)) => {
            typed_value_to_json(vector, ResultKind::Vector)
        }
        (OutputFormat::Json, Value::Matrix(matrix)) => {
            typed_value_to_json(matrix, ResultKind::Matrix)
        }
        (OutputFormat::Json, Value::String(text)) => {
            typed_value_to_json(&string_vector(text, timestamp), ResultKind::String)
        }
    }
}

/// Coerce an evaluated value into an instant vector
///
/// Scalars become one sample with an empty metric, strings one sample
/// labeled `__value__` with no numeric value. Matrices are rejected.
pub fn coerce_to_vector(value: Value, timestamp: Timestamp) -> RenderResult<Vector> {
    match value {
        Value::Scalar(scalar) => {
            Ok(Vector::new().push(Sample::new(Metric::new(), scalar, timestamp)))
        }
        Value::Vector(vector) => Ok(vector),
        Value::Matrix(_) => Err(matrix_unsupported()),
        Value::String(text) => Ok(string_vector(&text, timestamp)),
    }
}

fn string_vector(text: &str, timestamp: Timestamp) -> Vector {
    Vector::new().push(Sample::without_value(
        Metric::new().label(STRING_VALUE_LABEL, text),
        timestamp,
    ))
}

fn matrix_unsupported() -> RenderError {
    RenderError::UnsupportedOperation("matrices cannot be converted to a vector".to_string())
}

/// Evaluates nodes through the collaborators and renders the results
pub struct Dispatcher<'a> {
    preparer: &'a dyn QueryPreparer,
    evaluator: &'a dyn Evaluator,
    default_format: OutputFormat,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher rendering text by default
    pub fn new(preparer: &'a dyn QueryPreparer, evaluator: &'a dyn Evaluator) -> Self {
        Self {
            preparer,
            evaluator,
            default_format: OutputFormat::default(),
        }
    }

    /// Create a dispatcher using the configured default format
    pub fn from_config(
        preparer: &'a dyn QueryPreparer,
        evaluator: &'a dyn Evaluator,
        config: &OutputConfig,
    ) -> Self {
        Self::new(preparer, evaluator).with_format(config.format)
    }

    /// Builder method: set the format used by [`Dispatcher::render`]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.default_format = format;
        self
    }

    /// The format used by [`Dispatcher::render`]
    pub fn default_format(&self) -> OutputFormat {
        self.default_format
    }

    /// Evaluate and render in the default format
    pub fn render(
        &self,
        node: &Node,
        timestamp: Timestamp,
        stats: &TimerGroup,
    ) -> RenderResult<String> {
        self.eval_to_string(node, timestamp, self.default_format, stats)
    }

    /// Evaluate `node` at `timestamp` and render the result as `format`
    #[tracing::instrument(skip_all, fields(kind = %node.kind(), format = %format))]
    pub fn eval_to_string(
        &self,
        node: &Node,
        timestamp: Timestamp,
        format: OutputFormat,
        stats: &TimerGroup,
    ) -> RenderResult<String> {
        let _total = stats.start(QueryTiming::TotalEvalTime);
        let _context = self.prepare(node, timestamp, stats)?;
        let value = self.evaluate(node, timestamp, stats)?;
        Ok(render_value(&value, timestamp, format))
    }

    /// Evaluate `node` at `timestamp` as an instant vector
    ///
    /// Fails with [`RenderError::UnsupportedOperation`] for matrix nodes.
    #[tracing::instrument(skip_all, fields(kind = %node.kind()))]
    pub fn eval_to_vector(
        &self,
        node: &Node,
        timestamp: Timestamp,
        stats: &TimerGroup,
    ) -> RenderResult<Vector> {
        let _total = stats.start(QueryTiming::TotalEvalTime);
        let _context = self.prepare(node, timestamp, stats)?;
        if node.kind() == ResultKind::Matrix {
            return Err(matrix_unsupported());
        }
        let value = self.evaluate(node, timestamp, stats)?;
        coerce_to_vector(value, timestamp)
    }

    fn prepare(
        &self,
        node: &Node,
        timestamp: Timestamp,
        stats: &TimerGroup,
    ) -> RenderResult<ContextGuard> {
        let timer = stats.start(QueryTiming::TotalQueryPreparationTime);
        let prepared = self.preparer.prepare(node, timestamp, stats);
        timer.stop();

        match prepared {
            Ok(prepared) => Ok(ContextGuard::new(prepared)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to prepare query");
                Err(RenderError::ContextPreparation(e))
            }
        }
    }

    fn evaluate(
        &self,
        node: &Node,
        timestamp: Timestamp,
        stats: &TimerGroup,
    ) -> RenderResult<Value> {
        let timer = stats.start(QueryTiming::InnerEvalTime);
        let evaluator = self.evaluator;
        let value = match node {
            Node::Scalar(n) => evaluator.eval_scalar(n, timestamp).map(Value::Scalar),
            Node::Vector(n) => evaluator.eval_vector(n, timestamp).map(Value::Vector),
            Node::Matrix(n) => evaluator.eval_matrix(n, timestamp).map(Value::Matrix),
            Node::String(n) => evaluator.eval_string(n, timestamp).map(Value::String),
        };
        let elapsed = timer.stop();

        match value {
            Ok(value) => {
                tracing::debug!(kind = %value.kind(), ?elapsed, "Evaluated node");
                Ok(value)
            }
            Err(e) => Err(RenderError::Evaluation(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{MatrixNode, ScalarNode, StringNode, VectorNode, VectorSelector};
    use crate::engine::{EvalResult, PreparedQuery};
    use crate::model::{Matrix, SeriesPoints};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingQuery {
        closes: Arc<AtomicUsize>,
    }

    impl PreparedQuery for CountingQuery {
        fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Evaluates every node to a fixed value per kind
    #[derive(Default)]
    struct FakeEngine {
        fail_prepare: bool,
        fail_eval: bool,
        prepares: AtomicUsize,
        evals: AtomicUsize,
        closes: Arc<AtomicUsize>,
    }

    impl FakeEngine {
        fn evaluated<T>(&self, value: T) -> EvalResult<T> {
            self.evals.fetch_add(1, Ordering::SeqCst);
            if self.fail_eval {
                return Err("chunk missing".into());
            }
            Ok(value)
        }
    }

    impl QueryPreparer for FakeEngine {
        fn prepare(
            &self,
            _node: &Node,
            _timestamp: Timestamp,
            _stats: &TimerGroup,
        ) -> EvalResult<Box<dyn PreparedQuery>> {
            self.prepares.fetch_add(1, Ordering::SeqCst);
            if self.fail_prepare {
                return Err("storage offline".into());
            }
            Ok(Box::new(CountingQuery {
                closes: self.closes.clone(),
            }))
        }
    }

    impl Evaluator for FakeEngine {
        fn eval_scalar(&self, _node: &ScalarNode, _timestamp: Timestamp) -> EvalResult<f64> {
            self.evaluated(3.5)
        }

        fn eval_vector(&self, _node: &VectorNode, timestamp: Timestamp) -> EvalResult<Vector> {
            self.evaluated(
                Vector::new()
                    .push(Sample::new(Metric::named("up").label("job", "b"), 1.0, timestamp))
                    .push(Sample::new(Metric::named("up").label("job", "a"), 0.0, timestamp)),
            )
        }

        fn eval_matrix(&self, _node: &MatrixNode, _timestamp: Timestamp) -> EvalResult<Matrix> {
            self.evaluated(Matrix::from(vec![SeriesPoints::new(Metric::named("up"))
                .point(1.0, Timestamp::from_secs(1))]))
        }

        fn eval_string(&self, _node: &StringNode, _timestamp: Timestamp) -> EvalResult<String> {
            self.evaluated("hello".to_string())
        }
    }

    fn scalar_node() -> Node {
        ScalarNode::literal(3.5).into()
    }

    fn vector_node() -> Node {
        VectorNode::selector(VectorSelector::metric("up")).into()
    }

    fn matrix_node() -> Node {
        MatrixNode::selector(VectorSelector::metric("up").range(Duration::from_secs(60))).into()
    }

    fn string_node() -> Node {
        StringNode::literal("hello").into()
    }

    fn ts() -> Timestamp {
        Timestamp::from_secs(100)
    }

    #[test]
    fn test_scalar_text_and_json() {
        let engine = FakeEngine::default();
        let dispatcher = Dispatcher::new(&engine, &engine);
        let stats = TimerGroup::new();

        let text = dispatcher
            .eval_to_string(&scalar_node(), ts(), OutputFormat::Text, &stats)
            .unwrap();
        assert_eq!(text, "scalar: 3.5 @[100]");

        let json = dispatcher
            .eval_to_string(&scalar_node(), ts(), OutputFormat::Json, &stats)
            .unwrap();
        assert_eq!(json, r#"{"type":"scalar","value":3.5,"version":1}"#);
    }

    #[test]
    fn test_non_finite_scalar_json() {
        let value = Value::Scalar(f64::NEG_INFINITY);
        assert_eq!(
            render_value(&value, ts(), OutputFormat::Json),
            r#"{"type":"scalar","value":"-Inf","version":1}"#
        );
        assert_eq!(render_value(&value, ts(), OutputFormat::Text), "scalar: -Inf @[100]");
    }

    #[test]
    fn test_vector_text_keeps_evaluator_order() {
        let engine = FakeEngine::default();
        let dispatcher = Dispatcher::new(&engine, &engine);
        let stats = TimerGroup::new();

        let text = dispatcher
            .eval_to_string(&vector_node(), ts(), OutputFormat::Text, &stats)
            .unwrap();
        assert_eq!(
            text,
            "up{job=\"b\"} => 1 @[100]\nup{job=\"a\"} => 0 @[100]"
        );
    }

    #[test]
    fn test_matrix_and_string_json_tags() {
        let engine = FakeEngine::default();
        let dispatcher = Dispatcher::new(&engine, &engine).with_format(OutputFormat::Json);
        let stats = TimerGroup::new();

        let matrix = dispatcher.render(&matrix_node(), ts(), &stats).unwrap();
        assert!(matrix.starts_with(r#"{"type":"matrix","value":[{"metric":{"__name__":"up"}"#));

        let string = dispatcher.render(&string_node(), ts(), &stats).unwrap();
        assert_eq!(
            string,
            r#"{"type":"string","value":[{"metric":{"__value__":"hello"},"value":null,"timestamp":100.0}],"version":1}"#
        );
    }

    #[test]
    fn test_string_text_is_raw() {
        let engine = FakeEngine::default();
        let dispatcher = Dispatcher::new(&engine, &engine);
        let stats = TimerGroup::new();

        assert_eq!(dispatcher.render(&string_node(), ts(), &stats).unwrap(), "hello");
    }

    #[test]
    fn test_vector_coercions() {
        let engine = FakeEngine::default();
        let dispatcher = Dispatcher::new(&engine, &engine);
        let stats = TimerGroup::new();

        let scalar = dispatcher.eval_to_vector(&scalar_node(), ts(), &stats).unwrap();
        assert_eq!(scalar.len(), 1);
        assert!(scalar.0[0].metric.is_empty());
        assert_eq!(scalar.0[0].value, Some(3.5));

        let vector = dispatcher.eval_to_vector(&vector_node(), ts(), &stats).unwrap();
        assert_eq!(vector.len(), 2);
        assert_eq!(vector.0[0].metric.get("job"), Some("b"));

        let string = dispatcher.eval_to_vector(&string_node(), ts(), &stats).unwrap();
        assert_eq!(string.len(), 1);
        assert_eq!(string.0[0].metric.len(), 1);
        assert_eq!(string.0[0].metric.get(STRING_VALUE_LABEL), Some("hello"));
        assert_eq!(string.0[0].value, None);
    }

    #[test]
    fn test_matrix_to_vector_is_unsupported() {
        let engine = FakeEngine::default();
        let dispatcher = Dispatcher::new(&engine, &engine);
        let stats = TimerGroup::new();

        let result = dispatcher.eval_to_vector(&matrix_node(), ts(), &stats);
        assert!(matches!(result, Err(RenderError::UnsupportedOperation(_))));
        assert_eq!(engine.evals.load(Ordering::SeqCst), 0);
        assert_eq!(engine.closes.load(Ordering::SeqCst), 1);
        assert_eq!(stats.count(QueryTiming::TotalEvalTime), 1);
    }

    #[test]
    fn test_preparation_failure_propagates() {
        let engine = FakeEngine {
            fail_prepare: true,
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(&engine, &engine);
        let stats = TimerGroup::new();

        let result = dispatcher.eval_to_string(&vector_node(), ts(), OutputFormat::Text, &stats);
        match result {
            Err(RenderError::ContextPreparation(e)) => assert_eq!(e.to_string(), "storage offline"),
            other => panic!("expected preparation failure, got {:?}", other),
        }

        let result = dispatcher.eval_to_vector(&scalar_node(), ts(), &stats);
        assert!(matches!(result, Err(RenderError::ContextPreparation(_))));

        assert_eq!(engine.prepares.load(Ordering::SeqCst), 2);
        assert_eq!(engine.evals.load(Ordering::SeqCst), 0);
        assert_eq!(engine.closes.load(Ordering::SeqCst), 0);
        assert_eq!(stats.count(QueryTiming::TotalEvalTime), 2);
        assert_eq!(stats.count(QueryTiming::TotalQueryPreparationTime), 2);
        assert_eq!(stats.count(QueryTiming::InnerEvalTime), 0);
    }

    #[test]
    fn test_evaluation_failure_releases_context() {
        let engine = FakeEngine {
            fail_eval: true,
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(&engine, &engine);
        let stats = TimerGroup::new();

        let result = dispatcher.eval_to_string(&scalar_node(), ts(), OutputFormat::Json, &stats);
        assert!(matches!(result, Err(RenderError::Evaluation(_))));
        assert_eq!(engine.closes.load(Ordering::SeqCst), 1);
        assert_eq!(stats.count(QueryTiming::InnerEvalTime), 1);
    }

    #[test]
    fn test_success_records_all_timers_and_closes_once() {
        let engine = FakeEngine::default();
        let dispatcher = Dispatcher::new(&engine, &engine);
        let stats = TimerGroup::new();

        dispatcher
            .eval_to_string(&vector_node(), ts(), OutputFormat::Text, &stats)
            .unwrap();

        assert_eq!(engine.closes.load(Ordering::SeqCst), 1);
        for timing in QueryTiming::all() {
            assert_eq!(stats.count(*timing), 1, "{} not recorded", timing);
        }
        assert!(
            stats.elapsed(QueryTiming::TotalEvalTime)
                >= stats.elapsed(QueryTiming::InnerEvalTime)
        );
    }

    #[test]
    fn test_from_config_sets_default_format() {
        let engine = FakeEngine::default();
        let config = OutputConfig {
            format: OutputFormat::Json,
        };
        let dispatcher = Dispatcher::from_config(&engine, &engine, &config);
        assert_eq!(dispatcher.default_format(), OutputFormat::Json);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("yaml"), None);
    }
}
