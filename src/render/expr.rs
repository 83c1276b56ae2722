//! Canonical expression text for unevaluated trees
//!
//! The output is stable for equal trees regardless of how selector matchers
//! were ordered:
//!
//! ```text
//! SUM((rate(http_requests_total{job="api"}[5m]) * 8)) BY (instance)
//! ```
//!
//! Binary expressions are always fully parenthesized. Every node type
//! implements `Display` with [`CanonicalDuration`]; use [`render_expr_with`]
//! to format range windows differently.

use super::duration::{CanonicalDuration, DurationFormatter};
use super::text::format_value;
use crate::ast::{
    FunctionCall, LabelMatcher, MatrixNode, MatrixSelector, Node, ScalarNode, StringNode,
    VectorNode, VectorSelector,
};
use std::fmt::{self, Write};

/// Render a node with a custom duration formatter
pub fn render_expr_with(node: &Node, durations: &dyn DurationFormatter) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = ExprPrinter { durations }.node(&mut out, node);
    out
}

struct ExprPrinter<'a> {
    durations: &'a dyn DurationFormatter,
}

impl ExprPrinter<'static> {
    fn canonical() -> Self {
        Self {
            durations: &CanonicalDuration,
        }
    }
}

impl ExprPrinter<'_> {
    fn node(&self, out: &mut dyn Write, node: &Node) -> fmt::Result {
        match node {
            Node::Scalar(scalar) => self.scalar(out, scalar),
            Node::Vector(vector) => self.vector(out, vector),
            Node::Matrix(matrix) => self.matrix(out, matrix),
            Node::String(string) => self.string(out, string),
        }
    }

    fn scalar(&self, out: &mut dyn Write, node: &ScalarNode) -> fmt::Result {
        match node {
            ScalarNode::Literal(value) => out.write_str(&format_value(*value)),
            ScalarNode::Call(call) => self.call(out, call),
            ScalarNode::Arith(arith) => {
                out.write_char('(')?;
                self.scalar(out, &arith.lhs)?;
                write!(out, " {} ", arith.op)?;
                self.scalar(out, &arith.rhs)?;
                out.write_char(')')
            }
        }
    }

    fn vector(&self, out: &mut dyn Write, node: &VectorNode) -> fmt::Result {
        match node {
            VectorNode::Selector(selector) => self.selector(out, &selector.matchers),
            VectorNode::Call(call) => self.call(out, call),
            VectorNode::Aggregation(aggr) => {
                write!(out, "{}(", aggr.kind)?;
                self.vector(out, &aggr.vector)?;
                out.write_char(')')?;
                if !aggr.group_by.is_empty() {
                    write!(out, " BY ({})", aggr.group_by.join(", "))?;
                }
                Ok(())
            }
            VectorNode::Arith(arith) => {
                out.write_char('(')?;
                self.node(out, &arith.lhs)?;
                write!(out, " {} ", arith.op)?;
                self.node(out, &arith.rhs)?;
                out.write_char(')')
            }
        }
    }

    fn matrix(&self, out: &mut dyn Write, node: &MatrixNode) -> fmt::Result {
        match node {
            MatrixNode::Selector(selector) => self.range_selector(out, selector),
        }
    }

    fn string(&self, out: &mut dyn Write, node: &StringNode) -> fmt::Result {
        match node {
            StringNode::Literal(text) => write!(out, "{:?}", text),
            StringNode::Call(call) => self.call(out, call),
        }
    }

    fn call(&self, out: &mut dyn Write, call: &FunctionCall) -> fmt::Result {
        write!(out, "{}(", call.name)?;
        for (i, arg) in call.args.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            self.node(out, arg)?;
        }
        out.write_char(')')
    }

    fn selector(&self, out: &mut dyn Write, matchers: &[LabelMatcher]) -> fmt::Result {
        // Only the first name matcher becomes the prefix; any others stay labels
        let name_at = matchers.iter().position(LabelMatcher::is_metric_name);
        let mut labels: Vec<String> = matchers
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != name_at)
            .map(|(_, matcher)| matcher.to_string())
            .collect();

        if let Some(i) = name_at {
            out.write_str(&matchers[i].value)?;
        }
        if !labels.is_empty() {
            labels.sort();
            write!(out, "{{{}}}", labels.join(","))?;
        }
        Ok(())
    }

    fn range_selector(&self, out: &mut dyn Write, selector: &MatrixSelector) -> fmt::Result {
        self.selector(out, &selector.matchers)?;
        write!(out, "[{}]", self.durations.format_duration(selector.range))
    }
}

impl fmt::Display for LabelMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:?}", self.name, self.op, self.value)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExprPrinter::canonical().node(f, self)
    }
}

impl fmt::Display for ScalarNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExprPrinter::canonical().scalar(f, self)
    }
}

impl fmt::Display for VectorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExprPrinter::canonical().vector(f, self)
    }
}

impl fmt::Display for MatrixNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExprPrinter::canonical().matrix(f, self)
    }
}

impl fmt::Display for StringNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExprPrinter::canonical().string(f, self)
    }
}

impl fmt::Display for VectorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExprPrinter::canonical().selector(f, &self.matchers)
    }
}

impl fmt::Display for MatrixSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ExprPrinter::canonical().range_selector(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AggregationKind, BinaryOpKind, MatchOp};
    use crate::model::METRIC_NAME_LABEL;
    use std::time::Duration;

    fn selector(name: &str) -> VectorNode {
        VectorNode::selector(VectorSelector::metric(name))
    }

    #[test]
    fn test_selector_labels_sorted() {
        let node = VectorSelector::new().label("b", "2").label("a", "1");
        assert_eq!(node.to_string(), r#"{a="1",b="2"}"#);
    }

    #[test]
    fn test_selector_name_is_prefix_wherever_it_appears() {
        let node = VectorSelector::new()
            .label("job", "api")
            .matcher(LabelMatcher::metric_name("http_requests_total"))
            .matcher(LabelMatcher::new("code", MatchOp::NotEqual, "200"));

        assert_eq!(node.to_string(), r#"http_requests_total{code!="200",job="api"}"#);
    }

    #[test]
    fn test_duplicate_name_matcher_keeps_first_as_prefix() {
        let node = VectorSelector::metric("first").matcher(LabelMatcher::metric_name("second"));

        assert_eq!(node.metric_name(), Some("first"));
        assert_eq!(node.to_string(), r#"first{__name__="second"}"#);
    }

    #[test]
    fn test_bare_metric_name_has_no_braces() {
        assert_eq!(selector("up").to_string(), "up");
    }

    #[test]
    fn test_regex_matchers() {
        let node = VectorSelector::metric("http_requests_total")
            .matcher(LabelMatcher::new("path", MatchOp::RegexNoMatch, "/api/.*"))
            .matcher(LabelMatcher::new("code", MatchOp::RegexMatch, "5.."));

        assert_eq!(
            node.to_string(),
            r#"http_requests_total{code=~"5..",path!~"/api/.*"}"#
        );
    }

    #[test]
    fn test_regex_on_name_label_stays_in_braces() {
        let node = VectorSelector::new().matcher(LabelMatcher::new(
            METRIC_NAME_LABEL,
            MatchOp::RegexMatch,
            "http_.*",
        ));
        assert_eq!(node.to_string(), r#"{__name__=~"http_.*"}"#);
    }

    #[test]
    fn test_literals() {
        assert_eq!(ScalarNode::literal(2.5).to_string(), "2.5");
        assert_eq!(ScalarNode::literal(10.0).to_string(), "10");
        assert_eq!(StringNode::literal("a \"b\"").to_string(), r#""a \"b\"""#);
    }

    #[test]
    fn test_scalar_arith_fully_parenthesized() {
        let node = ScalarNode::arith(
            BinaryOpKind::Mul,
            ScalarNode::arith(
                BinaryOpKind::Add,
                ScalarNode::literal(1.0),
                ScalarNode::literal(2.0),
            ),
            ScalarNode::literal(3.0),
        );
        assert_eq!(node.to_string(), "((1 + 2) * 3)");
    }

    #[test]
    fn test_vector_arith_mixed_operands() {
        let node = VectorNode::arith(BinaryOpKind::Gt, selector("load"), ScalarNode::literal(0.8));
        assert_eq!(node.to_string(), "(load > 0.8)");

        let node = VectorNode::arith(BinaryOpKind::And, selector("a"), selector("b"));
        assert_eq!(node.to_string(), "(a AND b)");
    }

    #[test]
    fn test_aggregation() {
        let node = VectorNode::aggregate(AggregationKind::Count, selector("up"));
        assert_eq!(node.to_string(), "COUNT(up)");

        let node = VectorNode::aggregate_by(AggregationKind::Avg, selector("up"), ["zone", "job"]);
        assert_eq!(node.to_string(), "AVG(up) BY (zone, job)");
    }

    #[test]
    fn test_function_calls() {
        let rate = FunctionCall::new("rate").arg(MatrixNode::selector(
            VectorSelector::metric("http_requests_total")
                .label("job", "api")
                .range(Duration::from_secs(300)),
        ));
        assert_eq!(
            VectorNode::call(rate).to_string(),
            r#"rate(http_requests_total{job="api"}[5m])"#
        );

        let time = FunctionCall::new("time");
        assert_eq!(ScalarNode::call(time).to_string(), "time()");

        let call = FunctionCall::new("label_join")
            .arg(selector("up"))
            .arg(StringNode::literal("dst"))
            .arg(ScalarNode::literal(1.0));
        assert_eq!(StringNode::call(call).to_string(), r#"label_join(up, "dst", 1)"#);
    }

    #[test]
    fn test_matrix_selector_compound_duration() {
        let node = MatrixNode::selector(VectorSelector::metric("up").range(Duration::from_secs(5400)));
        assert_eq!(node.to_string(), "up[1h30m]");
    }

    #[test]
    fn test_custom_duration_formatter() {
        struct Seconds;

        impl DurationFormatter for Seconds {
            fn format_duration(&self, duration: Duration) -> String {
                format!("{}s", duration.as_secs())
            }
        }

        let node: Node =
            MatrixNode::selector(VectorSelector::metric("up").range(Duration::from_secs(120)))
                .into();
        assert_eq!(render_expr_with(&node, &Seconds), "up[120s]");
        assert_eq!(node.to_string(), "up[2m]");
    }

    #[test]
    fn test_nested_tree() {
        let inner = VectorNode::arith(
            BinaryOpKind::Mul,
            VectorNode::call(FunctionCall::new("rate").arg(MatrixNode::selector(
                VectorSelector::metric("bytes_total").range(Duration::from_secs(60)),
            ))),
            ScalarNode::literal(8.0),
        );
        let node = VectorNode::aggregate_by(AggregationKind::Sum, inner, ["instance"]);

        assert_eq!(
            node.to_string(),
            "SUM((rate(bytes_total[1m]) * 8)) BY (instance)"
        );
    }
}
