//! Graphviz DOT rendering of expression trees
//!
//! Each node becomes one declaration and one edge per direct child:
//!
//! ```text
//! n0[label="rate"];
//! n0 -> n1;
//! n1[label="http_requests_total[5m]"];
//! ```
//!
//! Node ids come from a counter local to one render call. Ids of a node's
//! children are assigned before any child is visited, so a node's edges are
//! written right after its declaration.

use super::text::format_value;
use crate::ast::{FunctionCall, MatrixNode, Node, ScalarNode, StringNode, VectorNode};
use crate::config::GraphConfig;
use std::fmt::Write;

/// DOT statements for a tree, without the enclosing `digraph`
pub fn node_tree_to_dot(node: &Node) -> String {
    let mut writer = DotWriter::default();
    let root = writer.alloc();
    writer.node(node, root);
    writer.out
}

/// A complete `digraph` document named `name`
pub fn to_dot_graph(node: &Node, name: &str) -> String {
    let mut graph = format!("digraph \"{}\" {{\n", escape_label(name));
    for line in node_tree_to_dot(node).lines() {
        graph.push_str("  ");
        graph.push_str(line);
        graph.push('\n');
    }
    graph.push_str("}\n");
    graph
}

/// A complete `digraph` document named after the configured graph name
pub fn configured_dot_graph(node: &Node, config: &GraphConfig) -> String {
    to_dot_graph(node, &config.name)
}

fn escape_label(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[derive(Default)]
struct DotWriter {
    out: String,
    next_id: usize,
}

impl DotWriter {
    fn alloc(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn declare(&mut self, id: usize, label: &str) {
        let _ = writeln!(self.out, "n{}[label=\"{}\"];", id, escape_label(label));
    }

    /// Allocate a child id and write the edge to it
    fn link(&mut self, parent: usize) -> usize {
        let child = self.alloc();
        let _ = writeln!(self.out, "n{} -> n{};", parent, child);
        child
    }

    fn node(&mut self, node: &Node, id: usize) {
        match node {
            Node::Scalar(scalar) => self.scalar(scalar, id),
            Node::Vector(vector) => self.vector(vector, id),
            Node::Matrix(matrix) => self.matrix(matrix, id),
            Node::String(string) => self.string(string, id),
        }
    }

    fn scalar(&mut self, node: &ScalarNode, id: usize) {
        match node {
            ScalarNode::Literal(value) => self.declare(id, &format_value(*value)),
            ScalarNode::Call(call) => self.call(call, id),
            ScalarNode::Arith(arith) => {
                self.declare(id, arith.op.as_str());
                let lhs = self.link(id);
                let rhs = self.link(id);
                self.scalar(&arith.lhs, lhs);
                self.scalar(&arith.rhs, rhs);
            }
        }
    }

    fn vector(&mut self, node: &VectorNode, id: usize) {
        match node {
            VectorNode::Selector(selector) => self.declare(id, &selector.to_string()),
            VectorNode::Call(call) => self.call(call, id),
            VectorNode::Aggregation(aggr) => {
                let label = format!("{} BY ({})", aggr.kind, aggr.group_by.join(", "));
                self.declare(id, &label);
                let child = self.link(id);
                self.vector(&aggr.vector, child);
            }
            VectorNode::Arith(arith) => {
                self.declare(id, arith.op.as_str());
                let lhs = self.link(id);
                let rhs = self.link(id);
                self.node(&arith.lhs, lhs);
                self.node(&arith.rhs, rhs);
            }
        }
    }

    fn matrix(&mut self, node: &MatrixNode, id: usize) {
        match node {
            MatrixNode::Selector(selector) => self.declare(id, &selector.to_string()),
        }
    }

    fn string(&mut self, node: &StringNode, id: usize) {
        match node {
            StringNode::Literal(text) => self.declare(id, &format!("'{:?}'", text)),
            StringNode::Call(call) => self.call(call, id),
        }
    }

    fn call(&mut self, call: &FunctionCall, id: usize) {
        self.declare(id, &call.name);
        let children: Vec<usize> = call.args.iter().map(|_| self.link(id)).collect();
        for (arg, child) in call.args.iter().zip(children) {
            self.node(arg, child);
        }
    }
}
