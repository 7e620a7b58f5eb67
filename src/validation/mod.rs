//! Structural validation of workflow graphs.
//!
//! Validation never fails: it returns the list of problems that keep a graph from being
//! saved. An empty list means the graph is savable. Every check runs on every call, so a
//! graph can report several problems at once.

use crate::graph::{BranchHandle, Node, NodeType, WorkflowGraph};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// A single structural problem, optionally attributed to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub message: String,
}

impl ValidationError {
    fn graph(message: impl Into<String>) -> Self {
        Self {
            node_id: None,
            message: message.into(),
        }
    }

    fn node(node: &Node, message: impl Into<String>) -> Self {
        Self {
            node_id: Some(node.id.clone()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node_id {
            Some(node_id) => write!(f, "[{}] {}", node_id, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Runs all structural checks, in order: trigger cardinality, reachability, condition
/// branch completeness and cycle detection.
pub fn validate_workflow(graph: &WorkflowGraph) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let adjacency = graph.adjacency();

    validate_trigger_count(graph, &mut errors);
    validate_reachability(graph, &adjacency, &mut errors);
    validate_condition_branches(graph, &mut errors);
    detect_cycles(graph, &adjacency, &mut errors);

    errors
}

fn validate_trigger_count(graph: &WorkflowGraph, errors: &mut Vec<ValidationError>) {
    match graph.triggers().count() {
        0 => errors.push(ValidationError::graph("Workflow must have a trigger node")),
        1 => {}
        _ => errors.push(ValidationError::graph(
            "Workflow can only have one trigger node",
        )),
    }
}

/// Breadth-first walk from the sole trigger; every node it does not reach is reported.
///
/// Skipped when the trigger count is not exactly one, since there is no single root.
fn validate_reachability(
    graph: &WorkflowGraph,
    adjacency: &AHashMap<&str, Vec<&str>>,
    errors: &mut Vec<ValidationError>,
) {
    let Some(trigger) = graph.sole_trigger() else {
        return;
    };

    let mut reachable: AHashSet<&str> = AHashSet::new();
    let mut queue = VecDeque::new();
    reachable.insert(trigger.id.as_str());
    queue.push_back(trigger.id.as_str());

    while let Some(current) = queue.pop_front() {
        for &next in adjacency.get(current).map(|v| v.as_slice()).unwrap_or(&[]) {
            if reachable.insert(next) {
                queue.push_back(next);
            }
        }
    }

    for node in &graph.nodes {
        if !reachable.contains(node.id.as_str()) {
            errors.push(ValidationError::node(
                node,
                format!("Node \"{}\" is not reachable from the trigger", node.label),
            ));
        }
    }
}

fn validate_condition_branches(graph: &WorkflowGraph, errors: &mut Vec<ValidationError>) {
    for node in graph
        .nodes
        .iter()
        .filter(|n| n.node_type() == NodeType::Condition)
    {
        let has_branch = |branch: BranchHandle| {
            graph
                .outgoing(&node.id)
                .any(|e| e.source_handle == Some(branch))
        };
        if !has_branch(BranchHandle::True) || !has_branch(BranchHandle::False) {
            errors.push(ValidationError::node(
                node,
                format!(
                    "Condition \"{}\" must have both true and false branches connected",
                    node.label
                ),
            ));
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Three-color depth-first search over every node. Reports at most one cycle.
///
/// Uses an explicit stack; edge endpoints that are not nodes of the graph are ignored.
fn detect_cycles(
    graph: &WorkflowGraph,
    adjacency: &AHashMap<&str, Vec<&str>>,
    errors: &mut Vec<ValidationError>,
) {
    let mut color: AHashMap<&str, Color> = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), Color::White))
        .collect();

    for node in &graph.nodes {
        if color.get(node.id.as_str()) != Some(&Color::White) {
            continue;
        }

        // Each frame is a node and the index of the next neighbour to visit.
        let mut stack: Vec<(&str, usize)> = vec![(node.id.as_str(), 0)];
        color.insert(node.id.as_str(), Color::Gray);

        while let Some((current, next_index)) = stack.last_mut() {
            let neighbours = adjacency.get(*current).map(|v| v.as_slice()).unwrap_or(&[]);
            let Some(&next) = neighbours.get(*next_index) else {
                color.insert(*current, Color::Black);
                stack.pop();
                continue;
            };
            *next_index += 1;

            match color.get(next) {
                Some(Color::White) => {
                    color.insert(next, Color::Gray);
                    stack.push((next, 0));
                }
                Some(Color::Gray) => {
                    errors.push(ValidationError::graph("Workflow contains a cycle"));
                    return;
                }
                Some(Color::Black) | None => {}
            }
        }
    }
}
