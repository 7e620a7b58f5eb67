use crate::graph::{BranchHandle, Node, NodeType, Position, WorkflowGraph};
use crate::layout::{NODE_HEIGHT, NODE_WIDTH, node_rect};

/// What lies under a canvas point.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    Background,
    NodeBody(String),
    /// An output handle; `handle` names the branch for condition nodes.
    OutputHandle {
        node_id: String,
        handle: Option<BranchHandle>,
    },
}

/// Where the output handle `handle` of `node` sits.
pub fn output_handle_position(node: &Node, handle: Option<BranchHandle>) -> Position {
    let x = node.position.x + NODE_WIDTH;
    let y = match handle {
        Some(BranchHandle::True) => node.position.y + NODE_HEIGHT / 3.0,
        Some(BranchHandle::False) => node.position.y + NODE_HEIGHT * 2.0 / 3.0,
        None => node.position.y + NODE_HEIGHT / 2.0,
    };
    Position::new(x, y)
}

/// Every output handle of `node`: the two branches for a condition, one plain output otherwise.
pub fn output_handles(node: &Node) -> Vec<Option<BranchHandle>> {
    match node.node_type() {
        NodeType::Condition => vec![Some(BranchHandle::True), Some(BranchHandle::False)],
        _ => vec![None],
    }
}

fn within(point: Position, anchor: Position, radius: f64) -> bool {
    (point.x - anchor.x).abs() <= radius && (point.y - anchor.y).abs() <= radius
}

/// Finds what is under `canvas`. Later nodes are drawn on top, and within a node its handles
/// win over its body.
pub fn hit_test(graph: &WorkflowGraph, canvas: Position, handle_radius: f64) -> HitTarget {
    for node in graph.nodes.iter().rev() {
        for handle in output_handles(node) {
            if within(canvas, output_handle_position(node, handle), handle_radius) {
                return HitTarget::OutputHandle {
                    node_id: node.id.clone(),
                    handle,
                };
            }
        }
        if node_rect(node).contains(canvas) {
            return HitTarget::NodeBody(node.id.clone());
        }
    }
    HitTarget::Background
}

/// Nodes whose left edge is within `radius` of `canvas`, topmost first.
pub fn nodes_at_input_edge(
    graph: &WorkflowGraph,
    canvas: Position,
    radius: f64,
) -> impl Iterator<Item = &Node> {
    graph.nodes.iter().rev().filter(move |n| {
        (canvas.x - n.position.x).abs() <= radius
            && canvas.y >= n.position.y - radius
            && canvas.y <= n.position.y + NODE_HEIGHT + radius
    })
}
