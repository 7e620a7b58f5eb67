use super::geometry::snap_to_grid;
use super::{GRID_SIZE, LAYER_SPACING_X, LAYOUT_BASELINE_Y, LAYOUT_MARGIN_X, NODE_SPACING_Y};
use crate::graph::{Position, WorkflowGraph};
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;

/// Re-derives node positions using layered breadth-first placement.
///
/// The root (the trigger, or the first node when there is none) sits in layer 0 and every
/// reachable node takes the layer of its shortest hop distance from it. Unreachable nodes each
/// get their own trailing layer. Only positions change; ids, data, edges and the viewport are
/// carried over as-is.
pub fn auto_layout_graph(graph: &WorkflowGraph) -> WorkflowGraph {
    let mut laid_out = graph.clone();
    let Some(root) = graph
        .triggers()
        .next()
        .or_else(|| graph.nodes.first())
        .map(|n| n.id.as_str())
    else {
        return laid_out;
    };

    let layer_of = assign_layers(graph, root);

    // Group node ids per layer, keeping BFS discovery order within a layer.
    let layer_count = layer_of.values().map(|(layer, _)| layer + 1).max().unwrap_or(0);
    let mut layers: Vec<Vec<(usize, &str)>> = vec![Vec::new(); layer_count];
    for (&node_id, &(layer, order)) in &layer_of {
        layers[layer].push((order, node_id));
    }
    for layer in &mut layers {
        layer.sort_unstable_by_key(|(order, _)| *order);
    }

    let mut positions: AHashMap<&str, Position> = AHashMap::new();
    for (layer_index, members) in layers.iter().enumerate() {
        let x = LAYOUT_MARGIN_X + layer_index as f64 * LAYER_SPACING_X;
        let span = (members.len().saturating_sub(1)) as f64 * NODE_SPACING_Y;
        let top = LAYOUT_BASELINE_Y - span / 2.0;
        for (slot, (_, node_id)) in members.iter().enumerate() {
            let y = top + slot as f64 * NODE_SPACING_Y;
            positions.insert(*node_id, snap_to_grid(Position::new(x, y), GRID_SIZE));
        }
    }

    for node in &mut laid_out.nodes {
        if let Some(position) = positions.get(node.id.as_str()) {
            node.position = *position;
        }
    }
    laid_out
}

/// Maps every node id to `(layer, discovery order)`.
fn assign_layers<'a>(graph: &'a WorkflowGraph, root: &'a str) -> AHashMap<&'a str, (usize, usize)> {
    let adjacency = graph.adjacency();
    let known: AHashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

    let mut layer_of: AHashMap<&str, (usize, usize)> = AHashMap::new();
    let mut order = 0;
    let mut queue = VecDeque::new();
    layer_of.insert(root, (0, order));
    queue.push_back(root);

    while let Some(current) = queue.pop_front() {
        let layer = layer_of.get(current).map_or(0, |(layer, _)| *layer);
        for &next in adjacency.get(current).map(|v| v.as_slice()).unwrap_or(&[]) {
            if !known.contains(next) || layer_of.contains_key(next) {
                continue;
            }
            order += 1;
            layer_of.insert(next, (layer + 1, order));
            queue.push_back(next);
        }
    }

    let mut next_layer = layer_of.values().map(|(layer, _)| layer + 1).max().unwrap_or(0);
    for node in &graph.nodes {
        if layer_of.contains_key(node.id.as_str()) {
            continue;
        }
        order += 1;
        layer_of.insert(node.id.as_str(), (next_layer, order));
        next_layer += 1;
    }

    layer_of
}
