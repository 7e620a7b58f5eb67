use super::edge::{BranchHandle, Edge};
use super::node::{Node, NodeType};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point in the unbounded canvas coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// The camera transform applied when drawing the canvas.
///
/// `x` and `y` are the screen-pixel offset of the canvas origin; `zoom` scales canvas units
/// to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Converts a screen-space point into canvas coordinates.
    pub fn screen_to_canvas(&self, screen: Position) -> Position {
        Position::new(
            (screen.x - self.x) / self.zoom,
            (screen.y - self.y) / self.zoom,
        )
    }

    /// Converts a canvas-space point into screen coordinates.
    pub fn canvas_to_screen(&self, canvas: Position) -> Position {
        Position::new(canvas.x * self.zoom + self.x, canvas.y * self.zoom + self.y)
    }
}

/// A complete workflow graph: nodes, directed edges and the camera they were authored under.
///
/// The structure itself enforces nothing beyond its shape; structural rules are checked by
/// [`crate::validation::validate_workflow`] so that editing may pass through invalid states.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl WorkflowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    pub fn edge(&self, edge_id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == edge_id)
    }

    /// All trigger nodes, in node order.
    pub fn triggers(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| n.node_type() == NodeType::Trigger)
    }

    /// Returns the trigger node if the graph has exactly one.
    pub fn sole_trigger(&self) -> Option<&Node> {
        let mut triggers = self.triggers();
        match (triggers.next(), triggers.next()) {
            (Some(trigger), None) => Some(trigger),
            _ => None,
        }
    }

    /// Edges leaving `node_id`, in edge order.
    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// Edges entering `node_id`, in edge order.
    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Whether an edge with exactly this source, target and branch already exists.
    pub fn has_edge(&self, source: &str, target: &str, handle: Option<BranchHandle>) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target && e.source_handle == handle)
    }

    /// Builds the forward adjacency list, `source -> [target]`, preserving edge order.
    ///
    /// Nodes without outgoing edges have no entry; callers treat a missing entry as an empty
    /// list, which also covers edges whose source does not exist.
    pub fn adjacency(&self) -> AHashMap<&str, Vec<&str>> {
        let mut adjacency: AHashMap<&str, Vec<&str>> = AHashMap::new();
        for edge in &self.edges {
            adjacency
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }
        adjacency
    }
}
