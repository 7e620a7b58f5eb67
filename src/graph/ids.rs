use super::model::WorkflowGraph;

const NODE_PREFIX: &str = "node_";
const EDGE_PREFIX: &str = "edge_";

/// Issues node and edge ids for one editing session.
///
/// Ids only need to be unique within a single loaded graph, so the counters live with the
/// session rather than in process-wide state.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next_node: u64,
    next_edge: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            next_node: 1,
            next_edge: 1,
        }
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator whose next ids sort after every id already present in `graph`.
    ///
    /// A suffix too large to count past is skipped; the counter can never reach it.
    pub fn resume_from(graph: &WorkflowGraph) -> Self {
        Self {
            next_node: next_after(graph.nodes.iter().map(|n| n.id.as_str()), NODE_PREFIX),
            next_edge: next_after(graph.edges.iter().map(|e| e.id.as_str()), EDGE_PREFIX),
        }
    }

    pub fn next_node_id(&mut self) -> String {
        let id = format!("{}{}", NODE_PREFIX, self.next_node);
        self.next_node = self.next_node.saturating_add(1);
        id
    }

    pub fn next_edge_id(&mut self) -> String {
        let id = format!("{}{}", EDGE_PREFIX, self.next_edge);
        self.next_edge = self.next_edge.saturating_add(1);
        id
    }
}

fn next_after<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> u64 {
    ids.filter_map(|id| numeric_suffix(id, prefix)?.checked_add(1))
        .max()
        .unwrap_or(1)
}

fn numeric_suffix(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}
