use crate::error::ImportError;
use crate::graph::{Edge, Node, Viewport, WorkflowGraph};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The graph format version this build reads and writes.
pub const GRAPH_VERSION: i64 = 2;

const VERSION_KEY: &str = "_graphVersion";

/// Portable, versioned representation of a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGraphFile {
    #[serde(rename = "_graphVersion")]
    pub graph_version: i64,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl WorkflowGraphFile {
    pub fn from_graph(graph: &WorkflowGraph) -> Self {
        Self {
            graph_version: GRAPH_VERSION,
            nodes: graph.nodes.clone(),
            edges: graph.edges.clone(),
            viewport: graph.viewport,
        }
    }

    /// Unwraps the graph, refusing any version other than [`GRAPH_VERSION`].
    pub fn into_graph(self) -> Result<WorkflowGraph, ImportError> {
        if self.graph_version != GRAPH_VERSION {
            return Err(ImportError::UnsupportedVersion {
                found: Some(self.graph_version),
                expected: GRAPH_VERSION,
            });
        }
        Ok(WorkflowGraph {
            nodes: self.nodes,
            edges: self.edges,
            viewport: self.viewport,
        })
    }
}

/// Serializes `graph` into a pretty-printed, versioned JSON document.
pub fn export_graph(graph: &WorkflowGraph) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&WorkflowGraphFile::from_graph(graph))
}

/// Serializes `graph` into a versioned JSON value, as embedded in persisted records.
pub fn graph_document(graph: &WorkflowGraph) -> Result<JsonValue, serde_json::Error> {
    serde_json::to_value(WorkflowGraphFile::from_graph(graph))
}

/// Parses a versioned graph document.
///
/// The version tag is checked before anything else is decoded, so a document from another
/// format version is rejected without attempting a partial read.
pub fn import_graph(json: &str) -> Result<WorkflowGraph, ImportError> {
    let value: JsonValue =
        serde_json::from_str(json).map_err(|e| ImportError::Malformed(e.to_string()))?;
    graph_from_document(value)
}

/// Decodes an already-parsed versioned graph document.
pub fn graph_from_document(value: JsonValue) -> Result<WorkflowGraph, ImportError> {
    check_version(&value)?;
    let file: WorkflowGraphFile =
        serde_json::from_value(value).map_err(|e| ImportError::Malformed(e.to_string()))?;
    file.into_graph()
}

/// Whether `value` is an object carrying a graph version tag, whatever its value.
pub fn has_version_tag(value: &JsonValue) -> bool {
    value.get(VERSION_KEY).is_some()
}

fn check_version(value: &JsonValue) -> Result<(), ImportError> {
    if !value.is_object() {
        return Err(ImportError::Malformed(
            "expected a JSON object at the document root".to_string(),
        ));
    }
    let found = value.get(VERSION_KEY).and_then(JsonValue::as_i64);
    if found == Some(GRAPH_VERSION) {
        Ok(())
    } else {
        Err(ImportError::UnsupportedVersion {
            found,
            expected: GRAPH_VERSION,
        })
    }
}
