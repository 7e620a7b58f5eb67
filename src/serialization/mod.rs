//! Conversions between the in-memory graph, the portable export file and the persisted
//! backend record.

mod conversion;
mod export;
mod legacy;
mod record;

pub use conversion::IntoWorkflowGraph;
pub use export::{
    GRAPH_VERSION, WorkflowGraphFile, export_graph, graph_document, graph_from_document,
    has_version_tag, import_graph,
};
pub use legacy::{legacy_event_type, upgrade_legacy_rule};
pub use record::{
    ActionStep, PersistedWorkflow, WorkflowRule, deserialize_workflow_rule,
    serialize_workflow_graph,
};
