use super::export::WorkflowGraphFile;
use super::record::{WorkflowRule, deserialize_workflow_rule};
use crate::error::LegacyConversionError;
use crate::graph::WorkflowGraph;

/// A trait for document shapes that can be turned into a `WorkflowGraph`.
///
/// This is the extension point for feeding workflows from other storage formats into the
/// builder. Implement it on your own record type to provide the translation layer.
///
/// # Example
///
/// ```rust,no_run
/// use flowdraft::prelude::*;
/// use flowdraft::error::LegacyConversionError;
///
/// struct SpreadsheetRow { trigger: String }
///
/// impl IntoWorkflowGraph for SpreadsheetRow {
///     fn into_workflow_graph(self) -> std::result::Result<WorkflowGraph, LegacyConversionError> {
///         let event_type = EventType::from_name(&self.trigger).ok_or_else(|| {
///             let message = format!("unknown trigger '{}'", self.trigger);
///             LegacyConversionError::ValidationError(message)
///         })?;
///         let mut ids = IdGenerator::new();
///         let trigger = create_node(
///             &mut ids,
///             NodeType::Trigger,
///             Position::new(80.0, 120.0),
///             "Trigger",
///             NodeOverrides { event_type: Some(event_type), ..Default::default() },
///         );
///         Ok(WorkflowGraph { nodes: vec![trigger], ..Default::default() })
///     }
/// }
/// ```
pub trait IntoWorkflowGraph {
    /// Consumes the document and converts it into a workflow graph.
    fn into_workflow_graph(self) -> Result<WorkflowGraph, LegacyConversionError>;
}

impl IntoWorkflowGraph for WorkflowRule {
    fn into_workflow_graph(self) -> Result<WorkflowGraph, LegacyConversionError> {
        deserialize_workflow_rule(&self)
    }
}

impl IntoWorkflowGraph for WorkflowGraphFile {
    fn into_workflow_graph(self) -> Result<WorkflowGraph, LegacyConversionError> {
        Ok(self.into_graph()?)
    }
}
