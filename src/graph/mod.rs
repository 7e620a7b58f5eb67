//! The workflow graph data model: nodes, edges, viewport and the commands that edit them.

mod command;
mod edge;
mod fields;
mod ids;
mod model;
mod node;

pub use command::{CommandOutcome, GraphCommand};
pub use edge::{BranchHandle, Edge};
pub use fields::{
    FieldCatalog, FieldDataType, FieldDefinition, FieldNamespace, ResolvedField, ValueInput,
};
pub use ids::IdGenerator;
pub use model::{Position, Viewport, WorkflowGraph};
pub use node::{
    ActionData, ActionFamily, ActionType, ConditionData, ConditionOperator, DelayData, DelayUnit,
    EventType, FieldCondition, LogicOperator, Node, NodeData, NodeOverrides, NodeType,
    OperatorArity, Schedule, TriggerData, create_node,
};
