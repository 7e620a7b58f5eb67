//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types, traits and functions of the
//! flowdraft crate, so that hosts can pull in the core builder surface with a single `use`.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowdraft::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let exported = std::fs::read_to_string("path/to/workflow.json")?;
//! let graph = import_graph(&exported)?;
//!
//! for error in validate_workflow(&graph) {
//!     println!("-> {}", error);
//! }
//! let tidy = auto_layout_graph(&graph);
//! let camera = compute_fit_to_view(&tidy.nodes, 1280.0, 720.0, None);
//! println!("zoom {:.2}", camera.zoom);
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{
    ActionData, ActionType, BranchHandle, ConditionData, ConditionOperator, DelayData, DelayUnit,
    Edge, EventType, FieldCatalog, FieldCondition, GraphCommand, IdGenerator, LogicOperator,
    Node, NodeData, NodeOverrides, NodeType, Position, TriggerData, Viewport, WorkflowGraph,
    create_node,
};

// Layout and validation
pub use crate::layout::{auto_layout_graph, compute_fit_to_view, snap_to_grid};
pub use crate::validation::{ValidationError, validate_workflow};

// Serialization
pub use crate::serialization::{
    IntoWorkflowGraph, WorkflowRule, deserialize_workflow_rule, export_graph, import_graph,
    serialize_workflow_graph,
};

// Interaction and session
pub use crate::interaction::{CanvasConfig, InteractionController, Key};
pub use crate::session::{BuilderSession, InMemoryStore, NavigationDecision, WorkflowStore};

// Error types
pub use crate::error::{CommandError, ImportError, SaveError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
