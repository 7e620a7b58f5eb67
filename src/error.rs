use thiserror::Error;

/// Errors that can occur while importing a workflow graph document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    #[error("Failed to parse workflow graph JSON: {0}")]
    Malformed(String),

    #[error(
        "Unsupported graph version {}: expected {expected}",
        .found.map_or_else(|| "(missing)".to_string(), |v| v.to_string())
    )]
    UnsupportedVersion { found: Option<i64>, expected: i64 },
}

/// Errors raised when a node's `data` payload does not fit its declared `type`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeDecodeError {
    #[error("Node '{node_id}' has an invalid '{node_type}' payload: {message}")]
    InvalidPayload {
        node_id: String,
        node_type: String,
        message: String,
    },
}

/// Errors reported by a `WorkflowStore` implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Workflow rule '{0}' not found")]
    NotFound(String),

    #[error("Storage backend failure: {0}")]
    Backend(String),
}

/// Errors that can occur when saving a builder session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    #[error("Workflow has {} validation error(s) and cannot be saved", .0.len())]
    Invalid(Vec<crate::validation::ValidationError>),

    #[error("A save is already in progress for this workflow")]
    InFlight,

    #[error("Save ticket does not belong to the outstanding save")]
    StaleTicket,

    #[error("Failed to serialize workflow: {0}")]
    Serialization(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur when converting a persisted or foreign document into a `WorkflowGraph`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LegacyConversionError {
    #[error("Invalid persisted workflow data: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Reasons a `GraphCommand` is rejected without touching the graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Node '{0}' does not exist")]
    UnknownNode(String),

    #[error("Edge '{0}' does not exist")]
    UnknownEdge(String),

    #[error("Node '{0}' cannot be connected to itself")]
    SelfConnection(String),

    #[error("Trigger node '{0}' cannot be the target of a connection")]
    TargetIsTrigger(String),

    #[error("Connections from {node_type} node '{node_id}' have the wrong branch handle")]
    BranchMismatch {
        node_id: String,
        node_type: crate::graph::NodeType,
    },

    #[error("Node '{from_node}' is already connected to '{to_node}' on that output")]
    DuplicateEdge { from_node: String, to_node: String },

    #[error("Node '{node_id}' cannot change type from {from} to {to}")]
    TypeChange {
        node_id: String,
        from: crate::graph::NodeType,
        to: crate::graph::NodeType,
    },

    #[error("Trigger '{node_id}' has a schedule that does not fit its '{event_type}' event")]
    ScheduleMismatch {
        node_id: String,
        event_type: crate::graph::EventType,
    },
}

/// Errors that can occur when opening a builder session from a store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Conversion(#[from] LegacyConversionError),
}
