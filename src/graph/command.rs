use super::edge::{BranchHandle, Edge};
use super::ids::IdGenerator;
use super::model::{Position, WorkflowGraph};
use super::node::{NodeData, NodeOverrides, NodeType, create_node};
use crate::error::CommandError;

/// A single committed edit to a workflow graph.
///
/// This is the only vocabulary through which the interaction layer and the builder session
/// change a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphCommand {
    AddNode {
        node_type: NodeType,
        position: Position,
        label: String,
        overrides: NodeOverrides,
    },
    MoveNode {
        node_id: String,
        position: Position,
    },
    UpdateNode {
        node_id: String,
        label: Option<String>,
        data: Option<NodeData>,
    },
    /// Removes the node and every edge touching it.
    DeleteNode { node_id: String },
    Connect {
        source: String,
        target: String,
        handle: Option<BranchHandle>,
    },
    DeleteEdge { edge_id: String },
}

/// What an applied command changed.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    NodeAdded(String),
    NodeMoved(String),
    NodeUpdated(String),
    NodeDeleted { node_id: String, removed_edges: usize },
    EdgeAdded(String),
    EdgeDeleted(String),
}

impl CommandOutcome {
    /// Id of the node or edge the command acted on.
    pub fn subject_id(&self) -> &str {
        match self {
            CommandOutcome::NodeAdded(id)
            | CommandOutcome::NodeMoved(id)
            | CommandOutcome::NodeUpdated(id)
            | CommandOutcome::NodeDeleted { node_id: id, .. }
            | CommandOutcome::EdgeAdded(id)
            | CommandOutcome::EdgeDeleted(id) => id,
        }
    }
}

impl WorkflowGraph {
    /// Checks whether an edge `source -> target` leaving `handle` may be added.
    ///
    /// Targets may never be triggers or the source itself, condition sources must name a
    /// branch (and only condition sources may), and identical edges are not duplicated.
    pub fn check_connection(
        &self,
        source: &str,
        target: &str,
        handle: Option<BranchHandle>,
    ) -> Result<(), CommandError> {
        let source_node = self
            .node(source)
            .ok_or_else(|| CommandError::UnknownNode(source.to_string()))?;
        let target_node = self
            .node(target)
            .ok_or_else(|| CommandError::UnknownNode(target.to_string()))?;

        if source == target {
            return Err(CommandError::SelfConnection(source.to_string()));
        }
        if target_node.node_type() == NodeType::Trigger {
            return Err(CommandError::TargetIsTrigger(target.to_string()));
        }
        let is_condition = source_node.node_type() == NodeType::Condition;
        if is_condition != handle.is_some() {
            return Err(CommandError::BranchMismatch {
                node_id: source.to_string(),
                node_type: source_node.node_type(),
            });
        }
        if self.has_edge(source, target, handle) {
            return Err(CommandError::DuplicateEdge {
                from_node: source.to_string(),
                to_node: target.to_string(),
            });
        }
        Ok(())
    }

    /// Applies `command`, drawing any new ids from `ids`.
    ///
    /// A rejected command leaves the graph untouched.
    pub fn apply(
        &mut self,
        command: GraphCommand,
        ids: &mut IdGenerator,
    ) -> Result<CommandOutcome, CommandError> {
        match command {
            GraphCommand::AddNode {
                node_type,
                position,
                label,
                overrides,
            } => {
                let node = create_node(ids, node_type, position, label, overrides);
                let node_id = node.id.clone();
                self.nodes.push(node);
                Ok(CommandOutcome::NodeAdded(node_id))
            }
            GraphCommand::MoveNode { node_id, position } => {
                let node = self
                    .node_mut(&node_id)
                    .ok_or_else(|| CommandError::UnknownNode(node_id.clone()))?;
                node.position = position;
                Ok(CommandOutcome::NodeMoved(node_id))
            }
            GraphCommand::UpdateNode {
                node_id,
                label,
                data,
            } => {
                let node = self
                    .node_mut(&node_id)
                    .ok_or_else(|| CommandError::UnknownNode(node_id.clone()))?;
                if let Some(data) = &data {
                    if data.node_type() != node.node_type() {
                        return Err(CommandError::TypeChange {
                            node_id,
                            from: node.node_type(),
                            to: data.node_type(),
                        });
                    }
                    if let NodeData::Trigger(trigger) = data {
                        if !trigger.schedule_matches_event() {
                            return Err(CommandError::ScheduleMismatch {
                                node_id,
                                event_type: trigger.event_type,
                            });
                        }
                    }
                }
                if let Some(label) = label {
                    node.label = label;
                }
                if let Some(data) = data {
                    node.data = data;
                }
                Ok(CommandOutcome::NodeUpdated(node_id))
            }
            GraphCommand::DeleteNode { node_id } => {
                let before = self.nodes.len();
                self.nodes.retain(|n| n.id != node_id);
                if self.nodes.len() == before {
                    return Err(CommandError::UnknownNode(node_id));
                }
                let edges_before = self.edges.len();
                self.edges.retain(|e| !e.touches(&node_id));
                Ok(CommandOutcome::NodeDeleted {
                    removed_edges: edges_before - self.edges.len(),
                    node_id,
                })
            }
            GraphCommand::Connect {
                source,
                target,
                handle,
            } => {
                self.check_connection(&source, &target, handle)?;
                let edge = Edge::new(ids.next_edge_id(), source, target, handle);
                let edge_id = edge.id.clone();
                self.edges.push(edge);
                Ok(CommandOutcome::EdgeAdded(edge_id))
            }
            GraphCommand::DeleteEdge { edge_id } => {
                let before = self.edges.len();
                self.edges.retain(|e| e.id != edge_id);
                if self.edges.len() == before {
                    return Err(CommandError::UnknownEdge(edge_id));
                }
                Ok(CommandOutcome::EdgeDeleted(edge_id))
            }
        }
    }
}
