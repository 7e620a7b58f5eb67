use super::export::{graph_document, graph_from_document, has_version_tag};
use super::legacy::upgrade_legacy_rule;
use crate::error::LegacyConversionError;
use crate::graph::{ActionType, EventType, NodeData, WorkflowGraph};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::VecDeque;

/// A workflow rule as stored by the backend.
///
/// The record shape predates the graph model: `trigger_type`, `conditions` and `actions` are
/// the fields older consumers read, and the graph is projected onto them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, alias = "trigger_type")]
    pub trigger_type: String,
    #[serde(default)]
    pub conditions: JsonValue,
    #[serde(default)]
    pub actions: JsonValue,
}

impl WorkflowRule {
    /// A rule with no graph authored yet.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: false,
            trigger_type: String::new(),
            conditions: JsonValue::Null,
            actions: JsonValue::Null,
        }
    }

    /// Replaces the graph-derived fields with a projection of `graph`.
    pub fn set_graph(&mut self, graph: &WorkflowGraph) -> Result<(), serde_json::Error> {
        let projection = serialize_workflow_graph(graph)?;
        self.trigger_type = projection.trigger_type;
        self.conditions = projection.conditions;
        self.actions = projection.actions;
        Ok(())
    }
}

/// One entry of the flat action list written alongside the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStep {
    pub node_id: String,
    pub action_type: ActionType,
    #[serde(default)]
    pub params: Map<String, JsonValue>,
}

/// The graph-derived fields of a [`WorkflowRule`].
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedWorkflow {
    pub trigger_type: String,
    /// The full versioned graph document.
    pub conditions: JsonValue,
    /// Flat list of [`ActionStep`]s.
    pub actions: JsonValue,
}

/// Projects `graph` onto the persisted record fields.
///
/// The conditions blob carries the whole versioned graph, layout included. The actions blob
/// lists every action node, those reachable from the trigger first in breadth-first order.
pub fn serialize_workflow_graph(
    graph: &WorkflowGraph,
) -> Result<PersistedWorkflow, serde_json::Error> {
    let trigger_type = graph
        .triggers()
        .find_map(|n| match &n.data {
            NodeData::Trigger(trigger) => Some(trigger.event_type),
            _ => None,
        })
        .unwrap_or(EventType::Manual);

    let steps: Vec<ActionStep> = action_order(graph)
        .into_iter()
        .filter_map(|node_id| {
            let node = graph.node(node_id)?;
            match &node.data {
                NodeData::Action(action) => Some(ActionStep {
                    node_id: node.id.clone(),
                    action_type: action.action_type,
                    params: action.params.clone(),
                }),
                _ => None,
            }
        })
        .collect();

    Ok(PersistedWorkflow {
        trigger_type: trigger_type.as_str().to_string(),
        conditions: graph_document(graph)?,
        actions: serde_json::to_value(steps)?,
    })
}

/// Node ids in breadth-first order from the trigger, followed by the rest in node order.
fn action_order(graph: &WorkflowGraph) -> Vec<&str> {
    let adjacency = graph.adjacency();
    let mut seen: AHashSet<&str> = AHashSet::new();
    let mut order = Vec::with_capacity(graph.nodes.len());
    let mut queue = VecDeque::new();

    if let Some(trigger) = graph.triggers().next() {
        seen.insert(trigger.id.as_str());
        queue.push_back(trigger.id.as_str());
    }
    while let Some(current) = queue.pop_front() {
        order.push(current);
        for &next in adjacency.get(current).map(|v| v.as_slice()).unwrap_or(&[]) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    for node in &graph.nodes {
        if seen.insert(node.id.as_str()) {
            order.push(node.id.as_str());
        }
    }
    order
}

/// Rebuilds the graph stored on a persisted rule.
///
/// Rules whose conditions blob carries a version tag are decoded as graph documents and
/// rejected if the version is unsupported. Anything else is treated as a record written
/// before the graph model and upgraded.
pub fn deserialize_workflow_rule(
    rule: &WorkflowRule,
) -> Result<WorkflowGraph, LegacyConversionError> {
    if has_version_tag(&rule.conditions) {
        let graph = graph_from_document(rule.conditions.clone())?;
        let graph_trigger = graph.triggers().find_map(|n| match &n.data {
            NodeData::Trigger(trigger) => Some(trigger.event_type.as_str()),
            _ => None,
        });
        if graph_trigger.is_some_and(|t| t != rule.trigger_type) {
            tracing::debug!(
                rule_id = %rule.id,
                record = %rule.trigger_type,
                "record trigger type differs from graph trigger, using graph"
            );
        }
        return Ok(graph);
    }

    tracing::debug!(rule_id = %rule.id, "rule has no graph document, upgrading legacy fields");
    Ok(upgrade_legacy_rule(
        &rule.trigger_type,
        &rule.conditions,
        &rule.actions,
    ))
}
