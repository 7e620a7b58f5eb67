use crate::graph::{
    ActionData, ActionType, ConditionData, ConditionOperator, EventType, FieldCondition,
    IdGenerator, LogicOperator, Node, NodeData, Position, TriggerData, WorkflowGraph,
};
use crate::layout::auto_layout_graph;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

/// Older trigger names still found in records written before event types were unified.
const LEGACY_TRIGGER_ALIASES: &[(&str, EventType)] = &[
    ("new_return", EventType::ReturnCreated),
    ("status_change", EventType::ReturnStatusChanged),
    ("refund_issued", EventType::ReturnRefunded),
    ("item_received", EventType::ReturnReceived),
    ("new_ticket", EventType::TicketCreated),
    ("ticket_update", EventType::TicketUpdated),
    ("new_customer", EventType::CustomerCreated),
    ("daily", EventType::ScheduleDaily),
    ("weekly", EventType::ScheduleWeekly),
    ("monthly", EventType::ScheduleMonthly),
];

/// Maps a persisted trigger-type string onto an event type.
pub fn legacy_event_type(trigger_type: &str) -> Option<EventType> {
    let trigger_type = trigger_type.trim();
    EventType::from_name(trigger_type).or_else(|| {
        LEGACY_TRIGGER_ALIASES
            .iter()
            .find(|(alias, _)| *alias == trigger_type)
            .map(|(_, event_type)| *event_type)
    })
}

/// A condition row as stored before the graph model existed.
#[derive(Debug, Deserialize)]
struct LegacyCondition {
    #[serde(default)]
    id: Option<String>,
    field: String,
    operator: String,
    #[serde(default)]
    value: JsonValue,
}

/// A grouped condition list, `{logicOperator, conditions}`.
#[derive(Debug, Deserialize)]
struct LegacyConditionGroup {
    #[serde(default, alias = "logicOperator", alias = "logic")]
    logic_operator: Option<LogicOperator>,
    conditions: Vec<JsonValue>,
}

/// An action entry as stored before the graph model existed.
#[derive(Debug, Deserialize)]
struct LegacyAction {
    #[serde(alias = "actionType", alias = "type")]
    action_type: String,
    #[serde(default, alias = "config")]
    params: Map<String, JsonValue>,
}

fn legacy_operator(operator: &str) -> Option<ConditionOperator> {
    ConditionOperator::from_name(operator).or(match operator {
        "==" | "eq" => Some(ConditionOperator::Equals),
        "!=" | "neq" => Some(ConditionOperator::NotEquals),
        ">" | "gt" => Some(ConditionOperator::GreaterThan),
        "<" | "lt" => Some(ConditionOperator::LessThan),
        ">=" | "gte" => Some(ConditionOperator::GreaterOrEqual),
        "<=" | "lte" => Some(ConditionOperator::LessOrEqual),
        _ => None,
    })
}

fn decode_conditions(blob: &JsonValue) -> (LogicOperator, Vec<FieldCondition>) {
    let (logic, rows) = match blob {
        JsonValue::Array(rows) => (LogicOperator::And, rows.clone()),
        JsonValue::Object(_) => match serde_json::from_value::<LegacyConditionGroup>(blob.clone()) {
            Ok(group) => (group.logic_operator.unwrap_or_default(), group.conditions),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unrecognised legacy condition blob");
                (LogicOperator::And, Vec::new())
            }
        },
        _ => (LogicOperator::And, Vec::new()),
    };

    let conditions = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let legacy: LegacyCondition = match serde_json::from_value(row) {
                Ok(legacy) => legacy,
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping undecodable legacy condition");
                    return None;
                }
            };
            let Some(operator) = legacy_operator(&legacy.operator) else {
                tracing::warn!(
                    index,
                    operator = %legacy.operator,
                    "skipping legacy condition with unknown operator"
                );
                return None;
            };
            Some(FieldCondition {
                id: legacy.id.unwrap_or_else(|| format!("cond_{}", index + 1)),
                field: legacy.field,
                operator,
                value: legacy.value,
            })
        })
        .collect();
    (logic, conditions)
}

fn decode_actions(blob: &JsonValue) -> Vec<ActionData> {
    let JsonValue::Array(rows) = blob else {
        return Vec::new();
    };
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let legacy: LegacyAction = match serde_json::from_value(row.clone()) {
                Ok(legacy) => legacy,
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping undecodable legacy action");
                    return None;
                }
            };
            match ActionType::from_name(&legacy.action_type) {
                Some(action_type) => Some(ActionData {
                    action_type,
                    params: legacy.params,
                }),
                None => {
                    tracing::warn!(
                        index,
                        action_type = %legacy.action_type,
                        "skipping legacy action with unknown type"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Turns `snake_case` identifiers into a display label, e.g. `send_email` -> `Send email`.
fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds a graph from a record that predates the graph model.
///
/// The result always has exactly one trigger. Legacy conditions become a single condition
/// node and each legacy action an action node; none of them are connected, since the old
/// format never described an order between them.
pub fn upgrade_legacy_rule(
    trigger_type: &str,
    conditions: &JsonValue,
    actions: &JsonValue,
) -> WorkflowGraph {
    let event_type = match legacy_event_type(trigger_type) {
        Some(event_type) => event_type,
        None => {
            if !trigger_type.trim().is_empty() {
                tracing::warn!(trigger_type, "unknown legacy trigger type, falling back to manual");
            }
            EventType::Manual
        }
    };

    let mut ids = IdGenerator::new();
    let mut graph = WorkflowGraph::new();
    graph.nodes.push(Node::new(
        ids.next_node_id(),
        Position::default(),
        humanize(event_type.as_str()),
        NodeData::Trigger(TriggerData::new(event_type)),
    ));

    let (logic_operator, field_conditions) = decode_conditions(conditions);
    if !field_conditions.is_empty() {
        graph.nodes.push(Node::new(
            ids.next_node_id(),
            Position::default(),
            "Conditions",
            NodeData::Condition(ConditionData {
                logic_operator,
                conditions: field_conditions,
            }),
        ));
    }

    for action in decode_actions(actions) {
        let label = humanize(action.action_type.as_str());
        graph.nodes.push(Node::new(
            ids.next_node_id(),
            Position::default(),
            label,
            NodeData::Action(action),
        ));
    }

    tracing::info!(
        event_type = %event_type,
        nodes = graph.nodes.len(),
        "upgraded legacy workflow record"
    );
    auto_layout_graph(&graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("send_email"), "Send email");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_legacy_aliases_map_to_event_types() {
        assert_eq!(legacy_event_type("new_return"), Some(EventType::ReturnCreated));
        assert_eq!(legacy_event_type("return_created"), Some(EventType::ReturnCreated));
        assert_eq!(legacy_event_type(" weekly "), Some(EventType::ScheduleWeekly));
        assert_eq!(legacy_event_type("bogus"), None);
    }
}
