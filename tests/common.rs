//! Common test utilities for building workflow graphs and records.
use flowdraft::prelude::*;

#[allow(dead_code)]
pub fn trigger(id: &str, event_type: EventType) -> Node {
    Node::new(
        id,
        Position::new(60.0, 200.0),
        "Trigger",
        NodeData::Trigger(TriggerData::new(event_type)),
    )
}

#[allow(dead_code)]
pub fn condition(id: &str, label: &str) -> Node {
    Node::new(
        id,
        Position::new(340.0, 200.0),
        label,
        NodeData::Condition(ConditionData::default()),
    )
}

#[allow(dead_code)]
pub fn action(id: &str, label: &str, action_type: ActionType) -> Node {
    Node::new(
        id,
        Position::new(620.0, 200.0),
        label,
        NodeData::Action(ActionData::new(action_type)),
    )
}

#[allow(dead_code)]
pub fn delay(id: &str, label: &str) -> Node {
    Node::new(
        id,
        Position::new(620.0, 300.0),
        label,
        NodeData::Delay(DelayData::default()),
    )
}

#[allow(dead_code)]
pub fn edge(id: &str, source: &str, target: &str) -> Edge {
    Edge::new(id, source, target, None)
}

#[allow(dead_code)]
pub fn branch(id: &str, source: &str, target: &str, handle: BranchHandle) -> Edge {
    Edge::new(id, source, target, Some(handle))
}

/// `trigger -> condition`, with `true -> refund` and `false -> reject`.
#[allow(dead_code)]
pub fn create_branching_graph() -> WorkflowGraph {
    WorkflowGraph {
        nodes: vec![
            trigger("node_1", EventType::ReturnCreated),
            condition("node_2", "High value?"),
            action("node_3", "Refund", ActionType::IssueRefund),
            action("node_4", "Reject", ActionType::RejectReturn),
        ],
        edges: vec![
            edge("edge_1", "node_1", "node_2"),
            branch("edge_2", "node_2", "node_3", BranchHandle::True),
            branch("edge_3", "node_2", "node_4", BranchHandle::False),
        ],
        viewport: Viewport::default(),
    }
}

/// `trigger -> delay -> action`, a straight line.
#[allow(dead_code)]
pub fn create_linear_graph() -> WorkflowGraph {
    WorkflowGraph {
        nodes: vec![
            trigger("node_1", EventType::ReturnApproved),
            delay("node_2", "Wait"),
            action("node_3", "Email customer", ActionType::SendEmail),
        ],
        edges: vec![
            edge("edge_1", "node_1", "node_2"),
            edge("edge_2", "node_2", "node_3"),
        ],
        viewport: Viewport::default(),
    }
}

/// A record written before graph documents were stored on rules.
#[allow(dead_code)]
pub fn create_legacy_rule() -> WorkflowRule {
    let mut rule = WorkflowRule::new("rule-legacy", "Legacy auto-approve");
    rule.trigger_type = "new_return".to_string();
    rule.conditions = serde_json::json!([
        { "field": "return.total", "operator": ">", "value": 100 },
        { "field": "customer.tier", "operator": "equals", "value": "gold" }
    ]);
    rule.actions = serde_json::json!([
        { "type": "approve_return" },
        { "actionType": "send_email", "config": { "template": "approved" } }
    ]);
    rule
}

#[allow(dead_code)]
pub const FIELD_CATALOG_JSON: &str = r#"{
    "return": [
        { "key": "status", "label": "Status", "dataType": "enum", "enumValues": ["pending", "approved", "rejected"] },
        { "key": "total", "label": "Total", "dataType": "number" }
    ],
    "customer": [
        { "key": "tier", "label": "Tier", "dataType": "string" }
    ],
    "ticket": []
}"#;
