//! Tests for structural workflow validation.
mod common;
use common::*;
use flowdraft::prelude::*;

fn messages(errors: &[ValidationError]) -> Vec<&str> {
    errors.iter().map(|e| e.message.as_str()).collect()
}

#[test]
fn test_valid_graphs_have_no_errors() {
    assert!(validate_workflow(&create_branching_graph()).is_empty());
    assert!(validate_workflow(&create_linear_graph()).is_empty());
}

#[test]
fn test_missing_trigger() {
    let errors = validate_workflow(&WorkflowGraph::new());
    assert_eq!(messages(&errors), vec!["Workflow must have a trigger node"]);
    assert_eq!(errors[0].node_id, None);
}

#[test]
fn test_multiple_triggers_skip_reachability() {
    let graph = WorkflowGraph {
        nodes: vec![
            trigger("node_1", EventType::ReturnCreated),
            trigger("node_2", EventType::TicketCreated),
            action("node_3", "Log", ActionType::LogEvent),
        ],
        ..Default::default()
    };
    let errors = validate_workflow(&graph);
    assert_eq!(
        messages(&errors),
        vec!["Workflow can only have one trigger node"]
    );
}

#[test]
fn test_unreachable_node_is_attributed() {
    let mut graph = create_linear_graph();
    graph
        .nodes
        .push(action("node_9", "Orphan", ActionType::NotifyTeam));

    let errors = validate_workflow(&graph);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].node_id.as_deref(), Some("node_9"));
    assert_eq!(
        errors[0].message,
        "Node \"Orphan\" is not reachable from the trigger"
    );
    assert_eq!(
        errors[0].to_string(),
        "[node_9] Node \"Orphan\" is not reachable from the trigger"
    );
}

#[test]
fn test_condition_requires_both_branches() {
    let mut graph = create_branching_graph();
    graph.edges.retain(|e| e.id != "edge_3");

    let errors = validate_workflow(&graph);
    assert_eq!(
        messages(&errors),
        vec![
            "Node \"Reject\" is not reachable from the trigger",
            "Condition \"High value?\" must have both true and false branches connected",
        ]
    );
    assert_eq!(errors[1].node_id.as_deref(), Some("node_2"));
}

#[test]
fn test_cycle_is_reported_once() {
    let graph = WorkflowGraph {
        nodes: vec![
            trigger("node_1", EventType::Manual),
            action("node_2", "A", ActionType::LogEvent),
            action("node_3", "B", ActionType::LogEvent),
            action("node_4", "C", ActionType::LogEvent),
        ],
        edges: vec![
            edge("edge_1", "node_1", "node_2"),
            edge("edge_2", "node_2", "node_3"),
            edge("edge_3", "node_3", "node_4"),
            edge("edge_4", "node_4", "node_2"),
        ],
        ..Default::default()
    };
    let errors = validate_workflow(&graph);
    assert_eq!(messages(&errors), vec!["Workflow contains a cycle"]);
}

#[test]
fn test_two_disjoint_cycles_still_one_error() {
    let graph = WorkflowGraph {
        nodes: vec![
            trigger("node_1", EventType::Manual),
            action("node_2", "A", ActionType::LogEvent),
            action("node_3", "B", ActionType::LogEvent),
            action("node_4", "C", ActionType::LogEvent),
            action("node_5", "D", ActionType::LogEvent),
        ],
        edges: vec![
            edge("edge_1", "node_1", "node_2"),
            edge("edge_2", "node_2", "node_3"),
            edge("edge_3", "node_3", "node_2"),
            edge("edge_4", "node_1", "node_4"),
            edge("edge_5", "node_4", "node_5"),
            edge("edge_6", "node_5", "node_4"),
        ],
        ..Default::default()
    };
    let cycles = validate_workflow(&graph)
        .into_iter()
        .filter(|e| e.message == "Workflow contains a cycle")
        .count();
    assert_eq!(cycles, 1);
}

#[test]
fn test_dangling_edges_are_tolerated() {
    let mut graph = create_linear_graph();
    graph.edges.push(edge("edge_9", "node_3", "ghost"));
    graph.edges.push(edge("edge_10", "ghost", "node_1"));
    assert!(validate_workflow(&graph).is_empty());
}

#[test]
fn test_errors_accumulate() {
    let graph = WorkflowGraph {
        nodes: vec![condition("node_1", "Lonely")],
        ..Default::default()
    };
    let errors = validate_workflow(&graph);
    assert_eq!(
        messages(&errors),
        vec![
            "Workflow must have a trigger node",
            "Condition \"Lonely\" must have both true and false branches connected",
        ]
    );
}
