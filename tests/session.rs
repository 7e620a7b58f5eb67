//! Tests for the builder session: dirty tracking, the save lifecycle and navigation guards.
mod common;
use async_trait::async_trait;
use common::*;
use flowdraft::error::{LoadError, StoreError};
use flowdraft::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_test::{assert_pending, block_on, task};

/// A store whose writes fail until `failures` reaches zero.
struct FlakyStore {
    inner: InMemoryStore,
    failures: AtomicUsize,
}

#[async_trait]
impl WorkflowStore for FlakyStore {
    async fn load_rule(&self, rule_id: &str) -> std::result::Result<WorkflowRule, StoreError> {
        self.inner.load_rule(rule_id).await
    }

    async fn save_rule(&self, rule: &WorkflowRule) -> std::result::Result<(), StoreError> {
        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        self.inner.save_rule(rule).await
    }
}

/// A store whose writes never finish.
struct StalledStore;

#[async_trait]
impl WorkflowStore for StalledStore {
    async fn load_rule(&self, rule_id: &str) -> std::result::Result<WorkflowRule, StoreError> {
        Err(StoreError::NotFound(rule_id.to_string()))
    }

    async fn save_rule(&self, _rule: &WorkflowRule) -> std::result::Result<(), StoreError> {
        std::future::pending().await
    }
}

/// A session holding a valid `trigger -> action` graph.
fn valid_session() -> BuilderSession {
    let mut session = BuilderSession::new("rule-1", "Refund everything");
    let trigger = session
        .add_node(
            NodeType::Trigger,
            Position::new(60.0, 200.0),
            "Return created",
            NodeOverrides {
                event_type: Some(EventType::ReturnCreated),
                ..Default::default()
            },
        )
        .unwrap();
    let refund = session
        .add_node(
            NodeType::Action,
            Position::new(340.0, 200.0),
            "Refund",
            NodeOverrides {
                action_type: Some(ActionType::IssueRefund),
                ..Default::default()
            },
        )
        .unwrap();
    session.connect(&trigger, &refund, None).unwrap();
    session
}

#[test]
fn test_concrete_editing_scenario() {
    let mut session = BuilderSession::new("rule-1", "Scenario");

    let trigger = session
        .add_node(
            NodeType::Trigger,
            Position::new(80.0, 120.0),
            "Trigger",
            NodeOverrides {
                event_type: Some(EventType::ReturnCreated),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(validate_workflow(session.graph()).is_empty());

    let check = session
        .add_node(
            NodeType::Condition,
            Position::new(400.0, 120.0),
            "Check",
            NodeOverrides::default(),
        )
        .unwrap();
    session.connect(&trigger, &check, None).unwrap();
    let errors = validate_workflow(session.graph());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].node_id.as_deref(), Some(check.as_str()));

    let yes = session
        .add_node(
            NodeType::Action,
            Position::new(720.0, 60.0),
            "Approve",
            NodeOverrides::default(),
        )
        .unwrap();
    let no = session
        .add_node(
            NodeType::Action,
            Position::new(720.0, 180.0),
            "Reject",
            NodeOverrides::default(),
        )
        .unwrap();
    session
        .connect(&check, &yes, Some(BranchHandle::True))
        .unwrap();
    session
        .connect(&check, &no, Some(BranchHandle::False))
        .unwrap();
    assert!(validate_workflow(session.graph()).is_empty());
    assert!(session.is_valid());

    let exported = session.export().unwrap();
    assert_eq!(&import_graph(&exported).unwrap(), session.graph());
}

#[test]
fn test_new_session_is_clean() {
    let session = BuilderSession::new("rule-1", "Empty");
    assert!(!session.is_dirty());
    assert_eq!(session.request_navigation(), NavigationDecision::Proceed);
    assert!(!session.intercept_unload());
    assert!(session.graph().nodes.is_empty());
}

#[test]
fn test_edits_mark_dirty_and_snap() {
    let mut session = BuilderSession::new("rule-1", "Edits");
    let node_id = session
        .add_node(
            NodeType::Delay,
            Position::new(63.0, 207.0),
            "Wait",
            NodeOverrides::default(),
        )
        .unwrap();

    assert_eq!(node_id, "node_1");
    assert_eq!(
        session.graph().node(&node_id).unwrap().position,
        Position::new(60.0, 200.0)
    );
    assert!(session.is_dirty());
    assert_eq!(session.revision(), 1);
    assert_eq!(
        session.request_navigation(),
        NavigationDecision::ConfirmDiscard
    );
    assert!(session.intercept_unload());

    session
        .move_node(&node_id, Position::new(91.0, 109.0))
        .unwrap();
    assert_eq!(
        session.graph().node(&node_id).unwrap().position,
        Position::new(100.0, 100.0)
    );
    assert_eq!(session.revision(), 2);
}

#[test]
fn test_rejected_commands_change_nothing() {
    let mut session = BuilderSession::new("rule-1", "Rejections");
    assert!(session.connect("node_1", "node_2", None).is_err());
    assert!(session.delete_node("node_1").is_err());
    assert!(!session.is_dirty());
    assert_eq!(session.revision(), 0);
}

#[test]
fn test_validation_errors_track_edits() {
    let mut session = valid_session();
    assert!(session.is_valid());

    session
        .add_node(
            NodeType::Action,
            Position::new(600.0, 400.0),
            "Orphan",
            NodeOverrides::default(),
        )
        .unwrap();
    assert_eq!(session.validation_errors().len(), 1);
    assert_eq!(session.validation_banner().map(<[_]>::len), Some(1));

    session.dismiss_validation_banner();
    assert!(session.validation_banner().is_none());
    assert_eq!(session.validation_errors().len(), 1);

    session.delete_node("node_3").unwrap();
    assert!(session.is_valid());
}

#[test]
fn test_invalid_graph_is_not_saved() {
    let store = InMemoryStore::new();
    let mut session = BuilderSession::new("rule-1", "Invalid");
    session
        .add_node(
            NodeType::Action,
            Position::new(0.0, 0.0),
            "Lonely",
            NodeOverrides::default(),
        )
        .unwrap();

    let errors = match block_on(session.save(&store)) {
        Err(SaveError::Invalid(errors)) => errors,
        other => panic!("expected validation failure, got {:?}", other),
    };
    assert_eq!(errors[0].message, "Workflow must have a trigger node");
    assert!(store.is_empty());
    assert!(session.is_dirty());
    assert!(session.validation_banner().is_some());
}

#[test]
fn test_save_and_reload() {
    let store = InMemoryStore::new();
    let mut session = valid_session();
    session.set_active(true);

    block_on(session.save(&store)).unwrap();
    assert!(!session.is_dirty());
    assert_eq!(session.request_navigation(), NavigationDecision::Proceed);
    assert_eq!(session.save_error(), None);

    let stored = store.get("rule-1").unwrap();
    assert_eq!(stored.trigger_type, "return_created");
    assert!(stored.active);
    assert_eq!(&stored, session.rule());

    let reloaded = block_on(BuilderSession::load(&store, "rule-1")).unwrap();
    assert_eq!(reloaded.graph(), session.graph());
    assert!(!reloaded.is_dirty());
    assert_eq!(reloaded.rule().name, "Refund everything");
}

#[test]
fn test_only_one_save_in_flight() {
    let mut session = valid_session();
    let ticket = session.begin_save().unwrap();
    assert!(session.is_saving());
    assert!(!session.can_save());
    assert_eq!(session.begin_save().unwrap_err(), SaveError::InFlight);

    session.complete_save(ticket.clone(), Ok(())).unwrap();
    assert!(!session.is_saving());
    assert_eq!(
        session.complete_save(ticket, Ok(())),
        Err(SaveError::StaleTicket)
    );
}

#[test]
fn test_abandoned_ticket_releases_save() {
    let mut session = valid_session();
    let ticket = session.begin_save().unwrap();
    drop(ticket);
    assert!(!session.can_save());

    session.abandon_save();
    assert!(session.can_save());
    assert!(session.is_dirty());

    let retry = session.begin_save().unwrap();
    session.complete_save(retry, Ok(())).unwrap();
    assert!(!session.is_dirty());
}

#[test]
fn test_stale_ticket_after_abandon_is_rejected() {
    let mut session = valid_session();
    let ticket = session.begin_save().unwrap();
    session.abandon_save();
    assert_eq!(
        session.complete_save(ticket, Ok(())),
        Err(SaveError::StaleTicket)
    );
    assert!(session.is_dirty());
}

#[test]
fn test_cancelled_save_releases_lock() {
    let mut session = valid_session();
    let stalled = StalledStore;
    {
        let mut save = task::spawn(session.save(&stalled));
        assert_pending!(save.poll());
    }
    assert!(!session.is_saving());
    assert!(session.is_dirty());

    let store = InMemoryStore::new();
    block_on(session.save(&store)).unwrap();
    assert!(!session.is_dirty());
}

#[test]
fn test_edits_during_save_stay_dirty() {
    let mut session = valid_session();
    let ticket = session.begin_save().unwrap();
    assert_eq!(ticket.rule().trigger_type, "return_created");

    session.update_node("node_2", Some("Refund in full".to_string()), None).unwrap();
    session.complete_save(ticket, Ok(())).unwrap();
    assert!(session.is_dirty());
}

#[test]
fn test_failed_save_keeps_edits_and_retries() {
    let store = FlakyStore {
        inner: InMemoryStore::new(),
        failures: AtomicUsize::new(1),
    };
    let mut session = valid_session();
    let graph_before = session.graph().clone();

    let result = block_on(session.save(&store));
    assert!(matches!(result, Err(SaveError::Store(StoreError::Backend(_)))));
    assert!(session.is_dirty());
    assert!(!session.is_saving());
    assert_eq!(session.graph(), &graph_before);
    assert!(session.save_error().unwrap().contains("connection reset"));

    block_on(session.save(&store)).unwrap();
    assert!(!session.is_dirty());
    assert_eq!(session.save_error(), None);
    assert!(store.inner.get("rule-1").is_some());
}

#[test]
fn test_load_missing_rule() {
    let store = InMemoryStore::new();
    let result = block_on(BuilderSession::load(&store, "nope"));
    assert!(matches!(
        result,
        Err(LoadError::Store(StoreError::NotFound(id))) if id == "nope"
    ));
}

#[test]
fn test_load_upgrades_legacy_rule() {
    let store = InMemoryStore::with_rules([create_legacy_rule()]);
    let mut session = block_on(BuilderSession::load(&store, "rule-legacy")).unwrap();

    assert_eq!(session.graph().nodes.len(), 4);
    assert!(!session.is_dirty());
    // The unconnected placeholders must be wired up before saving.
    assert!(!session.is_valid());

    let next = session
        .add_node(
            NodeType::Delay,
            Position::new(0.0, 400.0),
            "Wait",
            NodeOverrides::default(),
        )
        .unwrap();
    assert_eq!(next, "node_5");
}

#[test]
fn test_import_replaces_graph() {
    let mut session = BuilderSession::new("rule-1", "Import");
    let exported = export_graph(&create_branching_graph()).unwrap();

    session.import(&exported).unwrap();
    assert_eq!(session.graph(), &create_branching_graph());
    assert!(session.is_dirty());
    assert!(session.is_valid());

    let edge_id = session.connect("node_1", "node_3", None).unwrap();
    assert_eq!(edge_id, "edge_4");
}

#[test]
fn test_import_with_id_at_counter_limit() {
    let mut session = BuilderSession::new("rule-1", "Import");
    let mut graph = create_linear_graph();
    graph.nodes[2].id = "node_18446744073709551615".to_string();
    graph.edges[1].target = "node_18446744073709551615".to_string();

    session.import(&export_graph(&graph).unwrap()).unwrap();
    assert!(session.is_valid());
    let next = session
        .add_node(
            NodeType::Action,
            Position::new(900.0, 200.0),
            "Log",
            NodeOverrides::default(),
        )
        .unwrap();
    assert_eq!(next, "node_3");
}

#[test]
fn test_loaded_viewport_zoom_is_clamped() {
    let mut graph = create_linear_graph();
    graph.viewport = Viewport {
        x: 10.0,
        y: 20.0,
        zoom: 9.0,
    };
    let mut rule = WorkflowRule::new("rule-zoom", "Zoomed");
    rule.set_graph(&graph).unwrap();

    let session = BuilderSession::from_rule(rule).unwrap();
    assert_eq!(session.graph().viewport.zoom, 2.0);
    assert_eq!(session.graph().viewport, session.controller().viewport());
    assert!(!session.is_dirty());
}

#[test]
fn test_failed_import_changes_nothing() {
    let mut session = valid_session();
    let before = session.graph().clone();
    let revision = session.revision();

    let older = serde_json::json!({ "_graphVersion": 1, "nodes": [] }).to_string();
    assert!(matches!(
        session.import(&older),
        Err(ImportError::UnsupportedVersion { .. })
    ));
    assert!(session.import("{").is_err());
    assert_eq!(session.graph(), &before);
    assert_eq!(session.revision(), revision);
}

#[test]
fn test_camera_changes_do_not_mark_dirty() {
    let store = InMemoryStore::new();
    let mut session = valid_session();
    block_on(session.save(&store)).unwrap();

    session.fit_to_view(1200.0, 800.0);
    session.wheel(Position::new(100.0, 100.0), -1.0);
    session.key_down(Key::ArrowLeft, false);
    assert!(!session.is_dirty());
    assert_eq!(session.graph().viewport, session.controller().viewport());
    assert_ne!(session.graph().viewport, Viewport::default());
}

#[test]
fn test_auto_layout_marks_dirty_only_when_positions_move() {
    let mut session = valid_session();
    let revision = session.revision();
    // Both nodes already sit where auto-layout would put them.
    session.auto_layout();
    assert_eq!(session.revision(), revision);

    session
        .move_node("node_2", Position::new(900.0, 600.0))
        .unwrap();
    session.auto_layout();
    assert_eq!(
        session.graph().node("node_2").unwrap().position,
        Position::new(340.0, 200.0)
    );
    assert_eq!(session.revision(), revision + 2);
}

#[test]
fn test_pointer_gestures_commit_through_session() {
    let mut session = valid_session();
    let revision = session.revision();

    // Drag the action node (340, 200) by one grid step.
    session.pointer_down(Position::new(400.0, 230.0));
    session.pointer_move(Position::new(420.0, 230.0));
    assert_eq!(session.revision(), revision);
    session.pointer_up(Position::new(420.0, 230.0));
    assert_eq!(
        session.graph().node("node_2").unwrap().position,
        Position::new(360.0, 200.0)
    );
    assert_eq!(session.revision(), revision + 1);

    // The node is still selected; Delete removes it with its edge.
    session.key_down(Key::Delete, false);
    assert!(session.graph().node("node_2").is_none());
    assert!(session.graph().edges.is_empty());
}

#[test]
fn test_selected_edge_is_deleted_first() {
    let mut session = valid_session();
    session.select_edge(Some("edge_1".to_string()));
    session.key_down(Key::Backspace, false);
    assert!(session.graph().edges.is_empty());
    assert_eq!(session.graph().nodes.len(), 2);
}

#[test]
fn test_discard_returns_to_saved_state() {
    let store = InMemoryStore::new();
    let mut session = valid_session();
    block_on(session.save(&store)).unwrap();
    let saved = session.graph().clone();

    session.delete_node("node_2").unwrap();
    session.set_name("Renamed");
    assert!(session.is_dirty());

    session.discard();
    assert!(!session.is_dirty());
    assert_eq!(session.graph(), &saved);
    assert_eq!(session.rule().name, "Refund everything");
    assert_eq!(session.request_navigation(), NavigationDecision::Proceed);

    // Ids issued after a discard still do not collide.
    let next = session
        .add_node(
            NodeType::Delay,
            Position::new(0.0, 0.0),
            "Wait",
            NodeOverrides::default(),
        )
        .unwrap();
    assert_eq!(next, "node_3");
}
