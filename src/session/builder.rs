use super::store::WorkflowStore;
use crate::error::{
    CommandError, ImportError, LegacyConversionError, LoadError, SaveError, StoreError,
};
use crate::graph::{
    BranchHandle, CommandOutcome, GraphCommand, IdGenerator, NodeData, NodeOverrides, NodeType,
    Position, WorkflowGraph,
};
use crate::interaction::{CanvasConfig, InteractionController, Key};
use crate::layout::{auto_layout_graph, compute_fit_to_view, snap_to_grid};
use crate::serialization::{WorkflowRule, deserialize_workflow_rule, export_graph, import_graph};
use crate::validation::{ValidationError, validate_workflow};

/// Whether leaving the session needs the user's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Proceed,
    /// There are unsaved changes; ask before discarding them.
    ConfirmDiscard,
}

/// A save that has been validated and serialized but not yet confirmed by the store.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    sequence: u64,
    revision: u64,
    rule: WorkflowRule,
    graph: WorkflowGraph,
}

impl SaveTicket {
    /// The record to hand to the store.
    pub fn rule(&self) -> &WorkflowRule {
        &self.rule
    }
}

/// One editing session over a single workflow rule.
///
/// Every change goes through [`BuilderSession::execute`], which marks the session dirty and
/// revalidates. Saving is split into [`begin_save`](Self::begin_save) and
/// [`complete_save`](Self::complete_save) so the graph can keep being edited while the
/// write is outstanding; [`save`](Self::save) drives both against a store.
#[derive(Debug, Clone)]
pub struct BuilderSession {
    rule: WorkflowRule,
    graph: WorkflowGraph,
    ids: IdGenerator,
    controller: InteractionController,
    dirty: bool,
    revision: u64,
    errors: Vec<ValidationError>,
    validation_banner: bool,
    save_sequence: u64,
    save_in_flight: Option<u64>,
    save_error: Option<String>,
    /// Last state known to match the store, restored by `discard`.
    saved: (WorkflowRule, WorkflowGraph),
}

impl BuilderSession {
    /// Starts a session for a brand-new workflow with an empty graph.
    pub fn new(rule_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_graph(WorkflowRule::new(rule_id, name), WorkflowGraph::new())
    }

    /// Opens a session over a persisted rule, upgrading legacy records as needed.
    pub fn from_rule(rule: WorkflowRule) -> Result<Self, LegacyConversionError> {
        let graph = deserialize_workflow_rule(&rule)?;
        tracing::info!(
            rule_id = %rule.id,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "workflow loaded"
        );
        Ok(Self::with_graph(rule, graph))
    }

    /// Loads `rule_id` from `store` and opens a session over it.
    pub async fn load(store: &dyn WorkflowStore, rule_id: &str) -> Result<Self, LoadError> {
        let rule = store.load_rule(rule_id).await?;
        Ok(Self::from_rule(rule)?)
    }

    fn with_graph(rule: WorkflowRule, mut graph: WorkflowGraph) -> Self {
        let controller = InteractionController::new(graph.viewport);
        graph.viewport = controller.viewport();
        let errors = validate_workflow(&graph);
        Self {
            saved: (rule.clone(), graph.clone()),
            ids: IdGenerator::resume_from(&graph),
            controller,
            rule,
            graph,
            dirty: false,
            revision: 0,
            errors,
            validation_banner: false,
            save_sequence: 0,
            save_in_flight: None,
            save_error: None,
        }
    }

    /// Replaces the canvas tunables, keeping the current camera.
    pub fn set_canvas_config(&mut self, config: CanvasConfig) {
        self.controller = InteractionController::with_config(config, self.graph.viewport);
    }

    pub fn rule(&self) -> &WorkflowRule {
        &self.rule
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Increases with every committed change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight.is_some()
    }

    /// Whether the save affordance should be enabled.
    pub fn can_save(&self) -> bool {
        !self.is_saving()
    }

    /// Errors to show in the validation banner, unless it was dismissed since the last change.
    pub fn validation_banner(&self) -> Option<&[ValidationError]> {
        (self.validation_banner && !self.errors.is_empty()).then_some(self.errors.as_slice())
    }

    pub fn dismiss_validation_banner(&mut self) {
        self.validation_banner = false;
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn dismiss_save_error(&mut self) {
        self.save_error = None;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.rule.name = name.into();
        self.mark_changed();
    }

    pub fn set_active(&mut self, active: bool) {
        self.rule.active = active;
        self.mark_changed();
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        self.revision += 1;
        self.errors = validate_workflow(&self.graph);
        self.validation_banner = true;
        self.controller.reconcile(&self.graph);
    }

    /// Applies a command to the graph. Rejected commands change nothing.
    ///
    /// Node positions are snapped to the canvas grid before they are committed.
    pub fn execute(&mut self, command: GraphCommand) -> Result<CommandOutcome, CommandError> {
        let grid_size = self.controller.config().grid_size;
        let command = match command {
            GraphCommand::AddNode {
                node_type,
                position,
                label,
                overrides,
            } => GraphCommand::AddNode {
                node_type,
                position: snap_to_grid(position, grid_size),
                label,
                overrides,
            },
            GraphCommand::MoveNode { node_id, position } => GraphCommand::MoveNode {
                node_id,
                position: snap_to_grid(position, grid_size),
            },
            other => other,
        };

        match self.graph.apply(command, &mut self.ids) {
            Ok(outcome) => {
                tracing::debug!(?outcome, "graph command applied");
                self.mark_changed();
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!(error = %e, "graph command rejected");
                Err(e)
            }
        }
    }

    /// Places a new node, as when dropped from the palette. Returns its id.
    pub fn add_node(
        &mut self,
        node_type: NodeType,
        position: Position,
        label: impl Into<String>,
        overrides: NodeOverrides,
    ) -> Result<String, CommandError> {
        let outcome = self.execute(GraphCommand::AddNode {
            node_type,
            position,
            label: label.into(),
            overrides,
        })?;
        Ok(outcome.subject_id().to_string())
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), CommandError> {
        self.execute(GraphCommand::MoveNode {
            node_id: node_id.to_string(),
            position,
        })
        .map(|_| ())
    }

    pub fn update_node(
        &mut self,
        node_id: &str,
        label: Option<String>,
        data: Option<NodeData>,
    ) -> Result<(), CommandError> {
        self.execute(GraphCommand::UpdateNode {
            node_id: node_id.to_string(),
            label,
            data,
        })
        .map(|_| ())
    }

    pub fn delete_node(&mut self, node_id: &str) -> Result<(), CommandError> {
        self.execute(GraphCommand::DeleteNode {
            node_id: node_id.to_string(),
        })
        .map(|_| ())
    }

    /// Connects `source` to `target`. Returns the new edge's id.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        handle: Option<BranchHandle>,
    ) -> Result<String, CommandError> {
        let outcome = self.execute(GraphCommand::Connect {
            source: source.to_string(),
            target: target.to_string(),
            handle,
        })?;
        Ok(outcome.subject_id().to_string())
    }

    pub fn delete_edge(&mut self, edge_id: &str) -> Result<(), CommandError> {
        self.execute(GraphCommand::DeleteEdge {
            edge_id: edge_id.to_string(),
        })
        .map(|_| ())
    }

    /// Rearranges every node with the layered auto-layout.
    pub fn auto_layout(&mut self) {
        let laid_out = auto_layout_graph(&self.graph);
        if laid_out != self.graph {
            self.graph = laid_out;
            tracing::debug!(nodes = self.graph.nodes.len(), "auto-layout applied");
            self.mark_changed();
        }
    }

    /// Moves the camera so every node is visible. Does not mark the session dirty.
    pub fn fit_to_view(&mut self, canvas_width: f64, canvas_height: f64) {
        let viewport = compute_fit_to_view(&self.graph.nodes, canvas_width, canvas_height, None);
        self.controller.set_viewport(viewport);
        self.sync_viewport();
    }

    fn sync_viewport(&mut self) {
        self.graph.viewport = self.controller.viewport();
    }

    fn commit_gesture(&mut self, command: Option<GraphCommand>) {
        if let Some(command) = command {
            // Rejections here are gestures that simply end without effect.
            let _ = self.execute(command);
        }
    }

    pub fn pointer_down(&mut self, screen: Position) {
        self.controller.pointer_down(&self.graph, screen);
    }

    pub fn pointer_move(&mut self, screen: Position) {
        self.controller.pointer_move(screen);
        self.sync_viewport();
    }

    pub fn pointer_up(&mut self, screen: Position) {
        let command = self.controller.pointer_up(&self.graph, screen);
        self.sync_viewport();
        self.commit_gesture(command);
    }

    pub fn pointer_cancel(&mut self) {
        self.controller.pointer_cancel();
    }

    pub fn wheel(&mut self, screen: Position, delta_y: f64) {
        self.controller.wheel(screen, delta_y);
        self.sync_viewport();
    }

    pub fn select_edge(&mut self, edge_id: Option<String>) {
        self.controller.select_edge(edge_id);
    }

    pub fn key_down(&mut self, key: Key, in_text_input: bool) {
        let command = self.controller.key_down(key, in_text_input);
        self.sync_viewport();
        self.commit_gesture(command);
    }

    /// Serializes the current graph into a portable JSON document.
    pub fn export(&self) -> Result<String, serde_json::Error> {
        export_graph(&self.graph)
    }

    /// Replaces the graph with an imported document.
    ///
    /// On failure nothing changes. On success the session is dirty, since the imported graph
    /// has not been saved yet.
    pub fn import(&mut self, json: &str) -> Result<(), ImportError> {
        let graph = import_graph(json).inspect_err(|e| {
            tracing::warn!(rule_id = %self.rule.id, error = %e, "import rejected");
        })?;
        tracing::info!(rule_id = %self.rule.id, nodes = graph.nodes.len(), "graph imported");
        self.ids = IdGenerator::resume_from(&graph);
        self.controller =
            InteractionController::with_config(*self.controller.config(), graph.viewport);
        self.graph = graph;
        self.sync_viewport();
        self.mark_changed();
        Ok(())
    }

    /// Validates and serializes the graph for saving.
    ///
    /// Fails if the graph is structurally invalid or another save is still outstanding.
    pub fn begin_save(&mut self) -> Result<SaveTicket, SaveError> {
        if self.save_in_flight.is_some() {
            return Err(SaveError::InFlight);
        }
        self.errors = validate_workflow(&self.graph);
        if !self.errors.is_empty() {
            self.validation_banner = true;
            tracing::warn!(
                rule_id = %self.rule.id,
                errors = self.errors.len(),
                "save blocked by validation errors"
            );
            return Err(SaveError::Invalid(self.errors.clone()));
        }

        let mut rule = self.rule.clone();
        rule.set_graph(&self.graph)
            .map_err(|e| SaveError::Serialization(e.to_string()))?;

        self.save_sequence += 1;
        self.save_in_flight = Some(self.save_sequence);
        Ok(SaveTicket {
            sequence: self.save_sequence,
            revision: self.revision,
            rule,
            graph: self.graph.clone(),
        })
    }

    /// Records the store's answer for an outstanding save.
    ///
    /// Success clears the dirty flag unless the graph changed while the write was in flight.
    /// Failure keeps every edit and surfaces the error so the user can retry.
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), StoreError>,
    ) -> Result<(), SaveError> {
        if self.save_in_flight != Some(ticket.sequence) {
            return Err(SaveError::StaleTicket);
        }
        self.save_in_flight = None;

        match result {
            Ok(()) => {
                self.rule.trigger_type = ticket.rule.trigger_type.clone();
                self.rule.conditions = ticket.rule.conditions.clone();
                self.rule.actions = ticket.rule.actions.clone();
                self.saved = (ticket.rule, ticket.graph);
                if self.revision == ticket.revision {
                    self.dirty = false;
                }
                self.save_error = None;
                tracing::info!(rule_id = %self.rule.id, dirty = self.dirty, "workflow saved");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(rule_id = %self.rule.id, error = %e, "workflow save failed");
                self.save_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Releases an outstanding save whose ticket will never be completed.
    ///
    /// Edits stay dirty, and completing the abandoned ticket later is rejected as stale.
    pub fn abandon_save(&mut self) {
        if let Some(sequence) = self.save_in_flight.take() {
            tracing::warn!(rule_id = %self.rule.id, sequence, "save abandoned");
        }
    }

    /// Validates, serializes and writes the graph to `store`.
    ///
    /// Dropping the returned future before the store answers abandons the save.
    pub async fn save(&mut self, store: &dyn WorkflowStore) -> Result<(), SaveError> {
        let ticket = self.begin_save()?;
        let pending = PendingSave {
            session: self,
            armed: true,
        };
        let result = store.save_rule(ticket.rule()).await;
        pending.finish(ticket, result)
    }

    /// Decides whether in-app navigation away from the session may proceed unprompted.
    pub fn request_navigation(&self) -> NavigationDecision {
        if self.dirty {
            NavigationDecision::ConfirmDiscard
        } else {
            NavigationDecision::Proceed
        }
    }

    /// Whether a page unload must be intercepted.
    pub fn intercept_unload(&self) -> bool {
        self.dirty
    }

    /// Throws away unsaved changes, returning to the last loaded or saved state.
    pub fn discard(&mut self) {
        if !self.dirty {
            return;
        }
        let (rule, graph) = self.saved.clone();
        tracing::info!(rule_id = %rule.id, "unsaved changes discarded");
        self.ids = IdGenerator::resume_from(&graph);
        self.controller =
            InteractionController::with_config(*self.controller.config(), graph.viewport);
        self.rule = rule;
        self.graph = graph;
        self.sync_viewport();
        self.errors = validate_workflow(&self.graph);
        self.validation_banner = false;
        self.dirty = false;
        self.revision += 1;
    }
}

/// Holds the session across the store write and abandons the save if dropped early.
struct PendingSave<'a> {
    session: &'a mut BuilderSession,
    armed: bool,
}

impl PendingSave<'_> {
    fn finish(
        mut self,
        ticket: SaveTicket,
        result: Result<(), StoreError>,
    ) -> Result<(), SaveError> {
        self.armed = false;
        self.session.complete_save(ticket, result)
    }
}

impl Drop for PendingSave<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.abandon_save();
        }
    }
}
