use super::hit::{HitTarget, hit_test, nodes_at_input_edge, output_handle_position};
use crate::graph::{BranchHandle, GraphCommand, Node, Position, Viewport, WorkflowGraph};
use crate::layout::{GRID_SIZE, clamp_zoom, snap_to_grid};

/// Tunables of the canvas interaction model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    /// Lattice dragged nodes snap to, in canvas units.
    pub grid_size: f64,
    /// Screen pixels the camera moves per arrow key press.
    pub pan_step: f64,
    /// Relative zoom change per wheel tick.
    pub zoom_step: f64,
    /// Half-size of the square around a handle that counts as hitting it, in canvas units.
    pub handle_hit_radius: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            pan_step: 50.0,
            zoom_step: 0.1,
            handle_hit_radius: 12.0,
        }
    }
}

/// The modal gesture currently in progress. Exactly one is active at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionMode {
    Idle,
    Panning {
        last_screen: Position,
    },
    DraggingNode {
        node_id: String,
        origin: Position,
        /// Pointer position relative to the node's top-left corner, in canvas units.
        grab_offset: Position,
        /// Snapped preview position; only committed on pointer-up.
        pending: Position,
    },
    Connecting {
        source: String,
        handle: Option<BranchHandle>,
        /// Live pointer position in canvas units.
        pointer: Position,
    },
}

/// A temporary edge drawn while a connection is being dragged out.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPreview {
    pub source: String,
    pub handle: Option<BranchHandle>,
    pub from: Position,
    pub to: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Turns raw pointer, wheel and keyboard input into camera changes, selection changes and
/// [`GraphCommand`]s, without knowing how anything is drawn.
///
/// The controller never mutates a graph. Drag previews live here until the gesture ends,
/// at which point a single command describing the whole gesture is returned.
#[derive(Debug, Clone)]
pub struct InteractionController {
    config: CanvasConfig,
    viewport: Viewport,
    mode: InteractionMode,
    selected_node: Option<String>,
    selected_edge: Option<String>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl InteractionController {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_config(CanvasConfig::default(), viewport)
    }

    pub fn with_config(config: CanvasConfig, viewport: Viewport) -> Self {
        Self {
            config,
            viewport: Viewport {
                zoom: clamp_zoom(viewport.zoom),
                ..viewport
            },
            mode: InteractionMode::Idle,
            selected_node: None,
            selected_edge: None,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Viewport {
            zoom: clamp_zoom(viewport.zoom),
            ..viewport
        };
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn is_idle(&self) -> bool {
        self.mode == InteractionMode::Idle
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    pub fn selected_edge(&self) -> Option<&str> {
        self.selected_edge.as_deref()
    }

    pub fn select_node(&mut self, node_id: Option<String>) {
        self.selected_node = node_id;
        self.selected_edge = None;
    }

    pub fn select_edge(&mut self, edge_id: Option<String>) {
        self.selected_edge = edge_id;
        self.selected_node = None;
    }

    pub fn clear_selection(&mut self) {
        self.selected_node = None;
        self.selected_edge = None;
    }

    /// Drops selection and gesture state that refers to nodes or edges no longer in `graph`.
    pub fn reconcile(&mut self, graph: &WorkflowGraph) {
        if self
            .selected_node
            .as_deref()
            .is_some_and(|id| graph.node(id).is_none())
        {
            self.selected_node = None;
        }
        if self
            .selected_edge
            .as_deref()
            .is_some_and(|id| graph.edge(id).is_none())
        {
            self.selected_edge = None;
        }
        let stale = match &self.mode {
            InteractionMode::DraggingNode { node_id, .. } => graph.node(node_id).is_none(),
            InteractionMode::Connecting { source, .. } => graph.node(source).is_none(),
            InteractionMode::Idle | InteractionMode::Panning { .. } => false,
        };
        if stale {
            self.mode = InteractionMode::Idle;
        }
    }

    /// Starts a gesture depending on what lies under the pointer. Ignored unless idle.
    pub fn pointer_down(&mut self, graph: &WorkflowGraph, screen: Position) {
        if !self.is_idle() {
            return;
        }
        let canvas = self.viewport.screen_to_canvas(screen);
        match hit_test(graph, canvas, self.config.handle_hit_radius) {
            HitTarget::Background => {
                self.clear_selection();
                self.mode = InteractionMode::Panning {
                    last_screen: screen,
                };
            }
            HitTarget::NodeBody(node_id) => {
                let Some(node) = graph.node(&node_id) else {
                    return;
                };
                let origin = node.position;
                self.select_node(Some(node_id.clone()));
                self.mode = InteractionMode::DraggingNode {
                    node_id,
                    origin,
                    grab_offset: canvas - origin,
                    pending: origin,
                };
            }
            HitTarget::OutputHandle { node_id, handle } => {
                self.mode = InteractionMode::Connecting {
                    source: node_id,
                    handle,
                    pointer: canvas,
                };
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Position) {
        let canvas = self.viewport.screen_to_canvas(screen);
        let grid_size = self.config.grid_size;
        match &mut self.mode {
            InteractionMode::Idle => {}
            InteractionMode::Panning { last_screen } => {
                let delta = screen - *last_screen;
                *last_screen = screen;
                self.viewport.x += delta.x;
                self.viewport.y += delta.y;
            }
            InteractionMode::DraggingNode {
                grab_offset,
                pending,
                ..
            } => {
                *pending = snap_to_grid(canvas - *grab_offset, grid_size);
            }
            InteractionMode::Connecting { pointer, .. } => {
                *pointer = canvas;
            }
        }
    }

    /// Ends the current gesture, returning the command it produced, if any.
    pub fn pointer_up(&mut self, graph: &WorkflowGraph, screen: Position) -> Option<GraphCommand> {
        self.pointer_move(screen);
        let mode = std::mem::replace(&mut self.mode, InteractionMode::Idle);
        match mode {
            InteractionMode::Idle | InteractionMode::Panning { .. } => None,
            InteractionMode::DraggingNode {
                node_id,
                origin,
                pending,
                ..
            } => {
                if pending == origin {
                    return None;
                }
                tracing::debug!(
                    node_id = %node_id,
                    x = pending.x,
                    y = pending.y,
                    "node drag committed"
                );
                Some(GraphCommand::MoveNode {
                    node_id,
                    position: pending,
                })
            }
            InteractionMode::Connecting {
                source,
                handle,
                pointer,
            } => {
                // The topmost node that accepts the connection wins.
                let mut rejection = None;
                let radius = self.config.handle_hit_radius;
                for target in nodes_at_input_edge(graph, pointer, radius) {
                    match graph.check_connection(&source, &target.id, handle) {
                        Ok(()) => {
                            return Some(GraphCommand::Connect {
                                source,
                                target: target.id.clone(),
                                handle,
                            });
                        }
                        Err(reason) => {
                            rejection.get_or_insert(reason);
                        }
                    }
                }
                if let Some(reason) = rejection {
                    tracing::debug!(%reason, "connection abandoned");
                }
                None
            }
        }
    }

    /// Abandons the current gesture without producing a command.
    pub fn pointer_cancel(&mut self) {
        if !self.is_idle() {
            tracing::debug!(mode = ?self.mode, "gesture cancelled");
        }
        self.mode = InteractionMode::Idle;
    }

    /// Zooms around the pointer so the canvas point under it stays put.
    ///
    /// Negative `delta_y` (wheel up) zooms in.
    pub fn wheel(&mut self, screen: Position, delta_y: f64) {
        let factor = if delta_y < 0.0 {
            1.0 + self.config.zoom_step
        } else if delta_y > 0.0 {
            1.0 - self.config.zoom_step
        } else {
            return;
        };
        let old_zoom = self.viewport.zoom;
        let new_zoom = clamp_zoom(old_zoom * factor);
        if new_zoom == old_zoom {
            return;
        }
        let ratio = new_zoom / old_zoom;
        self.viewport = Viewport {
            x: screen.x - (screen.x - self.viewport.x) * ratio,
            y: screen.y - (screen.y - self.viewport.y) * ratio,
            zoom: new_zoom,
        };
    }

    /// Handles a key press. Keys typed into a text field never reach the canvas.
    ///
    /// Arrow keys only pan the camera, and only while no node is selected.
    pub fn key_down(&mut self, key: Key, in_text_input: bool) -> Option<GraphCommand> {
        if in_text_input {
            return None;
        }
        let step = self.config.pan_step;
        let pan = |viewport: &mut Viewport, dx: f64, dy: f64| {
            viewport.x += dx;
            viewport.y += dy;
        };
        match key {
            Key::Delete | Key::Backspace => {
                if let Some(edge_id) = self.selected_edge.take() {
                    Some(GraphCommand::DeleteEdge { edge_id })
                } else {
                    self.selected_node
                        .take()
                        .map(|node_id| GraphCommand::DeleteNode { node_id })
                }
            }
            _ if self.selected_node.is_some() => None,
            Key::ArrowUp => {
                pan(&mut self.viewport, 0.0, step);
                None
            }
            Key::ArrowDown => {
                pan(&mut self.viewport, 0.0, -step);
                None
            }
            Key::ArrowLeft => {
                pan(&mut self.viewport, step, 0.0);
                None
            }
            Key::ArrowRight => {
                pan(&mut self.viewport, -step, 0.0);
                None
            }
            Key::Other => None,
        }
    }

    /// The uncommitted position of the node being dragged.
    pub fn pending_move(&self) -> Option<(&str, Position)> {
        match &self.mode {
            InteractionMode::DraggingNode {
                node_id, pending, ..
            } => Some((node_id.as_str(), *pending)),
            _ => None,
        }
    }

    /// Where `node` should be drawn, taking an in-progress drag into account.
    pub fn display_position(&self, node: &Node) -> Position {
        match self.pending_move() {
            Some((node_id, pending)) if node_id == node.id => pending,
            _ => node.position,
        }
    }

    pub fn connection_preview(&self, graph: &WorkflowGraph) -> Option<ConnectionPreview> {
        let InteractionMode::Connecting {
            source,
            handle,
            pointer,
        } = &self.mode
        else {
            return None;
        };
        let node = graph.node(source)?;
        Some(ConnectionPreview {
            source: source.clone(),
            handle: *handle,
            from: output_handle_position(node, *handle),
            to: *pointer,
        })
    }
}
