//! Rendering-independent canvas interaction: pan, zoom, node dragging, connection dragging,
//! selection and keyboard shortcuts.

mod controller;
mod hit;

pub use controller::{CanvasConfig, ConnectionPreview, InteractionController, InteractionMode, Key};
pub use hit::{
    HitTarget, hit_test, nodes_at_input_edge, output_handle_position, output_handles,
};
