//! Canvas geometry: grid snapping, viewport fitting and automatic layered layout.

mod auto;
mod geometry;

pub use auto::auto_layout_graph;
pub use geometry::{
    NodeRect, bounding_box, clamp_zoom, compute_fit_to_view, node_rect, snap_to_grid,
};

use crate::graph::Viewport;

/// Width of every node box, in canvas units.
pub const NODE_WIDTH: f64 = 220.0;
/// Height of every node box, in canvas units.
pub const NODE_HEIGHT: f64 = 72.0;
/// Lattice spacing committed node positions are snapped to.
pub const GRID_SIZE: f64 = 20.0;

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 2.0;
/// Fit-to-view never zooms in further than this.
pub const MAX_FIT_ZOOM: f64 = 1.5;
pub const FIT_PADDING: f64 = 60.0;

/// Horizontal distance between auto-layout layers.
pub const LAYER_SPACING_X: f64 = 280.0;
/// Vertical distance between nodes sharing a layer.
pub const NODE_SPACING_Y: f64 = 100.0;
/// Left margin of the first auto-layout layer.
pub const LAYOUT_MARGIN_X: f64 = 60.0;
/// Vertical center line layers are stacked around.
pub const LAYOUT_BASELINE_Y: f64 = 200.0;

/// Viewport used when there is nothing meaningful to fit.
pub const DEFAULT_FIT_VIEWPORT: Viewport = Viewport {
    x: 40.0,
    y: 40.0,
    zoom: 1.0,
};
