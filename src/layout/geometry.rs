use super::{
    DEFAULT_FIT_VIEWPORT, FIT_PADDING, MAX_FIT_ZOOM, MAX_ZOOM, MIN_ZOOM, NODE_HEIGHT, NODE_WIDTH,
};
use crate::graph::{Node, Position, Viewport};

/// Axis-aligned rectangle in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl NodeRect {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Rounds both axes to the nearest multiple of `grid_size`.
///
/// A non-positive grid size leaves the position untouched.
pub fn snap_to_grid(position: Position, grid_size: f64) -> Position {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return position;
    }
    Position::new(
        (position.x / grid_size).round() * grid_size,
        (position.y / grid_size).round() * grid_size,
    )
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// The box a node occupies on the canvas.
pub fn node_rect(node: &Node) -> NodeRect {
    NodeRect {
        min_x: node.position.x,
        min_y: node.position.y,
        max_x: node.position.x + NODE_WIDTH,
        max_y: node.position.y + NODE_HEIGHT,
    }
}

/// Smallest rectangle covering every node box, or `None` for an empty slice.
pub fn bounding_box(nodes: &[Node]) -> Option<NodeRect> {
    nodes.iter().map(node_rect).reduce(|acc, rect| NodeRect {
        min_x: acc.min_x.min(rect.min_x),
        min_y: acc.min_y.min(rect.min_y),
        max_x: acc.max_x.max(rect.max_x),
        max_y: acc.max_y.max(rect.max_y),
    })
}

/// Computes a viewport that shows every node centered in a `canvas_width x canvas_height`
/// canvas, leaving `padding` pixels on each side.
///
/// With no nodes or a canvas without area the fixed default viewport is returned.
pub fn compute_fit_to_view(
    nodes: &[Node],
    canvas_width: f64,
    canvas_height: f64,
    padding: Option<f64>,
) -> Viewport {
    let padding = padding.unwrap_or(FIT_PADDING);
    let has_area = |side: f64| side.is_finite() && side > 0.0;
    if !has_area(canvas_width) || !has_area(canvas_height) || !padding.is_finite() {
        return DEFAULT_FIT_VIEWPORT;
    }
    let Some(bounds) = bounding_box(nodes) else {
        return DEFAULT_FIT_VIEWPORT;
    };

    let available_width = canvas_width - padding * 2.0;
    let available_height = canvas_height - padding * 2.0;
    let ratio = (available_width / bounds.width()).min(available_height / bounds.height());
    let zoom = ratio.max(MIN_ZOOM).min(MAX_FIT_ZOOM);

    Viewport {
        x: (canvas_width - bounds.width() * zoom) / 2.0 - bounds.min_x * zoom,
        y: (canvas_height - bounds.height() * zoom) / 2.0 - bounds.min_y * zoom,
        zoom,
    }
}
