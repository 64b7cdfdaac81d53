use crate::model::{NodeInput, Viewport};

use super::{PositionMap, ring};

/// Smallest circle radius, in pixels
const MIN_RADIUS: f64 = 32.0;

/// Circle radius as a fraction of the shorter viewport side
const RADIUS_FACTOR: f64 = 0.4;

/// Radius used by the circular layout for `viewport`
pub fn circle_radius(viewport: Viewport) -> f64 {
    MIN_RADIUS.max(RADIUS_FACTOR * viewport.min_side())
}

/// Place nodes at equal angular steps around the viewport center, in input order
pub fn circular_layout(nodes: &[NodeInput], viewport: Viewport) -> PositionMap {
    ring(nodes.len(), viewport.center(), circle_radius(viewport))
        .zip(nodes)
        .map(|(position, node)| (node.id.clone(), position))
        .collect()
}
