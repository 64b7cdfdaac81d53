//! One-shot layout strategies
//!
//! Each strategy is a pure function from the caller's nodes and the viewport
//! to a map of node id to position. Nothing here iterates or keeps velocity;
//! the force-directed mode lives in [`crate::simulation`].

mod circular;
mod coordinate;
mod radial;

use std::collections::HashMap;

pub use circular::{circle_radius, circular_layout};
pub use coordinate::coordinate_layout;
pub use radial::radial_layout;

use crate::model::{CoordinateAccessors, LayoutMode, NodeInput, Position, Viewport};

/// Computed positions keyed by node id
pub type PositionMap = HashMap<String, Position>;

/// Run the static strategy for `mode`
///
/// Returns `None` for [`LayoutMode::Force`], which has no one-shot layout.
pub fn compute(
    mode: LayoutMode,
    nodes: &[NodeInput],
    viewport: Viewport,
    accessors: &CoordinateAccessors,
) -> Option<PositionMap> {
    match mode {
        LayoutMode::Force => None,
        LayoutMode::Coordinate => Some(coordinate_layout(nodes, viewport, accessors)),
        LayoutMode::Circular => Some(circular_layout(nodes, viewport)),
        LayoutMode::Radial => Some(radial_layout(nodes, viewport)),
    }
}

/// Evenly spaced points on a circle, starting at angle zero
pub(crate) fn ring(count: usize, center: Position, radius: f64) -> impl Iterator<Item = Position> {
    (0..count).map(move |i| {
        let angle = std::f64::consts::TAU * i as f64 / count as f64;
        Position::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    })
}
