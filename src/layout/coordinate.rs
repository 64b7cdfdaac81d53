use crate::model::{CoordinateAccessors, NodeInput, Position, Viewport};
use crate::numeric::{LinearScale, extent};

use super::PositionMap;

/// Map each node's raw `(x, y)` into the viewport
///
/// Domains are inferred from the finite coordinates only and padded to
/// `[v-1, v+1]` when every value is equal. The y axis is inverted so larger
/// values plot higher. Nodes whose mapped position is not finite (missing or
/// invalid raw values) are left out of the result.
pub fn coordinate_layout(
    nodes: &[NodeInput],
    viewport: Viewport,
    accessors: &CoordinateAccessors,
) -> PositionMap {
    let raw: Vec<(&str, f64, f64)> = nodes
        .iter()
        .map(|n| {
            (
                n.id.as_str(),
                accessors.x.get(n).unwrap_or(f64::NAN),
                accessors.y.get(n).unwrap_or(f64::NAN),
            )
        })
        .collect();

    let (Some(x_extent), Some(y_extent)) = (
        extent(raw.iter().map(|r| r.1)),
        extent(raw.iter().map(|r| r.2)),
    ) else {
        return PositionMap::new();
    };

    let x_scale = LinearScale::padded(x_extent, (0.0, viewport.width));
    let y_scale = LinearScale::padded(y_extent, (viewport.height, 0.0));

    raw.into_iter()
        .filter_map(|(id, x, y)| {
            let position = Position::new(x_scale.apply(x), y_scale.apply(y));
            position.is_finite().then(|| (id.to_string(), position))
        })
        .collect()
}
