use crate::model::{NodeInput, Viewport};

use super::{PositionMap, circular_layout, ring};

/// Smallest outer ring radius, in pixels
const MIN_MAX_RADIUS: f64 = 48.0;

/// Outer ring radius as a fraction of the shorter viewport side
const MAX_RADIUS_FACTOR: f64 = 0.45;

/// Smallest distance between consecutive rings
const MIN_SPACING: f64 = 36.0;

/// One concentric ring per group, groups ordered by first appearance
///
/// Nodes without a group share a synthetic bucket that takes a ring like any
/// other group. With fewer than two buckets there is nothing to separate, so
/// the circular layout is used.
pub fn radial_layout(nodes: &[NodeInput], viewport: Viewport) -> PositionMap {
    let mut buckets: Vec<(Option<&str>, Vec<&NodeInput>)> = Vec::new();
    for node in nodes {
        let key = node.group.as_deref();
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(node),
            None => buckets.push((key, vec![node])),
        }
    }

    if buckets.len() <= 1 {
        return circular_layout(nodes, viewport);
    }

    let max_radius = MIN_MAX_RADIUS.max(MAX_RADIUS_FACTOR * viewport.min_side());
    let spacing = MIN_SPACING.max(max_radius / buckets.len() as f64);
    let center = viewport.center();

    buckets
        .iter()
        .enumerate()
        .flat_map(|(k, (_, members))| {
            let radius = max_radius.min(spacing * (k + 1) as f64);
            ring(members.len(), center, radius)
                .zip(members.iter())
                .map(|(position, node)| (node.id.clone(), position))
        })
        .collect()
}
