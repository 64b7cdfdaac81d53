//! Read-only position snapshots for the rendering layer
//!
//! The engine mutates its arena in place; renderers only ever see an
//! immutable [`Snapshot`] behind an `Arc`. Publication is throttled: a
//! request marks a snapshot as pending (repeated requests coalesce into one)
//! and the pending snapshot is taken on the next frame divisible by the
//! configured interval. Renderers compare [`Snapshot::version`] to detect
//! that nothing changed since their last read.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::SnapshotConfig;
use crate::graph::Graph;
use crate::model::{LayoutMode, Position};

/// A positioned node as handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
}

impl NodeSnapshot {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// A link with both endpoint positions resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkSnapshot {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub source_position: Position,
    pub target_position: Position,
}

/// Where a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotMeta {
    pub mode: LayoutMode,
    pub frame: u64,
    pub alpha: f64,
}

/// Immutable copy of the layout at one point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Publish counter, strictly increasing for the lifetime of a producer
    pub version: u64,
    pub mode: LayoutMode,
    /// Simulation frame that produced this snapshot (zero for static layouts)
    pub frame: u64,
    pub alpha: f64,
    pub nodes: Vec<NodeSnapshot>,
    pub links: Vec<LinkSnapshot>,
}

impl Snapshot {
    /// Copy the placed nodes of `graph` and the links between them
    pub fn capture(graph: &Graph, meta: SnapshotMeta, version: u64) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .filter(|n| n.placed)
            .map(|n| NodeSnapshot {
                id: n.id.clone(),
                x: n.x,
                y: n.y,
                group: n.group.clone(),
                value: n.value,
                color: n.color.clone(),
            })
            .collect();

        let all = graph.nodes();
        let links = graph
            .links()
            .iter()
            .filter_map(|l| {
                let source = all.get(l.source).filter(|n| n.placed)?;
                let target = all.get(l.target).filter(|n| n.placed)?;
                Some(LinkSnapshot {
                    source: source.id.clone(),
                    target: target.id.clone(),
                    weight: l.weight,
                    source_position: source.position(),
                    target_position: target.position(),
                })
            })
            .collect();

        Self {
            version,
            mode: meta.mode,
            frame: meta.frame,
            alpha: meta.alpha,
            nodes,
            links,
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn position(&self, id: &str) -> Option<Position> {
        self.node(id).map(NodeSnapshot::position)
    }
}

/// Throttled publisher of [`Snapshot`]s
#[derive(Debug, Clone)]
pub struct SnapshotProducer {
    interval: u64,
    pending: bool,
    version: u64,
    latest: Arc<Snapshot>,
}

impl Default for SnapshotProducer {
    fn default() -> Self {
        Self::new(&SnapshotConfig::default())
    }
}

impl SnapshotProducer {
    pub fn new(config: &SnapshotConfig) -> Self {
        Self {
            interval: config.interval.max(1),
            pending: false,
            version: 0,
            latest: Arc::new(Snapshot::default()),
        }
    }

    /// Mark a snapshot as wanted; requests made before it is taken coalesce
    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Publish the pending snapshot if `meta.frame` falls on the interval
    ///
    /// Returns whether a snapshot was published.
    pub fn offer(&mut self, graph: &Graph, meta: SnapshotMeta) -> bool {
        if !self.pending || meta.frame % self.interval != 0 {
            return false;
        }
        self.publish(graph, meta);
        true
    }

    /// Publish immediately, bypassing the throttle
    pub fn publish(&mut self, graph: &Graph, meta: SnapshotMeta) -> Arc<Snapshot> {
        self.version += 1;
        self.pending = false;
        self.latest = Arc::new(Snapshot::capture(graph, meta, self.version));
        Arc::clone(&self.latest)
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&self.latest)
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
