//! Node/link arena owned by the layout engine
//!
//! Nodes live in a `Vec` and are addressed by [`NodeHandle`], an index paired
//! with the generation of the arena that minted it. Rebuilding the arena
//! bumps the generation, so a handle held across a rebuild (a stale drag
//! reference, for example) resolves to nothing instead of to a different node.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use serde_json::Value;
use tracing::debug;

use crate::model::{GraphInput, LinkInput, NodeInput, Position};

/// Stable reference to a node in a specific arena generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: usize,
    generation: u32,
}

impl NodeHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A node with its current layout state
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub group: Option<String>,
    pub value: f64,
    pub color: Option<Value>,
    pub x: f64,
    pub y: f64,
    /// Velocity, only meaningful in force mode
    pub vx: f64,
    pub vy: f64,
    /// False when the active layout could not position this node
    pub placed: bool,
}

impl Node {
    fn from_input(input: &NodeInput) -> Self {
        Self {
            id: input.id.clone(),
            group: input.group.clone(),
            value: input.value(),
            color: input.color.clone(),
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            placed: false,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Position) {
        self.x = position.x;
        self.y = position.y;
    }

    pub fn stop(&mut self) {
        self.vx = 0.0;
        self.vy = 0.0;
    }
}

/// A link between two arena indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

/// Drop duplicate node ids (first occurrence wins) and links whose endpoints
/// do not resolve
///
/// This is the single boundary where malformed caller data is discarded.
pub fn normalize(input: &GraphInput) -> GraphInput {
    let mut seen = HashSet::new();
    let nodes: Vec<NodeInput> = input
        .nodes
        .iter()
        .filter(|n| seen.insert(n.id.as_str()))
        .cloned()
        .collect();

    let links: Vec<LinkInput> = input
        .links
        .iter()
        .filter(|l| seen.contains(l.source.as_str()) && seen.contains(l.target.as_str()))
        .cloned()
        .collect();

    let dropped_nodes = input.nodes.len() - nodes.len();
    let dropped_links = input.links.len() - links.len();
    if dropped_nodes > 0 || dropped_links > 0 {
        debug!(
            dropped_nodes,
            dropped_links, "discarded duplicate nodes and dangling links"
        );
    }

    GraphInput { nodes, links }
}

/// Hash of the node id sequence and link endpoint sequence
///
/// Two inputs with the same signature describe the same graph shape, so a
/// running simulation can keep its positions.
pub fn identity_signature(input: &GraphInput) -> u64 {
    let mut hasher = DefaultHasher::new();
    input.nodes.len().hash(&mut hasher);
    for node in &input.nodes {
        node.id.hash(&mut hasher);
    }
    input.links.len().hash(&mut hasher);
    for link in &input.links {
        link.source.hash(&mut hasher);
        link.target.hash(&mut hasher);
    }
    hasher.finish()
}

/// Arena of nodes and resolved links
#[derive(Debug, Clone, Default)]
pub struct Graph {
    generation: u32,
    nodes: Vec<Node>,
    links: Vec<Link>,
    index: HashMap<String, usize>,
}

impl Graph {
    /// Build an arena from caller input
    ///
    /// Duplicate ids and dangling links are skipped here as well, so the
    /// arena holds valid links even if `input` was not normalized first.
    pub fn build(input: &GraphInput, generation: u32) -> Self {
        let mut nodes = Vec::with_capacity(input.nodes.len());
        let mut index = HashMap::with_capacity(input.nodes.len());
        for node in &input.nodes {
            if index.contains_key(&node.id) {
                continue;
            }
            index.insert(node.id.clone(), nodes.len());
            nodes.push(Node::from_input(node));
        }

        let links = input
            .links
            .iter()
            .filter_map(|l| {
                let source = *index.get(&l.source)?;
                let target = *index.get(&l.target)?;
                Some(Link {
                    source,
                    target,
                    weight: l.weight(),
                })
            })
            .collect();

        Self {
            generation,
            nodes,
            links,
            index,
        }
    }

    /// Copy passthrough metadata (group, value, color, link weight) from an
    /// input with the same identity signature, leaving positions untouched
    pub fn refresh(&mut self, input: &GraphInput) {
        for node in &input.nodes {
            if let Some(&i) = self.index.get(&node.id) {
                let target = &mut self.nodes[i];
                target.group = node.group.clone();
                target.value = node.value();
                target.color = node.color.clone();
            }
        }
        for (link, source) in self.links.iter_mut().zip(&input.links) {
            link.weight = source.weight();
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Mutable nodes alongside the links that connect them
    pub fn split_mut(&mut self) -> (&mut [Node], &[Link]) {
        (&mut self.nodes, &self.links)
    }

    /// Handle for the node with `id` in this generation
    pub fn handle(&self, id: &str) -> Option<NodeHandle> {
        self.index.get(id).map(|&index| self.handle_at(index))
    }

    pub(crate) fn handle_at(&self, index: usize) -> NodeHandle {
        NodeHandle {
            index,
            generation: self.generation,
        }
    }

    /// Arena index for `handle`, if it belongs to this generation
    pub fn resolve(&self, handle: NodeHandle) -> Option<usize> {
        (handle.generation == self.generation && handle.index < self.nodes.len())
            .then_some(handle.index)
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.resolve(handle).map(|i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.resolve(handle).map(|i| &mut self.nodes[i])
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }
}
