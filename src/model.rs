//! Caller-facing graph records and small value types
//!
//! These mirror the node/link objects a network chart is fed with. They are
//! deserialized straight from JSON by the CLI and converted into the
//! engine's arena by [`crate::graph::Graph::build`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::numeric::{coerce, finite_or};

/// Layout strategy requested by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Iterative force-directed simulation
    #[default]
    Force,
    /// Positions mapped from per-node coordinates
    Coordinate,
    /// Evenly spaced on a single circle
    Circular,
    /// One concentric ring per group
    Radial,
}

impl LayoutMode {
    pub fn is_static(self) -> bool {
        !matches!(self, LayoutMode::Force)
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutMode::Force => "force",
            LayoutMode::Coordinate => "coordinate",
            LayoutMode::Circular => "circular",
            LayoutMode::Radial => "radial",
        };
        f.write_str(name)
    }
}

/// A point in viewport pixel space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Drawable area the layout is computed for
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Create a viewport, coercing non-finite or negative sizes to zero
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: coerce(width).max(0.0),
            height: coerce(height).max(0.0),
        }
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    /// Clamp a point into `[0, width] x [0, height]`
    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            crate::numeric::clamp(position.x, 0.0, self.width),
            crate::numeric::clamp(position.y, 0.0, self.height),
        )
    }
}

/// A node as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    /// Unique key, stable across recomputation
    pub id: String,

    /// Cluster key for the radial layout. Numbers are keyed by their decimal text.
    #[serde(
        default,
        deserialize_with = "deserialize_group",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<String>,

    /// Numeric weight used by the renderer for radius scaling (defaults to 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Opaque color passthrough
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,

    /// Raw coordinate for the coordinate layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,

    /// Raw coordinate for the coordinate layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,

    /// Any other fields, reachable through [`Accessor::field`]
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl NodeInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_coordinates(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Weight with the default applied
    pub fn value(&self) -> f64 {
        finite_or(self.value.unwrap_or(1.0), 1.0)
    }
}

fn deserialize_group<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// A link as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkInput {
    /// Source node id
    pub source: String,

    /// Target node id
    pub target: String,

    /// Non-negative weight (defaults to 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl LinkInput {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Weight with the default applied, never negative
    pub fn weight(&self) -> f64 {
        finite_or(self.weight.unwrap_or(1.0), 1.0).max(0.0)
    }
}

/// Complete caller graph: nodes and links
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
    #[serde(default)]
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub links: Vec<LinkInput>,
}

/// Reads one raw coordinate from a node
#[derive(Clone)]
pub struct Accessor(Arc<dyn Fn(&NodeInput) -> Option<f64> + Send + Sync>);

impl Accessor {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&NodeInput) -> Option<f64> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Reads [`NodeInput::x`]
    pub fn x() -> Self {
        Self::new(|node| node.x)
    }

    /// Reads [`NodeInput::y`]
    pub fn y() -> Self {
        Self::new(|node| node.y)
    }

    /// Reads a named field; `x` and `y` resolve to the dedicated fields
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            "x" => Self::x(),
            "y" => Self::y(),
            _ => Self::new(move |node| node.attributes.get(&name).and_then(Value::as_f64)),
        }
    }

    pub fn get(&self, node: &NodeInput) -> Option<f64> {
        (self.0)(node)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Accessor(..)")
    }
}

/// The pair of accessors used by the coordinate layout
#[derive(Debug, Clone)]
pub struct CoordinateAccessors {
    pub x: Accessor,
    pub y: Accessor,
}

impl Default for CoordinateAccessors {
    fn default() -> Self {
        Self {
            x: Accessor::x(),
            y: Accessor::y(),
        }
    }
}
