//! netlayout - Layout engine for network charts.
//!
//! Positions the nodes of a graph for rendering, either once with a static
//! strategy (coordinate, circular, radial) or continuously with a
//! force-directed simulation that the user can drag nodes around in. The
//! renderer reads immutable [`Snapshot`]s and never touches engine state.
//!
//! ```
//! use netlayout::{GraphInput, LayoutEngine, LayoutMode, LayoutRequest, LinkInput, NodeInput, Viewport};
//!
//! let graph = GraphInput {
//!     nodes: vec![NodeInput::new("a"), NodeInput::new("b")],
//!     links: vec![LinkInput::new("a", "b")],
//! };
//!
//! let mut engine = LayoutEngine::default();
//! engine.set_input(LayoutRequest::new(LayoutMode::Force, graph, Viewport::new(640.0, 480.0)));
//! while engine.needs_frame() {
//!     engine.tick();
//! }
//!
//! let snapshot = engine.snapshot();
//! assert_eq!(snapshot.nodes.len(), 2);
//! assert_eq!(snapshot.links.len(), 1);
//! ```

pub mod config;
pub mod engine;
pub mod graph;
pub mod interaction;
pub mod io;
pub mod layout;
pub mod model;
pub mod numeric;
pub mod simulation;
pub mod snapshot;

pub use config::LayoutConfig;
pub use engine::{LayoutEngine, LayoutRequest};
pub use model::{
    Accessor, CoordinateAccessors, GraphInput, LayoutMode, LinkInput, NodeInput, Position,
    Viewport,
};
pub use simulation::StepOutcome;
pub use snapshot::Snapshot;
