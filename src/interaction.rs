//! Pointer input for the force layout
//!
//! The controller hit-tests pointer positions against the arena and turns
//! pointer events into [`SimCommand`]s. It holds no drag state of its own:
//! which node is pinned lives in [`crate::simulation::SimulationState`].

use crate::config::InteractionConfig;
use crate::graph::{Graph, NodeHandle};
use crate::model::{Position, Viewport};
use crate::simulation::SimCommand;

/// A pointer event delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Position),
    Move(Position),
    Release,
}

/// Translates pointer events into simulation commands
#[derive(Debug, Clone)]
pub struct InteractionController {
    hit_radius: f64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(&InteractionConfig::default())
    }
}

impl InteractionController {
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            hit_radius: config.hit_radius,
        }
    }

    pub fn hit_radius(&self) -> f64 {
        self.hit_radius
    }

    /// First placed node, in arena order, within the hit radius of `at`
    pub fn hit_test(&self, graph: &Graph, at: Position) -> Option<NodeHandle> {
        graph
            .nodes()
            .iter()
            .position(|n| n.placed && n.position().distance_to(at) <= self.hit_radius)
            .map(|i| graph.handle_at(i))
    }

    /// Command for a pointer event, if the event does anything
    ///
    /// A press that misses every node produces nothing. Moves are clamped to
    /// the viewport. A release is always forwarded; releasing with nothing
    /// grabbed is a no-op in the simulation.
    pub fn handle(
        &self,
        graph: &Graph,
        viewport: Viewport,
        event: PointerEvent,
    ) -> Option<SimCommand> {
        match event {
            PointerEvent::Down(at) => self.hit_test(graph, at).map(SimCommand::Grab),
            PointerEvent::Move(at) => Some(SimCommand::DragTo(viewport.clamp(at))),
            PointerEvent::Release => Some(SimCommand::Release),
        }
    }
}
