//! Layout dispatcher: the host-facing entry point
//!
//! [`LayoutEngine`] owns the arena, picks a static strategy or drives the
//! force simulation depending on the requested mode, routes pointer input to
//! the simulation and publishes snapshots for the renderer.
//!
//! The host calls [`LayoutEngine::tick`] from its frame scheduler while
//! [`LayoutEngine::needs_frame`] is true. Nothing steps between ticks.

use std::sync::Arc;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::graph::{self, Graph};
use crate::interaction::{InteractionController, PointerEvent};
use crate::layout::{self, PositionMap};
use crate::model::{CoordinateAccessors, GraphInput, LayoutMode, Position, Viewport};
use crate::simulation::{ForceSimulation, SimulationState, StepOutcome};
use crate::snapshot::{Snapshot, SnapshotMeta, SnapshotProducer};

/// Everything the host supplies for a layout pass
#[derive(Debug, Clone, Default)]
pub struct LayoutRequest {
    pub mode: LayoutMode,
    pub graph: GraphInput,
    pub viewport: Viewport,
    pub accessors: CoordinateAccessors,
}

impl LayoutRequest {
    pub fn new(mode: LayoutMode, graph: GraphInput, viewport: Viewport) -> Self {
        Self {
            mode,
            graph,
            viewport,
            accessors: CoordinateAccessors::default(),
        }
    }

    pub fn with_accessors(mut self, accessors: CoordinateAccessors) -> Self {
        self.accessors = accessors;
        self
    }
}

/// Network chart layout engine
#[derive(Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    enabled: bool,
    mode: LayoutMode,
    viewport: Viewport,
    signature: Option<u64>,
    generation: u32,
    graph: Graph,
    simulation: Option<ForceSimulation>,
    interaction: InteractionController,
    snapshots: SnapshotProducer,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        let config = config.sanitized();
        Self {
            interaction: InteractionController::new(&config.interaction),
            snapshots: SnapshotProducer::new(&config.snapshot),
            config,
            enabled: true,
            mode: LayoutMode::default(),
            viewport: Viewport::default(),
            signature: None,
            generation: 0,
            graph: Graph::default(),
            simulation: None,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Read-only view of the arena
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Simulation state, present only in force mode
    pub fn simulation_state(&self) -> Option<SimulationState> {
        self.simulation.as_ref().map(ForceSimulation::state)
    }

    /// Apply a new layout request
    ///
    /// Static modes cancel any running simulation and lay out once. Force
    /// mode re-seeds the simulation when the node/link identity, the viewport
    /// or the mode changed, and otherwise only refreshes node metadata.
    pub fn set_input(&mut self, request: LayoutRequest) {
        let LayoutRequest {
            mode,
            graph,
            viewport,
            accessors,
        } = request;
        let input = graph::normalize(&graph);
        let signature = graph::identity_signature(&input);

        match mode {
            LayoutMode::Force => {
                let reset = self.simulation.is_none()
                    || self.mode != LayoutMode::Force
                    || self.signature != Some(signature)
                    || self.viewport != viewport;
                self.mode = mode;
                self.viewport = viewport;
                self.signature = Some(signature);

                if reset {
                    self.rebuild(&input);
                    self.restart_simulation();
                } else {
                    self.graph.refresh(&input);
                    self.snapshots.request();
                }
            }
            _ => {
                self.cancel_simulation();
                self.mode = mode;
                self.viewport = viewport;
                self.signature = Some(signature);
                self.rebuild(&input);

                let positions = layout::compute(mode, &input.nodes, viewport, &accessors)
                    .unwrap_or_default();
                self.apply_positions(&positions);
                debug!(
                    %mode,
                    nodes = self.graph.len(),
                    placed = positions.len(),
                    "static layout computed"
                );
                self.publish();
            }
        }
    }

    /// Enable or disable the force simulation
    ///
    /// Disabling cancels stepping immediately. Enabling restarts the
    /// simulation from seeded positions when in force mode.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;

        if self.simulation.is_some() {
            if enabled {
                self.restart_simulation();
            } else {
                self.cancel_simulation_in_place();
            }
        }
    }

    /// Whether the host should schedule another [`tick`](Self::tick)
    pub fn needs_frame(&self) -> bool {
        self.simulation
            .as_ref()
            .is_some_and(|s| s.is_running() || s.has_pending_commands())
    }

    /// Run one scheduled frame
    ///
    /// Queued pointer commands are applied first, then one simulation step.
    /// Static modes always report [`StepOutcome::Idle`].
    pub fn tick(&mut self) -> StepOutcome {
        let Some(simulation) = self.simulation.as_mut() else {
            return StepOutcome::Idle;
        };

        let applied = simulation.apply_commands(&mut self.graph);
        let outcome = simulation.step(&mut self.graph);
        let meta = SnapshotMeta {
            mode: self.mode,
            frame: simulation.frame(),
            alpha: simulation.alpha(),
        };

        match outcome {
            StepOutcome::Stepped => {
                self.snapshots.request();
                let published = self.snapshots.offer(&self.graph, meta);
                if applied > 0 && !published {
                    self.snapshots.publish(&self.graph, meta);
                }
            }
            StepOutcome::Converged => {
                self.snapshots.publish(&self.graph, meta);
            }
            StepOutcome::Idle => {
                if applied > 0 || self.snapshots.is_pending() {
                    self.snapshots.publish(&self.graph, meta);
                }
            }
        }
        outcome
    }

    /// Tick until the simulation settles or `max_steps` frames have run
    ///
    /// Returns the number of frames run.
    pub fn run_until_converged(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && self.needs_frame() {
            self.tick();
            steps += 1;
        }
        steps
    }

    /// Deliver a pointer event
    ///
    /// Only meaningful in force mode; otherwise ignored. The resulting command
    /// takes effect on the next tick.
    pub fn pointer(&mut self, event: PointerEvent) {
        let Some(simulation) = self.simulation.as_mut() else {
            return;
        };
        if let Some(command) = self.interaction.handle(&self.graph, self.viewport, event) {
            simulation.enqueue(command);
        }
    }

    /// Press at `(x, y)`, returning the id of the grabbed node if one was hit
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Option<String> {
        self.simulation.as_ref()?;
        let at = Position::new(x, y);
        let id = self
            .interaction
            .hit_test(&self.graph, at)
            .and_then(|h| self.graph.node(h))
            .map(|n| n.id.clone());
        self.pointer(PointerEvent::Down(at));
        id
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.pointer(PointerEvent::Move(Position::new(x, y)));
    }

    pub fn pointer_release(&mut self) {
        self.pointer(PointerEvent::Release);
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.latest()
    }

    /// Current position of a node straight from the arena
    ///
    /// Pointer commands queued since the last [`tick`](Self::tick) are not
    /// applied yet, so a drag move shows up here only after the next tick.
    pub fn position_of(&self, id: &str) -> Option<Position> {
        self.graph
            .node_by_id(id)
            .filter(|n| n.placed)
            .map(|n| n.position())
    }

    fn rebuild(&mut self, input: &GraphInput) {
        self.generation = self.generation.wrapping_add(1);
        self.graph = Graph::build(input, self.generation);
    }

    fn restart_simulation(&mut self) {
        let simulation = ForceSimulation::new(
            &mut self.graph,
            self.viewport,
            self.config.force.clone(),
            self.enabled,
        );
        self.simulation = Some(simulation);
        self.publish();
    }

    fn cancel_simulation(&mut self) {
        if let Some(mut simulation) = self.simulation.take() {
            simulation.stop();
        }
    }

    fn cancel_simulation_in_place(&mut self) {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.stop();
        }
    }

    fn apply_positions(&mut self, positions: &PositionMap) {
        let center = self.viewport.center();
        for node in self.graph.nodes_mut() {
            node.stop();
            match positions.get(&node.id) {
                Some(&position) => {
                    node.set_position(position);
                    node.placed = true;
                }
                None => {
                    node.set_position(center);
                    node.placed = false;
                }
            }
        }
    }

    fn publish(&mut self) {
        let (frame, alpha) = self
            .simulation
            .as_ref()
            .map_or((0, 0.0), |s| (s.frame(), s.alpha()));
        let meta = SnapshotMeta {
            mode: self.mode,
            frame,
            alpha,
        };
        self.snapshots.publish(&self.graph, meta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinkInput, NodeInput};

    fn triangle() -> GraphInput {
        GraphInput {
            nodes: vec![
                NodeInput::new("a").with_group("x").with_coordinates(0.0, 0.0),
                NodeInput::new("b").with_group("y").with_coordinates(1.0, 2.0),
                NodeInput::new("c").with_group("x").with_coordinates(2.0, 4.0),
            ],
            links: vec![
                LinkInput::new("a", "b"),
                LinkInput::new("b", "c"),
                LinkInput::new("c", "a"),
                LinkInput::new("c", "missing"),
            ],
        }
    }

    fn force_engine() -> LayoutEngine {
        let mut engine = LayoutEngine::default();
        engine.set_input(LayoutRequest::new(
            LayoutMode::Force,
            triangle(),
            Viewport::new(400.0, 300.0),
        ));
        engine
    }

    fn assert_valid(snapshot: &Snapshot) {
        for node in &snapshot.nodes {
            assert!(node.position().is_finite(), "{} is not finite", node.id);
        }
        for link in &snapshot.links {
            assert!(snapshot.node(&link.source).is_some());
            assert!(snapshot.node(&link.target).is_some());
        }
    }

    #[test]
    fn circular_request_publishes_immediately() {
        let mut engine = LayoutEngine::default();
        engine.set_input(LayoutRequest::new(
            LayoutMode::Circular,
            triangle(),
            Viewport::new(100.0, 100.0),
        ));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.mode, LayoutMode::Circular);
        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.links.len(), 3, "dangling link is dropped");
        let a = snapshot.position("a").unwrap();
        assert!(a.distance_to(Position::new(90.0, 50.0)) < 1e-9);
        assert!(!engine.needs_frame());
        assert_eq!(engine.tick(), StepOutcome::Idle);
        assert_valid(&snapshot);
    }

    #[test]
    fn coordinate_request_uses_accessors_and_omits_unmapped_nodes() {
        let mut graph = triangle();
        graph.nodes.push(NodeInput::new("nowhere"));
        graph.links.push(LinkInput::new("a", "nowhere"));

        let mut engine = LayoutEngine::default();
        engine.set_input(LayoutRequest::new(
            LayoutMode::Coordinate,
            graph,
            Viewport::new(100.0, 100.0),
        ));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.position("a"), Some(Position::new(0.0, 100.0)));
        assert_eq!(snapshot.position("c"), Some(Position::new(100.0, 0.0)));
        assert!(snapshot.node("nowhere").is_none());
        assert!(engine.position_of("nowhere").is_none());
        assert_eq!(snapshot.links.len(), 3);
        assert_valid(&snapshot);
    }

    #[test]
    fn radial_request_rings_by_group() {
        let mut engine = LayoutEngine::default();
        let viewport = Viewport::new(400.0, 400.0);
        engine.set_input(LayoutRequest::new(LayoutMode::Radial, triangle(), viewport));

        let center = viewport.center();
        let a = engine.position_of("a").unwrap().distance_to(center);
        let c = engine.position_of("c").unwrap().distance_to(center);
        let b = engine.position_of("b").unwrap().distance_to(center);
        assert!((a - c).abs() < 1e-9);
        assert!(b > a);
    }

    #[test]
    fn force_mode_runs_until_converged() {
        let mut engine = force_engine();
        assert!(engine.needs_frame());

        let steps = engine.run_until_converged(10_000);
        assert!(steps > 0);
        assert!(!engine.needs_frame());

        let state = engine.simulation_state().unwrap();
        assert!(state.alpha <= 0.02);
        assert!(!state.running);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.frame, state.frame, "final frame is always published");
        assert_valid(&snapshot);
    }

    #[test]
    fn snapshots_are_throttled_while_stepping() {
        let mut engine = force_engine();
        let start = engine.snapshot().version;

        for _ in 0..10 {
            engine.tick();
        }
        // frames 1..=10, published on the even ones
        assert_eq!(engine.snapshot().version, start + 5);
        assert_eq!(engine.snapshot().frame, 10);
    }

    #[test]
    fn unchanged_input_keeps_simulation_running() {
        let mut engine = force_engine();
        for _ in 0..5 {
            engine.tick();
        }
        let frame = engine.simulation_state().unwrap().frame;

        let mut updated = triangle();
        updated.nodes[0].value = Some(5.0);
        engine.set_input(LayoutRequest::new(
            LayoutMode::Force,
            updated,
            Viewport::new(400.0, 300.0),
        ));

        assert_eq!(engine.simulation_state().unwrap().frame, frame);
        assert_eq!(engine.graph().node_by_id("a").unwrap().value, 5.0);
    }

    #[test]
    fn new_node_or_viewport_reseeds() {
        let mut engine = force_engine();
        for _ in 0..5 {
            engine.tick();
        }

        engine.set_input(LayoutRequest::new(
            LayoutMode::Force,
            triangle(),
            Viewport::new(500.0, 300.0),
        ));
        let state = engine.simulation_state().unwrap();
        assert_eq!(state.frame, 0);
        assert_eq!(state.alpha, 1.0);
    }

    #[test]
    fn switching_modes_resets_the_simulation() {
        let mut engine = force_engine();
        engine.run_until_converged(10_000);

        engine.set_input(LayoutRequest::new(
            LayoutMode::Circular,
            triangle(),
            Viewport::new(400.0, 300.0),
        ));
        assert!(engine.simulation_state().is_none());
        assert!(!engine.needs_frame());

        engine.set_input(LayoutRequest::new(
            LayoutMode::Force,
            triangle(),
            Viewport::new(400.0, 300.0),
        ));
        let state = engine.simulation_state().unwrap();
        assert_eq!(state.alpha, 1.0);
        assert!(state.running);
    }

    #[test]
    fn disabling_cancels_and_enabling_restarts() {
        let mut engine = force_engine();
        engine.tick();

        engine.set_enabled(false);
        assert!(!engine.needs_frame());
        let before = engine.position_of("a");
        assert_eq!(engine.tick(), StepOutcome::Idle);
        assert_eq!(engine.position_of("a"), before);

        engine.set_enabled(true);
        assert!(engine.needs_frame());
        assert_eq!(engine.simulation_state().unwrap().frame, 0);
    }

    #[test]
    fn disabled_engine_keeps_seeded_positions() {
        let mut engine = LayoutEngine::default();
        engine.set_enabled(false);
        engine.set_input(LayoutRequest::new(
            LayoutMode::Force,
            triangle(),
            Viewport::new(400.0, 300.0),
        ));

        let state = engine.simulation_state().unwrap();
        assert_eq!(state.alpha, 0.0);
        assert!(!engine.needs_frame());
        // seeded on a circle of radius 0.25 * 300 around the center
        let a = engine.position_of("a").unwrap();
        assert!((a.distance_to(Position::new(200.0, 150.0)) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn dragged_node_tracks_pointer() {
        let mut engine = force_engine();
        let a = engine.position_of("a").unwrap();

        assert_eq!(engine.pointer_down(a.x + 3.0, a.y), Some("a".to_string()));
        engine.pointer_move(42.0, 24.0);
        engine.tick();
        assert_eq!(engine.position_of("a"), Some(Position::new(42.0, 24.0)));
        assert_eq!(engine.snapshot().position("a"), Some(Position::new(42.0, 24.0)));

        for _ in 0..5 {
            engine.tick();
        }
        assert_eq!(engine.position_of("a"), Some(Position::new(42.0, 24.0)));

        engine.pointer_release();
        engine.tick();
        assert!(engine.simulation_state().unwrap().dragging.is_none());
        assert_ne!(engine.position_of("a"), Some(Position::new(42.0, 24.0)));
    }

    #[test]
    fn queued_drag_is_visible_after_the_next_tick() {
        let mut engine = force_engine();
        let a = engine.position_of("a").unwrap();

        engine.pointer_down(a.x, a.y);
        engine.pointer_move(10.0, 10.0);
        assert_eq!(engine.position_of("a"), Some(a));

        engine.tick();
        assert_eq!(engine.position_of("a"), Some(Position::new(10.0, 10.0)));
    }

    #[test]
    fn drag_after_convergence_still_moves_the_node() {
        let mut engine = force_engine();
        engine.run_until_converged(10_000);
        let a = engine.position_of("a").unwrap();

        engine.pointer_down(a.x, a.y);
        engine.pointer_move(10.0, 10.0);
        assert!(engine.needs_frame());
        assert_eq!(engine.tick(), StepOutcome::Idle);
        assert_eq!(engine.snapshot().position("a"), Some(Position::new(10.0, 10.0)));
    }

    #[test]
    fn pointer_down_on_empty_space_grabs_nothing() {
        let mut engine = force_engine();
        assert_eq!(engine.pointer_down(-500.0, -500.0), None);
        engine.tick();
        assert!(engine.simulation_state().unwrap().dragging.is_none());
    }

    #[test]
    fn release_without_drag_is_a_no_op() {
        let mut engine = force_engine();
        engine.run_until_converged(10_000);
        let before = engine.simulation_state();
        let positions: Vec<_> = ["a", "b", "c"].iter().map(|id| engine.position_of(id)).collect();

        engine.pointer_release();
        engine.pointer_release();
        engine.tick();

        assert_eq!(engine.simulation_state(), before);
        let after: Vec<_> = ["a", "b", "c"].iter().map(|id| engine.position_of(id)).collect();
        assert_eq!(positions, after);
    }

    #[test]
    fn pointer_is_ignored_in_static_modes() {
        let mut engine = LayoutEngine::default();
        engine.set_input(LayoutRequest::new(
            LayoutMode::Circular,
            triangle(),
            Viewport::new(100.0, 100.0),
        ));

        assert_eq!(engine.pointer_down(90.0, 50.0), None);
        engine.pointer_move(10.0, 10.0);
        engine.tick();
        assert!(engine.position_of("a").unwrap().distance_to(Position::new(90.0, 50.0)) < 1e-9);
    }

    #[test]
    fn empty_graph_schedules_nothing() {
        let mut engine = LayoutEngine::default();
        engine.set_input(LayoutRequest::new(
            LayoutMode::Force,
            GraphInput::default(),
            Viewport::new(100.0, 100.0),
        ));

        assert!(!engine.needs_frame());
        assert!(engine.snapshot().nodes.is_empty());
    }

    #[test]
    fn versions_never_go_backwards() {
        let mut engine = force_engine();
        let mut last = engine.snapshot().version;
        for _ in 0..50 {
            engine.tick();
            let version = engine.snapshot().version;
            assert!(version >= last);
            last = version;
        }
        engine.set_input(LayoutRequest::new(
            LayoutMode::Radial,
            triangle(),
            Viewport::new(100.0, 100.0),
        ));
        assert!(engine.snapshot().version > last);
    }
}
