//! Force-directed simulation for the `force` layout mode
//!
//! Pairwise inverse-square repulsion, springs along links and a weak pull
//! toward the viewport center, integrated with velocity damping. The
//! simulation cools through `alpha` and halts for good once alpha reaches
//! [`ForceConfig::alpha_min`]; it is then re-created by the engine when the
//! input changes.
//!
//! Pointer input reaches the simulation as [`SimCommand`]s. They are queued
//! and applied at the start of a step, never in the middle of one.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::config::ForceConfig;
use crate::graph::{Graph, NodeHandle};
use crate::layout::ring;
use crate::model::{Position, Viewport};
use crate::numeric::finite_or;

/// Pointer-driven changes to the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    /// Take ownership of a node's position away from the physics
    Grab(NodeHandle),
    /// Move the grabbed node to a viewport position
    DragTo(Position),
    /// Hand the grabbed node back to the physics
    Release,
}

/// Observable simulation state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    /// Temperature in `[0, 1]`; scales every force
    pub alpha: f64,
    /// Number of completed steps
    pub frame: u64,
    /// Whether further steps will move anything
    pub running: bool,
    /// Node currently pinned to the pointer
    pub dragging: Option<NodeHandle>,
}

/// What a call to [`ForceSimulation::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Forces were applied and the simulation is still warm
    Stepped,
    /// This call cooled the simulation below the threshold; it will not step again
    Converged,
    /// Nothing to do: already converged, disabled or stopped
    Idle,
}

/// CPU force simulation over a [`Graph`]
#[derive(Debug, Clone)]
pub struct ForceSimulation {
    config: ForceConfig,
    viewport: Viewport,
    state: SimulationState,
    commands: VecDeque<SimCommand>,
}

impl ForceSimulation {
    /// Seed `graph` on a circle around the viewport center and start warm
    ///
    /// A disabled simulation starts with alpha zero: nodes stay at their
    /// seeded positions and no step is ever taken. An empty graph never runs.
    pub fn new(graph: &mut Graph, viewport: Viewport, config: ForceConfig, enabled: bool) -> Self {
        seed(graph, viewport, config.seed_radius_factor);

        let alpha = if enabled { 1.0 } else { 0.0 };
        let running = enabled && !graph.is_empty() && alpha > config.alpha_min;
        debug!(
            nodes = graph.len(),
            links = graph.links().len(),
            enabled,
            "force simulation initialized"
        );

        Self {
            config,
            viewport,
            state: SimulationState {
                alpha,
                frame: 0,
                running,
                dragging: None,
            },
            commands: VecDeque::new(),
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn alpha(&self) -> f64 {
        self.state.alpha
    }

    pub fn frame(&self) -> u64 {
        self.state.frame
    }

    /// Check if further steps will move nodes
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn dragging(&self) -> Option<NodeHandle> {
        self.state.dragging
    }

    pub fn has_pending_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Cancel any further stepping
    pub fn stop(&mut self) {
        if self.state.running {
            debug!(frame = self.state.frame, "force simulation stopped");
        }
        self.state.running = false;
    }

    pub fn enqueue(&mut self, command: SimCommand) {
        self.commands.push_back(command);
    }

    /// Apply queued pointer commands, returning how many were consumed
    pub fn apply_commands(&mut self, graph: &mut Graph) -> usize {
        let count = self.commands.len();
        while let Some(command) = self.commands.pop_front() {
            match command {
                SimCommand::Grab(handle) => {
                    if let Some(node) = graph.node_mut(handle) {
                        node.stop();
                        self.state.dragging = Some(handle);
                    }
                }
                SimCommand::DragTo(position) => {
                    let position = self.viewport.clamp(position);
                    if let Some(node) = self.state.dragging.and_then(|h| graph.node_mut(h)) {
                        node.set_position(position);
                        node.stop();
                    }
                }
                SimCommand::Release => self.state.dragging = None,
            }
        }
        count
    }

    /// Advance the simulation by one step
    ///
    /// Order within a step: queued commands, repulsion, springs, centering,
    /// integration, then alpha decay.
    pub fn step(&mut self, graph: &mut Graph) -> StepOutcome {
        self.apply_commands(graph);

        if !self.state.running {
            return StepOutcome::Idle;
        }
        if graph.is_empty() || self.state.alpha <= self.config.alpha_min {
            self.state.running = false;
            return StepOutcome::Converged;
        }

        // a pinned handle from an older arena no longer applies
        let pinned = self.state.dragging.and_then(|h| graph.resolve(h));

        if self.state.frame % self.config.repulsion_interval == 0 {
            self.apply_repulsion(graph);
        }
        self.apply_springs(graph);
        self.apply_centering(graph);
        self.integrate(graph, pinned);

        self.state.frame += 1;
        self.state.alpha *= 1.0 - self.config.alpha_decay;
        trace!(frame = self.state.frame, alpha = self.state.alpha, "force step");

        if self.state.alpha <= self.config.alpha_min {
            self.state.running = false;
            debug!(frame = self.state.frame, "force simulation converged");
            StepOutcome::Converged
        } else {
            StepOutcome::Stepped
        }
    }

    /// Step until converged or `max_steps` is reached, returning steps taken
    pub fn run_to_convergence(&mut self, graph: &mut Graph, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && self.is_running() {
            self.step(graph);
            steps += 1;
        }
        steps
    }

    /// Inverse-square repulsion between every pair of nodes
    fn apply_repulsion(&self, graph: &mut Graph) {
        let strength = self.config.repulsion_strength * self.state.alpha;
        let epsilon = self.config.repulsion_epsilon;
        let nodes = graph.nodes_mut();
        let n = nodes.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let mut dx = nodes[j].x - nodes[i].x;
                let dy = nodes[j].y - nodes[i].y;
                if dx == 0.0 && dy == 0.0 {
                    // coincident nodes get pushed apart along x
                    dx = 1e-3;
                }

                let dist_sq = dx * dx + dy * dy + epsilon;
                let dist = dist_sq.sqrt();
                let force = strength / dist_sq;

                let fx = force * dx / dist;
                let fy = force * dy / dist;

                nodes[i].vx -= fx;
                nodes[i].vy -= fy;
                nodes[j].vx += fx;
                nodes[j].vy += fy;
            }
        }
    }

    /// Spring force between linked nodes
    fn apply_springs(&self, graph: &mut Graph) {
        let strength = self.config.link_strength * self.state.alpha;
        let (nodes, links) = graph.split_mut();

        for link in links {
            let (source, target) = (link.source, link.target);
            if source == target || source >= nodes.len() || target >= nodes.len() {
                continue;
            }

            let dx = nodes[target].x - nodes[source].x;
            let dy = nodes[target].y - nodes[source].y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist == 0.0 {
                continue;
            }

            let stretch = dist - self.config.rest_length(link.weight);
            let force = stretch * strength / dist;

            let fx = force * dx;
            let fy = force * dy;

            nodes[source].vx += fx;
            nodes[source].vy += fy;
            nodes[target].vx -= fx;
            nodes[target].vy -= fy;
        }
    }

    /// Weak pull toward the viewport center
    fn apply_centering(&self, graph: &mut Graph) {
        let strength = self.config.center_strength * self.state.alpha;
        let center = self.viewport.center();

        for node in graph.nodes_mut() {
            node.vx += (center.x - node.x) * strength;
            node.vy += (center.y - node.y) * strength;
        }
    }

    /// Damp velocities and move every node except the pinned one
    fn integrate(&self, graph: &mut Graph, pinned: Option<usize>) {
        let retention = self.config.velocity_retention;
        let center = self.viewport.center();

        for (i, node) in graph.nodes_mut().iter_mut().enumerate() {
            if Some(i) == pinned {
                node.stop();
                continue;
            }

            node.vx *= retention;
            node.vy *= retention;
            node.x += node.vx;
            node.y += node.vy;

            if !(node.x.is_finite() && node.y.is_finite()) {
                node.x = finite_or(node.x, center.x);
                node.y = finite_or(node.y, center.y);
                node.stop();
            }
        }
    }
}

/// Place every node evenly on a circle around the viewport center
///
/// Keeps nodes apart so the first repulsion pass has a direction to work with.
pub fn seed(graph: &mut Graph, viewport: Viewport, radius_factor: f64) {
    let radius = radius_factor * viewport.min_side();
    let positions: Vec<Position> = ring(graph.len(), viewport.center(), radius).collect();

    for (node, position) in graph.nodes_mut().iter_mut().zip(positions) {
        node.set_position(position);
        node.stop();
        node.placed = true;
    }
}
