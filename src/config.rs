//! Tunable constants for the layout engine
//!
//! Defaults reproduce the network chart's behavior. Every section uses
//! `#[serde(default)]`, so a config file only needs the keys it overrides.

use serde::{Deserialize, Serialize};

use crate::numeric::finite_or;

/// Physics parameters for the force simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Inverse-square repulsion constant between every pair of nodes
    pub repulsion_strength: f64,
    /// Added to squared distance so coincident nodes stay finite
    pub repulsion_epsilon: f64,
    /// Repulsion is recomputed only on frames divisible by this
    pub repulsion_interval: u64,
    /// Spring rest length for a link of weight zero
    pub link_distance: f64,
    /// Extra rest length per unit of link weight
    pub link_weight_factor: f64,
    /// Spring constant
    pub link_strength: f64,
    /// Pull toward the viewport center
    pub center_strength: f64,
    /// Fraction of velocity kept after each step (friction)
    pub velocity_retention: f64,
    /// Fraction of alpha removed after each step
    pub alpha_decay: f64,
    /// The simulation halts once alpha is at or below this
    pub alpha_min: f64,
    /// Seed circle radius as a fraction of the shorter viewport side
    pub seed_radius_factor: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            repulsion_strength: 1500.0,
            repulsion_epsilon: 0.01,
            repulsion_interval: 3,
            link_distance: 70.0,
            link_weight_factor: 3.0,
            link_strength: 0.025,
            center_strength: 0.002,
            velocity_retention: 0.92,
            alpha_decay: 0.02,
            alpha_min: 0.02,
            seed_radius_factor: 0.25,
        }
    }
}

impl ForceConfig {
    /// Rest length for a link of the given weight
    pub fn rest_length(&self, weight: f64) -> f64 {
        self.link_distance + self.link_weight_factor * weight
    }

    fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            repulsion_strength: finite_or(self.repulsion_strength, d.repulsion_strength),
            repulsion_epsilon: finite_or(self.repulsion_epsilon, d.repulsion_epsilon)
                .max(f64::MIN_POSITIVE),
            repulsion_interval: self.repulsion_interval.max(1),
            link_distance: finite_or(self.link_distance, d.link_distance),
            link_weight_factor: finite_or(self.link_weight_factor, d.link_weight_factor),
            link_strength: finite_or(self.link_strength, d.link_strength),
            center_strength: finite_or(self.center_strength, d.center_strength),
            velocity_retention: finite_or(self.velocity_retention, d.velocity_retention)
                .clamp(0.0, 1.0),
            // a zero decay would never converge
            alpha_decay: finite_or(self.alpha_decay, d.alpha_decay).clamp(1e-4, 1.0),
            alpha_min: finite_or(self.alpha_min, d.alpha_min).clamp(0.0, 1.0),
            seed_radius_factor: finite_or(self.seed_radius_factor, d.seed_radius_factor),
        }
    }
}

/// Pointer handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer-down within this many pixels of a node grabs it
    pub hit_radius: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { hit_radius: 16.0 }
    }
}

/// Snapshot publication throttling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Pending snapshots are published on frames divisible by this
    pub interval: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { interval: 2 }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub force: ForceConfig,
    pub interaction: InteractionConfig,
    pub snapshot: SnapshotConfig,
}

impl LayoutConfig {
    /// Replace values that would break the engine's invariants
    ///
    /// Non-finite numbers fall back to their defaults and intervals are at
    /// least one.
    pub fn sanitized(self) -> Self {
        Self {
            force: self.force.sanitized(),
            interaction: InteractionConfig {
                hit_radius: finite_or(self.interaction.hit_radius, 16.0).max(0.0),
            },
            snapshot: SnapshotConfig {
                interval: self.snapshot.interval.max(1),
            },
        }
    }
}
