//! Map generation parameters.
//!
//! All tunables of the generator live here with their defaults, so callers
//! override only what they need (`..GeneratorConfig::default()`), and JSON
//! overrides may be partial thanks to `#[serde(default)]`.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive integer range sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Uniform draw in `[min, max]`. A reversed range is treated as its swap.
    pub fn sample(&self, rng: &mut impl Rng) -> u32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        rng.gen_range(lo..=hi)
    }
}

/// Half-open float range sampled uniformly; collapses to `min` when empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Configuration for map generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Terrain zone grid.
    pub zone_rows: u32,
    pub zone_cols: u32,
    /// How many recent terrain picks are avoided when choosing the next one.
    pub terrain_history: usize,
    /// Decorations rolled per zone, before density scaling.
    pub decorations_per_zone: CountRange,
    /// Inset from zone bounds for decoration placement.
    pub decoration_padding: f32,
    pub decoration_size: FloatRange,
    pub decoration_opacity: FloatRange,
    /// Degrees.
    pub decoration_rotation: FloatRange,

    /// Node placement grid (independent of the zone grid).
    pub node_rows: u32,
    pub node_cols: u32,
    pub nodes_per_cell: CountRange,
    /// Inset inside each node cell.
    pub node_cell_padding: f32,
    /// Margin kept clear around the whole canvas.
    pub canvas_padding: f32,

    /// Nodes closer than `connect_fraction * canvas width` get an edge.
    pub connect_fraction: f32,
    /// Frame budget for the exhaustive route search.
    pub route_search_budget: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            zone_rows: 2,
            zone_cols: 3,
            terrain_history: 2,
            decorations_per_zone: CountRange::new(6, 12),
            decoration_padding: 20.0,
            decoration_size: FloatRange::new(24.0, 48.0),
            decoration_opacity: FloatRange::new(0.5, 0.9),
            decoration_rotation: FloatRange::new(-15.0, 15.0),
            node_rows: 3,
            node_cols: 4,
            nodes_per_cell: CountRange::new(1, 2),
            node_cell_padding: 30.0,
            canvas_padding: 40.0,
            connect_fraction: 0.25,
            route_search_budget: crate::route::DEFAULT_SEARCH_BUDGET,
        }
    }
}

impl GeneratorConfig {
    /// Upper bound on generated nodes.
    pub fn max_nodes(&self) -> u32 {
        self.node_rows * self.node_cols * self.nodes_per_cell.min.max(self.nodes_per_cell.max)
    }

    /// Lower bound on generated nodes.
    pub fn min_nodes(&self) -> u32 {
        self.node_rows * self.node_cols * self.nodes_per_cell.min.min(self.nodes_per_cell.max)
    }
}
