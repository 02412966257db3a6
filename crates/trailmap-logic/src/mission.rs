//! Missions - small, penalty-free objectives offered during travel.
//!
//! A [`Mission`] carries an objective and integer progress towards a target.
//! Progress only ever moves up and is clamped at the target. The lifecycle
//! (available → active → celebrating) is tracked by [`MissionState`]; the
//! timers that drive it live in the engine.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CountRange;
use crate::map::Map;
use crate::theme::Theme;

// ============================================================================
// OBJECTIVES
// ============================================================================

/// What the player is asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionObjective {
    /// Pass through a node inside the named terrain zone.
    VisitZone { zone_name: String },
    /// Scan any `count` objects.
    ScanItems { count: u32 },
    /// Get the agent to route index `route_index`.
    ReachNode { route_index: usize },
    /// Travel through `count` more route nodes.
    TravelNodes { count: u32 },
}

impl MissionObjective {
    /// Progress needed to complete this objective.
    pub fn target(&self) -> i32 {
        match self {
            Self::VisitZone { .. } | Self::ReachNode { .. } => 1,
            Self::ScanItems { count } | Self::TravelNodes { count } => *count as i32,
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::VisitZone { zone_name } => format!("Visit the {}", zone_name),
            Self::ScanItems { count: 1 } => "Scan something interesting".to_string(),
            Self::ScanItems { count } => format!("Scan {} things", count),
            Self::ReachNode { route_index } => format!("Reach stop #{}", route_index + 1),
            Self::TravelNodes { count } => format!("Travel through {} stops", count),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::VisitZone { .. } => "🗺️",
            Self::ScanItems { .. } => "🔍",
            Self::ReachNode { .. } => "🚩",
            Self::TravelNodes { .. } => "👣",
        }
    }
}

/// Something that happened which may move a mission forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent<'a> {
    /// A scan finished.
    Scanned,
    /// The agent advanced one route node.
    NodeAdvanced,
    /// The agent arrived at a node inside this zone.
    ZoneVisited(&'a str),
    /// The agent's route index is now this value.
    RouteIndexReached(usize),
}

// ============================================================================
// MISSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: u32,
    pub theme: Theme,
    pub objective: MissionObjective,
    pub created_at: DateTime<Utc>,
    pub accepted: bool,
    pub progress: i32,
    pub target: i32,
}

impl Mission {
    pub fn new(
        id: u32,
        theme: Theme,
        objective: MissionObjective,
        created_at: DateTime<Utc>,
    ) -> Self {
        let target = objective.target();
        Self {
            id,
            theme,
            objective,
            created_at,
            accepted: false,
            progress: 0,
            target,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= self.target
    }

    /// Completion in [0,1]; a non-positive target counts as done.
    pub fn fraction(&self) -> f32 {
        if self.target <= 0 {
            return 1.0;
        }
        (self.progress as f32 / self.target as f32).clamp(0.0, 1.0)
    }

    /// Apply a progress event. Returns true if progress changed.
    pub fn record(&mut self, event: ProgressEvent<'_>) -> bool {
        if self.is_complete() {
            return false;
        }
        let next = match (&self.objective, event) {
            (MissionObjective::ScanItems { .. }, ProgressEvent::Scanned) => self.progress + 1,
            (MissionObjective::TravelNodes { .. }, ProgressEvent::NodeAdvanced) => {
                self.progress + 1
            }
            (MissionObjective::VisitZone { zone_name }, ProgressEvent::ZoneVisited(name))
                if zone_name == name =>
            {
                self.target
            }
            (MissionObjective::ReachNode { route_index }, ProgressEvent::RouteIndexReached(i))
                if i >= *route_index =>
            {
                self.target
            }
            _ => return false,
        };
        let next = next.min(self.target).max(self.progress);
        let changed = next != self.progress;
        self.progress = next;
        changed
    }
}

// ============================================================================
// LIFECYCLE STATE
// ============================================================================

/// The single outstanding mission slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum MissionState {
    #[default]
    None,
    /// Offered, waiting to be accepted before it fades.
    Available(Mission),
    /// Accepted and tracking progress.
    Active(Mission),
    /// Completed; shown until dismissed.
    Celebrating(Mission),
}

impl MissionState {
    pub fn mission(&self) -> Option<&Mission> {
        match self {
            Self::None => None,
            Self::Available(m) | Self::Active(m) | Self::Celebrating(m) => Some(m),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Ranges used when rolling a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionTuning {
    pub scan_items: CountRange,
    pub travel_nodes: CountRange,
    /// How far ahead a reach-node target is placed.
    pub reach_steps: CountRange,
    /// Fewer steps than this left on the route turns reach-node into scan-one.
    pub min_steps_ahead: usize,
}

impl Default for MissionTuning {
    fn default() -> Self {
        Self {
            scan_items: CountRange::new(1, 3),
            travel_nodes: CountRange::new(2, 4),
            reach_steps: CountRange::new(2, 4),
            min_steps_ahead: 3,
        }
    }
}

/// Roll a random mission for the agent at `route_index` on `map`.
pub fn generate_mission(
    theme: Theme,
    map: &Map,
    route_index: usize,
    tuning: &MissionTuning,
    id: u32,
    created_at: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Mission {
    let fallback = MissionObjective::ScanItems { count: 1 };
    let objective = match rng.gen_range(0..4) {
        0 => {
            if map.zones.is_empty() {
                fallback
            } else {
                let zone = &map.zones[rng.gen_range(0..map.zones.len())];
                MissionObjective::VisitZone {
                    zone_name: zone.name().to_string(),
                }
            }
        }
        1 => MissionObjective::ScanItems {
            count: tuning.scan_items.sample(rng).max(1),
        },
        2 => {
            let last = map.last_route_index().unwrap_or(0);
            let ahead = last.saturating_sub(route_index);
            if ahead < tuning.min_steps_ahead {
                fallback
            } else {
                let steps = tuning.reach_steps.sample(rng).max(1) as usize;
                MissionObjective::ReachNode {
                    route_index: (route_index + steps).min(last),
                }
            }
        }
        _ => MissionObjective::TravelNodes {
            count: tuning.travel_nodes.sample(rng).max(1),
        },
    };
    Mission::new(id, theme, objective, created_at)
}
