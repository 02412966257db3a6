//! Adventure state - everything the simulation owns, in one plain struct.
//!
//! Only [`crate::transition::apply`] mutates it. The rendering layer reads it
//! through the engine accessors.

use serde::{Deserialize, Serialize};
use trailmap_logic::discovery::{Discovery, ObjectKind};
use trailmap_logic::events::EventBoard;
use trailmap_logic::geometry::{Point, Size};
use trailmap_logic::map::Map;
use trailmap_logic::mission::{Mission, MissionState};
use trailmap_logic::theme::Theme;

/// Top-level engine state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    SelectingTheme,
    /// Map generated, travel not started.
    Ready,
    Traveling,
    Paused,
    /// Route exhausted; start restarts from the beginning.
    Arrived,
}

impl EngineState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectingTheme => "selecting_theme",
            Self::Ready => "ready",
            Self::Traveling => "traveling",
            Self::Paused => "paused",
            Self::Arrived => "arrived",
        }
    }

    /// States that `start` accepts.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Ready | Self::Paused | Self::Arrived)
    }
}

/// A scan waiting for its reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingScan {
    pub position: Point,
    pub kind: ObjectKind,
    pub icon: String,
    pub zone_name: Option<String>,
    /// Theme at tap time; the map may change before the reveal.
    pub theme: Theme,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum ScannerState {
    #[default]
    Idle,
    Scanning(PendingScan),
    ShowingResult(Discovery),
}

impl ScannerState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdventureState {
    pub engine: EngineState,
    pub theme: Option<Theme>,
    pub canvas: Size,
    pub map: Option<Map>,

    // Travel
    pub position: Point,
    /// Index into `map.route` of the node the agent last reached.
    pub route_index: usize,
    /// Fraction of the current segment covered, in [0,1).
    pub segment_progress: f32,
    pub fast: bool,

    // Missions
    pub mission: MissionState,
    pub completed_missions: Vec<Mission>,
    /// Set once the first appearance timer is armed; cleared only by an
    /// explicit stop or a new map.
    pub mission_cycle: bool,
    pub next_mission_id: u32,

    pub scanner: ScannerState,
    pub discoveries: Vec<Discovery>,
    pub events: EventBoard,
}

impl AdventureState {
    pub fn new(canvas: Size, discoveries: Vec<Discovery>) -> Self {
        Self {
            engine: EngineState::SelectingTheme,
            theme: None,
            canvas,
            map: None,
            position: Point::ZERO,
            route_index: 0,
            segment_progress: 0.0,
            fast: false,
            mission: MissionState::None,
            completed_missions: Vec::new(),
            mission_cycle: false,
            next_mission_id: 1,
            scanner: ScannerState::Idle,
            discoveries,
            events: EventBoard::new(),
        }
    }

    pub fn is_traveling(&self) -> bool {
        self.engine == EngineState::Traveling
    }

    /// Put the agent back on the first route node with nothing visited.
    pub fn reset_travel(&mut self) {
        self.route_index = 0;
        self.segment_progress = 0.0;
        self.position = Point::ZERO;
        if let Some(map) = self.map.as_mut() {
            map.reset_visited();
            if let Some(start) = map.route_position(0) {
                self.position = start;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use trailmap_logic::config::GeneratorConfig;
    use trailmap_logic::mapgen::generate_map;

    #[test]
    fn test_new_state() {
        let state = AdventureState::new(Size::new(1200.0, 800.0), Vec::new());
        assert_eq!(state.engine, EngineState::SelectingTheme);
        assert!(state.map.is_none());
        assert!(state.scanner.is_idle());
        assert!(state.mission.is_none());
    }

    #[test]
    fn test_reset_travel_returns_to_start() {
        let mut rng = StdRng::seed_from_u64(3);
        let canvas = Size::new(1200.0, 800.0);
        let mut state = AdventureState::new(canvas, Vec::new());
        let mut map = generate_map(Theme::Forest, canvas, &GeneratorConfig::default(), &mut rng);
        map.nodes.iter_mut().for_each(|n| n.visited = true);
        let start = map.route_position(0).unwrap();
        state.map = Some(map);
        state.route_index = 3;
        state.segment_progress = 0.4;

        state.reset_travel();
        assert_eq!(state.route_index, 0);
        assert_eq!(state.segment_progress, 0.0);
        assert_eq!(state.position, start);
        assert_eq!(state.map.as_ref().unwrap().visited_count(), 0);
    }

    #[test]
    fn test_can_start() {
        assert!(!EngineState::SelectingTheme.can_start());
        assert!(EngineState::Ready.can_start());
        assert!(!EngineState::Traveling.can_start());
        assert!(EngineState::Paused.can_start());
        assert!(EngineState::Arrived.can_start());
    }
}
