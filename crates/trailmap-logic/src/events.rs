//! Ambient map events - short-lived markers that pop up along the route
//! while the agent travels (a rainbow, a dolphin pod, a meteor shower).
//!
//! Purely cosmetic: they never touch missions or discoveries. The engine
//! decides when to spawn and despawn; this module owns the board and the
//! placement rules.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::map::Map;
use crate::theme::EventSpec;

/// How far from its anchor node an event may appear.
pub const EVENT_SCATTER_RADIUS: f32 = 40.0;

/// A live event on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEvent {
    pub id: u32,
    pub name: String,
    pub icon: String,
    pub position: Point,
    /// Seconds since engine start.
    pub spawned_at: f64,
}

/// Live events plus the id counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBoard {
    events: Vec<MapEvent>,
    next_id: u32,
}

impl EventBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[MapEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&MapEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Spawn an event near a route node at or ahead of `route_index`.
    ///
    /// Returns `None` if the map has no route or the theme has no event kinds.
    pub fn spawn(
        &mut self,
        kinds: &[EventSpec],
        map: &Map,
        route_index: usize,
        now_secs: f64,
        rng: &mut impl Rng,
    ) -> Option<&MapEvent> {
        let last = map.last_route_index()?;
        if kinds.is_empty() {
            return None;
        }
        let anchor_index = rng.gen_range(route_index.min(last)..=last);
        let anchor = map.route_position(anchor_index)?;
        let kind = kinds[rng.gen_range(0..kinds.len())];

        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = rng.gen_range(0.0..EVENT_SCATTER_RADIUS);
        let position = Point::new(anchor.x + radius * angle.cos(), anchor.y + radius * angle.sin());

        let id = self.next_id;
        self.next_id += 1;
        self.events.push(MapEvent {
            id,
            name: kind.name.to_string(),
            icon: kind.icon.to_string(),
            position,
            spawned_at: now_secs,
        });
        self.events.last()
    }

    /// Remove an event. Returns false if it was already gone.
    pub fn despawn(&mut self, id: u32) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        self.events.len() != before
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::geometry::Size;
    use crate::mapgen::generate_map;
    use crate::theme::Theme;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn map(rng: &mut StdRng) -> Map {
        generate_map(Theme::Forest, Size::new(1200.0, 800.0), &GeneratorConfig::default(), rng)
    }

    #[test]
    fn test_spawn_near_route() {
        let mut rng = StdRng::seed_from_u64(1);
        let map = map(&mut rng);
        let mut board = EventBoard::new();
        let kinds = Theme::Forest.palette().events;
        for _ in 0..20 {
            let event = board.spawn(kinds, &map, 0, 1.0, &mut rng).unwrap().clone();
            let near = map
                .route
                .iter()
                .filter_map(|id| map.node(*id))
                .any(|n| n.position.distance(&event.position) <= EVENT_SCATTER_RADIUS + 0.01);
            assert!(near);
        }
        assert_eq!(board.len(), 20);
    }

    #[test]
    fn test_ids_unique_and_despawn_idempotent() {
        let mut rng = StdRng::seed_from_u64(2);
        let map = map(&mut rng);
        let mut board = EventBoard::new();
        let kinds = Theme::Forest.palette().events;
        let a = board.spawn(kinds, &map, 0, 0.0, &mut rng).unwrap().id;
        let b = board.spawn(kinds, &map, 0, 0.0, &mut rng).unwrap().id;
        assert_ne!(a, b);
        assert!(board.despawn(a));
        assert!(!board.despawn(a));
        assert!(board.get(b).is_some());
    }

    #[test]
    fn test_no_route_no_event() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut board = EventBoard::new();
        let empty = Map::empty(Theme::Space);
        assert!(board
            .spawn(Theme::Space.palette().events, &empty, 0, 0.0, &mut rng)
            .is_none());
        assert!(board.is_empty());
    }
}
