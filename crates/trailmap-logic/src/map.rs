//! Adventure map data model.
//!
//! A [`Map`] is produced once per "new map" request by [`crate::mapgen`] and is
//! read-only afterwards, except for [`Node::visited`], which the simulation
//! flips as the agent passes through.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::route::RouteGraph;
use crate::theme::{TerrainSpec, Theme};

/// A stop on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u32,
    pub position: Point,
    pub icon: String,
    pub visited: bool,
}

/// Undirected connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEdge {
    pub id: u32,
    pub from: u32,
    pub to: u32,
}

impl PathEdge {
    pub fn connects(&self, a: u32, b: u32) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// Terrain descriptor copied out of the theme palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainType {
    pub name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub decoration_icons: Vec<String>,
    pub decoration_density: f32,
}

impl From<&TerrainSpec> for TerrainType {
    fn from(spec: &TerrainSpec) -> Self {
        Self {
            name: spec.name.to_string(),
            primary_color: spec.primary_color.to_string(),
            secondary_color: spec.secondary_color.to_string(),
            decoration_icons: spec.decoration_icons.iter().map(|s| s.to_string()).collect(),
            decoration_density: spec.decoration_density.clamp(0.0, 1.0),
        }
    }
}

/// Cosmetic prop scattered inside a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainDecoration {
    pub icon: String,
    pub position: Point,
    pub size: f32,
    pub opacity: f32,
    /// Degrees.
    pub rotation: f32,
}

/// Rectangular terrain region; zones tile the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainZone {
    pub bounds: Rect,
    pub terrain: TerrainType,
    pub decorations: Vec<TerrainDecoration>,
}

impl TerrainZone {
    pub fn name(&self) -> &str {
        &self.terrain.name
    }
}

/// A complete generated map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub theme: Theme,
    pub nodes: Vec<Node>,
    pub paths: Vec<PathEdge>,
    /// Node ids in travel order; a simple path through `paths`.
    pub route: Vec<u32>,
    pub zones: Vec<TerrainZone>,
}

impl Map {
    pub fn empty(theme: Theme) -> Self {
        Self {
            theme,
            nodes: Vec::new(),
            paths: Vec::new(),
            route: Vec::new(),
            zones: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: u32) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: u32) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Node at `index` along the route.
    pub fn route_node(&self, index: usize) -> Option<&Node> {
        self.route.get(index).and_then(|id| self.node(*id))
    }

    /// Position of the route node at `index`.
    pub fn route_position(&self, index: usize) -> Option<Point> {
        self.route_node(index).map(|n| n.position)
    }

    /// Highest valid route index, or `None` for an empty route.
    pub fn last_route_index(&self) -> Option<usize> {
        self.route.len().checked_sub(1)
    }

    /// First zone whose bounds contain `point`.
    pub fn zone_at(&self, point: &Point) -> Option<&TerrainZone> {
        self.zones.iter().find(|z| z.bounds.contains(point))
    }

    /// Adjacency view of `paths` including isolated nodes.
    pub fn graph(&self) -> RouteGraph {
        let mut graph = RouteGraph::from_edges(self.paths.iter().map(|p| (p.from, p.to)));
        for node in &self.nodes {
            graph.add_node(node.id);
        }
        graph
    }

    pub fn are_connected(&self, a: u32, b: u32) -> bool {
        self.paths.iter().any(|p| p.connects(a, b))
    }

    /// Clear every visited flag.
    pub fn reset_visited(&mut self) {
        for node in &mut self.nodes {
            node.visited = false;
        }
    }

    pub fn visited_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.visited).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32, x: f32, y: f32) -> Node {
        Node {
            id,
            position: Point::new(x, y),
            icon: "o".into(),
            visited: false,
        }
    }

    fn sample() -> Map {
        Map {
            theme: Theme::Forest,
            nodes: vec![node(1, 10.0, 10.0), node(2, 60.0, 10.0), node(3, 110.0, 10.0)],
            paths: vec![
                PathEdge { id: 1, from: 1, to: 2 },
                PathEdge { id: 2, from: 3, to: 2 },
            ],
            route: vec![1, 2, 3],
            zones: vec![TerrainZone {
                bounds: Rect::new(0.0, 0.0, 50.0, 50.0),
                terrain: TerrainType::from(&Theme::Forest.palette().terrains[0]),
                decorations: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_route_lookup() {
        let map = sample();
        assert_eq!(map.route_node(1).unwrap().id, 2);
        assert_eq!(map.route_position(2), Some(Point::new(110.0, 10.0)));
        assert_eq!(map.route_node(3), None);
        assert_eq!(map.last_route_index(), Some(2));
        assert_eq!(Map::empty(Theme::Ocean).last_route_index(), None);
    }

    #[test]
    fn test_edges_are_undirected() {
        let map = sample();
        assert!(map.are_connected(2, 3));
        assert!(map.are_connected(3, 2));
        assert!(!map.are_connected(1, 3));
        assert!(map.graph().has_edge(2, 3));
    }

    #[test]
    fn test_zone_lookup() {
        let map = sample();
        assert_eq!(map.zone_at(&Point::new(10.0, 10.0)).unwrap().name(), "Meadow");
        assert!(map.zone_at(&Point::new(110.0, 10.0)).is_none());
    }

    #[test]
    fn test_reset_visited() {
        let mut map = sample();
        map.node_mut(2).unwrap().visited = true;
        assert_eq!(map.visited_count(), 1);
        map.reset_visited();
        assert_eq!(map.visited_count(), 0);
    }
}
