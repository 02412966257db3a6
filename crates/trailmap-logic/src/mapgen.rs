//! Map generation - terrain zones, nodes, connecting paths and the route.
//!
//! Pipeline: zones → nodes → proximity edges → connectivity repair → route.
//! Deterministic for a given random stream; inject a seeded rng in tests.

use std::collections::VecDeque;

use rand::Rng;

use crate::config::{FloatRange, GeneratorConfig};
use crate::geometry::{Point, Rect, Size};
use crate::map::{Map, Node, PathEdge, TerrainDecoration, TerrainType, TerrainZone};
use crate::route::{RouteGraph, RouteSearch};
use crate::theme::{TerrainSpec, Theme, ThemePalette};

/// Icon used when a palette has no node icons.
pub const DEFAULT_NODE_ICON: &str = "📍";

/// Generate a map for `theme` on a canvas of `canvas` points.
pub fn generate_map(
    theme: Theme,
    canvas: Size,
    config: &GeneratorConfig,
    rng: &mut impl Rng,
) -> Map {
    generate_map_with_palette(theme, theme.palette(), canvas, config, rng)
}

/// Same as [`generate_map`] with an explicit palette.
pub fn generate_map_with_palette(
    theme: Theme,
    palette: &ThemePalette,
    canvas: Size,
    config: &GeneratorConfig,
    rng: &mut impl Rng,
) -> Map {
    if canvas.is_empty() {
        return Map::empty(theme);
    }

    let zones = generate_zones(palette.terrains, canvas, config, rng);
    let nodes = generate_nodes(palette.node_icons, canvas, config, rng);
    let mut paths = connect_nearby(&nodes, canvas, config);
    repair_connectivity(&nodes, &mut paths);

    let mut map = Map {
        theme,
        nodes,
        paths,
        route: Vec::new(),
        zones,
    };
    map.route = plan_route(&map, config);
    map
}

// ── Terrain zones ───────────────────────────────────────────────────────

/// Split the canvas into a zone grid and dress each cell.
pub fn generate_zones(
    terrains: &[TerrainSpec],
    canvas: Size,
    config: &GeneratorConfig,
    rng: &mut impl Rng,
) -> Vec<TerrainZone> {
    if terrains.is_empty() || config.zone_rows == 0 || config.zone_cols == 0 {
        return Vec::new();
    }
    let cell_w = canvas.width / config.zone_cols as f32;
    let cell_h = canvas.height / config.zone_rows as f32;

    let mut recent: VecDeque<usize> = VecDeque::with_capacity(config.terrain_history + 1);
    let mut zones = Vec::with_capacity((config.zone_rows * config.zone_cols) as usize);

    for row in 0..config.zone_rows {
        for col in 0..config.zone_cols {
            let bounds = Rect::new(col as f32 * cell_w, row as f32 * cell_h, cell_w, cell_h);
            let pick = pick_terrain(terrains.len(), &recent, rng);
            recent.push_back(pick);
            while recent.len() > config.terrain_history {
                recent.pop_front();
            }

            let terrain = TerrainType::from(&terrains[pick]);
            let decorations = generate_decorations(&bounds, &terrain, config, rng);
            zones.push(TerrainZone {
                bounds,
                terrain,
                decorations,
            });
        }
    }
    zones
}

/// Pick a terrain index not among the recent picks; any index if all are recent.
fn pick_terrain(count: usize, recent: &VecDeque<usize>, rng: &mut impl Rng) -> usize {
    let candidates: Vec<usize> = (0..count).filter(|i| !recent.contains(i)).collect();
    if candidates.is_empty() {
        rng.gen_range(0..count)
    } else {
        candidates[rng.gen_range(0..candidates.len())]
    }
}

fn generate_decorations(
    bounds: &Rect,
    terrain: &TerrainType,
    config: &GeneratorConfig,
    rng: &mut impl Rng,
) -> Vec<TerrainDecoration> {
    if terrain.decoration_icons.is_empty() {
        return Vec::new();
    }
    let rolled = config.decorations_per_zone.sample(rng);
    let scaled = (rolled as f32 * terrain.decoration_density).floor() as i64;
    if scaled <= 0 {
        return Vec::new();
    }

    let area = bounds.inset(config.decoration_padding);
    (0..scaled)
        .map(|_| {
            let icon = &terrain.decoration_icons[rng.gen_range(0..terrain.decoration_icons.len())];
            TerrainDecoration {
                icon: icon.clone(),
                position: sample_point(&area, rng),
                size: config.decoration_size.sample(rng),
                opacity: config.decoration_opacity.sample(rng),
                rotation: config.decoration_rotation.sample(rng),
            }
        })
        .collect()
}

// ── Nodes ───────────────────────────────────────────────────────────────

/// Scatter nodes over a grid of cells, 1..n per cell.
pub fn generate_nodes(
    icons: &[&str],
    canvas: Size,
    config: &GeneratorConfig,
    rng: &mut impl Rng,
) -> Vec<Node> {
    if config.node_rows == 0 || config.node_cols == 0 {
        return Vec::new();
    }
    let cell_w = canvas.width / config.node_cols as f32;
    let cell_h = canvas.height / config.node_rows as f32;
    let margin = Rect::from_size(canvas).inset(config.canvas_padding);

    let mut nodes = Vec::new();
    let mut next_id = 1u32;
    for row in 0..config.node_rows {
        for col in 0..config.node_cols {
            let cell = Rect::new(col as f32 * cell_w, row as f32 * cell_h, cell_w, cell_h);
            let interior = cell.inset(config.node_cell_padding);
            let count = config.nodes_per_cell.sample(rng);
            for _ in 0..count {
                let position = margin.clamp(sample_point(&interior, rng));
                let icon = if icons.is_empty() {
                    DEFAULT_NODE_ICON
                } else {
                    icons[rng.gen_range(0..icons.len())]
                };
                nodes.push(Node {
                    id: next_id,
                    position,
                    icon: icon.to_string(),
                    visited: false,
                });
                next_id += 1;
            }
        }
    }
    nodes
}

fn sample_point(area: &Rect, rng: &mut impl Rng) -> Point {
    Point::new(
        FloatRange::new(area.min_x(), area.max_x()).sample(rng),
        FloatRange::new(area.min_y(), area.max_y()).sample(rng),
    )
}

// ── Paths ───────────────────────────────────────────────────────────────

/// An edge for every pair closer than `connect_fraction` of the canvas width.
pub fn connect_nearby(nodes: &[Node], canvas: Size, config: &GeneratorConfig) -> Vec<PathEdge> {
    let threshold = canvas.width * config.connect_fraction;
    let mut paths = Vec::new();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            if a.position.distance(&b.position) <= threshold {
                paths.push(PathEdge {
                    id: paths.len() as u32 + 1,
                    from: a.id,
                    to: b.id,
                });
            }
        }
    }
    paths
}

/// Join every node unreachable from the first one to its nearest reached node.
pub fn repair_connectivity(nodes: &[Node], paths: &mut Vec<PathEdge>) {
    let Some(first) = nodes.first() else {
        return;
    };
    let graph = RouteGraph::from_edges(paths.iter().map(|p| (p.from, p.to)));
    let mut reached = graph.reachable_from(first.id);
    reached.insert(first.id);

    for node in nodes {
        if reached.contains(&node.id) {
            continue;
        }
        let mut nearest: Option<(f32, u32)> = None;
        for other in nodes.iter().filter(|n| reached.contains(&n.id)) {
            let d = node.position.distance_squared(&other.position);
            if nearest.map_or(true, |(best, _)| d < best) {
                nearest = Some((d, other.id));
            }
        }
        if let Some((_, anchor)) = nearest {
            paths.push(PathEdge {
                id: paths.len() as u32 + 1,
                from: node.id,
                to: anchor,
            });
        }
        reached.insert(node.id);
    }
}

// ── Route ───────────────────────────────────────────────────────────────

/// Longest route from the leftmost node to the rightmost one, falling back
/// to the longest route from the leftmost node anywhere.
pub fn plan_route(map: &Map, config: &GeneratorConfig) -> Vec<u32> {
    let Some(first) = map.nodes.first() else {
        return Vec::new();
    };
    let mut leftmost = first;
    let mut rightmost = first;
    for node in &map.nodes {
        if node.position.x < leftmost.position.x {
            leftmost = node;
        }
        if node.position.x > rightmost.position.x {
            rightmost = node;
        }
    }

    let graph = map.graph();
    let search = RouteSearch::with_budget(config.route_search_budget);
    search
        .longest_path(&graph, leftmost.id, Some(rightmost.id))
        .or_else(|| search.longest_path(&graph, leftmost.id, None))
        .unwrap_or_else(|| vec![leftmost.id])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::is_simple_walk;
    use crate::theme::DiscoveryVocabulary;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn bare_palette() -> ThemePalette {
        ThemePalette {
            name: "Bare",
            music_track: "none",
            terrains: &[],
            node_icons: &[],
            vocabulary: DiscoveryVocabulary {
                names: &[],
                species: &[],
                descriptions: &[],
                fun_facts: &[],
            },
            events: &[],
            action_sounds: &[],
        }
    }

    #[test]
    fn test_empty_canvas_short_circuits() {
        let map = generate_map(
            Theme::Forest,
            Size::new(0.0, 800.0),
            &GeneratorConfig::default(),
            &mut rng(),
        );
        assert!(map.is_empty());
        assert!(map.zones.is_empty());
        assert!(map.route.is_empty());
    }

    #[test]
    fn test_empty_palette_still_builds_nodes() {
        let map = generate_map_with_palette(
            Theme::Forest,
            &bare_palette(),
            Size::new(1200.0, 800.0),
            &GeneratorConfig::default(),
            &mut rng(),
        );
        assert!(map.zones.is_empty());
        assert!(!map.nodes.is_empty());
        assert!(map.nodes.iter().all(|n| n.icon == DEFAULT_NODE_ICON));
        assert!(!map.route.is_empty());
    }

    #[test]
    fn test_recent_terrain_avoided() {
        let config = GeneratorConfig {
            zone_rows: 4,
            zone_cols: 6,
            ..GeneratorConfig::default()
        };
        let zones = generate_zones(
            Theme::Ocean.palette().terrains,
            Size::new(1200.0, 800.0),
            &config,
            &mut rng(),
        );
        // With 4 terrain types and a 2-pick window there is always an alternative.
        for window in zones.windows(3) {
            assert_ne!(window[2].name(), window[1].name());
            assert_ne!(window[2].name(), window[0].name());
        }
    }

    #[test]
    fn test_single_terrain_falls_back() {
        let terrains = &Theme::Space.palette().terrains[..1];
        let zones = generate_zones(
            terrains,
            Size::new(600.0, 400.0),
            &GeneratorConfig::default(),
            &mut rng(),
        );
        assert_eq!(zones.len(), 6);
        assert!(zones.iter().all(|z| z.name() == terrains[0].name));
    }

    #[test]
    fn test_zero_density_skips_decorations() {
        let terrains = [TerrainSpec {
            name: "Bare Rock",
            primary_color: "#000",
            secondary_color: "#111",
            decoration_icons: &["🪨"],
            decoration_density: 0.0,
        }];
        let zones = generate_zones(
            &terrains,
            Size::new(600.0, 400.0),
            &GeneratorConfig::default(),
            &mut rng(),
        );
        assert!(zones.iter().all(|z| z.decorations.is_empty()));
    }

    #[test]
    fn test_decorations_inside_padded_zone() {
        let config = GeneratorConfig::default();
        let map = generate_map(Theme::Forest, Size::new(1200.0, 800.0), &config, &mut rng());
        for zone in &map.zones {
            let inner = zone.bounds.inset(config.decoration_padding);
            let max = config.decorations_per_zone.max as usize;
            assert!(zone.decorations.len() <= max);
            for d in &zone.decorations {
                assert!(inner.contains(&d.position), "{:?} outside {:?}", d.position, inner);
                assert!(config.decoration_size.contains(d.size));
                assert!(config.decoration_opacity.contains(d.opacity));
                assert!(config.decoration_rotation.contains(d.rotation));
            }
        }
    }

    #[test]
    fn test_nodes_respect_canvas_margin() {
        let config = GeneratorConfig::default();
        let canvas = Size::new(1200.0, 800.0);
        let nodes = generate_nodes(Theme::Arctic.palette().node_icons, canvas, &config, &mut rng());
        let margin = Rect::from_size(canvas).inset(config.canvas_padding);
        assert!(nodes.iter().all(|n| margin.contains(&n.position)));
        let mut ids: Vec<u32> = nodes.iter().map(|n| n.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), nodes.len());
    }

    #[test]
    fn test_repair_joins_islands() {
        let far = |id, x| Node {
            id,
            position: Point::new(x, 100.0),
            icon: "o".into(),
            visited: false,
        };
        let nodes = vec![far(1, 0.0), far(2, 500.0), far(3, 1000.0)];
        let mut paths = Vec::new();
        repair_connectivity(&nodes, &mut paths);
        assert_eq!(paths.len(), 2);
        // Node 3 is closer to node 2 than node 1 once node 2 is reached.
        assert!(paths[1].connects(3, 2));
    }

    #[test]
    fn test_route_runs_left_to_right() {
        let map = generate_map(
            Theme::Forest,
            Size::new(1200.0, 800.0),
            &GeneratorConfig::default(),
            &mut rng(),
        );
        let first = map.route_node(0).unwrap();
        let last = map.route_node(map.route.len() - 1).unwrap();
        let min_x = map.nodes.iter().map(|n| n.position.x).fold(f32::MAX, f32::min);
        let max_x = map.nodes.iter().map(|n| n.position.x).fold(f32::MIN, f32::max);
        assert_eq!(first.position.x, min_x);
        assert_eq!(last.position.x, max_x);
        assert!(is_simple_walk(&map.graph(), &map.route));
    }

    #[test]
    fn test_same_seed_same_map() {
        let config = GeneratorConfig::default();
        let canvas = Size::new(1024.0, 768.0);
        let a = generate_map(Theme::Space, canvas, &config, &mut StdRng::seed_from_u64(9));
        let b = generate_map(Theme::Space, canvas, &config, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
