//! Trailmap Headless Simulation Harness
//!
//! Validates map generation, route search, mission and discovery rules and
//! full engine runs without a renderer. Runs entirely in-process on a
//! simulated clock.
//!
//! Usage:
//!   cargo run -p trailmap-simtest
//!   cargo run -p trailmap-simtest -- --verbose --seed 7
//!   cargo run -p trailmap-simtest -- --config engine.json

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use env_logger::Env;
use rand::rngs::StdRng;
use rand::SeedableRng;
use trailmap_core::audio::{RecordingAudio, SFX_DISCOVERY, SFX_SCAN};
use trailmap_core::config::EngineConfig;
use trailmap_core::engine::AdventureEngine;
use trailmap_core::persistence::{DiscoveryStore, FileStore, MemoryStore};
use trailmap_core::state::{EngineState, ScannerState};
use trailmap_logic::discovery::{generate_discovery, ObjectKind, Rarity};
use trailmap_logic::geometry::{Point, Size};
use trailmap_logic::mapgen::generate_map;
use trailmap_logic::mission::{generate_mission, MissionObjective, MissionState};
use trailmap_logic::route::{is_simple_walk, RouteGraph, RouteSearch};
use trailmap_logic::theme::Theme;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

/// Headless validation of generation, route search and engine runs.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print every result, not only failures, and log at debug level.
    #[arg(long)]
    verbose: bool,
    /// Base seed for every generator and engine run.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// JSON engine config overriding the defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

struct Options {
    verbose: bool,
    seed: u64,
    config: EngineConfig,
}

fn main() {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(2);
            }
        },
        None => EngineConfig::default(),
    };
    let options = Options {
        verbose: cli.verbose,
        seed: cli.seed,
        config,
    };
    let default_level = if options.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    println!("=== Trailmap Simulation Harness (seed {}) ===\n", options.seed);

    let mut results = Vec::new();

    // 1. Map generation sweep
    results.extend(validate_generation(&options));

    // 2. Route search on synthetic graphs
    results.extend(validate_route_search());

    // 3. Mission generation rules
    results.extend(validate_missions(&options));

    // 4. Discovery bounds and rarity distribution
    results.extend(validate_discoveries(&options));

    // 5. Full engine adventure
    results.extend(validate_engine(&options));

    // 6. Persistence round trip
    results.extend(validate_persistence(&options));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Map Generation ───────────────────────────────────────────────────

fn validate_generation(options: &Options) -> Vec<TestResult> {
    println!("--- Map Generation ---");
    let mut results = Vec::new();
    let config = &options.config.generator;
    let sizes = [
        Size::new(1200.0, 800.0),
        Size::new(390.0, 844.0),
        Size::new(2048.0, 1536.0),
    ];

    let mut maps = 0;
    let mut disconnected = 0;
    let mut bad_routes = 0;
    let mut bad_counts = 0;
    let mut route_total = 0;
    for theme in Theme::ALL {
        for size in sizes {
            for i in 0..10u64 {
                let mut rng = StdRng::seed_from_u64(options.seed.wrapping_add(i));
                let map = generate_map(theme, size, config, &mut rng);
                maps += 1;
                let graph = map.graph();
                let connected = map
                    .nodes
                    .first()
                    .map_or(false, |n| graph.reachable_from(n.id).len() == map.nodes.len());
                if !connected {
                    disconnected += 1;
                }
                if !is_simple_walk(&graph, &map.route) || map.route.is_empty() {
                    bad_routes += 1;
                }
                let count = map.nodes.len() as u32;
                if count < config.min_nodes() || count > config.max_nodes() {
                    bad_counts += 1;
                }
                route_total += map.route.len();
            }
        }
    }

    results.push(TestResult {
        name: "generation_connected".into(),
        passed: disconnected == 0,
        detail: format!("{}/{} maps form one component", maps - disconnected, maps),
    });
    results.push(TestResult {
        name: "generation_routes_valid".into(),
        passed: bad_routes == 0,
        detail: format!(
            "{} invalid routes, mean route length {:.1}",
            bad_routes,
            route_total as f32 / maps as f32
        ),
    });
    results.push(TestResult {
        name: "generation_node_counts".into(),
        passed: bad_counts == 0,
        detail: format!(
            "node counts within {}..={} ({} outside)",
            config.min_nodes(),
            config.max_nodes(),
            bad_counts
        ),
    });

    let mut rng = StdRng::seed_from_u64(options.seed);
    let empty = generate_map(Theme::Forest, Size::new(0.0, 0.0), config, &mut rng);
    results.push(TestResult {
        name: "generation_degenerate_canvas".into(),
        passed: empty.is_empty() && empty.zones.is_empty(),
        detail: "zero canvas yields an empty map".into(),
    });

    results
}

// ── 2. Route Search ─────────────────────────────────────────────────────

fn validate_route_search() -> Vec<TestResult> {
    println!("--- Route Search ---");
    let mut results = Vec::new();

    // Ladder: two rails joined by rungs; the longest path snakes through all.
    let mut ladder = RouteGraph::new();
    for i in 0..8u32 {
        ladder.add_edge(i, i + 1);
        ladder.add_edge(100 + i, 100 + i + 1);
    }
    for i in 0..=8u32 {
        ladder.add_edge(i, 100 + i);
    }
    let search = RouteSearch::default();
    let path = search.longest_path(&ladder, 0, Some(100)).unwrap_or_default();
    results.push(TestResult {
        name: "route_ladder_hamiltonian".into(),
        passed: path.len() == 18 && is_simple_walk(&ladder, &path),
        detail: format!("ladder path covers {} of 18 nodes", path.len()),
    });

    let mut split = RouteGraph::from_edges([(1, 2), (3, 4)]);
    split.add_node(5);
    results.push(TestResult {
        name: "route_unreachable_target".into(),
        passed: search.longest_path(&split, 1, Some(4)).is_none(),
        detail: "disconnected target yields no path".into(),
    });

    // A dense grid with a tiny budget must still yield a valid walk.
    let mut grid = RouteGraph::new();
    for r in 0..6u32 {
        for c in 0..6u32 {
            let id = r * 6 + c;
            if c < 5 {
                grid.add_edge(id, id + 1);
            }
            if r < 5 {
                grid.add_edge(id, id + 6);
            }
        }
    }
    let tight = RouteSearch::with_budget(50);
    let untargeted = tight.longest_path(&grid, 0, None).unwrap_or_default();
    let targeted = tight.longest_path(&grid, 0, Some(35)).unwrap_or_default();
    results.push(TestResult {
        name: "route_budget_fallback".into(),
        passed: is_simple_walk(&grid, &untargeted)
            && is_simple_walk(&grid, &targeted)
            && targeted.last() == Some(&35),
        detail: format!(
            "budget 50: untargeted {} nodes, targeted {} nodes",
            untargeted.len(),
            targeted.len()
        ),
    });

    results
}

// ── 3. Missions ─────────────────────────────────────────────────────────

fn validate_missions(options: &Options) -> Vec<TestResult> {
    println!("--- Missions ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let map = generate_map(
        Theme::Ocean,
        Size::new(1200.0, 800.0),
        &options.config.generator,
        &mut rng,
    );
    let last = map.last_route_index().unwrap_or(0);
    let tuning = &options.config.missions;

    let mut kinds = [0usize; 4];
    let mut bad = Vec::new();
    for i in 0..400u32 {
        let index = (i as usize) % (last + 1);
        let mission = generate_mission(
            Theme::Ocean,
            &map,
            index,
            tuning,
            i,
            chrono::Utc::now(),
            &mut rng,
        );
        let ok = match &mission.objective {
            MissionObjective::VisitZone { zone_name } => {
                kinds[0] += 1;
                map.zones.iter().any(|z| z.name() == zone_name)
            }
            MissionObjective::ScanItems { count } => {
                kinds[1] += 1;
                *count >= 1
            }
            MissionObjective::ReachNode { route_index } => {
                kinds[2] += 1;
                *route_index > index && *route_index <= last
            }
            MissionObjective::TravelNodes { count } => {
                kinds[3] += 1;
                *count >= 1
            }
        };
        if !ok || mission.target < 1 || mission.progress != 0 {
            bad.push(mission.id);
        }
    }

    results.push(TestResult {
        name: "mission_objectives_valid".into(),
        passed: bad.is_empty(),
        detail: format!("{} invalid of 400", bad.len()),
    });
    results.push(TestResult {
        name: "mission_kind_mix".into(),
        passed: kinds.iter().all(|k| *k > 0),
        detail: format!(
            "zone {} / scan {} / reach {} / travel {}",
            kinds[0], kinds[1], kinds[2], kinds[3]
        ),
    });

    results
}

// ── 4. Discoveries ──────────────────────────────────────────────────────

fn validate_discoveries(options: &Options) -> Vec<TestResult> {
    println!("--- Discoveries ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(options.seed);
    let now = chrono::Utc::now();

    let samples = 10_000;
    let mut counts = [0usize; 4];
    let mut out_of_range = 0;
    for i in 0..samples {
        let theme = Theme::ALL[i % 4];
        let d = generate_discovery(theme, ObjectKind::Node, "⭐", None, now, &mut rng);
        if !(1..=100).contains(&d.energy_level) {
            out_of_range += 1;
        }
        counts[d.rarity as usize - 1] += 1;
    }

    results.push(TestResult {
        name: "discovery_energy_bounds".into(),
        passed: out_of_range == 0,
        detail: format!("{} of {} outside 1..=100", out_of_range, samples),
    });

    // Observed share within five points of the weight for every rarity.
    let within = Rarity::ALL.iter().zip(counts.iter()).all(|(rarity, count)| {
        let share = *count as f32 * 100.0 / samples as f32;
        (share - rarity.weight() as f32).abs() < 5.0
    });
    results.push(TestResult {
        name: "discovery_rarity_distribution".into(),
        passed: within,
        detail: format!(
            "common {} / uncommon {} / rare {} / legendary {}",
            counts[0], counts[1], counts[2], counts[3]
        ),
    });

    results
}

// ── 5. Engine ───────────────────────────────────────────────────────────

fn validate_engine(options: &Options) -> Vec<TestResult> {
    println!("--- Engine ---");
    let mut results = Vec::new();

    let mut engine = match AdventureEngine::with_parts(
        options.config.clone(),
        MemoryStore::new(),
        RecordingAudio::new(),
        StdRng::seed_from_u64(options.seed),
    ) {
        Ok(engine) => engine,
        Err(e) => {
            results.push(TestResult {
                name: "engine_config".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    engine.select_theme(Theme::Forest);
    engine.start();

    let mut max_events = 0;
    let mut arrivals = 0;
    let mut scans = 0;
    let step = Duration::from_millis(100);
    for _ in 0..6000 {
        match engine.mission() {
            MissionState::Available(_) => engine.accept_mission(),
            MissionState::Celebrating(_) => engine.dismiss_mission_celebration(),
            _ => {}
        }
        match engine.scanner() {
            ScannerState::Idle => {
                let target = engine.agent_position();
                engine.scan_at(
                    Point::new(target.x + 5.0, target.y),
                    ObjectKind::Zone,
                    "🌿",
                    None,
                );
                scans += 1;
            }
            ScannerState::ShowingResult(_) => engine.dismiss_discovery_result(),
            ScannerState::Scanning(_) => {}
        }
        if engine.state() == EngineState::Arrived {
            arrivals += 1;
            engine.start();
        }
        engine.advance(step);
        max_events = max_events.max(engine.active_events().len());
    }

    results.push(TestResult {
        name: "engine_reaches_destination".into(),
        passed: arrivals > 0,
        detail: format!("{} arrivals in 10 simulated minutes", arrivals),
    });
    results.push(TestResult {
        name: "engine_missions_complete".into(),
        passed: !engine.completed_missions().is_empty(),
        detail: format!("{} missions completed", engine.completed_missions().len()),
    });
    results.push(TestResult {
        name: "engine_event_cap".into(),
        passed: max_events <= options.config.max_active_events,
        detail: format!("at most {} live map events", max_events),
    });
    results.push(TestResult {
        name: "engine_scans_collected".into(),
        passed: engine.discoveries().len() + 1 >= scans && !engine.discoveries().is_empty(),
        detail: format!("{} scans, {} discoveries", scans, engine.discoveries().len()),
    });
    let audio = engine.audio();
    results.push(TestResult {
        name: "engine_audio_requests".into(),
        passed: audio.played(SFX_SCAN) && audio.played(SFX_DISCOVERY),
        detail: format!("{} audio requests", audio.log.len()),
    });

    let saved = engine.store().discoveries().len();
    results.push(TestResult {
        name: "engine_discoveries_saved".into(),
        passed: saved == engine.discoveries().len(),
        detail: format!("{} discoveries in store", saved),
    });

    results
}

// ── 6. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(options: &Options) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let mut results = Vec::new();
    let path = std::env::temp_dir().join(format!("trailmap-simtest-{}.bin", std::process::id()));

    let mut rng = StdRng::seed_from_u64(options.seed);
    let now = chrono::Utc::now();
    let original: Vec<_> = (0..50)
        .map(|i| {
            generate_discovery(
                Theme::ALL[i % 4],
                ObjectKind::Decoration,
                "🧊",
                Some("Glacier"),
                now,
                &mut rng,
            )
        })
        .collect();

    let mut store = FileStore::new(&path);
    let outcome = store.save(&original).and_then(|_| store.load());
    let passed = matches!(&outcome, Ok(loaded) if *loaded == original);
    results.push(TestResult {
        name: "persistence_roundtrip".into(),
        passed,
        detail: match outcome {
            Ok(loaded) => format!("{} discoveries reloaded", loaded.len()),
            Err(e) => format!("error: {}", e),
        },
    });
    let _ = std::fs::remove_file(&path);

    let mut missing = FileStore::new(path.with_extension("missing"));
    results.push(TestResult {
        name: "persistence_missing_file".into(),
        passed: matches!(missing.load(), Ok(v) if v.is_empty()),
        detail: "missing save loads as an empty collection".into(),
    });

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults_and_flags() {
        let cli = Cli::try_parse_from(["trailmap-simtest"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(cli.seed, 1);
        assert!(cli.config.is_none());

        let cli = Cli::try_parse_from([
            "trailmap-simtest",
            "--verbose",
            "--seed",
            "7",
            "--config",
            "engine.json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.config, Some(PathBuf::from("engine.json")));
    }

    #[test]
    fn test_cli_rejects_bad_seed() {
        assert!(Cli::try_parse_from(["trailmap-simtest", "--seed", "many"]).is_err());
        assert!(Cli::try_parse_from(["trailmap-simtest", "--colour"]).is_err());
    }
}
