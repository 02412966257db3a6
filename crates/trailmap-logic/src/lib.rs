//! Pure adventure-map logic for trailmap.
//!
//! This crate contains all generation and rule logic that is independent of
//! clocks, storage, audio or rendering. Functions take plain data plus an
//! injected random source and return results, making them unit-testable and
//! deterministic under a seeded rng.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Generator tunables and sampling ranges |
//! | [`discovery`] | Discovery records, rarity roll, flavor text |
//! | [`events`] | Ambient map events shown while travelling |
//! | [`geometry`] | Point / size / rect primitives |
//! | [`map`] | Map data model (nodes, paths, zones, route) |
//! | [`mapgen`] | Zone, node, path and route generation |
//! | [`mission`] | Mission objectives, progress rules, generation |
//! | [`route`] | Adjacency graph, BFS, longest simple path search |
//! | [`theme`] | Theme palettes and vocabularies |

pub mod config;
pub mod discovery;
pub mod events;
pub mod geometry;
pub mod map;
pub mod mapgen;
pub mod mission;
pub mod route;
pub mod theme;
