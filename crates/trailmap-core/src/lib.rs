//! Trailmap Core - Adventure Simulation Engine
//!
//! Drives one child-friendly map adventure: an agent travels a generated
//! route while missions come and go on timers and the player scans map
//! objects to collect discoveries.
//!
//! # Architecture
//!
//! - [`state`]: one plain struct holding everything the simulation owns
//! - [`transition`]: a pure `apply(state, input, ctx) -> effects` function
//! - [`scheduler`]: keyed one-shot timers on a simulated clock
//! - [`engine`]: the driver that owns the clock and carries out effects
//! - [`persistence`] and [`audio`]: the I/O boundaries, behind traits
//!
//! # Example
//!
//! ```rust,no_run
//! use trailmap_core::prelude::*;
//!
//! let mut engine = AdventureEngine::new();
//! engine.select_theme(Theme::Forest);
//! engine.start();
//!
//! loop {
//!     engine.advance_secs(1.0 / 60.0);
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod scheduler;
pub mod state;
pub mod transition;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::audio::{AudioSink, NullAudio, RecordingAudio};
    pub use crate::config::EngineConfig;
    pub use crate::engine::AdventureEngine;
    pub use crate::error::{ConfigError, PersistenceError};
    pub use crate::persistence::{DiscoveryStore, FileStore, MemoryStore};
    pub use crate::state::{EngineState, ScannerState};
    pub use crate::transition::{DomainEvent, TimerKind};
    pub use trailmap_logic::discovery::ObjectKind;
    pub use trailmap_logic::geometry::{Point, Size};
    pub use trailmap_logic::mission::MissionState;
    pub use trailmap_logic::theme::Theme;
}
