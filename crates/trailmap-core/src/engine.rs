//! Adventure engine - main entry point for running an adventure.
//!
//! The engine owns the simulated clock, the timer scheduler, the random
//! source and the I/O boundaries (discovery store, audio sink). Every input
//! goes through [`transition::apply`]; the engine only carries out the
//! returned effects.
//!
//! Time only moves through [`AdventureEngine::advance`]. Travel ticks and due
//! timers are interleaved in time order, timers first when both fall on the
//! same instant.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use trailmap_logic::discovery::{Discovery, ObjectKind};
use trailmap_logic::events::MapEvent;
use trailmap_logic::geometry::{Point, Size};
use trailmap_logic::map::Map;
use trailmap_logic::mission::{Mission, MissionState};
use trailmap_logic::theme::Theme;

use crate::audio::{AudioSink, NullAudio};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::persistence::{DiscoveryStore, MemoryStore};
use crate::scheduler::Scheduler;
use crate::state::{AdventureState, EngineState, ScannerState};
use crate::transition::{self, DomainEvent, Effect, Input, TimerKind, TransitionContext};

/// Main adventure engine
pub struct AdventureEngine<S: DiscoveryStore = MemoryStore, A: AudioSink = NullAudio> {
    state: AdventureState,
    config: EngineConfig,
    scheduler: Scheduler<TimerKind>,
    rng: StdRng,
    /// Simulated time since construction.
    clock: Duration,
    /// Next travel tick, set only while travelling.
    next_tick: Option<Duration>,
    epoch: DateTime<Utc>,
    store: S,
    audio: A,
    outbox: Vec<DomainEvent>,
}

impl AdventureEngine {
    /// Engine with default config, in-memory storage and no audio.
    pub fn new() -> Self {
        Self::assemble(
            EngineConfig::default(),
            MemoryStore::new(),
            NullAudio,
            StdRng::from_entropy(),
        )
    }

    /// Deterministic engine for tests and headless runs.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        let engine =
            Self::with_parts(config, MemoryStore::new(), NullAudio, StdRng::seed_from_u64(seed))?;
        Ok(engine.with_epoch(DateTime::<Utc>::default()))
    }
}

impl Default for AdventureEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DiscoveryStore, A: AudioSink> AdventureEngine<S, A> {
    /// Build an engine and load the saved discovery collection.
    ///
    /// The config is validated first. A store that cannot be read is treated
    /// as empty.
    pub fn with_parts(
        config: EngineConfig,
        store: S,
        audio: A,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config, store, audio, rng))
    }

    fn assemble(config: EngineConfig, mut store: S, audio: A, rng: StdRng) -> Self {
        let discoveries = match store.load() {
            Ok(discoveries) => discoveries,
            Err(e) => {
                warn!("could not load saved discoveries, starting empty: {}", e);
                Vec::new()
            }
        };
        debug!("loaded {} saved discoveries", discoveries.len());

        Self {
            state: AdventureState::new(config.canvas, discoveries),
            config,
            scheduler: Scheduler::new(),
            rng,
            clock: Duration::ZERO,
            next_tick: None,
            epoch: Utc::now(),
            store,
            audio,
            outbox: Vec::new(),
        }
    }

    /// Set the wall-clock instant that simulated time zero maps to.
    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = epoch;
        self
    }

    // ── Input layer ──────────────────────────────────────────────────────

    pub fn select_theme(&mut self, theme: Theme) {
        self.dispatch(Input::SelectTheme(theme));
    }

    pub fn generate_new_map(&mut self) {
        self.dispatch(Input::GenerateNewMap);
    }

    pub fn set_canvas_size(&mut self, size: Size) {
        self.dispatch(Input::SetCanvasSize(size));
    }

    pub fn start(&mut self) {
        self.dispatch(Input::Start);
    }

    pub fn pause(&mut self) {
        self.dispatch(Input::Pause);
    }

    pub fn toggle_speed(&mut self) {
        self.dispatch(Input::ToggleSpeed);
    }

    /// Scan a map object the input layer hit-tested.
    pub fn scan_at(
        &mut self,
        position: Point,
        kind: ObjectKind,
        icon: &str,
        zone_name: Option<&str>,
    ) {
        self.dispatch(Input::ScanAt {
            position,
            kind,
            icon: icon.to_string(),
            zone_name: zone_name.map(str::to_string),
        });
    }

    pub fn dismiss_discovery_result(&mut self) {
        self.dispatch(Input::DismissDiscoveryResult);
    }

    pub fn accept_mission(&mut self) {
        self.dispatch(Input::AcceptMission);
    }

    pub fn dismiss_mission_celebration(&mut self) {
        self.dispatch(Input::DismissMissionCelebration);
    }

    pub fn play_action_sound(&mut self, index: usize) {
        self.dispatch(Input::PlayActionSound(index));
    }

    pub fn return_to_theme_selection(&mut self) {
        self.dispatch(Input::ReturnToThemeSelection);
    }

    pub fn clear_discoveries(&mut self) {
        self.dispatch(Input::ClearDiscoveries);
    }

    // ── Clock ────────────────────────────────────────────────────────────

    /// Advance simulated time by `dt`, running every tick and timer due
    /// on the way.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.clock + dt;
        loop {
            let timer_at = self.scheduler.next_due().filter(|t| *t <= target);
            let tick_at = self.next_tick.filter(|t| *t <= target);
            match (timer_at, tick_at) {
                (None, None) => break,
                (Some(t), Some(k)) if k < t => self.run_tick(k),
                (None, Some(k)) => self.run_tick(k),
                (Some(t), _) => self.run_timer(t),
            }
        }
        self.clock = target;
    }

    /// Convenience wrapper over [`Self::advance`] in seconds.
    pub fn advance_secs(&mut self, secs: f32) {
        self.advance(crate::config::secs(secs));
    }

    fn run_tick(&mut self, at: Duration) {
        self.clock = at;
        self.next_tick = Some(at + self.config.tick_interval());
        self.dispatch(Input::Tick);
    }

    fn run_timer(&mut self, at: Duration) {
        self.clock = self.clock.max(at);
        if let Some(timer) = self.scheduler.pop_due(self.clock) {
            self.dispatch(Input::Timer(timer));
        }
    }

    // ── Effects ──────────────────────────────────────────────────────────

    fn dispatch(&mut self, input: Input) {
        let effects = {
            let mut ctx = TransitionContext {
                config: &self.config,
                rng: &mut self.rng,
                now: self.clock,
                epoch: self.epoch,
            };
            transition::apply(&mut self.state, input, &mut ctx)
        };
        for effect in effects {
            self.run_effect(effect);
        }
        self.sync_ticker();
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Schedule { timer, after } => self.scheduler.schedule(timer, self.clock + after),
            Effect::Cancel(timer) => {
                self.scheduler.cancel(timer);
            }
            Effect::Audio(request) => request.dispatch(&mut self.audio),
            Effect::PersistDiscoveries => {
                if let Err(e) = self.store.save(&self.state.discoveries) {
                    warn!("failed to save discoveries: {}", e);
                }
            }
            Effect::Emit(event) => self.outbox.push(event),
        }
    }

    /// Ticks run exactly while travelling.
    fn sync_ticker(&mut self) {
        if !self.state.is_traveling() {
            self.next_tick = None;
        } else if self.next_tick.is_none() {
            self.next_tick = Some(self.clock + self.config.tick_interval());
        }
    }

    // ── Rendering layer ──────────────────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.state.engine
    }

    /// Full state snapshot.
    pub fn adventure(&self) -> &AdventureState {
        &self.state
    }

    pub fn theme(&self) -> Option<Theme> {
        self.state.theme
    }

    pub fn map(&self) -> Option<&Map> {
        self.state.map.as_ref()
    }

    pub fn agent_position(&self) -> Point {
        self.state.position
    }

    pub fn route_index(&self) -> usize {
        self.state.route_index
    }

    pub fn is_fast(&self) -> bool {
        self.state.fast
    }

    pub fn active_events(&self) -> &[MapEvent] {
        self.state.events.active()
    }

    pub fn scanner(&self) -> &ScannerState {
        &self.state.scanner
    }

    pub fn mission(&self) -> &MissionState {
        &self.state.mission
    }

    pub fn completed_missions(&self) -> &[Mission] {
        &self.state.completed_missions
    }

    pub fn discoveries(&self) -> &[Discovery] {
        &self.state.discoveries
    }

    /// Take every domain event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Absolute fire time of a pending timer.
    pub fn timer_due(&self, timer: TimerKind) -> Option<Duration> {
        self.scheduler.fire_time(timer)
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioRequest, RecordingAudio};
    use trailmap_logic::config::FloatRange;

    fn engine(seed: u64) -> AdventureEngine {
        AdventureEngine::with_seed(EngineConfig::default(), seed).unwrap()
    }

    #[test]
    fn test_new_engine_is_idle() {
        let mut engine = engine(1);
        assert_eq!(engine.state(), EngineState::SelectingTheme);
        assert!(engine.map().is_none());
        engine.advance_secs(100.0);
        assert_eq!(engine.clock(), Duration::from_secs(100));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_ticks_only_while_traveling() {
        let mut engine = engine(2);
        engine.select_theme(Theme::Forest);
        let start = engine.agent_position();
        engine.advance_secs(1.0);
        assert_eq!(engine.agent_position(), start);

        engine.start();
        engine.advance_secs(1.0);
        assert_ne!(engine.agent_position(), start);

        engine.pause();
        let paused_at = engine.agent_position();
        engine.advance_secs(5.0);
        assert_eq!(engine.agent_position(), paused_at);
    }

    #[test]
    fn test_schedule_is_relative_to_clock() {
        let mut engine = engine(3);
        engine.select_theme(Theme::Ocean);
        engine.advance_secs(10.0);
        engine.start();
        let due = engine.timer_due(TimerKind::MissionAppear).unwrap();
        assert!(due >= Duration::from_secs(25) && due <= Duration::from_secs(40));
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        struct BrokenStore;
        impl DiscoveryStore for BrokenStore {
            fn load(&mut self) -> Result<Vec<Discovery>, crate::error::PersistenceError> {
                Err(crate::error::PersistenceError::VersionMismatch { expected: 1, found: 0 })
            }
            fn save(&mut self, _: &[Discovery]) -> Result<(), crate::error::PersistenceError> {
                Err(crate::error::PersistenceError::VersionMismatch { expected: 1, found: 0 })
            }
        }

        let mut engine = AdventureEngine::with_parts(
            EngineConfig::default(),
            BrokenStore,
            NullAudio,
            StdRng::seed_from_u64(4),
        )
        .unwrap();
        assert!(engine.discoveries().is_empty());
        engine.select_theme(Theme::Space);
        engine.scan_at(Point::new(5.0, 5.0), ObjectKind::Zone, "🪐", None);
        engine.advance_secs(2.0);
        assert_eq!(engine.discoveries().len(), 1);
    }

    #[test]
    fn test_audio_requests_reach_sink() {
        let mut engine = AdventureEngine::with_parts(
            EngineConfig::default(),
            MemoryStore::new(),
            RecordingAudio::new(),
            StdRng::seed_from_u64(5),
        )
        .unwrap();
        engine.select_theme(Theme::Arctic);
        engine.start();
        engine.return_to_theme_selection();
        let log = &engine.audio().log;
        assert_eq!(log.first(), Some(&AudioRequest::PlayMusic(Theme::Arctic)));
        assert_eq!(log.last(), Some(&AudioRequest::StopAll));
        assert!(engine.audio().played(crate::audio::SFX_START));
    }

    #[test]
    fn test_rejects_config_that_would_stall_the_clock() {
        let config = EngineConfig {
            event_spawn_interval: FloatRange::new(0.0, 0.0),
            ..EngineConfig::default()
        };
        let err = AdventureEngine::with_seed(config.clone(), 1).err().unwrap();
        assert!(err.to_string().contains("event_spawn_interval"));

        let err = AdventureEngine::with_parts(
            config,
            MemoryStore::new(),
            NullAudio,
            StdRng::seed_from_u64(1),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_advance_terminates_with_shortest_valid_delays() {
        let config = EngineConfig {
            event_spawn_interval: FloatRange::new(0.001, 0.001),
            mission_first_delay: FloatRange::new(0.001, 0.001),
            mission_retry_delay: FloatRange::new(0.001, 0.001),
            mission_display_secs: 0.001,
            ..EngineConfig::default()
        };
        let mut engine = AdventureEngine::with_seed(config, 2).unwrap();
        engine.select_theme(Theme::Forest);
        let start = engine.agent_position();
        engine.start();
        engine.advance_secs(1.0);
        assert_eq!(engine.clock(), Duration::from_secs(1));
        assert_ne!(engine.agent_position(), start);
    }
}
