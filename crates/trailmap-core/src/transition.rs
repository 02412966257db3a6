//! The adventure state machine as a pure transition function.
//!
//! [`apply`] takes the current [`AdventureState`], one [`Input`] and a
//! [`TransitionContext`] (config, random source, simulated clock) and returns
//! the [`Effect`]s the driver must carry out: timers to arm or disarm, audio
//! requests, a save of the discovery collection, and domain events for the
//! presentation layer. It performs no I/O and never reads a real clock.
//!
//! Invalid actions are ignored and logged at debug level.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use trailmap_logic::discovery::{generate_discovery, ObjectKind};
use trailmap_logic::geometry::{Point, Size};
use trailmap_logic::mapgen::generate_map;
use trailmap_logic::mission::{generate_mission, MissionState, ProgressEvent};
use trailmap_logic::theme::Theme;
use uuid::Uuid;

use crate::audio::{
    AudioRequest, SFX_ARRIVE, SFX_DISCOVERY, SFX_MISSION_APPEAR, SFX_MISSION_COMPLETE, SFX_SCAN,
    SFX_START,
};
use crate::config::{sample_delay, secs, EngineConfig};
use crate::state::{AdventureState, EngineState, PendingScan, ScannerState};

// ============================================================================
// INPUTS, TIMERS, EFFECTS
// ============================================================================

/// Everything that can drive the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    SelectTheme(Theme),
    GenerateNewMap,
    SetCanvasSize(Size),
    Start,
    Pause,
    ToggleSpeed,
    /// One fixed travel step.
    Tick,
    /// A tap that hit a map object. Hit-testing happens outside the engine.
    ScanAt {
        position: Point,
        kind: ObjectKind,
        icon: String,
        zone_name: Option<String>,
    },
    DismissDiscoveryResult,
    AcceptMission,
    DismissMissionCelebration,
    PlayActionSound(usize),
    ReturnToThemeSelection,
    ClearDiscoveries,
    /// A scheduled timer came due.
    Timer(TimerKind),
}

/// Keys for the one-shot timers the engine schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    MissionAppear,
    MissionFade,
    ScanReveal,
    EventSpawn,
    EventDespawn(u32),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Arm `timer` to fire `after` from now, replacing any pending one.
    Schedule { timer: TimerKind, after: Duration },
    Cancel(TimerKind),
    Audio(AudioRequest),
    /// Write the discovery collection to the store.
    PersistDiscoveries,
    Emit(DomainEvent),
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    ThemeSelected(Theme),
    MapGenerated { nodes: usize, route_len: usize },
    TravelStarted,
    TravelPaused,
    NodeReached { route_index: usize, node_id: u32 },
    Arrived,
    MissionAppeared(u32),
    MissionFaded(u32),
    MissionAccepted(u32),
    MissionProgressed { id: u32, progress: i32, target: i32 },
    MissionCompleted(u32),
    MissionDismissed(u32),
    ScanStarted,
    DiscoveryMade(Uuid),
    DiscoveryDismissed,
    DiscoveriesCleared,
    EventSpawned(u32),
    EventDespawned(u32),
    ReturnedToThemeSelection,
}

/// What a transition may read besides the state itself.
pub struct TransitionContext<'a, R: Rng> {
    pub config: &'a EngineConfig,
    pub rng: &'a mut R,
    /// Simulated time since the engine started.
    pub now: Duration,
    /// Wall-clock instant corresponding to `now == 0`.
    pub epoch: DateTime<Utc>,
}

impl<'a, R: Rng> TransitionContext<'a, R> {
    /// Wall-clock timestamp for records created now.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.epoch + chrono::Duration::milliseconds(self.now.as_millis() as i64)
    }
}

// ============================================================================
// APPLY
// ============================================================================

/// Apply one input. Returns the effects to carry out, in order.
pub fn apply<R: Rng>(
    state: &mut AdventureState,
    input: Input,
    ctx: &mut TransitionContext<'_, R>,
) -> Vec<Effect> {
    let mut fx = Vec::new();
    match input {
        Input::SelectTheme(theme) => select_theme(state, theme, ctx, &mut fx),
        Input::GenerateNewMap => generate_new_map(state, ctx, &mut fx),
        Input::SetCanvasSize(size) => set_canvas_size(state, size, ctx, &mut fx),
        Input::Start => start(state, ctx, &mut fx),
        Input::Pause => pause(state, &mut fx),
        Input::ToggleSpeed => {
            state.fast = !state.fast;
            debug!("speed toggled, fast={}", state.fast);
        }
        Input::Tick => tick(state, ctx, &mut fx),
        Input::ScanAt {
            position,
            kind,
            icon,
            zone_name,
        } => scan_at(state, position, kind, icon, zone_name, ctx, &mut fx),
        Input::DismissDiscoveryResult => {
            if matches!(state.scanner, ScannerState::ShowingResult(_)) {
                state.scanner = ScannerState::Idle;
                fx.push(Effect::Emit(DomainEvent::DiscoveryDismissed));
            } else {
                ignored("dismiss_discovery_result", state);
            }
        }
        Input::AcceptMission => accept_mission(state, &mut fx),
        Input::DismissMissionCelebration => dismiss_celebration(state, ctx, &mut fx),
        Input::PlayActionSound(index) => {
            let sound = state
                .theme
                .and_then(|t| t.palette().action_sounds.get(index).copied());
            match sound {
                Some(name) => fx.push(Effect::Audio(AudioRequest::effect(name))),
                None => ignored("play_action_sound", state),
            }
        }
        Input::ReturnToThemeSelection => return_to_theme_selection(state, &mut fx),
        Input::ClearDiscoveries => {
            state.discoveries.clear();
            fx.push(Effect::PersistDiscoveries);
            fx.push(Effect::Emit(DomainEvent::DiscoveriesCleared));
        }
        Input::Timer(timer) => fire_timer(state, timer, ctx, &mut fx),
    }
    fx
}

fn ignored(action: &str, state: &AdventureState) {
    debug!("ignored {} in state {}", action, state.engine.name());
}

// ── Theme and map ─────────────────────────────────────────────────────────

fn select_theme<R: Rng>(
    state: &mut AdventureState,
    theme: Theme,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    if state.engine != EngineState::SelectingTheme {
        ignored("select_theme", state);
        return;
    }
    info!("theme selected: {}", theme.name());
    state.theme = Some(theme);
    fx.push(Effect::Emit(DomainEvent::ThemeSelected(theme)));
    fx.push(Effect::Audio(AudioRequest::PlayMusic(theme)));
    regenerate(state, theme, ctx, fx);
}

fn generate_new_map<R: Rng>(
    state: &mut AdventureState,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    let Some(theme) = state.theme else {
        ignored("generate_new_map", state);
        return;
    };
    stop_mission_system(state, fx);
    clear_events(state, fx);
    regenerate(state, theme, ctx, fx);
}

fn set_canvas_size<R: Rng>(
    state: &mut AdventureState,
    size: Size,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    state.canvas = size;
    // A map generated before layout had a real size is empty; redo it.
    let needs_map = state.engine == EngineState::Ready
        && state.map.as_ref().map_or(true, |m| m.is_empty());
    if needs_map && !size.is_empty() {
        if let Some(theme) = state.theme {
            regenerate(state, theme, ctx, fx);
        }
    }
}

fn regenerate<R: Rng>(
    state: &mut AdventureState,
    theme: Theme,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    let map = generate_map(theme, state.canvas, &ctx.config.generator, &mut *ctx.rng);
    info!(
        "generated {} map: {} nodes, {} paths, route of {}",
        theme.name(),
        map.nodes.len(),
        map.paths.len(),
        map.route.len()
    );
    fx.push(Effect::Emit(DomainEvent::MapGenerated {
        nodes: map.nodes.len(),
        route_len: map.route.len(),
    }));
    state.map = Some(map);
    state.reset_travel();
    state.engine = EngineState::Ready;
}

// ── Travel ────────────────────────────────────────────────────────────────

fn start<R: Rng>(
    state: &mut AdventureState,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    let has_route = state.map.as_ref().map_or(false, |m| !m.route.is_empty());
    if !state.engine.can_start() || !has_route {
        ignored("start", state);
        return;
    }

    if state.engine != EngineState::Paused {
        state.reset_travel();
        if let Some(map) = state.map.as_mut() {
            if let Some(id) = map.route.first().copied() {
                if let Some(node) = map.node_mut(id) {
                    node.visited = true;
                }
            }
        }
    }

    state.engine = EngineState::Traveling;
    info!("travel started at route index {}", state.route_index);
    fx.push(Effect::Audio(AudioRequest::effect(SFX_START)));
    fx.push(Effect::Emit(DomainEvent::TravelStarted));
    fx.push(Effect::Schedule {
        timer: TimerKind::EventSpawn,
        after: sample_delay(&ctx.config.event_spawn_interval, &mut *ctx.rng),
    });
    if !state.mission_cycle {
        state.mission_cycle = true;
        fx.push(Effect::Schedule {
            timer: TimerKind::MissionAppear,
            after: sample_delay(&ctx.config.mission_first_delay, &mut *ctx.rng),
        });
    }
}

fn pause(state: &mut AdventureState, fx: &mut Vec<Effect>) {
    if !state.is_traveling() {
        ignored("pause", state);
        return;
    }
    state.engine = EngineState::Paused;
    fx.push(Effect::Cancel(TimerKind::EventSpawn));
    fx.push(Effect::Emit(DomainEvent::TravelPaused));
}

fn tick<R: Rng>(
    state: &mut AdventureState,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    if !state.is_traveling() {
        return;
    }
    let Some(map) = state.map.as_ref() else {
        return;
    };
    let (Some(from), Some(to)) = (
        map.route_position(state.route_index),
        map.route_position(state.route_index + 1),
    ) else {
        arrive(state, fx);
        return;
    };

    let distance = from.distance(&to);
    if distance < ctx.config.min_segment_length {
        reach_next_node(state, fx);
        return;
    }

    state.segment_progress += ctx.config.speed_per_tick(state.fast) / distance;
    if state.segment_progress >= 1.0 {
        reach_next_node(state, fx);
    } else {
        state.position = from.lerp(&to, state.segment_progress);
    }
}

/// Snap onto the next route node and fire the per-node side effects:
/// travel progress, then reach-node, then zone visit.
fn reach_next_node(state: &mut AdventureState, fx: &mut Vec<Effect>) {
    let next = state.route_index + 1;
    let Some(map) = state.map.as_mut() else {
        return;
    };
    let Some(node_id) = map.route.get(next).copied() else {
        return;
    };
    let Some(node) = map.node_mut(node_id) else {
        return;
    };
    node.visited = true;
    let position = node.position;
    let zone = map.zone_at(&position).map(|z| z.name().to_string());
    let arrived = map.last_route_index().map_or(true, |last| next >= last);

    state.position = position;
    state.route_index = next;
    state.segment_progress = 0.0;
    fx.push(Effect::Emit(DomainEvent::NodeReached {
        route_index: next,
        node_id,
    }));

    record_progress(state, ProgressEvent::NodeAdvanced, fx);
    record_progress(state, ProgressEvent::RouteIndexReached(next), fx);
    if let Some(zone) = zone.as_deref() {
        record_progress(state, ProgressEvent::ZoneVisited(zone), fx);
    }

    if arrived {
        arrive(state, fx);
    }
}

fn arrive(state: &mut AdventureState, fx: &mut Vec<Effect>) {
    info!("arrived after {} route steps", state.route_index);
    state.engine = EngineState::Arrived;
    state.segment_progress = 0.0;
    fx.push(Effect::Cancel(TimerKind::EventSpawn));
    fx.push(Effect::Audio(AudioRequest::effect(SFX_ARRIVE)));
    fx.push(Effect::Emit(DomainEvent::Arrived));
}

fn return_to_theme_selection(state: &mut AdventureState, fx: &mut Vec<Effect>) {
    if state.engine == EngineState::SelectingTheme {
        ignored("return_to_theme_selection", state);
        return;
    }
    stop_mission_system(state, fx);
    clear_events(state, fx);
    state.map = None;
    state.theme = None;
    state.reset_travel();
    state.engine = EngineState::SelectingTheme;
    fx.push(Effect::Audio(AudioRequest::StopAll));
    fx.push(Effect::Emit(DomainEvent::ReturnedToThemeSelection));
}

// ── Missions ──────────────────────────────────────────────────────────────

fn stop_mission_system(state: &mut AdventureState, fx: &mut Vec<Effect>) {
    fx.push(Effect::Cancel(TimerKind::MissionAppear));
    fx.push(Effect::Cancel(TimerKind::MissionFade));
    state.mission = MissionState::None;
    state.mission_cycle = false;
}

fn accept_mission(state: &mut AdventureState, fx: &mut Vec<Effect>) {
    let MissionState::Available(mission) = &state.mission else {
        ignored("accept_mission", state);
        return;
    };
    let mut mission = mission.clone();
    mission.accepted = true;
    let id = mission.id;
    state.mission = MissionState::Active(mission);
    fx.push(Effect::Cancel(TimerKind::MissionFade));
    fx.push(Effect::Emit(DomainEvent::MissionAccepted(id)));
}

fn dismiss_celebration<R: Rng>(
    state: &mut AdventureState,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    let MissionState::Celebrating(mission) = &state.mission else {
        ignored("dismiss_mission_celebration", state);
        return;
    };
    let id = mission.id;
    state.mission = MissionState::None;
    fx.push(Effect::Emit(DomainEvent::MissionDismissed(id)));
    fx.push(Effect::Schedule {
        timer: TimerKind::MissionAppear,
        after: sample_delay(&ctx.config.mission_next_delay, &mut *ctx.rng),
    });
}

/// Feed a progress event to the active mission, completing it if needed.
fn record_progress(state: &mut AdventureState, event: ProgressEvent<'_>, fx: &mut Vec<Effect>) {
    let MissionState::Active(mission) = &mut state.mission else {
        return;
    };
    if !mission.record(event) {
        return;
    }
    fx.push(Effect::Emit(DomainEvent::MissionProgressed {
        id: mission.id,
        progress: mission.progress,
        target: mission.target,
    }));
    if !mission.is_complete() {
        return;
    }

    if let MissionState::Active(done) = std::mem::take(&mut state.mission) {
        info!("mission {} complete: {}", done.id, done.objective.description());
        fx.push(Effect::Audio(AudioRequest::effect(SFX_MISSION_COMPLETE)));
        fx.push(Effect::Emit(DomainEvent::MissionCompleted(done.id)));
        state.completed_missions.push(done.clone());
        state.mission = MissionState::Celebrating(done);
    }
}

fn mission_appear<R: Rng>(
    state: &mut AdventureState,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    if !state.mission_cycle || !state.mission.is_none() {
        debug!("stale mission appearance dropped");
        return;
    }
    let (Some(theme), Some(map)) = (state.theme, state.map.as_ref()) else {
        return;
    };
    if !state.is_traveling() {
        // Offers only appear on the move; try again later.
        fx.push(Effect::Schedule {
            timer: TimerKind::MissionAppear,
            after: sample_delay(&ctx.config.mission_first_delay, &mut *ctx.rng),
        });
        return;
    }

    let timestamp = ctx.timestamp();
    let mission = generate_mission(
        theme,
        map,
        state.route_index,
        &ctx.config.missions,
        state.next_mission_id,
        timestamp,
        &mut *ctx.rng,
    );
    state.next_mission_id += 1;
    info!("mission {} offered: {}", mission.id, mission.objective.description());
    fx.push(Effect::Schedule {
        timer: TimerKind::MissionFade,
        after: secs(ctx.config.mission_display_secs),
    });
    fx.push(Effect::Audio(AudioRequest::effect(SFX_MISSION_APPEAR)));
    fx.push(Effect::Emit(DomainEvent::MissionAppeared(mission.id)));
    state.mission = MissionState::Available(mission);
}

fn mission_fade<R: Rng>(
    state: &mut AdventureState,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    let MissionState::Available(mission) = &state.mission else {
        return;
    };
    let id = mission.id;
    debug!("mission {} faded unaccepted", id);
    state.mission = MissionState::None;
    fx.push(Effect::Emit(DomainEvent::MissionFaded(id)));
    fx.push(Effect::Schedule {
        timer: TimerKind::MissionAppear,
        after: sample_delay(&ctx.config.mission_retry_delay, &mut *ctx.rng),
    });
}

// ── Scanner ───────────────────────────────────────────────────────────────

fn scan_at<R: Rng>(
    state: &mut AdventureState,
    position: Point,
    kind: ObjectKind,
    icon: String,
    zone_name: Option<String>,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    let theme = match (state.theme, &state.scanner, &state.map) {
        (Some(theme), ScannerState::Idle, Some(_)) => theme,
        _ => {
            ignored("scan_at", state);
            return;
        }
    };
    state.scanner = ScannerState::Scanning(PendingScan {
        position,
        kind,
        icon,
        zone_name,
        theme,
    });
    fx.push(Effect::Schedule {
        timer: TimerKind::ScanReveal,
        after: secs(ctx.config.scan_reveal_secs),
    });
    fx.push(Effect::Audio(AudioRequest::effect(SFX_SCAN)));
    fx.push(Effect::Emit(DomainEvent::ScanStarted));
}

fn scan_reveal<R: Rng>(
    state: &mut AdventureState,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    let ScannerState::Scanning(pending) = &state.scanner else {
        return;
    };
    let timestamp = ctx.timestamp();
    let discovery = generate_discovery(
        pending.theme,
        pending.kind,
        &pending.icon,
        pending.zone_name.as_deref(),
        timestamp,
        &mut *ctx.rng,
    );
    info!(
        "discovered {} ({}, {})",
        discovery.name,
        discovery.rarity.label(),
        discovery.object_kind.label()
    );

    state.discoveries.push(discovery.clone());
    fx.push(Effect::PersistDiscoveries);
    fx.push(Effect::Audio(AudioRequest::effect(SFX_DISCOVERY)));
    fx.push(Effect::Emit(DomainEvent::DiscoveryMade(discovery.id)));
    state.scanner = ScannerState::ShowingResult(discovery);
    record_progress(state, ProgressEvent::Scanned, fx);
}

// ── Map events ────────────────────────────────────────────────────────────

fn clear_events(state: &mut AdventureState, fx: &mut Vec<Effect>) {
    fx.push(Effect::Cancel(TimerKind::EventSpawn));
    for event in state.events.active() {
        fx.push(Effect::Cancel(TimerKind::EventDespawn(event.id)));
    }
    state.events.clear();
}

fn event_spawn<R: Rng>(
    state: &mut AdventureState,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    if !state.is_traveling() {
        return;
    }
    let (Some(theme), Some(map)) = (state.theme, state.map.as_ref()) else {
        return;
    };

    if state.events.len() < ctx.config.max_active_events {
        let now_secs = ctx.now.as_secs_f64();
        let spawned = state
            .events
            .spawn(theme.palette().events, map, state.route_index, now_secs, &mut *ctx.rng)
            .map(|e| e.id);
        if let Some(id) = spawned {
            fx.push(Effect::Schedule {
                timer: TimerKind::EventDespawn(id),
                after: secs(ctx.config.event_lifetime_secs),
            });
            fx.push(Effect::Emit(DomainEvent::EventSpawned(id)));
        }
    }
    fx.push(Effect::Schedule {
        timer: TimerKind::EventSpawn,
        after: sample_delay(&ctx.config.event_spawn_interval, &mut *ctx.rng),
    });
}

// ── Timers ────────────────────────────────────────────────────────────────

fn fire_timer<R: Rng>(
    state: &mut AdventureState,
    timer: TimerKind,
    ctx: &mut TransitionContext<'_, R>,
    fx: &mut Vec<Effect>,
) {
    debug!("timer fired: {:?}", timer);
    match timer {
        TimerKind::MissionAppear => mission_appear(state, ctx, fx),
        TimerKind::MissionFade => mission_fade(state, ctx, fx),
        TimerKind::ScanReveal => scan_reveal(state, ctx, fx),
        TimerKind::EventSpawn => event_spawn(state, ctx, fx),
        TimerKind::EventDespawn(id) => {
            if state.events.despawn(id) {
                fx.push(Effect::Emit(DomainEvent::EventDespawned(id)));
            }
        }
    }
}
