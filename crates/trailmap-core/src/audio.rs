//! Audio boundary.
//!
//! The engine only emits fire-and-forget requests; the host decides how to
//! play them. Nothing ever reports back, so a sink that drops everything is a
//! valid implementation.

use serde::{Deserialize, Serialize};
use trailmap_logic::theme::Theme;

// Effect names the engine emits on its own.
pub const SFX_START: &str = "start";
pub const SFX_ARRIVE: &str = "arrive";
pub const SFX_SCAN: &str = "scan";
pub const SFX_DISCOVERY: &str = "discovery";
pub const SFX_MISSION_APPEAR: &str = "mission_appear";
pub const SFX_MISSION_COMPLETE: &str = "mission_complete";

/// Receives audio requests from the engine.
pub trait AudioSink {
    /// Start (or switch to) the theme's background loop.
    fn play_music(&mut self, theme: Theme);
    /// Play a one-shot effect by name.
    fn play_effect(&mut self, name: &str);
    fn stop_all(&mut self);
}

/// A single audio request produced by a state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioRequest {
    PlayMusic(Theme),
    PlayEffect(String),
    StopAll,
}

impl AudioRequest {
    pub fn effect(name: &str) -> Self {
        Self::PlayEffect(name.to_string())
    }

    /// Forward this request to a sink.
    pub fn dispatch(&self, sink: &mut impl AudioSink) {
        match self {
            Self::PlayMusic(theme) => sink.play_music(*theme),
            Self::PlayEffect(name) => sink.play_effect(name),
            Self::StopAll => sink.stop_all(),
        }
    }
}

/// Discards every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_music(&mut self, _theme: Theme) {}
    fn play_effect(&mut self, _name: &str) {}
    fn stop_all(&mut self) {}
}

/// Keeps every request in order. Used by tests and the simtest harness.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub log: Vec<AudioRequest>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> impl Iterator<Item = &str> {
        self.log.iter().filter_map(|r| match r {
            AudioRequest::PlayEffect(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn played(&self, name: &str) -> bool {
        self.effects().any(|e| e == name)
    }
}

impl AudioSink for RecordingAudio {
    fn play_music(&mut self, theme: Theme) {
        self.log.push(AudioRequest::PlayMusic(theme));
    }

    fn play_effect(&mut self, name: &str) {
        self.log.push(AudioRequest::effect(name));
    }

    fn stop_all(&mut self) {
        self.log.push(AudioRequest::StopAll);
    }
}
