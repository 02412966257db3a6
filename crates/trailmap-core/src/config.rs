//! Engine configuration - tick rate, travel speed and every timer delay.
//!
//! Defaults match the intended game feel; JSON overrides may be partial.
//!
//! ```json
//! { "tick_hz": 30, "base_speed": 120.0, "generator": { "node_rows": 2 } }
//! ```

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use trailmap_logic::config::{FloatRange, GeneratorConfig};
use trailmap_logic::geometry::Size;
use trailmap_logic::mission::MissionTuning;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Travel ticks per simulated second.
    pub tick_hz: u32,
    /// Agent speed in canvas points per second.
    pub base_speed: f32,
    /// Speed multiplier while the fast toggle is on.
    pub fast_multiplier: f32,
    /// Segments shorter than this are snapped across in one tick.
    pub min_segment_length: f32,
    /// Canvas used until the input layer reports a real size.
    pub canvas: Size,

    /// Delay between a scan tap and the discovery reveal.
    pub scan_reveal_secs: f32,

    /// First mission offer after travel starts.
    pub mission_first_delay: FloatRange,
    /// How long an offer stays up before fading.
    pub mission_display_secs: f32,
    /// Next offer after one faded unaccepted.
    pub mission_retry_delay: FloatRange,
    /// Next offer after a celebration is dismissed.
    pub mission_next_delay: FloatRange,
    pub missions: MissionTuning,

    pub event_spawn_interval: FloatRange,
    pub event_lifetime_secs: f32,
    pub max_active_events: usize,

    pub generator: GeneratorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            base_speed: 80.0,
            fast_multiplier: 2.0,
            min_segment_length: 1.0,
            canvas: Size::new(1200.0, 800.0),
            scan_reveal_secs: 1.5,
            mission_first_delay: FloatRange::new(15.0, 30.0),
            mission_display_secs: 30.0,
            mission_retry_delay: FloatRange::new(30.0, 60.0),
            mission_next_delay: FloatRange::new(20.0, 40.0),
            missions: MissionTuning::default(),
            event_spawn_interval: FloatRange::new(8.0, 15.0),
            event_lifetime_secs: 12.0,
            max_active_events: 3,
            generator: GeneratorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_hz == 0 {
            return Err(ConfigError::Invalid("tick_hz must be positive".into()));
        }
        if !(self.base_speed > 0.0) || !(self.fast_multiplier > 0.0) {
            return Err(ConfigError::Invalid(
                "base_speed and fast_multiplier must be positive".into(),
            ));
        }
        if self.scan_reveal_secs < 0.0 || self.event_lifetime_secs < 0.0 {
            return Err(ConfigError::Invalid("delays must not be negative".into()));
        }
        if !(self.mission_display_secs > 0.0) {
            return Err(ConfigError::Invalid(
                "mission_display_secs must be positive".into(),
            ));
        }
        for (name, range) in [
            ("mission_first_delay", self.mission_first_delay),
            ("mission_retry_delay", self.mission_retry_delay),
            ("mission_next_delay", self.mission_next_delay),
            ("event_spawn_interval", self.event_spawn_interval),
        ] {
            if !(range.min > 0.0) || range.max < range.min {
                return Err(ConfigError::Invalid(format!(
                    "{} must satisfy 0 < min <= max (got {}..{})",
                    name, range.min, range.max
                )));
            }
        }
        let g = &self.generator;
        if g.zone_rows == 0 || g.zone_cols == 0 || g.node_rows == 0 || g.node_cols == 0 {
            return Err(ConfigError::Invalid(
                "generator zone and node grids need at least one row and column".into(),
            ));
        }
        if g.max_nodes() == 0 {
            return Err(ConfigError::Invalid(
                "generator.nodes_per_cell must allow at least one node".into(),
            ));
        }
        Ok(())
    }

    /// Simulated time between travel ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz.max(1) as f64)
    }

    /// Distance covered in one tick.
    pub fn speed_per_tick(&self, fast: bool) -> f32 {
        let speed = if fast {
            self.base_speed * self.fast_multiplier
        } else {
            self.base_speed
        };
        speed / self.tick_hz.max(1) as f32
    }
}

/// Seconds → `Duration`, clamping negatives and NaN to zero.
pub fn secs(value: f32) -> Duration {
    if value > 0.0 {
        Duration::from_secs_f32(value)
    } else {
        Duration::ZERO
    }
}

/// Uniform delay drawn from a range of seconds.
pub fn sample_delay(range: &FloatRange, rng: &mut impl Rng) -> Duration {
    secs(range.sample(rng))
}
