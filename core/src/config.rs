//! Tuning surface shared by the overworld and the mini-game.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{InputAction, Position, WorldId};

/// Aggregated tuning knobs for the overworld simulation.
///
/// Every field has a default so configuration files may specify any subset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of a collision tile in world pixels.
    pub tile_size: f32,
    /// Pixels the character travels per fixed step.
    pub move_speed: f32,
    /// Pixels the camera target leads the character along its heading.
    pub lookahead_distance: f32,
    /// Blend factor applied to the camera every fixed step.
    pub camera_smoothing: f32,
    /// Pixels a projectile travels per fixed step.
    pub bullet_speed: f32,
    /// Offset from the character origin at which projectiles spawn.
    pub bullet_offset: Position,
    /// Character geometry and screen mapping of the walkable scenes.
    pub overworld: SceneTuning,
    /// Character geometry and screen mapping of the shooting arena.
    pub arena: SceneTuning,
    /// Fixed steps simulated per second of real time.
    pub tick_rate: u32,
    /// Upper bound on fixed steps simulated for one host frame.
    pub max_steps_per_frame: u32,
    /// Key identifiers bound on top of the default bindings.
    pub keys: BTreeMap<String, InputAction>,
    /// Mini-game tuning.
    pub session: SessionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 16.0,
            move_speed: 1.0,
            lookahead_distance: 6.0,
            camera_smoothing: 0.1,
            bullet_speed: 2.0,
            bullet_offset: Position::new(16.0, 10.0),
            overworld: SceneTuning::default(),
            arena: SceneTuning::ARENA,
            tick_rate: 60,
            max_steps_per_frame: 5,
            keys: BTreeMap::new(),
            session: SessionConfig::default(),
        }
    }
}

impl GameConfig {
    /// Duration of one fixed simulation step.
    #[must_use]
    pub fn step_duration(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    /// Tuning that applies inside `scene`.
    #[must_use]
    pub fn tuning(&self, scene: WorldId) -> SceneTuning {
        match scene {
            WorldId::ColorBlast => self.arena,
            WorldId::City | WorldId::Beach | WorldId::Forest => self.overworld,
        }
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_size", self.tile_size)?;
        positive("move_speed", self.move_speed)?;
        positive("bullet_speed", self.bullet_speed)?;
        positive("overworld.pixel_scale", self.overworld.pixel_scale)?;
        positive("arena.pixel_scale", self.arena.pixel_scale)?;
        if !self.lookahead_distance.is_finite() || self.lookahead_distance < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "lookahead_distance",
                value: self.lookahead_distance,
            });
        }
        if !(self.camera_smoothing > 0.0 && self.camera_smoothing <= 1.0) {
            return Err(ConfigError::SmoothingOutOfRange(self.camera_smoothing));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.max_steps_per_frame == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }
        self.session.validate()
    }
}

/// Character geometry and screen mapping of one family of scenes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneTuning {
    /// Offset from the character origin to its ground-contact point.
    pub feet_offset: Position,
    /// Screen-space anchor, in world pixels, the camera is pinned to.
    pub camera_anchor: Position,
    /// Screen pixels per world pixel used by rendering hosts.
    pub pixel_scale: f32,
}

impl SceneTuning {
    /// Taller sprite, wider anchor and doubled zoom of the shooting arena.
    pub const ARENA: Self = Self {
        feet_offset: Position::new(16.0, 32.0),
        camera_anchor: Position::new(206.0, 32.0),
        pixel_scale: 4.0,
    };
}

impl Default for SceneTuning {
    fn default() -> Self {
        Self {
            feet_offset: Position::new(16.0, 20.0),
            camera_anchor: Position::new(66.0, 42.0),
            pixel_scale: 2.0,
        }
    }
}

/// Tuning for the obstacle-avoidance mini-game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Length of a full run in whole seconds.
    pub duration_secs: u32,
    /// Attempts granted when the session is created.
    pub initial_attempts: u32,
    /// Fraction of each visual edge trimmed from hit rectangles.
    pub hitbox_inset_ratio: f32,
    /// Jittered delay between obstacle spawns.
    pub spawn_delay: SpawnDelayConfig,
    /// Width of the play area in screen pixels.
    pub area_width: f32,
    /// Height of the play area in screen pixels.
    pub area_height: f32,
    /// Side length of the square player sprite in pixels.
    pub player_size: f32,
    /// Side length of the square obstacle sprite in pixels.
    pub obstacle_size: f32,
    /// Gap between the player's bottom edge and the play area's bottom edge.
    pub player_bottom_offset: f32,
    /// Percent of the play area height an obstacle falls per millisecond.
    pub fall_rate: f32,
    /// Percent of the play area width covered by one nudge.
    pub player_step_percent: f32,
    /// Largest frame delta honoured by advection, in milliseconds.
    pub max_frame_delta_ms: u64,
    /// Seed from which every run's random stream is derived.
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60,
            initial_attempts: 3,
            hitbox_inset_ratio: 0.1,
            spawn_delay: SpawnDelayConfig::default(),
            area_width: 500.0,
            area_height: 400.0,
            player_size: 40.0,
            obstacle_size: 60.0,
            player_bottom_offset: 40.0,
            fall_rate: 0.15,
            player_step_percent: 3.0,
            max_frame_delta_ms: 50,
            seed: 0x7472_6f70_6963_616c,
        }
    }
}

impl SessionConfig {
    /// Length of a full run.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }

    /// Largest frame delta honoured by advection.
    #[must_use]
    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }

    /// Rejects values the mini-game cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if !(0.0..0.5).contains(&self.hitbox_inset_ratio) {
            return Err(ConfigError::InsetOutOfRange(self.hitbox_inset_ratio));
        }
        positive("session.area_width", self.area_width)?;
        positive("session.area_height", self.area_height)?;
        positive("session.player_size", self.player_size)?;
        positive("session.obstacle_size", self.obstacle_size)?;
        positive("session.fall_rate", self.fall_rate)?;
        positive("session.player_step_percent", self.player_step_percent)?;
        if self.obstacle_size >= self.area_width || self.player_size >= self.area_width {
            return Err(ConfigError::SpriteWiderThanArea);
        }
        self.spawn_delay.validate()
    }
}

/// Bounds of the jittered spawn delay at the start and the end of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnDelayConfig {
    /// Shortest delay when the run starts, in milliseconds.
    pub min_start_ms: u64,
    /// Longest delay when the run starts, in milliseconds.
    pub max_start_ms: u64,
    /// Shortest delay when the run ends, in milliseconds.
    pub min_end_ms: u64,
    /// Longest delay when the run ends, in milliseconds.
    pub max_end_ms: u64,
}

impl Default for SpawnDelayConfig {
    fn default() -> Self {
        Self {
            min_start_ms: 800,
            max_start_ms: 1_500,
            min_end_ms: 400,
            max_end_ms: 800,
        }
    }
}

impl SpawnDelayConfig {
    /// Delay interval `[min, max]` in milliseconds at the given run progress.
    ///
    /// Progress is clamped to `0.0..=1.0`; both bounds move linearly from
    /// their start value to their end value.
    #[must_use]
    pub fn window_at(&self, progress: f32) -> (f32, f32) {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let min = interpolate(self.min_start_ms, self.min_end_ms, progress);
        let max = interpolate(self.max_start_ms, self.max_end_ms, progress);
        (min, max.max(min))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_start_ms > self.max_start_ms || self.min_end_ms > self.max_end_ms {
            return Err(ConfigError::InvertedSpawnDelay);
        }
        if self.max_start_ms == 0 || self.max_end_ms == 0 {
            return Err(ConfigError::ZeroSpawnDelay);
        }
        Ok(())
    }
}

fn interpolate(start: u64, end: u64, progress: f32) -> f32 {
    let start = start as f32;
    let end = end as f32;
    start + (end - start) * progress
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A quantity that must be strictly positive was not.
    #[error("`{field}` must be a positive finite number, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
    /// Camera smoothing fell outside `(0, 1]`.
    #[error("`camera_smoothing` must lie in (0, 1], got {0}")]
    SmoothingOutOfRange(f32),
    /// The tick rate was zero.
    #[error("`tick_rate` must be at least 1")]
    ZeroTickRate,
    /// The per-frame step budget was zero.
    #[error("`max_steps_per_frame` must be at least 1")]
    ZeroStepBudget,
    /// The session duration was zero.
    #[error("`session.duration_secs` must be at least 1")]
    ZeroDuration,
    /// The hitbox inset ratio fell outside `[0, 0.5)`.
    #[error("`session.hitbox_inset_ratio` must lie in [0, 0.5), got {0}")]
    InsetOutOfRange(f32),
    /// A sprite does not fit inside the play area.
    #[error("player and obstacle sprites must be narrower than the play area")]
    SpriteWiderThanArea,
    /// A spawn delay lower bound exceeds its upper bound.
    #[error("spawn delay minimum exceeds its maximum")]
    InvertedSpawnDelay,
    /// A spawn delay upper bound was zero.
    #[error("spawn delay must allow a non-zero wait")]
    ZeroSpawnDelay,
}
