#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tropical Trouble engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative overworld, the mini-game session and the pure systems.
//! Adapters submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values for systems to react to deterministically. Systems consume
//! event streams, query immutable snapshots, and respond exclusively with new
//! command batches. The mini-game follows the same shape with
//! [`SessionCommand`] and [`SessionEvent`].

mod config;

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

pub use config::{ConfigError, GameConfig, SceneTuning, SessionConfig, SpawnDelayConfig};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tropical Trouble.";

/// Commands that express all permissible overworld mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Loads the provided scene and replaces the character wholesale at the spawn.
    EnterScene {
        /// Scene that becomes active.
        scene: WorldId,
        /// Top-left origin of the character inside the new scene.
        spawn: Position,
    },
    /// Advances the simulation clock by one fixed step of the provided length.
    Tick {
        /// Duration of simulated time covered by the step.
        dt: Duration,
    },
    /// Stops the character without altering its facing or position.
    HaltCharacter,
    /// Turns the character toward a heading whose step was rejected.
    TurnCharacter {
        /// Heading the character faces after the rejected step.
        facing: Direction,
    },
    /// Commits a single-axis step of the character.
    AdvanceCharacter {
        /// Position the character occupies after the step.
        to: Position,
        /// Heading of the step.
        facing: Direction,
    },
    /// Requests that the character leave the scene through a portal tile.
    TraversePortal {
        /// Attempted position that crossed into the portal tile.
        exit: Position,
        /// Heading of the step that crossed into the portal.
        facing: Direction,
        /// Scene the portal leads to.
        destination: WorldId,
        /// Origin of the character inside the destination scene.
        spawn: Position,
    },
    /// Moves the presentational camera.
    FocusCamera {
        /// New camera position.
        position: Position,
    },
    /// Creates a projectile travelling in a fixed direction.
    SpawnBullet {
        /// Position the projectile starts from.
        origin: Position,
        /// Fixed direction of travel.
        direction: Direction,
    },
    /// Moves a live projectile.
    AdvanceBullet {
        /// Projectile to move.
        bullet: BulletId,
        /// Position after the move.
        to: Position,
    },
    /// Removes a live projectile.
    DespawnBullet {
        /// Projectile to remove.
        bullet: BulletId,
        /// Why the projectile is removed.
        reason: DespawnReason,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a scene became active and every per-scene state was reset.
    SceneEntered {
        /// Scene that became active.
        scene: WorldId,
        /// Spawn origin of the character.
        spawn: Position,
        /// Generation token of the scene instance.
        generation: SceneGeneration,
    },
    /// Indicates that the simulation clock advanced by one fixed step.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the step.
        dt: Duration,
    },
    /// Confirms that the character stood still during the step.
    CharacterHalted {
        /// Facing retained by the idle character.
        facing: Direction,
    },
    /// Confirms that the character turned but could not move.
    CharacterBlocked {
        /// Heading of the rejected step.
        facing: Direction,
    },
    /// Confirms that the character moved between two positions.
    CharacterAdvanced {
        /// Position before the step.
        from: Position,
        /// Position after the step.
        to: Position,
        /// Heading of the step.
        facing: Direction,
    },
    /// Announces that the character left the scene through a portal.
    PortalTraversed {
        /// Scene the character left.
        from: WorldId,
        /// Scene the character is routed to.
        destination: WorldId,
        /// Attempted position that crossed into the portal tile.
        exit: Position,
        /// Spawn origin inside the destination scene.
        spawn: Position,
    },
    /// Confirms that the camera moved.
    CameraFocused {
        /// Camera position after the update.
        position: Position,
    },
    /// Confirms that a projectile was created.
    BulletSpawned {
        /// Identifier allocated to the projectile.
        bullet: BulletId,
        /// Position the projectile starts from.
        origin: Position,
        /// Fixed direction of travel.
        direction: Direction,
    },
    /// Confirms that a projectile moved.
    BulletAdvanced {
        /// Projectile that moved.
        bullet: BulletId,
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
    },
    /// Confirms that a projectile was removed.
    BulletDespawned {
        /// Projectile that was removed.
        bullet: BulletId,
        /// Why the projectile was removed.
        reason: DespawnReason,
    },
}

/// Point in world pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from pixel coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal pixel coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical pixel coordinate, growing downward.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Returns the position translated by the provided offset.
    #[must_use]
    pub fn offset(self, offset: Position) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }

    /// Returns the position shifted `distance` pixels along a single axis.
    #[must_use]
    pub fn stepped(self, direction: Direction, distance: f32) -> Self {
        let (dx, dy) = direction.unit();
        Self::new(self.x + dx * distance, self.y + dy * distance)
    }

    /// Blends two positions: `self * (1 - factor) + target * factor`.
    #[must_use]
    pub fn lerp(self, target: Position, factor: f32) -> Self {
        Self::new(
            self.x * (1.0 - factor) + target.x * factor,
            self.y * (1.0 - factor) + target.y * factor,
        )
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Cardinal movement directions available to the character and projectiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward decreasing y.
    Up,
    /// Movement toward increasing y.
    Down,
    /// Movement toward decreasing x.
    Left,
    /// Movement toward increasing x.
    Right,
}

impl Direction {
    /// Every direction in declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector of the direction in screen space.
    #[must_use]
    pub const fn unit(self) -> (f32, f32) {
        match self {
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }

    /// Lowercase label used by hosts for facing attributes.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Discrete actions a key identifier can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAction {
    /// Holds a movement direction while the key is down.
    Move(Direction),
    /// Fires a projectile on the press edge.
    Fire,
}

/// Overworld scenes the character can inhabit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldId {
    /// Central hub map.
    City,
    /// Map west of the city.
    Beach,
    /// Map east of the city.
    Forest,
    /// Shooting arena reachable from the city.
    ColorBlast,
}

impl WorldId {
    /// Every scene in declaration order.
    pub const ALL: [WorldId; 4] = [
        WorldId::City,
        WorldId::Beach,
        WorldId::Forest,
        WorldId::ColorBlast,
    ];

    /// Stable identifier of the scene.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Beach => "beach",
            Self::Forest => "forest",
            Self::ColorBlast => "color-blast",
        }
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a scene name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown world `{0}`")]
pub struct UnknownWorld(pub String);

impl FromStr for WorldId {
    type Err = UnknownWorld;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        WorldId::ALL
            .into_iter()
            .find(|world| world.name() == value)
            .ok_or_else(|| UnknownWorld(value.to_owned()))
    }
}

/// Location of a single tile expressed as column and row indices.
///
/// Indices are signed because pixel coordinates left of or above the map
/// floor-divide into negative tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: i32,
    row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Tile containing the provided pixel, or `None` for non-finite input.
    #[must_use]
    pub fn containing(position: Position, tile_size: f32) -> Option<Self> {
        if !position.x().is_finite() || !position.y().is_finite() || tile_size <= 0.0 {
            return None;
        }
        let column = (position.x() / tile_size).floor();
        let row = (position.y() / tile_size).floor();
        if column < i32::MIN as f32
            || column > i32::MAX as f32
            || row < i32::MIN as f32
            || row > i32::MAX as f32
        {
            return None;
        }
        Some(Self::new(column as i32, row as i32))
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a mini-game obstacle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(u32);

impl ObstacleId {
    /// Creates a new obstacle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Token identifying one scene instance; bumped on every scene entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneGeneration(u64);

impl SceneGeneration {
    /// Creates a generation token with the provided value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the token.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the token that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Reasons a projectile is removed from the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DespawnReason {
    /// The projectile left the playable bounds of the map.
    LeftBounds,
    /// The projectile entered a blocked tile.
    HitWall,
}

/// Immutable representation of the character used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterSnapshot {
    /// Top-left origin of the character.
    pub position: Position,
    /// Direction the character faces.
    pub facing: Direction,
    /// Whether the character moved during the latest step.
    pub walking: bool,
    /// Presentational camera position.
    pub camera: Position,
}

/// Immutable representation of a single projectile used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Identifier allocated to the projectile.
    pub id: BulletId,
    /// Current position of the projectile.
    pub position: Position,
    /// Fixed direction of travel.
    pub direction: Direction,
}

/// Read-only snapshot describing all live projectiles.
#[derive(Clone, Debug, Default)]
pub struct BulletView {
    snapshots: Vec<BulletSnapshot>,
}

impl BulletView {
    /// Creates a new bullet view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BulletSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &BulletSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BulletSnapshot> {
        self.snapshots
    }
}

/// Lifecycle state of the mini-game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No run has started yet.
    Idle,
    /// A run is in progress.
    Running,
    /// The latest run ended.
    Over,
}

/// Lateral steering available to the mini-game player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Steer {
    /// Move toward the left edge.
    Left,
    /// Move toward the right edge.
    Right,
}

/// Commands accepted by the mini-game session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionCommand {
    /// Starts a new run if attempts remain.
    Start,
    /// Moves the player one step sideways.
    Nudge {
        /// Side to move toward.
        steer: Steer,
    },
    /// Advances the session by the real time elapsed since the previous frame.
    Advance {
        /// Real time elapsed since the previous frame.
        dt: Duration,
    },
    /// Cancels every scheduled process and retires the session.
    Teardown,
}

/// Reasons a start request is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StartRejection {
    /// A run is already in progress.
    RunInProgress,
    /// Every attempt has been spent.
    NoAttemptsLeft,
    /// The session was torn down by the host.
    TornDown,
}

/// Events broadcast by the mini-game session.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// Confirms that a new run started.
    RunStarted {
        /// One-based index of the run within the session.
        run: u32,
        /// Attempts remaining when the run started.
        attempts_remaining: u32,
    },
    /// Reports that a start request was ignored.
    StartRejected {
        /// Specific reason the start failed.
        reason: StartRejection,
    },
    /// Confirms that the player moved sideways.
    PlayerMoved {
        /// Horizontal centre of the player in percent of the play area.
        x_percent: f32,
    },
    /// Confirms that an obstacle appeared at the top edge.
    ObstacleSpawned {
        /// Identifier allocated to the obstacle.
        obstacle: ObstacleId,
        /// Left edge of the obstacle in percent of the play area.
        x_percent: f32,
    },
    /// Confirms that an obstacle fell past the bottom edge.
    ObstacleCleared {
        /// Obstacle that left the play area.
        obstacle: ObstacleId,
    },
    /// Confirms that one second of the run elapsed.
    ScoreTicked {
        /// Score after the tick.
        score: u32,
        /// Whole seconds remaining after the tick.
        time_remaining: u32,
    },
    /// Announces that the run ended.
    RunEnded {
        /// Whether the player survived the full duration.
        survived: bool,
        /// Score credited for the run.
        final_score: u32,
        /// Attempts remaining after the run.
        attempts_remaining: u32,
        /// Best score of the session.
        high_score: u32,
        /// Obstacle blamed for the crash, if any.
        blamed: Option<ObstacleId>,
    },
    /// Confirms that the session was torn down.
    TornDown,
}

/// Immutable representation of a single obstacle used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleSnapshot {
    /// Identifier allocated to the obstacle.
    pub id: ObstacleId,
    /// Left edge in percent of the play area width.
    pub x_percent: f32,
    /// Top edge in percent of the play area height.
    pub y_percent: f32,
    /// Run time at which the obstacle spawned.
    pub spawned_at: Duration,
}

/// Read-only snapshot of the mini-game session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Lifecycle state of the session.
    pub status: SessionStatus,
    /// Score of the current or latest run.
    pub score: u32,
    /// Whole seconds remaining in the current or latest run.
    pub time_remaining: u32,
    /// Attempts left for future runs.
    pub attempts_remaining: u32,
    /// Best final score across runs.
    pub high_score: u32,
    /// Horizontal centre of the player in percent of the play area.
    pub player_x_percent: f32,
    /// Live obstacles in spawn order.
    pub obstacles: Vec<ObstacleSnapshot>,
}
