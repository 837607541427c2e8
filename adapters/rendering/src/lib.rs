#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tropical Trouble hosts.
//!
//! The simulation never draws. After every step the host captures a [`Frame`]
//! (or an [`ArcadeFrame`] for the mini-game) and hands it to whatever
//! [`RenderingBackend`] it owns. A [`Presenter`] without a backend accepts
//! frames and discards them.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt};
use tropical_trouble_core::{
    BulletId, Direction, ObstacleId, Position, SceneGeneration, SceneTuning, SessionSnapshot,
    SessionStatus, WorldId,
};
use tropical_trouble_minigame::Outcome;
use tropical_trouble_world::{query, World};

/// Screen mapping of one scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pixel_scale: f32,
    anchor: Vec2,
}

impl Viewport {
    /// Creates a viewport with the given pixel scale and camera anchor.
    pub fn new(pixel_scale: f32, anchor: Position) -> Result<Self, RenderingError> {
        if !(pixel_scale.is_finite() && pixel_scale > 0.0) {
            return Err(RenderingError::InvalidPixelScale { pixel_scale });
        }
        Ok(Self {
            pixel_scale,
            anchor: to_vec(anchor),
        })
    }

    /// Viewport described by a scene's tuning.
    pub fn for_scene(tuning: &SceneTuning) -> Result<Self, RenderingError> {
        Self::new(tuning.pixel_scale, tuning.camera_anchor)
    }

    /// Screen pixels per world pixel.
    #[must_use]
    pub const fn pixel_scale(&self) -> f32 {
        self.pixel_scale
    }

    /// Translation applied to the map layer so the camera sits on the anchor.
    #[must_use]
    pub fn map_translation(&self, camera: Position) -> Vec2 {
        -to_vec(camera) * self.pixel_scale + self.anchor * self.pixel_scale
    }

    /// Translation of the character sprite inside the map layer.
    #[must_use]
    pub fn character_translation(&self, position: Position) -> Vec2 {
        to_vec(position) * self.pixel_scale
    }
}

fn to_vec(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}

/// Projectile as drawn by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSprite {
    /// Identifier of the projectile.
    pub id: BulletId,
    /// World-space position of the projectile.
    pub position: Vec2,
    /// Direction of travel.
    pub direction: Direction,
}

/// Everything a host needs to draw one overworld step.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Scene being displayed.
    pub scene: WorldId,
    /// Generation token of the scene instance.
    pub generation: SceneGeneration,
    /// World-space origin of the character.
    pub character: Vec2,
    /// Facing attribute of the character sprite.
    pub facing: Direction,
    /// Whether the walking animation plays.
    pub walking: bool,
    /// World-space camera position.
    pub camera: Vec2,
    /// Live projectiles in creation order.
    pub bullets: Vec<BulletSprite>,
    /// Screen pixels per world pixel of the scene.
    pub pixel_scale: f32,
    /// Screen translation of the map layer.
    pub map_translation: Vec2,
    /// Translation of the character inside the map layer.
    pub character_translation: Vec2,
}

impl Frame {
    /// Captures the world through the viewport of its loaded scene.
    pub fn capture(world: &World) -> Result<Self, RenderingError> {
        let viewport = Viewport::for_scene(&query::tuning(world))?;
        let character = query::character(world);
        Ok(Self {
            scene: query::scene(world),
            generation: query::generation(world),
            character: to_vec(character.position),
            facing: character.facing,
            walking: character.walking,
            camera: to_vec(character.camera),
            bullets: query::bullet_view(world)
                .iter()
                .map(|bullet| BulletSprite {
                    id: bullet.id,
                    position: to_vec(bullet.position),
                    direction: bullet.direction,
                })
                .collect(),
            pixel_scale: viewport.pixel_scale(),
            map_translation: viewport.map_translation(character.camera),
            character_translation: viewport.character_translation(character.position),
        })
    }
}

/// Obstacle as drawn by the host, in play area percentages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObstacleSprite {
    /// Identifier of the obstacle.
    pub id: ObstacleId,
    /// Top-left corner in percent of the play area.
    pub top_left: Vec2,
}

/// Everything a host needs to draw one mini-game frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ArcadeFrame {
    /// Horizontal centre of the player in percent of the play area.
    pub player_x: f32,
    /// Live obstacles in spawn order.
    pub obstacles: Vec<ObstacleSprite>,
    /// Lifecycle state of the session.
    pub status: SessionStatus,
    /// Score of the current or latest run.
    pub score: u32,
    /// Whole seconds remaining.
    pub time_remaining: u32,
    /// Attempts left for future runs.
    pub attempts: u32,
    /// Best final score across runs.
    pub high_score: u32,
    /// Overlay headline, absent while a run is in progress.
    pub headline: Option<&'static str>,
}

impl ArcadeFrame {
    /// Captures a mini-game snapshot together with the latest run's outcome.
    #[must_use]
    pub fn capture(snapshot: &SessionSnapshot, outcome: Option<Outcome>) -> Self {
        let headline = match (snapshot.status, outcome) {
            (SessionStatus::Running, _) => None,
            (_, Some(Outcome::OutOfAttempts)) => Some("Game Over - No Attempts Left!"),
            (_, Some(Outcome::Won)) => Some("You Won!"),
            (_, Some(Outcome::Crashed)) => Some("Game Over!"),
            (_, None) => Some("Rock Climbing"),
        };
        Self {
            player_x: snapshot.player_x_percent,
            obstacles: snapshot
                .obstacles
                .iter()
                .map(|obstacle| ObstacleSprite {
                    id: obstacle.id,
                    top_left: Vec2::new(obstacle.x_percent, obstacle.y_percent),
                })
                .collect(),
            status: snapshot.status,
            score: snapshot.score,
            time_remaining: snapshot.time_remaining,
            attempts: snapshot.attempts_remaining,
            high_score: snapshot.high_score,
            headline,
        }
    }
}

/// Rendering backend a host implements to display frames.
pub trait RenderingBackend {
    /// Presents one overworld frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;

    /// Presents one mini-game frame.
    fn present_arcade(&mut self, frame: &ArcadeFrame) -> AnyResult<()>;
}

/// Forwards frames to an optional backend.
///
/// Without a backend every call succeeds and nothing is drawn.
#[derive(Default)]
pub struct Presenter {
    backend: Option<Box<dyn RenderingBackend>>,
    presented: u64,
}

impl Presenter {
    /// Creates a presenter that discards every frame.
    #[must_use]
    pub fn headless() -> Self {
        Self::default()
    }

    /// Creates a presenter that forwards frames to the backend.
    #[must_use]
    pub fn with_backend(backend: Box<dyn RenderingBackend>) -> Self {
        Self {
            backend: Some(backend),
            presented: 0,
        }
    }

    /// Forwards an overworld frame to the backend, if any.
    pub fn present(&mut self, frame: &Frame) -> AnyResult<()> {
        if let Some(backend) = self.backend.as_mut() {
            backend.present(frame)?;
            self.presented += 1;
        }
        Ok(())
    }

    /// Forwards a mini-game frame to the backend, if any.
    pub fn present_arcade(&mut self, frame: &ArcadeFrame) -> AnyResult<()> {
        if let Some(backend) = self.backend.as_mut() {
            backend.present_arcade(frame)?;
            self.presented += 1;
        }
        Ok(())
    }

    /// Number of frames the backend accepted.
    #[must_use]
    pub const fn presented(&self) -> u64 {
        self.presented
    }
}

impl fmt::Debug for Presenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presenter")
            .field("backend", &self.backend.is_some())
            .field("presented", &self.presented)
            .finish()
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The pixel scale must be a positive finite number.
    InvalidPixelScale {
        /// Provided scale that failed validation.
        pixel_scale: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPixelScale { pixel_scale } => {
                write!(f, "pixel_scale must be positive (received {pixel_scale})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc, time::Duration};
    use tropical_trouble_core::{Command, GameConfig, ObstacleSnapshot};
    use tropical_trouble_world as world;

    #[test]
    fn map_translation_pins_the_camera_to_the_anchor() {
        let viewport = Viewport::for_scene(&SceneTuning::default()).expect("valid viewport");
        assert_eq!(
            viewport.map_translation(Position::new(192.0, 256.0)),
            Vec2::new(-252.0, -428.0)
        );
        assert_eq!(
            viewport.character_translation(Position::new(192.0, 256.0)),
            Vec2::new(384.0, 512.0)
        );
    }

    #[test]
    fn non_positive_pixel_scale_is_rejected() {
        assert_eq!(
            Viewport::new(0.0, Position::new(0.0, 0.0)),
            Err(RenderingError::InvalidPixelScale { pixel_scale: 0.0 })
        );
    }

    #[test]
    fn arena_frames_use_the_arena_mapping() {
        let mut world = World::new(&GameConfig::default());
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::EnterScene {
                scene: WorldId::ColorBlast,
                spawn: Position::new(144.0, 54.0),
            },
            &mut events,
        );
        let frame = Frame::capture(&world).expect("valid tuning");

        assert_eq!(frame.pixel_scale, 4.0);
        // (-144 + 206) * 4, (-54 + 32) * 4
        assert_eq!(frame.map_translation, Vec2::new(248.0, -88.0));
        assert_eq!(frame.character_translation, Vec2::new(576.0, 216.0));
    }

    #[test]
    fn frame_reflects_world_state() {
        let config = GameConfig::default();
        let mut world = World::new(&config);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::SpawnBullet {
                origin: Position::new(5.0, 6.0),
                direction: Direction::Up,
            },
            &mut events,
        );
        let frame = Frame::capture(&world).expect("valid tuning");

        assert_eq!(frame.scene, WorldId::City);
        assert_eq!(frame.pixel_scale, 2.0);
        assert_eq!(frame.character, Vec2::new(192.0, 256.0));
        assert_eq!(frame.bullets.len(), 1);
        assert_eq!(frame.bullets[0].position, Vec2::new(5.0, 6.0));
        assert!(!frame.walking);
    }

    #[test]
    fn arcade_headline_follows_the_outcome() {
        let snapshot = SessionSnapshot {
            status: SessionStatus::Over,
            score: 12,
            time_remaining: 48,
            attempts_remaining: 0,
            high_score: 12,
            player_x_percent: 50.0,
            obstacles: vec![ObstacleSnapshot {
                id: ObstacleId::new(3),
                x_percent: 10.0,
                y_percent: 70.0,
                spawned_at: Duration::from_secs(4),
            }],
        };
        let frame = ArcadeFrame::capture(&snapshot, Some(Outcome::OutOfAttempts));
        assert_eq!(frame.headline, Some("Game Over - No Attempts Left!"));
        assert_eq!(frame.obstacles[0].top_left, Vec2::new(10.0, 70.0));

        let idle = SessionSnapshot {
            status: SessionStatus::Idle,
            ..snapshot
        };
        assert_eq!(ArcadeFrame::capture(&idle, None).headline, Some("Rock Climbing"));
    }

    struct Recording(Rc<RefCell<Vec<WorldId>>>);

    impl RenderingBackend for Recording {
        fn present(&mut self, frame: &Frame) -> AnyResult<()> {
            self.0.borrow_mut().push(frame.scene);
            Ok(())
        }

        fn present_arcade(&mut self, _frame: &ArcadeFrame) -> AnyResult<()> {
            anyhow::bail!("no arcade surface")
        }
    }

    #[test]
    fn presenter_forwards_only_when_a_backend_exists() {
        let config = GameConfig::default();
        let world = World::new(&config);
        let frame = Frame::capture(&world).expect("valid tuning");

        let mut headless = Presenter::headless();
        headless.present(&frame).expect("headless presenting succeeds");
        assert_eq!(headless.presented(), 0);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut presenter = Presenter::with_backend(Box::new(Recording(Rc::clone(&seen))));
        presenter.present(&frame).expect("recording backend accepts frames");
        assert_eq!(*seen.borrow(), vec![WorldId::City]);
        assert_eq!(presenter.presented(), 1);

        let arcade = ArcadeFrame::capture(
            &SessionSnapshot {
                status: SessionStatus::Idle,
                score: 0,
                time_remaining: 60,
                attempts_remaining: 3,
                high_score: 0,
                player_x_percent: 50.0,
                obstacles: Vec::new(),
            },
            None,
        );
        assert!(presenter.present_arcade(&arcade).is_err());
    }
}
