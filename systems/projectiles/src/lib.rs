#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that moves straight-line projectiles and spawns new ones on fire.

use tropical_trouble_core::{
    BulletView, CharacterSnapshot, Command, DespawnReason, Event, GameConfig, Position,
};
use tropical_trouble_world::{CollisionMask, TileClass};

/// Projectile system that queues bullet commands once per fixed step.
#[derive(Debug)]
pub struct Projectiles {
    speed: f32,
    muzzle_offset: Position,
    scratch: Vec<Command>,
}

impl Projectiles {
    /// Creates a projectile system using the configured speed and spawn offset.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            speed: config.bullet_speed,
            muzzle_offset: config.bullet_offset,
            scratch: Vec::new(),
        }
    }

    /// Advances live bullets, then spawns a new one if `fire` is set.
    ///
    /// Bullets created here start moving on the following step.
    pub fn handle(
        &mut self,
        events: &[Event],
        fire: bool,
        character: &CharacterSnapshot,
        bullets: &BulletView,
        mask: &CollisionMask,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.scratch.clear();

        for bullet in bullets.iter() {
            let to = bullet.position.stepped(bullet.direction, self.speed);
            let command = if !mask.contains_pixel(to) {
                Command::DespawnBullet {
                    bullet: bullet.id,
                    reason: DespawnReason::LeftBounds,
                }
            } else if mask.classify(to) == TileClass::Blocked {
                Command::DespawnBullet {
                    bullet: bullet.id,
                    reason: DespawnReason::HitWall,
                }
            } else {
                Command::AdvanceBullet { bullet: bullet.id, to }
            };
            self.scratch.push(command);
        }

        if fire {
            self.scratch.push(Command::SpawnBullet {
                origin: character.position.offset(self.muzzle_offset),
                direction: character.facing,
            });
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}
