#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative overworld state management for Tropical Trouble.

mod maps;
mod mask;
mod portals;

use tropical_trouble_core::{
    BulletId, Command, DespawnReason, Direction, Event, GameConfig, Position, SceneGeneration,
    SceneTuning, WorldId,
};

pub use maps::{layout, PlayField, SceneLayout};
pub use mask::{CollisionMask, MaskError, TileClass, FREE_CODE, PORTAL_CODE, WALL_CODE};
pub use portals::{PortalRegistry, PortalRoute, SpawnAnchor, Transition};

#[derive(Clone, Copy, Debug)]
struct Character {
    position: Position,
    facing: Direction,
    walking: bool,
    camera: Position,
}

impl Character {
    fn spawned_at(position: Position) -> Self {
        Self {
            position,
            facing: Direction::Down,
            walking: false,
            camera: position,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Bullet {
    id: BulletId,
    position: Position,
    direction: Direction,
}

/// Represents the authoritative state of the active overworld scene.
#[derive(Debug)]
pub struct World {
    config: GameConfig,
    scene: WorldId,
    generation: SceneGeneration,
    mask: CollisionMask,
    play_field: PlayField,
    portals: PortalRegistry,
    tuning: SceneTuning,
    character: Character,
    bullets: Vec<Bullet>,
    next_bullet: u32,
    tick_index: u64,
}

impl World {
    /// Creates a world standing at the city's default spawn.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let scene = layout(WorldId::City, config);
        let spawn = scene.default_spawn;
        Self::build(
            config.clone(),
            PortalRegistry::standard(),
            WorldId::City,
            scene,
            spawn,
            SceneGeneration::default(),
        )
    }

    fn build(
        config: GameConfig,
        portals: PortalRegistry,
        scene: WorldId,
        layout: SceneLayout,
        spawn: Position,
        generation: SceneGeneration,
    ) -> Self {
        Self {
            config,
            scene,
            generation,
            mask: layout.mask,
            play_field: layout.play_field,
            portals,
            tuning: layout.tuning,
            character: Character::spawned_at(spawn),
            bullets: Vec::new(),
            next_bullet: 0,
            tick_index: 0,
        }
    }

    fn feet(&self, origin: Position) -> Position {
        origin.offset(self.tuning.feet_offset)
    }

    fn accepts_step(&self, to: Position) -> bool {
        let feet = self.feet(to);
        self.play_field.contains(feet) && self.mask.classify(feet) != TileClass::Blocked
    }

    fn block(&mut self, facing: Direction, out_events: &mut Vec<Event>) {
        self.character.facing = facing;
        self.character.walking = false;
        out_events.push(Event::CharacterBlocked { facing });
    }

    fn bullet_mut(&mut self, bullet: BulletId) -> Option<&mut Bullet> {
        self.bullets.iter_mut().find(|candidate| candidate.id == bullet)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::EnterScene { scene, spawn } => {
            let generation = world.generation.next();
            let config = std::mem::take(&mut world.config);
            let portals = std::mem::take(&mut world.portals);
            let layout = layout(scene, &config);
            *world = World::build(config, portals, scene, layout, spawn, generation);
            tracing::info!(%scene, generation = generation.get(), "entered scene");
            out_events.push(Event::SceneEntered {
                scene,
                spawn,
                generation,
            });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::HaltCharacter => {
            world.character.walking = false;
            out_events.push(Event::CharacterHalted {
                facing: world.character.facing,
            });
        }
        Command::TurnCharacter { facing } => world.block(facing, out_events),
        Command::AdvanceCharacter { to, facing } => {
            if !world.accepts_step(to) {
                world.block(facing, out_events);
                return;
            }
            let from = world.character.position;
            world.character.position = to;
            world.character.facing = facing;
            world.character.walking = true;
            out_events.push(Event::CharacterAdvanced { from, to, facing });
        }
        Command::TraversePortal {
            exit,
            facing,
            destination,
            spawn,
        } => {
            if world.mask.classify(world.feet(exit)) != TileClass::Portal {
                tracing::warn!(scene = %world.scene, ?exit, "portal traversal outside a portal tile");
                world.block(facing, out_events);
                return;
            }
            world.character.position = exit;
            world.character.facing = facing;
            world.character.walking = true;
            tracing::debug!(from = %world.scene, to = %destination, ?exit, ?spawn, "portal traversed");
            out_events.push(Event::PortalTraversed {
                from: world.scene,
                destination,
                exit,
                spawn,
            });
        }
        Command::FocusCamera { position } => {
            world.character.camera = position;
            out_events.push(Event::CameraFocused { position });
        }
        Command::SpawnBullet { origin, direction } => {
            let bullet = BulletId::new(world.next_bullet);
            world.next_bullet = world.next_bullet.wrapping_add(1);
            world.bullets.push(Bullet {
                id: bullet,
                position: origin,
                direction,
            });
            out_events.push(Event::BulletSpawned {
                bullet,
                origin,
                direction,
            });
        }
        Command::AdvanceBullet { bullet, to } => {
            if let Some(live) = world.bullet_mut(bullet) {
                let from = live.position;
                live.position = to;
                out_events.push(Event::BulletAdvanced { bullet, from, to });
            }
        }
        Command::DespawnBullet { bullet, reason } => {
            let Some(index) = world.bullets.iter().position(|live| live.id == bullet) else {
                return;
            };
            let _ = world.bullets.remove(index);
            log_despawn(bullet, reason);
            out_events.push(Event::BulletDespawned { bullet, reason });
        }
    }
}

fn log_despawn(bullet: BulletId, reason: DespawnReason) {
    tracing::debug!(bullet = bullet.get(), ?reason, "bullet despawned");
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tropical_trouble_core::{
        BulletSnapshot, BulletView, CharacterSnapshot, Position, SceneGeneration, SceneTuning,
        WorldId,
    };

    use super::{CollisionMask, PlayField, PortalRegistry, World};

    /// Scene currently loaded into the world.
    #[must_use]
    pub fn scene(world: &World) -> WorldId {
        world.scene
    }

    /// Generation token of the loaded scene instance.
    #[must_use]
    pub fn generation(world: &World) -> SceneGeneration {
        world.generation
    }

    /// Captures the character's current state.
    #[must_use]
    pub fn character(world: &World) -> CharacterSnapshot {
        CharacterSnapshot {
            position: world.character.position,
            facing: world.character.facing,
            walking: world.character.walking,
            camera: world.character.camera,
        }
    }

    /// Ground-contact point of the character.
    #[must_use]
    pub fn feet(world: &World) -> Position {
        world.feet(world.character.position)
    }

    /// Captures a read-only view of the live projectiles.
    #[must_use]
    pub fn bullet_view(world: &World) -> BulletView {
        BulletView::from_snapshots(
            world
                .bullets
                .iter()
                .map(|bullet| BulletSnapshot {
                    id: bullet.id,
                    position: bullet.position,
                    direction: bullet.direction,
                })
                .collect(),
        )
    }

    /// Provides read-only access to the loaded scene's collision mask.
    #[must_use]
    pub fn collision_mask(world: &World) -> &CollisionMask {
        &world.mask
    }

    /// Provides read-only access to the routing table.
    #[must_use]
    pub fn portals(world: &World) -> &PortalRegistry {
        &world.portals
    }

    /// Bounds of the character's ground-contact point.
    #[must_use]
    pub fn play_field(world: &World) -> PlayField {
        world.play_field
    }

    /// Character geometry and screen mapping of the loaded scene.
    #[must_use]
    pub fn tuning(world: &World) -> SceneTuning {
        world.tuning
    }

    /// Number of fixed steps applied since the scene was entered.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn world() -> World {
        World::new(&GameConfig::default())
    }

    fn enter(world: &mut World, scene: WorldId, spawn: Position) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::EnterScene { scene, spawn }, &mut events);
        events
    }

    #[test]
    fn new_world_stands_at_city_spawn() {
        let world = world();
        let character = query::character(&world);

        assert_eq!(query::scene(&world), WorldId::City);
        assert_eq!(character.position, Position::new(192.0, 256.0));
        assert_eq!(character.camera, character.position);
        assert_eq!(character.facing, Direction::Down);
        assert!(!character.walking);
        assert!(query::bullet_view(&world).is_empty());
        assert_eq!(query::feet(&world), Position::new(208.0, 276.0));
    }

    #[test]
    fn the_arena_measures_feet_with_its_own_tuning() {
        let mut world = world();
        let _ = enter(&mut world, WorldId::ColorBlast, Position::new(144.0, 54.0));

        assert_eq!(query::tuning(&world), SceneTuning::ARENA);
        assert_eq!(query::feet(&world), Position::new(160.0, 86.0));

        let _ = enter(&mut world, WorldId::City, Position::new(152.0, 54.0));
        assert_eq!(query::tuning(&world), SceneTuning::default());
        assert_eq!(query::feet(&world), Position::new(168.0, 74.0));
    }

    #[test]
    fn entering_a_scene_replaces_all_scene_state() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnBullet {
                origin: Position::new(50.0, 50.0),
                direction: Direction::Left,
            },
            &mut events,
        );
        apply(&mut world, Command::Tick { dt: Duration::from_millis(16) }, &mut events);

        let spawn = Position::new(280.0, 262.0);
        let events = enter(&mut world, WorldId::Beach, spawn);

        assert_eq!(
            events,
            vec![Event::SceneEntered {
                scene: WorldId::Beach,
                spawn,
                generation: SceneGeneration::new(1),
            }]
        );
        assert_eq!(query::scene(&world), WorldId::Beach);
        assert_eq!(query::character(&world).position, spawn);
        assert_eq!(query::character(&world).camera, spawn);
        assert!(query::bullet_view(&world).is_empty());
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(query::portals(&world), &PortalRegistry::standard());
    }

    #[test]
    fn advance_into_a_wall_is_downgraded_to_a_turn() {
        let mut world = world();
        let _ = enter(&mut world, WorldId::City, Position::new(8.0, 100.0));
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::AdvanceCharacter {
                to: Position::new(-16.0, 100.0),
                facing: Direction::Left,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CharacterBlocked {
                facing: Direction::Left
            }]
        );
        let character = query::character(&world);
        assert_eq!(character.position, Position::new(8.0, 100.0));
        assert_eq!(character.facing, Direction::Left);
        assert!(!character.walking);
    }

    #[test]
    fn halting_keeps_facing_and_position() {
        let mut world = world();
        let mut events = Vec::new();
        let start = query::character(&world).position;
        let to = start.stepped(Direction::Right, 1.0);

        apply(
            &mut world,
            Command::AdvanceCharacter {
                to,
                facing: Direction::Right,
            },
            &mut events,
        );
        apply(&mut world, Command::HaltCharacter, &mut events);

        assert_eq!(
            events,
            vec![
                Event::CharacterAdvanced {
                    from: start,
                    to,
                    facing: Direction::Right
                },
                Event::CharacterHalted {
                    facing: Direction::Right
                },
            ]
        );
        assert!(!query::character(&world).walking);
        assert_eq!(query::character(&world).position, to);
    }

    #[test]
    fn city_west_portal_reports_the_attempted_exit() {
        let mut world = world();
        let _ = enter(&mut world, WorldId::City, Position::new(-7.0, 260.0));
        let exit = Position::new(-8.0, 260.0);
        assert_eq!(
            query::collision_mask(&world).classify(exit.offset(Position::new(16.0, 20.0))),
            TileClass::Portal
        );
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::TraversePortal {
                exit,
                facing: Direction::Left,
                destination: WorldId::Beach,
                spawn: Position::new(280.0, 260.0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PortalTraversed {
                from: WorldId::City,
                destination: WorldId::Beach,
                exit,
                spawn: Position::new(280.0, 260.0),
            }]
        );
        assert_eq!(query::character(&world).position, exit);
    }

    #[test]
    fn bullets_are_numbered_in_creation_order() {
        let mut world = world();
        let mut events = Vec::new();
        for direction in [Direction::Up, Direction::Left] {
            apply(
                &mut world,
                Command::SpawnBullet {
                    origin: Position::new(10.0, 10.0),
                    direction,
                },
                &mut events,
            );
        }
        apply(
            &mut world,
            Command::AdvanceBullet {
                bullet: BulletId::new(1),
                to: Position::new(8.0, 10.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DespawnBullet {
                bullet: BulletId::new(0),
                reason: DespawnReason::HitWall,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DespawnBullet {
                bullet: BulletId::new(7),
                reason: DespawnReason::LeftBounds,
            },
            &mut events,
        );

        let bullets = query::bullet_view(&world).into_vec();
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0].id, BulletId::new(1));
        assert_eq!(bullets[0].position, Position::new(8.0, 10.0));
        assert_eq!(events.len(), 4);
    }
}
