use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use tropical_trouble_core::{
    BulletId, DespawnReason, Direction, Event, GameConfig, Position, SceneGeneration, WorldId,
};
use tropical_trouble_simulation::Simulation;
use tropical_trouble_system_input::KeyEvent;
use tropical_trouble_world::query;

fn steps_until_scene(simulation: &mut Simulation, scene: WorldId, limit: usize) -> Option<usize> {
    let mut events = Vec::new();
    for step in 1..=limit {
        simulation.step(&mut events);
        if query::scene(simulation.world()) == scene {
            return Some(step);
        }
    }
    None
}

#[test]
fn walking_west_along_row_seventeen_reaches_the_beach() {
    let mut simulation = Simulation::new(GameConfig::default());
    simulation.handle_key(&KeyEvent::pressed("ArrowLeft"));

    // feet start at x = 208 and enter the portal tile below x = 16
    assert_eq!(
        steps_until_scene(&mut simulation, WorldId::Beach, 400),
        Some(193)
    );
    let world = simulation.world();
    assert_eq!(query::generation(world), SceneGeneration::new(1));
    let character = query::character(world);
    assert_eq!(character.position, Position::new(280.0, 256.0));
    assert_eq!(character.camera, character.position);
    assert!(query::bullet_view(world).is_empty());
}

#[test]
fn beach_east_edge_leads_back_to_the_city() {
    let mut simulation = Simulation::new(GameConfig::default());
    let mut events = Vec::new();
    simulation.enter(WorldId::Beach, Some(Position::new(280.0, 256.0)), &mut events);
    simulation.handle_key(&KeyEvent::pressed("ArrowRight"));

    assert_eq!(steps_until_scene(&mut simulation, WorldId::City, 50), Some(8));
    assert_eq!(
        query::character(simulation.world()).position,
        Position::new(8.0, 256.0)
    );
}

#[test]
fn arena_exit_is_reached_with_the_taller_arena_feet() {
    let mut simulation = Simulation::new(GameConfig::default());
    let mut events = Vec::new();
    simulation.enter(WorldId::ColorBlast, None, &mut events);
    simulation.handle_key(&KeyEvent::pressed("ArrowUp"));

    // arena feet sit 32px below the origin: y = 86 climbs to the portal row at y = 31
    assert_eq!(
        steps_until_scene(&mut simulation, WorldId::City, 100),
        Some(55)
    );
    assert_eq!(
        query::character(simulation.world()).position,
        Position::new(152.0, 54.0)
    );
}

#[test]
fn transition_event_carries_the_attempted_exit() {
    let mut simulation = Simulation::new(GameConfig::default());
    let mut events = Vec::new();
    simulation.enter(WorldId::City, Some(Position::new(0.0, 260.0)), &mut events);
    simulation.handle_key(&KeyEvent::pressed("ArrowLeft"));

    events.clear();
    simulation.step(&mut events);

    assert!(events.contains(&Event::PortalTraversed {
        from: WorldId::City,
        destination: WorldId::Beach,
        exit: Position::new(-1.0, 260.0),
        spawn: Position::new(280.0, 260.0),
    }));
    assert!(matches!(
        events.last(),
        Some(Event::SceneEntered {
            scene: WorldId::Beach,
            ..
        })
    ));
}

#[test]
fn walls_turn_the_character_without_moving_it() {
    let mut simulation = Simulation::new(GameConfig::default());
    let mut events = Vec::new();
    // feet at (16, 120): column 0 of the city is solid wall
    simulation.enter(WorldId::City, Some(Position::new(0.0, 100.0)), &mut events);
    simulation.handle_key(&KeyEvent::pressed("ArrowLeft"));

    for _ in 0..10 {
        simulation.step(&mut events);
    }

    let character = query::character(simulation.world());
    assert_eq!(character.position, Position::new(0.0, 100.0));
    assert_eq!(character.facing, Direction::Left);
    assert!(!character.walking);
}

#[test]
fn releasing_the_latest_key_falls_back_to_the_earlier_one() {
    let mut simulation = Simulation::new(GameConfig::default());
    let mut events = Vec::new();
    let start = query::character(simulation.world()).position;

    simulation.handle_key(&KeyEvent::pressed("ArrowLeft"));
    simulation.handle_key(&KeyEvent::pressed("ArrowUp"));
    simulation.step(&mut events);
    simulation.handle_key(&KeyEvent::released("ArrowUp"));
    simulation.step(&mut events);
    simulation.handle_key(&KeyEvent::released("ArrowLeft"));
    simulation.step(&mut events);

    let character = query::character(simulation.world());
    assert_eq!(character.position, Position::new(start.x() - 1.0, start.y() - 1.0));
    assert_eq!(character.facing, Direction::Left);
    assert!(!character.walking);
}

#[test]
fn shots_fly_until_they_hit_the_arena_wall() {
    let mut simulation = Simulation::new(GameConfig::default());
    let mut events = Vec::new();
    simulation.enter(WorldId::ColorBlast, None, &mut events);
    simulation.handle_key(&KeyEvent::pressed("Space"));

    events.clear();
    simulation.step(&mut events);
    assert!(events.contains(&Event::BulletSpawned {
        bullet: BulletId::new(0),
        origin: Position::new(160.0, 64.0),
        direction: Direction::Down,
    }));

    simulation.step(&mut events);
    let bullets = query::bullet_view(simulation.world()).into_vec();
    assert_eq!(bullets.len(), 1);
    assert_eq!(bullets[0].position, Position::new(160.0, 66.0));

    // column 10 is clear until the pillar on row 14 (y = 224)
    events.clear();
    for _ in 0..100 {
        simulation.step(&mut events);
    }
    assert!(events.contains(&Event::BulletDespawned {
        bullet: BulletId::new(0),
        reason: DespawnReason::HitWall,
    }));
    assert!(query::bullet_view(simulation.world()).is_empty());
}

#[test]
fn holding_fire_shoots_once() {
    let mut simulation = Simulation::new(GameConfig::default());
    let mut events = Vec::new();
    simulation.handle_key(&KeyEvent::pressed("Space"));
    simulation.handle_key(&KeyEvent::pressed("Space"));
    for _ in 0..5 {
        simulation.step(&mut events);
    }
    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::BulletSpawned { .. }))
        .count();
    assert_eq!(spawned, 1);
}

#[test]
fn camera_trails_the_character() {
    let mut simulation = Simulation::new(GameConfig::default());
    let mut events = Vec::new();
    simulation.handle_key(&KeyEvent::pressed("ArrowRight"));
    for _ in 0..30 {
        simulation.step(&mut events);
    }
    let character = query::character(simulation.world());
    assert!(character.camera.x() > 192.0);
    assert!(character.camera.x() < character.position.x() + 6.0);
    assert!((character.camera.y() - 256.0).abs() < 1e-3);
}

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay();
    let second = replay();
    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(fingerprint(&first), fingerprint(&second));
}

fn replay() -> Vec<Event> {
    let mut simulation = Simulation::new(GameConfig::default());
    let mut log = Vec::new();
    let script: [(u32, &str, bool); 8] = [
        (0, "ArrowLeft", true),
        (40, "Space", true),
        (41, "Space", false),
        (60, "ArrowUp", true),
        (90, "ArrowUp", false),
        (120, "Space", true),
        (150, "ArrowLeft", false),
        (151, "ArrowDown", true),
    ];
    for frame in 0..300_u32 {
        for (at, key, pressed) in script {
            if at == frame {
                let event = if pressed {
                    KeyEvent::pressed(key)
                } else {
                    KeyEvent::released(key)
                };
                simulation.handle_key(&event);
            }
        }
        let _ = simulation.advance(Duration::from_millis(17), &mut log);
    }
    log
}

fn fingerprint(events: &[Event]) -> u64 {
    let mut hasher = DefaultHasher::new();
    format!("{events:?}").hash(&mut hasher);
    hasher.finish()
}
