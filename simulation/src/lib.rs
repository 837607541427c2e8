#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step driver that wires the overworld systems around the world.
//!
//! A [`Simulation`] owns the active scene's [`World`] and every system. Hosts
//! forward key notifications through [`Simulation::handle_key`] and real time
//! through [`Simulation::advance`]; each fixed step applies `Tick`, lets the
//! movement system react, rebuilds the scene when a portal is traversed and
//! otherwise runs projectiles and the camera.

use std::time::Duration;

use tropical_trouble_core::{Command, Direction, Event, GameConfig, Position, WorldId};
use tropical_trouble_system_camera::CameraTracker;
use tropical_trouble_system_input::{Input, KeyBindings, KeyEvent};
use tropical_trouble_system_movement::{Movement, Surroundings};
use tropical_trouble_system_projectiles::Projectiles;
use tropical_trouble_world::{self as world, layout, query, World};

/// Explicit per-scene simulation state driven by the host.
#[derive(Debug)]
pub struct Simulation {
    config: GameConfig,
    world: World,
    input: Input,
    movement: Movement,
    camera: CameraTracker,
    projectiles: Projectiles,
    step: Duration,
    accumulator: Duration,
}

impl Simulation {
    /// Creates a simulation standing at the city's default spawn.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            world: World::new(&config),
            input: Input::new(KeyBindings::with_overrides(&config.keys)),
            movement: Movement::new(&config),
            camera: CameraTracker::new(&config),
            projectiles: Projectiles::new(&config),
            step: config.step_duration(),
            accumulator: Duration::ZERO,
            config,
        }
    }

    /// Loads a scene, placing the character at `spawn` or the scene's default spawn.
    pub fn enter(&mut self, scene: WorldId, spawn: Option<Position>, out_events: &mut Vec<Event>) {
        let spawn = spawn.unwrap_or_else(|| layout(scene, &self.config).default_spawn);
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::EnterScene { scene, spawn },
            &mut events,
        );
        self.input.handle(&events);
        out_events.append(&mut events);
    }

    /// Forwards a host key notification to the input system.
    pub fn handle_key(&mut self, key: &KeyEvent) {
        self.input.handle_key(key);
    }

    /// Accumulates real time and runs every whole fixed step it covers.
    ///
    /// At most `max_steps_per_frame` steps run per call; time beyond that
    /// budget is dropped. Returns the number of steps run.
    pub fn advance(&mut self, elapsed: Duration, out_events: &mut Vec<Event>) -> u32 {
        self.accumulator = self.accumulator.saturating_add(elapsed);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.config.max_steps_per_frame {
            self.accumulator -= self.step;
            self.step(out_events);
            steps += 1;
        }
        if self.accumulator >= self.step {
            let step_nanos = self.step.as_nanos().max(1);
            let remainder = self.accumulator.as_nanos() % step_nanos;
            tracing::debug!(
                dropped_ms = (self.accumulator.as_nanos() - remainder) / 1_000_000,
                "dropping simulation time beyond the step budget"
            );
            self.accumulator = Duration::from_nanos(u64::try_from(remainder).unwrap_or(0));
        }
        steps
    }

    /// Runs exactly one fixed step.
    pub fn step(&mut self, out_events: &mut Vec<Event>) {
        let mut tick_events = Vec::new();
        world::apply(
            &mut self.world,
            Command::Tick { dt: self.step },
            &mut tick_events,
        );

        let heading = self.input.heading();
        let mut commands = Vec::new();
        {
            let character = query::character(&self.world);
            let surroundings = Surroundings {
                scene: query::scene(&self.world),
                mask: query::collision_mask(&self.world),
                play_field: query::play_field(&self.world),
                feet_offset: query::tuning(&self.world).feet_offset,
                portals: query::portals(&self.world),
            };
            self.movement
                .handle(&tick_events, heading, &character, surroundings, &mut commands);
        }
        let movement_events = self.apply_all(commands);
        out_events.extend(tick_events.iter().cloned());

        let transition = movement_events.iter().find_map(|event| match event {
            Event::PortalTraversed {
                destination, spawn, ..
            } => Some((*destination, *spawn)),
            _ => None,
        });
        out_events.extend(movement_events);
        if let Some((destination, spawn)) = transition {
            self.enter(destination, Some(spawn), out_events);
            return;
        }

        let fire = self.input.take_fire();
        let mut commands = Vec::new();
        let character = query::character(&self.world);
        self.projectiles.handle(
            &tick_events,
            fire,
            &character,
            &query::bullet_view(&self.world),
            query::collision_mask(&self.world),
            &mut commands,
        );
        out_events.extend(self.apply_all(commands));

        let mut commands = Vec::new();
        self.camera
            .handle(&tick_events, heading, &character, &mut commands);
        out_events.extend(self.apply_all(commands));
    }

    fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        events
    }

    /// Read-only access to the active scene's world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Duration of one fixed step.
    #[must_use]
    pub fn step_duration(&self) -> Duration {
        self.step
    }

    /// Direction currently driving the character.
    #[must_use]
    pub fn heading(&self) -> Option<Direction> {
        self.input.heading()
    }
}
