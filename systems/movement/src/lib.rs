#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that turns the held heading into character commands.

use tropical_trouble_core::{
    CharacterSnapshot, Command, Direction, Event, GameConfig, Position, WorldId,
};
use tropical_trouble_world::{CollisionMask, PlayField, PortalRegistry, TileClass};

/// Read-only description of the scene the character moves through.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings<'a> {
    /// Scene currently loaded.
    pub scene: WorldId,
    /// Collision lookup of the scene.
    pub mask: &'a CollisionMask,
    /// Bounds of the character's ground-contact point.
    pub play_field: PlayField,
    /// Offset from the character origin to its ground-contact point.
    pub feet_offset: Position,
    /// Routing table consulted when the character enters a portal tile.
    pub portals: &'a PortalRegistry,
}

/// Pure system that reacts to time advancing and emits one character command per step.
#[derive(Clone, Debug)]
pub struct Movement {
    move_speed: f32,
}

impl Movement {
    /// Creates a movement system using the configured speed.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            move_speed: config.move_speed,
        }
    }

    /// Consumes world events and immutable views to emit movement commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        heading: Option<Direction>,
        character: &CharacterSnapshot,
        surroundings: Surroundings<'_>,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        match heading {
            Some(direction) => out.push(self.step(direction, character, surroundings)),
            None => out.push(Command::HaltCharacter),
        }
    }

    fn step(
        &self,
        direction: Direction,
        character: &CharacterSnapshot,
        surroundings: Surroundings<'_>,
    ) -> Command {
        let feet_offset = surroundings.feet_offset;
        let current_feet = character.position.offset(feet_offset);
        let feet = surroundings
            .play_field
            .clamp(current_feet.stepped(direction, self.move_speed));
        if feet == current_feet {
            return Command::TurnCharacter { facing: direction };
        }
        let prospective = Position::new(
            feet.x() - feet_offset.x(),
            feet.y() - feet_offset.y(),
        );

        match surroundings.mask.classify(feet) {
            TileClass::Blocked => Command::TurnCharacter { facing: direction },
            TileClass::Free => Command::AdvanceCharacter {
                to: prospective,
                facing: direction,
            },
            TileClass::Portal => {
                let mask = surroundings.mask;
                let (Some(tile), current_tile) = (mask.tile_of(feet), mask.tile_of(current_feet))
                else {
                    return Command::TurnCharacter { facing: direction };
                };
                if current_tile == Some(tile) {
                    return Command::AdvanceCharacter {
                        to: prospective,
                        facing: direction,
                    };
                }
                match surroundings
                    .portals
                    .route_if_portal(surroundings.scene, tile, prospective)
                {
                    Some(transition) => Command::TraversePortal {
                        exit: prospective,
                        facing: direction,
                        destination: transition.destination,
                        spawn: transition.spawn,
                    },
                    None => {
                        tracing::warn!(
                            scene = %surroundings.scene,
                            column = tile.column(),
                            row = tile.row(),
                            "portal tile has no route"
                        );
                        Command::AdvanceCharacter {
                            to: prospective,
                            facing: direction,
                        }
                    }
                }
            }
        }
    }
}
