#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Smoothed camera that leads the character along its heading.

use tropical_trouble_core::{CharacterSnapshot, Command, Direction, Event, GameConfig, Position};

/// Pure system that blends the camera toward a point ahead of the character.
#[derive(Clone, Debug)]
pub struct CameraTracker {
    lookahead_distance: f32,
    smoothing: f32,
}

impl CameraTracker {
    /// Creates a tracker using the configured lookahead and smoothing.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            lookahead_distance: config.lookahead_distance,
            smoothing: config.camera_smoothing,
        }
    }

    /// Emits one camera update for every fixed step in the batch.
    pub fn handle(
        &mut self,
        events: &[Event],
        heading: Option<Direction>,
        character: &CharacterSnapshot,
        out: &mut Vec<Command>,
    ) {
        let steps = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count();
        let mut camera = character.camera;
        for _ in 0..steps {
            camera = self.follow(camera, character.position, heading);
            out.push(Command::FocusCamera { position: camera });
        }
    }

    /// Camera position after one step of smoothing.
    #[must_use]
    pub fn follow(&self, camera: Position, position: Position, heading: Option<Direction>) -> Position {
        let target = match heading {
            Some(direction) => position.stepped(direction, self.lookahead_distance),
            None => position,
        };
        camera.lerp(target, self.smoothing)
    }
}
