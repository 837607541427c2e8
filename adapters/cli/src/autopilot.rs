//! Greedy steering used by the `climb` subcommand.

use tropical_trouble_core::{SessionConfig, SessionSnapshot, SessionStatus, Steer};
use tropical_trouble_minigame::CollisionDetector;

/// Dodges the closest obstacle falling into the player's column.
#[derive(Clone, Debug)]
pub(crate) struct Autopilot {
    detector: CollisionDetector,
    margin: f32,
    area_width: f32,
}

impl Autopilot {
    pub(crate) fn new(config: &SessionConfig) -> Self {
        Self {
            detector: CollisionDetector::new(config),
            margin: config.player_size / 2.0,
            area_width: config.area_width,
        }
    }

    /// Steering for the next frame, if any obstacle threatens the player.
    pub(crate) fn steer(&self, snapshot: &SessionSnapshot) -> Option<Steer> {
        if snapshot.status != SessionStatus::Running {
            return None;
        }
        let player = self.detector.player_box(snapshot.player_x_percent);
        let threat = snapshot
            .obstacles
            .iter()
            .map(|obstacle| self.detector.obstacle_box(obstacle.x_percent, obstacle.y_percent))
            .filter(|hitbox| {
                hitbox.top < player.bottom
                    && hitbox.left < player.right + self.margin
                    && hitbox.right > player.left - self.margin
            })
            .max_by(|a, b| a.bottom.total_cmp(&b.bottom))?;

        let player_centre = (player.left + player.right) / 2.0;
        let threat_centre = (threat.left + threat.right) / 2.0;
        let room_left = threat.left;
        let room_right = self.area_width - threat.right;
        let steer = if player_centre < threat_centre && room_left >= player.right - player.left {
            Steer::Left
        } else if room_right >= player.right - player.left {
            Steer::Right
        } else {
            Steer::Left
        };
        Some(steer)
    }
}
