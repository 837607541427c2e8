//! Inset rectangle overlap between the player and falling obstacles.

use tropical_trouble_core::{ObstacleSnapshot, SessionConfig};

/// Axis-aligned rectangle in play area pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitBox {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl HitBox {
    fn inset(left: f32, top: f32, size: f32, ratio: f32) -> Self {
        let inset = size * ratio;
        Self {
            left: left + inset,
            top: top + inset,
            right: left + size - inset,
            bottom: top + size - inset,
        }
    }

    /// Strict overlap; touching edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &HitBox) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

/// Converts percent positions into pixel hitboxes and tests them for overlap.
#[derive(Clone, Debug)]
pub struct CollisionDetector {
    area_width: f32,
    area_height: f32,
    player_size: f32,
    obstacle_size: f32,
    player_bottom_offset: f32,
    inset_ratio: f32,
}

impl CollisionDetector {
    /// Creates a detector for the configured play area.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            area_width: config.area_width,
            area_height: config.area_height,
            player_size: config.player_size,
            obstacle_size: config.obstacle_size,
            player_bottom_offset: config.player_bottom_offset,
            inset_ratio: config.hitbox_inset_ratio,
        }
    }

    /// Hitbox of a player whose horizontal centre sits at `x_percent`.
    #[must_use]
    pub fn player_box(&self, x_percent: f32) -> HitBox {
        let centre = x_percent / 100.0 * self.area_width;
        let bottom = self.area_height - self.player_bottom_offset;
        HitBox::inset(
            centre - self.player_size / 2.0,
            bottom - self.player_size,
            self.player_size,
            self.inset_ratio,
        )
    }

    /// Hitbox of an obstacle whose top-left corner sits at the given percentages.
    #[must_use]
    pub fn obstacle_box(&self, x_percent: f32, y_percent: f32) -> HitBox {
        HitBox::inset(
            x_percent / 100.0 * self.area_width,
            y_percent / 100.0 * self.area_height,
            self.obstacle_size,
            self.inset_ratio,
        )
    }

    /// First obstacle, in the given order, whose hitbox overlaps the player's.
    #[must_use]
    pub fn first_hit<'a>(
        &self,
        player_x_percent: f32,
        obstacles: impl IntoIterator<Item = &'a ObstacleSnapshot>,
    ) -> Option<&'a ObstacleSnapshot> {
        let player = self.player_box(player_x_percent);
        obstacles.into_iter().find(|obstacle| {
            self.obstacle_box(obstacle.x_percent, obstacle.y_percent)
                .overlaps(&player)
        })
    }

    /// Width of the player sprite in percent of the play area.
    #[must_use]
    pub fn player_width_percent(&self) -> f32 {
        self.player_size / self.area_width * 100.0
    }

    /// Width of an obstacle sprite in percent of the play area.
    #[must_use]
    pub fn obstacle_width_percent(&self) -> f32 {
        self.obstacle_size / self.area_width * 100.0
    }
}
