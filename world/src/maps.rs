//! Built-in scene layouts.

use tropical_trouble_core::{GameConfig, Position, SceneTuning, WorldId};

use crate::mask::CollisionMask;

const CITY: [&str; 20] = [
    "####################",
    "####################",
    "##..############..##",
    "##..######P#####..##",
    "#..................#",
    "#..................#",
    "#...###......###...#",
    "#...###......###...#",
    "#..................#",
    "#..TT..........TT..#",
    "#..TT..........TT..#",
    "#..................#",
    "#..................#",
    "####....####....####",
    "#..................#",
    "#..................#",
    "#..................#",
    "P..................P",
    "#..................#",
    "####################",
];

const BEACH: [&str; 20] = [
    "WWWWWWWWWWWWWWWWWWWW",
    "WWWWWWWWWWWWWWWWWWWW",
    "WW.................#",
    "WW.................#",
    "WW.................#",
    "WW.................#",
    "WW....T......T.....#",
    "WW.................#",
    "WW.................#",
    "WW.................#",
    "WW..T........T.....#",
    "WW.................#",
    "WW.................#",
    "WW.................#",
    "WW.................#",
    "WW.................#",
    "WW.................#",
    "WW.................P",
    "WW.................#",
    "WWWWWWWWWWWWWWWWWWWW",
];

const FOREST: [&str; 20] = [
    "TTTTTTTTTTTTTTTTTTTT",
    "TTTTTTTTTTTTTTTTTTTT",
    "#................TTT",
    "#................TTT",
    "#................TTT",
    "#................TTT",
    "#................TTT",
    "#..TT....TT....TTTTT",
    "#................TTT",
    "#................TTT",
    "#......TT........TTT",
    "#................TTT",
    "#................TTT",
    "#..TT....TT....TTTTT",
    "#................TTT",
    "#................TTT",
    "#................TTT",
    "P..................T",
    "#................TTT",
    "TTTTTTTTTTTTTTTTTTTT",
];

const COLOR_BLAST: [&str; 20] = [
    "####################",
    "##########P#########",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#....##......##....#",
    "#....##......##....#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#........##........#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "####################",
];

/// Rectangle the character's ground-contact point is confined to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayField {
    min: Position,
    max: Position,
}

impl PlayField {
    /// Creates a play field from inclusive corner bounds.
    #[must_use]
    pub fn new(min: Position, max: Position) -> Self {
        Self {
            min: Position::new(min.x().min(max.x()), min.y().min(max.y())),
            max: Position::new(min.x().max(max.x()), min.y().max(max.y())),
        }
    }

    /// Play field spanning every pixel of the mask.
    #[must_use]
    pub fn covering(mask: &CollisionMask) -> Self {
        Self::new(
            Position::new(0.0, 0.0),
            Position::new(
                (mask.pixel_width() - 1.0).max(0.0),
                (mask.pixel_height() - 1.0).max(0.0),
            ),
        )
    }

    /// Clamps a point into the field.
    #[must_use]
    pub fn clamp(&self, point: Position) -> Position {
        Position::new(
            point.x().clamp(self.min.x(), self.max.x()),
            point.y().clamp(self.min.y(), self.max.y()),
        )
    }

    /// Reports whether the point lies inside the field.
    #[must_use]
    pub fn contains(&self, point: Position) -> bool {
        self.clamp(point) == point
    }
}

/// Static data describing one scene.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneLayout {
    /// Collision lookup of the scene.
    pub mask: CollisionMask,
    /// Bounds of the character's ground-contact point.
    pub play_field: PlayField,
    /// Origin used when the scene is entered without a routed spawn.
    pub default_spawn: Position,
    /// Character geometry and screen mapping inside the scene.
    pub tuning: SceneTuning,
}

/// Builds the layout of a built-in scene from the configured tile size and tuning.
///
/// A glyph table that fails to parse yields a sealed mask so the character
/// can never walk through undefined geometry.
#[must_use]
pub fn layout(scene: WorldId, config: &GameConfig) -> SceneLayout {
    let tile_size = config.tile_size;
    let (rows, default_spawn) = match scene {
        WorldId::City => (&CITY, Position::new(192.0, 256.0)),
        WorldId::Beach => (&BEACH, Position::new(200.0, 200.0)),
        WorldId::Forest => (&FOREST, Position::new(100.0, 100.0)),
        WorldId::ColorBlast => (&COLOR_BLAST, Position::new(144.0, 54.0)),
    };
    let mask = match CollisionMask::from_rows(rows, tile_size) {
        Ok(mask) => mask,
        Err(error) => {
            tracing::error!(%scene, %error, "scene mask rejected; sealing the scene");
            CollisionMask::sealed(rows.len() as u32, rows.len() as u32, tile_size.max(1.0))
        }
    };
    let play_field = PlayField::covering(&mask);
    SceneLayout {
        mask,
        play_field,
        default_spawn,
        tuning: config.tuning(scene),
    }
}
