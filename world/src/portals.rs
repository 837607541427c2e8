//! Static routing table from portal tiles to destination scenes.

use std::ops::RangeInclusive;

use tropical_trouble_core::{Position, TileCoord, WorldId};

/// How the destination spawn is derived from the exit coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnAnchor {
    /// Spawn at a fixed origin regardless of the exit.
    Fixed(Position),
    /// Spawn at the given x while keeping the exit's y.
    KeepY {
        /// Horizontal origin inside the destination scene.
        x: f32,
    },
    /// Spawn at the given y while keeping the exit's x.
    KeepX {
        /// Vertical origin inside the destination scene.
        y: f32,
    },
}

impl SpawnAnchor {
    /// Resolves the destination spawn for a character that exited at `exit`.
    #[must_use]
    pub fn resolve(self, exit: Position) -> Position {
        match self {
            Self::Fixed(position) => position,
            Self::KeepY { x } => Position::new(x, exit.y()),
            Self::KeepX { y } => Position::new(exit.x(), y),
        }
    }
}

/// Destination reached through a portal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortalRoute {
    /// Scene the portal leads to.
    pub destination: WorldId,
    /// Rule deriving the spawn origin inside the destination.
    pub spawn: SpawnAnchor,
}

/// Resolved scene switch produced by a portal hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// Scene that becomes active.
    pub destination: WorldId,
    /// Origin of the character inside the destination.
    pub spawn: Position,
}

#[derive(Clone, Debug, PartialEq)]
struct PortalEntry {
    world: WorldId,
    row: i32,
    columns: RangeInclusive<i32>,
    route: PortalRoute,
}

/// Registry mapping `(scene, tile row, column range)` to destinations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortalRegistry {
    entries: Vec<PortalEntry>,
}

impl PortalRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routing table of the built-in scenes.
    ///
    /// Edge portals on row 17 carry the exit's y so the character keeps its
    /// lane; spawns land one tile inside the opposite edge of the destination.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(
            WorldId::City,
            17,
            0..=0,
            PortalRoute {
                destination: WorldId::Beach,
                spawn: SpawnAnchor::KeepY { x: 280.0 },
            },
        );
        registry.register(
            WorldId::City,
            17,
            19..=19,
            PortalRoute {
                destination: WorldId::Forest,
                spawn: SpawnAnchor::KeepY { x: 8.0 },
            },
        );
        registry.register(
            WorldId::City,
            3,
            10..=10,
            PortalRoute {
                destination: WorldId::ColorBlast,
                spawn: SpawnAnchor::Fixed(Position::new(144.0, 54.0)),
            },
        );
        registry.register(
            WorldId::Beach,
            17,
            19..=19,
            PortalRoute {
                destination: WorldId::City,
                spawn: SpawnAnchor::KeepY { x: 8.0 },
            },
        );
        registry.register(
            WorldId::Forest,
            17,
            0..=0,
            PortalRoute {
                destination: WorldId::City,
                spawn: SpawnAnchor::KeepY { x: 280.0 },
            },
        );
        registry.register(
            WorldId::ColorBlast,
            1,
            10..=10,
            PortalRoute {
                destination: WorldId::City,
                spawn: SpawnAnchor::Fixed(Position::new(152.0, 54.0)),
            },
        );
        registry
    }

    /// Registers a route for the tiles `columns` of `row` inside `world`.
    ///
    /// Earlier registrations win when ranges overlap.
    pub fn register(
        &mut self,
        world: WorldId,
        row: i32,
        columns: RangeInclusive<i32>,
        route: PortalRoute,
    ) {
        self.entries.push(PortalEntry {
            world,
            row,
            columns,
            route,
        });
    }

    /// Route registered for the tile, if any.
    #[must_use]
    pub fn route(&self, world: WorldId, tile: TileCoord) -> Option<PortalRoute> {
        self.entries
            .iter()
            .find(|entry| {
                entry.world == world
                    && entry.row == tile.row()
                    && entry.columns.contains(&tile.column())
            })
            .map(|entry| entry.route)
    }

    /// Resolves the scene switch for a character entering `tile` at `exit`.
    #[must_use]
    pub fn route_if_portal(
        &self,
        world: WorldId,
        tile: TileCoord,
        exit: Position,
    ) -> Option<Transition> {
        self.route(world, tile).map(|route| Transition {
            destination: route.destination,
            spawn: route.spawn.resolve(exit),
        })
    }

    /// Every tile registered for `world`, expanded from the column ranges.
    pub fn tiles_for(&self, world: WorldId) -> impl Iterator<Item = TileCoord> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.world == world)
            .flat_map(|entry| {
                let row = entry.row;
                entry
                    .columns
                    .clone()
                    .map(move |column| TileCoord::new(column, row))
            })
    }
}
