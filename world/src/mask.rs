//! Static per-scene collision lookup.

use tropical_trouble_core::{Position, TileCoord};

/// Mask code of a traversable tile.
pub const FREE_CODE: i32 = 0;
/// Mask code of a tile that routes to another scene.
pub const PORTAL_CODE: i32 = -1;
/// Mask code of a generic solid tile.
pub const WALL_CODE: i32 = 1;

/// Classification of a tile for movement purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileClass {
    /// The tile can be entered.
    Free,
    /// The tile stops movement.
    Blocked,
    /// The tile can be entered and routes to another scene.
    Portal,
}

/// Immutable row-major grid of tile codes.
///
/// Lookups never fail: anything outside the grid, any non-finite coordinate
/// and any code other than [`FREE_CODE`] or [`PORTAL_CODE`] classifies as
/// [`TileClass::Blocked`].
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionMask {
    columns: u32,
    rows: u32,
    tile_size: f32,
    cells: Vec<i32>,
}

impl CollisionMask {
    /// Builds a mask from a flat row-major code array.
    pub fn from_codes(
        columns: u32,
        rows: u32,
        tile_size: f32,
        cells: Vec<i32>,
    ) -> Result<Self, MaskError> {
        if columns == 0 || rows == 0 {
            return Err(MaskError::Empty);
        }
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(MaskError::InvalidTileSize(tile_size));
        }
        let expected = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| MaskError::Empty)?;
        if cells.len() != expected {
            return Err(MaskError::SizeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            columns,
            rows,
            tile_size,
            cells,
        })
    }

    /// Builds a mask from glyph rows.
    ///
    /// Legend: `.` free, `P` portal, `#` wall, `T` tree, `W` water.
    pub fn from_rows(rows: &[&str], tile_size: f32) -> Result<Self, MaskError> {
        let Some(first) = rows.first() else {
            return Err(MaskError::Empty);
        };
        let columns = first.chars().count();
        let mut cells = Vec::with_capacity(columns * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let width = row.chars().count();
            if width != columns {
                return Err(MaskError::RaggedRow {
                    row: row_index,
                    expected: columns,
                    actual: width,
                });
            }
            for (column_index, glyph) in row.chars().enumerate() {
                let code = match glyph {
                    '.' => FREE_CODE,
                    'P' => PORTAL_CODE,
                    '#' => WALL_CODE,
                    'T' => 2,
                    'W' => 3,
                    other => {
                        return Err(MaskError::UnknownGlyph {
                            glyph: other,
                            row: row_index,
                            column: column_index,
                        })
                    }
                };
                cells.push(code);
            }
        }
        let columns = u32::try_from(columns).map_err(|_| MaskError::Empty)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| MaskError::Empty)?;
        Self::from_codes(columns, row_count, tile_size, cells)
    }

    /// Builds a mask in which every tile is free.
    #[must_use]
    pub fn open(columns: u32, rows: u32, tile_size: f32) -> Self {
        Self::filled(columns, rows, tile_size, FREE_CODE)
    }

    /// Builds a mask in which every tile is blocked.
    #[must_use]
    pub fn sealed(columns: u32, rows: u32, tile_size: f32) -> Self {
        Self::filled(columns, rows, tile_size, WALL_CODE)
    }

    fn filled(columns: u32, rows: u32, tile_size: f32, code: i32) -> Self {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            tile_size,
            cells: vec![code; capacity],
        }
    }

    /// Classifies the tile containing the provided pixel.
    #[must_use]
    pub fn classify(&self, point: Position) -> TileClass {
        match self.tile_of(point) {
            Some(tile) => self.classify_tile(tile),
            None => TileClass::Blocked,
        }
    }

    /// Classifies a tile by its indices.
    #[must_use]
    pub fn classify_tile(&self, tile: TileCoord) -> TileClass {
        match self.code(tile) {
            Some(FREE_CODE) => TileClass::Free,
            Some(PORTAL_CODE) => TileClass::Portal,
            _ => TileClass::Blocked,
        }
    }

    /// Tile containing the provided pixel, whether or not it lies on the grid.
    #[must_use]
    pub fn tile_of(&self, point: Position) -> Option<TileCoord> {
        TileCoord::containing(point, self.tile_size)
    }

    /// Raw code stored for the tile, or `None` outside the grid.
    #[must_use]
    pub fn code(&self, tile: TileCoord) -> Option<i32> {
        self.index(tile)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a tile in world pixels.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Width of the grid in world pixels.
    #[must_use]
    pub fn pixel_width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Height of the grid in world pixels.
    #[must_use]
    pub fn pixel_height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Reports whether the pixel lies within `[0, width) x [0, height)`.
    #[must_use]
    pub fn contains_pixel(&self, point: Position) -> bool {
        point.x() >= 0.0
            && point.y() >= 0.0
            && point.x() < self.pixel_width()
            && point.y() < self.pixel_height()
    }

    /// Iterates over every tile whose code is [`PORTAL_CODE`].
    pub fn portal_tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let columns = self.columns as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, code)| **code == PORTAL_CODE)
            .map(move |(index, _)| TileCoord::new((index % columns) as i32, (index / columns) as i32))
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        let column = u32::try_from(tile.column()).ok()?;
        let row = u32::try_from(tile.row()).ok()?;
        if column < self.columns && row < self.rows {
            let row = usize::try_from(row).ok()?;
            let column = usize::try_from(column).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Reasons a collision mask asset is rejected.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MaskError {
    /// The grid has no tiles.
    #[error("collision mask must contain at least one tile")]
    Empty,
    /// The tile size is not a positive finite number.
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),
    /// The code array length does not match the grid dimensions.
    #[error("collision mask holds {actual} codes but the grid needs {expected}")]
    SizeMismatch {
        /// Number of codes implied by the dimensions.
        expected: usize,
        /// Number of codes supplied.
        actual: usize,
    },
    /// A glyph row is wider or narrower than the first row.
    #[error("row {row} has {actual} glyphs, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// A glyph has no code assigned.
    #[error("unknown glyph `{glyph}` at row {row}, column {column}")]
    UnknownGlyph {
        /// Offending glyph.
        glyph: char,
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> CollisionMask {
        CollisionMask::from_rows(&["#####", "P..#P", "#####"], 16.0).expect("valid mask")
    }

    #[test]
    fn codes_map_to_classes() {
        let mask = corridor();
        assert_eq!(mask.classify(Position::new(24.0, 24.0)), TileClass::Free);
        assert_eq!(mask.classify(Position::new(8.0, 24.0)), TileClass::Portal);
        assert_eq!(mask.classify(Position::new(56.0, 24.0)), TileClass::Blocked);
        assert_eq!(mask.classify(Position::new(24.0, 8.0)), TileClass::Blocked);
    }

    #[test]
    fn out_of_range_pixels_are_blocked() {
        let mask = CollisionMask::open(4, 3, 16.0);
        let outside = [
            Position::new(-0.01, 10.0),
            Position::new(10.0, -0.01),
            Position::new(64.0, 10.0),
            Position::new(10.0, 48.0),
            Position::new(1.0e9, 1.0e9),
            Position::new(f32::NAN, 10.0),
            Position::new(10.0, f32::INFINITY),
        ];
        for point in outside {
            assert_eq!(mask.classify(point), TileClass::Blocked, "{point:?}");
        }
        assert_eq!(mask.classify(Position::new(63.9, 47.9)), TileClass::Free);
    }

    #[test]
    fn positive_codes_of_any_type_block() {
        let mask = CollisionMask::from_codes(3, 1, 16.0, vec![7, 0, -2]).expect("valid mask");
        assert_eq!(mask.classify_tile(TileCoord::new(0, 0)), TileClass::Blocked);
        assert_eq!(mask.classify_tile(TileCoord::new(1, 0)), TileClass::Free);
        assert_eq!(mask.classify_tile(TileCoord::new(2, 0)), TileClass::Blocked);
    }

    #[test]
    fn malformed_assets_are_rejected() {
        assert_eq!(
            CollisionMask::from_codes(2, 2, 16.0, vec![0; 3]),
            Err(MaskError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            CollisionMask::from_rows(&["..", "."], 16.0),
            Err(MaskError::RaggedRow {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
        assert!(matches!(
            CollisionMask::from_rows(&[".x"], 16.0),
            Err(MaskError::UnknownGlyph { glyph: 'x', .. })
        ));
        assert_eq!(
            CollisionMask::from_codes(0, 2, 16.0, Vec::new()),
            Err(MaskError::Empty)
        );
    }

    #[test]
    fn portal_tiles_are_enumerated_row_major() {
        let tiles: Vec<_> = corridor().portal_tiles().collect();
        assert_eq!(tiles, vec![TileCoord::new(0, 1), TileCoord::new(4, 1)]);
    }
}
