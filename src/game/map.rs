use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::error::LevelError;
use crate::game::fixed_math::{FixedNum, FixedVec2};

/// Plain walkable floor.
pub const TILE_FLOOR: u8 = 0;
/// The only blocking tile id. Any other id is walkable and only matters to renderers.
pub const TILE_BLOCKED: u8 = 1;

/// Default edge length of one tile in world pixels.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// Static tile occupancy for a loaded level.
///
/// Tiles are stored row-major. Anything outside the grid counts as blocked, so
/// callers never need a separate bounds check before asking about walkability.
/// The grid is immutable once a level is loaded; a new grid means a new level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTileGrid")]
pub struct TileGrid {
    cols: usize,
    rows: usize,
    tiles: Vec<u8>,
    tile_size: FixedNum,
}

/// Unchecked serde shape of [`TileGrid`]; deserialization goes through
/// [`TileGrid::new`] so a stored grid gets the same validation as a built one.
#[derive(Deserialize)]
struct RawTileGrid {
    cols: usize,
    rows: usize,
    tiles: Vec<u8>,
    tile_size: FixedNum,
}

impl TryFrom<RawTileGrid> for TileGrid {
    type Error = LevelError;

    fn try_from(raw: RawTileGrid) -> Result<Self, Self::Error> {
        TileGrid::new(raw.cols, raw.rows, raw.tiles)?.with_tile_size(raw.tile_size)
    }
}

impl TileGrid {
    pub fn new(cols: usize, rows: usize, tiles: Vec<u8>) -> Result<Self, LevelError> {
        if cols == 0 || rows == 0 {
            return Err(LevelError::EmptyGrid);
        }
        if tiles.len() != cols * rows {
            return Err(LevelError::TileCountMismatch { cols, rows, found: tiles.len() });
        }
        Ok(Self {
            cols,
            rows,
            tiles,
            tile_size: FixedNum::from_num(DEFAULT_TILE_SIZE),
        })
    }

    /// Build from nested rows (`rows[row][col]`). Rows must all be the same length.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, LevelError> {
        let expected = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(LevelError::RaggedGrid { row, expected, found: cells.len() });
            }
            tiles.extend_from_slice(cells);
        }
        Self::new(expected, rows.len(), tiles)
    }

    /// Build from ASCII art: `#` is a wall, anything else is floor.
    pub fn from_ascii(lines: &[&str]) -> Result<Self, LevelError> {
        let rows: Vec<Vec<u8>> = lines
            .iter()
            .map(|line| {
                line.chars()
                    .map(|c| if c == '#' { TILE_BLOCKED } else { TILE_FLOOR })
                    .collect()
            })
            .collect();
        Self::from_rows(&rows)
    }

    /// A fully walkable grid.
    pub fn open(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            tiles: vec![TILE_FLOOR; cols * rows],
            tile_size: FixedNum::from_num(DEFAULT_TILE_SIZE),
        }
    }

    /// Scatter walls with probability `wall_chance` per tile. Same seed, same grid.
    pub fn random(cols: usize, rows: usize, wall_chance: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let chance = wall_chance.clamp(0.0, 1.0);
        let tiles = (0..cols * rows)
            .map(|_| if rng.random_bool(chance) { TILE_BLOCKED } else { TILE_FLOOR })
            .collect();
        Self {
            cols,
            rows,
            tiles,
            tile_size: FixedNum::from_num(DEFAULT_TILE_SIZE),
        }
    }

    pub fn with_tile_size(mut self, tile_size: FixedNum) -> Result<Self, LevelError> {
        if tile_size <= FixedNum::ZERO {
            return Err(LevelError::InvalidTileSize);
        }
        self.tile_size = tile_size;
        Ok(self)
    }

    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }
    pub fn tile_size(&self) -> FixedNum { self.tile_size }
    pub fn tiles(&self) -> &[u8] { &self.tiles }

    pub fn width_px(&self) -> FixedNum {
        FixedNum::from_num(self.cols) * self.tile_size
    }

    pub fn height_px(&self) -> FixedNum {
        FixedNum::from_num(self.rows) * self.tile_size
    }

    #[inline]
    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// Tile id at a cell, `None` outside the grid.
    #[inline]
    pub fn tile(&self, row: isize, col: isize) -> Option<u8> {
        if !self.in_bounds(row, col) {
            return None;
        }
        Some(self.tiles[row as usize * self.cols + col as usize])
    }

    #[inline]
    pub fn is_walkable(&self, row: isize, col: isize) -> bool {
        matches!(self.tile(row, col), Some(id) if id != TILE_BLOCKED)
    }

    pub fn free_cell_count(&self) -> usize {
        self.tiles.iter().filter(|&&t| t != TILE_BLOCKED).count()
    }

    /// Tile coordinates `(row, col)` containing a world point, possibly out of bounds.
    #[inline]
    pub fn cell_coords(&self, pos: FixedVec2) -> (isize, isize) {
        let col = (pos.x / self.tile_size).floor().to_num::<i64>() as isize;
        let row = (pos.y / self.tile_size).floor().to_num::<i64>() as isize;
        (row, col)
    }

    /// Tile coordinates for a world point, `None` when it lies outside the grid.
    #[inline]
    pub fn cell_of(&self, pos: FixedVec2) -> Option<(usize, usize)> {
        let (row, col) = self.cell_coords(pos);
        if self.in_bounds(row, col) {
            Some((row as usize, col as usize))
        } else {
            None
        }
    }

    #[inline]
    pub fn is_pixel_walkable(&self, pos: FixedVec2) -> bool {
        let (row, col) = self.cell_coords(pos);
        self.is_walkable(row, col)
    }

    /// World position of a tile's centre.
    pub fn tile_center(&self, row: usize, col: usize) -> FixedVec2 {
        let half = self.tile_size / FixedNum::from_num(2);
        FixedVec2::new(
            FixedNum::from_num(col) * self.tile_size + half,
            FixedNum::from_num(row) * self.tile_size + half,
        )
    }
}
