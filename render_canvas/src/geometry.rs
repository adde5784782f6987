use std::fmt;

/// Board size in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardDims {
    pub width: u32,
    pub height: u32,
}

impl BoardDims {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.col < self.width && tile.row < self.height
    }
}

impl fmt::Display for BoardDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A tile position in game coordinates (row 0 at the bottom of the board).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub col: u32,
    pub row: u32,
}

impl TileCoord {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}
