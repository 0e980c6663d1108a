//! Grid coordinates in the `B3` wire form: row letter A–E, column 1–5.

use core::fmt;
use core::str::FromStr;

use crate::config::GRID_SIZE;

/// A single cell address on the defense grid. Row and column are
/// zero-based internally; the wire form is `<letter><digit>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    row: u8,
    col: u8,
}

impl Coord {
    /// Build a coordinate from zero-based indices. Returns `None` when
    /// either index falls outside the grid.
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if row < GRID_SIZE && col < GRID_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    /// Enumerate all grid cells in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..GRID_SIZE)
            .flat_map(|row| (0..GRID_SIZE).map(move |col| Coord { row, col }))
    }
}

/// Parse failure for a coordinate token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCoord;

impl fmt::Display for InvalidCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "coordinate is not a valid grid address")
    }
}

impl FromStr for Coord {
    type Err = InvalidCoord;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars.next().ok_or(InvalidCoord)?;
        let digit = chars.next().ok_or(InvalidCoord)?;
        if chars.next().is_some() {
            return Err(InvalidCoord);
        }
        let row = (letter as i32) - ('A' as i32);
        let col = (digit as i32) - ('1' as i32);
        if !(0..GRID_SIZE as i32).contains(&row) || !(0..GRID_SIZE as i32).contains(&col) {
            return Err(InvalidCoord);
        }
        Ok(Coord {
            row: row as u8,
            col: col as u8,
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.row) as char, self.col + 1)
    }
}
