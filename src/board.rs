//! Passive board state: cell occupancy and impact marks.
//!
//! The board does no validation of its own. Occupancy is written by the
//! placement path during setup and read-only afterwards; impact marks are
//! written by attack resolution only.

use serde::Serialize;

use crate::config::GRID_SIZE;
use crate::coord::Coord;

const N: usize = GRID_SIZE as usize;

/// Per-cell attack marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImpactMark {
    #[serde(rename = "~")]
    Water,
    #[serde(rename = "O")]
    Miss,
    #[serde(rename = "X")]
    Hit,
}

impl ImpactMark {
    /// Single-character rendering used in snapshots and board printouts.
    pub fn glyph(&self) -> char {
        match self {
            ImpactMark::Water => '~',
            ImpactMark::Miss => 'O',
            ImpactMark::Hit => 'X',
        }
    }
}

/// The 5×5 defense grid: ship tags and impact marks per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    occupancy: [[Option<char>; N]; N],
    impacts: [[ImpactMark; N]; N],
}

impl Board {
    /// Create an empty board: no ships, all cells water.
    pub fn new() -> Self {
        Board {
            occupancy: [[None; N]; N],
            impacts: [[ImpactMark::Water; N]; N],
        }
    }

    /// Ship tag occupying `coord`, if any.
    pub fn occupant(&self, coord: Coord) -> Option<char> {
        self.occupancy[coord.row() as usize][coord.col() as usize]
    }

    /// Write a ship tag into `coord`. Callers check occupancy first.
    pub fn set_occupant(&mut self, coord: Coord, tag: char) {
        self.occupancy[coord.row() as usize][coord.col() as usize] = Some(tag);
    }

    /// Impact mark at `coord`.
    pub fn impact(&self, coord: Coord) -> ImpactMark {
        self.impacts[coord.row() as usize][coord.col() as usize]
    }

    /// Write an impact mark at `coord`. Callers guarantee the cell has
    /// not been marked before.
    pub fn set_impact(&mut self, coord: Coord, mark: ImpactMark) {
        self.impacts[coord.row() as usize][coord.col() as usize] = mark;
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
