//! Common engine types: placement rejections.

use core::fmt;

/// Reasons a ship placement is rejected. The engine checks these in
/// order and leaves all state untouched on rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceError {
    /// Ship name not found in the roster.
    UnknownShipType,
    /// This ship type already has coordinates assigned.
    ShipAlreadyPlaced,
    /// A coordinate token is not a valid grid address.
    OffBoard(String),
    /// A coordinate is already occupied by another ship.
    CellOccupied(String),
    /// Coordinate count does not match the ship's fixed size.
    WrongSize { expected: usize, got: usize },
    /// Coordinates do not form one contiguous straight line.
    NotContiguous,
}

impl fmt::Display for PlaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceError::UnknownShipType => write!(f, "Ship type not in the roster"),
            PlaceError::ShipAlreadyPlaced => write!(f, "Ship type already has a placement"),
            PlaceError::OffBoard(c) => write!(f, "Coordinate {} is not on the grid", c),
            PlaceError::CellOccupied(c) => write!(f, "Coordinate {} is already occupied", c),
            PlaceError::WrongSize { expected, got } => {
                write!(f, "Placement needs {} coordinates, got {}", expected, got)
            }
            PlaceError::NotContiguous => {
                write!(f, "Coordinates do not form a contiguous straight line")
            }
        }
    }
}

impl std::error::Error for PlaceError {}
