use crate::ship::ShipDef;

pub const GRID_SIZE: u8 = 5;
pub const NUM_SHIPS: usize = 3;
pub const SHIPS: [ShipDef; NUM_SHIPS] = [
    ShipDef::new("submarino", 2),
    ShipDef::new("acorazado", 3),
    ShipDef::new("destructor", 1),
];

/// Total number of ship cells in the standard roster.
pub const TOTAL_SHIP_CELLS: usize = 2 + 3 + 1;

/// Look up a roster index by ship name. Returns `None` for unknown names.
pub fn ship_index(name: &str) -> Option<usize> {
    SHIPS.iter().position(|def| def.name() == name)
}
