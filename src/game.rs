//! Game state machine: placement, attack resolution, snapshots.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::board::{Board, ImpactMark};
use crate::common::PlaceError;
use crate::config::{ship_index, GRID_SIZE, NUM_SHIPS, SHIPS};
use crate::coord::Coord;

/// Phase of the defense exercise. Forward transitions only:
/// `Setup → Active` when the fleet completes, `Active → Defeated` when
/// every ship cell has been attacked. Replays require a full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Active,
    Defeated,
}

/// Verdict of one attack, in decision-list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// Final ship cell hit; the whole fleet is down.
    Sunk,
    /// Ship cell hit, fleet still afloat.
    Hit,
    /// Open water.
    Miss,
    /// Token does not address a grid cell.
    InvalidCoordinate,
    /// Coordinate was attacked before; nothing re-marked.
    AlreadyAttacked,
    /// Attack arrived while the fleet is still being placed.
    FleetNotPlaced,
    /// Attack arrived after the fleet was destroyed.
    FleetAlreadySunk,
}

/// Result of a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementReceipt {
    /// True exactly when this placement completed the fleet and the
    /// phase moved to `Active`.
    pub fleet_complete: bool,
}

/// Read-only state snapshot for display layers and the observer channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub phase: Phase,
    /// Cell address → occupying ship tag, `None` for open water.
    pub board: BTreeMap<String, Option<char>>,
    /// Cell address → impact mark glyph.
    pub impacts: BTreeMap<String, ImpactMark>,
    /// Ship name → whether it has coordinates assigned.
    pub ships_placed: BTreeMap<String, bool>,
}

impl fmt::Display for GameSnapshot {
    /// Textual board for log output: ship tags, `O` misses, `X` hits,
    /// `~` untouched water.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  1 2 3 4 5")?;
        for row in 0..GRID_SIZE {
            let letter = (b'A' + row) as char;
            write!(f, "{}", letter)?;
            for col in 0..GRID_SIZE {
                let key = format!("{}{}", letter, col + 1);
                let glyph = match self.impacts.get(&key) {
                    Some(ImpactMark::Water) | None => {
                        self.board.get(&key).copied().flatten().unwrap_or('~')
                    }
                    Some(mark) => mark.glyph(),
                };
                write!(f, " {}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Core engine holding the board, fleet placements, attack history and
/// phase. All mutation goes through `place` and `attack`; callers
/// serialize access (one mutex around the whole engine).
pub struct GameEngine {
    board: Board,
    placements: [Vec<Coord>; NUM_SHIPS],
    attacked: BTreeSet<Coord>,
    phase: Phase,
}

impl GameEngine {
    /// Fresh engine: empty board, no placements, phase `Setup`.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            placements: Default::default(),
            attacked: BTreeSet::new(),
            phase: Phase::Setup,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Place one ship. Checks run in a fixed order, each with its own
    /// rejection reason; a rejected placement leaves all state unchanged.
    /// Completing the roster is the one and only `Setup → Active` trigger.
    pub fn place(&mut self, ship_type: &str, coords: &[String]) -> Result<PlacementReceipt, PlaceError> {
        let idx = ship_index(ship_type).ok_or(PlaceError::UnknownShipType)?;
        if !self.placements[idx].is_empty() {
            return Err(PlaceError::ShipAlreadyPlaced);
        }

        let mut cells = Vec::with_capacity(coords.len());
        for token in coords {
            let coord: Coord = token
                .trim()
                .parse()
                .map_err(|_| PlaceError::OffBoard(token.clone()))?;
            cells.push(coord);
        }
        for cell in &cells {
            if self.board.occupant(*cell).is_some() {
                return Err(PlaceError::CellOccupied(cell.to_string()));
            }
        }

        let def = SHIPS[idx];
        if cells.len() != def.length() {
            return Err(PlaceError::WrongSize {
                expected: def.length(),
                got: cells.len(),
            });
        }
        if !is_contiguous_line(&mut cells) {
            return Err(PlaceError::NotContiguous);
        }

        for cell in &cells {
            self.board.set_occupant(*cell, def.tag());
        }
        self.placements[idx] = cells;

        let fleet_complete = self.placements.iter().all(|p| !p.is_empty());
        if fleet_complete && self.phase == Phase::Setup {
            self.phase = Phase::Active;
        }
        Ok(PlacementReceipt { fleet_complete })
    }

    /// Resolve one attack token. Ordered decision list; the first
    /// matching rule wins, independent of phase. Every attack that
    /// addresses a fresh grid cell lands in the history, even when the
    /// phase then rejects it.
    pub fn attack(&mut self, token: &str) -> AttackOutcome {
        let coord: Coord = match token.trim().parse() {
            Ok(c) => c,
            Err(_) => return AttackOutcome::InvalidCoordinate,
        };
        if self.attacked.contains(&coord) {
            return AttackOutcome::AlreadyAttacked;
        }
        self.attacked.insert(coord);

        match self.phase {
            Phase::Setup => AttackOutcome::FleetNotPlaced,
            Phase::Defeated => AttackOutcome::FleetAlreadySunk,
            Phase::Active => {
                if self.board.occupant(coord).is_some() {
                    self.board.set_impact(coord, ImpactMark::Hit);
                    if self.all_ships_sunk() {
                        self.phase = Phase::Defeated;
                        AttackOutcome::Sunk
                    } else {
                        AttackOutcome::Hit
                    }
                } else {
                    self.board.set_impact(coord, ImpactMark::Miss);
                    AttackOutcome::Miss
                }
            }
        }
    }

    /// Defeat condition: every ship's full coordinate set is contained
    /// in the attack history.
    fn all_ships_sunk(&self) -> bool {
        self.placements
            .iter()
            .all(|cells| cells.iter().all(|c| self.attacked.contains(c)))
    }

    /// Serializable snapshot of the full game state.
    pub fn snapshot(&self) -> GameSnapshot {
        let mut board = BTreeMap::new();
        let mut impacts = BTreeMap::new();
        for coord in Coord::all() {
            let key = coord.to_string();
            board.insert(key.clone(), self.board.occupant(coord));
            impacts.insert(key, self.board.impact(coord));
        }
        let ships_placed = SHIPS
            .iter()
            .enumerate()
            .map(|(i, def)| (def.name().to_string(), !self.placements[i].is_empty()))
            .collect();
        GameSnapshot {
            phase: self.phase,
            board,
            impacts,
            ships_placed,
        }
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        GameEngine::new()
    }
}

/// True when the cells form one straight line with step 1, in either
/// axis. Input order is irrelevant; the slice is sorted in place first.
fn is_contiguous_line(cells: &mut [Coord]) -> bool {
    cells.sort();
    let first = match cells.first() {
        Some(c) => *c,
        None => return false,
    };
    let same_row = cells.iter().all(|c| c.row() == first.row());
    let same_col = cells.iter().all(|c| c.col() == first.col());
    if same_row {
        cells.windows(2).all(|w| w[1].col() == w[0].col() + 1)
    } else if same_col {
        cells.windows(2).all(|w| w[1].row() == w[0].row() + 1)
    } else {
        false
    }
}
