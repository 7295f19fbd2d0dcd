use serde::{Deserialize, Serialize};

use crate::*;

/// One board position and its ground truth.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: Coord,
    pub y: Coord,
    pub hidden: bool,
    pub flagged: bool,
    pub mine: bool,
}

impl Cell {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self {
            x,
            y,
            hidden: true,
            flagged: false,
            mine: false,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        (self.x, self.y)
    }

    /// Hidden and not flagged, i.e. still open to a reveal.
    pub const fn is_revealable(&self) -> bool {
        self.hidden && !self.flagged
    }
}

/// What an external observer is allowed to know about a cell.
///
/// `mine` is only populated for revealed cells, or for every cell once the
/// game is lost. `nearby_mines` is only populated for revealed cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub hidden: bool,
    pub flagged: bool,
    pub mine: Option<bool>,
    pub nearby_mines: Option<u8>,
}

impl CellView {
    pub const HIDDEN: Self = Self {
        hidden: true,
        flagged: false,
        mine: None,
        nearby_mines: None,
    };
}

impl Default for CellView {
    fn default() -> Self {
        Self::HIDDEN
    }
}
