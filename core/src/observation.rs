use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything an external observer may see of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub size: Coord2,
    pub state: GameState,
    pub flags: CellCount,
    pub cells_left: CellCount,
    pub mine_count: CellCount,
    pub cells: Array2<CellView>,
}

impl Observation {
    pub fn from_session<G: MineGenerator>(session: &GameSession<G>) -> Self {
        let size = session.size();
        let mut cells = Array2::from_elem(size.to_nd_index(), CellView::HIDDEN);
        for cell in session.grid().iter() {
            cells[cell.coords().to_nd_index()] = session.view_of(cell);
        }

        Self {
            size,
            state: session.state(),
            flags: session.flags(),
            cells_left: session.cells_left(),
            mine_count: session.mine_count(),
            cells,
        }
    }

    pub fn cell(&self, coords: Coord2) -> Option<CellView> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    pub fn count(&self, pred: impl Fn(&CellView) -> bool) -> CellCount {
        self.cells.iter().filter(|view| pred(view)).count() as CellCount
    }

    pub fn validate(&self) -> Result<()> {
        if self.cells.dim() != (usize::from(self.size.1), usize::from(self.size.0)) {
            return Err(GameError::InvalidDimensions);
        }
        Ok(())
    }
}
