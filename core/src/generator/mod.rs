use smallvec::SmallVec;

use crate::*;
pub use preset::*;
pub use random::*;

mod preset;
mod random;

/// Places mines on a fresh grid once the seed cell is known.
pub trait MineGenerator {
    /// Mines exactly `mines` cells outside the safe zone of `seed`.
    ///
    /// On error the grid is left untouched.
    fn place_mines(&mut self, grid: &mut Grid, mines: CellCount, seed: Coord2) -> Result<()>;
}

/// The seed cell followed by its in-bounds neighbors.
pub type SafeZone = SmallVec<[CellIndex; 9]>;

pub fn safe_zone(grid: &Grid, seed: Coord2) -> Result<SafeZone> {
    let mut zone = SafeZone::new();
    zone.push(grid.index_of(seed)?);
    zone.extend(grid.neighbors_of(seed)?);
    Ok(zone)
}

/// Checks everything a placement needs before any cell is touched and returns
/// the safe zone together with the number of eligible cells.
pub(crate) fn prepare_placement(grid: &Grid, seed: Coord2) -> Result<(SafeZone, CellCount)> {
    let zone = safe_zone(grid, seed)?;

    if grid.iter().any(|cell| cell.mine) {
        return Err(Violation::AlreadyMined.into());
    }

    let eligible = grid.total_cells() - zone.len() as CellCount;
    Ok((zone, eligible))
}

/// Random placement needs at least one eligible cell left over.
pub(crate) fn check_satisfiable(mines: CellCount, eligible: CellCount) -> Result<()> {
    if mines >= eligible {
        return Err(GameError::UnsatisfiableMinePlacement {
            requested: mines,
            eligible,
        });
    }
    Ok(())
}
