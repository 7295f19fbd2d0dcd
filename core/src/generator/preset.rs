use alloc::vec::Vec;

use super::*;

/// Places a fixed layout, for replays and deterministic games.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresetMineGenerator {
    mines: Vec<Coord2>,
}

impl PresetMineGenerator {
    pub fn new(mines: impl IntoIterator<Item = Coord2>) -> Self {
        let mut mines: Vec<_> = mines.into_iter().collect();
        mines.sort_unstable();
        mines.dedup();
        Self { mines }
    }

    pub fn mines(&self) -> &[Coord2] {
        &self.mines
    }
}

impl MineGenerator for PresetMineGenerator {
    /// `mines` must match the preset layout size; the layout is what gets placed.
    fn place_mines(&mut self, grid: &mut Grid, mines: CellCount, seed: Coord2) -> Result<()> {
        let (zone, _) = prepare_placement(grid, seed)?;

        let indices = self
            .mines
            .iter()
            .map(|&coords| grid.index_of(coords))
            .collect::<Result<Vec<_>>>()?;
        if indices.iter().any(|index| zone.contains(index)) {
            return Err(Violation::MineInSafeZone.into());
        }
        if indices.len() != usize::from(mines) {
            log::warn!(
                "Preset layout has {} mines, {} were requested; using the preset",
                indices.len(),
                mines
            );
        }

        for index in indices {
            grid.at_index_mut(index).mine = true;
        }
        Ok(())
    }
}
