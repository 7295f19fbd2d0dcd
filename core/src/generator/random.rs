use alloc::vec::Vec;

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementStrategy {
    /// Rejection sampling unless more than half of the eligible cells must be mined.
    #[default]
    Auto,
    Rejection,
    Shuffle,
}

/// Uniform random placement around a guaranteed-safe seed zone.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
    strategy: PlacementStrategy,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self::with_strategy(seed, PlacementStrategy::Auto)
    }

    pub fn with_strategy(seed: u64, strategy: PlacementStrategy) -> Self {
        use rand::prelude::*;

        Self {
            rng: SmallRng::seed_from_u64(seed),
            strategy,
        }
    }

    pub fn strategy(&self) -> PlacementStrategy {
        self.strategy
    }

    fn resolve_strategy(&self, mines: CellCount, eligible: CellCount) -> PlacementStrategy {
        use PlacementStrategy::*;

        match self.strategy {
            Auto if u32::from(mines) * 2 > u32::from(eligible) => Shuffle,
            Auto => Rejection,
            explicit => explicit,
        }
    }

    fn place_by_rejection(&mut self, grid: &mut Grid, mines: CellCount, zone: &SafeZone) {
        use rand::prelude::*;

        let total = usize::from(grid.total_cells());
        let mut placed = 0;
        while placed < mines {
            let index: CellIndex = self.rng.random_range(0..total);
            if zone.contains(&index) {
                continue;
            }

            let cell = grid.at_index_mut(index);
            if !cell.mine {
                cell.mine = true;
                placed += 1;
            }
        }
    }

    fn place_by_shuffle(&mut self, grid: &mut Grid, mines: CellCount, zone: &SafeZone) {
        use rand::prelude::*;

        let mut eligible: Vec<CellIndex> = (0..usize::from(grid.total_cells()))
            .filter(|index| !zone.contains(index))
            .collect();

        // partial Fisher-Yates, only the first `mines` slots are drawn
        let mines = usize::from(mines);
        for slot in 0..mines {
            let pick = self.rng.random_range(slot..eligible.len());
            eligible.swap(slot, pick);
        }

        for &index in &eligible[..mines] {
            grid.at_index_mut(index).mine = true;
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn place_mines(&mut self, grid: &mut Grid, mines: CellCount, seed: Coord2) -> Result<()> {
        let (zone, eligible) = prepare_placement(grid, seed)?;
        check_satisfiable(mines, eligible)?;

        let strategy = self.resolve_strategy(mines, eligible);
        log::debug!(
            "Placing {} mines among {} eligible cells around {:?} using {:?}",
            mines,
            eligible,
            seed,
            strategy
        );

        match strategy {
            PlacementStrategy::Shuffle => self.place_by_shuffle(grid, mines, &zone),
            _ => self.place_by_rejection(grid, mines, &zone),
        }

        Ok(())
    }
}
