use alloc::collections::VecDeque;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Board created, no mines placed yet.
    #[default]
    Start,
    Sweeping,
    Win,
    Lose,
}

impl GameState {
    pub const fn is_start(self) -> bool {
        matches!(self, Self::Start)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

/// One board and everything derived from it.
///
/// Counters are maintained incrementally so that the win check after each
/// cascade step stays constant time:
/// - `flags` is the number of flagged cells,
/// - `cells_left` is the number of hidden cells (forced to zero on a win),
/// - `flagged_mines` is the number of flagged cells holding a mine.
#[derive(Clone, Debug)]
pub struct GameSession<G = RandomMineGenerator> {
    config: GameConfig,
    generator: G,
    grid: Grid,
    state: GameState,
    flags: CellCount,
    cells_left: CellCount,
    mine_count: CellCount,
    flagged_mines: CellCount,
}

impl GameSession<RandomMineGenerator> {
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        Self::new(config, RandomMineGenerator::new(seed))
    }
}

impl<G: MineGenerator> GameSession<G> {
    pub fn new(config: GameConfig, generator: G) -> Result<Self> {
        let grid = Grid::new(config.size)?;
        Ok(Self {
            config,
            generator,
            cells_left: grid.total_cells(),
            grid,
            state: GameState::Start,
            flags: 0,
            mine_count: 0,
            flagged_mines: 0,
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.grid.size()
    }

    pub fn flags(&self) -> CellCount {
        self.flags
    }

    pub fn cells_left(&self) -> CellCount {
        self.cells_left
    }

    /// Zero until the board has been mined.
    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn mines_left(&self) -> isize {
        (self.mine_count as isize) - (self.flags as isize)
    }

    pub(crate) fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Replaces the board with a fresh one; the previous session survives a failure.
    pub fn setup(&mut self, width: Coord, height: Coord) -> Result<()> {
        let grid = Grid::new((width, height))?;
        self.config.size = (width, height);
        self.cells_left = grid.total_cells();
        self.grid = grid;
        self.state = GameState::Start;
        self.flags = 0;
        self.mine_count = 0;
        self.flagged_mines = 0;
        log::info!(
            "New {}x{} board, {} mines on first reveal",
            width,
            height,
            self.config.mines
        );
        Ok(())
    }

    pub fn restart(&mut self) -> Result<()> {
        let (width, height) = self.size();
        self.setup(width, height)
    }

    /// Takes effect at the next mine placement.
    pub fn set_target_mines(&mut self, mines: CellCount) {
        self.config.mines = mines;
    }

    pub fn cell_view(&self, coords: Coord2) -> Result<CellView> {
        let coords = self.grid.validate_coords(coords)?;
        Ok(self.view_of(&self.grid[coords]))
    }

    /// `None` while the cell is hidden.
    pub fn nearby_mine_count(&self, coords: Coord2) -> Result<Option<u8>> {
        Ok(self.cell_view(coords)?.nearby_mines)
    }

    pub fn observe(&self) -> Observation {
        Observation::from_session(self)
    }

    pub(crate) fn view_of(&self, cell: &Cell) -> CellView {
        let exposed = !cell.hidden || matches!(self.state, GameState::Lose);
        CellView {
            hidden: cell.hidden,
            flagged: cell.flagged,
            mine: exposed.then_some(cell.mine),
            nearby_mines: (!cell.hidden)
                .then(|| self.grid.count_neighbors(cell.coords(), |cell| cell.mine)),
        }
    }

    /// Reveals `coords`, mining the board first if this is the opening move.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.grid.validate_coords(coords)?;
        self.check_not_finished()?;

        if !self.grid[coords].is_revealable() {
            return Ok(RevealOutcome::NoChange);
        }

        if self.state.is_start() {
            self.mine_board(coords)?;
        }

        Ok(self.reveal_and_expand(coords))
    }

    fn mine_board(&mut self, seed: Coord2) -> Result<()> {
        self.generator
            .place_mines(&mut self.grid, self.config.mines, seed)?;
        self.recount_mines();
        self.transition(GameState::Sweeping);
        Ok(())
    }

    /// Breadth-first reveal from `start`. Zero cells open their hidden,
    /// unflagged neighbors; numbered cells and flags stop the spread.
    fn reveal_and_expand(&mut self, start: Coord2) -> RevealOutcome {
        let mut queue = VecDeque::from([start]);
        let mut revealed = 0usize;

        while let Some(coords) = queue.pop_front() {
            let cell = &mut self.grid[coords];
            if !cell.is_revealable() {
                continue;
            }

            cell.hidden = false;
            let has_mine = cell.mine;
            self.cells_left -= 1;
            revealed += 1;

            if has_mine {
                self.transition(GameState::Lose);
                return RevealOutcome::HitMine;
            }

            if self.evaluate() == GameState::Win {
                return RevealOutcome::Won;
            }

            if self.grid.count_neighbors(coords, |cell| cell.mine) == 0 {
                queue.extend(
                    self.grid
                        .iter_neighbors(coords)
                        .filter(|&pos| self.grid[pos].is_revealable()),
                );
            }
        }

        log::debug!("Revealed {} cells from {:?}", revealed, start);
        RevealOutcome::Revealed
    }

    /// Flags or unflags a hidden cell. Revealed cells are left alone.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.grid.validate_coords(coords)?;
        self.check_not_finished()?;

        let cell = &mut self.grid[coords];
        if !cell.hidden {
            return Ok(MarkOutcome::NoChange);
        }

        cell.flagged = !cell.flagged;
        let (flagged, has_mine) = (cell.flagged, cell.mine);
        if flagged {
            self.flags += 1;
            self.flagged_mines += CellCount::from(has_mine);
        } else {
            self.flags -= 1;
            self.flagged_mines -= CellCount::from(has_mine);
        }

        Ok(if self.evaluate() == GameState::Win {
            MarkOutcome::Won
        } else {
            MarkOutcome::Changed
        })
    }

    /// Declares a win once every mine carries a flag, no other cell does, and
    /// every remaining cell is revealed. Never declares a loss.
    pub fn evaluate(&mut self) -> GameState {
        if matches!(self.state, GameState::Sweeping) && self.is_cleared() {
            self.cells_left = 0;
            self.transition(GameState::Win);
        }
        self.state
    }

    fn is_cleared(&self) -> bool {
        // flags only sit on hidden cells, so `cells_left == flags` means
        // nothing is left hidden without a flag
        self.flags == self.mine_count
            && self.flagged_mines == self.mine_count
            && self.cells_left == self.flags
    }

    /// Opens every cell without cascading. Flags are dropped since revealed
    /// cells cannot carry one.
    pub fn reveal_all(&mut self) {
        for cell in self.grid.iter_mut() {
            cell.hidden = false;
            cell.flagged = false;
        }
        self.flags = 0;
        self.flagged_mines = 0;
        self.cells_left = 0;
    }

    pub fn hide_all(&mut self) {
        for cell in self.grid.iter_mut() {
            cell.hidden = true;
        }
        self.cells_left = self.grid.total_cells();
    }

    pub fn surrender(&mut self) -> Result<()> {
        self.check_not_finished()?;
        self.reveal_all();
        self.transition(GameState::Lose);
        Ok(())
    }

    /// Forces a state. `Start` is only reachable through [`Self::setup`], and
    /// a finished game stays finished until the next setup.
    pub fn set_state(&mut self, state: GameState) -> Result<()> {
        if state.is_start() {
            return Err(Violation::RequiresSetup.into());
        }
        if state == self.state {
            return Ok(());
        }
        self.check_not_finished()?;

        log::warn!("Forcing game state {:?} -> {:?}", self.state, state);
        if state == GameState::Win {
            self.cells_left = 0;
        }
        self.transition(state);
        Ok(())
    }

    /// Makes `mine_indices` the canonical mine layout while keeping every
    /// cell's hidden and flagged status. Callers re-run [`Self::evaluate`]
    /// if the outcome may have changed.
    pub fn reconcile(&mut self, mine_indices: &[CellIndex]) -> Result<()> {
        let total = usize::from(self.grid.total_cells());
        if mine_indices.iter().any(|&index| index >= total) {
            return Err(GameError::OutOfBounds);
        }

        let remote: HashSet<CellIndex> = mine_indices.iter().copied().collect();
        let mut moved = 0usize;
        for (index, cell) in self.grid.iter_mut().enumerate() {
            let has_mine = remote.contains(&index);
            if cell.mine != has_mine {
                cell.mine = has_mine;
                moved += 1;
            }
        }

        self.recount_mines();
        if self.state.is_start() && self.mine_count > 0 {
            self.transition(GameState::Sweeping);
        }
        log::debug!(
            "Reconciled {} remote mines, {} cells changed",
            self.mine_count,
            moved
        );
        Ok(())
    }

    fn recount_mines(&mut self) {
        self.mine_count = self.grid.mine_count();
        self.flagged_mines = self.grid.count_cells(|cell| cell.mine && cell.flagged);
    }

    fn transition(&mut self, next: GameState) {
        if self.state != next {
            log::info!("Game state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_terminal() {
            Err(Violation::AlreadyEnded.into())
        } else {
            Ok(())
        }
    }
}
