use std::collections::{BTreeSet, VecDeque};

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::TestCaseResult;
use sweep_core::*;

#[derive(Clone, Debug)]
struct Board {
    size: Coord2,
    seed: Coord2,
    mines: BTreeSet<CellIndex>,
}

impl Board {
    fn grid(&self) -> Grid {
        Grid::new(self.size).unwrap()
    }

    fn coords(&self, index: CellIndex) -> Coord2 {
        self.grid().coords_of(index).unwrap()
    }

    fn safe_zone(&self) -> BTreeSet<CellIndex> {
        safe_zone(&self.grid(), self.seed).unwrap().into_iter().collect()
    }

    fn session(&self) -> GameSession<PresetMineGenerator> {
        let config = GameConfig::new(self.size, self.mines.len() as CellCount).unwrap();
        let generator = PresetMineGenerator::new(self.mines.iter().map(|&i| self.coords(i)));
        GameSession::new(config, generator).unwrap()
    }

    fn nearby(&self, index: CellIndex) -> usize {
        let grid = self.grid();
        grid.neighbors_of(self.coords(index))
            .unwrap()
            .iter()
            .filter(|&&n| self.mines.contains(&n))
            .count()
    }

    fn total(&self) -> CellIndex {
        usize::from(self.size.0) * usize::from(self.size.1)
    }
}

/// A board whose mines never touch the seed's safe zone, plus a random mask
/// over all cells for tests that need one.
fn board() -> impl Strategy<Value = (Board, Vec<bool>)> {
    (2u8..12, 2u8..12)
        .prop_flat_map(|(w, h)| {
            let total = usize::from(w) * usize::from(h);
            (
                Just((w, h)),
                (0..w, 0..h),
                vec(prop::bool::weighted(0.2), total),
                vec(any::<bool>(), total),
            )
        })
        .prop_map(|(size, seed, mine_mask, mask)| {
            let mut board = Board {
                size,
                seed,
                mines: BTreeSet::new(),
            };
            let zone = board.safe_zone();
            board.mines = mine_mask
                .iter()
                .enumerate()
                .filter(|&(i, &mine)| mine && !zone.contains(&i))
                .map(|(i, _)| i)
                .collect();
            (board, mask)
        })
}

fn assert_counters(obs: &Observation) -> TestCaseResult {
    prop_assert_eq!(obs.flags, obs.count(|view| view.flagged));
    if obs.state != GameState::Win {
        prop_assert_eq!(obs.cells_left, obs.count(|view| view.hidden));
    }
    prop_assert_eq!(obs.count(|view| view.flagged && !view.hidden), 0);
    Ok(())
}

#[derive(Clone, Debug)]
enum Action {
    Reveal(u8, u8),
    Flag(u8, u8),
    Reconcile(Vec<u8>),
    RevealAll,
    HideAll,
    Surrender,
    Force(GameState),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0u8..12, 0u8..12).prop_map(|(x, y)| Action::Reveal(x, y)),
        3 => (0u8..12, 0u8..12).prop_map(|(x, y)| Action::Flag(x, y)),
        1 => vec(any::<u8>(), 0..8).prop_map(Action::Reconcile),
        1 => Just(Action::RevealAll),
        1 => Just(Action::HideAll),
        1 => Just(Action::Surrender),
        1 => prop_oneof![
            Just(GameState::Start),
            Just(GameState::Sweeping),
            Just(GameState::Win),
            Just(GameState::Lose),
        ]
        .prop_map(Action::Force),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn counters_match_grid_after_every_action(
        size in (1u8..12, 1u8..12),
        mines in 0u16..40,
        seed in any::<u64>(),
        actions in vec(action(), 1..60),
    ) {
        let config = GameConfig::new(size, mines).unwrap();
        let mut session = GameSession::with_seed(config, seed).unwrap();
        let total = usize::from(config.total_cells());

        for action in actions {
            let finished = session.is_finished();
            match action {
                Action::Reveal(x, y) => {
                    session.reveal((x, y)).ok();
                }
                Action::Flag(x, y) => {
                    session.toggle_flag((x, y)).ok();
                }
                Action::Reconcile(indices) => {
                    let indices: Vec<_> = indices.iter().map(|&i| usize::from(i) % total).collect();
                    session.reconcile(&indices).unwrap();
                    session.evaluate();
                }
                Action::RevealAll => session.reveal_all(),
                Action::HideAll => session.hide_all(),
                Action::Surrender => {
                    session.surrender().ok();
                }
                Action::Force(state) => {
                    session.set_state(state).ok();
                }
            }
            if finished {
                prop_assert!(session.is_finished());
            }
            assert_counters(&session.observe())?;
        }
    }

    #[test]
    fn seed_zone_is_never_mined(
        size in (1u8..20, 1u8..20),
        seed_pos in (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
        density in 0.0f64..1.0,
        rng_seed in any::<u64>(),
    ) {
        let seed = (
            seed_pos.0.index(usize::from(size.0)) as Coord,
            seed_pos.1.index(usize::from(size.1)) as Coord,
        );
        let grid = Grid::new(size).unwrap();
        let zone = safe_zone(&grid, seed).unwrap();
        let eligible = grid.total_cells() - zone.len() as CellCount;
        prop_assume!(eligible > 0);
        let mines = (f64::from(eligible) * density) as CellCount;

        let mut session = GameSession::with_seed(GameConfig::new(size, mines).unwrap(), rng_seed).unwrap();
        let outcome = session.reveal(seed).unwrap();
        prop_assert_ne!(outcome, RevealOutcome::HitMine);
        prop_assert_eq!(session.mine_count(), mines);

        session.reveal_all();
        let obs = session.observe();
        prop_assert_eq!(obs.count(|view| view.mine == Some(true)), mines);
        for index in zone {
            let coords = grid.coords_of(index).unwrap();
            prop_assert_eq!(obs.cell(coords).unwrap().mine, Some(false));
        }
    }

    #[test]
    fn revealing_a_mine_always_loses((board, mask) in board()) {
        prop_assume!(!board.mines.is_empty());
        let mut session = board.session();
        session.reveal(board.seed).unwrap();

        let target = board.mines.iter().copied().nth(mask.iter().filter(|&&b| b).count() % board.mines.len());
        let coords = board.coords(target.unwrap());

        prop_assert_eq!(session.reveal(coords).unwrap(), RevealOutcome::HitMine);
        prop_assert_eq!(session.state(), GameState::Lose);
        assert_counters(&session.observe())?;
    }

    #[test]
    fn win_iff_flags_match_mines((board, mask) in board(), wrong_flags in vec(any::<bool>(), 144)) {
        let mut session = board.session();
        let seed_index = board.grid().index_of(board.seed).unwrap();

        // wrong flags go down before the first move, on safe cells other than the seed
        let mut wrong = BTreeSet::new();
        for index in 0..board.total() {
            if index != seed_index && !board.mines.contains(&index) && wrong_flags[index] {
                session.toggle_flag(board.coords(index)).unwrap();
                wrong.insert(index);
            }
        }

        session.reveal(board.seed).unwrap();
        for index in 0..board.total() {
            if !board.mines.contains(&index) && !session.is_finished() {
                session.reveal(board.coords(index)).unwrap();
            }
        }

        let mut flagged_mines = BTreeSet::new();
        for &index in &board.mines {
            if mask[index] && !session.is_finished() {
                session.toggle_flag(board.coords(index)).unwrap();
                flagged_mines.insert(index);
            }
        }

        let expect_win = wrong.is_empty() && flagged_mines == board.mines;
        prop_assert_eq!(session.state() == GameState::Win, expect_win);
        prop_assert_ne!(session.state(), GameState::Lose);
        if expect_win {
            prop_assert_eq!(session.cells_left(), 0);
        }
    }

    #[test]
    fn cascade_reveals_exactly_the_flag_bounded_region((board, mask) in board()) {
        let mut session = board.session();
        let grid = board.grid();
        let seed_index = grid.index_of(board.seed).unwrap();

        let mut flags = BTreeSet::new();
        for index in 0..board.total() {
            if index != seed_index && mask[index] && (index % 3 == 0) {
                session.toggle_flag(board.coords(index)).unwrap();
                flags.insert(index);
            }
        }

        session.reveal(board.seed).unwrap();

        let mut expected = BTreeSet::from([seed_index]);
        let mut queue = VecDeque::from([seed_index]);
        while let Some(index) = queue.pop_front() {
            if board.nearby(index) > 0 {
                continue;
            }
            for &n in grid.neighbors_of(board.coords(index)).unwrap().iter() {
                if !flags.contains(&n) && expected.insert(n) {
                    queue.push_back(n);
                }
            }
        }

        let obs = session.observe();
        for index in 0..board.total() {
            let view = obs.cell(board.coords(index)).unwrap();
            prop_assert_eq!(!view.hidden, expected.contains(&index), "cell {}", index);
        }
        prop_assert!(expected.is_disjoint(&board.mines));
    }

    #[test]
    fn reconcile_round_trip((board, mask) in board()) {
        let mut session = board.session();
        session.reveal(board.seed).unwrap();
        for index in 0..board.total() {
            if mask[index] && !session.is_finished() {
                session.toggle_flag(board.coords(index)).ok();
            }
        }
        prop_assume!(!session.is_finished());

        let before = session.observe();
        let own: Vec<_> = board.mines.iter().copied().collect();
        session.reconcile(&own).unwrap();
        prop_assert_eq!(session.observe(), before.clone());

        let disjoint: Vec<_> = (0..board.total()).filter(|i| !board.mines.contains(i)).collect();
        session.reconcile(&disjoint).unwrap();
        let after = session.observe();
        prop_assert_eq!(after.mine_count as usize, disjoint.len());
        for index in 0..board.total() {
            let coords = board.coords(index);
            let (old, new) = (before.cell(coords).unwrap(), after.cell(coords).unwrap());
            prop_assert_eq!((old.hidden, old.flagged), (new.hidden, new.flagged));
        }
        assert_counters(&after)?;
    }
}

#[test]
fn ten_by_ten_corner_seed_places_twenty_mines() {
    for seed in 0..50 {
        let mut session = GameSession::with_seed(GameConfig::default(), seed).unwrap();
        session.reveal((0, 0)).unwrap();
        assert_eq!(session.mine_count(), 20);

        session.reveal_all();
        let obs = session.observe();
        assert_eq!(obs.count(|view| view.mine == Some(true)), 20);
        for coords in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(obs.cell(coords).unwrap().mine, Some(false), "seed {seed}");
        }
    }
}

#[test]
fn flagging_every_mine_after_full_reveal_wins() {
    let mines = [(9, 9), (5, 0), (0, 7), (6, 6)];
    let config = GameConfig::new((10, 10), mines.len() as CellCount).unwrap();
    let mut session = GameSession::new(config, PresetMineGenerator::new(mines)).unwrap();

    for y in 0..10 {
        for x in 0..10 {
            if !mines.contains(&(x, y)) {
                session.reveal((x, y)).unwrap();
            }
        }
    }
    assert_eq!(session.state(), GameState::Sweeping);
    assert_eq!(session.cells_left(), 4);

    let outcomes: Vec<_> = mines
        .iter()
        .map(|&coords| session.toggle_flag(coords).unwrap())
        .collect();

    assert_eq!(outcomes.last(), Some(&MarkOutcome::Won));
    assert_eq!(session.state(), GameState::Win);
    assert_eq!(session.cells_left(), 0);
}

#[test]
fn zero_cell_on_mine_free_board_opens_everything() {
    let config = GameConfig::new((12, 7), 0).unwrap();
    let mut session = GameSession::with_seed(config, 3).unwrap();

    assert_eq!(session.reveal((5, 3)).unwrap(), RevealOutcome::Won);
    assert_eq!(session.observe().count(|view| view.hidden), 0);
}
