use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Board dimensions must be positive")]
    InvalidDimensions,
    #[error("Coordinates are outside the board")]
    OutOfBounds,
    #[error("Precondition violated: {0}")]
    PreconditionViolation(Violation),
    #[error("Cannot place {requested} mines, only {eligible} cells are eligible")]
    UnsatisfiableMinePlacement {
        requested: CellCount,
        eligible: CellCount,
    },
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("board already has mines")]
    AlreadyMined,
    #[error("returning to the start state requires a new setup")]
    RequiresSetup,
    #[error("mine requested inside the seed safe zone")]
    MineInSafeZone,
}

impl From<Violation> for GameError {
    fn from(violation: Violation) -> Self {
        Self::PreconditionViolation(violation)
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
