use thiserror::Error;

use crate::{BoardIndex, CellId};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("Board index {0} does not exist")]
    InvalidBoard(BoardIndex),
    #[error("Board {0} has no area")]
    EmptyBoard(BoardIndex),
    #[error("Board cell count does not match declared size")]
    CellCountMismatch,
    #[error("Portal {0} does not fit inside its parent board")]
    PortalOutOfBounds(usize),
    #[error("No cell at {0:?}")]
    InvalidCell(CellId),
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, LevelError>;
