use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::CellId;

/// Adjacency list of a cell. Most cells only have their eight same-board neighbors.
pub type Neighbors = SmallVec<[CellId; 8]>;

/// One playable slot of a board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub covered: bool,
    /// Only used while placing mines, keeps mines away from this cell.
    pub safe: bool,
    pub mine: bool,
    /// Count of neighboring mines. Level selection boards store level numbers here instead.
    pub number: u32,
    pub flagged: bool,
    pub question_mark: bool,

    // interaction state, never game logic
    pub highlighted: bool,
    pub pressed: bool,
    pub chord: bool,

    pub neighbors: Neighbors,
}

impl Cell {
    pub fn mine() -> Self {
        Self {
            mine: true,
            ..Default::default()
        }
    }

    pub fn safe() -> Self {
        Self {
            safe: true,
            ..Default::default()
        }
    }

    /// Already uncovered cell, optionally carrying a preset number.
    pub fn open(number: u32) -> Self {
        Self {
            covered: false,
            number,
            ..Default::default()
        }
    }

    pub const fn is_marked(&self) -> bool {
        self.flagged || self.question_mark
    }

    pub(crate) fn add_neighbor(&mut self, id: CellId) -> bool {
        if self.neighbors.contains(&id) {
            false
        } else {
            self.neighbors.push(id);
            true
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            covered: true,
            safe: false,
            mine: false,
            number: 0,
            flagged: false,
            question_mark: false,
            highlighted: false,
            pressed: false,
            chord: false,
            neighbors: Neighbors::new(),
        }
    }
}
