use std::collections::VecDeque;
use std::ops::BitOr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Gaming,
    Lost,
    Won,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
        }
    }
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

impl Level {
    /// Uncovers a cell, flooding through zero cells.
    ///
    /// The first open of a level never hits a mine: a mine under it is moved elsewhere first.
    pub fn open(&mut self, id: CellId) -> Result<RevealOutcome> {
        let cell = self.cell_checked(id)?;
        if cell.flagged || !cell.covered {
            return Ok(RevealOutcome::NoChange);
        }
        self.check_gaming()?;
        Ok(self.open_cell(id))
    }

    /// Opens every neighbor of an uncovered cell once enough of them are flagged.
    pub fn chord(&mut self, id: CellId) -> Result<RevealOutcome> {
        let cell = self.cell_checked(id)?;
        if cell.covered {
            return Ok(RevealOutcome::NoChange);
        }
        self.check_gaming()?;
        Ok(self.chord_cell(id))
    }

    /// Steps a covered cell through unmarked, flagged, question mark and back.
    pub fn cycle_marking(&mut self, id: CellId) -> Result<MarkOutcome> {
        let cell = self.cell_checked(id)?;
        if !cell.covered {
            return Ok(MarkOutcome::NoChange);
        }
        self.check_gaming()?;
        Ok(self.cycle_cell(id))
    }

    /// Moves the level to [`GameState::Won`] once every safe cell is uncovered.
    ///
    /// Returns whether the level is won. Finished levels are left alone.
    pub fn check_game_won(&mut self) -> bool {
        self.win_check_needed = false;
        if self.state.is_finished() {
            return self.state == GameState::Won;
        }

        let cleared = self
            .graph
            .cells()
            .all(|(_, cell)| !cell.covered || cell.mine);
        if cleared {
            log::debug!("Level won after {:.1}s", self.time);
            self.mines_left = 0;
            self.state = GameState::Won;
        }
        cleared
    }

    fn cell_checked(&self, id: CellId) -> Result<&Cell> {
        self.graph.get(id).ok_or(LevelError::InvalidCell(id))
    }

    fn check_gaming(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(LevelError::AlreadyEnded)
        } else {
            Ok(())
        }
    }

    fn count_flagged_neighbors(&self, id: CellId) -> u32 {
        self.graph.get(id).map_or(0, |cell| {
            cell.neighbors
                .iter()
                .filter(|&&neighbor| self.graph.get(neighbor).is_some_and(|n| n.flagged))
                .count() as u32
        })
    }

    pub(crate) fn chord_cell(&mut self, id: CellId) -> RevealOutcome {
        let flags = self.count_flagged_neighbors(id);
        let Some(cell) = self.graph.get(id) else {
            return RevealOutcome::NoChange;
        };
        if cell.covered || flags != cell.number {
            return RevealOutcome::NoChange;
        }

        let neighbors = cell.neighbors.clone();
        neighbors
            .into_iter()
            .map(|neighbor| self.open_cell(neighbor))
            .reduce(BitOr::bitor)
            .unwrap_or(RevealOutcome::NoChange)
    }

    pub(crate) fn cycle_cell(&mut self, id: CellId) -> MarkOutcome {
        let Some(cell) = self.graph.get_mut(id) else {
            return MarkOutcome::NoChange;
        };
        if !cell.covered {
            return MarkOutcome::NoChange;
        }

        if cell.flagged {
            cell.flagged = false;
            cell.question_mark = true;
            self.mines_left += 1;
        } else if cell.question_mark {
            cell.question_mark = false;
        } else {
            cell.flagged = true;
            self.mines_left -= 1;
        }
        MarkOutcome::Changed
    }

    pub(crate) fn open_cell(&mut self, id: CellId) -> RevealOutcome {
        use RevealOutcome::*;

        let Some(cell) = self.graph.get(id) else {
            return NoChange;
        };
        if cell.flagged || !cell.covered {
            return NoChange;
        }
        if cell.mine && !self.started {
            self.relocate_mine(id);
        }
        self.started = true;

        let mut outcome = NoChange;
        let mut to_visit = VecDeque::from([id]);
        while let Some(visit) = to_visit.pop_front() {
            let Some(cell) = self.graph.get_mut(visit) else {
                continue;
            };
            // already uncovered cells are skipped, so each cell is processed once
            if cell.flagged || !cell.covered {
                continue;
            }
            cell.covered = false;
            cell.question_mark = false;

            if cell.mine {
                log::debug!("Mine hit at {:?}", visit);
                self.state = GameState::Lost;
                return HitMine;
            }
            outcome = Revealed;
            self.win_check_needed = true;

            if cell.number == 0 {
                to_visit.extend(cell.neighbors.iter().copied());
            }
        }
        outcome
    }

    /// Moves the mine at `id` to a random free cell, preferring `id`'s own board.
    fn relocate_mine(&mut self, id: CellId) {
        let free_cells = |board: Option<BoardIndex>| -> Vec<CellId> {
            self.graph
                .cells()
                .filter(|(other, cell)| {
                    board.is_none_or(|board| other.board == board)
                        && cell.covered
                        && !cell.safe
                        && !cell.mine
                })
                .map(|(other, _)| other)
                .collect()
        };

        let mut candidates = free_cells(Some(id.board));
        if candidates.is_empty() {
            log::warn!(
                "No room on board {} to move the first-click mine, trying every board",
                id.board
            );
            candidates = free_cells(None);
        }
        if candidates.is_empty() {
            log::warn!("No room anywhere to move the first-click mine at {:?}", id);
            return;
        }

        let target = candidates[self.rng.random_range(0..candidates.len())];
        if let Some(cell) = self.graph.get_mut(id) {
            cell.mine = false;
        }
        if let Some(cell) = self.graph.get_mut(target) {
            cell.mine = true;
        }
        log::debug!("First-click mine moved from {:?} to {:?}", id, target);
        calculate_mine_numbers(&mut self.graph, true);
    }
}
