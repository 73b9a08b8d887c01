use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// How many mines a freshly loaded level should end up with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineTargets {
    /// Indexed by board. Preset mines count toward a board's target.
    pub per_board: Vec<Option<u32>>,
    /// Spread over the boards without a target of their own, or over every board when all of
    /// them have one. Counts every mine already in the level.
    pub total: Option<u32>,
}

impl MineTargets {
    pub fn board(&self, board: BoardIndex) -> Option<u32> {
        self.per_board.get(board).copied().flatten()
    }
}

fn is_eligible(cell: &Cell) -> bool {
    cell.covered && !cell.safe && !cell.mine
}

/// Turns `count` cells picked uniformly among `eligible` into mines, returns how many it placed.
fn place_mines<R: Rng + ?Sized>(
    graph: &mut PortalGraph,
    mut eligible: Vec<CellId>,
    count: u32,
    rng: &mut R,
) -> u32 {
    let count = (count as usize).min(eligible.len());
    // partial Fisher-Yates, the first `count` slots end up as a uniform sample
    for i in 0..count {
        let j = rng.random_range(i..eligible.len());
        eligible.swap(i, j);
    }
    for &id in &eligible[..count] {
        if let Some(cell) = graph.get_mut(id) {
            cell.mine = true;
        }
    }
    count as u32
}

/// Adds random mines until every target in `targets` is met, returns the level's mine count.
///
/// Mines only go on covered cells not marked safe. Targets that cannot be met are logged and
/// filled as far as possible.
pub fn scatter_mines<R: Rng + ?Sized>(
    graph: &mut PortalGraph,
    targets: &MineTargets,
    rng: &mut R,
) -> u32 {
    for board_index in 0..graph.boards().len() {
        let Some(target) = targets.board(board_index) else {
            continue;
        };
        let board = &graph.boards()[board_index];
        let current = board.mine_count() as u32;
        if current >= target {
            continue;
        }

        let eligible: Vec<_> = board
            .cells()
            .filter(|(_, cell)| is_eligible(cell))
            .map(|(pos, _)| CellId::from_pos(pos, board_index))
            .collect();
        let placed = place_mines(graph, eligible, target - current, rng);
        if current + placed < target {
            log::warn!(
                "Board {} is out of room for mines, requested {} but only fits {}",
                board_index,
                target,
                current + placed
            );
        }
    }

    let current = graph.cells().filter(|(_, cell)| cell.mine).count() as u32;
    let Some(total) = targets.total else {
        return current;
    };
    if current >= total {
        return current;
    }

    let all_targeted = (0..graph.boards().len()).all(|board| targets.board(board).is_some());
    let eligible: Vec<_> = graph
        .cells()
        .filter(|(id, cell)| (all_targeted || targets.board(id.board).is_none()) && is_eligible(cell))
        .map(|(id, _)| id)
        .collect();
    let placed = place_mines(graph, eligible, total - current, rng);
    if current + placed < total {
        log::warn!(
            "Level is out of room for mines, requested {} but only fits {}",
            total,
            current + placed
        );
    }
    current + placed
}
