//! Cross-board adjacency.
//!
//! Every board is walked outward through the portal graph, placing nearby boards in its own
//! frame. A cell then neighbors every cell of those placements whose rectangle touches it, on
//! top of its usual eight same-board neighbors.

use std::collections::VecDeque;

use hashbrown::HashSet;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Step {
    Start,
    Up(usize),
    Down(usize),
}

/// How a placement was reached. Routes only ever keep the direction they started with.
#[derive(Copy, Clone, Debug)]
struct Route {
    step: Step,
    depth: u32,
    info: BoardRectInfo,
}

impl Route {
    fn rejects(&self, up: bool) -> bool {
        match self.step {
            Step::Start => false,
            Step::Up(_) => !up,
            Step::Down(_) => up,
        }
    }
}

/// Placements of the boards around `board`, in `board`'s own frame, itself excluded.
fn neighbor_placements(
    graph: &PortalGraph,
    board: BoardIndex,
    limits: &TraversalLimits,
) -> Vec<BoardRectInfo> {
    let Some(start) = graph.local_info(board) else {
        return Vec::new();
    };

    let mut placements = Vec::new();
    let mut queue = VecDeque::from([Route {
        step: Step::Start,
        depth: 0,
        info: start,
    }]);

    while let Some(route) = queue.pop_front() {
        placements.push(route.info);
        if route.depth >= limits.neighbor_depth {
            continue;
        }

        if !route.rejects(false) {
            for (portal, info) in graph.children_of(route.info) {
                if placements.len() <= limits.neighbor_max_boards {
                    log::trace!("Board {}: down portal {} to {}", board, portal, info.board);
                    queue.push_back(Route {
                        step: Step::Down(portal),
                        depth: route.depth + 1,
                        info,
                    });
                }
            }
        }

        // placements reached through a clone never go up
        if !route.rejects(true) && !route.info.clone {
            for (portal, info) in graph.parents_of(route.info, true) {
                if placements.len() <= limits.neighbor_max_boards {
                    log::trace!("Board {}: up portal {} to {}", board, portal, info.board);
                    queue.push_back(Route {
                        step: Step::Up(portal),
                        depth: route.depth + 1,
                        info,
                    });
                }
            }
        }
    }

    // own adjacency is plain grid math
    placements.remove(0);
    placements
}

/// Cells of `info`'s board whose rectangle overlaps `probe`, both in the same frame.
fn colliding_cells<'a>(
    graph: &'a PortalGraph,
    info: &'a BoardRectInfo,
    probe: Rect,
) -> impl Iterator<Item = CellId> + 'a {
    let board = graph.board(info.board);
    let range = board
        .filter(|_| info.rect.overlaps(&probe))
        .map(|board| {
            // candidate range padded by one cell, the exact test below decides
            let cell_width = info.rect.width / board.width() as f32;
            let cell_height = info.rect.height / board.height() as f32;
            let span = |from: f32, to: f32, origin: f32, cell: f32, len: u32| {
                let first = ((from - origin) / cell).floor() as Coord - 1;
                let last = ((to - origin) / cell).ceil() as Coord + 1;
                first.max(0)..last.min(len as Coord)
            };
            (
                span(probe.x, probe.right(), info.rect.x, cell_width, board.width()),
                span(probe.y, probe.bottom(), info.rect.y, cell_height, board.height()),
            )
        });

    range
        .into_iter()
        .flat_map(|(xs, ys)| ys.flat_map(move |y| xs.clone().map(move |x| (x, y))))
        .filter(move |&pos| {
            board.is_some_and(|board| {
                board.get(pos).is_some() && board.cell_rect(pos, info.rect).overlaps(&probe)
            })
        })
        .map(|pos| CellId::from_pos(pos, info.board))
}

/// Fills in `neighbors` of every cell in the graph, replacing whatever was there.
///
/// Neighbor lists come out free of duplicates, never contain the cell itself and are symmetric.
/// Placements beyond the traversal caps are silently left out.
pub fn resolve_neighbors(graph: &mut PortalGraph, limits: &TraversalLimits) {
    let margin = limits.neighbor_probe_margin;
    let mut resolved = Vec::new();

    for board_index in 0..graph.boards().len() {
        let placements = neighbor_placements(graph, board_index, limits);
        log::debug!(
            "Board {} sees {} placements around it",
            board_index,
            placements.len()
        );
        let board = &graph.boards()[board_index];

        for pos in board.present_positions() {
            let id = CellId::from_pos(pos, board_index);
            let mut neighbors: Neighbors = board
                .iter_neighbors(pos)
                .map(|pos| CellId::from_pos(pos, board_index))
                .collect();

            let probe = Rect::new(
                pos.0 as f32 - margin,
                pos.1 as f32 - margin,
                1.0 + 2.0 * margin,
                1.0 + 2.0 * margin,
            );
            for info in &placements {
                for other in colliding_cells(graph, info, probe) {
                    if other != id && !neighbors.contains(&other) {
                        neighbors.push(other);
                    }
                }
            }
            resolved.push((id, neighbors));
        }
    }

    for (id, neighbors) in resolved {
        if let Some(cell) = graph.get_mut(id) {
            cell.neighbors = neighbors;
        }
    }

    repair_symmetry(graph);
}

/// Adds the missing half of every one-sided neighbor relation.
fn repair_symmetry(graph: &mut PortalGraph) {
    let links: Vec<(CellId, CellId)> = graph
        .cells()
        .flat_map(|(id, cell)| cell.neighbors.iter().map(move |&other| (id, other)))
        .collect();
    let known: HashSet<(CellId, CellId)> = links.iter().copied().collect();

    let mut repaired = 0usize;
    for &(id, other) in &links {
        if known.contains(&(other, id)) {
            continue;
        }
        if let Some(cell) = graph.get_mut(other) {
            if cell.add_neighbor(id) {
                repaired += 1;
            }
        }
    }
    if repaired > 0 {
        log::debug!("Repaired {} one-sided neighbor relations", repaired);
    }
}

/// Sets every cell's `number` to its count of mined neighbors.
///
/// Unless `force` is set, cells already carrying a non-zero number keep it, which is how
/// preset numbers such as level selection entries survive loading.
pub fn calculate_mine_numbers(graph: &mut PortalGraph, force: bool) {
    let numbers: Vec<(CellId, u32)> = graph
        .cells()
        .filter(|(_, cell)| force || cell.number == 0)
        .map(|(id, cell)| {
            let mines = cell
                .neighbors
                .iter()
                .filter(|&&other| graph.get(other).is_some_and(|other| other.mine))
                .count();
            (id, mines as u32)
        })
        .collect();

    for (id, number) in numbers {
        if let Some(cell) = graph.get_mut(id) {
            cell.number = number;
        }
    }
}
