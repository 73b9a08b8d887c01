use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Placements of every board worth drawing this frame, breadth first from the root.
///
/// The root board always comes first at its own frame `(0, 0, width, height)`. Children are only
/// expanded while their on-screen size is above the visibility threshold, which is what stops
/// self-nesting boards from recursing forever, and the list never exceeds the board cap.
pub fn visible_boards(
    graph: &PortalGraph,
    root: BoardIndex,
    transform: &CoordTransform,
    limits: &TraversalLimits,
) -> Vec<BoardRectInfo> {
    let Some(root_info) = graph.local_info(root) else {
        return Vec::new();
    };
    let pixels_per_unit = transform.camera.zoom * transform.viewport.canvas.x;

    let mut cache = Vec::new();
    let mut queue = VecDeque::from([root_info]);
    while let Some(info) = queue.pop_front() {
        cache.push(info);

        for (_, child) in graph.children_of(info) {
            let size_on_screen = child.rect.width.max(child.rect.height) * pixels_per_unit;
            if size_on_screen > limits.visibility_threshold
                && cache.len() + queue.len() < limits.max_visible_boards
            {
                queue.push_back(child);
            }
        }
    }

    log::trace!("{} visible boards", cache.len());
    cache
}

/// The cell under a pointer given in device pixels, first placement in `cache` wins.
///
/// Pointers within `margin` (fraction of a cell) of a cell edge hit nothing.
pub fn hit_test(
    graph: &PortalGraph,
    cache: &[BoardRectInfo],
    transform: &CoordTransform,
    pointer: Vec2,
    margin: f32,
) -> Option<CellId> {
    let world = transform.pixel_to_world(pointer);

    cache.iter().find_map(|info| {
        let board = graph.board(info.board)?;
        let grid = Vec2::new(board.width() as f32, board.height() as f32);
        let local = (world - info.rect.position()) / info.rect.size() * grid;
        let whole = local.floor();
        let fract = local - whole;

        let in_margin = fract.x > margin
            && fract.x < 1.0 - margin
            && fract.y > margin
            && fract.y < 1.0 - margin;
        let pos = (whole.x as Coord, whole.y as Coord);
        (in_margin && board.get(pos).is_some()).then(|| CellId::from_pos(pos, info.board))
    })
}

/// Overlay marker for a board that can be reached through more than one portal.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CloneHint {
    pub board: BoardIndex,
    /// Placement in screen space.
    pub rect: Rect,
    /// Whether this placement was reached through a clone portal.
    pub clone: bool,
    /// 0..1, fades out both for tiny boards and for boards that fill the screen.
    pub opacity: f32,
}

fn smoothstep(num: f32, edge0: f32, edge1: f32) -> f32 {
    let t = ((num - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Clone hints for every cached placement of a board with clones.
pub fn clone_hints<'a>(
    graph: &'a PortalGraph,
    cache: &'a [BoardRectInfo],
    transform: &'a CoordTransform,
) -> impl Iterator<Item = CloneHint> + 'a {
    let screen = transform.viewport.screen_rect();
    let inverse_aspect_ratio = transform.viewport.inverse_aspect_ratio();

    cache
        .iter()
        .filter(|info| graph.board(info.board).is_some_and(Board::has_clones))
        .map(move |info| {
            let rect = transform.world_to_screen_rect(info.rect);
            let coverage = rect.clipped_area(&screen) / inverse_aspect_ratio;
            let opacity = if coverage < 0.5 {
                smoothstep(coverage, 0.000_04, 0.000_4)
            } else {
                smoothstep(coverage, 0.95, 0.8)
            };
            CloneHint {
                board: info.board,
                rect,
                clone: info.clone,
                opacity,
            }
        })
}
