//! Picks which board acts as the world origin.
//!
//! World coordinates are always relative to the root board, so zooming deep into a child
//! would otherwise push the camera zoom and position far outside float precision. Whenever
//! the camera leaves the root, or a child covers the view, the root is moved along a portal
//! and the camera is rescaled into the new board's frame.

use crate::*;

/// Runs root changes until none applies or the per-frame cap is hit.
///
/// Returns whether the root board changed.
pub fn change_root(
    graph: &PortalGraph,
    root: &mut BoardIndex,
    transform: &mut CoordTransform,
    config: &CoreConfig,
) -> bool {
    let mut changed = false;
    for _ in 0..config.limits.max_root_changes {
        if !change_root_once(graph, root, transform, config) {
            break;
        }
        changed = true;
    }
    changed
}

/// Applies at most one promotion chain or one demotion.
pub fn change_root_once(
    graph: &PortalGraph,
    root: &mut BoardIndex,
    transform: &mut CoordTransform,
    config: &CoreConfig,
) -> bool {
    let Some(root_info) = graph.local_info(*root) else {
        log::warn!("Root board {} does not exist", root);
        return false;
    };
    let camera_rect = transform.camera_world_rect();
    let root_clipped = root_info.rect.clipped_area(&camera_rect);

    if !root_info.rect.contains_rect(&camera_rect) {
        if let Some(chain) = promotion_chain(graph, root_info, camera_rect, root_clipped, config) {
            apply_promotion(graph, &chain, root, transform);
            return true;
        }
    }

    try_demotion(graph, root_info, camera_rect, root_clipped, root, transform, config)
}

/// Walks up through non-clone parents until one shows more of the camera than the root does.
///
/// A single step up does not always increase the overlap in nested layouts, so the walk keeps
/// collecting portals up to the promotion depth. It stops as soon as a board has anything but
/// exactly one non-clone parent.
fn promotion_chain(
    graph: &PortalGraph,
    root_info: BoardRectInfo,
    camera_rect: Rect,
    root_clipped: f32,
    config: &CoreConfig,
) -> Option<Vec<usize>> {
    let limits = &config.limits;
    let mut chain = Vec::new();
    let mut current = root_info;

    while (chain.len() as u32) < limits.max_promotion_depth {
        let mut parents = graph.parents_of(current, true);
        let (Some((portal, parent)), None) = (parents.next(), parents.next()) else {
            return None;
        };
        chain.push(portal);

        let parent_clipped = parent.rect.clipped_area(&camera_rect);
        if parent_clipped > root_clipped + limits.promotion_tolerance {
            return Some(chain);
        }
        current = parent;
    }
    None
}

fn apply_promotion(
    graph: &PortalGraph,
    chain: &[usize],
    root: &mut BoardIndex,
    transform: &mut CoordTransform,
) {
    let camera = &mut transform.camera;
    for &portal_index in chain {
        let portal = &graph.portals()[portal_index];
        let child_width = graph.boards()[portal.to].width() as f32;
        let scale = child_width / portal.width as f32;
        camera.position = camera.position / scale + portal.position();
        camera.zoom *= scale;
        log::debug!("Root board {} -> {} (up)", root, portal.from);
        *root = portal.from;
    }
}

/// Moves the root into a child that covers the camera, or shows at least as much as the root.
fn try_demotion(
    graph: &PortalGraph,
    root_info: BoardRectInfo,
    camera_rect: Rect,
    root_clipped: f32,
    root: &mut BoardIndex,
    transform: &mut CoordTransform,
    config: &CoreConfig,
) -> bool {
    for (portal_index, child) in graph.children_of(root_info) {
        if !child.rect.overlaps(&camera_rect) {
            continue;
        }

        let child_clipped = child.rect.clipped_area(&camera_rect);
        // ties go down, promotion needs a strict gain, otherwise two boards would take turns
        if !child.rect.contains_rect(&camera_rect) && child_clipped < root_clipped {
            continue;
        }

        let portal = &graph.portals()[portal_index];
        let scale = graph.boards()[child.board].width() as f32 / portal.width as f32;
        let camera = &mut transform.camera;
        if camera.zoom / scale < config.camera.zoom_min {
            continue;
        }

        camera.position = (camera.position - portal.position()) * scale;
        camera.zoom /= scale;
        log::debug!("Root board {} -> {} (down)", root, child.board);
        *root = child.board;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    /// 8x8 board with a 4x4 board inside its 2x2 region at (3, 3).
    fn nested() -> PortalGraph {
        PortalGraph::new(
            vec![Board::new(8, 8), Board::new(4, 4)],
            vec![Portal::new(0, 1, (3, 3), (2, 2))],
        )
        .unwrap()
    }

    fn square_transform(position: Vec2, zoom: f32) -> CoordTransform {
        CoordTransform::new(Camera { position, zoom }, Viewport::new(100.0, 100.0))
    }

    #[test]
    fn stays_when_view_inside_root_without_covering_child() {
        let graph = nested();
        let mut root = 0;
        let mut t = square_transform(Vec2::new(1.5, 1.5), 1.0 / 2.0);

        assert!(!change_root(&graph, &mut root, &mut t, &CoreConfig::default()));
        assert_eq!(root, 0);
    }

    #[test]
    fn demotes_when_child_covers_view() {
        let graph = nested();
        let mut root = 0;
        // view is the 1x1 world square around (4, 4), inside the child region (3..5)
        let mut t = square_transform(Vec2::new(4.0, 4.0), 1.0);

        assert!(change_root(&graph, &mut root, &mut t, &CoreConfig::default()));

        assert_eq!(root, 1);
        // one parent cell is two child cells
        assert_eq!(t.camera.position, Vec2::new(2.0, 2.0));
        assert_eq!(t.camera.zoom, 0.5);
    }

    #[test]
    fn promotes_when_view_leaves_root() {
        let graph = nested();
        let mut root = 1;
        // the whole 4x4 child plus a margin
        let mut t = square_transform(Vec2::new(2.0, 2.0), 1.0 / 8.0);

        assert!(change_root(&graph, &mut root, &mut t, &CoreConfig::default()));

        assert_eq!(root, 0);
        assert_eq!(t.camera.position, Vec2::new(4.0, 4.0));
        assert_eq!(t.camera.zoom, 1.0 / 4.0);
    }

    #[test]
    fn promotion_and_demotion_roundtrip() {
        let graph = nested();
        let config = CoreConfig::default();
        let mut root = 0;
        let start = square_transform(Vec2::new(4.0, 4.0), 1.0);
        let mut t = start;

        change_root(&graph, &mut root, &mut t, &config);
        assert_eq!(root, 1);

        // zoom out in the child frame until the view leaves the child
        t.camera.zoom /= 8.0;
        change_root(&graph, &mut root, &mut t, &config);
        assert_eq!(root, 0);
        assert_eq!(t.camera.position, start.camera.position);
        assert_eq!(t.camera.zoom, start.camera.zoom / 8.0);
    }

    #[test]
    fn demotion_respects_zoom_min() {
        let graph = nested();
        let mut root = 0;
        let mut t = square_transform(Vec2::new(4.0, 4.0), 1.0);
        let mut config = CoreConfig::default();
        config.camera.zoom_min = 0.75;

        assert!(!change_root(&graph, &mut root, &mut t, &config));
        assert_eq!(root, 0);
    }

    #[test]
    fn fixed_camera_is_stable() {
        let graph = nested();
        let config = CoreConfig::default();
        let mut root = 0;
        let mut t = square_transform(Vec2::new(4.0, 3.8), 0.9);

        assert!(change_root(&graph, &mut root, &mut t, &config));
        assert_eq!(root, 1);
        let settled = (root, t);
        for _ in 0..16 {
            assert!(!change_root(&graph, &mut root, &mut t, &config));
            assert_eq!((root, t), settled);
        }
    }

    #[test]
    fn promotion_walks_past_boards_that_do_not_help() {
        // a 1x1 board whose parent region exactly matches it, nested twice
        let graph = PortalGraph::new(
            vec![Board::new(3, 3), Board::new(1, 1), Board::new(1, 1)],
            vec![
                Portal::new(0, 1, (1, 1), (1, 1)),
                Portal::new(1, 2, (0, 0), (1, 1)),
            ],
        )
        .unwrap();
        let mut root = 2;
        let mut t = square_transform(Vec2::new(0.5, 0.5), 1.0 / 3.0);

        assert!(change_root_once(&graph, &mut root, &mut t, &CoreConfig::default()));

        assert_eq!(root, 0);
        assert_eq!(t.camera.position, Vec2::new(1.5, 1.5));
        assert_eq!(t.camera.zoom, 1.0 / 3.0);
    }
}
