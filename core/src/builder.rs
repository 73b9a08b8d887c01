use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::*;

/// Camera spot the main menu opens on, in root board cells.
const MAIN_MENU_CAMERA: Camera = Camera {
    position: Vec2::new(4.0, 4.5),
    zoom: 1.0 / 3.0,
};

/// Assembles a ready-to-play [`Level`] from parsed level data.
///
/// Board `0` becomes the initial root. Everything the frontend parsed out of a level file goes in
/// here, and [`LevelBuilder::build`] takes care of mines, adjacency and the starting camera.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelBuilder {
    boards: Vec<Board>,
    portals: Vec<Portal>,
    targets: MineTargets,
    seed: u64,
    config: CoreConfig,
    kind: LevelKind,
    completed_levels: u32,
    viewport: Viewport,
}

impl Default for LevelBuilder {
    fn default() -> Self {
        Self {
            boards: Vec::new(),
            portals: Vec::new(),
            targets: MineTargets::default(),
            seed: 0,
            config: CoreConfig::default(),
            kind: LevelKind::Puzzle(0),
            completed_levels: 0,
            viewport: Viewport::default(),
        }
    }
}

impl LevelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a board that keeps only its preset mines, unless a total target says otherwise.
    pub fn board(mut self, board: Board) -> Self {
        self.boards.push(board);
        self.targets.per_board.push(None);
        self
    }

    /// Adds a board that is topped up with random mines until it holds `mines`.
    pub fn board_with_mines(mut self, board: Board, mines: u32) -> Self {
        self.boards.push(board);
        self.targets.per_board.push(Some(mines));
        self
    }

    pub fn portal(mut self, portal: Portal) -> Self {
        self.portals.push(portal);
        self
    }

    pub fn portals(mut self, portals: impl IntoIterator<Item = Portal>) -> Self {
        self.portals.extend(portals);
        self
    }

    /// Mine count for the whole level, also what the mine counter starts at.
    pub fn total_mines(mut self, mines: u32) -> Self {
        self.targets.total = Some(mines);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn kind(mut self, kind: LevelKind) -> Self {
        self.kind = kind;
        self
    }

    /// Highest puzzle cleared so far, only used by level selection.
    pub fn completed_levels(mut self, completed_levels: u32) -> Self {
        self.completed_levels = completed_levels;
        self
    }

    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn build(self) -> Result<Level> {
        let Self {
            boards,
            portals,
            targets,
            seed,
            config,
            kind,
            completed_levels,
            viewport,
        } = self;

        if boards.is_empty() {
            return Err(LevelError::InvalidBoard(0));
        }
        let mut graph = PortalGraph::new(boards, portals)?;
        let mut rng = SmallRng::seed_from_u64(seed);

        let mine_count = scatter_mines(&mut graph, &targets, &mut rng);
        resolve_neighbors(&mut graph, &config.limits);
        calculate_mine_numbers(&mut graph, false);
        if kind == LevelKind::LevelSelection {
            lock_levels(&mut graph, completed_levels);
        }

        let camera = match kind {
            LevelKind::MainMenu => MAIN_MENU_CAMERA,
            _ => {
                let root = &graph.boards()[0];
                Camera {
                    position: root.local_rect().size() / 2.0,
                    zoom: (0.5 / root.width() as f32)
                        .clamp(config.camera.zoom_min, config.camera.zoom_max),
                }
            }
        };
        log::debug!(
            "Built {:?} with {} boards, {} portals and {} mines",
            kind,
            graph.boards().len(),
            graph.portals().len(),
            mine_count
        );

        let mut level = Level {
            graph,
            root_board: 0,
            transform: CoordTransform::new(camera, viewport),
            controller: CameraController::new(),
            board_rect_cache: Vec::new(),
            mouse_over: None,
            mouse_over_last_frame: None,
            state: GameState::Gaming,
            reported_state: GameState::Gaming,
            started: false,
            mines_left: targets.total.unwrap_or(mine_count) as i32,
            time: 0.0,
            kind,
            config,
            rng,
            win_check_needed: false,
            resized: false,
            drag_distance: Vec2::ZERO,
        };
        change_root(
            &level.graph,
            &mut level.root_board,
            &mut level.transform,
            &level.config,
        );
        level.update_board_rect_cache();
        Ok(level)
    }
}

/// Covers level entries more than one past the last completed level.
fn lock_levels(graph: &mut PortalGraph, completed_levels: u32) {
    for (_, cell) in graph.cells_mut() {
        if cell.number > completed_levels.saturating_add(1) {
            cell.covered = true;
        }
    }
}
