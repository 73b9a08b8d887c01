use glam::Vec2;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelKind {
    /// Slowly zooms out on its own and ignores clicks.
    MainMenu,
    /// Uncovered numbered cells are entries for the level of that number.
    LevelSelection,
    Puzzle(u32),
}

/// Things that happened during a tick that the caller has to act on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelEvent {
    /// A puzzle was just cleared, worth persisting.
    Won { level: u32 },
    Lost,
    SelectLevel(u32),
    /// The player asked for a fresh copy of a finished level.
    RestartRequested,
}

pub type LevelEvents = SmallVec<[LevelEvent; 2]>;

/// Screen point the main menu drifts away from.
const MAIN_MENU_ANCHOR: Vec2 = Vec2::new(2.0 / 3.0, 0.5);
const MAIN_MENU_DRIFT: f32 = 0.1;

/// One loaded level: boards, portals, camera and game progress.
///
/// Built by [`LevelBuilder`], advanced by [`Level::tick`] and thrown away on reload.
#[derive(Clone, Debug)]
pub struct Level {
    pub(crate) graph: PortalGraph,
    pub(crate) root_board: BoardIndex,
    pub(crate) transform: CoordTransform,
    pub(crate) controller: CameraController,
    pub(crate) board_rect_cache: Vec<BoardRectInfo>,
    pub(crate) mouse_over: Option<CellId>,
    pub(crate) mouse_over_last_frame: Option<CellId>,
    pub(crate) state: GameState,
    /// Last state announced through [`LevelEvent`]s.
    pub(crate) reported_state: GameState,
    pub(crate) started: bool,
    pub(crate) mines_left: i32,
    pub(crate) time: f32,
    pub(crate) kind: LevelKind,
    pub(crate) config: CoreConfig,
    pub(crate) rng: SmallRng,
    pub(crate) win_check_needed: bool,
    pub(crate) resized: bool,
    /// Screen-space pointer travel while a button is held.
    pub(crate) drag_distance: Vec2,
}

impl Level {
    pub fn graph(&self) -> &PortalGraph {
        &self.graph
    }

    pub fn boards(&self) -> &[Board] {
        self.graph.boards()
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.graph.get(id)
    }

    pub fn root_board(&self) -> BoardIndex {
        self.root_board
    }

    pub fn transform(&self) -> &CoordTransform {
        &self.transform
    }

    /// Board placements to draw this frame, back to front.
    pub fn visible_boards(&self) -> &[BoardRectInfo] {
        &self.board_rect_cache
    }

    pub fn clone_hints(&self) -> impl Iterator<Item = CloneHint> + '_ {
        clone_hints(&self.graph, &self.board_rect_cache, &self.transform)
    }

    pub fn mouse_over(&self) -> Option<CellId> {
        self.mouse_over
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Mines minus flags, negative when over-flagged.
    pub fn mines_left(&self) -> i32 {
        self.mines_left
    }

    /// Seconds played, counting from the first open until the game ends.
    pub fn elapsed(&self) -> f32 {
        self.time
    }

    pub fn kind(&self) -> LevelKind {
        self.kind
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.transform.viewport != viewport {
            self.transform.viewport = viewport;
            self.resized = true;
        }
    }

    /// Advances the level by one frame of `dt` seconds.
    ///
    /// A win or loss is reported once, on the tick that first sees it, including ones caused by
    /// [`Level::open`] or [`Level::chord`] between ticks.
    pub fn tick(&mut self, input: &FrameInput, dt: f32) -> LevelEvents {
        let mut events = LevelEvents::new();

        let mut moved = self
            .controller
            .update(&mut self.transform, input, dt, &self.config.camera);
        if self.kind == LevelKind::MainMenu {
            self.drift_main_menu(dt);
            moved = true;
        }

        if self.started && self.state == GameState::Gaming {
            self.time += dt;
        }

        if moved || self.resized {
            change_root(
                &self.graph,
                &mut self.root_board,
                &mut self.transform,
                &self.config,
            );
            self.resized = false;
        }
        self.update_board_rect_cache();

        self.set_highlight(false);
        if self.kind != LevelKind::MainMenu {
            self.update_mouse_over(input);
            if self.state == GameState::Gaming {
                self.set_highlight(true);
            }
            self.handle_mouse_input(input, &mut events);

            if self.win_check_needed {
                self.check_game_won();
            }
            if self.state.is_finished() && input.restart {
                events.push(LevelEvent::RestartRequested);
            }
        }

        if self.reported_state != self.state {
            self.reported_state = self.state;
            match (self.state, self.kind) {
                (GameState::Won, LevelKind::Puzzle(level)) => {
                    events.push(LevelEvent::Won { level })
                }
                (GameState::Lost, _) => events.push(LevelEvent::Lost),
                _ => {}
            }
        }
        events
    }

    pub(crate) fn update_board_rect_cache(&mut self) {
        self.board_rect_cache = visible_boards(
            &self.graph,
            self.root_board,
            &self.transform,
            &self.config.limits,
        );
    }

    fn drift_main_menu(&mut self, dt: f32) {
        let aspect = Vec2::new(1.0, self.transform.viewport.inverse_aspect_ratio());
        let anchor = MAIN_MENU_ANCHOR * aspect;
        let target = self.transform.screen_to_world(anchor);
        let factor = dt * MAIN_MENU_DRIFT + 1.0;

        let camera = &mut self.transform.camera;
        camera.position = target - (target - camera.position) * factor;
        camera.zoom /= factor;
    }

    fn update_mouse_over(&mut self, input: &FrameInput) {
        self.mouse_over_last_frame = self.mouse_over;
        self.mouse_over = if input.pointer_over_ui {
            None
        } else {
            hit_test(
                &self.graph,
                &self.board_rect_cache,
                &self.transform,
                input.pointer,
                self.config.hover_margin,
            )
        };
    }

    /// Sets or clears the hover highlight. Uncovered cells highlight their neighbors too.
    fn set_highlight(&mut self, on: bool) {
        let Some(id) = self.mouse_over else {
            return;
        };
        if on && self.kind == LevelKind::LevelSelection {
            return;
        }
        let Some(cell) = self.graph.get_mut(id) else {
            return;
        };
        cell.highlighted = on;
        if on && cell.covered {
            return;
        }
        self.for_each_neighbor(id, |neighbor| neighbor.highlighted = on);
    }

    fn for_each_neighbor(&mut self, id: CellId, mut f: impl FnMut(&mut Cell)) {
        let Some(cell) = self.graph.get(id) else {
            return;
        };
        for neighbor in cell.neighbors.clone() {
            if let Some(neighbor) = self.graph.get_mut(neighbor) {
                f(neighbor);
            }
        }
    }

    /// Pops up the pressed and chord state of a cell and its neighbors.
    fn release_presses(&mut self, id: CellId) {
        if let Some(cell) = self.graph.get_mut(id) {
            cell.pressed = false;
            cell.chord = false;
        }
        self.for_each_neighbor(id, |neighbor| neighbor.pressed = false);
    }

    fn handle_mouse_input(&mut self, input: &FrameInput, events: &mut LevelEvents) {
        use MouseButtons as B;

        if self.state != GameState::Gaming {
            return;
        }

        if input.is_down(B::DRAG) {
            self.drag_distance += input.pointer_delta / self.transform.viewport.canvas.x;
        } else {
            self.drag_distance = Vec2::ZERO;
        }
        let moved_too_far =
            self.drag_distance.length() > self.config.camera.drag_invalidate_distance;

        if self.mouse_over_last_frame != self.mouse_over || moved_too_far {
            if let Some(last) = self.mouse_over_last_frame {
                self.release_presses(last);
            }
        }

        let Some(id) = self.mouse_over else {
            return;
        };
        let Some(cell) = self.graph.get_mut(id) else {
            return;
        };

        if self.kind == LevelKind::LevelSelection {
            if cell.covered || cell.number == 0 {
                return;
            }
            if input.is_pressed(B::LEFT) {
                cell.pressed = true;
            }
            if input.is_released(B::LEFT) && cell.pressed {
                cell.pressed = false;
                log::debug!("Level {} selected", cell.number);
                events.push(LevelEvent::SelectLevel(cell.number));
            }
            return;
        }

        if !cell.flagged {
            if input.is_pressed(B::LEFT) {
                cell.pressed = true;
            }
            if input.is_released(B::LEFT) && cell.pressed {
                cell.pressed = false;
                self.open_cell(id);
            }

            let Some(cell) = self.graph.get_mut(id) else {
                return;
            };
            let chord_pressed = (input.is_down(B::LEFT) && input.is_pressed(B::RIGHT))
                || (input.is_down(B::RIGHT) && input.is_pressed(B::LEFT))
                || input.is_pressed(B::MIDDLE);
            if !cell.covered && chord_pressed {
                cell.chord = true;
                self.for_each_neighbor(id, |neighbor| {
                    if !neighbor.flagged {
                        neighbor.pressed = true;
                    }
                });
            }

            let chord_held = self.graph.get(id).is_some_and(|cell| cell.chord);
            if chord_held && input.is_up(B::LEFT | B::MIDDLE | B::RIGHT) {
                self.release_presses(id);
                self.chord_cell(id);
            }
        }

        if input.is_pressed(B::RIGHT) {
            let Some(cell) = self.graph.get_mut(id) else {
                return;
            };
            if cell.pressed {
                cell.pressed = false;
            } else if cell.covered {
                self.cycle_cell(id);
            }
        }
    }
}
