use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Directed embedding: the region `(x, y, width, height)` of board `from`, in `from`'s cell
/// coordinates, is replaced by the whole of board `to`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    pub from: BoardIndex,
    pub to: BoardIndex,
    pub x: Coord,
    pub y: Coord,
    pub width: Coord,
    pub height: Coord,
    /// Alternate route to `to`. Upward traversals never go through clone portals.
    #[serde(default)]
    pub clone: bool,
}

impl Portal {
    pub const fn new(from: BoardIndex, to: BoardIndex, (x, y): Coord2, (width, height): Coord2) -> Self {
        Self {
            from,
            to,
            x,
            y,
            width,
            height,
            clone: false,
        }
    }

    pub const fn cloned(self) -> Self {
        Self {
            clone: true,
            ..self
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    /// Whether the portal region fits inside a board of the given size.
    pub fn fits_in(&self, (width, height): (u32, u32)) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width > 0
            && self.height > 0
            && i64::from(self.x) + i64::from(self.width) <= i64::from(width)
            && i64::from(self.y) + i64::from(self.height) <= i64::from(height)
    }
}

/// Placement of a board in some reference frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardRectInfo {
    pub board: BoardIndex,
    pub rect: Rect,
    /// Set when the placement was reached through a clone portal.
    pub clone: bool,
}

impl BoardRectInfo {
    pub const fn new(board: BoardIndex, rect: Rect) -> Self {
        Self {
            board,
            rect,
            clone: false,
        }
    }
}

/// Boards plus the portals between them. Boards are addressed by their stable index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalGraph {
    boards: Vec<Board>,
    portals: Vec<Portal>,
}

impl PortalGraph {
    /// Assembles a graph, checking board indices and that every portal fits its parent.
    ///
    /// Also derives [`Board::has_clones`].
    pub fn new(mut boards: Vec<Board>, portals: Vec<Portal>) -> Result<Self> {
        for (index, board) in boards.iter().enumerate() {
            if board.width() == 0 || board.height() == 0 {
                return Err(LevelError::EmptyBoard(index));
            }
        }

        for (index, portal) in portals.iter().enumerate() {
            let parent = boards
                .get(portal.from)
                .ok_or(LevelError::InvalidBoard(portal.from))?;
            let child = boards
                .get(portal.to)
                .ok_or(LevelError::InvalidBoard(portal.to))?;
            if !portal.fits_in(parent.size()) {
                return Err(LevelError::PortalOutOfBounds(index));
            }

            let portal_aspect = portal.width as f32 / portal.height as f32;
            let child_aspect = child.width() as f32 / child.height() as f32;
            if (portal_aspect - child_aspect).abs() > f32::EPSILON {
                log::warn!(
                    "Portal {} stretches board {} ({}x{}) into a {}x{} region",
                    index,
                    portal.to,
                    child.width(),
                    child.height(),
                    portal.width,
                    portal.height
                );
            }
        }

        for (index, board) in boards.iter_mut().enumerate() {
            board.set_has_clones(portals.iter().any(|p| p.clone && p.to == index));
        }

        Ok(Self { boards, portals })
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    pub fn board(&self, index: BoardIndex) -> Option<&Board> {
        self.boards.get(index)
    }

    pub fn board_mut(&mut self, index: BoardIndex) -> Option<&mut Board> {
        self.boards.get_mut(index)
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.boards.get(id.board)?.get(id.pos())
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.boards.get_mut(id.board)?.get_mut(id.pos())
    }

    /// Every present cell of the level, board by board.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.boards
            .iter()
            .enumerate()
            .flat_map(|(index, board)| board.cell_ids(index))
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.boards.iter().enumerate().flat_map(|(index, board)| {
            board
                .cells()
                .map(move |(pos, cell)| (CellId::from_pos(pos, index), cell))
        })
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = (CellId, &mut Cell)> {
        self.boards.iter_mut().enumerate().flat_map(|(index, board)| {
            board
                .cells_mut()
                .map(move |(pos, cell)| (CellId::from_pos(pos, index), cell))
        })
    }

    /// Placement of `board` in its own frame: origin at zero, one unit per cell.
    pub fn local_info(&self, board: BoardIndex) -> Option<BoardRectInfo> {
        self.board(board)
            .map(|b| BoardRectInfo::new(board, b.local_rect()))
    }

    /// Placements of every parent of `info.board`, in the same frame as `info.rect`.
    ///
    /// Yields the index of the portal that was walked along with the parent placement.
    pub fn parents_of(
        &self,
        info: BoardRectInfo,
        non_clone_only: bool,
    ) -> impl Iterator<Item = (usize, BoardRectInfo)> + '_ {
        self.portals
            .iter()
            .enumerate()
            .filter(move |(_, portal)| portal.to == info.board && !(non_clone_only && portal.clone))
            .map(move |(index, portal)| {
                let parent = &self.boards[portal.from];
                let scale = info.rect.width / portal.width as f32;
                let pos = info.rect.position() - portal.position() * scale;
                let size = Vec2::new(parent.width() as f32, parent.height() as f32) * scale;
                (
                    index,
                    BoardRectInfo::new(portal.from, Rect::from_pos_size(pos, size)),
                )
            })
    }

    /// Placements of every child of `info.board`, in the same frame as `info.rect`.
    pub fn children_of(&self, info: BoardRectInfo) -> impl Iterator<Item = (usize, BoardRectInfo)> + '_ {
        self.portals
            .iter()
            .enumerate()
            .filter(move |(_, portal)| portal.from == info.board)
            .map(move |(index, portal)| {
                let parent = &self.boards[portal.from];
                let cell_width = info.rect.width / parent.width() as f32;
                let cell_height = info.rect.height / parent.height() as f32;
                let rect = Rect::new(
                    info.rect.x + portal.x as f32 * cell_width,
                    info.rect.y + portal.y as f32 * cell_height,
                    portal.width as f32 * cell_width,
                    portal.height as f32 * cell_height,
                );
                (
                    index,
                    BoardRectInfo {
                        board: portal.to,
                        rect,
                        clone: portal.clone,
                    },
                )
            })
    }
}
