use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangular grid of optional cells. Absent slots are void and never playable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    /// Indexed `[y, x]`, so the backing storage is row-major.
    cells: Array2<Option<Cell>>,
    has_clones: bool,
}

impl Board {
    /// Board of the given size with every slot holding a default covered cell.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Some(Cell::default()))
    }

    /// Board with every slot set to `slot`.
    pub fn filled(width: u32, height: u32, slot: Option<Cell>) -> Self {
        Self {
            cells: Array2::from_elem([height as usize, width as usize], slot),
            has_clones: false,
        }
    }

    /// Builds a board from row-major slots.
    pub fn from_cells(width: u32, height: u32, cells: Vec<Option<Cell>>) -> Result<Self> {
        let cells = Array2::from_shape_vec([height as usize, width as usize], cells)
            .map_err(|_| LevelError::CellCountMismatch)?;
        Ok(Self {
            cells,
            has_clones: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.cells.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.cells.dim().0 as u32
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// True when at least one clone portal targets this board.
    pub fn has_clones(&self) -> bool {
        self.has_clones
    }

    pub(crate) fn set_has_clones(&mut self, has_clones: bool) {
        self.has_clones = has_clones;
    }

    pub fn inside(&self, (x, y): Coord2) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    pub fn get(&self, pos: Coord2) -> Option<&Cell> {
        if !self.inside(pos) {
            return None;
        }
        self.cells[[pos.1 as usize, pos.0 as usize]].as_ref()
    }

    pub fn get_mut(&mut self, pos: Coord2) -> Option<&mut Cell> {
        if !self.inside(pos) {
            return None;
        }
        self.cells[[pos.1 as usize, pos.0 as usize]].as_mut()
    }

    /// Replaces a slot, returning false when `pos` is outside the board.
    pub fn set(&mut self, pos: Coord2, slot: Option<Cell>) -> bool {
        if !self.inside(pos) {
            return false;
        }
        self.cells[[pos.1 as usize, pos.0 as usize]] = slot;
        true
    }

    /// Rectangle of the cell at `pos` when the whole board is drawn in `board_rect`.
    pub fn cell_rect(&self, (x, y): Coord2, board_rect: Rect) -> Rect {
        let cell_width = board_rect.width / self.width() as f32;
        let cell_height = board_rect.height / self.height() as f32;
        Rect::new(
            board_rect.x + x as f32 * cell_width,
            board_rect.y + y as f32 * cell_height,
            cell_width,
            cell_height,
        )
    }

    /// Rectangle of the board in its own frame, one cell per unit.
    pub fn local_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    /// Every position of the board in row-major order, void slots included.
    pub fn positions(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (width, height) = (self.width() as Coord, self.height() as Coord);
        (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    /// Positions holding a cell, row-major.
    pub fn present_positions(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.positions().filter(|&pos| self.get(pos).is_some())
    }

    /// Ids of the present cells, assuming this board sits at `board` in its graph.
    pub fn cell_ids(&self, board: BoardIndex) -> impl Iterator<Item = CellId> + '_ {
        self.present_positions()
            .map(move |pos| CellId::from_pos(pos, board))
    }

    pub fn cells(&self) -> impl Iterator<Item = (Coord2, &Cell)> {
        self.cells
            .indexed_iter()
            .filter_map(|((y, x), slot)| slot.as_ref().map(|cell| ((x as Coord, y as Coord), cell)))
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = (Coord2, &mut Cell)> {
        self.cells
            .indexed_iter_mut()
            .filter_map(|((y, x), slot)| slot.as_mut().map(|cell| ((x as Coord, y as Coord), cell)))
    }

    /// Same-board positions around `pos` that hold a cell.
    pub fn iter_neighbors(&self, pos: Coord2) -> impl Iterator<Item = Coord2> + '_ {
        NeighborIter::new(pos, self.size()).filter(|&pos| self.get(pos).is_some())
    }

    pub fn mine_count(&self) -> usize {
        self.cells().filter(|(_, cell)| cell.mine).count()
    }
}
