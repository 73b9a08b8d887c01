use serde::{Deserialize, Serialize};

/// Single cell coordinate axis. Signed so neighbor offsets can step outside a board.
pub type Coord = i32;

/// Two-dimensional cell position `(x, y)` on a board.
pub type Coord2 = (Coord, Coord);

/// Stable index of a board inside a level, valid for the level's lifetime.
pub type BoardIndex = usize;

/// Address of a single cell anywhere in the level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId {
    pub x: Coord,
    pub y: Coord,
    pub board: BoardIndex,
}

impl CellId {
    pub const fn new(x: Coord, y: Coord, board: BoardIndex) -> Self {
        Self { x, y, board }
    }

    pub const fn from_pos((x, y): Coord2, board: BoardIndex) -> Self {
        Self { x, y, board }
    }

    pub const fn pos(self) -> Coord2 {
        (self.x, self.y)
    }
}

pub(crate) const DISPLACEMENTS: [Coord2; 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Iterates the up to eight same-board positions around `center` that fall inside `bounds`.
///
/// Presence of a cell at the yielded position is not checked, boards with void slots filter
/// those themselves.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: (u32, u32),
    index: u8,
}

impl NeighborIter {
    pub(crate) fn new(center: Coord2, bounds: (u32, u32)) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: Coord2, (max_x, max_y): (u32, u32)) -> Option<Coord2> {
    let next_x = coords.0.checked_add(delta.0)?;
    let next_y = coords.1.checked_add(delta.1)?;
    let in_x = u32::try_from(next_x).is_ok_and(|x| x < max_x);
    let in_y = u32::try_from(next_y).is_ok_and(|y| y < max_y);
    (in_x && in_y).then_some((next_x, next_y))
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
