use crate::maze::{CellId, Grid};

/// The finished maze: the ordered path of admitted cells and everything
/// left outside of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeResult {
    /// Admitted cells in admission order. Never empty.
    path: Vec<CellId>,
    /// Cells never admitted, in row-major order
    excluded: Vec<CellId>,
    /// How many candidates the branching constraint threw away
    discarded: usize,
}

impl MazeResult {
    pub(crate) fn new(path: Vec<CellId>, excluded: Vec<CellId>, discarded: usize) -> Self {
        debug_assert!(!path.is_empty(), "a finished maze always holds its start cell");
        MazeResult {
            path,
            excluded,
            discarded,
        }
    }

    /// The cell the maze was grown from.
    pub fn start(&self) -> CellId {
        self.path[0]
    }

    /// The last cell admitted.
    pub fn end(&self) -> CellId {
        self.path[self.path.len() - 1]
    }

    pub fn path(&self) -> &[CellId] {
        &self.path
    }

    pub fn excluded(&self) -> &[CellId] {
        &self.excluded
    }

    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn total_cells(&self) -> usize {
        self.path.len() + self.excluded.len()
    }

    /// Positions of the path cells, start first.
    pub fn path_positions<'a>(&'a self, grid: &'a Grid) -> impl Iterator<Item = (u16, u16)> + 'a {
        self.path.iter().map(|&id| grid[id].position())
    }
}
