/// Handle to a cell owned by a [`Grid`](super::Grid).
///
/// Handles are plain indices in row-major order (`z * width + x`), so they are
/// only meaningful for the grid that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the maze lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Coordinates `(x, z)` of the cell in the grid
    position: (u16, u16),
    /// Random weight in `0..=9`, set once before adjacency is computed
    weight: u8,
    /// In-bounds neighbours sorted ascending by weight
    neighbors: Vec<CellId>,
    /// How many neighbours have been admitted to the maze so far
    opened_neighbors: u8,
}

impl Cell {
    pub(crate) fn new(position: (u16, u16)) -> Self {
        Cell {
            position,
            weight: 0,
            neighbors: Vec::with_capacity(4),
            opened_neighbors: 0,
        }
    }

    pub fn position(&self) -> (u16, u16) {
        self.position
    }

    pub fn weight(&self) -> u8 {
        self.weight
    }

    pub fn neighbors(&self) -> &[CellId] {
        &self.neighbors
    }

    pub fn opened_neighbors(&self) -> u8 {
        self.opened_neighbors
    }

    pub(crate) fn set_weight(&mut self, weight: u8) {
        self.weight = weight;
    }

    pub(crate) fn set_neighbors(&mut self, neighbors: Vec<CellId>) {
        self.neighbors = neighbors;
    }

    /// Called once for every admitted neighbour. A cell has at most four
    /// neighbours so the counter cannot overflow.
    pub(crate) fn open_neighbor(&mut self) {
        self.opened_neighbors += 1;
    }
}
