use rand::Rng;

use super::cell::{Cell, CellId};
use crate::error::{MazeError, Result};

/// Largest weight a cell can carry. Weights live in `0..=MAX_WEIGHT`.
pub const MAX_WEIGHT: u8 = 9;

/// Construction stages a grid passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    Built,
    Weighted,
    Linked,
    /// A builder has opened cells; the counters are spent
    Grown,
}

/// Rectangular lattice of cells with 4-neighbour adjacency and no wraparound.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Box<[Cell]>,
    width: u16,
    depth: u16,
    stage: Stage,
}

impl Grid {
    /// Creates a `width x depth` grid of unweighted, unlinked cells.
    pub fn build(width: u16, depth: u16) -> Result<Self> {
        if width < 2 || depth < 2 {
            return Err(MazeError::InvalidDimension { width, depth });
        }
        let cells = (0..depth)
            .flat_map(|z| (0..width).map(move |x| Cell::new((x, z))))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        tracing::debug!(width, depth, "built grid");
        Ok(Grid {
            cells,
            width,
            depth,
            stage: Stage::Built,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn depth(&self) -> u16 {
        self.depth
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether adjacency has been computed and no maze has been grown yet,
    /// i.e. the grid is ready for a builder.
    pub fn is_linked(&self) -> bool {
        self.stage == Stage::Linked
    }

    /// Whether a builder has already been seeded on this grid.
    pub fn is_grown(&self) -> bool {
        self.stage == Stage::Grown
    }

    /// Called when a builder seeds the grid. Opened-neighbour counters only
    /// ever grow, so a grid hosts at most one maze.
    pub(crate) fn mark_grown(&mut self) {
        self.stage = Stage::Grown;
    }

    pub fn is_in_bounds(&self, position: (u16, u16)) -> bool {
        position.0 < self.width && position.1 < self.depth
    }

    fn ravel_index(&self, x: u16, z: u16) -> usize {
        z as usize * self.width as usize + x as usize
    }

    /// Handle of the cell at `position`, if it lies inside the grid.
    pub fn id_at(&self, position: (u16, u16)) -> Option<CellId> {
        self.is_in_bounds(position)
            .then(|| CellId(self.ravel_index(position.0, position.1)))
    }

    /// Like [`Grid::id_at`] but reports out-of-bounds positions as an error.
    pub fn try_id_at(&self, position: (u16, u16)) -> Result<CellId> {
        self.id_at(position).ok_or(MazeError::CellOutOfBounds {
            x: position.0,
            z: position.1,
        })
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0)
    }

    pub(crate) fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.0]
    }

    /// All cell handles in row-major order.
    pub fn ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len()).map(CellId)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Draws an independent uniform weight in `0..=MAX_WEIGHT` for every cell.
    /// Must run exactly once, before [`Grid::compute_adjacency`].
    pub fn assign_weights<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let weights = (0..self.cells.len())
            .map(|_| rng.random_range(0..=MAX_WEIGHT))
            .collect::<Vec<_>>();
        self.assign_weights_from(weights)
    }

    /// Assigns caller-provided weights in row-major order (`z * width + x`).
    ///
    /// Nothing is modified unless every weight is valid and the count matches
    /// the number of cells.
    pub fn assign_weights_from<I>(&mut self, weights: I) -> Result<()>
    where
        I: IntoIterator<Item = u8>,
    {
        if self.stage != Stage::Built {
            return Err(MazeError::AlreadyInitialized("weights were already assigned"));
        }
        let weights = weights.into_iter().collect::<Vec<_>>();
        if weights.len() != self.cells.len() {
            return Err(MazeError::WeightCount {
                expected: self.cells.len(),
                actual: weights.len(),
            });
        }
        if let Some((index, &weight)) = weights.iter().enumerate().find(|&(_, &w)| w > MAX_WEIGHT) {
            return Err(MazeError::WeightOutOfRange { index, weight });
        }

        self.cells
            .iter_mut()
            .zip(weights)
            .for_each(|(cell, weight)| cell.set_weight(weight));
        self.stage = Stage::Weighted;
        tracing::debug!(cells = self.cells.len(), "assigned cell weights");
        Ok(())
    }

    /// Fills every cell's neighbour list, sorted ascending by weight.
    /// Equal weights keep the order `(x-1), (x+1), (z-1), (z+1)`.
    pub fn compute_adjacency(&mut self) -> Result<()> {
        match self.stage {
            Stage::Built => {
                return Err(MazeError::NotInitialized(
                    "adjacency requires weights to be assigned first",
                ));
            }
            Stage::Linked | Stage::Grown => {
                return Err(MazeError::AlreadyInitialized("adjacency was already computed"));
            }
            Stage::Weighted => {}
        }

        let weights = self.cells.iter().map(Cell::weight).collect::<Vec<_>>();
        for idx in 0..self.cells.len() {
            let (x, z) = self.cells[idx].position();
            let mut neighbors = [
                // x - 1 and z - 1 wrap to u16::MAX on underflow and are then
                // rejected by the bounds check, as are saturated additions.
                (x.wrapping_sub(1), z),
                (x.saturating_add(1), z),
                (x, z.wrapping_sub(1)),
                (x, z.saturating_add(1)),
            ]
            .into_iter()
            .filter_map(|position| self.id_at(position))
            .collect::<Vec<_>>();
            // sort_by_key is stable, which keeps the insertion order on ties
            neighbors.sort_by_key(|id| weights[id.0]);
            self.cells[idx].set_neighbors(neighbors);
        }
        self.stage = Stage::Linked;
        tracing::debug!(cells = self.cells.len(), "computed adjacency");
        Ok(())
    }
}

impl std::ops::Index<CellId> for Grid {
    type Output = Cell;

    fn index(&self, id: CellId) -> &Self::Output {
        &self.cells[id.0]
    }
}

impl std::ops::Index<(u16, u16)> for Grid {
    type Output = Cell;

    fn index(&self, position: (u16, u16)) -> &Self::Output {
        &self.cells[self.ravel_index(position.0, position.1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn linked_grid(width: u16, depth: u16, seed: u64) -> Grid {
        let mut grid = Grid::build(width, depth).unwrap();
        grid.assign_weights(&mut StdRng::seed_from_u64(seed)).unwrap();
        grid.compute_adjacency().unwrap();
        grid
    }

    #[test]
    fn test_build_rejects_thin_grids() {
        assert_eq!(
            Grid::build(1, 5).unwrap_err(),
            MazeError::InvalidDimension { width: 1, depth: 5 }
        );
        assert!(matches!(
            Grid::build(5, 1),
            Err(MazeError::InvalidDimension { .. })
        ));
        assert!(Grid::build(2, 2).is_ok());
    }

    #[test]
    fn test_grid_indexing() {
        let grid = Grid::build(4, 3).unwrap();
        assert_eq!(grid.len(), 12);
        assert_eq!(grid[(2, 1)].position(), (2, 1));
        let id = grid.id_at((3, 2)).unwrap();
        assert_eq!(id.index(), 11);
        assert_eq!(grid[id].position(), (3, 2));
        assert!(grid.id_at((4, 0)).is_none());
        assert!(grid.id_at((0, 3)).is_none());
        assert_eq!(
            grid.try_id_at((9, 9)).unwrap_err(),
            MazeError::CellOutOfBounds { x: 9, z: 9 }
        );
    }

    #[test]
    fn test_random_weights_in_range() {
        let grid = linked_grid(20, 20, 7);
        assert!(grid.cells().all(|cell| cell.weight() <= MAX_WEIGHT));
    }

    #[test]
    fn test_adjacency_before_weights_is_rejected() {
        let mut grid = Grid::build(3, 3).unwrap();
        assert!(matches!(
            grid.compute_adjacency(),
            Err(MazeError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_stages_run_once() {
        let mut grid = linked_grid(3, 3, 1);
        assert!(matches!(
            grid.assign_weights(&mut StdRng::seed_from_u64(2)),
            Err(MazeError::AlreadyInitialized(_))
        ));
        assert!(matches!(
            grid.compute_adjacency(),
            Err(MazeError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_bad_weights_leave_grid_untouched() {
        let mut grid = Grid::build(2, 2).unwrap();
        assert_eq!(
            grid.assign_weights_from([1, 2, 10, 3]).unwrap_err(),
            MazeError::WeightOutOfRange { index: 2, weight: 10 }
        );
        assert_eq!(
            grid.assign_weights_from([1, 2, 3]).unwrap_err(),
            MazeError::WeightCount { expected: 4, actual: 3 }
        );
        assert!(grid.cells().all(|cell| cell.weight() == 0));
        // A valid assignment still goes through afterwards
        assert!(grid.assign_weights_from([1, 2, 3, 4]).is_ok());
    }

    #[test]
    fn test_neighbors_are_exactly_manhattan_one() {
        let grid = linked_grid(6, 5, 42);
        for id in grid.ids() {
            let (x, z) = grid[id].position();
            let mut found = grid[id]
                .neighbors()
                .iter()
                .map(|&n| grid[n].position())
                .collect::<Vec<_>>();
            found.sort();
            let mut expected = [
                (x as i32 - 1, z as i32),
                (x as i32 + 1, z as i32),
                (x as i32, z as i32 - 1),
                (x as i32, z as i32 + 1),
            ]
            .into_iter()
            .filter(|&(nx, nz)| nx >= 0 && nz >= 0 && nx < 6 && nz < 5)
            .map(|(nx, nz)| (nx as u16, nz as u16))
            .collect::<Vec<_>>();
            expected.sort();
            assert_eq!(found, expected, "neighbours of ({x}, {z})");
        }
    }

    #[test]
    fn test_neighbors_sorted_by_weight_with_stable_ties() {
        // Row-major weights for a 3x3 grid
        let mut grid = Grid::build(3, 3).unwrap();
        grid.assign_weights_from([4, 2, 4, 2, 0, 7, 4, 2, 4]).unwrap();
        grid.compute_adjacency().unwrap();

        // Centre (1, 1): left (0,1)=2, right (2,1)=7, down (1,0)=2, up (1,2)=2
        let centre = grid.id_at((1, 1)).unwrap();
        let positions = grid[centre]
            .neighbors()
            .iter()
            .map(|&n| grid[n].position())
            .collect::<Vec<_>>();
        assert_eq!(positions, vec![(0, 1), (1, 0), (1, 2), (2, 1)]);

        for cell in grid.cells() {
            let weights = cell
                .neighbors()
                .iter()
                .map(|&n| grid[n].weight())
                .collect::<Vec<_>>();
            assert!(weights.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
