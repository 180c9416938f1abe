use std::time::Instant;

use super::frontier::Frontier;
use super::result::MazeResult;
use crate::error::{MazeError, Result};
use crate::maze::{CellId, Grid};

/// A candidate with this many admitted neighbours would become a junction,
/// so it is discarded instead of admitted.
pub const BRANCH_LIMIT: u8 = 2;

/// Outcome of a single [`MazeBuilder::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// The given cell joined the maze.
    Admitted(CellId),
    /// The frontier is exhausted; further steps keep returning `Done`.
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    Unseeded,
    Growing,
    Done,
}

/// Where a cell stands with respect to the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    Outside,
    Admitted,
    Discarded,
}

/// Grows a maze over a linked [`Grid`] by repeatedly admitting the
/// lowest-weight frontier cell that would not create a junction.
///
/// The builder can be driven one [`step`](MazeBuilder::step) at a time, e.g. once per
/// animation frame, or with [`run_to_completion`](MazeBuilder::run_to_completion). Both
/// produce the same maze. Stopping between steps leaves the builder consistent.
pub struct MazeBuilder<'g> {
    grid: &'g mut Grid,
    frontier: Frontier,
    /// Admitted cells in admission order
    set: Vec<CellId>,
    membership: Vec<Membership>,
    discarded: usize,
    state: BuildState,
    started_at: Option<Instant>,
}

impl<'g> MazeBuilder<'g> {
    /// The grid must already have weights and adjacency, and must not have
    /// hosted a maze before.
    pub fn new(grid: &'g mut Grid) -> Result<Self> {
        if grid.is_grown() {
            return Err(MazeError::AlreadyInitialized(
                "a maze was already grown on this grid",
            ));
        }
        if !grid.is_linked() {
            return Err(MazeError::NotInitialized(
                "grid adjacency must be computed before building a maze",
            ));
        }
        let num_cells = grid.len();
        Ok(MazeBuilder {
            grid,
            frontier: Frontier::new(num_cells),
            set: Vec::with_capacity(num_cells),
            membership: vec![Membership::Outside; num_cells],
            discarded: 0,
            state: BuildState::Unseeded,
            started_at: None,
        })
    }

    /// Admits `start` as the first cell of the maze, populating the frontier
    /// with its neighbours.
    pub fn seed(&mut self, start: CellId) -> Result<()> {
        if self.state != BuildState::Unseeded {
            return Err(MazeError::AlreadyInitialized("builder was already seeded"));
        }
        let Some(cell) = self.grid.cell(start) else {
            return Err(MazeError::UnknownCell(start.index()));
        };
        tracing::debug!(start = ?cell.position(), "seeding maze");
        self.started_at = Some(Instant::now());
        self.state = BuildState::Growing;
        self.grid.mark_grown();
        self.admit(start);
        Ok(())
    }

    /// Seeds the maze at the cell found at `position`.
    pub fn seed_at(&mut self, position: (u16, u16)) -> Result<()> {
        let start = self.grid.try_id_at(position)?;
        self.seed(start)
    }

    /// Admits the next eligible candidate, discarding any that would branch.
    pub fn step(&mut self) -> Result<StepResult> {
        match self.state {
            BuildState::Unseeded => Err(MazeError::NotInitialized(
                "builder must be seeded before stepping",
            )),
            BuildState::Done => Ok(StepResult::Done),
            BuildState::Growing => loop {
                let Some(candidate) = self.frontier.pop_lowest() else {
                    self.finish();
                    return Ok(StepResult::Done);
                };
                let opened = self.grid[candidate].opened_neighbors();
                if opened >= BRANCH_LIMIT {
                    // Discarded for good, even if a later admission touches it again
                    self.membership[candidate.index()] = Membership::Discarded;
                    self.discarded += 1;
                    tracing::trace!(cell = ?self.grid[candidate].position(), opened, "discarded candidate");
                    continue;
                }
                self.admit(candidate);
                return Ok(StepResult::Admitted(candidate));
            },
        }
    }

    /// Steps until the frontier is exhausted and returns the finished maze.
    pub fn run_to_completion(&mut self) -> Result<MazeResult> {
        while let StepResult::Admitted(_) = self.step()? {}
        self.result()
    }

    /// The finished maze. Fails with [`MazeError::StillGrowing`] until a step
    /// has returned [`StepResult::Done`].
    pub fn result(&self) -> Result<MazeResult> {
        match self.state {
            BuildState::Unseeded => Err(MazeError::NotInitialized(
                "builder must be seeded before a maze exists",
            )),
            BuildState::Growing => Err(MazeError::StillGrowing),
            BuildState::Done => {
                let excluded = self
                    .membership
                    .iter()
                    .enumerate()
                    .filter(|&(_, &m)| m != Membership::Admitted)
                    .map(|(idx, _)| CellId(idx))
                    .collect();
                Ok(MazeResult::new(self.set.clone(), excluded, self.discarded))
            }
        }
    }

    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Admitted cells so far, in admission order.
    pub fn set(&self) -> &[CellId] {
        &self.set
    }

    pub fn is_admitted(&self, id: CellId) -> bool {
        self.membership.get(id.index()) == Some(&Membership::Admitted)
    }

    pub fn is_discarded(&self, id: CellId) -> bool {
        self.membership.get(id.index()) == Some(&Membership::Discarded)
    }

    pub fn is_done(&self) -> bool {
        self.state == BuildState::Done
    }

    /// Number of candidates thrown away by the branching constraint so far.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    fn admit(&mut self, id: CellId) {
        self.set.push(id);
        self.membership[id.index()] = Membership::Admitted;
        tracing::trace!(cell = ?self.grid[id].position(), "admitted cell");

        for i in 0..self.grid[id].neighbors().len() {
            let neighbor_id = self.grid[id].neighbors()[i];
            let neighbor = self.grid.cell_mut(neighbor_id);
            neighbor.open_neighbor();
            let weight = neighbor.weight();
            if self.membership[neighbor_id.index()] == Membership::Outside {
                // insert ignores cells that are already queued
                self.frontier.insert(neighbor_id, weight);
            }
        }
    }

    fn finish(&mut self) {
        self.state = BuildState::Done;
        let elapsed = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
        tracing::info!(
            admitted = self.set.len(),
            excluded = self.grid.len() - self.set.len(),
            discarded = self.discarded,
            ?elapsed,
            "maze done"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn random_grid(width: u16, depth: u16, seed: u64) -> Grid {
        let mut grid = Grid::build(width, depth).unwrap();
        grid.assign_weights(&mut StdRng::seed_from_u64(seed)).unwrap();
        grid.compute_adjacency().unwrap();
        grid
    }

    fn weighted_grid(width: u16, depth: u16, weights: &[u8]) -> Grid {
        let mut grid = Grid::build(width, depth).unwrap();
        grid.assign_weights_from(weights.iter().copied()).unwrap();
        grid.compute_adjacency().unwrap();
        grid
    }

    #[test]
    fn test_builder_requires_linked_grid() {
        let mut grid = Grid::build(3, 3).unwrap();
        assert!(matches!(
            MazeBuilder::new(&mut grid),
            Err(MazeError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_step_before_seed_is_rejected() {
        let mut grid = random_grid(4, 4, 0);
        let mut builder = MazeBuilder::new(&mut grid).unwrap();
        assert!(matches!(builder.step(), Err(MazeError::NotInitialized(_))));
        assert!(matches!(
            builder.run_to_completion(),
            Err(MazeError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_seed_twice_is_rejected() {
        let mut grid = random_grid(4, 4, 0);
        let mut builder = MazeBuilder::new(&mut grid).unwrap();
        builder.seed_at((0, 0)).unwrap();
        assert!(matches!(
            builder.seed_at((1, 1)),
            Err(MazeError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_seed_out_of_bounds() {
        let mut grid = random_grid(4, 4, 0);
        let mut builder = MazeBuilder::new(&mut grid).unwrap();
        assert_eq!(
            builder.seed_at((4, 0)).unwrap_err(),
            MazeError::CellOutOfBounds { x: 4, z: 0 }
        );
    }

    #[test]
    fn test_result_before_done() {
        let mut grid = random_grid(5, 5, 3);
        let mut builder = MazeBuilder::new(&mut grid).unwrap();
        builder.seed_at((0, 0)).unwrap();
        assert_eq!(builder.result().unwrap_err(), MazeError::StillGrowing);
    }

    #[test]
    fn test_two_by_two_scenario() {
        // (0,0)=5, (1,0)=1, (0,1)=1, (1,1)=9
        let mut grid = weighted_grid(2, 2, &[5, 1, 1, 9]);
        let start = grid.id_at((0, 0)).unwrap();
        let right = grid.id_at((1, 0)).unwrap();
        let up = grid.id_at((0, 1)).unwrap();
        let corner = grid.id_at((1, 1)).unwrap();

        let mut builder = MazeBuilder::new(&mut grid).unwrap();
        builder.seed(start).unwrap();
        // Both weight-1 neighbours are queued, right first since x+1 precedes z+1
        assert_eq!(builder.frontier().bucket(1).collect::<Vec<_>>(), vec![right, up]);

        assert_eq!(builder.step().unwrap(), StepResult::Admitted(right));
        // The corner now touches one maze cell and waits in bucket 9
        assert!(builder.frontier().contains(corner));
        // (0,1) is popped next and still has a single opened neighbour
        assert_eq!(builder.step().unwrap(), StepResult::Admitted(up));
        // The corner now touches two maze cells and is discarded
        assert_eq!(builder.step().unwrap(), StepResult::Done);

        let result = builder.result().unwrap();
        assert_eq!(result.start(), start);
        assert_eq!(result.end(), up);
        assert_eq!(result.path(), &[start, right, up]);
        assert_eq!(result.excluded(), &[corner]);
        assert_eq!(result.discarded(), 1);
        assert!(builder.is_discarded(corner));
    }

    #[test]
    fn test_steps_after_done_stay_done() {
        let mut grid = random_grid(3, 3, 9);
        let mut builder = MazeBuilder::new(&mut grid).unwrap();
        builder.seed_at((0, 0)).unwrap();
        let first = builder.run_to_completion().unwrap();
        assert!(builder.is_done());
        assert_eq!(builder.step().unwrap(), StepResult::Done);
        assert_eq!(builder.run_to_completion().unwrap(), first);
    }

    #[test]
    fn test_no_cell_admitted_as_junction() {
        for seed in 0..50 {
            let mut grid = random_grid(12, 9, seed);
            let mut builder = MazeBuilder::new(&mut grid).unwrap();
            builder.seed_at((0, 0)).unwrap();
            while let StepResult::Admitted(id) = builder.step().unwrap() {
                // Admission bumps the neighbours, never the cell itself
                assert!(builder.grid()[id].opened_neighbors() < BRANCH_LIMIT);
            }
        }
    }

    #[test]
    fn test_every_cell_connects_to_an_earlier_one() {
        for seed in 0..50 {
            let mut grid = random_grid(10, 14, seed);
            let mut builder = MazeBuilder::new(&mut grid).unwrap();
            builder.seed_at((0, 0)).unwrap();
            let result = builder.run_to_completion().unwrap();
            let path = result.path();
            for (i, &id) in path.iter().enumerate().skip(1) {
                let earlier = &path[..i];
                assert!(
                    builder.grid()[id]
                        .neighbors()
                        .iter()
                        .any(|n| earlier.contains(n)),
                    "seed {seed}: cell {i} of the path is disconnected"
                );
            }
        }
    }

    #[test]
    fn test_partition_covers_grid_without_duplicates() {
        for seed in 0..50 {
            let mut grid = random_grid(8, 8, seed);
            let mut builder = MazeBuilder::new(&mut grid).unwrap();
            builder.seed_at((0, 0)).unwrap();
            let result = builder.run_to_completion().unwrap();

            let mut all = result
                .path()
                .iter()
                .chain(result.excluded())
                .copied()
                .collect::<Vec<_>>();
            all.sort();
            all.dedup();
            assert_eq!(all.len(), 64);
            assert_eq!(result.total_cells(), 64);
            assert!(builder.frontier().is_empty());
        }
    }

    #[test]
    fn test_frontier_never_holds_duplicates() {
        let mut grid = random_grid(9, 9, 11);
        let mut builder = MazeBuilder::new(&mut grid).unwrap();
        builder.seed_at((4, 4)).unwrap();
        loop {
            let mut queued = (0..=crate::maze::MAX_WEIGHT)
                .flat_map(|w| builder.frontier().bucket(w))
                .collect::<Vec<_>>();
            assert_eq!(queued.len(), builder.frontier().len());
            queued.sort();
            queued.dedup();
            assert_eq!(queued.len(), builder.frontier().len());
            assert!(queued.iter().all(|&id| !builder.is_admitted(id)));
            if builder.step().unwrap() == StepResult::Done {
                break;
            }
        }
    }

    #[test]
    fn test_pop_accounting() {
        // Every pop either admits or discards; the seed is never popped
        for seed in 0..20 {
            let mut grid = random_grid(7, 11, seed);
            let mut builder = MazeBuilder::new(&mut grid).unwrap();
            builder.seed_at((0, 0)).unwrap();
            let result = builder.run_to_completion().unwrap();
            assert_eq!(
                builder.frontier().pops(),
                result.path().len() - 1 + result.discarded(),
                "seed {seed}"
            );

            // Anything next to the maze went through the frontier, so if it
            // is outside the maze it must have been discarded
            for &id in result.excluded() {
                let touches_maze = builder.grid()[id]
                    .neighbors()
                    .iter()
                    .any(|&n| builder.is_admitted(n));
                if touches_maze {
                    assert!(builder.is_discarded(id), "seed {seed}: {id:?} left behind");
                } else {
                    assert!(!builder.is_discarded(id));
                }
            }
        }
    }

    #[test]
    fn test_second_maze_on_same_grid_is_rejected() {
        let mut grid = weighted_grid(2, 2, &[5, 1, 1, 9]);
        let first = {
            let mut builder = MazeBuilder::new(&mut grid).unwrap();
            builder.seed_at((0, 0)).unwrap();
            builder.run_to_completion().unwrap()
        };
        assert_eq!(first.path().len(), 3);
        assert!(grid.is_grown());
        assert!(matches!(
            MazeBuilder::new(&mut grid),
            Err(MazeError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn test_unseeded_builder_leaves_grid_reusable() {
        let mut grid = random_grid(5, 5, 8);
        drop(MazeBuilder::new(&mut grid).unwrap());
        assert!(grid.is_linked());
        let mut builder = MazeBuilder::new(&mut grid).unwrap();
        builder.seed_at((0, 0)).unwrap();
        assert!(builder.run_to_completion().is_ok());
    }

    #[test]
    fn test_same_weights_same_maze() {
        let run = |seed| {
            let mut grid = random_grid(15, 15, seed);
            let mut builder = MazeBuilder::new(&mut grid).unwrap();
            builder.seed_at((0, 0)).unwrap();
            builder.run_to_completion().unwrap()
        };
        assert_eq!(run(1234), run(1234));
    }

    #[test]
    fn test_stepping_matches_run_to_completion() {
        let mut stepped_grid = random_grid(13, 6, 77);
        let mut builder = MazeBuilder::new(&mut stepped_grid).unwrap();
        builder.seed_at((0, 0)).unwrap();
        let mut admitted = vec![builder.set()[0]];
        while let StepResult::Admitted(id) = builder.step().unwrap() {
            admitted.push(id);
        }

        let mut grid = random_grid(13, 6, 77);
        let mut runner = MazeBuilder::new(&mut grid).unwrap();
        runner.seed_at((0, 0)).unwrap();
        let result = runner.run_to_completion().unwrap();
        assert_eq!(result.path(), admitted.as_slice());
    }
}
