use rand::{SeedableRng, rngs::StdRng};

mod builder;
mod frontier;
mod result;

pub use builder::{BRANCH_LIMIT, MazeBuilder, StepResult};
pub use frontier::Frontier;
pub use result::MazeResult;

use crate::{config::Config, error::Result, maze::Grid};

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Builds and weights a grid for `config`, ready to hand to a [`MazeBuilder`].
pub fn prepare_grid(config: &Config) -> Result<Grid> {
    let mut grid = Grid::build(config.width, config.depth)?;
    grid.assign_weights(&mut get_rng(config.seed))?;
    grid.compute_adjacency()?;
    Ok(grid)
}

/// Generates a complete maze in one go, starting from `config.start`.
pub fn generate(config: &Config) -> Result<(Grid, MazeResult)> {
    let mut grid = prepare_grid(config)?;
    let result = {
        let mut builder = MazeBuilder::new(&mut grid)?;
        builder.seed_at(config.start)?;
        builder.run_to_completion()?
    };
    Ok((grid, result))
}
