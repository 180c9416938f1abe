pub mod cell;
mod grid;

pub use cell::{Cell, CellId};
pub use grid::{Grid, MAX_WEIGHT};

/// Number of frontier buckets, one per possible weight.
pub const WEIGHT_BUCKETS: usize = MAX_WEIGHT as usize + 1;
