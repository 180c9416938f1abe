use thiserror::Error;

/// Errors raised by the maze core. All of them are caller usage or
/// configuration bugs; generation itself has no transient failure modes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Grid width or depth below 2.
    #[error("invalid grid dimensions {width}x{depth}: both must be at least 2")]
    InvalidDimension { width: u16, depth: u16 },
    /// A stage was run before the stage it depends on.
    #[error("not initialized: {0}")]
    NotInitialized(&'static str),
    /// A run-once stage was run a second time.
    #[error("already initialized: {0}")]
    AlreadyInitialized(&'static str),
    #[error("weight {weight} at cell index {index} is outside 0..=9")]
    WeightOutOfRange { index: usize, weight: u8 },
    #[error("expected {expected} weights, got {actual}")]
    WeightCount { expected: usize, actual: usize },
    #[error("cell ({x}, {z}) is outside the grid")]
    CellOutOfBounds { x: u16, z: u16 },
    /// A handle that does not index into this grid.
    #[error("cell index {0} does not belong to this grid")]
    UnknownCell(usize),
    /// The result was requested before the frontier ran dry.
    #[error("maze is still growing")]
    StillGrowing,
}

/// Errors raised while reading configuration from arguments or environment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("start cell ({x}, {z}) is outside a {width}x{depth} grid")]
    StartOutOfBounds { x: u16, z: u16, width: u16, depth: u16 },
    #[error(transparent)]
    Maze(#[from] MazeError),
}

/// Top-level error for the binaries.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to install log subscriber")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

pub type Result<T, E = MazeError> = std::result::Result<T, E>;
