pub mod app;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
pub mod maze;

pub use error::{ConfigError, Error, MazeError};
