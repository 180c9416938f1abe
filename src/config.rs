use std::{path::PathBuf, time::Duration};

use tracing::Level;

use crate::error::{ConfigError, MazeError};

/// Environment variable holding the log level (`error`, `warn`, `info`, `debug`, `trace`)
pub const LOG_LEVEL_ENV: &str = "CORRIDORS_LOG";
/// Environment variable holding the directory the log file is written to
pub const LOG_DIR_ENV: &str = "CORRIDORS_LOG_DIR";
/// Environment variable holding the animation delay in milliseconds
pub const STEP_DELAY_ENV: &str = "CORRIDORS_DELAY_MS";

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of cells along x
    pub width: u16,
    /// Number of cells along z
    pub depth: u16,
    /// Seed for the weight RNG. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Cell the maze grows from
    pub start: (u16, u16),
    /// Time to wait between animated steps
    pub step_delay: Duration,
    pub log_level: Level,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 35,
            depth: 35,
            seed: None,
            start: (0, 0),
            step_delay: Duration::from_millis(10),
            log_level: Level::INFO,
            log_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Reads positional arguments `[width] [depth] [seed]`, executable name excluded.
    /// Missing arguments keep their defaults.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();
        if let Some(width) = args.next() {
            config.width = parse("width", &width)?;
        }
        if let Some(depth) = args.next() {
            config.depth = parse("depth", &depth)?;
        }
        if let Some(seed) = args.next() {
            config.seed = Some(parse("seed", &seed)?);
        }
        Ok(config)
    }

    /// Applies overrides from the environment. `lookup` is usually
    /// `|key| std::env::var(key).ok()`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = parse(LOG_LEVEL_ENV, &level)?;
        }
        if let Some(dir) = lookup(LOG_DIR_ENV) {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(delay) = lookup(STEP_DELAY_ENV) {
            self.step_delay = Duration::from_millis(parse(STEP_DELAY_ENV, &delay)?);
        }
        Ok(self)
    }

    /// Reads the process arguments and environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::from_args(std::env::args().skip(1))?
            .with_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 2 || self.depth < 2 {
            return Err(MazeError::InvalidDimension {
                width: self.width,
                depth: self.depth,
            }
            .into());
        }
        let (x, z) = self.start;
        if x >= self.width || z >= self.depth {
            return Err(ConfigError::StartOutOfBounds {
                x,
                z,
                width: self.width,
                depth: self.depth,
            });
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
