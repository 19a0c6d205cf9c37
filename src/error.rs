/// Error types.
///
/// The simulation core never fails: grid access wraps or clamps. Errors
/// only come from the edges of the program: reading configuration,
/// loading rooms, and talking to the terminal.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("map data is {len} bytes, expected whole 16-tile rows covering at most {rows} rows")]
    MapSize { len: usize, rows: usize },
    #[error("start cell ({x}, {y}) is outside the room")]
    StartOutOfBounds { x: i32, y: i32 },
    #[error("room {index} does not exist ({count} rooms)")]
    UnknownRoom { index: usize, count: usize },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Level(#[from] LevelError),
}
