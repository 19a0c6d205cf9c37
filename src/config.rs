/// Game settings from `config.toml`.
///
/// Falls back to defaults if the file is missing or incomplete; a file
/// that cannot be read or parsed is reported back to the caller, which
/// logs it once tracing is running.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub play: PlayConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,   // one simulation tick + one render
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayConfig {
    pub start_room: usize,
    pub health: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    pub file: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    play: TomlPlay,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlPlay {
    #[serde(default)]
    start_room: usize,
    #[serde(default = "default_health")]
    health: u32,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }     // ~60 ticks per second
fn default_health() -> u32 { 5 }
fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "blocktoss.log".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlPlay {
    fn default() -> Self {
        TomlPlay { start_room: 0, health: default_health() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { level: default_log_level(), file: default_log_file() }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(cfg: TomlConfig) -> Self {
        GameConfig {
            speed: SpeedConfig { tick_rate_ms: cfg.speed.tick_rate_ms.max(1) },
            play: PlayConfig { start_room: cfg.play.start_room, health: cfg.play.health },
            log: LogConfig { level: cfg.log.level, file: PathBuf::from(cfg.log.file) },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// First `config.toml` found in `candidate_dirs`. Missing keys take
    /// their defaults; an unreadable or malformed file yields the
    /// defaults plus the error.
    pub fn load() -> (Self, Option<ConfigError>) {
        let Some(path) = candidate_dirs()
            .into_iter()
            .map(|d| d.join(CONFIG_FILE))
            .find(|p| p.exists())
        else {
            return (GameConfig::default(), None);
        };
        match Self::from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (GameConfig::default(), Some(e)),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: TomlConfig = toml::from_str(text)?;
        Ok(cfg.into())
    }
}

/// Exe directory (symlinks resolved), then the working directory if
/// it differs.
fn candidate_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();

    let mut dirs: Vec<PathBuf> = exe_dir.into_iter().collect();
    if let Some(dir) = cwd.filter(|d| !dirs.contains(d)) {
        dirs.push(dir);
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}
