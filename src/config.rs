use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::map::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH, DEFAULT_TILE_SIZE};

pub const CONFIG_FILE: &str = "catacomb.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_width: i32,
    pub map_height: i32,
    pub tile_size: i32,
    pub enemies_per_room: usize,
    pub trap_count: usize,
    pub trap_damage: i32,
    pub player_hp: i32,
    /// Base seed for every subsystem RNG. Absent means "derive from the
    /// wall clock", which is logged so a run can be replayed.
    pub seed: Option<u64>,
    pub bgm_dir: String,
    pub portrait_dir: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: DEFAULT_MAP_WIDTH,
            map_height: DEFAULT_MAP_HEIGHT,
            tile_size: DEFAULT_TILE_SIZE,
            enemies_per_room: 2,
            trap_count: 30,
            trap_damage: 5,
            player_hp: 30,
            seed: None,
            bgm_dir: "bgm".to_string(),
            portrait_dir: "cat_model".to_string(),
        }
    }
}

impl GameConfig {
    /// An absent file falls back to defaults; a present-but-broken file is
    /// a fatal startup error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_width < 10 || self.map_height < 10 {
            return Err(ConfigError::Invalid(format!(
                "map dimensions {}x{} are below the 10x10 minimum",
                self.map_width, self.map_height
            )));
        }
        if self.map_width > 500 || self.map_height > 500 {
            return Err(ConfigError::Invalid(format!(
                "map dimensions {}x{} exceed the 500x500 maximum",
                self.map_width, self.map_height
            )));
        }
        if self.tile_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "tile size {} must be positive",
                self.tile_size
            )));
        }
        if self.player_hp <= 0 {
            return Err(ConfigError::Invalid(format!(
                "player hp {} must be positive",
                self.player_hp
            )));
        }
        if self.trap_damage < 0 {
            return Err(ConfigError::Invalid(format!(
                "trap damage {} cannot be negative",
                self.trap_damage
            )));
        }
        Ok(())
    }
}
