//! CLI command implementations

pub mod play;
pub mod profile;
pub mod ranking;

use anyhow::{Context, Result};
use std::path::PathBuf;

use expgacha::config::Config;
use expgacha::GameContext;

/// Global flags shared by every command
pub struct OpenOptions {
    pub config_path: Option<PathBuf>,
    pub state_path: Option<PathBuf>,
    pub offline: bool,
}

/// Load the config (creating it on first run) and open the game
pub fn open_game(options: &OpenOptions) -> Result<GameContext> {
    let config = match &options.config_path {
        Some(path) => Config::load_or_init(path)?,
        None => Config::load()?,
    };

    GameContext::open(config, options.state_path.as_deref(), options.offline)
        .context("Failed to open game state")
}
