//! Configuration loading and management

mod io;
mod settings;

pub use settings::{GameSettings, LeaderboardSettings};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::achievements::{default_definitions, AchievementDefinition};
use crate::error::{GameError, GameResult};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gameplay settings
    #[serde(default)]
    pub game: GameSettings,

    /// Remote leaderboard settings
    #[serde(default)]
    pub leaderboard: LeaderboardSettings,

    /// Achievement table, evaluated in order (first match wins)
    #[serde(default = "default_definitions")]
    pub achievements: Vec<AchievementDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: GameSettings::default(),
            leaderboard: LeaderboardSettings::default(),
            achievements: default_definitions(),
        }
    }
}

impl Config {
    /// Check invariants that would otherwise surface mid-game
    pub fn validate(&self) -> GameResult<()> {
        if self.game.mean <= 0 {
            return Err(GameError::Configuration(format!(
                "game.mean must be positive, got {}",
                self.game.mean
            )));
        }

        if self.game.ranking_limit == 0 {
            return Err(GameError::Configuration(
                "game.ranking_limit must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for def in &self.achievements {
            if def.min_score > def.max_score {
                return Err(GameError::Configuration(format!(
                    "achievement '{}' has min_score {} above max_score {}",
                    def.id.as_str(),
                    def.min_score,
                    def.max_score
                )));
            }
            if !seen.insert(def.id) {
                return Err(GameError::Configuration(format!(
                    "achievement '{}' is defined more than once",
                    def.id.as_str()
                )));
            }
        }

        Ok(())
    }
}
