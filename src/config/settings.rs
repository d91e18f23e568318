//! Settings configuration types

use serde::{Deserialize, Serialize};

/// Gameplay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    /// Mean of the exponential score distribution (must be > 0)
    /// Default: 50
    #[serde(default = "default_mean")]
    pub mean: i64,

    /// Scores at or above this trigger the camera effect and, on a new best,
    /// the celebration
    /// Default: 200
    #[serde(default = "default_score_threshold")]
    pub score_threshold: i64,

    /// Display name used until the player picks one
    #[serde(default = "default_username")]
    pub default_username: String,

    /// Comment shown for a new personal best without an achievement
    #[serde(default = "default_new_record_comment")]
    pub new_record_comment: String,

    /// Number of leaderboard rows fetched for the ranking view
    /// Default: 30
    #[serde(default = "default_ranking_limit")]
    pub ranking_limit: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mean: default_mean(),
            score_threshold: default_score_threshold(),
            default_username: default_username(),
            new_record_comment: default_new_record_comment(),
            ranking_limit: default_ranking_limit(),
        }
    }
}

fn default_mean() -> i64 {
    50
}

fn default_score_threshold() -> i64 {
    200
}

fn default_username() -> String {
    "Anonymous".to_string()
}

fn default_new_record_comment() -> String {
    "New personal best, congratulations!".to_string()
}

fn default_ranking_limit() -> usize {
    30
}

/// Remote leaderboard settings (a Supabase / PostgREST table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSettings {
    /// Project URL, e.g. "https://xyzcompany.supabase.co"
    ///
    /// When unset the game runs offline: scores are kept locally and every
    /// leaderboard call falls back to its empty value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Public API key, sent both as `apikey` and as the bearer token
    #[serde(default)]
    pub api_key: String,

    /// Table holding one row per client token
    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_key: String::new(),
            table: default_table(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

impl LeaderboardSettings {
    /// Configured URL, ignoring blank values
    pub fn endpoint(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

fn default_table() -> String {
    "ScoreRanking".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_read_timeout_secs() -> u64 {
    10
}
