//! Leaderboard row types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One leaderboard row, as stored remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// Server-assigned row ID (numeric or UUID, normalized to a string)
    #[serde(deserialize_with = "deserialize_row_id")]
    pub id: String,
    pub client_token: String,
    pub username: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attempt_count: i64,
}

/// Row contents written by insert and update (no `id`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingSubmission {
    pub client_token: String,
    pub username: String,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub attempt_count: i64,
}

impl RankingSubmission {
    /// Submission that rewrites `entry` with a new display name, keeping its
    /// score and timestamp
    pub fn renamed(entry: &RankingEntry, username: &str, attempt_count: i64) -> Self {
        Self {
            client_token: entry.client_token.clone(),
            username: username.to_string(),
            score: entry.score,
            created_at: entry.created_at,
            attempt_count,
        }
    }
}

/// Outcome of looking up a row by client token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowLookup {
    Found(RankingEntry),
    Missing,
    /// The request failed; whether a row exists is unknown
    Unavailable,
}

impl RowLookup {
    pub fn found(self) -> Option<RankingEntry> {
        match self {
            RowLookup::Found(entry) => Some(entry),
            _ => None,
        }
    }
}

/// A player's position on the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    /// 1-based position
    Ranked(i64),
    /// No row for this token (or the lookup failed)
    Unranked,
}

impl Rank {
    pub fn position(&self) -> Option<i64> {
        match self {
            Rank::Ranked(n) => Some(*n),
            Rank::Unranked => None,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rank::Ranked(n) => write!(f, "#{}", n),
            Rank::Unranked => f.write_str("unranked"),
        }
    }
}

fn deserialize_row_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RowId {
        Text(String),
        Number(i64),
    }

    Ok(match RowId::deserialize(deserializer)? {
        RowId::Text(s) => s,
        RowId::Number(n) => n.to_string(),
    })
}
