//! Shared leaderboard
//!
//! [`RankingTable`] is the raw remote table: every call is one request, no
//! retries, and failures come back as [`LeaderboardError`].
//! [`LeaderboardClient`] sits on top and turns each failure into the
//! operation's fallback value (empty list, `None`, `false`) after logging it,
//! so callers never have to handle network errors.

mod memory;
mod postgrest;
mod types;

pub use memory::{CallCounts, MemoryTable};
pub use postgrest::PostgrestTable;
pub use types::{Rank, RankingEntry, RankingSubmission, RowLookup};

use std::sync::Arc;

use async_trait::async_trait;

use crate::identity::ClientIdentity;

/// Failure of a single leaderboard request
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("Leaderboard is not configured")]
    NotConfigured,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request rejected by the table: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Request task failed: {0}")]
    Task(String),
}

impl LeaderboardError {
    /// The server answered, but with something we could not interpret
    pub fn is_data_integrity(&self) -> bool {
        matches!(self, LeaderboardError::Decode(_))
    }
}

/// Remote row store holding one [`RankingEntry`] per client token
#[async_trait]
pub trait RankingTable: Send + Sync {
    /// Rows ordered by score descending, at most `limit`
    async fn list_top(&self, limit: usize) -> Result<Vec<RankingEntry>, LeaderboardError>;

    /// The row for `token`, if any
    async fn get_by_token(&self, token: &str) -> Result<Option<RankingEntry>, LeaderboardError>;

    /// Create a new row. Not idempotent.
    async fn insert(&self, entry: &RankingSubmission) -> Result<(), LeaderboardError>;

    /// Rewrite username, score, created_at and attempt_count of the rows
    /// matching `entry.client_token`
    async fn update(&self, entry: &RankingSubmission) -> Result<(), LeaderboardError>;

    /// Number of rows with a score strictly greater than `score`
    async fn count_score_greater_than(&self, score: i64) -> Result<i64, LeaderboardError>;
}

/// Table used when no leaderboard URL is configured; every call fails
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTable;

#[async_trait]
impl RankingTable for OfflineTable {
    async fn list_top(&self, _limit: usize) -> Result<Vec<RankingEntry>, LeaderboardError> {
        Err(LeaderboardError::NotConfigured)
    }

    async fn get_by_token(&self, _token: &str) -> Result<Option<RankingEntry>, LeaderboardError> {
        Err(LeaderboardError::NotConfigured)
    }

    async fn insert(&self, _entry: &RankingSubmission) -> Result<(), LeaderboardError> {
        Err(LeaderboardError::NotConfigured)
    }

    async fn update(&self, _entry: &RankingSubmission) -> Result<(), LeaderboardError> {
        Err(LeaderboardError::NotConfigured)
    }

    async fn count_score_greater_than(&self, _score: i64) -> Result<i64, LeaderboardError> {
        Err(LeaderboardError::NotConfigured)
    }
}

fn log_failure(operation: &str, err: &LeaderboardError) {
    match err {
        LeaderboardError::NotConfigured => {
            tracing::debug!("Leaderboard {} skipped: offline", operation)
        }
        e if e.is_data_integrity() => {
            tracing::warn!("Leaderboard {} returned malformed data: {}", operation, e)
        }
        e => tracing::warn!("Leaderboard {} failed: {}", operation, e),
    }
}

/// Stateless facade over a [`RankingTable`] with logged fallbacks
#[derive(Clone)]
pub struct LeaderboardClient {
    table: Arc<dyn RankingTable>,
}

impl LeaderboardClient {
    pub fn new(table: Arc<dyn RankingTable>) -> Self {
        Self { table }
    }

    /// Client whose every call falls back immediately
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineTable))
    }

    /// Top rows by score; empty on failure
    pub async fn list_top(&self, limit: usize) -> Vec<RankingEntry> {
        match self.table.list_top(limit).await {
            Ok(rows) => rows,
            Err(e) => {
                log_failure("list", &e);
                Vec::new()
            }
        }
    }

    /// Row lookup that keeps "missing" apart from "could not tell"
    pub async fn lookup(&self, token: &str) -> RowLookup {
        match self.table.get_by_token(token).await {
            Ok(Some(entry)) => RowLookup::Found(entry),
            Ok(None) => RowLookup::Missing,
            Err(e) => {
                log_failure("lookup", &e);
                RowLookup::Unavailable
            }
        }
    }

    /// The row for `token`; `None` when absent or on failure
    pub async fn get_by_token(&self, token: &str) -> Option<RankingEntry> {
        self.lookup(token).await.found()
    }

    /// This install's row
    pub async fn get_mine(&self, identity: &ClientIdentity) -> Option<RankingEntry> {
        self.get_by_token(&identity.client_token).await
    }

    /// Create a row; `false` on failure
    pub async fn insert(&self, entry: &RankingSubmission) -> bool {
        match self.table.insert(entry).await {
            Ok(()) => true,
            Err(e) => {
                log_failure("insert", &e);
                false
            }
        }
    }

    /// Rewrite the row for `entry.client_token`; `false` on failure
    pub async fn update(&self, entry: &RankingSubmission) -> bool {
        match self.table.update(entry).await {
            Ok(()) => true,
            Err(e) => {
                log_failure("update", &e);
                false
            }
        }
    }

    /// Rows scoring strictly above `score`; `None` on failure
    pub async fn count_score_greater_than(&self, score: i64) -> Option<i64> {
        match self.table.count_score_greater_than(score).await {
            Ok(count) => Some(count),
            Err(e) => {
                log_failure("count", &e);
                None
            }
        }
    }

    /// 1-based rank of `token`'s row: rows strictly above it, plus one
    pub async fn rank_of(&self, token: &str) -> Rank {
        let Some(entry) = self.get_by_token(token).await else {
            return Rank::Unranked;
        };
        match self.count_score_greater_than(entry.score).await {
            Some(above) => Rank::Ranked(above + 1),
            None => Rank::Unranked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(token: &str, score: i64) -> RankingSubmission {
        RankingSubmission {
            client_token: token.to_string(),
            username: token.to_uppercase(),
            score,
            created_at: chrono::Utc::now(),
            attempt_count: 1,
        }
    }

    #[tokio::test]
    async fn test_offline_client_falls_back() {
        let client = LeaderboardClient::offline();

        assert!(client.list_top(10).await.is_empty());
        assert_eq!(client.lookup("tok").await, RowLookup::Unavailable);
        assert!(client.get_by_token("tok").await.is_none());
        assert!(!client.insert(&submission("tok", 5)).await);
        assert!(!client.update(&submission("tok", 5)).await);
        assert_eq!(client.count_score_greater_than(5).await, None);
        assert_eq!(client.rank_of("tok").await, Rank::Unranked);
    }

    #[tokio::test]
    async fn test_rank_matches_sorted_position() {
        let table = Arc::new(MemoryTable::new());
        let client = LeaderboardClient::new(table.clone());
        for (token, score) in [("a", 300), ("b", 120), ("c", 45), ("d", 7)] {
            assert!(client.insert(&submission(token, score)).await);
        }

        let top = client.list_top(10).await;
        for (i, entry) in top.iter().enumerate() {
            assert_eq!(
                client.rank_of(&entry.client_token).await,
                Rank::Ranked(i as i64 + 1)
            );
        }
        assert_eq!(client.rank_of("nobody").await, Rank::Unranked);
    }

    #[tokio::test]
    async fn test_failing_table_hides_errors() {
        let table = Arc::new(MemoryTable::new());
        let client = LeaderboardClient::new(table.clone());
        assert!(client.insert(&submission("a", 10)).await);

        table.set_failing(true);
        assert!(client.list_top(10).await.is_empty());
        assert_eq!(client.lookup("a").await, RowLookup::Unavailable);
        assert_eq!(client.rank_of("a").await, Rank::Unranked);

        table.set_failing(false);
        assert_eq!(client.rank_of("a").await, Rank::Ranked(1));
    }
}
