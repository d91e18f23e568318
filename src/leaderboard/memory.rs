//! In-process ranking table
//!
//! Behaves like the remote table (including the lack of a uniqueness
//! constraint on `client_token`) and counts calls, which makes the sync
//! protocol observable in tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{LeaderboardError, RankingEntry, RankingSubmission, RankingTable};

/// Number of calls made per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub get: usize,
    pub insert: usize,
    pub update: usize,
    pub count: usize,
}

#[derive(Default)]
struct Inner {
    rows: Vec<RankingEntry>,
    next_id: u64,
    calls: CallCounts,
}

#[derive(Default)]
pub struct MemoryTable {
    inner: Mutex<Inner>,
    failing: AtomicBool,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with rows
    pub fn with_rows(rows: Vec<RankingEntry>) -> Self {
        let table = Self::new();
        {
            let mut inner = table.lock();
            inner.next_id = rows.len() as u64;
            inner.rows = rows;
        }
        table
    }

    /// Make every subsequent call fail as if the network were down
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    pub fn rows(&self) -> Vec<RankingEntry> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("Memory table lock poisoned")
    }

    fn check_online(&self) -> Result<(), LeaderboardError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LeaderboardError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RankingTable for MemoryTable {
    async fn list_top(&self, limit: usize) -> Result<Vec<RankingEntry>, LeaderboardError> {
        self.lock().calls.list += 1;
        self.check_online()?;

        let mut rows = self.rows();
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<RankingEntry>, LeaderboardError> {
        self.lock().calls.get += 1;
        self.check_online()?;

        Ok(self
            .lock()
            .rows
            .iter()
            .find(|row| row.client_token == token)
            .cloned())
    }

    async fn insert(&self, entry: &RankingSubmission) -> Result<(), LeaderboardError> {
        self.lock().calls.insert += 1;
        self.check_online()?;

        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id.to_string();
        inner.rows.push(RankingEntry {
            id,
            client_token: entry.client_token.clone(),
            username: entry.username.clone(),
            score: entry.score,
            created_at: entry.created_at,
            attempt_count: entry.attempt_count,
        });
        Ok(())
    }

    async fn update(&self, entry: &RankingSubmission) -> Result<(), LeaderboardError> {
        self.lock().calls.update += 1;
        self.check_online()?;

        let mut inner = self.lock();
        for row in inner
            .rows
            .iter_mut()
            .filter(|row| row.client_token == entry.client_token)
        {
            row.username = entry.username.clone();
            row.score = entry.score;
            row.created_at = entry.created_at;
            row.attempt_count = entry.attempt_count;
        }
        Ok(())
    }

    async fn count_score_greater_than(&self, score: i64) -> Result<i64, LeaderboardError> {
        self.lock().calls.count += 1;
        self.check_online()?;

        Ok(self.lock().rows.iter().filter(|row| row.score > score).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(token: &str, score: i64) -> RankingSubmission {
        RankingSubmission {
            client_token: token.to_string(),
            username: "player".to_string(),
            score,
            created_at: chrono::Utc::now(),
            attempt_count: 1,
        }
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_truncated() {
        let table = MemoryTable::new();
        for (token, score) in [("a", 10), ("b", 90), ("c", 40)] {
            table.insert(&submission(token, score)).await.unwrap();
        }

        let top = table.list_top(2).await.unwrap();
        let scores: Vec<i64> = top.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![90, 40]);
    }

    #[tokio::test]
    async fn test_count_is_strict() {
        let table = MemoryTable::new();
        for (token, score) in [("a", 10), ("b", 20), ("c", 20)] {
            table.insert(&submission(token, score)).await.unwrap();
        }

        assert_eq!(table.count_score_greater_than(10).await.unwrap(), 2);
        assert_eq!(table.count_score_greater_than(20).await.unwrap(), 0);
        assert_eq!(table.calls().count, 2);
    }

    #[tokio::test]
    async fn test_update_rewrites_matching_row_only() {
        let table = MemoryTable::new();
        table.insert(&submission("a", 10)).await.unwrap();
        table.insert(&submission("b", 20)).await.unwrap();

        let mut change = submission("a", 55);
        change.username = "renamed".to_string();
        table.update(&change).await.unwrap();

        let a = table.get_by_token("a").await.unwrap().unwrap();
        let b = table.get_by_token("b").await.unwrap().unwrap();
        assert_eq!((a.score, a.username.as_str()), (55, "renamed"));
        assert_eq!(b.score, 20);
        assert_eq!(a.id, "1");
    }

    #[tokio::test]
    async fn test_failing_table_still_counts_calls() {
        let table = MemoryTable::new();
        table.set_failing(true);

        assert!(table.insert(&submission("a", 1)).await.is_err());
        assert_eq!(table.calls().insert, 1);
        assert!(table.rows().is_empty());
    }
}
