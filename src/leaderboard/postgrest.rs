//! PostgREST (Supabase) ranking table over HTTP.
//!
//! Requests go to `{url}/rest/v1/{table}` with the API key sent both as
//! `apikey` and as a bearer token. `ureq` is blocking, so each request runs
//! on tokio's blocking pool.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{LeaderboardError, RankingEntry, RankingSubmission, RankingTable};
use crate::config::LeaderboardSettings;
use crate::error::{GameError, GameResult};

/// Body of an update: every column except the filter key
#[derive(Serialize)]
struct UpdateBody<'a> {
    username: &'a str,
    score: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    attempt_count: i64,
}

/// Ranking table backed by a PostgREST endpoint
#[derive(Clone)]
pub struct PostgrestTable {
    endpoint: String,
    api_key: String,
    client: ureq::Agent,
}

impl PostgrestTable {
    /// Build from settings; the URL is required
    pub fn from_settings(settings: &LeaderboardSettings) -> GameResult<Self> {
        let url = settings.endpoint().ok_or_else(|| {
            GameError::Configuration("leaderboard.url is not set".to_string())
        })?;
        if settings.table.trim().is_empty() {
            return Err(GameError::Configuration(
                "leaderboard.table must not be empty".to_string(),
            ));
        }

        let client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(settings.connect_timeout_secs))
            .timeout_read(Duration::from_secs(settings.read_timeout_secs))
            .build();

        Ok(Self::with_agent(url, &settings.table, &settings.api_key, client))
    }

    /// Build against `base_url` with default timeouts
    pub fn new(base_url: &str, table: &str, api_key: &str) -> Self {
        let client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(10))
            .build();
        Self::with_agent(base_url, table, api_key, client)
    }

    fn with_agent(base_url: &str, table: &str, api_key: &str, client: ureq::Agent) -> Self {
        Self {
            endpoint: format!(
                "{}/rest/v1/{}",
                base_url.trim_end_matches('/'),
                encode_url_path_segment(table)
            ),
            api_key: api_key.to_string(),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: &str) -> ureq::Request {
        self.client
            .request(method, &self.endpoint)
            .set("apikey", &self.api_key)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Accept", "application/json")
    }

    /// Run a blocking request on tokio's blocking pool
    async fn blocking<T, F>(&self, op: F) -> Result<T, LeaderboardError>
    where
        F: FnOnce(&PostgrestTable) -> Result<T, LeaderboardError> + Send + 'static,
        T: Send + 'static,
    {
        let table = self.clone();
        tokio::task::spawn_blocking(move || op(&table))
            .await
            .map_err(|e| LeaderboardError::Task(e.to_string()))?
    }

    fn fetch_top(&self, limit: usize) -> Result<Vec<RankingEntry>, LeaderboardError> {
        tracing::debug!("GET {} top {}", self.endpoint, limit);
        let response = self
            .request("GET")
            .query("select", "*")
            .query("order", "score.desc")
            .query("limit", &limit.to_string())
            .call()
            .map_err(from_ureq)?;
        decode_rows(response)
    }

    fn fetch_by_token(&self, token: &str) -> Result<Option<RankingEntry>, LeaderboardError> {
        tracing::debug!("GET {} by token", self.endpoint);
        let response = self
            .request("GET")
            .query("select", "*")
            .query("client_token", &format!("eq.{}", token))
            .query("limit", "1")
            .call()
            .map_err(from_ureq)?;
        Ok(decode_rows(response)?.into_iter().next())
    }

    fn send_insert(&self, entry: &RankingSubmission) -> Result<(), LeaderboardError> {
        tracing::debug!("POST {} score {}", self.endpoint, entry.score);
        let response = self
            .request("POST")
            .set("Prefer", "return=representation")
            .send_json(entry)
            .map_err(from_ureq)?;

        // With return=representation a successful insert echoes the new row;
        // an empty array means a row-level policy swallowed it
        let created: Vec<serde_json::Value> = response
            .into_json()
            .map_err(|e| LeaderboardError::Decode(e.to_string()))?;
        if created.is_empty() {
            return Err(LeaderboardError::Rejected(
                "insert returned no rows".to_string(),
            ));
        }
        Ok(())
    }

    fn send_update(&self, entry: &RankingSubmission) -> Result<(), LeaderboardError> {
        tracing::debug!("PATCH {} score {}", self.endpoint, entry.score);
        let body = UpdateBody {
            username: &entry.username,
            score: entry.score,
            created_at: entry.created_at,
            attempt_count: entry.attempt_count,
        };
        self.request("PATCH")
            .query("client_token", &format!("eq.{}", entry.client_token))
            .set("Prefer", "return=minimal")
            .send_json(body)
            .map_err(from_ureq)?;
        Ok(())
    }

    fn fetch_count_above(&self, score: i64) -> Result<i64, LeaderboardError> {
        tracing::debug!("HEAD {} count score > {}", self.endpoint, score);
        let response = self
            .request("HEAD")
            .query("select", "id")
            .query("score", &format!("gt.{}", score))
            .set("Prefer", "count=exact")
            .call()
            .map_err(from_ureq)?;

        let range = response.header("Content-Range").ok_or_else(|| {
            LeaderboardError::Decode("count response has no Content-Range header".to_string())
        })?;
        parse_content_range_total(range).ok_or_else(|| {
            LeaderboardError::Decode(format!("unexpected Content-Range: {}", range))
        })
    }
}

#[async_trait]
impl RankingTable for PostgrestTable {
    async fn list_top(&self, limit: usize) -> Result<Vec<RankingEntry>, LeaderboardError> {
        self.blocking(move |t| t.fetch_top(limit)).await
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<RankingEntry>, LeaderboardError> {
        let token = token.to_string();
        self.blocking(move |t| t.fetch_by_token(&token)).await
    }

    async fn insert(&self, entry: &RankingSubmission) -> Result<(), LeaderboardError> {
        let entry = entry.clone();
        self.blocking(move |t| t.send_insert(&entry)).await
    }

    async fn update(&self, entry: &RankingSubmission) -> Result<(), LeaderboardError> {
        let entry = entry.clone();
        self.blocking(move |t| t.send_update(&entry)).await
    }

    async fn count_score_greater_than(&self, score: i64) -> Result<i64, LeaderboardError> {
        self.blocking(move |t| t.fetch_count_above(score)).await
    }
}

fn from_ureq(err: ureq::Error) -> LeaderboardError {
    match err {
        ureq::Error::Status(status, response) => LeaderboardError::Status {
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => LeaderboardError::Transport(transport.to_string()),
    }
}

fn decode_rows(response: ureq::Response) -> Result<Vec<RankingEntry>, LeaderboardError> {
    response
        .into_json()
        .map_err(|e| LeaderboardError::Decode(e.to_string()))
}

/// Total from a `Content-Range` header such as `0-9/42` or `*/42`
fn parse_content_range_total(header: &str) -> Option<i64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.trim().parse::<i64>().ok().filter(|n| *n >= 0)
}

fn encode_url_path_segment(segment: &str) -> String {
    // RFC3986 unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
    let mut out = String::with_capacity(segment.len());
    for &b in segment.as_bytes() {
        let is_unreserved =
            matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~');
        if is_unreserved {
            out.push(b as char);
        } else {
            out.push('%');
            out.push_str(&format!("{:02X}", b));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total(" */7 "), Some(7));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_endpoint_layout() {
        let table = PostgrestTable::new("https://demo.supabase.co/", "Score Ranking", "anon");
        assert_eq!(
            table.endpoint(),
            "https://demo.supabase.co/rest/v1/Score%20Ranking"
        );
    }

    #[test]
    fn test_from_settings_requires_url() {
        let settings = LeaderboardSettings::default();
        assert!(matches!(
            PostgrestTable::from_settings(&settings),
            Err(GameError::Configuration(_))
        ));

        let settings = LeaderboardSettings {
            url: Some("http://127.0.0.1:54321".to_string()),
            ..LeaderboardSettings::default()
        };
        let table = PostgrestTable::from_settings(&settings).unwrap();
        assert_eq!(table.endpoint(), "http://127.0.0.1:54321/rest/v1/ScoreRanking");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_transport_error() {
        // Port 9 (discard) is essentially never listening on localhost
        let table = PostgrestTable::new("http://127.0.0.1:9", "ScoreRanking", "anon");
        let err = table.list_top(5).await.unwrap_err();
        assert!(matches!(err, LeaderboardError::Transport(_)), "got {:?}", err);
    }
}
