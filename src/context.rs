//! Component wiring
//!
//! [`GameContext`] builds every component once, in dependency order, and
//! hands out the orchestrator. Nothing in the crate is a global.

use std::path::Path;
use std::sync::Arc;

use crate::achievements::AchievementRegistry;
use crate::config::Config;
use crate::distribution::{RandomSource, ScoreDistribution};
use crate::error::GameResult;
use crate::identity::ClientIdentity;
use crate::leaderboard::{LeaderboardClient, OfflineTable, PostgrestTable, RankingTable};
use crate::present;
use crate::store::{SqliteStore, StateStore};
use crate::sync::ScoreSyncOrchestrator;

/// A fully wired game
pub struct GameContext {
    config: Config,
    orchestrator: Arc<ScoreSyncOrchestrator>,
}

impl GameContext {
    /// Open the game with SQLite state at `state_path` (or the default
    /// location) and the configured leaderboard.
    ///
    /// With `offline` set, or without a leaderboard URL, every leaderboard
    /// call falls back immediately.
    pub fn open(config: Config, state_path: Option<&Path>, offline: bool) -> GameResult<Self> {
        config.validate()?;

        let store: Arc<dyn StateStore> = match state_path {
            Some(path) => Arc::new(SqliteStore::open(path)?),
            None => Arc::new(SqliteStore::open_default()?),
        };

        let table: Arc<dyn RankingTable> = match config.leaderboard.endpoint() {
            Some(_) if !offline => Arc::new(PostgrestTable::from_settings(&config.leaderboard)?),
            _ => {
                tracing::debug!("Leaderboard disabled; playing offline");
                Arc::new(OfflineTable)
            }
        };

        let distribution = ScoreDistribution::with_mean(config.game.mean)?;
        Self::from_parts(config, distribution, store, table)
    }

    /// Wire explicitly provided components
    pub fn from_parts(
        config: Config,
        distribution: ScoreDistribution,
        store: Arc<dyn StateStore>,
        table: Arc<dyn RankingTable>,
    ) -> GameResult<Self> {
        config.validate()?;

        let identity = ClientIdentity::load(&store, &config.game.default_username)?;
        let registry = AchievementRegistry::initialize(config.achievements.clone(), Arc::clone(&store))?;
        let orchestrator = ScoreSyncOrchestrator::new(
            distribution,
            registry,
            identity,
            store,
            LeaderboardClient::new(table),
            &config.game,
        )?;

        Ok(Self {
            config,
            orchestrator: Arc::new(orchestrator),
        })
    }

    /// Same as [`Self::from_parts`] with a distribution over `source`
    pub fn with_source(
        config: Config,
        source: Box<dyn RandomSource>,
        store: Arc<dyn StateStore>,
        table: Arc<dyn RankingTable>,
    ) -> GameResult<Self> {
        let distribution = ScoreDistribution::new(config.game.mean, source)?;
        Self::from_parts(config, distribution, store, table)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<ScoreSyncOrchestrator> {
        &self.orchestrator
    }

    /// Share post for the player's best score and current rank
    pub async fn share_best(&self) -> Option<String> {
        let orchestrator = &self.orchestrator;
        let record = orchestrator.best_record();
        if record.best_score <= 0 {
            return None;
        }

        let rank = orchestrator.get_my_rank().await;
        let achievement_comment = orchestrator
            .achievements()
            .into_iter()
            .find(|a| a.is_unlocked && a.covers(record.best_score))
            .map(|a| a.comment);
        let card = present::ShareCard {
            score: record.best_score,
            is_best: true,
            rank,
            achievement_comment,
        };
        Some(orchestrator.share_text(&card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{uniform_for_score, ScriptedSource};
    use crate::error::GameError;
    use crate::leaderboard::{MemoryTable, Rank};
    use crate::store::MemoryStore;

    #[test]
    fn test_open_rejects_invalid_config_before_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.db");
        let mut config = Config::default();
        config.game.mean = 0;

        assert!(matches!(
            GameContext::open(config, Some(&state), true),
            Err(GameError::Configuration(_))
        ));
        assert!(!state.exists());
    }

    #[tokio::test]
    async fn test_open_offline_plays_locally() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.db");
        let mut config = Config::default();
        config.leaderboard.url = Some("http://127.0.0.1:9".to_string());

        let ctx = GameContext::open(config, Some(&state), true).unwrap();
        let result = ctx.orchestrator().play_round().await.unwrap();
        assert!(result.is_best);
        assert!(!result.submission.is_success());
        assert_eq!(ctx.orchestrator().get_my_rank().await, Rank::Unranked);
    }

    #[tokio::test]
    async fn test_share_best() {
        let table = Arc::new(MemoryTable::new());
        let source = Box::new(ScriptedSource::new(vec![uniform_for_score(50, 120)]));
        let ctx = GameContext::with_source(
            Config::default(),
            source,
            Arc::new(MemoryStore::new()),
            table,
        )
        .unwrap();

        assert!(ctx.share_best().await.is_none());
        ctx.orchestrator().play_round().await.unwrap();

        let text = ctx.share_best().await.unwrap();
        assert!(text.starts_with("🏆 Score: 120\n"));
        assert!(text.contains("Current rank: #1"));
        // Triple Digits (100..=149) is the first range covering 120
        assert!(text.contains("Welcome to three digits."));
    }
}
