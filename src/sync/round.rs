//! Values handed back to the presentation layer

use crate::achievements::Achievement;
use crate::leaderboard::{Rank, RankingEntry};

/// Locally persisted best score and number of rounds played
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScoreRecord {
    pub best_score: i64,
    pub attempt_count: i64,
}

/// Where the orchestrator is within a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoundState {
    #[default]
    Idle,
    Sampling,
    Evaluating,
    Submitting,
}

/// What happened to the remote row during a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Not a new personal best, so nothing was sent
    NotAttempted,
    /// No row existed for this token; one was created
    Inserted,
    /// The existing row was overwritten (score >= stored score)
    Updated,
    /// The stored row already had a higher score and was left alone
    KeptExisting,
    /// A request failed; the local best is still recorded
    Failed,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, SubmitOutcome::Failed)
    }
}

/// Summary of one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub score: i64,
    pub is_best: bool,
    /// The achievement this round unlocked, if any
    pub achievement: Option<Achievement>,
    pub comment: String,
    pub rarity_label: String,
    /// Presentation hint: big score or an unlock
    pub is_camera_effect: bool,
    /// Presentation hint: an unlock, or a new best at or above the threshold
    pub should_celebrate: bool,
    /// Attempt number of this round (1-based)
    pub attempt_count: i64,
    pub submission: SubmitOutcome,
}

impl RoundResult {
    pub fn is_achievement_unlocked(&self) -> bool {
        self.achievement.is_some()
    }
}

/// Result of a username change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameChange {
    /// Saved locally and pushed to the existing remote row
    Synced,
    /// Saved locally; there is no remote row yet
    LocalOnly,
    /// Saved locally; the remote update failed
    RemoteFailed,
}

/// Top of the leaderboard plus this player's own row
#[derive(Debug, Clone, PartialEq)]
pub struct RankingBoard {
    pub top: Vec<RankingEntry>,
    pub mine: Option<RankingEntry>,
    pub rank: Rank,
}
