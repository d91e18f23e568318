//! Score sync orchestrator
//!
//! Runs one round at a time:
//!
//! ```text
//! Idle -> Sampling -> Evaluating -> (Submitting) -> Idle
//! ```
//!
//! Local state (attempt count, achievements, best score) is written before
//! any network call, so a failed or abandoned sync never loses progress. The
//! remote write is check-then-act (`lookup`, then `insert` or `update`) and is
//! not atomic: two installs sharing a token can race, and the later write
//! wins regardless of score.
//!
//! Renames hold their own guard and may overlap a round. A round reads the
//! display name after its lookup; a stale name reaches the row only if a
//! rename starts after that read and its remote update lands first.

mod guard;
mod round;

pub use round::{BestScoreRecord, NameChange, RankingBoard, RoundResult, RoundState, SubmitOutcome};

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::oneshot;

use crate::achievements::{Achievement, AchievementRegistry};
use crate::config::GameSettings;
use crate::distribution::ScoreDistribution;
use crate::error::{GameError, GameResult};
use crate::identity::{validate_username, ClientIdentity};
use crate::leaderboard::{LeaderboardClient, Rank, RankingEntry, RankingSubmission, RowLookup};
use crate::present;
use crate::store::{keys, StateStore};
use guard::BusyGuard;

/// Local outcome of a round, before submission
struct Evaluation {
    score: i64,
    is_best: bool,
    achievement: Option<Achievement>,
    comment: String,
    rarity_label: String,
    is_camera_effect: bool,
    should_celebrate: bool,
    attempt_count: i64,
}

/// Coordinates sampling, achievements, the local best score and the
/// leaderboard. It is the only writer of [`BestScoreRecord`] and the only
/// caller of the leaderboard's write operations.
pub struct ScoreSyncOrchestrator {
    distribution: Mutex<ScoreDistribution>,
    registry: Mutex<AchievementRegistry>,
    identity: RwLock<ClientIdentity>,
    record: Mutex<BestScoreRecord>,
    state: Mutex<RoundState>,
    store: Arc<dyn StateStore>,
    leaderboard: LeaderboardClient,
    score_threshold: i64,
    new_record_comment: String,
    round_busy: Arc<AtomicBool>,
    rename_busy: Arc<AtomicBool>,
}

impl ScoreSyncOrchestrator {
    /// Wire the components together and load the best-score record
    pub fn new(
        distribution: ScoreDistribution,
        registry: AchievementRegistry,
        identity: ClientIdentity,
        store: Arc<dyn StateStore>,
        leaderboard: LeaderboardClient,
        settings: &GameSettings,
    ) -> GameResult<Self> {
        let record = BestScoreRecord {
            best_score: store.get_i64(keys::BEST_SCORE)?.unwrap_or(0),
            attempt_count: store.get_i64(keys::ATTEMPT_COUNT)?.unwrap_or(0),
        };
        tracing::debug!(
            "Loaded best score {} after {} attempts",
            record.best_score,
            record.attempt_count
        );

        Ok(Self {
            distribution: Mutex::new(distribution),
            registry: Mutex::new(registry),
            identity: RwLock::new(identity),
            record: Mutex::new(record),
            state: Mutex::new(RoundState::Idle),
            store,
            leaderboard,
            score_threshold: settings.score_threshold,
            new_record_comment: settings.new_record_comment.clone(),
            round_busy: Arc::new(AtomicBool::new(false)),
            rename_busy: Arc::new(AtomicBool::new(false)),
        })
    }

    // ========================================
    // ROUNDS
    // ========================================

    /// Play one round and wait for it, submission included.
    ///
    /// Fails with [`GameError::Busy`] if a round is already in flight.
    pub async fn play_round(&self) -> GameResult<RoundResult> {
        let guard = BusyGuard::try_acquire(&self.round_busy).ok_or(GameError::Busy("round"))?;
        self.run_round(guard).await
    }

    /// Start a round in the background and return its completion signal.
    ///
    /// The busy check happens before this returns. Dropping the receiver
    /// abandons the round: it still finishes its local writes and submission,
    /// but the result goes nowhere.
    pub fn start_round(
        self: &Arc<Self>,
    ) -> GameResult<oneshot::Receiver<GameResult<RoundResult>>> {
        let guard = BusyGuard::try_acquire(&self.round_busy).ok_or(GameError::Busy("round"))?;
        let (tx, rx) = oneshot::channel();
        let this = Arc::clone(self);

        tokio::spawn(async move {
            let result = this.run_round(guard).await;
            if tx.send(result).is_err() {
                tracing::debug!("Round finished after the caller left; result dropped");
            }
        });

        Ok(rx)
    }

    async fn run_round(&self, _guard: BusyGuard) -> GameResult<RoundResult> {
        let evaluation = match self.evaluate() {
            Ok(evaluation) => evaluation,
            Err(e) => {
                self.set_state(RoundState::Idle);
                return Err(e);
            }
        };

        let submission = if evaluation.is_best {
            self.set_state(RoundState::Submitting);
            self.submit(evaluation.score, evaluation.attempt_count).await
        } else {
            SubmitOutcome::NotAttempted
        };
        self.set_state(RoundState::Idle);

        Ok(RoundResult {
            score: evaluation.score,
            is_best: evaluation.is_best,
            achievement: evaluation.achievement,
            comment: evaluation.comment,
            rarity_label: evaluation.rarity_label,
            is_camera_effect: evaluation.is_camera_effect,
            should_celebrate: evaluation.should_celebrate,
            attempt_count: evaluation.attempt_count,
            submission,
        })
    }

    /// Sampling and Evaluating: everything local, persisted as it happens
    fn evaluate(&self) -> GameResult<Evaluation> {
        self.set_state(RoundState::Sampling);
        let (score, rarity_label) = {
            let mut distribution = self.lock_distribution();
            let score = distribution.sample();
            (score, present::rarity_label(&distribution, score))
        };

        let mut record = self.record.lock().expect("Record lock poisoned");
        let attempt_count = record.attempt_count + 1;
        self.store.set_i64(keys::ATTEMPT_COUNT, attempt_count)?;
        record.attempt_count = attempt_count;

        self.set_state(RoundState::Evaluating);
        let is_best = score > record.best_score;
        let achievement = self
            .registry
            .lock()
            .expect("Registry lock poisoned")
            .try_unlock(score)?;

        let comment = match (&achievement, is_best) {
            (Some(a), _) => a.comment.clone(),
            (None, true) => self.new_record_comment.clone(),
            (None, false) => String::new(),
        };
        let unlocked = achievement.is_some();
        let is_camera_effect = score >= self.score_threshold || unlocked;
        let should_celebrate = unlocked || (is_best && score >= self.score_threshold);

        if is_best {
            self.store.set_i64(keys::BEST_SCORE, score)?;
            record.best_score = score;
            tracing::info!("New best score: {} (attempt {})", score, attempt_count);
        }

        Ok(Evaluation {
            score,
            is_best,
            achievement,
            comment,
            rarity_label,
            is_camera_effect,
            should_celebrate,
            attempt_count,
        })
    }

    /// Submit `score` if it is at least the stored remote score
    async fn submit(&self, score: i64, attempt_count: i64) -> SubmitOutcome {
        let token = self.identity().client_token;
        let lookup = self.leaderboard.lookup(&token).await;

        // Read the name after the lookup so a rename that landed meanwhile survives
        let submission = RankingSubmission {
            client_token: token,
            username: self.identity().username,
            score,
            created_at: chrono::Utc::now(),
            attempt_count,
        };

        match lookup {
            RowLookup::Unavailable => {
                // Unknown whether a row exists; inserting could duplicate it
                tracing::warn!("Skipping score submission: own row lookup failed");
                SubmitOutcome::Failed
            }
            RowLookup::Missing => {
                if self.leaderboard.insert(&submission).await {
                    tracing::info!("Submitted first score {} to the leaderboard", score);
                    SubmitOutcome::Inserted
                } else {
                    SubmitOutcome::Failed
                }
            }
            // Ties overwrite too, refreshing timestamp and attempt count
            RowLookup::Found(existing) if score >= existing.score => {
                if self.leaderboard.update(&submission).await {
                    tracing::info!(
                        "Leaderboard score updated: {} -> {}",
                        existing.score,
                        score
                    );
                    SubmitOutcome::Updated
                } else {
                    SubmitOutcome::Failed
                }
            }
            RowLookup::Found(existing) => {
                tracing::info!(
                    "Leaderboard already holds {} (>= {}); no update needed",
                    existing.score,
                    score
                );
                SubmitOutcome::KeptExisting
            }
        }
    }

    /// Push the local best to the leaderboard again, e.g. after an offline
    /// session. Shares the round guard.
    pub async fn resync(&self) -> GameResult<SubmitOutcome> {
        let _guard = BusyGuard::try_acquire(&self.round_busy).ok_or(GameError::Busy("round"))?;
        let record = self.best_record();
        if record.best_score <= 0 {
            return Ok(SubmitOutcome::NotAttempted);
        }

        self.set_state(RoundState::Submitting);
        let outcome = self.submit(record.best_score, record.attempt_count).await;
        self.set_state(RoundState::Idle);
        Ok(outcome)
    }

    // ========================================
    // RANKING
    // ========================================

    /// This install's 1-based rank, or [`Rank::Unranked`]
    pub async fn get_my_rank(&self) -> Rank {
        let token = self.identity().client_token;
        self.leaderboard.rank_of(&token).await
    }

    /// Top `limit` rows and this player's own row and rank, fetched concurrently
    pub async fn ranking_board(&self, limit: usize) -> RankingBoard {
        let token = self.identity().client_token;
        let (top, mine) = tokio::join!(
            self.leaderboard.list_top(limit),
            self.leaderboard.get_by_token(&token)
        );

        let rank = match &mine {
            Some(entry) => match self.leaderboard.count_score_greater_than(entry.score).await {
                Some(above) => Rank::Ranked(above + 1),
                None => Rank::Unranked,
            },
            None => Rank::Unranked,
        };

        RankingBoard { top, mine, rank }
    }

    // ========================================
    // USERNAME
    // ========================================

    /// Change the display name locally, then on the remote row if one exists.
    ///
    /// The remote row keeps its score and timestamp; its attempt count is
    /// refreshed from the local record.
    pub async fn change_username(&self, new_name: &str) -> GameResult<NameChange> {
        validate_username(new_name)?;
        let _guard = BusyGuard::try_acquire(&self.rename_busy)
            .ok_or(GameError::Busy("username change"))?;

        let token = {
            let mut identity = self.identity.write().expect("Identity lock poisoned");
            identity.set_username(&self.store, new_name)?;
            identity.client_token.clone()
        };
        tracing::info!("Username changed to {}", new_name);

        let attempt_count = self.best_record().attempt_count;
        let outcome = match self.leaderboard.lookup(&token).await {
            RowLookup::Found(entry) => {
                let submission = RankingSubmission::renamed(&entry, new_name, attempt_count);
                if self.leaderboard.update(&submission).await {
                    NameChange::Synced
                } else {
                    NameChange::RemoteFailed
                }
            }
            RowLookup::Missing => NameChange::LocalOnly,
            RowLookup::Unavailable => NameChange::RemoteFailed,
        };
        Ok(outcome)
    }

    // ========================================
    // ACCESSORS
    // ========================================

    pub fn state(&self) -> RoundState {
        *self.state.lock().expect("State lock poisoned")
    }

    pub fn best_record(&self) -> BestScoreRecord {
        *self.record.lock().expect("Record lock poisoned")
    }

    pub fn identity(&self) -> ClientIdentity {
        self.identity.read().expect("Identity lock poisoned").clone()
    }

    /// All achievements in evaluation order, with unlock state
    pub fn achievements(&self) -> Vec<Achievement> {
        self.registry
            .lock()
            .expect("Registry lock poisoned")
            .achievements()
            .to_vec()
    }

    pub fn leaderboard(&self) -> &LeaderboardClient {
        &self.leaderboard
    }

    /// Odds label for any score under this game's distribution
    pub fn rarity_label(&self, score: i64) -> String {
        present::rarity_label(&self.lock_distribution(), score)
    }

    /// "1 in N" odds of rolling exactly `score`
    pub fn pinpoint_rarity(&self, score: i64) -> i64 {
        self.lock_distribution().pinpoint_rarity_of(score)
    }

    /// Share post text, with odds computed under this game's distribution
    pub fn share_text(&self, card: &present::ShareCard) -> String {
        present::share_text(&self.lock_distribution(), card)
    }

    /// Hover-style detail lines for a leaderboard row
    pub fn entry_details(&self, entry: &RankingEntry) -> String {
        present::entry_details(&self.lock_distribution(), entry)
    }

    fn lock_distribution(&self) -> std::sync::MutexGuard<'_, ScoreDistribution> {
        self.distribution.lock().expect("Distribution lock poisoned")
    }

    fn set_state(&self, next: RoundState) {
        let mut state = self.state.lock().expect("State lock poisoned");
        tracing::debug!("Round state {:?} -> {:?}", *state, next);
        *state = next;
    }
}
