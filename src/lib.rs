//! expgacha - Exponential Distribution Gacha
//!
//! Every roll draws a score from a discrete exponential distribution. Low
//! scores are common, high ones astronomically rare, and the game tells you
//! exactly how rare: "1 in 22,026".
//!
//! ## Pieces
//!
//! - [`distribution`]: sampling and the odds math
//! - [`achievements`]: score-range achievements, unlocked at most once each
//! - [`leaderboard`]: a shared PostgREST table holding one best score per install
//! - [`sync`]: the round orchestrator that ties the above together and keeps
//!   the leaderboard from ever moving backwards
//! - [`store`]: local state that survives restarts
//!
//! [`context::GameContext`] wires everything together from a [`config::Config`].

pub mod achievements;
pub mod config;
pub mod context;
pub mod distribution;
pub mod error;
pub mod identity;
pub mod leaderboard;
pub mod present;
pub mod store;
pub mod sync;

pub use context::GameContext;
pub use error::{GameError, GameResult};
pub use sync::{RoundResult, ScoreSyncOrchestrator, SubmitOutcome};
