//! Achievement registry - ordered ranges with persisted unlock flags

use std::sync::Arc;

use anyhow::Result;

use super::definitions::{AchievementDefinition, AchievementId};
use crate::store::{keys, StateStore};

/// An achievement together with its unlock state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub id: AchievementId,
    pub min_score: i64,
    pub max_score: i64,
    pub display_name: String,
    pub comment: String,
    pub is_unlocked: bool,
}

impl Achievement {
    fn from_definition(def: AchievementDefinition, is_unlocked: bool) -> Self {
        Self {
            id: def.id,
            min_score: def.min_score,
            max_score: def.max_score,
            display_name: def.display_name,
            comment: def.comment,
            is_unlocked,
        }
    }

    pub fn covers(&self, score: i64) -> bool {
        self.min_score <= score && score <= self.max_score
    }
}

/// Owns the achievement list and is the only writer of its unlock flags
pub struct AchievementRegistry {
    achievements: Vec<Achievement>,
    store: Arc<dyn StateStore>,
}

impl AchievementRegistry {
    /// Build the registry, reading each unlock flag from the store
    pub fn initialize(
        definitions: Vec<AchievementDefinition>,
        store: Arc<dyn StateStore>,
    ) -> Result<Self> {
        let mut achievements = Vec::with_capacity(definitions.len());
        for def in definitions {
            let unlocked = store.get_bool(&keys::achievement_unlocked(def.id.as_str()))?;
            achievements.push(Achievement::from_definition(def, unlocked));
        }

        let unlocked = achievements.iter().filter(|a| a.is_unlocked).count();
        tracing::debug!(
            "Loaded {} achievements ({} unlocked)",
            achievements.len(),
            unlocked
        );

        Ok(Self {
            achievements,
            store,
        })
    }

    /// Unlock the first still-locked achievement whose range covers `score`.
    ///
    /// At most one achievement unlocks per call. The flag is persisted before
    /// it flips in memory, so a failed write leaves the achievement locked.
    pub fn try_unlock(&mut self, score: i64) -> Result<Option<Achievement>> {
        let Some(achievement) = self
            .achievements
            .iter_mut()
            .find(|a| !a.is_unlocked && a.covers(score))
        else {
            return Ok(None);
        };

        self.store
            .set_bool(&keys::achievement_unlocked(achievement.id.as_str()), true)?;
        achievement.is_unlocked = true;

        tracing::info!(
            "Achievement unlocked: {} (score: {})",
            achievement.display_name,
            score
        );
        Ok(Some(achievement.clone()))
    }

    /// All achievements in evaluation order
    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn get(&self, id: AchievementId) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.is_unlocked).count()
    }
}
