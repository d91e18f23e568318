//! Persisted key/value state
//!
//! Everything the game remembers between runs (best score, attempt count,
//! achievement flags, client identity) goes through [`StateStore`]. Values are
//! stored as strings; the typed helpers parse them on the way out.
//!
//! ```text
//! best_score                 -> "120"
//! attempt_count              -> "37"
//! achievement.<id>.unlocked  -> "1"
//! client_token               -> "5f0c...-..."
//! username                   -> "Anonymous"
//! ```

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use anyhow::{Context, Result};

/// Well-known state keys
pub mod keys {
    pub const BEST_SCORE: &str = "best_score";
    pub const ATTEMPT_COUNT: &str = "attempt_count";
    pub const CLIENT_TOKEN: &str = "client_token";
    pub const USERNAME: &str = "username";

    /// Key of the unlock flag for one achievement
    pub fn achievement_unlocked(id: &str) -> String {
        format!("achievement.{}.unlocked", id)
    }
}

/// Durable key/value storage that survives process restarts
pub trait StateStore: Send + Sync {
    /// Read a raw value
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a raw value, durably
    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key)? {
            Some(raw) => {
                let value = raw
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("Stored value for '{}' is not an integer: {}", key, raw))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.set(key, &value.to_string())
    }

    /// Booleans are stored as "1"/"0"; anything else reads as false
    fn get_bool(&self, key: &str) -> Result<bool> {
        Ok(matches!(self.get(key)?.as_deref(), Some("1") | Some("true")))
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { "1" } else { "0" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_helpers() {
        let store = MemoryStore::new();

        assert_eq!(store.get_i64(keys::BEST_SCORE).unwrap(), None);
        store.set_i64(keys::BEST_SCORE, 42).unwrap();
        assert_eq!(store.get_i64(keys::BEST_SCORE).unwrap(), Some(42));

        let key = keys::achievement_unlocked("lucky_seven");
        assert!(!store.get_bool(&key).unwrap());
        store.set_bool(&key, true).unwrap();
        assert!(store.get_bool(&key).unwrap());
        assert_eq!(key, "achievement.lucky_seven.unlocked");
    }

    #[test]
    fn test_corrupt_integer_is_an_error() {
        let store = MemoryStore::new();
        store.set(keys::ATTEMPT_COUNT, "many").unwrap();
        assert!(store.get_i64(keys::ATTEMPT_COUNT).is_err());
    }
}
