//! Anonymous per-install identity
//!
//! The client token is a random UUID generated on first run. It is the only
//! key correlating this install with its leaderboard row and never changes.

use std::sync::Arc;

use anyhow::Result;

use crate::error::{GameError, GameResult};
use crate::store::{keys, StateStore};

/// Persisted token + display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub client_token: String,
    pub username: String,
}

impl ClientIdentity {
    /// Load the identity, creating and persisting it on first run
    pub fn load(store: &Arc<dyn StateStore>, default_username: &str) -> Result<Self> {
        let client_token = match store.get(keys::CLIENT_TOKEN)? {
            Some(token) if !token.trim().is_empty() => token,
            _ => {
                let token = uuid::Uuid::new_v4().to_string();
                store.set(keys::CLIENT_TOKEN, &token)?;
                tracing::info!("Generated new client token");
                token
            }
        };

        let username = match store.get(keys::USERNAME)? {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                store.set(keys::USERNAME, default_username)?;
                default_username.to_string()
            }
        };

        Ok(Self {
            client_token,
            username,
        })
    }

    /// Change the display name and persist it immediately.
    ///
    /// Blank names are rejected and leave both memory and storage untouched.
    pub fn set_username(&mut self, store: &Arc<dyn StateStore>, new_name: &str) -> GameResult<()> {
        validate_username(new_name)?;
        store.set(keys::USERNAME, new_name)?;
        self.username = new_name.to_string();
        Ok(())
    }
}

/// Reject empty or whitespace-only names
pub fn validate_username(name: &str) -> GameResult<()> {
    if name.trim().is_empty() {
        return Err(GameError::Validation("username must not be empty".to_string()));
    }
    Ok(())
}
