use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Match, User};

/// Errors surfaced by the relational store boundary
///
/// Storage faults are the one failure class the engine does not recover
/// from locally; they propagate to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// Relational store boundary for the matching engine
///
/// Backed by `users`, `matches`, and `conversations` tables. The engine
/// only reads user rows; profile mutation belongs to other services.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch a single user row. `Ok(None)` means the user has no profile
    /// row, which the engine treats as an empty result, not an error.
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// All candidate profiles other than `user_id`.
    async fn list_candidates(&self, user_id: &str) -> Result<Vec<User>, StoreError>;

    /// Existing match for the unordered pair, in either orientation.
    async fn find_match_between(
        &self,
        user_a_id: &str,
        user_b_id: &str,
    ) -> Result<Option<Match>, StoreError>;

    async fn insert_match(&self, record: &Match) -> Result<(), StoreError>;

    /// All matches touching `user_id` on either side.
    async fn matches_for_user(&self, user_id: &str) -> Result<Vec<Match>, StoreError>;

    /// Conversation bootstrap for a new match. Callers treat failures as
    /// recoverable; a missing conversation row can be repaired later.
    async fn create_conversation(
        &self,
        conversation_id: &str,
        user_a_id: &str,
        user_b_id: &str,
    ) -> Result<(), StoreError>;
}
