use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{Match, User};
use crate::services::store::{Store, StoreError};

/// In-process store backend
///
/// Used by tests, benches, and local development. Mirrors the relational
/// backend's semantics over plain maps; supports scripted failures so the
/// degraded paths (skipped frontier members, lost conversation rows) can
/// be exercised deterministically.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, User>>,
    matches: Mutex<Vec<Match>>,
    conversations: Mutex<HashMap<String, (String, String)>>,
    failing_users: Mutex<HashSet<String>>,
    fail_conversations: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users
            .lock()
            .expect("users lock")
            .insert(user.user_id.clone(), user);
    }

    pub fn add_match(&self, record: Match) {
        self.matches.lock().expect("matches lock").push(record);
    }

    /// Make `matches_for_user` fail for one user id.
    pub fn fail_matches_for(&self, user_id: &str) {
        self.failing_users
            .lock()
            .expect("failing lock")
            .insert(user_id.to_string());
    }

    /// Make every `create_conversation` call fail.
    pub fn fail_conversations(&self) {
        *self.fail_conversations.lock().expect("flag lock") = true;
    }

    pub fn match_count(&self) -> usize {
        self.matches.lock().expect("matches lock").len()
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.lock().expect("conversations lock").len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().expect("users lock").get(user_id).cloned())
    }

    async fn list_candidates(&self, user_id: &str) -> Result<Vec<User>, StoreError> {
        let users = self.users.lock().expect("users lock");
        let mut candidates: Vec<User> = users
            .values()
            .filter(|u| u.user_id != user_id)
            .cloned()
            .collect();
        candidates.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(candidates)
    }

    async fn find_match_between(
        &self,
        user_a_id: &str,
        user_b_id: &str,
    ) -> Result<Option<Match>, StoreError> {
        let matches = self.matches.lock().expect("matches lock");
        Ok(matches
            .iter()
            .find(|m| {
                (m.user_a_id == user_a_id && m.user_b_id == user_b_id)
                    || (m.user_a_id == user_b_id && m.user_b_id == user_a_id)
            })
            .cloned())
    }

    async fn insert_match(&self, record: &Match) -> Result<(), StoreError> {
        self.matches.lock().expect("matches lock").push(record.clone());
        Ok(())
    }

    async fn matches_for_user(&self, user_id: &str) -> Result<Vec<Match>, StoreError> {
        if self
            .failing_users
            .lock()
            .expect("failing lock")
            .contains(user_id)
        {
            return Err(StoreError::Unavailable(format!(
                "scripted failure for {}",
                user_id
            )));
        }

        let matches = self.matches.lock().expect("matches lock");
        Ok(matches
            .iter()
            .filter(|m| m.touches(user_id))
            .cloned()
            .collect())
    }

    async fn create_conversation(
        &self,
        conversation_id: &str,
        user_a_id: &str,
        user_b_id: &str,
    ) -> Result<(), StoreError> {
        if *self.fail_conversations.lock().expect("flag lock") {
            return Err(StoreError::Unavailable(
                "scripted conversation failure".to_string(),
            ));
        }

        self.conversations.lock().expect("conversations lock").insert(
            conversation_id.to_string(),
            (user_a_id.to_string(), user_b_id.to_string()),
        );
        Ok(())
    }
}
