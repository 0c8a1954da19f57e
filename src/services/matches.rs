use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use uuid::Uuid;

use crate::core::scoring::{mutual_skills, score_pair};
use crate::models::{Match, MatchStatus, MutualSkill, ProfileAnalysis, ScoringWeights, User};
use crate::services::analyzer::ProfileAnalysisService;
use crate::services::store::{Store, StoreError};

pub const REFRESH_BATCH_SIZE: usize = 5;
pub const REFRESH_BATCH_PAUSE: Duration = Duration::from_millis(150);

/// Outcome of a create-match call.
#[derive(Debug, Clone)]
pub struct MatchCreation {
    pub record: Match,
    pub created: bool,
}

/// Persistence-facing service for stored matches
///
/// Creation is idempotent per unordered user pair via lookup-before-insert.
/// The uniqueness is best-effort: a concurrent creator racing through the
/// lookup window can still insert a duplicate, which callers tolerate.
pub struct MatchService {
    store: Arc<dyn Store>,
    analysis: Arc<ProfileAnalysisService>,
    weights: ScoringWeights,
    refresh_batch_size: usize,
    batch_pause: Duration,
}

impl MatchService {
    pub fn new(store: Arc<dyn Store>, analysis: Arc<ProfileAnalysisService>) -> Self {
        Self {
            store,
            analysis,
            weights: ScoringWeights::default(),
            refresh_batch_size: REFRESH_BATCH_SIZE,
            batch_pause: REFRESH_BATCH_PAUSE,
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_batching(mut self, batch_size: usize, pause: Duration) -> Self {
        self.refresh_batch_size = batch_size.max(1);
        self.batch_pause = pause;
        self
    }

    /// Create a match for the pair, or return the existing one.
    ///
    /// The pair is looked up in both orientations; an existing record is
    /// returned with `created: false` and the same id. New matches start
    /// pending with chat enabled and a conversation id derived from the
    /// sorted pair, so repeated creations would converge on one
    /// conversation even if a racing duplicate slips through.
    pub async fn create_match(
        &self,
        user_a_id: &str,
        user_b_id: &str,
        score: f64,
        mutual: Vec<MutualSkill>,
    ) -> Result<MatchCreation, StoreError> {
        if let Some(existing) = self.store.find_match_between(user_a_id, user_b_id).await? {
            tracing::debug!("match already exists for {} / {}", user_a_id, user_b_id);
            return Ok(MatchCreation {
                record: existing,
                created: false,
            });
        }

        let conversation_id = conversation_id_for(user_a_id, user_b_id);
        let record = Match {
            id: Uuid::new_v4().to_string(),
            user_a_id: user_a_id.to_string(),
            user_b_id: user_b_id.to_string(),
            score,
            mutual_skills: mutual,
            status: MatchStatus::Pending,
            chat_enabled: true,
            conversation_id: Some(conversation_id.clone()),
            created_at: Some(chrono::Utc::now()),
        };

        self.store.insert_match(&record).await?;

        // A missing conversation row is recoverable later; the match is not
        // rolled back over it.
        if let Err(e) = self
            .store
            .create_conversation(&conversation_id, user_a_id, user_b_id)
            .await
        {
            tracing::warn!(
                "failed to create conversation {} for new match: {}",
                conversation_id,
                e
            );
        }

        tracing::info!(
            "created match {} for {} / {}",
            record.id,
            user_a_id,
            user_b_id
        );

        Ok(MatchCreation {
            record,
            created: true,
        })
    }

    /// All matches touching `user_id`, sorted by score descending.
    ///
    /// With `include_qualitative`, score and mutual skills are recomputed
    /// per match from the requesting user's perspective and overridden in
    /// the response only; stored rows keep their original orientation.
    pub async fn get_user_matches(
        &self,
        user_id: &str,
        include_qualitative: bool,
    ) -> Result<Vec<Match>, StoreError> {
        let mut records = self.store.matches_for_user(user_id).await?;

        if include_qualitative {
            if let Some(user) = self.store.get_user(user_id).await? {
                records = self.refresh_scores(&user, records).await;
            }
        }

        records.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
        });

        Ok(records)
    }

    async fn refresh_scores(&self, user: &User, mut records: Vec<Match>) -> Vec<Match> {
        let user_analysis = self.analysis.analyze(user).await;
        let qualitative_active = self.analysis.is_enabled();

        let mut refreshed = Vec::with_capacity(records.len());
        while !records.is_empty() {
            let take = records.len().min(self.refresh_batch_size);
            let chunk: Vec<Match> = records.drain(..take).collect();

            let batch = join_all(
                chunk
                    .into_iter()
                    .map(|record| self.refresh_one(user, user_analysis.as_ref(), record)),
            )
            .await;
            refreshed.extend(batch);

            if qualitative_active && !records.is_empty() {
                tokio::time::sleep(self.batch_pause).await;
            }
        }

        refreshed
    }

    async fn refresh_one(
        &self,
        user: &User,
        user_analysis: Option<&ProfileAnalysis>,
        mut record: Match,
    ) -> Match {
        let other_id = record.other_user(&user.user_id).to_string();
        let other = match self.store.get_user(&other_id).await {
            Ok(Some(other)) => other,
            Ok(None) => {
                tracing::debug!("counterpart {} has no profile, keeping stored score", other_id);
                return record;
            }
            Err(e) => {
                tracing::warn!("failed to load counterpart {}: {}", other_id, e);
                return record;
            }
        };

        let other_analysis = self.analysis.analyze(&other).await;
        let scores = score_pair(
            user,
            &other,
            user_analysis,
            other_analysis.as_ref(),
            &self.weights,
        );

        record.score = scores.final_score;
        record.mutual_skills = mutual_skills(user, &other);
        record
    }
}

/// Deterministic conversation id for an unordered user pair.
fn conversation_id_for(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("conv_{}_{}", lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Proficiency, SkillEntry};
    use crate::services::memory::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> MatchService {
        MatchService::new(store, Arc::new(ProfileAnalysisService::disabled()))
    }

    fn test_user(id: &str, teach: &[&str], learn: &[&str]) -> User {
        User {
            user_id: id.to_string(),
            name: format!("User {}", id),
            bio: String::new(),
            teach_skills: teach
                .iter()
                .map(|n| SkillEntry::new(n, None, Proficiency::Advanced))
                .collect(),
            learn_skills: learn
                .iter()
                .map(|n| SkillEntry::new(n, None, Proficiency::Beginner))
                .collect(),
            personality_type: None,
            daily_rhythm: None,
            created_at: None,
        }
    }

    #[test]
    fn test_conversation_id_is_order_independent() {
        assert_eq!(conversation_id_for("b", "a"), "conv_a_b");
        assert_eq!(conversation_id_for("a", "b"), "conv_a_b");
    }

    #[tokio::test]
    async fn test_create_match_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        let first = service.create_match("a", "b", 0.8, vec![]).await.unwrap();
        assert!(first.created);
        assert_eq!(first.record.status, MatchStatus::Pending);
        assert!(first.record.chat_enabled);

        // Reversed orientation resolves to the same record.
        let second = service.create_match("b", "a", 0.8, vec![]).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.record.id, first.record.id);
        assert_eq!(store.match_count(), 1);
    }

    #[tokio::test]
    async fn test_conversation_failure_does_not_fail_create() {
        let store = Arc::new(MemoryStore::new());
        store.fail_conversations();
        let service = service(store.clone());

        let outcome = service.create_match("a", "b", 0.5, vec![]).await.unwrap();
        assert!(outcome.created);
        assert_eq!(store.conversation_count(), 0);
        assert_eq!(store.match_count(), 1);
    }

    #[tokio::test]
    async fn test_matches_sorted_by_score_descending() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());

        service.create_match("a", "b", 0.3, vec![]).await.unwrap();
        service.create_match("a", "c", 0.9, vec![]).await.unwrap();
        service.create_match("a", "d", 0.6, vec![]).await.unwrap();

        let matches = service.get_user_matches("a", false).await.unwrap();
        let scores: Vec<f64> = matches.iter().map(|m| m.score).collect();
        assert_eq!(scores, vec![0.9, 0.6, 0.3]);
    }

    #[tokio::test]
    async fn test_refresh_is_viewer_relative_and_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        store.add_user(test_user("a", &["rust"], &[]));
        store.add_user(test_user("b", &[], &["rust"]));
        let service = service(store.clone());

        // Stored with an arbitrary stale score and no mutual skills.
        service.create_match("b", "a", 0.01, vec![]).await.unwrap();

        let refreshed = service.get_user_matches("a", true).await.unwrap();
        assert_eq!(refreshed.len(), 1);
        assert_eq!(refreshed[0].mutual_skills.len(), 1);
        // Direction is relative to the requester "a", who teaches rust.
        assert_eq!(refreshed[0].mutual_skills[0].teacher_id, "a");
        assert!(refreshed[0].score > 0.01);

        // Stored record untouched.
        let stored = store.find_match_between("a", "b").await.unwrap().unwrap();
        assert_eq!(stored.score, 0.01);
        assert!(stored.mutual_skills.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_keeps_stored_fields_when_counterpart_missing() {
        let store = Arc::new(MemoryStore::new());
        store.add_user(test_user("a", &["rust"], &[]));
        let service = service(store.clone());

        service.create_match("a", "ghost", 0.42, vec![]).await.unwrap();

        let matches = service.get_user_matches("a", true).await.unwrap();
        assert_eq!(matches[0].score, 0.42);
    }

    #[tokio::test]
    async fn test_passthrough_without_qualitative() {
        let store = Arc::new(MemoryStore::new());
        store.add_user(test_user("a", &["rust"], &[]));
        store.add_user(test_user("b", &[], &["rust"]));
        let service = service(store.clone());

        service.create_match("a", "b", 0.01, vec![]).await.unwrap();

        let matches = service.get_user_matches("a", false).await.unwrap();
        assert_eq!(matches[0].score, 0.01);
        assert!(matches[0].mutual_skills.is_empty());
    }
}
