use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::core::scoring::{mutual_skills, score_pair};
use crate::models::{MatchCandidate, ProfileAnalysis, ScoringWeights, User};
use crate::services::analyzer::ProfileAnalysisService;
use crate::services::store::{Store, StoreError};

pub const CANDIDATE_BATCH_SIZE: usize = 10;
pub const BATCH_PAUSE: Duration = Duration::from_millis(150);

/// Reciprocal matching orchestrator
///
/// # Pipeline
/// 1. Load the requesting user (missing profile = empty result)
/// 2. Load and optionally search-filter all other users
/// 3. Analyze the requesting user once when qualitative scoring is on
/// 4. Score candidates in concurrency-bounded batches
/// 5. Rank mutual-skill candidates first, then by score; truncate
pub struct MatchEngine {
    store: Arc<dyn Store>,
    analysis: Arc<ProfileAnalysisService>,
    weights: ScoringWeights,
    batch_size: usize,
    batch_pause: Duration,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn Store>, analysis: Arc<ProfileAnalysisService>) -> Self {
        Self {
            store,
            analysis,
            weights: ScoringWeights::default(),
            batch_size: CANDIDATE_BATCH_SIZE,
            batch_pause: BATCH_PAUSE,
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Batching is independent of the analyzer; only the inter-batch pause
    /// is tied to it being active.
    pub fn with_batching(mut self, batch_size: usize, pause: Duration) -> Self {
        self.batch_size = batch_size.max(1);
        self.batch_pause = pause;
        self
    }

    /// Find ranked match candidates for `user_id`.
    ///
    /// A user without a profile row, or with nobody else registered, gets
    /// an empty list rather than an error. `search_term` narrows candidates
    /// by teach-skill name, learn-skill name, or display name.
    pub async fn find_matches(
        &self,
        user_id: &str,
        limit: usize,
        search_term: Option<&str>,
        include_qualitative: bool,
    ) -> Result<Vec<MatchCandidate>, StoreError> {
        let Some(user) = self.store.get_user(user_id).await? else {
            tracing::debug!("no profile row for {}, returning no candidates", user_id);
            return Ok(Vec::new());
        };

        let mut candidates = self.store.list_candidates(user_id).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(term) = search_term {
            candidates.retain(|candidate| matches_search(candidate, term));
            tracing::debug!("search '{}' narrowed candidates to {}", term, candidates.len());
        }

        // One analysis of the requester, reused across every candidate.
        let user_analysis = if include_qualitative {
            self.analysis.analyze(&user).await
        } else {
            None
        };
        let qualitative_active = include_qualitative && self.analysis.is_enabled();

        let mut results = Vec::with_capacity(candidates.len());
        let mut batches = candidates.chunks(self.batch_size).peekable();
        while let Some(batch) = batches.next() {
            let scored = join_all(batch.iter().map(|candidate| {
                self.score_candidate(&user, candidate, user_analysis.as_ref(), include_qualitative)
            }))
            .await;
            results.extend(scored);

            // Courtesy pause toward the external analyzer between batches.
            if qualitative_active && batches.peek().is_some() {
                tokio::time::sleep(self.batch_pause).await;
            }
        }

        rank_candidates(&mut results);
        results.truncate(limit);

        Ok(results)
    }

    async fn score_candidate(
        &self,
        user: &User,
        candidate: &User,
        user_analysis: Option<&ProfileAnalysis>,
        include_qualitative: bool,
    ) -> MatchCandidate {
        let candidate_analysis = if include_qualitative {
            self.analysis.analyze(candidate).await
        } else {
            None
        };

        let scores = score_pair(
            user,
            candidate,
            user_analysis,
            candidate_analysis.as_ref(),
            &self.weights,
        );

        MatchCandidate {
            user_id: candidate.user_id.clone(),
            name: candidate.name.clone(),
            scores,
            mutual_skills: mutual_skills(user, candidate),
        }
    }
}

fn matches_search(candidate: &User, term: &str) -> bool {
    let term = term.to_lowercase();
    candidate.name.to_lowercase().contains(&term)
        || candidate
            .teach_skills
            .iter()
            .any(|s| s.name.to_lowercase().contains(&term))
        || candidate
            .learn_skills
            .iter()
            .any(|s| s.name.to_lowercase().contains(&term))
}

/// Two-tier ranking: any candidate with a mutual skill outranks every
/// candidate without one, whatever the scores; within a tier, final score
/// descending. Mutual-skill presence is a hard feasibility signal a thin
/// score edge must not override.
fn rank_candidates(candidates: &mut [MatchCandidate]) {
    candidates.sort_by(|a, b| {
        b.has_mutual_skills()
            .cmp(&a.has_mutual_skills())
            .then_with(|| {
                b.scores
                    .final_score
                    .partial_cmp(&a.scores.final_score)
                    .unwrap_or(Ordering::Equal)
            })
    });
}
