//! SkillSwap Algo - reciprocal matching engine for the SkillSwap app
//!
//! This library provides the core matching pipeline used by the SkillSwap
//! skill-exchange app: multi-factor compatibility scoring between teach and
//! learn lists, an optional cache-fronted qualitative analysis signal,
//! idempotent match persistence, and a depth-bounded BFS over the
//! accumulated connection graph.
//!
//! HTTP shaping, authentication, and presentation are the embedding
//! application's responsibility; this crate exposes `find_matches`,
//! `create_match`/`get_user_matches`, and `user_network` over a pluggable
//! `Store` backend.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchEngine, NetworkWalker};
pub use models::{
    ConnectionEdge, Match, MatchCandidate, MatchStatus, MutualSkill, ProfileAnalysis,
    ScoringWeights, SkillEntry, User,
};
pub use services::{
    AnalysisCache, AnalyzerClient, MatchService, MemoryStore, PostgresStore,
    ProfileAnalysisService, Store, StoreError,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let weights = ScoringWeights::default();
        assert!(weights.skills + weights.personality + weights.qualitative <= 1.0 + 1e-9);
    }
}
