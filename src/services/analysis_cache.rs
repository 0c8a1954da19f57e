use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::models::ProfileAnalysis;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_SWEEP_THRESHOLD: usize = 1000;

struct CacheEntry {
    analysis: ProfileAnalysis,
    inserted_at: Instant,
}

/// Process-wide memo of qualitative profile analyses
///
/// Keyed by user id plus a bio fingerprint so a rewritten bio invalidates
/// the memo naturally. An entry whose age has reached the TTL is never
/// returned as a hit. Eviction is an opportunistic sweep: once the table
/// grows past the threshold, an insert removes every stale entry at that
/// moment. Writers racing on one key overwrite each other; the values are
/// derived from the same inputs within the TTL window, so staleness is the
/// only outcome of the race.
pub struct AnalysisCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    sweep_threshold: usize,
}

impl AnalysisCache {
    pub fn new(ttl: Duration, sweep_threshold: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            sweep_threshold,
        }
    }

    /// Cache key from a user id and the first 50 chars of their bio.
    pub fn key(user_id: &str, bio: &str) -> String {
        let fingerprint: String = bio.chars().take(50).collect();
        format!("{}:{}", user_id, fingerprint)
    }

    pub fn get(&self, key: &str) -> Option<ProfileAnalysis> {
        let entry = self.entries.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.analysis.clone())
    }

    pub fn put(&self, key: String, analysis: ProfileAnalysis) {
        self.entries.insert(
            key,
            CacheEntry {
                analysis,
                inserted_at: Instant::now(),
            },
        );

        if self.entries.len() > self.sweep_threshold {
            self.sweep();
        }
    }

    /// Remove every entry whose age has reached the TTL. Returns the
    /// number of entries removed.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!("analysis cache sweep removed {} stale entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_SWEEP_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(quality: f64) -> ProfileAnalysis {
        ProfileAnalysis {
            teaching_expertise: 0.5,
            learning_clarity: 0.5,
            profile_quality: quality,
            reciprocal_potential: vec![],
        }
    }

    #[test]
    fn test_key_uses_bio_prefix() {
        let long_bio = "x".repeat(200);
        let key = AnalysisCache::key("u1", &long_bio);
        assert_eq!(key.len(), "u1:".len() + 50);

        // Divergence past the fingerprint does not change the key.
        let mut other = "x".repeat(50);
        other.push_str("different tail");
        assert_eq!(key, AnalysisCache::key("u1", &other));
    }

    #[test]
    fn test_fresh_entry_hits() {
        let cache = AnalysisCache::default();
        cache.put("k".to_string(), analysis(0.9));
        let hit = cache.get("k").expect("fresh entry should hit");
        assert_eq!(hit.profile_quality, 0.9);
    }

    #[test]
    fn test_stale_entry_misses() {
        // Zero TTL makes every entry stale on arrival.
        let cache = AnalysisCache::new(Duration::ZERO, DEFAULT_SWEEP_THRESHOLD);
        cache.put("k".to_string(), analysis(0.9));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_sweep_triggers_past_threshold() {
        let cache = AnalysisCache::new(Duration::ZERO, 3);
        for i in 0..3 {
            cache.put(format!("k{}", i), analysis(0.1));
        }
        assert_eq!(cache.len(), 3);

        // Fourth insert crosses the threshold and sweeps all stale entries.
        cache.put("k3".to_string(), analysis(0.1));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_sweep_keeps_fresh_entries() {
        let cache = AnalysisCache::new(Duration::from_secs(60), 1000);
        cache.put("k0".to_string(), analysis(0.1));
        cache.put("k1".to_string(), analysis(0.2));
        assert_eq!(cache.sweep(), 0);
        assert_eq!(cache.len(), 2);
    }
}
