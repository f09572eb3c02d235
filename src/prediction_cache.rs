use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::match_data::{HeadToHead, PredictionResult, TeamStats};
use crate::scorer_config::ScorerConfig;
use crate::win_prob::MatchScorer;

pub const DEFAULT_CAPACITY: usize = 1024;

static CACHE: Lazy<Mutex<PredictionCache>> =
    Lazy::new(|| Mutex::new(PredictionCache::with_capacity(DEFAULT_CAPACITY)));

/// Memo of predictions keyed by a digest of everything the scorer reads.
/// Predictions are pure, so a hit is always safe to return.
#[derive(Debug)]
pub struct PredictionCache {
    capacity: usize,
    entries: HashMap<String, PredictionResult>,
    hits: u64,
    misses: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Serialize)]
struct CacheKey<'a> {
    config: &'a ScorerConfig,
    home: &'a TeamStats,
    away: &'a TeamStats,
    h2h: &'a HeadToHead,
}

impl PredictionCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn predict(
        &mut self,
        scorer: &MatchScorer,
        home: &TeamStats,
        away: &TeamStats,
        h2h: &HeadToHead,
    ) -> Result<PredictionResult> {
        let Ok(key) = cache_key(scorer.config(), home, away, h2h) else {
            return scorer.predict(home, away, h2h);
        };
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(hit.clone());
        }
        self.misses += 1;

        let result = scorer.predict(home, away, h2h)?;
        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        self.entries.insert(key, result.clone());
        Ok(result)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Predict through the process-wide cache.
pub fn predict_cached(
    scorer: &MatchScorer,
    home: &TeamStats,
    away: &TeamStats,
    h2h: &HeadToHead,
) -> Result<PredictionResult> {
    let mut guard = CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.predict(scorer, home, away, h2h)
}

pub fn global_stats() -> CacheStats {
    let guard = CACHE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.stats()
}

/// Hex SHA-256 of the serialized inputs. A key that cannot be serialized
/// is an error so that no two such inputs share a digest.
pub fn cache_key(
    config: &ScorerConfig,
    home: &TeamStats,
    away: &TeamStats,
    h2h: &HeadToHead,
) -> serde_json::Result<String> {
    let key = CacheKey {
        config,
        home,
        away,
        h2h,
    };
    let bytes = serde_json::to_vec(&key)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(position: u32) -> TeamStats {
        TeamStats {
            recent_form: 60.0,
            record_pct: 50.0,
            table_position: position,
            goals_scored: 20.0,
            goals_conceded: 18.0,
            key_injuries: 0,
            suspensions: 0,
        }
    }

    #[test]
    fn key_depends_on_every_input() {
        let cfg = ScorerConfig::default();
        let h2h = HeadToHead::new(1, 1, 1);
        let key = |cfg: &ScorerConfig, home: &TeamStats, away: &TeamStats, h2h: &HeadToHead| {
            cache_key(cfg, home, away, h2h).unwrap()
        };
        let base = key(&cfg, &team(3), &team(7), &h2h);
        assert_eq!(base.len(), 64);
        assert_eq!(base, key(&cfg, &team(3), &team(7), &h2h));
        assert_ne!(base, key(&cfg, &team(7), &team(3), &h2h));
        assert_ne!(base, key(&cfg, &team(3), &team(7), &HeadToHead::new(2, 1, 1)));
        assert_ne!(
            base,
            key(&ScorerConfig::neutral_venue(), &team(3), &team(7), &h2h)
        );
    }

    #[test]
    fn second_call_is_a_hit_with_same_result() {
        let scorer = MatchScorer::default();
        let mut cache = PredictionCache::with_capacity(8);
        let h2h = HeadToHead::default();
        let first = cache.predict(&scorer, &team(1), &team(2), &h2h).unwrap();
        let second = cache.predict(&scorer, &team(1), &team(2), &h2h).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 1,
                misses: 1
            }
        );
    }

    #[test]
    fn errors_are_not_cached() {
        let scorer = MatchScorer::default();
        let mut cache = PredictionCache::with_capacity(8);
        let bad = team(40);
        assert!(cache
            .predict(&scorer, &bad, &team(2), &HeadToHead::default())
            .is_err());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn non_finite_inputs_never_hit_a_cached_entry() {
        // NaN and infinity both serialize as JSON null, so their keys collide.
        let scorer = MatchScorer::default();
        let mut cache = PredictionCache::with_capacity(8);
        let h2h = HeadToHead::default();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut home = team(1);
            home.recent_form = bad;
            let err = cache.predict(&scorer, &home, &team(2), &h2h).unwrap_err();
            assert_eq!(err.field(), Some("home.recent_form"));
        }
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn full_cache_is_reset() {
        let scorer = MatchScorer::default();
        let mut cache = PredictionCache::with_capacity(2);
        let h2h = HeadToHead::default();
        for pos in 1..=3 {
            cache.predict(&scorer, &team(pos), &team(10), &h2h).unwrap();
        }
        assert_eq!(cache.stats().entries, 1);
    }
}
