// src/core/ranker.rs
use crate::core::mapping::MappingStore;
use crate::core::predictions::{normalize, top_symbols};
use crate::core::types::{RankedSuggestion, SymbolId};
use crate::error::{Result, SuggestError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How far `vision + math` may drift from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Priority given to the stand-in candidate of a symbol with no mapping.
pub const PLACEHOLDER_PRIORITY: f64 = 0.5;

/// Balance between visual confidence and mathematical priority.
///
/// Only constructible with weights summing to 1, so a held value is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankingWeights {
    vision: f64,
    math: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self { vision: 0.6, math: 0.4 }
    }
}

impl RankingWeights {
    pub fn new(vision: f64, math: f64) -> Result<Self> {
        let sum = vision + math;
        if sum.is_nan() || (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(SuggestError::InvalidWeights { vision, math, sum });
        }
        Ok(Self { vision, math })
    }

    /// 80% vision, 20% math.
    pub fn vision_heavy() -> Self {
        Self { vision: 0.8, math: 0.2 }
    }

    /// 40% vision, 60% math.
    pub fn math_heavy() -> Self {
        Self { vision: 0.4, math: 0.6 }
    }

    pub fn vision(&self) -> f64 {
        self.vision
    }

    pub fn math(&self) -> f64 {
        self.math
    }

    pub fn combined_score(&self, confidence: f64, priority: f64) -> f64 {
        self.vision * confidence + self.math * priority
    }
}

impl<'de> Deserialize<'de> for RankingWeights {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            vision: f64,
            math: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        RankingWeights::new(raw.vision, raw.math).map_err(serde::de::Error::custom)
    }
}

/// Combines classifier confidence with mapping priorities into one ordered list.
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    store: Arc<MappingStore>,
    weights: RankingWeights,
}

impl CandidateRanker {
    pub fn new(store: Arc<MappingStore>, weights: RankingWeights) -> Self {
        Self { store, weights }
    }

    /// Fails with `InvalidWeights` unless `vision_weight + math_weight` is 1.
    pub fn with_weights(store: Arc<MappingStore>, vision_weight: f64, math_weight: f64) -> Result<Self> {
        Ok(Self::new(store, RankingWeights::new(vision_weight, math_weight)?))
    }

    pub fn weights(&self) -> RankingWeights {
        self.weights
    }

    pub fn store(&self) -> &Arc<MappingStore> {
        &self.store
    }

    /// Ranks candidates from a dense prediction vector indexed by symbol id.
    ///
    /// Values outside [0, 1] mark the vector as logits and trigger softmax.
    /// Returns every scored pair; the caller truncates.
    pub fn rank(
        &self,
        predictions: &[f64],
        top_symbols_count: usize,
        candidates_per_symbol: usize,
    ) -> Vec<RankedSuggestion> {
        if predictions.is_empty() {
            return Vec::new();
        }
        let probabilities = normalize(predictions);
        let shortlist = top_symbols(&probabilities, top_symbols_count);
        self.score_pairs(&shortlist, candidates_per_symbol)
    }

    /// Ranks candidates for a shortlist the caller already selected.
    pub fn rank_from_pairs(
        &self,
        pairs: &[(SymbolId, f64)],
        candidates_per_symbol: usize,
    ) -> Vec<RankedSuggestion> {
        self.score_pairs(pairs, candidates_per_symbol)
    }

    /// Shared scoring core: expands each `(symbol, confidence)` into its top
    /// candidates (or one placeholder), scores them and sorts globally.
    fn score_pairs(&self, pairs: &[(SymbolId, f64)], candidates_per_symbol: usize) -> Vec<RankedSuggestion> {
        // Sized by the data; `candidates_per_symbol` may be `usize::MAX` for "all".
        let mut suggestions = Vec::new();

        for &(symbol_id, confidence) in pairs {
            let candidates = self.store.get_ranked_candidates(symbol_id);
            if candidates.is_empty() {
                suggestions.push(self.placeholder(symbol_id, confidence));
                continue;
            }

            for candidate in candidates.into_iter().take(candidates_per_symbol) {
                suggestions.push(RankedSuggestion {
                    command: candidate.command.clone(),
                    symbol_id,
                    confidence,
                    priority: candidate.priority,
                    combined_score: self.weights.combined_score(confidence, candidate.priority),
                    context: candidate.context.clone(),
                    description: candidate.description.clone(),
                });
            }
        }

        // Stable: equal scores keep symbol order, then candidate order.
        suggestions.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));

        debug!(
            symbols = pairs.len(),
            suggestions = suggestions.len(),
            best = suggestions.first().map(|s| s.command.as_str()),
            "ranked candidates"
        );
        suggestions
    }

    fn placeholder(&self, symbol_id: SymbolId, confidence: f64) -> RankedSuggestion {
        RankedSuggestion {
            command: format!("\\symbol_{symbol_id}"),
            symbol_id,
            confidence,
            priority: PLACEHOLDER_PRIORITY,
            combined_score: self.weights.combined_score(confidence, PLACEHOLDER_PRIORITY),
            context: "symbol (no mapping available)".to_string(),
            description: Some(format!("Symbol class {symbol_id} - mapping not yet available")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Candidate, SymbolMapping};
    use approx::assert_abs_diff_eq;

    fn curated_ranker() -> CandidateRanker {
        CandidateRanker::new(Arc::new(MappingStore::curated()), RankingWeights::default())
    }

    #[test]
    fn weights_must_sum_to_one() {
        assert!(RankingWeights::new(0.6, 0.4).is_ok());
        assert!(RankingWeights::new(1.0, 0.0).is_ok());
        assert!(RankingWeights::new(0.5, 0.5 + 5e-7).is_ok());
        assert!(RankingWeights::new(0.5, 0.6).is_err());
        assert!(RankingWeights::new(0.5, 0.5 + 2e-6).is_err());
        assert!(RankingWeights::new(f64::NAN, 0.4).is_err());

        let err = CandidateRanker::with_weights(Arc::new(MappingStore::new()), 0.7, 0.7).unwrap_err();
        assert!(matches!(err, SuggestError::InvalidWeights { .. }));
    }

    #[test]
    fn weights_are_validated_on_deserialize() {
        let ok: RankingWeights = serde_json::from_str(r#"{"vision": 0.8, "math": 0.2}"#).unwrap();
        assert_eq!(ok, RankingWeights::vision_heavy());
        assert!(serde_json::from_str::<RankingWeights>(r#"{"vision": 0.8, "math": 0.8}"#).is_err());
    }

    #[test]
    fn combined_score_is_weighted_sum() {
        let weights = RankingWeights::default();
        assert_abs_diff_eq!(weights.combined_score(0.85, 1.0), 0.91, epsilon = 1e-12);
        assert_eq!(weights.combined_score(0.3, 0.7), weights.combined_score(0.3, 0.7));
    }

    #[test]
    fn top_candidate_of_confident_symbol() {
        let ranker = curated_ranker();
        let ranked = ranker.rank_from_pairs(&[(1, 0.85)], 3);

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].command, "\\implies");
        assert_eq!(ranked[0].priority, 1.0);
        assert_abs_diff_eq!(ranked[0].combined_score, 0.91, epsilon = 1e-12);
    }

    #[test]
    fn unmapped_symbol_gets_one_placeholder() {
        let ranker = curated_ranker();
        let ranked = ranker.rank_from_pairs(&[(250, 0.3)], 3);

        assert_eq!(ranked.len(), 1);
        let only = &ranked[0];
        assert_eq!(only.command, "\\symbol_250");
        assert_eq!(only.symbol_id, 250);
        assert_eq!(only.priority, PLACEHOLDER_PRIORITY);
        assert_abs_diff_eq!(only.combined_score, 0.38, epsilon = 1e-12);
    }

    #[test]
    fn mapping_without_candidates_also_gets_placeholder() {
        let store: MappingStore = [SymbolMapping::new(7, "empty", Vec::new())].into_iter().collect();
        let ranker = CandidateRanker::new(Arc::new(store), RankingWeights::default());
        let ranked = ranker.rank_from_pairs(&[(7, 0.9)], 3);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].command, "\\symbol_7");
    }

    #[test]
    fn candidates_per_symbol_limits_expansion() {
        let ranker = curated_ranker();
        let ranked = ranker.rank_from_pairs(&[(1, 0.5), (14, 0.4)], 1);
        let commands: Vec<&str> = ranked.iter().map(|s| s.command.as_str()).collect();
        assert_eq!(commands, vec!["\\implies", "\\times"]);
    }

    #[test]
    fn unbounded_candidate_limit_takes_every_candidate() {
        let ranker = curated_ranker();
        let ranked = ranker.rank_from_pairs(&[(1, 0.9), (2, 0.1)], usize::MAX);
        assert_eq!(ranked.len(), 6);

        let predictions = vec![0.01; 30];
        let expected: usize = (0..30)
            .map(|id| ranker.store().get_ranked_candidates(id).len().max(1))
            .sum();
        assert_eq!(ranker.rank(&predictions, usize::MAX, usize::MAX).len(), expected);
    }

    #[test]
    fn equal_scores_keep_generation_order() {
        let store: MappingStore = [
            SymbolMapping::new(1, "a", vec![Candidate::new("\\first", 0.5, "x")]),
            SymbolMapping::new(2, "b", vec![Candidate::new("\\second", 0.5, "x")]),
        ]
        .into_iter()
        .collect();
        let ranker = CandidateRanker::new(Arc::new(store), RankingWeights::default());

        let ranked = ranker.rank_from_pairs(&[(2, 0.5), (1, 0.5)], 3);
        assert_eq!(ranked[0].command, "\\second");
        assert_eq!(ranked[1].command, "\\first");
    }

    #[test]
    fn rank_and_rank_from_pairs_agree() {
        let ranker = curated_ranker();
        let mut predictions = vec![0.0; 369];
        predictions[1] = 0.5;
        predictions[19] = 0.3;
        predictions[300] = 0.15;
        predictions[5] = 0.05;

        let from_vector = ranker.rank(&predictions, 4, 3);
        let from_pairs = ranker.rank_from_pairs(&[(1, 0.5), (19, 0.3), (300, 0.15), (5, 0.05)], 3);
        assert_eq!(from_vector, from_pairs);
    }

    #[test]
    fn logits_are_normalized_before_scoring() {
        let ranker = curated_ranker();
        let mut logits = vec![-2.0; 30];
        logits[19] = 6.0;

        let ranked = ranker.rank(&logits, 2, 3);
        assert_eq!(ranked[0].command, "\\sum");
        assert!(ranked[0].confidence > 0.99 && ranked[0].confidence <= 1.0);
    }

    #[test]
    fn empty_inputs_rank_to_nothing() {
        let ranker = curated_ranker();
        assert!(ranker.rank(&[], 5, 3).is_empty());
        assert!(ranker.rank_from_pairs(&[], 3).is_empty());
    }

    #[test]
    fn output_is_sorted_by_combined_score() {
        let ranker = curated_ranker();
        let ranked = ranker.rank_from_pairs(&[(1, 0.2), (3, 0.6), (19, 0.9), (77, 0.4)], 3);
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].combined_score >= pair[1].combined_score));
    }
}
