use crate::config::EngineConfig;
use crate::core::display::{self, CandidateInfo};
use crate::core::mapping::{ExternalSource, MappingStore, MergeOutcome};
use crate::core::predictions::flatten;
use crate::core::ranker::{CandidateRanker, RankingWeights};
use crate::core::types::{RankedSuggestion, SymbolId};
use crate::error::Result;
use crate::render::CommandRenderer;
use std::sync::Arc;
use tracing::info;

/// Symbol classes considered per request.
pub const DEFAULT_TOP_SYMBOLS: usize = 5;
/// LaTeX candidates kept per symbol class.
pub const DEFAULT_CANDIDATES_PER_SYMBOL: usize = 3;
pub const DEFAULT_TOP_K: usize = 10;

// The engine owns a fully built store and a ranker over it. Truncation to the
// caller's size happens on the globally sorted list, not per symbol, so one very
// confident symbol can fill the whole result.
pub struct SuggestionEngine {
    ranker: CandidateRanker,
    top_symbols: usize,
    candidates_per_symbol: usize,
    renderer: Option<Box<dyn CommandRenderer>>,
    external_merge: Option<MergeOutcome>,
}

impl SuggestionEngine {
    pub fn new(store: MappingStore, weights: RankingWeights) -> Self {
        Self {
            ranker: CandidateRanker::new(Arc::new(store), weights),
            top_symbols: DEFAULT_TOP_SYMBOLS,
            candidates_per_symbol: DEFAULT_CANDIDATES_PER_SYMBOL,
            renderer: None,
            external_merge: None,
        }
    }

    /// Curated mappings only, default weights.
    pub fn with_defaults() -> Self {
        Self::new(MappingStore::curated(), RankingWeights::default())
    }

    /// Curated mappings, plus the configured external mapping when it loads.
    /// Only invalid weights fail; a bad external mapping is logged and skipped,
    /// and the merge outcome is kept for `external_merge`.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let weights = RankingWeights::new(config.ranking.vision_weight, config.ranking.math_weight)?;

        let mut store = MappingStore::curated();
        let external_merge = match (&config.mapping.external_path, config.mapping.load_external) {
            (Some(path), true) => Some(store.merge_external(&ExternalSource::File(path.clone()))),
            _ => None,
        };
        info!(
            symbols = store.len(),
            vision_weight = weights.vision(),
            math_weight = weights.math(),
            "suggestion engine ready"
        );

        let mut engine = Self::new(store, weights)
            .with_limits(config.ranking.top_symbols, config.ranking.candidates_per_symbol);
        engine.external_merge = external_merge;
        Ok(engine)
    }

    pub fn with_limits(mut self, top_symbols: usize, candidates_per_symbol: usize) -> Self {
        self.top_symbols = top_symbols;
        self.candidates_per_symbol = candidates_per_symbol;
        self
    }

    pub fn with_renderer(mut self, renderer: impl CommandRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn store(&self) -> &MappingStore {
        self.ranker.store()
    }

    pub fn weights(&self) -> RankingWeights {
        self.ranker.weights()
    }

    /// How the configured external mapping merged at construction; `None`
    /// when no external mapping was configured.
    pub fn external_merge(&self) -> Option<&MergeOutcome> {
        self.external_merge.as_ref()
    }

    /// Swaps in a completely built store. Requests already holding the old
    /// `Arc` finish against it.
    pub fn replace_store(&mut self, store: Arc<MappingStore>) {
        self.ranker = CandidateRanker::new(store, self.ranker.weights());
    }

    /// Suggestions from a dense prediction vector (probabilities or logits).
    pub fn suggest(&self, predictions: &[f64], top_k: usize) -> Vec<RankedSuggestion> {
        let mut suggestions = self
            .ranker
            .rank(predictions, self.top_symbols, self.candidates_per_symbol);
        suggestions.truncate(top_k);
        suggestions
    }

    /// Same as `suggest` for batch-shaped output such as `1 x num_classes`.
    pub fn suggest_rows<R: AsRef<[f64]>>(&self, rows: &[R], top_k: usize) -> Vec<RankedSuggestion> {
        self.suggest(&flatten(rows), top_k)
    }

    /// Suggestions for a shortlist of `(symbol_id, confidence)` the caller already holds.
    pub fn suggest_from_pairs(&self, pairs: &[(SymbolId, f64)], top_k: usize) -> Vec<RankedSuggestion> {
        let mut suggestions = self.ranker.rank_from_pairs(pairs, self.candidates_per_symbol);
        suggestions.truncate(top_k);
        suggestions
    }

    pub fn candidate_info(&self, suggestion: &RankedSuggestion) -> CandidateInfo {
        CandidateInfo::from(suggestion)
    }

    pub fn format_suggestion_list(&self, suggestions: &[RankedSuggestion], max_items: usize) -> Vec<String> {
        display::format_suggestion_list(suggestions, max_items)
    }

    /// Preview image for a suggestion; `None` without a renderer or on render failure.
    pub fn preview(&self, suggestion: &RankedSuggestion) -> Option<Vec<u8>> {
        self.renderer.as_ref()?.render(&suggestion.command)
    }
}
