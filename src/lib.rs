// src/lib.rs

pub mod c_api;
pub mod config;
pub mod core;
pub mod error;
pub mod generate;
pub mod persistence;
pub mod render;

pub use crate::config::EngineConfig;
pub use crate::core::display::{format_suggestion_list, CandidateInfo};
pub use crate::core::engine::SuggestionEngine;
pub use crate::core::mapping::{ExternalSource, MappingStore, MergeOutcome};
pub use crate::core::ranker::{CandidateRanker, RankingWeights};
pub use crate::core::types::{Candidate, RankedSuggestion, SymbolId, SymbolMapping};
pub use crate::error::{Result, SuggestError};
pub use crate::render::CommandRenderer;
