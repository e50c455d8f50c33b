// src/core/display.rs
use crate::core::types::{RankedSuggestion, SymbolId};
use serde::{Deserialize, Serialize};

/// Display-ready record for one suggestion, as handed to UIs and the C API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub latex_command: String,
    pub symbol_class_id: SymbolId,
    pub vision_confidence: f64,
    pub math_priority: f64,
    pub combined_score: f64,
    pub context: String,
    pub description: Option<String>,
}

impl From<&RankedSuggestion> for CandidateInfo {
    fn from(s: &RankedSuggestion) -> Self {
        Self {
            latex_command: s.command.clone(),
            symbol_class_id: s.symbol_id,
            vision_confidence: s.confidence,
            math_priority: s.priority,
            combined_score: s.combined_score,
            context: s.context.clone(),
            description: s.description.clone(),
        }
    }
}

/// One numbered line per suggestion, at most `max_items` lines.
pub fn format_suggestion_list(suggestions: &[RankedSuggestion], max_items: usize) -> Vec<String> {
    suggestions
        .iter()
        .take(max_items)
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{}. {:20} (confidence: {:.2}, priority: {:.2}, score: {:.3}) - {}",
                i + 1,
                s.command,
                s.confidence,
                s.priority,
                s.combined_score,
                s.context
            )
        })
        .collect()
}
