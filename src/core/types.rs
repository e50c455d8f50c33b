// src/core/types.rs
use serde::{Deserialize, Serialize};

/// Class index assigned by the upstream classifier to one visual symbol category.
/// Doubles as the position of that class in a dense prediction vector.
pub type SymbolId = u32;

/// A single LaTeX command that can render a symbol class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub command: String,
    /// Mathematical priority in [0, 1]. Specific commands (`\implies`) sit above
    /// generic ones (`\Rightarrow`), which sit above look-alikes (`\epsilon` for `\in`).
    #[serde(alias = "math_priority")]
    pub priority: f64,
    pub context: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Candidate {
    pub fn new(command: impl Into<String>, priority: f64, context: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            priority,
            context: context.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// All candidates known for one symbol class.
/// The store never edits a mapping in place; replacing candidates means replacing the mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMapping {
    /// Overwritten with the record key on load, so a file may omit it.
    #[serde(default, alias = "symbol_class_id")]
    pub symbol_id: SymbolId,
    pub symbol_name: String,
    #[serde(default, alias = "latex_candidates")]
    pub candidates: Vec<Candidate>,
}

impl SymbolMapping {
    pub fn new(symbol_id: SymbolId, symbol_name: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            symbol_id,
            symbol_name: symbol_name.into(),
            candidates,
        }
    }

    /// Candidates by priority, highest first. Equal priorities keep their
    /// insertion order, so repeated calls always agree.
    pub fn ranked_candidates(&self) -> Vec<&Candidate> {
        let mut ranked: Vec<&Candidate> = self.candidates.iter().collect();
        ranked.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        ranked
    }
}

/// One scored (symbol, candidate) pair produced for a single ranking request.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSuggestion {
    pub command: String,
    pub symbol_id: SymbolId,
    /// Classifier probability for `symbol_id`.
    pub confidence: f64,
    pub priority: f64,
    pub combined_score: f64,
    pub context: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_candidates_sorts_by_priority_and_keeps_ties_in_order() {
        let mapping = SymbolMapping::new(
            3,
            "right arrow",
            vec![
                Candidate::new("\\rightarrow", 0.8, "function mapping"),
                Candidate::new("\\to", 0.8, "shorthand"),
                Candidate::new("\\mapsto", 0.9, "element mapping"),
                Candidate::new("\\longrightarrow", 0.2, "long arrow"),
            ],
        );

        let commands: Vec<&str> = mapping
            .ranked_candidates()
            .iter()
            .map(|c| c.command.as_str())
            .collect();
        assert_eq!(commands, vec!["\\mapsto", "\\rightarrow", "\\to", "\\longrightarrow"]);
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let json = r#"{
            "symbol_class_id": 5,
            "symbol_name": "element of",
            "latex_candidates": [
                {"command": "\\in", "math_priority": 1.0, "context": "set membership", "description": null}
            ]
        }"#;
        let mapping: SymbolMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping.symbol_id, 5);
        assert_eq!(mapping.candidates.len(), 1);
        assert_eq!(mapping.candidates[0].priority, 1.0);
        assert_eq!(mapping.candidates[0].description, None);
    }
}
