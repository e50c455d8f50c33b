// File: src/generate.rs
//! Bulk mapping generation from the classifier's symbol table.
//!
//! Every class gets a single candidate, its primary LaTeX command at priority
//! 1.0. Curated mappings always win over generated ones.
use crate::core::mapping::MappingStore;
use crate::core::types::{Candidate, SymbolId, SymbolMapping};
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;
use tracing::info;

const FONT_WRAPPERS: [&str; 5] = ["mathcal{", "mathbb{", "mathfrak{", "mathscr{", "mathds{"];

#[derive(Debug, Deserialize)]
struct SymbolRow {
    symbol_id: SymbolId,
    latex: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub curated: usize,
    pub generated: usize,
}

impl GenerationStats {
    pub fn total(&self) -> usize {
        self.curated + self.generated
    }
}

/// Reads `symbol_id,latex` rows (with a header line).
pub fn read_symbol_table<R: Read>(reader: R) -> Result<Vec<(SymbolId, String)>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        let row: SymbolRow = record?;
        rows.push((row.symbol_id, row.latex));
    }
    Ok(rows)
}

/// Readable name for a LaTeX command: `\mathbb{R}` -> `R`, `\sum` -> `sum`.
pub fn symbol_name(latex: &str) -> String {
    match latex.strip_prefix('\\') {
        Some(command) => {
            let mut name = command.to_string();
            for wrapper in FONT_WRAPPERS {
                name = name.replace(wrapper, "");
            }
            name.replace('}', "")
        }
        None => latex.to_string(),
    }
}

fn context_for(latex: &str) -> String {
    let has_chars = !latex.is_empty();
    if latex.starts_with('\\') {
        format!("LaTeX command: {latex}")
    } else if has_chars && latex.chars().all(char::is_alphabetic) {
        if latex.chars().all(char::is_uppercase) {
            "capital letter".to_string()
        } else {
            "lowercase letter".to_string()
        }
    } else if has_chars && latex.chars().all(|c| c.is_ascii_digit()) {
        "digit".to_string()
    } else {
        "symbol".to_string()
    }
}

pub fn basic_mapping(symbol_id: SymbolId, latex: &str) -> SymbolMapping {
    let name = symbol_name(latex);
    let candidate = Candidate::new(latex, 1.0, context_for(latex))
        .with_description(format!("Primary LaTeX representation for {name}"));
    SymbolMapping::new(symbol_id, name, vec![candidate])
}

/// Curated entries plus a basic mapping for every table id the curated set lacks.
pub fn generate_full(curated: &MappingStore, table: &[(SymbolId, String)]) -> (MappingStore, GenerationStats) {
    let mut full = curated.clone();
    let generated: MappingStore = table
        .iter()
        .filter(|(id, _)| !curated.contains(*id))
        .map(|(id, latex)| basic_mapping(*id, latex))
        .collect();

    let (added, _) = full.merge_from(generated);
    let stats = GenerationStats {
        curated: curated.len(),
        generated: added,
    };
    info!(curated = stats.curated, generated = stats.generated, total = full.len(), "generated full mapping");
    (full, stats)
}
