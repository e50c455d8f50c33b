// Builds the full symbol mapping from a symbol table:
//   generate_mapping <symbols.csv> <symbol_mapping_full.json>
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::PathBuf;
use suggest_core::generate::{generate_full, read_symbol_table};
use suggest_core::persistence::save_mapping;
use suggest_core::{MappingStore, SymbolId};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SAMPLE_IDS: [SymbolId; 5] = [31, 59, 88, 185, 882];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [table_path, output_path] = args.as_slice() else {
        bail!("usage: generate_mapping <symbols.csv> <output.json>");
    };
    let table_path = PathBuf::from(table_path);
    let output_path = PathBuf::from(output_path);

    let file = File::open(&table_path).with_context(|| format!("failed to open {}", table_path.display()))?;
    let table = read_symbol_table(file).with_context(|| format!("failed to read {}", table_path.display()))?;

    let (full, stats) = generate_full(&MappingStore::curated(), &table);
    save_mapping(&full, &output_path).with_context(|| format!("failed to write {}", output_path.display()))?;

    let multi = full.iter().filter(|m| m.candidates.len() > 1).count();
    info!(
        total = stats.total(),
        curated = stats.curated,
        generated = stats.generated,
        multi_candidate = multi,
        single_candidate = full.len() - multi,
        output = %output_path.display(),
        "wrote full mapping"
    );

    for id in SAMPLE_IDS {
        if let Some(mapping) = full.get_mapping(id) {
            println!("Symbol ID {id}: {}", mapping.symbol_name);
            for (i, cand) in full.get_ranked_candidates(id).iter().take(3).enumerate() {
                println!("  {}. {} (priority: {:.2}) - {}", i + 1, cand.command, cand.priority, cand.context);
            }
        }
    }
    Ok(())
}
