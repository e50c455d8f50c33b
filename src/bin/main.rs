use anyhow::{Context, Result};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use std::io::{stdin, stdout, Write};
use suggest_core::{EngineConfig, RankedSuggestion, SuggestionEngine, SymbolId};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::load().context("failed to load config")?;
    let engine = SuggestionEngine::from_config(&config).context("failed to build suggestion engine")?;
    let top_k = config.output.default_top_k;

    let mut last: Vec<RankedSuggestion> = Vec::new();
    let mut last_error: Option<String> = None;

    loop {
        print_ui(&engine, &last, last_error.as_deref())?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim();

        match cmd {
            "exit" => break,
            "" => {}
            s => match parse_pairs(s) {
                Ok(pairs) => {
                    last = engine.suggest_from_pairs(&pairs, top_k);
                    last_error = None;
                }
                Err(e) => last_error = Some(e),
            },
        }
    }
    Ok(())
}

/// Parses `id:confidence` tokens, e.g. `1:0.85 19:0.1`.
fn parse_pairs(line: &str) -> std::result::Result<Vec<(SymbolId, f64)>, String> {
    line.split_whitespace()
        .map(|token| -> std::result::Result<(SymbolId, f64), String> {
            let (id, confidence) = token
                .split_once(':')
                .ok_or_else(|| format!("expected id:confidence, got '{token}'"))?;
            let id = id.parse::<SymbolId>().map_err(|e| format!("bad symbol id '{id}': {e}"))?;
            let confidence = confidence
                .parse::<f64>()
                .map_err(|e| format!("bad confidence '{confidence}': {e}"))?;
            Ok((id, confidence))
        })
        .collect()
}

fn print_ui(engine: &SuggestionEngine, suggestions: &[RankedSuggestion], error: Option<&str>) -> Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let weights = engine.weights();
    println!("{}", "LaTeX Suggestion Engine".bold());
    println!("---------------------------------------------------------------");
    println!(
        "{} symbols loaded, vision weight {:.2}, math weight {:.2}",
        engine.store().len(),
        weights.vision(),
        weights.math()
    );
    println!("Enter predictions as id:confidence pairs (e.g. '1:0.85 19:0.1'). 'exit' to quit.\n");

    if let Some(error) = error {
        println!("{}\n", error.red());
    }

    if suggestions.is_empty() {
        println!("No suggestions yet.");
    } else {
        println!("{}", "Suggestions:".green());
        for line in engine.format_suggestion_list(suggestions, suggestions.len()) {
            println!("  {line}");
        }
    }
    print!("\n> ");
    out.flush()?;
    Ok(())
}
