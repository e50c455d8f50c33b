// C ABI over the suggestion engine. Callers own an opaque engine handle and
// exchange suggestions as JSON strings. Panics never cross the boundary.
use crate::config::EngineConfig;
use crate::core::display::CandidateInfo;
use crate::core::types::SymbolId;
use crate::SuggestionEngine;
use libc::c_char;
use serde::Deserialize;
use std::ffi::{CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;
use tracing::{error, warn};

#[derive(Deserialize)]
struct PairInput {
    symbol_id: SymbolId,
    confidence: f64,
}

fn into_c_string(json: String) -> *mut c_char {
    CString::new(json)
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

/// Builds an engine from the user config (or defaults). Returns null on failure.
#[no_mangle]
pub extern "C" fn latex_suggest_engine_new() -> *mut SuggestionEngine {
    let result = catch_unwind(|| {
        let config = EngineConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "could not load config, using defaults");
            EngineConfig::default()
        });
        SuggestionEngine::from_config(&config)
    });
    match result {
        Ok(Ok(engine)) => Box::into_raw(Box::new(engine)),
        Ok(Err(e)) => {
            error!(error = %e, "could not build suggestion engine");
            ptr::null_mut()
        }
        Err(_) => {
            error!("panic while building suggestion engine");
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `engine` must come from `latex_suggest_engine_new` and not be freed twice.
#[no_mangle]
pub unsafe extern "C" fn latex_suggest_engine_free(engine: *mut SuggestionEngine) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Takes `[{"symbol_id": 1, "confidence": 0.9}, ...]` and returns a JSON array
/// of suggestion records, `"[]"` on bad input. Free the result with
/// `latex_suggest_free_string`.
///
/// # Safety
/// `engine` must be a live handle and `pairs_json` a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn latex_suggest_from_pairs_json(
    engine: *const SuggestionEngine,
    pairs_json: *const c_char,
    top_k: usize,
) -> *mut c_char {
    if engine.is_null() || pairs_json.is_null() {
        return into_c_string("[]".to_string());
    }
    let engine = &*engine;
    let input = CStr::from_ptr(pairs_json).to_str().unwrap_or("");

    let result = catch_unwind(AssertUnwindSafe(|| {
        let pairs: Vec<(SymbolId, f64)> = match serde_json::from_str::<Vec<PairInput>>(input) {
            Ok(parsed) => parsed.into_iter().map(|p| (p.symbol_id, p.confidence)).collect(),
            Err(e) => {
                error!(error = %e, "malformed pair list");
                return "[]".to_string();
            }
        };
        let infos: Vec<CandidateInfo> = engine
            .suggest_from_pairs(&pairs, top_k)
            .iter()
            .map(CandidateInfo::from)
            .collect();
        serde_json::to_string(&infos).unwrap_or_else(|_| "[]".to_string())
    }));

    let json = result.unwrap_or_else(|_| {
        error!("panic in latex_suggest_from_pairs_json");
        "[]".to_string()
    });
    into_c_string(json)
}

/// # Safety
/// `s` must come from this library and not be freed twice.
#[no_mangle]
pub unsafe extern "C" fn latex_suggest_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_round_trip_through_the_c_boundary() {
        let engine = Box::into_raw(Box::new(SuggestionEngine::with_defaults()));
        let input = CString::new(r#"[{"symbol_id": 1, "confidence": 0.85}]"#).unwrap();

        unsafe {
            let out = latex_suggest_from_pairs_json(engine, input.as_ptr(), 2);
            let json = CStr::from_ptr(out).to_str().unwrap().to_string();
            latex_suggest_free_string(out);
            latex_suggest_engine_free(engine);

            let infos: Vec<CandidateInfo> = serde_json::from_str(&json).unwrap();
            assert_eq!(infos.len(), 2);
            assert_eq!(infos[0].latex_command, "\\implies");
        }
    }

    #[test]
    fn unparsable_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ranking\nvision_weight = ").unwrap();
        std::env::set_var(crate::config::CONFIG_ENV_VAR, &path);

        let engine = latex_suggest_engine_new();
        std::env::remove_var(crate::config::CONFIG_ENV_VAR);

        assert!(!engine.is_null());
        unsafe {
            assert_eq!((*engine).weights(), crate::RankingWeights::default());
            latex_suggest_engine_free(engine);
        }
    }

    #[test]
    fn malformed_input_yields_empty_array() {
        let engine = Box::into_raw(Box::new(SuggestionEngine::with_defaults()));
        let input = CString::new("not json").unwrap();

        unsafe {
            let out = latex_suggest_from_pairs_json(engine, input.as_ptr(), 5);
            assert_eq!(CStr::from_ptr(out).to_str().unwrap(), "[]");
            latex_suggest_free_string(out);
            latex_suggest_engine_free(engine);
        }
    }
}
