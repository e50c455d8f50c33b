// src/config.rs
use crate::error::{Result, SuggestError};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "LATEX_SUGGEST_CONFIG";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
}

impl EngineConfig {
    /// Reads the config file if one exists, otherwise returns defaults.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path();
        if config_path.exists() {
            return Self::from_file(&config_path);
        }
        Ok(EngineConfig::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| SuggestError::io(path, e))?;
        toml::from_str(&raw).map_err(|source| SuggestError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|source| SuggestError::Config {
            path: PathBuf::from("<inline>"),
            source,
        })
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }

    if let Some(base) = dirs::config_dir() {
        return base.join("latex-suggest").join("config.toml");
    }

    PathBuf::from("latex-suggest.toml")
}

/// Weights are checked when the ranker is built, not here.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RankingConfig {
    #[serde(default = "default_vision_weight")]
    pub vision_weight: f64,
    #[serde(default = "default_math_weight")]
    pub math_weight: f64,
    #[serde(default = "default_top_symbols")]
    pub top_symbols: usize,
    #[serde(default = "default_candidates_per_symbol")]
    pub candidates_per_symbol: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            vision_weight: default_vision_weight(),
            math_weight: default_math_weight(),
            top_symbols: default_top_symbols(),
            candidates_per_symbol: default_candidates_per_symbol(),
        }
    }
}

fn default_vision_weight() -> f64 {
    0.6
}

fn default_math_weight() -> f64 {
    0.4
}

fn default_top_symbols() -> usize {
    5
}

fn default_candidates_per_symbol() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MappingConfig {
    /// Generated mapping merged under the curated table at startup.
    #[serde(default)]
    pub external_path: Option<PathBuf>,
    #[serde(default = "default_load_external")]
    pub load_external: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            external_path: None,
            load_external: default_load_external(),
        }
    }
}

fn default_load_external() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.ranking.vision_weight, 0.6);
        assert_eq!(config.ranking.top_symbols, 5);
        assert_eq!(config.output.default_top_k, 10);
        assert!(config.mapping.load_external);
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [ranking]
            vision_weight = 0.8
            math_weight = 0.2

            [mapping]
            external_path = "/srv/symbol_mapping_full.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.ranking.vision_weight, 0.8);
        assert_eq!(config.ranking.candidates_per_symbol, 3);
        assert_eq!(
            config.mapping.external_path.as_deref(),
            Some(Path::new("/srv/symbol_mapping_full.json"))
        );
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("[ranking\nvision_weight = ").unwrap_err();
        assert!(matches!(err, SuggestError::Config { .. }));
    }
}
