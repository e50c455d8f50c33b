// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SuggestError>;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("weights must sum to 1.0, got {sum:.6} (vision_weight={vision}, math_weight={math})")]
    InvalidWeights { vision: f64, math: f64, sum: f64 },

    #[error("malformed mapping data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("malformed symbol table: {0}")]
    SymbolTable(#[from] csv::Error),
}

impl SuggestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
