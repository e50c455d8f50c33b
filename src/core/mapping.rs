// src/core/mapping.rs
use crate::core::types::{Candidate, SymbolId, SymbolMapping};
use crate::error::Result;
use crate::persistence::load_mapping;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Hand-curated mappings, versioned alongside the crate.
const CURATED_ASSET: &str = include_str!("../../data/curated_mapping.json");

#[derive(Deserialize)]
struct CuratedAsset {
    version: u32,
    mappings: MappingStore,
}

static CURATED: OnceLock<CuratedAsset> = OnceLock::new();

fn curated_asset() -> &'static CuratedAsset {
    CURATED.get_or_init(|| {
        let asset: CuratedAsset = serde_json::from_str(CURATED_ASSET)
            .expect("embedded curated mapping asset must be valid");
        info!(
            version = asset.version,
            symbols = asset.mappings.len(),
            "loaded curated mapping asset"
        );
        asset
    })
}

/// Where a bulk, auto-generated mapping comes from.
#[derive(Debug, Clone)]
pub enum ExternalSource {
    File(PathBuf),
    Text(String),
}

impl ExternalSource {
    fn label(&self) -> String {
        match self {
            ExternalSource::File(path) => path.display().to_string(),
            ExternalSource::Text(text) => format!("<{} bytes of text>", text.len()),
        }
    }

    fn load(&self) -> Result<MappingStore> {
        match self {
            ExternalSource::File(path) => load_mapping(path),
            ExternalSource::Text(text) => MappingStore::from_json(text),
        }
    }
}

/// Result of merging an external source. A rejected source leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// `added` ids were new; `retained` ids were already present and kept as they were.
    Merged { added: usize, retained: usize },
    Rejected { reason: String },
}

impl MergeOutcome {
    pub fn is_merged(&self) -> bool {
        matches!(self, MergeOutcome::Merged { .. })
    }

    pub fn added(&self) -> usize {
        match self {
            MergeOutcome::Merged { added, .. } => *added,
            MergeOutcome::Rejected { .. } => 0,
        }
    }
}

/// Symbol-to-LaTeX mapping table keyed by symbol id.
///
/// Built during initialization (curated seed plus optional merges) and shared
/// read-only afterwards, typically behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "BTreeMap<SymbolId, SymbolMapping>")]
pub struct MappingStore {
    mappings: BTreeMap<SymbolId, SymbolMapping>,
}

impl From<BTreeMap<SymbolId, SymbolMapping>> for MappingStore {
    fn from(mut mappings: BTreeMap<SymbolId, SymbolMapping>) -> Self {
        // The record key wins over whatever id the value carries.
        for (&id, mapping) in mappings.iter_mut() {
            mapping.symbol_id = id;
        }
        Self { mappings }
    }
}

impl Serialize for MappingStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.mappings.serialize(serializer)
    }
}

impl FromIterator<SymbolMapping> for MappingStore {
    fn from_iter<I: IntoIterator<Item = SymbolMapping>>(iter: I) -> Self {
        let mut store = MappingStore::new();
        for mapping in iter {
            store.insert(mapping);
        }
        store
    }
}

impl MappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the curated seed table. The embedded asset is parsed once per process.
    pub fn curated() -> Self {
        curated_asset().mappings.clone()
    }

    pub fn curated_version() -> u32 {
        curated_asset().version
    }

    /// Adds or wholesale-replaces the mapping for `mapping.symbol_id`.
    pub fn insert(&mut self, mapping: SymbolMapping) -> Option<SymbolMapping> {
        self.mappings.insert(mapping.symbol_id, mapping)
    }

    pub fn get_mapping(&self, symbol_id: SymbolId) -> Option<&SymbolMapping> {
        self.mappings.get(&symbol_id)
    }

    /// Priority-descending candidates for `symbol_id`; empty for unknown ids.
    pub fn get_ranked_candidates(&self, symbol_id: SymbolId) -> Vec<&Candidate> {
        self.get_mapping(symbol_id)
            .map(SymbolMapping::ranked_candidates)
            .unwrap_or_default()
    }

    pub fn contains(&self, symbol_id: SymbolId) -> bool {
        self.mappings.contains_key(&symbol_id)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.mappings.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolMapping> {
        self.mappings.values()
    }

    /// Unions `other` into this store by key presence. Ids already present are
    /// never touched. Returns `(added, retained)`.
    pub fn merge_from(&mut self, other: MappingStore) -> (usize, usize) {
        let mut added = 0;
        let mut retained = 0;
        for (id, mapping) in other.mappings {
            if self.mappings.contains_key(&id) {
                retained += 1;
            } else {
                self.mappings.insert(id, mapping);
                added += 1;
            }
        }
        (added, retained)
    }

    /// Loads a larger (usually generated) mapping set and adds the ids this
    /// store lacks. The source is parsed completely before anything is merged,
    /// so an unreadable or malformed source changes nothing.
    pub fn merge_external(&mut self, source: &ExternalSource) -> MergeOutcome {
        let external = match source.load() {
            Ok(external) => external,
            Err(e) => {
                warn!(error = %e, source = %source.label(), "could not load external mapping, keeping current mappings");
                return MergeOutcome::Rejected {
                    reason: e.to_string(),
                };
            }
        };

        let (added, retained) = self.merge_from(external);
        info!(added, retained, total = self.len(), "merged external mapping");
        MergeOutcome::Merged { added, retained }
    }

    /// Serializes every mapping to the JSON text format (keys are decimal ids).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
