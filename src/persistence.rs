// File: src/persistence.rs
use crate::core::mapping::MappingStore;
use crate::error::{Result, SuggestError};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes `write` into a temp file next to `path`, then renames it over `path`,
/// so readers never see a half-written file.
fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> Result<()>,
{
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(|e| SuggestError::io(parent_dir, e))?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| SuggestError::io(parent_dir, e))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        write(&mut writer)?;
        writer.flush().map_err(|e| SuggestError::io(path, e))?;
    }

    temp_file
        .persist(path)
        .map_err(|e| SuggestError::io(path, e.error))?;
    Ok(())
}

/// Saves the mapping in its JSON text form.
pub fn save_mapping(store: &MappingStore, path: &Path) -> Result<()> {
    let json = store.to_json()?;
    write_atomically(path, |writer| {
        writer
            .write_all(json.as_bytes())
            .map_err(|e| SuggestError::io(path, e))
    })?;
    debug!(path = %path.display(), symbols = store.len(), "saved mapping");
    Ok(())
}

pub fn load_mapping(path: &Path) -> Result<MappingStore> {
    let text = fs::read_to_string(path).map_err(|e| SuggestError::io(path, e))?;
    MappingStore::from_json(&text)
}

/// Saves a compact binary snapshot of a fully built store.
pub fn save_snapshot(store: &MappingStore, path: &Path) -> Result<()> {
    write_atomically(path, |writer| Ok(bincode::serialize_into(writer, store)?))?;
    debug!(path = %path.display(), symbols = store.len(), "saved mapping snapshot");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<MappingStore> {
    let file = File::open(path).map_err(|e| SuggestError::io(path, e))?;
    let reader = BufReader::new(file);
    Ok(bincode::deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mapping.json");
        let store = MappingStore::curated();

        save_mapping(&store, &path).unwrap();
        assert_eq!(load_mapping(&path).unwrap(), store);
    }

    #[test]
    fn snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.bin");
        let store = MappingStore::curated();

        save_snapshot(&store, &path).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), store);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        save_mapping(&MappingStore::curated(), &path).unwrap();
        save_mapping(&MappingStore::new(), &path).unwrap();
        assert!(load_mapping(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_snapshot(Path::new("/nonexistent/mapping.bin")).unwrap_err();
        assert!(matches!(err, SuggestError::Io { .. }));
    }
}
