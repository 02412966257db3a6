//! Discovery collection persistence.
//!
//! The collection is stored as a versioned bincode envelope. [`FileStore`]
//! writes to a sibling temp file and renames it over the target so a crash
//! mid-write never leaves a truncated save behind.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trailmap_logic::discovery::Discovery;

use crate::error::PersistenceError;

/// Version number for the save format (increment when the layout changes).
pub const SAVE_VERSION: u32 = 1;

#[derive(Serialize)]
struct SaveDataRef<'a> {
    version: u32,
    discoveries: &'a [Discovery],
}

#[derive(Deserialize)]
struct SaveData {
    version: u32,
    discoveries: Vec<Discovery>,
}

/// Write a discovery collection to a writer.
pub fn save_discoveries<W: Write>(
    writer: W,
    discoveries: &[Discovery],
) -> Result<(), PersistenceError> {
    let data = SaveDataRef {
        version: SAVE_VERSION,
        discoveries,
    };
    bincode::serialize_into(writer, &data)?;
    Ok(())
}

/// Read a discovery collection from a reader.
pub fn load_discoveries<R: Read>(reader: R) -> Result<Vec<Discovery>, PersistenceError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(data.discoveries)
}

/// Where the engine keeps the discovery collection.
pub trait DiscoveryStore {
    /// Load the saved collection. A store with nothing saved yet returns an
    /// empty list.
    fn load(&mut self) -> Result<Vec<Discovery>, PersistenceError>;

    /// Replace the saved collection.
    fn save(&mut self, discoveries: &[Discovery]) -> Result<(), PersistenceError>;
}

// ============================================================================
// FILE STORE
// ============================================================================

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "discoveries".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl DiscoveryStore for FileStore {
    fn load(&mut self) -> Result<Vec<Discovery>, PersistenceError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };
        load_discoveries(BufReader::new(file))
    }

    fn save(&mut self, discoveries: &[Discovery]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
        }

        let temp = self.temp_path();
        let file = File::create(&temp).map_err(|e| self.io_error(&temp, e))?;
        let mut writer = BufWriter::new(file);
        save_discoveries(&mut writer, discoveries)?;
        writer.flush().map_err(|e| self.io_error(&temp, e))?;
        drop(writer);

        fs::rename(&temp, &self.path).map_err(|e| self.io_error(&self.path, e))
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// Keeps the collection in memory. Default store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    discoveries: Vec<Discovery>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing collection, as if loaded from disk.
    pub fn with_discoveries(discoveries: Vec<Discovery>) -> Self {
        Self {
            discoveries,
            saves: 0,
        }
    }

    pub fn discoveries(&self) -> &[Discovery] {
        &self.discoveries
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl DiscoveryStore for MemoryStore {
    fn load(&mut self) -> Result<Vec<Discovery>, PersistenceError> {
        Ok(self.discoveries.clone())
    }

    fn save(&mut self, discoveries: &[Discovery]) -> Result<(), PersistenceError> {
        self.discoveries = discoveries.to_vec();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use trailmap_logic::discovery::{generate_discovery, ObjectKind};
    use trailmap_logic::theme::Theme;

    fn sample(count: usize) -> Vec<Discovery> {
        let mut rng = StdRng::seed_from_u64(11);
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        (0..count)
            .map(|i| {
                let zone = if i % 2 == 0 { Some("Meadow") } else { None };
                let theme = Theme::ALL[i % 4];
                generate_discovery(theme, ObjectKind::Decoration, "🌼", zone, at, &mut rng)
            })
            .collect()
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trailmap-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_load_roundtrip() {
        let original = sample(7);
        let mut buffer = Vec::new();
        save_discoveries(&mut buffer, &original).expect("save failed");
        let loaded = load_discoveries(&buffer[..]).expect("load failed");
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_version_mismatch() {
        let mut buffer = Vec::new();
        save_discoveries(&mut buffer, &sample(1)).unwrap();
        // The version is the first field, little-endian u32.
        buffer[0] = 99;
        let err = load_discoveries(&buffer[..]).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::VersionMismatch { expected: 1, found: 99 }
        ));
    }

    #[test]
    fn test_truncated_data_is_an_error() {
        let mut buffer = Vec::new();
        save_discoveries(&mut buffer, &sample(3)).unwrap();
        buffer.truncate(buffer.len() / 2);
        assert!(matches!(
            load_discoveries(&buffer[..]),
            Err(PersistenceError::Encoding(_))
        ));
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = temp_dir("missing");
        let mut store = FileStore::new(dir.join("nothing.bin"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = temp_dir("roundtrip");
        let mut store = FileStore::new(dir.join("nested").join("discoveries.bin"));
        let original = sample(4);
        store.save(&original).unwrap();
        assert!(!store.temp_path().exists());

        let mut reopened = FileStore::new(store.path());
        assert_eq!(reopened.load().unwrap(), original);

        store.save(&original[..1]).unwrap();
        assert_eq!(reopened.load().unwrap().len(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let mut store = MemoryStore::with_discoveries(sample(2));
        assert_eq!(store.load().unwrap().len(), 2);
        store.save(&[]).unwrap();
        assert_eq!(store.save_count(), 1);
        assert!(store.discoveries().is_empty());
    }
}
