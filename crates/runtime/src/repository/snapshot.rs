//! Ledger snapshot persistence.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use client_blockchain_core::BlockInfo;
use game_core::Ledger;

use super::error::{RepositoryError, Result};

/// Everything needed to resume the chain after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub head: BlockInfo,
    pub ledger: Ledger,
}

impl ChainSnapshot {
    fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| RepositoryError::CorruptedData(e.to_string()))
    }
}

/// Repository for the latest chain snapshot.
///
/// Only the most recent snapshot is kept; saving replaces it.
pub trait SnapshotRepository: Send + Sync {
    fn save(&self, snapshot: &ChainSnapshot) -> Result<()>;

    fn load(&self) -> Result<Option<ChainSnapshot>>;

    fn exists(&self) -> bool;

    fn delete(&self) -> Result<()>;
}

/// Stores the snapshot as a single bincode file.
///
/// Writes go to a sibling temp file and are renamed into place, so a crash
/// mid-write leaves the previous snapshot intact.
pub struct FileSnapshotRepository {
    path: PathBuf,
}

impl FileSnapshotRepository {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Platform data directory, falling back to `./save_data`.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "brawler")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./save_data"))
            .join("ledger.bin")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotRepository for FileSnapshotRepository {
    fn save(&self, snapshot: &ChainSnapshot) -> Result<()> {
        let bytes = snapshot.encode()?;
        let temp_path = self.path.with_extension("bin.tmp");

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(
            height = snapshot.head.height,
            "Saved snapshot to {}",
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<ChainSnapshot>> {
        if !self.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&self.path)?;
        ChainSnapshot::decode(&bytes).map(Some)
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn delete(&self) -> Result<()> {
        if self.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Keeps the encoded snapshot in memory; round-trips through the same codec.
#[derive(Default)]
pub struct InMemorySnapshotRepository {
    bytes: RwLock<Option<Vec<u8>>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn save(&self, snapshot: &ChainSnapshot) -> Result<()> {
        let bytes = snapshot.encode()?;
        *self.bytes.write().map_err(|_| RepositoryError::LockPoisoned)? = Some(bytes);
        Ok(())
    }

    fn load(&self) -> Result<Option<ChainSnapshot>> {
        let guard = self.bytes.read().map_err(|_| RepositoryError::LockPoisoned)?;
        guard.as_deref().map(ChainSnapshot::decode).transpose()
    }

    fn exists(&self) -> bool {
        self.bytes.read().map(|b| b.is_some()).unwrap_or(false)
    }

    fn delete(&self) -> Result<()> {
        *self.bytes.write().map_err(|_| RepositoryError::LockPoisoned)? = None;
        Ok(())
    }
}
