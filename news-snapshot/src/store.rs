use crate::types::{NewsError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

const RECORD_EXTENSION: &str = "json";

/// Key-value storage for serialized snapshots, keyed by date string.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Human-readable location of the record stored under `key`.
    fn location(&self, key: &str) -> String;

    /// Create the storage location if it does not exist yet.
    async fn ensure_location(&self) -> Result<()>;

    /// Write `record` under `key`, replacing any existing record whole.
    /// Returns the record's location.
    async fn put(&self, key: &str, record: &[u8]) -> Result<String>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// All keys currently stored. An absent store has no keys.
    async fn list_keys(&self) -> Result<Vec<String>>;

    async fn delete(&self, key: &str) -> Result<()>;
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.starts_with('.') || key.contains(['/', '\\']) {
        return Err(NewsError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// One `<key>.json` file per record in a single directory.
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, RECORD_EXTENSION)))
    }
}

#[async_trait]
impl SnapshotStore for FsSnapshotStore {
    fn location(&self, key: &str) -> String {
        self.root
            .join(format!("{}.{}", key, RECORD_EXTENSION))
            .display()
            .to_string()
    }

    async fn ensure_location(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn put(&self, key: &str, record: &[u8]) -> Result<String> {
        let path = self.path_for(key)?;

        // Write beside the target and rename over it so readers never see a
        // partial record.
        let tmp_path = self.root.join(format!(".{}.{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_path, record).await?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!("Wrote {} bytes to {}", record.len(), path.display());
        Ok(path.display().to_string())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::remove_file(&path).await?;
        Ok(())
    }
}

/// In-process store, mostly useful for tests and dry runs.
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    records: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    fn location(&self, key: &str) -> String {
        format!("memory://{}", key)
    }

    async fn ensure_location(&self) -> Result<()> {
        Ok(())
    }

    async fn put(&self, key: &str, record: &[u8]) -> Result<String> {
        validate_key(key)?;
        self.records.write().await.insert(key.to_string(), record.to_vec());
        Ok(self.location(key))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.records.read().await.keys().cloned().collect())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self.records.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(std::io::Error::new(ErrorKind::NotFound, format!("no record stored under {}", key)).into()),
        }
    }
}
