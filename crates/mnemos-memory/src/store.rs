//! Long-term record persistence.

use crate::error::MemoryError;
use crate::record::LongTermRecord;
use async_trait::async_trait;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Identity used when none is given.
pub const ANONYMOUS_IDENTITY: &str = "anonymous";

/// Canonical store key: trimmed and lowercased, `anonymous` when blank.
pub fn normalize_identity(identity: &str) -> String {
    let identity = identity.trim();
    if identity.is_empty() {
        ANONYMOUS_IDENTITY.to_string()
    } else {
        identity.to_lowercase()
    }
}

#[async_trait]
/// Keyed storage of long-term records. Keys are normalized by the store.
pub trait LongTermStore: Send + Sync {
    /// Load the record for an identity; missing identities yield an empty record.
    async fn load(&self, identity: &str) -> Result<LongTermRecord, MemoryError>;

    /// Replace the record for an identity, leaving other identities intact.
    async fn save(&self, identity: &str, record: &LongTermRecord) -> Result<(), MemoryError>;

    /// Delete the record for an identity. Returns whether one existed.
    async fn remove(&self, identity: &str) -> Result<bool, MemoryError>;

    /// All stored identities in key order.
    async fn identities(&self) -> Result<Vec<String>, MemoryError>;
}

/// Single JSON document mapping identities to records.
///
/// Writes replace the file atomically. Concurrent writers from separate
/// processes are not coordinated; the last writer wins.
#[derive(Debug, Clone)]
pub struct FileLongTermStore {
    path: PathBuf,
}

impl FileLongTermStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn load_all(&self) -> Result<BTreeMap<String, LongTermRecord>, MemoryError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, records: &BTreeMap<String, LongTermRecord>) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let temp_path = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            let encoded = serde_json::to_string_pretty(records)?;
            file.write_all(encoded.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(temp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl LongTermStore for FileLongTermStore {
    async fn load(&self, identity: &str) -> Result<LongTermRecord, MemoryError> {
        let key = normalize_identity(identity);
        let record = self.load_all()?.remove(&key).unwrap_or_default();
        debug!(
            "loaded long-term record (identity={}, facts={}, preferences={})",
            key,
            record.facts.len(),
            record.preferences.len()
        );
        Ok(record)
    }

    async fn save(&self, identity: &str, record: &LongTermRecord) -> Result<(), MemoryError> {
        let key = normalize_identity(identity);
        let mut records = self.load_all()?;
        records.insert(key.clone(), record.clone());
        self.write_all(&records)?;
        info!(
            "saved long-term record (identity={}, path={})",
            key,
            self.path.display()
        );
        Ok(())
    }

    async fn remove(&self, identity: &str) -> Result<bool, MemoryError> {
        let key = normalize_identity(identity);
        let mut records = self.load_all()?;
        if records.remove(&key).is_none() {
            return Ok(false);
        }
        self.write_all(&records)?;
        info!("removed long-term record (identity={})", key);
        Ok(true)
    }

    async fn identities(&self) -> Result<Vec<String>, MemoryError> {
        Ok(self.load_all()?.into_keys().collect())
    }
}
