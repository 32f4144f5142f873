//! Durable stores for the mutation logs
//!
//! Persistence is the only asynchronous boundary in the system. A failed
//! write never touches in-memory state; it is reported to the caller, who
//! decides whether to warn the user. Writes are not retried here.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::document::LogDocument;
use crate::error::PersistError;

/// Local durable storage for a [`LogDocument`]
#[async_trait]
pub trait DurableStore: Send + Sync + Debug {
    /// Read the stored document, `None` when nothing has been saved
    async fn load(&self) -> Result<Option<LogDocument>, PersistError>;

    /// Overwrite the stored document
    async fn save(&self, document: &LogDocument) -> Result<(), PersistError>;

    /// Remove the stored document
    async fn clear(&self) -> Result<(), PersistError>;

    /// Store name (for logging)
    fn name(&self) -> &'static str;
}

fn encode(document: &LogDocument, quota: Option<usize>) -> Result<String, PersistError> {
    let json = serde_json::to_string(document).map_err(|e| PersistError::Corrupt(e.to_string()))?;
    if let Some(quota) = quota {
        if json.len() > quota {
            return Err(PersistError::QuotaExceeded {
                needed: json.len(),
                quota,
            });
        }
    }
    Ok(json)
}

fn decode(json: &str) -> Result<LogDocument, PersistError> {
    serde_json::from_str(json).map_err(|e| PersistError::Corrupt(e.to_string()))
}

/// In-process store
///
/// Supports an optional size quota and can be switched offline to exercise
/// failure handling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
    quota_bytes: Option<usize>,
    offline: AtomicBool,
}

impl MemoryStore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rejecting documents larger than `quota_bytes`
    #[inline]
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Make every operation fail with [`PersistError::Unavailable`]
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), PersistError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(PersistError::Unavailable("memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    /// Raw stored JSON
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn load(&self) -> Result<Option<LogDocument>, PersistError> {
        self.check_online()?;
        self.slot.lock().as_deref().map(decode).transpose()
    }

    async fn save(&self, document: &LogDocument) -> Result<(), PersistError> {
        self.check_online()?;
        let json = encode(document, self.quota_bytes)?;
        *self.slot.lock() = Some(json);
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistError> {
        self.check_online()?;
        *self.slot.lock() = None;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// JSON file on local disk
///
/// Writes go to a sibling temp file that is renamed into place, so a crash
/// mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    quota_bytes: Option<usize>,
}

impl JsonFileStore {
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DurableStore for JsonFileStore {
    async fn load(&self) -> Result<Option<LogDocument>, PersistError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => decode(&json).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistError::io_error(&self.path, e)),
        }
    }

    async fn save(&self, document: &LogDocument) -> Result<(), PersistError> {
        let json = encode(document, self.quota_bytes)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PersistError::io_error(parent, e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| PersistError::io_error(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| PersistError::io_error(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), records = document.len(), "saved mutation logs");
        Ok(())
    }

    async fn clear(&self) -> Result<(), PersistError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistError::io_error(&self.path, e)),
        }
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MutationRecord;
    use chrono::{TimeZone, Utc};

    fn sample() -> LogDocument {
        let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        LogDocument {
            flows: vec![MutationRecord::delete("f1").at(at)],
            agents: Vec::new(),
        }
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());

        let document = sample();
        store.save(&document).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(document));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[test]
    fn sample_document_is_stable() {
        assert_eq!(sample(), sample());
    }

    #[tokio::test]
    async fn memory_store_enforces_quota() {
        let store = MemoryStore::with_quota(10);
        let err = store.save(&sample()).await.unwrap_err();
        assert!(matches!(err, PersistError::QuotaExceeded { quota: 10, .. }));
        assert!(store.raw().is_none());
    }

    #[tokio::test]
    async fn offline_memory_store_is_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.save(&sample()).await,
            Err(PersistError::Unavailable(_))
        ));

        store.set_offline(false);
        assert!(store.save(&sample()).await.is_ok());
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("log.json"));

        assert!(store.load().await.unwrap().is_none());
        let document = sample();
        store.save(&document).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(document));
        assert!(!store.temp_path().exists());

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn file_store_reports_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load().await, Err(PersistError::Corrupt(_))));
    }
}
