use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ca_core::fragment::FragmentKey;
use ca_core::ports::{FragmentCachePort, StorageError};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info_span, Instrument};

/// Fragment cache persisted as one JSON object `{ "<key>": "<text>" }`.
///
/// Every write replaces the file atomically (temp file + rename). The mutex
/// serializes read-modify-write cycles within the process.
pub struct FileFragmentCache {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileFragmentCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(self.unavailable(err)),
        };
        serde_json::from_slice(&bytes)
            .map_err(|err| StorageError::Corrupt(format!("{}: {err}", self.path.display())))
    }

    async fn atomic_write(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(dir) = self.dir() {
            fs::create_dir_all(dir)
                .await
                .map_err(|err| self.unavailable(err))?;
        }

        let content =
            serde_json::to_vec_pretty(entries).map_err(|err| StorageError::Corrupt(err.to_string()))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .map_err(|err| self.unavailable(err))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| self.unavailable(err))?;
        Ok(())
    }

    fn unavailable(&self, err: std::io::Error) -> StorageError {
        StorageError::Unavailable(format!("{}: {err}", self.path.display()))
    }
}

#[async_trait]
impl FragmentCachePort for FileFragmentCache {
    async fn read(&self, key: FragmentKey) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key.as_str()))
    }

    async fn write(&self, key: FragmentKey, value: String) -> Result<(), StorageError> {
        let span = info_span!("infra.fs.fragment_cache.write", key = %key, len = value.len());
        async {
            let _guard = self.lock.lock().await;
            let mut entries = self.load().await?;
            entries.insert(key.as_str().to_string(), value);
            self.atomic_write(&entries).await
        }
        .instrument(span)
        .await
    }

    async fn remove(&self, key: FragmentKey) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key.as_str()).is_some() {
            self.atomic_write(&entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let span = info_span!("infra.fs.fragment_cache.clear");
        async {
            let _guard = self.lock.lock().await;
            match fs::remove_file(&self.path).await {
                Ok(()) => {
                    debug!("fragment cache file removed");
                    Ok(())
                }
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(self.unavailable(err)),
            }
        }
        .instrument(span)
        .await
    }
}
