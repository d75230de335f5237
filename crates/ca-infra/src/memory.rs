//! In-memory adapters for tests and for running without a data directory.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ca_core::attachment::{AttachmentFile, AttachmentSlot};
use ca_core::fragment::FragmentKey;
use ca_core::ports::{AttachmentStorePort, FragmentCachePort, StorageError};
use tokio::sync::Mutex;

fn simulated_outage() -> StorageError {
    StorageError::Unavailable("storage disabled".to_string())
}

/// Attachment store held in memory. `set_available(false)` makes every call
/// fail with `StorageError::Unavailable`.
pub struct InMemoryAttachmentStore {
    slots: Mutex<BTreeMap<AttachmentSlot, AttachmentFile>>,
    available: AtomicBool,
}

impl InMemoryAttachmentStore {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(simulated_outage())
        }
    }
}

impl Default for InMemoryAttachmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttachmentStorePort for InMemoryAttachmentStore {
    async fn put(&self, slot: AttachmentSlot, file: &AttachmentFile) -> Result<(), StorageError> {
        self.check()?;
        self.slots.lock().await.insert(slot, file.clone());
        Ok(())
    }

    async fn get(&self, slot: AttachmentSlot) -> Result<Option<AttachmentFile>, StorageError> {
        self.check()?;
        Ok(self.slots.lock().await.get(&slot).cloned())
    }

    async fn delete(&self, slot: AttachmentSlot) -> Result<(), StorageError> {
        self.check()?;
        self.slots.lock().await.remove(&slot);
        Ok(())
    }
}

/// Fragment cache held in memory, with the same outage switch.
pub struct InMemoryFragmentCache {
    entries: Mutex<BTreeMap<FragmentKey, String>>,
    available: AtomicBool,
}

impl InMemoryFragmentCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(simulated_outage())
        }
    }
}

impl Default for InMemoryFragmentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FragmentCachePort for InMemoryFragmentCache {
    async fn read(&self, key: FragmentKey) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.entries.lock().await.get(&key).cloned())
    }

    async fn write(&self, key: FragmentKey, value: String) -> Result<(), StorageError> {
        self.check()?;
        self.entries.lock().await.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: FragmentKey) -> Result<(), StorageError> {
        self.check()?;
        self.entries.lock().await.remove(&key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.check()?;
        self.entries.lock().await.clear();
        Ok(())
    }
}
