use async_trait::async_trait;
use std::sync::Arc;

use crate::attachment::{AttachmentFile, AttachmentSlot};

use super::StorageError;

/// Persistent per-profile store of uploaded documents, one value per slot.
///
/// Implementations open their backing structure lazily; repeated opens are
/// idempotent.
#[async_trait]
pub trait AttachmentStorePort: Send + Sync {
    /// Overwrites whatever the slot held.
    async fn put(&self, slot: AttachmentSlot, file: &AttachmentFile) -> Result<(), StorageError>;

    async fn get(&self, slot: AttachmentSlot) -> Result<Option<AttachmentFile>, StorageError>;

    /// Deleting an empty slot succeeds.
    async fn delete(&self, slot: AttachmentSlot) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: AttachmentStorePort + ?Sized> AttachmentStorePort for Arc<T> {
    async fn put(&self, slot: AttachmentSlot, file: &AttachmentFile) -> Result<(), StorageError> {
        (**self).put(slot, file).await
    }

    async fn get(&self, slot: AttachmentSlot) -> Result<Option<AttachmentFile>, StorageError> {
        (**self).get(slot).await
    }

    async fn delete(&self, slot: AttachmentSlot) -> Result<(), StorageError> {
        (**self).delete(slot).await
    }
}
