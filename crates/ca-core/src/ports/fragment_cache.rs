use async_trait::async_trait;

use crate::fragment::FragmentKey;

use super::StorageError;

/// String-valued key/value cache holding each wizard step's fragment.
///
/// Values are opaque serialized text here; typing happens in the use cases.
#[async_trait]
pub trait FragmentCachePort: Send + Sync {
    async fn read(&self, key: FragmentKey) -> Result<Option<String>, StorageError>;

    async fn write(&self, key: FragmentKey, value: String) -> Result<(), StorageError>;

    async fn remove(&self, key: FragmentKey) -> Result<(), StorageError>;

    /// Drops every entry.
    async fn clear(&self) -> Result<(), StorageError>;
}
