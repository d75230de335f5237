//! Mock implementations of the ports for testing.

use async_trait::async_trait;
use mockall::mock;

use crate::attachment::{AttachmentFile, AttachmentSlot};

use super::{AttachmentStorePort, StorageError};

mock! {
    pub AttachmentStore {}

    #[async_trait]
    impl AttachmentStorePort for AttachmentStore {
        async fn put(&self, slot: AttachmentSlot, file: &AttachmentFile) -> Result<(), StorageError>;
        async fn get(&self, slot: AttachmentSlot) -> Result<Option<AttachmentFile>, StorageError>;
        async fn delete(&self, slot: AttachmentSlot) -> Result<(), StorageError>;
    }
}

#[tokio::test]
async fn arc_wrapped_store_delegates_to_inner() {
    use std::sync::Arc;

    let mut inner = MockAttachmentStore::new();
    inner
        .expect_get()
        .withf(|slot| *slot == AttachmentSlot::FinancialStatement)
        .times(1)
        .returning(|_| Ok(None));

    let store = Arc::new(inner);
    let result = AttachmentStorePort::get(&store, AttachmentSlot::FinancialStatement).await;
    assert_eq!(result, Ok(None));
}
