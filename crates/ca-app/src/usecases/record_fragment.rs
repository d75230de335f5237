//! Writes one wizard step's fragment into the fragment cache.

use std::sync::Arc;

use ca_core::fragment::{Fragment, FragmentError, FragmentKey};
use ca_core::ports::{FragmentCachePort, StorageError};
use tracing::{info, info_span, Instrument};

#[derive(Debug, thiserror::Error)]
pub enum RecordFragmentError {
    #[error(transparent)]
    Fragment(#[from] FragmentError),

    /// `restOfData` is maintained by the final step form only.
    #[error("fragment `{0}` cannot be recorded directly")]
    NotRecordable(FragmentKey),

    #[error("failed to persist fragment: {0}")]
    Storage(#[from] StorageError),
}

/// Validates a step's output against its typed shape and stores it whole.
pub struct RecordFragment {
    fragment_cache: Arc<dyn FragmentCachePort>,
}

impl RecordFragment {
    pub fn new(fragment_cache: Arc<dyn FragmentCachePort>) -> Self {
        Self { fragment_cache }
    }

    /// Parses `raw` as the shape owned by `key`, then stores the normalized form.
    ///
    /// A shape mismatch is rejected here, before anything is written.
    pub async fn execute_raw(&self, key: FragmentKey, raw: &str) -> Result<(), RecordFragmentError> {
        let fragment = Fragment::parse(key, raw)?;
        self.execute(fragment).await
    }

    pub async fn execute(&self, fragment: Fragment) -> Result<(), RecordFragmentError> {
        let key = fragment.key();
        let span = info_span!("usecase.record_fragment.execute", key = %key);

        async {
            if key == FragmentKey::RestOfData {
                return Err(RecordFragmentError::NotRecordable(key));
            }
            let serialized = fragment.to_json()?;
            self.fragment_cache.write(key, serialized).await?;
            info!("fragment recorded");
            Ok(())
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::json;

    mock! {
        pub FragmentCache {}

        #[async_trait]
        impl FragmentCachePort for FragmentCache {
            async fn read(&self, key: FragmentKey) -> Result<Option<String>, StorageError>;
            async fn write(&self, key: FragmentKey, value: String) -> Result<(), StorageError>;
            async fn remove(&self, key: FragmentKey) -> Result<(), StorageError>;
            async fn clear(&self) -> Result<(), StorageError>;
        }
    }

    fn readiness_json(level: serde_json::Value) -> String {
        json!({
            "keyChallenges": [],
            "digitalLevel": level,
            "digitalTools": [],
            "companyPurpose": "growth"
        })
        .to_string()
    }

    #[tokio::test]
    async fn numeric_string_is_stored_as_number() {
        let mut cache = MockFragmentCache::new();
        cache
            .expect_write()
            .withf(|key, value| {
                *key == FragmentKey::DigitalReadiness && value.contains("\"digitalLevel\":4")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let use_case = RecordFragment::new(Arc::new(cache));
        use_case
            .execute_raw(FragmentKey::DigitalReadiness, &readiness_json(json!("4")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn shape_mismatch_writes_nothing() {
        let mut cache = MockFragmentCache::new();
        cache.expect_write().never();

        let use_case = RecordFragment::new(Arc::new(cache));
        let err = use_case
            .execute_raw(FragmentKey::DigitalReadiness, &readiness_json(json!("high")))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordFragmentError::Fragment(FragmentError::Shape { .. })));
    }

    #[tokio::test]
    async fn rest_of_data_is_refused() {
        let mut cache = MockFragmentCache::new();
        cache.expect_write().never();

        let use_case = RecordFragment::new(Arc::new(cache));
        let err = use_case
            .execute_raw(FragmentKey::RestOfData, r#"{"files":{},"declaration":{}}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, RecordFragmentError::NotRecordable(FragmentKey::RestOfData)));
    }

    #[tokio::test]
    async fn storage_failure_is_reported() {
        let mut cache = MockFragmentCache::new();
        cache
            .expect_write()
            .returning(|_, _| Err(StorageError::Unavailable("disk full".into())));

        let use_case = RecordFragment::new(Arc::new(cache));
        let err = use_case
            .execute_raw(FragmentKey::DigitalReadiness, &readiness_json(json!(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, RecordFragmentError::Storage(_)));
    }
}
