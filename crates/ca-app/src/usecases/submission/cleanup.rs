//! Post-success cleanup of local persistence.

use std::fmt;
use std::sync::Arc;

use ca_core::attachment::AttachmentSlot;
use ca_core::ports::{AttachmentStorePort, CaptchaPort, FragmentCachePort, StorageError};
use tracing::{info, info_span, warn, Instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupTarget {
    FragmentCache,
    Attachment(AttachmentSlot),
}

impl fmt::Display for CleanupTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupTarget::FragmentCache => f.write_str("fragment_cache"),
            CleanupTarget::Attachment(slot) => write!(f, "attachment_store/{slot}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub target: CleanupTarget,
    pub error: StorageError,
}

/// Outcome of one cleanup pass. Failures are informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Clears both stores and resets the CAPTCHA proof.
///
/// Every step runs even if an earlier one failed; nothing here is returned
/// as an error.
pub struct CleanupCoordinator {
    fragment_cache: Arc<dyn FragmentCachePort>,
    attachment_store: Arc<dyn AttachmentStorePort>,
    captcha: Arc<dyn CaptchaPort>,
}

impl CleanupCoordinator {
    pub fn new(
        fragment_cache: Arc<dyn FragmentCachePort>,
        attachment_store: Arc<dyn AttachmentStorePort>,
        captcha: Arc<dyn CaptchaPort>,
    ) -> Self {
        Self {
            fragment_cache,
            attachment_store,
            captcha,
        }
    }

    pub async fn run(&self) -> CleanupReport {
        let span = info_span!("usecase.cleanup.run");

        async {
            let mut report = CleanupReport::default();

            if let Err(error) = self.fragment_cache.clear().await {
                warn!(target_store = %CleanupTarget::FragmentCache, %error, "cleanup step failed");
                report.failures.push(CleanupFailure {
                    target: CleanupTarget::FragmentCache,
                    error,
                });
            }

            for slot in AttachmentSlot::ALL {
                if let Err(error) = self.attachment_store.delete(slot).await {
                    let target = CleanupTarget::Attachment(slot);
                    warn!(target_store = %target, %error, "cleanup step failed");
                    report.failures.push(CleanupFailure { target, error });
                }
            }

            self.captcha.reset().await;

            info!(failures = report.failures.len(), "local persistence cleared");
            report
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ca_core::attachment::{AttachmentFile, MimeType};
    use ca_core::fragment::FragmentKey;
    use ca_core::CaptchaProof;
    use ca_infra::captcha::InMemoryCaptcha;
    use ca_infra::memory::{InMemoryAttachmentStore, InMemoryFragmentCache};

    #[tokio::test]
    async fn empties_both_stores_and_resets_proof() {
        let cache = Arc::new(InMemoryFragmentCache::new());
        let store = Arc::new(InMemoryAttachmentStore::new());
        let captcha = Arc::new(InMemoryCaptcha::new());
        cache
            .write(FragmentKey::CompanyData, "{}".into())
            .await
            .unwrap();
        store
            .put(
                AttachmentSlot::FinancialStatement,
                &AttachmentFile::new("fs.pdf", MimeType::pdf(), vec![0u8; 4]),
            )
            .await
            .unwrap();
        captcha.set_proof(CaptchaProof::new("tok123")).await;

        let report = CleanupCoordinator::new(cache.clone(), store.clone(), captcha.clone())
            .run()
            .await;

        assert!(report.is_clean());
        assert!(cache.is_empty().await);
        assert!(store.is_empty().await);
        assert!(captcha.current_proof().await.is_none());
    }

    #[tokio::test]
    async fn failures_are_collected_and_remaining_steps_still_run() {
        let cache = Arc::new(InMemoryFragmentCache::new());
        let store = Arc::new(InMemoryAttachmentStore::new());
        let captcha = Arc::new(InMemoryCaptcha::new());
        cache
            .write(FragmentKey::CompanyData, "{}".into())
            .await
            .unwrap();
        captcha.set_proof(CaptchaProof::new("tok123")).await;
        store.set_available(false);

        let report = CleanupCoordinator::new(cache.clone(), store, captcha.clone())
            .run()
            .await;

        assert_eq!(report.failures.len(), AttachmentSlot::ALL.len());
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.target, CleanupTarget::Attachment(_))));
        assert!(cache.is_empty().await);
        assert!(captcha.current_proof().await.is_none());
    }
}
