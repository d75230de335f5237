//! Reads persistence and builds one [`CompositePayload`] per attempt.

use std::sync::Arc;

use ca_core::attachment::AttachmentSlot;
use ca_core::fragment::{Fragment, FragmentError, FragmentKey, FragmentSetBuilder};
use ca_core::ports::{AttachmentStorePort, CaptchaPort, FragmentCachePort};
use ca_core::submission::{AttachmentPart, CompletenessGate, CompositePayload, SubmissionFailure};
use tracing::{debug, error, info_span, warn, Instrument};

#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("required fragment `{0}` is missing")]
    MissingFragment(FragmentKey),

    #[error(transparent)]
    InvalidFragment(#[from] FragmentError),

    #[error("required attachment `{0}` is not available")]
    MissingAttachment(AttachmentSlot),

    #[error("CAPTCHA token is missing")]
    MissingProof,

    #[error("failed to encode companyRequest: {0}")]
    Encode(#[source] serde_json::Error),
}

impl From<AssembleError> for SubmissionFailure {
    fn from(err: AssembleError) -> Self {
        match err {
            AssembleError::MissingFragment(key) => SubmissionFailure::MissingFragment(key),
            AssembleError::InvalidFragment(err) => {
                let key = match &err {
                    FragmentError::Shape { key, .. } | FragmentError::Serialize { key, .. } => *key,
                };
                SubmissionFailure::InvalidFragment {
                    key,
                    reason: err.to_string(),
                }
            }
            AssembleError::MissingAttachment(slot) => SubmissionFailure::MissingAttachment(slot),
            AssembleError::MissingProof => SubmissionFailure::MissingProof,
            AssembleError::Encode(err) => SubmissionFailure::PayloadEncoding {
                detail: err.to_string(),
            },
        }
    }
}

/// Fixed read order: fragments, then attachments, then the CAPTCHA proof.
pub struct SubmissionAssembler {
    fragment_cache: Arc<dyn FragmentCachePort>,
    attachment_store: Arc<dyn AttachmentStorePort>,
    captcha: Arc<dyn CaptchaPort>,
    gate: CompletenessGate,
}

impl SubmissionAssembler {
    pub fn new(
        fragment_cache: Arc<dyn FragmentCachePort>,
        attachment_store: Arc<dyn AttachmentStorePort>,
        captcha: Arc<dyn CaptchaPort>,
        gate: CompletenessGate,
    ) -> Self {
        Self {
            fragment_cache,
            attachment_store,
            captcha,
            gate,
        }
    }

    pub async fn assemble(&self) -> Result<CompositePayload, AssembleError> {
        let span = info_span!("usecase.submission_assembler.assemble");

        async {
            let mut builder = FragmentSetBuilder::default();
            for key in FragmentKey::ALL {
                let raw = match self.fragment_cache.read(key).await {
                    Ok(raw) => raw,
                    Err(err) => {
                        warn!(%key, error = %err, "fragment cache read failed");
                        None
                    }
                };
                let Some(raw) = raw else {
                    error!(%key, "required fragment missing at assembly time");
                    return Err(AssembleError::MissingFragment(key));
                };
                let fragment = Fragment::parse(key, &raw).map_err(|err| {
                    error!(%key, error = %err, "stored fragment does not match its shape");
                    AssembleError::InvalidFragment(err)
                })?;
                builder.insert(fragment);
            }
            let fragments = builder.build().map_err(AssembleError::MissingFragment)?;

            let mut attachments = Vec::new();
            for slot in AttachmentSlot::ALL {
                let file = match self.attachment_store.get(slot).await {
                    Ok(file) => file,
                    Err(err) => {
                        warn!(%slot, error = %err, "attachment unreadable; treating slot as empty");
                        None
                    }
                };
                match file {
                    Some(file) => attachments.push(AttachmentPart { slot, file }),
                    None if self.gate.is_required(slot) => {
                        warn!(%slot, "required attachment missing at assembly time");
                        return Err(AssembleError::MissingAttachment(slot));
                    }
                    None => debug!(%slot, "optional attachment absent"),
                }
            }

            let proof = self
                .captcha
                .current_proof()
                .await
                .ok_or(AssembleError::MissingProof)?;

            CompositePayload::assemble(&fragments, attachments, proof).map_err(AssembleError::Encode)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ca_core::attachment::{AttachmentFile, MimeType};
    use ca_core::CaptchaProof;
    use ca_infra::captcha::InMemoryCaptcha;
    use ca_infra::memory::{InMemoryAttachmentStore, InMemoryFragmentCache};
    use serde_json::json;

    struct Fixture {
        cache: Arc<InMemoryFragmentCache>,
        store: Arc<InMemoryAttachmentStore>,
        captcha: Arc<InMemoryCaptcha>,
        assembler: SubmissionAssembler,
    }

    fn fixture() -> Fixture {
        let cache = Arc::new(InMemoryFragmentCache::new());
        let store = Arc::new(InMemoryAttachmentStore::new());
        let captcha = Arc::new(InMemoryCaptcha::new());
        let assembler = SubmissionAssembler::new(
            cache.clone(),
            store.clone(),
            captcha.clone(),
            CompletenessGate::standard(),
        );
        Fixture {
            cache,
            store,
            captcha,
            assembler,
        }
    }

    async fn seed_fragments(cache: &InMemoryFragmentCache) {
        let values = [
            (
                FragmentKey::CompanyData,
                json!({
                    "companyName": "Acme", "companyRegisterNumber": "1", "createYear": "2020",
                    "companySize": "1-10", "annualTurnover": "0", "companyAddress": "Main",
                    "location": "Baku", "contactPerson": "A", "email": "a@acme.test", "phone": "1"
                }),
            ),
            (
                FragmentKey::DigitalAndFinancial,
                json!({
                    "digital": {"digitalTeamOrLead": false, "digitalPath": false, "digitalTransformationLoyality": false},
                    "finance": {"financialNeed": false}
                }),
            ),
            (
                FragmentKey::DigitalReadiness,
                json!({"digitalLevel": 1, "companyPurpose": "x"}),
            ),
            (
                FragmentKey::PropertyLaw,
                json!({"businessOperations": "x", "companyLawType": "LLC", "products": "x", "exportActivity": false}),
            ),
            (FragmentKey::RestOfData, json!({})),
        ];
        for (key, value) in values {
            cache.write(key, value.to_string()).await.unwrap();
        }
    }

    async fn seed_required_attachments(store: &InMemoryAttachmentStore) {
        for slot in [
            AttachmentSlot::PropertyLawCertificate,
            AttachmentSlot::FinancialStatement,
        ] {
            store
                .put(slot, &AttachmentFile::new("doc.pdf", MimeType::pdf(), vec![1u8; 64]))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn assembles_when_everything_is_present() {
        let fx = fixture();
        seed_fragments(&fx.cache).await;
        seed_required_attachments(&fx.store).await;
        fx.captcha.set_proof(CaptchaProof::new("tok123")).await;

        let payload = fx.assembler.assemble().await.unwrap();

        assert_eq!(
            payload.part_names(),
            vec![
                "companyRequest",
                "recaptchaToken",
                "propertyLawCertificate",
                "financialStatement"
            ]
        );
    }

    #[tokio::test]
    async fn missing_fragment_fails_without_partial_payload() {
        let fx = fixture();
        seed_fragments(&fx.cache).await;
        fx.cache.remove(FragmentKey::PropertyLaw).await.unwrap();
        seed_required_attachments(&fx.store).await;
        fx.captcha.set_proof(CaptchaProof::new("tok123")).await;

        let err = fx.assembler.assemble().await.unwrap_err();

        assert!(matches!(err, AssembleError::MissingFragment(FragmentKey::PropertyLaw)));
        let failure = SubmissionFailure::from(err);
        assert!(failure.is_fatal());
        assert_eq!(failure.user_message(), "Submission failed");
    }

    #[tokio::test]
    async fn proof_is_checked_after_persistence() {
        let fx = fixture();
        seed_fragments(&fx.cache).await;
        seed_required_attachments(&fx.store).await;

        let err = fx.assembler.assemble().await.unwrap_err();
        assert!(matches!(err, AssembleError::MissingProof));
    }

    #[tokio::test]
    async fn required_attachment_gone_from_store_fails() {
        let fx = fixture();
        seed_fragments(&fx.cache).await;
        fx.captcha.set_proof(CaptchaProof::new("tok123")).await;

        let err = fx.assembler.assemble().await.unwrap_err();
        assert!(matches!(
            err,
            AssembleError::MissingAttachment(AttachmentSlot::PropertyLawCertificate)
        ));
    }

    #[tokio::test]
    async fn optional_register_certificate_is_sent_when_present() {
        let fx = fixture();
        seed_fragments(&fx.cache).await;
        seed_required_attachments(&fx.store).await;
        fx.store
            .put(
                AttachmentSlot::RegisterCertificate,
                &AttachmentFile::new("reg.docx", MimeType::docx(), vec![3u8; 8]),
            )
            .await
            .unwrap();
        fx.captcha.set_proof(CaptchaProof::new("tok123")).await;

        let payload = fx.assembler.assemble().await.unwrap();
        assert_eq!(payload.attachments().len(), 3);
    }
}
