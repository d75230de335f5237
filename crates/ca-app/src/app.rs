//! Use case wiring for one applicant profile.

use std::sync::Arc;

use ca_core::attachment::AttachmentPolicy;
use ca_core::config::AppConfig;
use ca_core::submission::CompletenessGate;

use crate::deps::AppDeps;
use crate::usecases::{
    CleanupCoordinator, DiscardApplication, FinalStepForm, RecordFragment, SubmissionAssembler,
    SubmissionOrchestrator,
};

/// Every use case built once over a shared set of ports.
pub struct CompanyApplication {
    pub record_fragment: Arc<RecordFragment>,
    pub final_step: Arc<FinalStepForm>,
    pub submission: Arc<SubmissionOrchestrator>,
    pub discard: Arc<DiscardApplication>,
}

impl CompanyApplication {
    pub fn new(deps: AppDeps, config: &AppConfig) -> Self {
        let AppDeps {
            attachment_store,
            fragment_cache,
            captcha,
            transport,
            submission_events,
        } = deps;

        let policy = AttachmentPolicy::standard().with_max_bytes(config.max_attachment_bytes);
        let gate = CompletenessGate::new(config.required_slots.iter().copied());

        let final_step = Arc::new(FinalStepForm::new(
            attachment_store.clone(),
            fragment_cache.clone(),
            captcha.clone(),
            policy,
            gate.clone(),
        ));
        let assembler = Arc::new(SubmissionAssembler::new(
            fragment_cache.clone(),
            attachment_store.clone(),
            captcha.clone(),
            gate,
        ));
        let cleanup = Arc::new(CleanupCoordinator::new(
            fragment_cache.clone(),
            attachment_store,
            captcha,
        ));
        let submission = Arc::new(SubmissionOrchestrator::new(
            final_step.clone(),
            assembler,
            cleanup.clone(),
            transport,
            submission_events,
        ));

        Self {
            record_fragment: Arc::new(RecordFragment::new(fragment_cache)),
            discard: Arc::new(DiscardApplication::new(cleanup, final_step.clone())),
            final_step,
            submission,
        }
    }
}
