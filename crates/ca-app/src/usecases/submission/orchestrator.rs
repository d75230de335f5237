//! Submission orchestrator.
//!
//! This module coordinates the submission state machine and side effects.

use std::sync::Arc;

use ca_core::ids::SubmissionId;
use ca_core::ports::{SubmissionEventPort, SubmissionTransportPort};
use ca_core::submission::{
    SubmissionAction, SubmissionEvent, SubmissionFailure, SubmissionState,
    SubmissionStateMachine,
};
use tracing::{debug, error, field, info, info_span, warn, Instrument};

use crate::usecases::final_step::FinalStepForm;
use crate::usecases::submission::context::SubmissionContext;
use crate::usecases::submission::{CleanupCoordinator, SubmissionAssembler};

/// Errors produced by the submission orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("a submission attempt is already in flight")]
    Busy,
}

/// Orchestrator that drives submission state and side effects.
pub struct SubmissionOrchestrator {
    context: Arc<SubmissionContext>,

    form: Arc<FinalStepForm>,
    assembler: Arc<SubmissionAssembler>,
    cleanup: Arc<CleanupCoordinator>,
    transport: Arc<dyn SubmissionTransportPort>,
    events: Arc<dyn SubmissionEventPort>,
}

impl SubmissionOrchestrator {
    pub fn new(
        form: Arc<FinalStepForm>,
        assembler: Arc<SubmissionAssembler>,
        cleanup: Arc<CleanupCoordinator>,
        transport: Arc<dyn SubmissionTransportPort>,
        events: Arc<dyn SubmissionEventPort>,
    ) -> Self {
        Self {
            context: SubmissionContext::default().arc(),
            form,
            assembler,
            cleanup,
            transport,
            events,
        }
    }

    /// Submit button. Opens the confirm dialog only if the gate is open now.
    pub async fn request_submit(&self) -> Result<SubmissionState, SubmissionError> {
        let gate = self.form.evaluate_gate().await;
        self.dispatch(SubmissionEvent::SubmitRequested { gate }).await
    }

    /// Confirm button. The gate is evaluated again so an expired proof or a
    /// removed document cannot slip through.
    pub async fn confirm(&self) -> Result<SubmissionState, SubmissionError> {
        let gate = self.form.evaluate_gate().await;
        self.dispatch(SubmissionEvent::Confirm { gate }).await
    }

    /// Ignored once the attempt budget is spent.
    pub async fn retry(&self) -> Result<SubmissionState, SubmissionError> {
        self.dispatch(SubmissionEvent::Retry).await
    }

    pub async fn dismiss(&self) -> Result<SubmissionState, SubmissionError> {
        self.dispatch(SubmissionEvent::Dismiss).await
    }

    pub async fn state(&self) -> SubmissionState {
        self.context.get_state().await
    }

    pub async fn submission_id(&self) -> Option<SubmissionId> {
        self.context.submission_id().await
    }

    async fn dispatch(&self, event: SubmissionEvent) -> Result<SubmissionState, SubmissionError> {
        // A held lock means an attempt is in flight; the controls are disabled.
        let Some(_dispatch_guard) = self.context.try_acquire_dispatch_lock() else {
            debug!(event = ?event, "submission busy; event refused");
            return Err(SubmissionError::Busy);
        };

        let span = info_span!(
            "usecase.submission_orchestrator.dispatch",
            event = ?event,
            submission_id = field::Empty
        );
        if let Some(id) = self.context.submission_id().await {
            span.record("submission_id", field::display(&id));
        }

        async {
            let mut current = self.context.get_state().await;
            let mut pending_events = vec![event];

            while let Some(event) = pending_events.pop() {
                let from = current.clone();
                let event_name = event_name(&event);
                let (next, actions) = SubmissionStateMachine::transition(current, event);
                info!(from = ?from, to = ?next, event = %event_name, "submission state transition");

                // Submitting must be observable while the request is out;
                // Success must not be observable before cleanup finished.
                let publish_first = actions
                    .iter()
                    .any(|action| matches!(action, SubmissionAction::AssembleAndDispatch { .. }));
                if publish_first {
                    self.set_state_and_emit(next.clone()).await;
                }
                let follow_up_events = self.execute_actions(actions).await;
                if !publish_first {
                    self.set_state_and_emit(next.clone()).await;
                }

                if let SubmissionState::Abandoned { attempts, failure } = &next {
                    warn!(attempts, failure = %failure, "submission abandoned; retry budget exhausted");
                }

                current = next;
                pending_events.extend(follow_up_events);
            }

            Ok(current)
        }
        .instrument(span)
        .await
    }

    async fn execute_actions(&self, actions: Vec<SubmissionAction>) -> Vec<SubmissionEvent> {
        let mut follow_up_events = Vec::new();
        for action in actions {
            debug!(?action, "submission executing action");
            match action {
                SubmissionAction::ReportIncomplete { gate } => {
                    self.form.report_incomplete(&gate).await;
                }
                SubmissionAction::BeginSession => {
                    let id = self.context.begin_session().await;
                    tracing::Span::current().record("submission_id", field::display(&id));
                    info!(submission_id = %id, "confirm session started");
                }
                SubmissionAction::AssembleAndDispatch { attempt } => {
                    follow_up_events.push(self.assemble_and_dispatch(attempt).await);
                }
                SubmissionAction::RunCleanup => {
                    let report = self.cleanup.run().await;
                    if !report.is_clean() {
                        warn!(
                            failures = report.failures.len(),
                            "cleanup incomplete; success is shown regardless"
                        );
                    }
                    self.form.reset().await;
                }
                SubmissionAction::DiscardAttempt => {
                    if let Some(id) = self.context.end_session().await {
                        info!(submission_id = %id, "confirm session discarded");
                    }
                }
            }
        }
        follow_up_events
    }

    async fn assemble_and_dispatch(&self, attempt: u8) -> SubmissionEvent {
        let submission_id = self.context.submission_id().await;
        let span = info_span!(
            "usecase.submission_orchestrator.attempt",
            attempt,
            submission_id = field::Empty,
            endpoint = %self.transport.endpoint()
        );
        if let Some(id) = &submission_id {
            span.record("submission_id", field::display(id));
        }

        async {
            let payload = match self.assembler.assemble().await {
                Ok(payload) => payload,
                Err(err) => {
                    let failure = SubmissionFailure::from(err);
                    if failure.is_fatal() {
                        error!(failure = %failure, "assembly failed; persisted data is unusable");
                    } else {
                        warn!(failure = %failure, "assembly failed; attempt not dispatched");
                    }
                    return SubmissionEvent::DispatchFailed { failure };
                }
            };

            let event = match self.transport.submit(&payload).await {
                Ok(response) if response.is_created() => {
                    info!(status = response.status, "submission accepted");
                    SubmissionEvent::DispatchSucceeded
                }
                Ok(response) => {
                    let failure = SubmissionFailure::from_response(&response);
                    warn!(status = response.status, failure = %failure, "submission rejected");
                    SubmissionEvent::DispatchFailed { failure }
                }
                Err(err) => {
                    warn!(error = %err, "submission transport failed");
                    SubmissionEvent::DispatchFailed {
                        failure: SubmissionFailure::from_transport_error(&err),
                    }
                }
            };
            drop(payload);
            event
        }
        .instrument(span)
        .await
    }

    async fn set_state_and_emit(&self, state: SubmissionState) {
        self.context.set_state(state.clone()).await;
        let submission_id = self.context.submission_id().await;
        self.events
            .emit_state_changed(&state, submission_id.as_ref())
            .await;
    }
}

fn event_name(event: &SubmissionEvent) -> &'static str {
    match event {
        SubmissionEvent::SubmitRequested { .. } => "SubmitRequested",
        SubmissionEvent::Confirm { .. } => "Confirm",
        SubmissionEvent::Retry => "Retry",
        SubmissionEvent::Dismiss => "Dismiss",
        SubmissionEvent::DispatchSucceeded => "DispatchSucceeded",
        SubmissionEvent::DispatchFailed { .. } => "DispatchFailed",
    }
}
