//! End-to-end submission scenarios over in-memory adapters.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ca_app::usecases::{FieldKey, SubmissionError};
use ca_app::{AppDeps, CompanyApplication};
use ca_core::attachment::{AttachmentFile, AttachmentSlot, MimeType, RejectionReason};
use ca_core::declaration::Declaration;
use ca_core::fragment::FragmentKey;
use ca_core::ids::SubmissionId;
use ca_core::ports::{
    AttachmentStorePort, CaptchaPort, SubmissionEventPort, SubmissionTransportPort,
    TransportError, TransportResponse,
};
use ca_core::submission::{
    CompositePayload, NetworkFailureKind, SubmissionFailure, SubmissionState,
};
use ca_core::{AppConfig, CaptchaProof};
use ca_infra::captcha::InMemoryCaptcha;
use ca_infra::memory::{InMemoryAttachmentStore, InMemoryFragmentCache};
use serde_json::json;
use tokio::sync::Notify;

const ENDPOINT: &str = "http://api.test/api/v1/companies/add";

type Scripted = Result<TransportResponse, TransportError>;

/// Replays scripted outcomes and records what was sent.
#[derive(Default)]
struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Scripted>>,
    sent: Mutex<Vec<CompositePayload>>,
    calls: AtomicUsize,
    entered: Notify,
    /// When set, each request waits here before answering.
    release: Option<Notify>,
}

impl ScriptedTransport {
    fn with(outcomes: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    fn held(outcomes: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            release: Some(Notify::new()),
            ..Self::with(outcomes)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionTransportPort for ScriptedTransport {
    fn endpoint(&self) -> &str {
        ENDPOINT
    }

    async fn submit(&self, payload: &CompositePayload) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(payload.clone());
        self.entered.notify_one();
        if let Some(release) = &self.release {
            release.notified().await;
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected dispatch"))
    }
}

#[derive(Default)]
struct RecordingEvents {
    seen: Mutex<Vec<(SubmissionState, Option<SubmissionId>)>>,
}

#[async_trait]
impl SubmissionEventPort for RecordingEvents {
    async fn emit_state_changed(&self, state: &SubmissionState, id: Option<&SubmissionId>) {
        self.seen.lock().unwrap().push((state.clone(), id.cloned()));
    }
}

struct Harness {
    app: CompanyApplication,
    cache: Arc<InMemoryFragmentCache>,
    store: Arc<InMemoryAttachmentStore>,
    captcha: Arc<InMemoryCaptcha>,
    transport: Arc<ScriptedTransport>,
    events: Arc<RecordingEvents>,
}

fn harness(transport: ScriptedTransport) -> Harness {
    let cache = Arc::new(InMemoryFragmentCache::new());
    let store = Arc::new(InMemoryAttachmentStore::new());
    let captcha = Arc::new(InMemoryCaptcha::new());
    let transport = Arc::new(transport);
    let events = Arc::new(RecordingEvents::default());

    let app = CompanyApplication::new(
        AppDeps {
            attachment_store: store.clone(),
            fragment_cache: cache.clone(),
            captcha: captcha.clone(),
            transport: transport.clone(),
            submission_events: events.clone(),
        },
        &AppConfig::default(),
    );

    Harness {
        app,
        cache,
        store,
        captcha,
        transport,
        events,
    }
}

fn network_failure() -> Scripted {
    Err(TransportError::Connect {
        endpoint: ENDPOINT.into(),
        detail: "connection refused".into(),
    })
}

fn created() -> Scripted {
    Ok(TransportResponse {
        status: 201,
        body: r#"{"id":42}"#.into(),
    })
}

async fn record_upstream_steps(h: &Harness) {
    let steps = [
        (
            FragmentKey::CompanyData,
            json!({
                "companyName": "Caspian Tea LLC",
                "companyRegisterNumber": "1402339871",
                "createYear": "2014",
                "companySize": "10-50",
                "annualTurnover": "500000",
                "companyAddress": "28 May st. 12",
                "location": "Baku",
                "contactPerson": "Leyla Aliyeva",
                "email": "leyla@caspiantea.test",
                "phone": "+994501112233"
            }),
        ),
        (
            FragmentKey::DigitalAndFinancial,
            json!({
                "digital": {"digitalTeamOrLead": true, "digitalPath": true, "digitalTransformationLoyality": false},
                "finance": {"financialNeed": false, "neededBudget": ""}
            }),
        ),
        (
            FragmentKey::DigitalReadiness,
            json!({"keyChallenges": ["skills"], "digitalLevel": "2", "digitalTools": [], "companyPurpose": "export"}),
        ),
        (
            FragmentKey::PropertyLaw,
            json!({"businessOperations": "production", "companyLawType": "LLC", "products": "tea", "exportActivity": false}),
        ),
    ];
    for (key, value) in steps {
        h.app
            .record_fragment
            .execute_raw(key, &value.to_string())
            .await
            .unwrap();
    }
}

async fn fill_final_step(h: &Harness) {
    h.app.final_step.rehydrate().await;
    h.app
        .final_step
        .attach(
            AttachmentSlot::PropertyLawCertificate,
            AttachmentFile::new("plc.pdf", MimeType::pdf(), vec![1u8; 2 * 1024]),
        )
        .await
        .unwrap();
    h.app
        .final_step
        .attach(
            AttachmentSlot::FinancialStatement,
            AttachmentFile::new("fs.xlsx", MimeType::xlsx(), vec![2u8; 3 * 1024]),
        )
        .await
        .unwrap();
    for declaration in Declaration::ALL {
        h.app.final_step.set_declaration(declaration, true).await;
    }
    h.captcha.set_proof(CaptchaProof::new("tok123")).await;
}

#[tokio::test]
async fn created_response_ends_in_success_with_empty_stores() {
    let h = harness(ScriptedTransport::with([created()]));
    record_upstream_steps(&h).await;
    fill_final_step(&h).await;
    assert!(h.app.final_step.evaluate_gate().await.is_complete());

    assert_eq!(
        h.app.submission.request_submit().await.unwrap(),
        SubmissionState::ConfirmPending
    );
    let state = h.app.submission.confirm().await.unwrap();

    assert_eq!(state, SubmissionState::Success);
    assert!(h.cache.is_empty().await);
    assert!(h.store.is_empty().await);
    assert!(h.captcha.current_proof().await.is_none());
    assert_eq!(h.transport.calls(), 1);

    let sent = h.transport.sent.lock().unwrap();
    assert_eq!(
        sent[0].part_names(),
        vec![
            "companyRequest",
            "recaptchaToken",
            "propertyLawCertificate",
            "financialStatement"
        ]
    );
    assert_eq!(sent[0].recaptcha_token().as_str(), "tok123");

    let seen = h.events.seen.lock().unwrap();
    let states: Vec<_> = seen.iter().map(|(state, _)| state.clone()).collect();
    assert_eq!(
        states,
        vec![
            SubmissionState::ConfirmPending,
            SubmissionState::Submitting { attempts: 0 },
            SubmissionState::Success
        ]
    );
    let ids: Vec<_> = seen.iter().map(|(_, id)| id.clone()).collect();
    assert!(ids[0].is_some());
    assert!(ids.iter().all(|id| id == &ids[0]));
}

#[tokio::test]
async fn three_network_failures_abandon_and_a_fourth_retry_is_not_dispatched() {
    let h = harness(ScriptedTransport::with([
        network_failure(),
        network_failure(),
        network_failure(),
    ]));
    record_upstream_steps(&h).await;
    fill_final_step(&h).await;

    h.app.submission.request_submit().await.unwrap();
    let first = h.app.submission.confirm().await.unwrap();
    assert!(matches!(first, SubmissionState::Failed { attempts: 1, .. }));
    assert!(first.can_retry());

    let second = h.app.submission.retry().await.unwrap();
    assert!(matches!(second, SubmissionState::Failed { attempts: 2, .. }));

    let third = h.app.submission.retry().await.unwrap();
    let SubmissionState::Abandoned { attempts, failure } = &third else {
        panic!("expected Abandoned, got {third:?}");
    };
    assert_eq!(*attempts, 3);
    assert!(matches!(
        failure,
        SubmissionFailure::NetworkFailure {
            kind: NetworkFailureKind::CannotConnect,
            ..
        }
    ));
    assert!(failure
        .user_message()
        .starts_with("Network Error - Cannot connect to backend server!"));
    assert!(!third.can_retry());

    let fourth = h.app.submission.retry().await.unwrap();
    assert_eq!(fourth, third);
    assert_eq!(h.transport.calls(), 3);

    // Nothing was cleared by the failed attempts.
    assert!(!h.cache.is_empty().await);
    assert!(!h.store.is_empty().await);

    // Every retry re-read unchanged persistence.
    let sent = h.transport.sent.lock().unwrap();
    assert_eq!(sent[0], sent[1]);
    assert_eq!(sent[1], sent[2]);
}

#[tokio::test]
async fn oversized_financial_statement_only_affects_its_slot() {
    let h = harness(ScriptedTransport::default());
    record_upstream_steps(&h).await;
    h.app.final_step.rehydrate().await;
    h.app
        .final_step
        .attach(
            AttachmentSlot::PropertyLawCertificate,
            AttachmentFile::new("plc.pdf", MimeType::pdf(), vec![1u8; 2 * 1024]),
        )
        .await
        .unwrap();
    for declaration in Declaration::ALL {
        h.app.final_step.set_declaration(declaration, true).await;
    }
    h.captcha.set_proof(CaptchaProof::new("tok123")).await;

    let err = h
        .app
        .final_step
        .attach(
            AttachmentSlot::FinancialStatement,
            AttachmentFile::new("fs.xlsx", MimeType::xlsx(), vec![0u8; 11 * 1024 * 1024]),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ca_app::usecases::AttachError::Rejected {
            slot: AttachmentSlot::FinancialStatement,
            reason: RejectionReason::SizeExceeded { .. }
        }
    ));

    let snapshot = h.app.final_step.snapshot().await;
    assert_eq!(snapshot.field_errors.len(), 1);
    assert!(snapshot
        .field_errors
        .contains_key(&FieldKey::Slot(AttachmentSlot::FinancialStatement)));
    assert!(snapshot
        .rest_of_data
        .files
        .get(AttachmentSlot::PropertyLawCertificate)
        .is_some());
    assert!(snapshot.rest_of_data.declaration.is_complete());
    assert!(!snapshot.gate.is_complete());
    assert!(h
        .store
        .get(AttachmentSlot::FinancialStatement)
        .await
        .unwrap()
        .is_none());

    assert_eq!(
        h.app.submission.request_submit().await.unwrap(),
        SubmissionState::Idle
    );
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn fresh_confirm_session_resets_the_attempt_counter() {
    let h = harness(ScriptedTransport::with([
        network_failure(),
        network_failure(),
        created(),
    ]));
    record_upstream_steps(&h).await;
    fill_final_step(&h).await;

    h.app.submission.request_submit().await.unwrap();
    let first_id = h.app.submission.submission_id().await;
    h.app.submission.confirm().await.unwrap();
    let state = h.app.submission.retry().await.unwrap();
    assert_eq!(state.attempts(), 2);

    assert_eq!(h.app.submission.dismiss().await.unwrap(), SubmissionState::Idle);
    assert_eq!(h.app.submission.state().await.attempts(), 0);

    h.app.submission.request_submit().await.unwrap();
    assert_ne!(h.app.submission.submission_id().await, first_id);
    let state = h.app.submission.confirm().await.unwrap();

    assert_eq!(state, SubmissionState::Success);
    assert_eq!(h.transport.calls(), 3);
}

#[tokio::test]
async fn server_error_detail_is_surfaced_and_retryable() {
    let h = harness(ScriptedTransport::with([Ok(TransportResponse {
        status: 400,
        body: r#"{"message":"VOEN already registered"}"#.into(),
    })]));
    record_upstream_steps(&h).await;
    fill_final_step(&h).await;

    h.app.submission.request_submit().await.unwrap();
    let state = h.app.submission.confirm().await.unwrap();

    let failure = state.last_failure().unwrap();
    assert_eq!(failure.user_message(), "VOEN already registered");
    assert!(state.can_retry());
    assert!(!h.cache.is_empty().await);
}

#[tokio::test]
async fn document_lost_from_store_fails_the_attempt_without_dispatch() {
    let h = harness(ScriptedTransport::default());
    record_upstream_steps(&h).await;
    fill_final_step(&h).await;
    h.app.submission.request_submit().await.unwrap();

    // Storage was cleared underneath the form; the mirror still lists it.
    h.store
        .delete(AttachmentSlot::FinancialStatement)
        .await
        .unwrap();
    let state = h.app.submission.confirm().await.unwrap();

    assert_eq!(
        state,
        SubmissionState::Failed {
            attempts: 1,
            failure: SubmissionFailure::MissingAttachment(AttachmentSlot::FinancialStatement),
        }
    );
    assert_eq!(h.transport.calls(), 0);
}

#[tokio::test]
async fn controls_are_refused_while_an_attempt_is_in_flight() {
    let h = harness(ScriptedTransport::held([created()]));
    record_upstream_steps(&h).await;
    fill_final_step(&h).await;
    h.app.submission.request_submit().await.unwrap();

    let submission = h.app.submission.clone();
    let in_flight = tokio::spawn(async move { submission.confirm().await });
    h.transport.entered.notified().await;

    assert!(matches!(
        h.app.submission.retry().await,
        Err(SubmissionError::Busy)
    ));
    assert!(matches!(
        h.app.submission.confirm().await,
        Err(SubmissionError::Busy)
    ));
    assert_eq!(
        h.app.submission.state().await,
        SubmissionState::Submitting { attempts: 0 }
    );

    if let Some(release) = &h.transport.release {
        release.notify_one();
    }
    let state = in_flight.await.unwrap().unwrap();

    assert_eq!(state, SubmissionState::Success);
    assert_eq!(h.transport.calls(), 1);
}
