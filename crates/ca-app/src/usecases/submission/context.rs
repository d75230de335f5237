use std::sync::Arc;

use ca_core::ids::SubmissionId;
use ca_core::submission::SubmissionState;
use tokio::sync::{Mutex, MutexGuard};

/// Shared submission context containing state, session id and dispatch lock.
///
/// ## Lock Ordering
/// When acquiring several locks, acquire `dispatch_lock` first, then `state`,
/// then `session`.
/// - `dispatch_lock`: held for a whole dispatch so at most one attempt is in flight.
/// - `state`: read by `get_state` without the dispatch lock.
#[derive(Clone)]
pub(crate) struct SubmissionContext {
    state: Arc<Mutex<SubmissionState>>,
    session: Arc<Mutex<Option<SubmissionId>>>,
    dispatch_lock: Arc<Mutex<()>>,
}

impl SubmissionContext {
    pub fn new(initial_state: SubmissionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(initial_state)),
            session: Arc::new(Mutex::new(None)),
            dispatch_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub async fn get_state(&self) -> SubmissionState {
        self.state.lock().await.clone()
    }

    /// Should only be called while holding the dispatch lock.
    pub async fn set_state(&self, state: SubmissionState) {
        *self.state.lock().await = state;
    }

    /// Returns `None` while another dispatch holds the lock.
    pub fn try_acquire_dispatch_lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.dispatch_lock.try_lock().ok()
    }

    pub async fn submission_id(&self) -> Option<SubmissionId> {
        self.session.lock().await.clone()
    }

    /// Starts a confirm session with a fresh correlation id.
    pub async fn begin_session(&self) -> SubmissionId {
        let id = SubmissionId::new();
        *self.session.lock().await = Some(id.clone());
        id
    }

    pub async fn end_session(&self) -> Option<SubmissionId> {
        self.session.lock().await.take()
    }
}

impl Default for SubmissionContext {
    fn default() -> Self {
        Self::new(SubmissionState::Idle)
    }
}
