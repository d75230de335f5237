//! Submission state machine.
//!
//! Pure transition function for the confirm → submit → retry → success flow.
//! Side effects are returned as [`SubmissionAction`]s for the orchestrator.

use serde::{Deserialize, Serialize};

use super::failure::SubmissionFailure;
use super::gate::GateReport;

/// Attempts allowed per confirm session, first dispatch included.
pub const MAX_SUBMISSION_ATTEMPTS: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    /// No confirm dialog open.
    Idle,
    /// Confirm dialog shown, nothing dispatched yet.
    ConfirmPending,
    /// One attempt in flight. `attempts` counts the failures before it.
    Submitting { attempts: u8 },
    /// Last attempt failed; retry is still allowed.
    Failed { attempts: u8, failure: SubmissionFailure },
    /// Attempt budget exhausted. Only dismissal leaves this state.
    Abandoned { attempts: u8, failure: SubmissionFailure },
    /// Created on the server and local persistence cleared.
    Success,
}

impl SubmissionState {
    pub fn attempts(&self) -> u8 {
        match self {
            SubmissionState::Submitting { attempts }
            | SubmissionState::Failed { attempts, .. }
            | SubmissionState::Abandoned { attempts, .. } => *attempts,
            SubmissionState::Idle | SubmissionState::ConfirmPending | SubmissionState::Success => 0,
        }
    }

    /// Confirm and retry controls are disabled while this is true.
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Submitting { .. })
    }

    pub fn can_retry(&self) -> bool {
        matches!(self, SubmissionState::Failed { attempts, .. } if *attempts < MAX_SUBMISSION_ATTEMPTS)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Success | SubmissionState::Abandoned { .. })
    }

    pub fn last_failure(&self) -> Option<&SubmissionFailure> {
        match self {
            SubmissionState::Failed { failure, .. } | SubmissionState::Abandoned { failure, .. } => {
                Some(failure)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionEvent {
    /// User pressed submit; carries the gate as evaluated at that moment.
    SubmitRequested { gate: GateReport },
    /// User confirmed in the dialog; the gate is re-evaluated at confirm time.
    Confirm { gate: GateReport },
    Retry,
    Dismiss,
    /// Transport reported `201 Created`.
    DispatchSucceeded,
    DispatchFailed { failure: SubmissionFailure },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionAction {
    /// Populate per-field messages for whatever the gate found missing.
    ReportIncomplete { gate: GateReport },
    /// Start a fresh confirm session: new correlation id, cleared error display.
    BeginSession,
    /// Read persistence, check the proof and dispatch. `attempt` is 0-based.
    AssembleAndDispatch { attempt: u8 },
    /// Clear both stores and reset the CAPTCHA proof.
    RunCleanup,
    /// Drop the in-memory attempt state; persisted data is untouched.
    DiscardAttempt,
}

/// Pure submission state machine.
pub struct SubmissionStateMachine;

impl SubmissionStateMachine {
    pub fn transition(
        state: SubmissionState,
        event: SubmissionEvent,
    ) -> (SubmissionState, Vec<SubmissionAction>) {
        match (state, event) {
            (SubmissionState::Idle, SubmissionEvent::SubmitRequested { gate }) => {
                if gate.is_complete() {
                    (
                        SubmissionState::ConfirmPending,
                        vec![SubmissionAction::BeginSession],
                    )
                } else {
                    (
                        SubmissionState::Idle,
                        vec![SubmissionAction::ReportIncomplete { gate }],
                    )
                }
            }
            (SubmissionState::ConfirmPending, SubmissionEvent::Confirm { gate }) => {
                if gate.is_complete() {
                    (
                        SubmissionState::Submitting { attempts: 0 },
                        vec![SubmissionAction::AssembleAndDispatch { attempt: 0 }],
                    )
                } else {
                    (
                        SubmissionState::Idle,
                        vec![
                            SubmissionAction::ReportIncomplete { gate },
                            SubmissionAction::DiscardAttempt,
                        ],
                    )
                }
            }
            (SubmissionState::Submitting { .. }, SubmissionEvent::DispatchSucceeded) => {
                (SubmissionState::Success, vec![SubmissionAction::RunCleanup])
            }
            (SubmissionState::Submitting { attempts }, SubmissionEvent::DispatchFailed { failure }) => {
                let attempts = attempts.saturating_add(1);
                if attempts >= MAX_SUBMISSION_ATTEMPTS {
                    (SubmissionState::Abandoned { attempts, failure }, Vec::new())
                } else {
                    (SubmissionState::Failed { attempts, failure }, Vec::new())
                }
            }
            (SubmissionState::Failed { attempts, .. }, SubmissionEvent::Retry)
                if attempts < MAX_SUBMISSION_ATTEMPTS =>
            {
                (
                    SubmissionState::Submitting { attempts },
                    vec![SubmissionAction::AssembleAndDispatch { attempt: attempts }],
                )
            }
            (
                SubmissionState::ConfirmPending
                | SubmissionState::Failed { .. }
                | SubmissionState::Abandoned { .. }
                | SubmissionState::Success,
                SubmissionEvent::Dismiss,
            ) => (SubmissionState::Idle, vec![SubmissionAction::DiscardAttempt]),
            (state, _event) => (state, Vec::new()),
        }
    }
}
