//! Failure taxonomy for dispatch-time errors and its user-facing messages.

use serde::{Deserialize, Serialize};

use crate::attachment::AttachmentSlot;
use crate::fragment::FragmentKey;
use crate::ports::{TransportError, TransportResponse};

const GENERIC_FAILURE_MESSAGE: &str = "Submission failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkFailureKind {
    CannotConnect,
    TimedOut,
    Other,
}

/// Why a submission attempt ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SubmissionFailure {
    /// Upstream step data absent at assembly time. The gate should make this
    /// unreachable; it is logged as a precondition violation.
    #[error("required fragment `{0}` is missing")]
    MissingFragment(FragmentKey),

    #[error("fragment `{key}` is malformed: {reason}")]
    InvalidFragment { key: FragmentKey, reason: String },

    /// A required document could not be read back from the attachment store.
    #[error("required attachment `{0}` is not available")]
    MissingAttachment(AttachmentSlot),

    #[error("CAPTCHA token is missing")]
    MissingProof,

    #[error("payload could not be encoded: {detail}")]
    PayloadEncoding { detail: String },

    #[error("network failure ({kind:?}) talking to {endpoint}: {detail}")]
    NetworkFailure {
        kind: NetworkFailureKind,
        endpoint: String,
        detail: String,
    },

    #[error("server responded with status {status}")]
    ServerError { status: u16, detail: Option<String> },
}

impl SubmissionFailure {
    pub fn from_transport_error(err: &TransportError) -> Self {
        let (kind, endpoint, detail) = match err {
            TransportError::Connect { endpoint, detail } => {
                (NetworkFailureKind::CannotConnect, endpoint, detail)
            }
            TransportError::Timeout { endpoint, detail } => {
                (NetworkFailureKind::TimedOut, endpoint, detail)
            }
            TransportError::Request { endpoint, detail } => {
                (NetworkFailureKind::Other, endpoint, detail)
            }
        };
        SubmissionFailure::NetworkFailure {
            kind,
            endpoint: endpoint.clone(),
            detail: detail.clone(),
        }
    }

    /// Classifies a response that was not `201 Created`. The server's
    /// `message` (or `error`) field is kept when the body is JSON.
    pub fn from_response(response: &TransportResponse) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(&response.body)
            .ok()
            .and_then(|body| {
                ["message", "error"]
                    .into_iter()
                    .find_map(|field| body.get(field).and_then(|v| v.as_str()).map(str::to_owned))
            })
            .filter(|msg| !msg.trim().is_empty());

        SubmissionFailure::ServerError {
            status: response.status,
            detail,
        }
    }

    /// Precondition violations that no retry can fix.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SubmissionFailure::MissingFragment(_)
                | SubmissionFailure::InvalidFragment { .. }
                | SubmissionFailure::PayloadEncoding { .. }
        )
    }

    /// Text shown in the confirm dialog's error area.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionFailure::MissingFragment(_)
            | SubmissionFailure::InvalidFragment { .. }
            | SubmissionFailure::PayloadEncoding { .. } => GENERIC_FAILURE_MESSAGE.to_string(),
            SubmissionFailure::MissingAttachment(slot) => {
                format!("The {slot} document is no longer available. Please upload it again.")
            }
            SubmissionFailure::MissingProof => "CAPTCHA token is missing".to_string(),
            SubmissionFailure::NetworkFailure {
                kind: NetworkFailureKind::CannotConnect,
                endpoint,
                ..
            } => format!(
                "Network Error - Cannot connect to backend server!\n\nServer: {endpoint}\n\nPlease:\n1. Check if backend server is running\n2. Contact backend developer\n3. Try again later"
            ),
            SubmissionFailure::NetworkFailure {
                kind: NetworkFailureKind::TimedOut,
                endpoint,
                ..
            } => format!("Request to {endpoint} timed out. Please try again."),
            SubmissionFailure::NetworkFailure { detail, .. } => {
                if detail.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    detail.clone()
                }
            }
            SubmissionFailure::ServerError { status, detail } => detail
                .clone()
                .unwrap_or_else(|| format!("Unexpected response: {status}")),
        }
    }
}
