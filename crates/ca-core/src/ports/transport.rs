use async_trait::async_trait;
use thiserror::Error;

use crate::submission::CompositePayload;

const HTTP_CREATED: u16 = 201;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_created(&self) -> bool {
        self.status == HTTP_CREATED
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("cannot connect to {endpoint}: {detail}")]
    Connect { endpoint: String, detail: String },

    #[error("request to {endpoint} timed out: {detail}")]
    Timeout { endpoint: String, detail: String },

    #[error("request to {endpoint} failed: {detail}")]
    Request { endpoint: String, detail: String },
}

/// Multipart POST to the fixed submission endpoint.
///
/// Implementations must not set a content-type header themselves; the
/// multipart boundary is derived by the HTTP stack.
#[async_trait]
pub trait SubmissionTransportPort: Send + Sync {
    fn endpoint(&self) -> &str;

    async fn submit(&self, payload: &CompositePayload) -> Result<TransportResponse, TransportError>;
}
