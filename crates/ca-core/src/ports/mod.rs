//! Port interfaces for the application layer
//!
//! Ports define the contract between the submission use cases and the
//! storage, CAPTCHA and HTTP adapters in `ca-infra`. The use cases never see
//! which storage technology backs a port, so every port can be replaced by an
//! in-memory fake in tests.

mod attachment_store;
mod captcha;
pub mod errors;
mod fragment_cache;
mod submission_events;
mod transport;

pub use attachment_store::AttachmentStorePort;
pub use captcha::CaptchaPort;
pub use errors::StorageError;
pub use fragment_cache::FragmentCachePort;
pub use submission_events::SubmissionEventPort;
pub use transport::{SubmissionTransportPort, TransportError, TransportResponse};

#[cfg(test)]
pub mod mocks;
