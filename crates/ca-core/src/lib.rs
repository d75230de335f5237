//! # ca-core
//!
//! Core domain models and submission rules for the company application wizard.
//!
//! This crate contains pure business logic without any infrastructure dependencies.
//! Storage, CAPTCHA and HTTP access are expressed as ports in [`ports`] and are
//! implemented by `ca-infra`.

// Public module exports
pub mod attachment;
pub mod captcha;
pub mod config;
pub mod declaration;
pub mod fragment;
pub mod ids;
pub mod ports;
pub mod submission;

// Re-export commonly used types at the crate root
pub use attachment::{AttachmentFile, AttachmentMeta, AttachmentPolicy, AttachmentSlot, MimeType};
pub use captcha::CaptchaProof;
pub use config::AppConfig;
pub use declaration::{Declaration, DeclarationState};
pub use fragment::{Fragment, FragmentKey, FragmentSet};
pub use ids::SubmissionId;
pub use submission::{
    CompletenessGate, CompositePayload, GateReport, SubmissionAction, SubmissionEvent,
    SubmissionFailure, SubmissionState, SubmissionStateMachine,
};
