//! Submission domain: gate, request schema, payload, failures and the state machine.

mod failure;
mod gate;
mod payload;
mod request;
mod state_machine;

pub use failure::{NetworkFailureKind, SubmissionFailure};
pub use gate::{CompletenessGate, GateReport};
pub use payload::{
    AttachmentPart, CompositePayload, COMPANY_REQUEST_CONTENT_TYPE, COMPANY_REQUEST_PART,
    RECAPTCHA_TOKEN_PART,
};
pub use request::{
    CompanyRequest, CompanySection, DigitalLeadershipSection, DigitalReadinessSection,
    FinancialNeedingSection, PropertyLawSection,
};
pub use state_machine::{
    SubmissionAction, SubmissionEvent, SubmissionState, SubmissionStateMachine,
    MAX_SUBMISSION_ATTEMPTS,
};
