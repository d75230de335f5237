//! Business logic use cases
//!
//! Steps one to four only ever write whole fragments ([`RecordFragment`]).
//! The final step owns attachments and declarations ([`FinalStepForm`]) and
//! hands off to the [`SubmissionOrchestrator`] once the gate opens.

pub mod discard_application;
pub mod final_step;
pub mod record_fragment;
pub mod submission;

pub use discard_application::DiscardApplication;
pub use final_step::{AttachError, FieldKey, FinalStepForm, FinalStepSnapshot};
pub use record_fragment::{RecordFragment, RecordFragmentError};
pub use submission::{
    AssembleError, CleanupCoordinator, CleanupReport, SubmissionAssembler, SubmissionError,
    SubmissionOrchestrator,
};
