//! Final wizard step: documents, consent flags and the completeness gate.

mod field;
mod form;

pub use field::{FieldKey, FAILED_TO_SAVE_MESSAGE, REQUIRED_MESSAGE};
pub use form::{AttachError, FinalStepForm, FinalStepSnapshot};
