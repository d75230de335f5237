use std::fmt;

use ca_core::attachment::AttachmentSlot;
use ca_core::declaration::Declaration;
use serde::Serialize;

pub const REQUIRED_MESSAGE: &str = "Required";
pub const FAILED_TO_SAVE_MESSAGE: &str = "Failed to save file. Please try again.";
pub const FAILED_TO_REMOVE_MESSAGE: &str = "Failed to remove file. Please try again.";
pub const FAILED_TO_PERSIST_MESSAGE: &str = "Failed to save your answer. Please try again.";

/// Input on the final step that can carry its own error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Slot(AttachmentSlot),
    Declaration(Declaration),
    Captcha,
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Slot(slot) => write!(f, "{slot}"),
            FieldKey::Declaration(declaration) => write!(f, "{declaration}"),
            FieldKey::Captcha => f.write_str("recaptcha"),
        }
    }
}
