//! Attachment domain: upload slots, file values and the admission policy.

mod file;
mod mime;
mod policy;
mod slot;

pub use file::{AttachmentFile, AttachmentMeta};
pub use mime::MimeType;
pub use policy::{AttachmentPolicy, RejectionReason, MAX_ATTACHMENT_BYTES};
pub use slot::{AttachmentSlot, UnknownSlotError};
