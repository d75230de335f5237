//! Admission rules checked before a document reaches the attachment store.

use std::collections::BTreeMap;

use super::{AttachmentFile, AttachmentSlot, MimeType};

/// Upper bound on a single document (10 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Why a document was refused. The display text is the slot-scoped field message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    #[error("File size exceeds {} limit", format_limit(.limit))]
    SizeExceeded { limit: u64, actual: u64 },

    #[error("Invalid file type. Only PDF, DOC, DOCX, XLS, XLSX allowed")]
    UnsupportedType { mime: String },
}

/// `10MB` for whole megabytes; smaller limits keep their precision.
fn format_limit(limit: &u64) -> String {
    let limit = *limit;
    if limit >= MIB && limit % MIB == 0 {
        format!("{}MB", limit / MIB)
    } else if limit >= MIB {
        format!("{:.1}MB", limit as f64 / MIB as f64)
    } else if limit >= KIB && limit % KIB == 0 {
        format!("{}KB", limit / KIB)
    } else {
        format!("{limit} bytes")
    }
}

/// Size limit plus the accepted types for each slot.
///
/// Every slot currently accepts the same office document set; the table is
/// per-slot so a slot can be narrowed without touching the validator.
#[derive(Debug, Clone)]
pub struct AttachmentPolicy {
    max_bytes: u64,
    allowed: BTreeMap<AttachmentSlot, Vec<MimeType>>,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl AttachmentPolicy {
    pub fn standard() -> Self {
        let allowed = AttachmentSlot::ALL
            .into_iter()
            .map(|slot| (slot, MimeType::office_documents()))
            .collect();
        Self {
            max_bytes: MAX_ATTACHMENT_BYTES,
            allowed,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_allowed_types(mut self, slot: AttachmentSlot, types: Vec<MimeType>) -> Self {
        self.allowed.insert(slot, types);
        self
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Size is checked before type, so an oversized file of the wrong type
    /// reports the size problem.
    pub fn validate(&self, file: &AttachmentFile, slot: AttachmentSlot) -> Result<(), RejectionReason> {
        let size = file.size();
        if size > self.max_bytes {
            return Err(RejectionReason::SizeExceeded {
                limit: self.max_bytes,
                actual: size,
            });
        }

        let accepted = self
            .allowed
            .get(&slot)
            .is_some_and(|types| types.contains(&file.mime));
        if !accepted {
            return Err(RejectionReason::UnsupportedType {
                mime: file.mime.0.clone(),
            });
        }

        Ok(())
    }
}
