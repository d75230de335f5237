use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Fixed logical upload position on the final wizard step.
///
/// The serialized name doubles as the key in the attachment store and as the
/// multipart part name, so it must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentSlot {
    PropertyLawCertificate,
    RegisterCertificate,
    FinancialStatement,
}

impl AttachmentSlot {
    pub const ALL: [AttachmentSlot; 3] = [
        AttachmentSlot::PropertyLawCertificate,
        AttachmentSlot::RegisterCertificate,
        AttachmentSlot::FinancialStatement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentSlot::PropertyLawCertificate => "propertyLawCertificate",
            AttachmentSlot::RegisterCertificate => "registerCertificate",
            AttachmentSlot::FinancialStatement => "financialStatement",
        }
    }
}

impl fmt::Display for AttachmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attachment slot: {0}")]
pub struct UnknownSlotError(pub String);

impl FromStr for AttachmentSlot {
    type Err = UnknownSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttachmentSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| UnknownSlotError(s.to_string()))
    }
}
