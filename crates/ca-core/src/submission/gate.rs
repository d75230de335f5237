//! Completeness gate: derived permission to submit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::attachment::AttachmentSlot;
use crate::declaration::{Declaration, DeclarationState};

/// What is still missing. Empty report means the gate is open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    pub missing_slots: Vec<AttachmentSlot>,
    pub missing_declarations: Vec<Declaration>,
    pub proof_missing: bool,
}

impl GateReport {
    pub fn is_complete(&self) -> bool {
        self.missing_slots.is_empty() && self.missing_declarations.is_empty() && !self.proof_missing
    }
}

#[derive(Debug, Clone)]
pub struct CompletenessGate {
    required_slots: BTreeSet<AttachmentSlot>,
}

impl Default for CompletenessGate {
    fn default() -> Self {
        Self::standard()
    }
}

impl CompletenessGate {
    pub fn new(required_slots: impl IntoIterator<Item = AttachmentSlot>) -> Self {
        Self {
            required_slots: required_slots.into_iter().collect(),
        }
    }

    /// Property-law certificate and financial statement are mandatory; the
    /// register certificate is sent when present but never required.
    pub fn standard() -> Self {
        Self::new([
            AttachmentSlot::PropertyLawCertificate,
            AttachmentSlot::FinancialStatement,
        ])
    }

    pub fn required_slots(&self) -> &BTreeSet<AttachmentSlot> {
        &self.required_slots
    }

    pub fn is_required(&self, slot: AttachmentSlot) -> bool {
        self.required_slots.contains(&slot)
    }

    pub fn evaluate<I>(
        &self,
        present_slots: I,
        declaration: &DeclarationState,
        proof_present: bool,
    ) -> GateReport
    where
        I: IntoIterator<Item = AttachmentSlot>,
    {
        let present: BTreeSet<AttachmentSlot> = present_slots.into_iter().collect();
        let report = GateReport {
            missing_slots: self
                .required_slots
                .iter()
                .filter(|slot| !present.contains(slot))
                .copied()
                .collect(),
            missing_declarations: declaration.missing(),
            proof_missing: !proof_present,
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(complete = report.is_complete(), ?report, "completeness gate evaluated");

        report
    }
}
