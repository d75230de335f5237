//! Typed shapes of the fragments written by each wizard step.
//!
//! Field names follow the step forms. Year and level inputs arrive from the
//! forms as text, so they accept either a JSON number or a numeric string and
//! are held as numbers from then on.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::attachment::{AttachmentMeta, AttachmentSlot};
use crate::declaration::DeclarationState;

/// Step 1: company identity and contact.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyData {
    pub company_name: String,
    pub company_register_number: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub create_year: u16,
    pub company_size: String,
    pub annual_turnover: String,
    pub company_address: String,
    pub location: String,
    #[serde(default)]
    pub website: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalAnswers {
    pub digital_team_or_lead: bool,
    pub digital_path: bool,
    pub digital_transformation_loyality: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceAnswers {
    pub financial_need: bool,
    #[serde(default)]
    pub needed_budget: String,
}

/// Step 2: digital leadership and financing needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalAndFinancial {
    pub digital: DigitalAnswers,
    pub finance: FinanceAnswers,
}

/// Step 3: digital readiness self-assessment.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalReadiness {
    #[serde(default)]
    pub key_challenges: Vec<String>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub digital_level: u8,
    #[serde(default)]
    pub digital_tools: Vec<String>,
    pub company_purpose: String,
}

/// Step 4: legal form, products and export activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyLaw {
    pub business_operations: String,
    pub company_law_type: String,
    pub products: String,
    pub export_activity: bool,
    #[serde(default)]
    pub export_bazaar: Vec<String>,
}

/// Display mirror of the stored attachments. Entries are rebuilt from the
/// attachment store on rehydration and are never read as binaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMirror {
    #[serde(default)]
    pub property_law_certificate: Option<AttachmentMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_certificate: Option<AttachmentMeta>,
    #[serde(default)]
    pub financial_statement: Option<AttachmentMeta>,
}

impl FileMirror {
    pub fn get(&self, slot: AttachmentSlot) -> Option<&AttachmentMeta> {
        match slot {
            AttachmentSlot::PropertyLawCertificate => self.property_law_certificate.as_ref(),
            AttachmentSlot::RegisterCertificate => self.register_certificate.as_ref(),
            AttachmentSlot::FinancialStatement => self.financial_statement.as_ref(),
        }
    }

    pub fn set(&mut self, slot: AttachmentSlot, meta: Option<AttachmentMeta>) {
        let entry = match slot {
            AttachmentSlot::PropertyLawCertificate => &mut self.property_law_certificate,
            AttachmentSlot::RegisterCertificate => &mut self.register_certificate,
            AttachmentSlot::FinancialStatement => &mut self.financial_statement,
        };
        *entry = meta;
    }

    pub fn present_slots(&self) -> Vec<AttachmentSlot> {
        AttachmentSlot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_some())
            .collect()
    }
}

/// Final step: attachment mirror and consent flags, written on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestOfData {
    #[serde(default)]
    pub files: FileMirror,
    #[serde(default)]
    pub declaration: DeclarationState,
}
