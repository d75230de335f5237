//! Composite multipart payload: one JSON part, one text part, and one binary
//! part per present attachment.

use bytes::Bytes;

use crate::attachment::{AttachmentFile, AttachmentSlot};
use crate::captcha::CaptchaProof;
use crate::fragment::FragmentSet;

use super::request::CompanyRequest;

pub const COMPANY_REQUEST_PART: &str = "companyRequest";
pub const COMPANY_REQUEST_CONTENT_TYPE: &str = "application/json";
pub const RECAPTCHA_TOKEN_PART: &str = "recaptchaToken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    pub slot: AttachmentSlot,
    pub file: AttachmentFile,
}

impl AttachmentPart {
    /// Part names are the slot identifiers.
    pub fn part_name(&self) -> &'static str {
        self.slot.as_str()
    }
}

/// Built fresh for every attempt and dropped once the attempt resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositePayload {
    company_request: Bytes,
    recaptcha_token: CaptchaProof,
    attachments: Vec<AttachmentPart>,
}

impl CompositePayload {
    /// Attachments are ordered by slot so assembly is deterministic.
    pub fn assemble(
        fragments: &FragmentSet,
        mut attachments: Vec<AttachmentPart>,
        proof: CaptchaProof,
    ) -> Result<Self, serde_json::Error> {
        let request = CompanyRequest::from(fragments);
        let company_request = Bytes::from(serde_json::to_vec(&request)?);
        attachments.sort_by_key(|part| part.slot);
        attachments.dedup_by_key(|part| part.slot);

        Ok(Self {
            company_request,
            recaptcha_token: proof,
            attachments,
        })
    }

    pub fn company_request_json(&self) -> &Bytes {
        &self.company_request
    }

    pub fn recaptcha_token(&self) -> &CaptchaProof {
        &self.recaptcha_token
    }

    pub fn attachments(&self) -> &[AttachmentPart] {
        &self.attachments
    }

    /// Every part name in dispatch order.
    pub fn part_names(&self) -> Vec<&'static str> {
        let mut names = vec![COMPANY_REQUEST_PART, RECAPTCHA_TOKEN_PART];
        names.extend(self.attachments.iter().map(AttachmentPart::part_name));
        names
    }
}
