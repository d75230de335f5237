//! Consent flags the applicant must accept on the final step.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Declaration {
    DataIsReal,
    PermitContact,
    PrivacyAcceptance,
}

impl Declaration {
    pub const ALL: [Declaration; 3] = [
        Declaration::DataIsReal,
        Declaration::PermitContact,
        Declaration::PrivacyAcceptance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Declaration::DataIsReal => "dataIsReal",
            Declaration::PermitContact => "permitContact",
            Declaration::PrivacyAcceptance => "privacyAcceptance",
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown declaration: {0}")]
pub struct UnknownDeclarationError(pub String);

impl FromStr for Declaration {
    type Err = UnknownDeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Declaration::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDeclarationError(s.to_string()))
    }
}

/// The three consent checkboxes. Submission is blocked unless all are true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationState {
    #[serde(default)]
    pub data_is_real: bool,
    #[serde(default)]
    pub permit_contact: bool,
    #[serde(default)]
    pub privacy_acceptance: bool,
}

impl DeclarationState {
    pub fn all_accepted() -> Self {
        Self {
            data_is_real: true,
            permit_contact: true,
            privacy_acceptance: true,
        }
    }

    pub fn get(&self, declaration: Declaration) -> bool {
        match declaration {
            Declaration::DataIsReal => self.data_is_real,
            Declaration::PermitContact => self.permit_contact,
            Declaration::PrivacyAcceptance => self.privacy_acceptance,
        }
    }

    pub fn set(&mut self, declaration: Declaration, accepted: bool) {
        match declaration {
            Declaration::DataIsReal => self.data_is_real = accepted,
            Declaration::PermitContact => self.permit_contact = accepted,
            Declaration::PrivacyAcceptance => self.privacy_acceptance = accepted,
        }
    }

    pub fn is_complete(&self) -> bool {
        Declaration::ALL.into_iter().all(|d| self.get(d))
    }

    pub fn missing(&self) -> Vec<Declaration> {
        Declaration::ALL
            .into_iter()
            .filter(|d| !self.get(*d))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_only_when_all_three_accepted() {
        let mut state = DeclarationState::default();
        assert!(!state.is_complete());
        assert_eq!(state.missing().len(), 3);

        state.set(Declaration::DataIsReal, true);
        state.set(Declaration::PermitContact, true);
        assert_eq!(state.missing(), vec![Declaration::PrivacyAcceptance]);

        state.set(Declaration::PrivacyAcceptance, true);
        assert!(state.is_complete());
        assert_eq!(state, DeclarationState::all_accepted());
    }

    #[test]
    fn serializes_with_form_field_names() {
        let json = serde_json::to_value(DeclarationState::all_accepted()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"dataIsReal": true, "permitContact": true, "privacyAcceptance": true})
        );
    }
}
