use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Identifier of one wizard step's fragment in the fragment cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FragmentKey {
    CompanyData,
    DigitalAndFinancial,
    DigitalReadiness,
    PropertyLaw,
    RestOfData,
}

impl FragmentKey {
    /// Every fragment the submission reads, in read order.
    pub const ALL: [FragmentKey; 5] = [
        FragmentKey::CompanyData,
        FragmentKey::DigitalAndFinancial,
        FragmentKey::DigitalReadiness,
        FragmentKey::PropertyLaw,
        FragmentKey::RestOfData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FragmentKey::CompanyData => "companyData",
            FragmentKey::DigitalAndFinancial => "digitalAndFinancial",
            FragmentKey::DigitalReadiness => "digitalReadiness",
            FragmentKey::PropertyLaw => "propertyLaw",
            FragmentKey::RestOfData => "restOfData",
        }
    }
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fragment key: {0}")]
pub struct UnknownFragmentKeyError(pub String);

impl FromStr for FragmentKey {
    type Err = UnknownFragmentKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FragmentKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownFragmentKeyError(s.to_string()))
    }
}
