//! Wizard fragments: one typed record per step, stored as text under its key.

mod key;
mod model;

pub use key::{FragmentKey, UnknownFragmentKeyError};
pub use model::{
    CompanyData, DigitalAndFinancial, DigitalAnswers, DigitalReadiness, FileMirror,
    FinanceAnswers, PropertyLaw, RestOfData,
};

#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    #[error("fragment `{key}` does not match its step shape: {source}")]
    Shape {
        key: FragmentKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("fragment `{key}` could not be serialized: {source}")]
    Serialize {
        key: FragmentKey,
        #[source]
        source: serde_json::Error,
    },
}

/// Tagged union of every step's output. A fragment is always written whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    CompanyData(CompanyData),
    DigitalAndFinancial(DigitalAndFinancial),
    DigitalReadiness(DigitalReadiness),
    PropertyLaw(PropertyLaw),
    RestOfData(RestOfData),
}

impl Fragment {
    pub fn key(&self) -> FragmentKey {
        match self {
            Fragment::CompanyData(_) => FragmentKey::CompanyData,
            Fragment::DigitalAndFinancial(_) => FragmentKey::DigitalAndFinancial,
            Fragment::DigitalReadiness(_) => FragmentKey::DigitalReadiness,
            Fragment::PropertyLaw(_) => FragmentKey::PropertyLaw,
            Fragment::RestOfData(_) => FragmentKey::RestOfData,
        }
    }

    /// Parses stored text into the shape owned by `key`.
    pub fn parse(key: FragmentKey, raw: &str) -> Result<Self, FragmentError> {
        let shape = |source| FragmentError::Shape { key, source };
        let fragment = match key {
            FragmentKey::CompanyData => Fragment::CompanyData(serde_json::from_str(raw).map_err(shape)?),
            FragmentKey::DigitalAndFinancial => {
                Fragment::DigitalAndFinancial(serde_json::from_str(raw).map_err(shape)?)
            }
            FragmentKey::DigitalReadiness => {
                Fragment::DigitalReadiness(serde_json::from_str(raw).map_err(shape)?)
            }
            FragmentKey::PropertyLaw => Fragment::PropertyLaw(serde_json::from_str(raw).map_err(shape)?),
            FragmentKey::RestOfData => Fragment::RestOfData(serde_json::from_str(raw).map_err(shape)?),
        };
        Ok(fragment)
    }

    pub fn to_json(&self) -> Result<String, FragmentError> {
        let key = self.key();
        let result = match self {
            Fragment::CompanyData(v) => serde_json::to_string(v),
            Fragment::DigitalAndFinancial(v) => serde_json::to_string(v),
            Fragment::DigitalReadiness(v) => serde_json::to_string(v),
            Fragment::PropertyLaw(v) => serde_json::to_string(v),
            Fragment::RestOfData(v) => serde_json::to_string(v),
        };
        result.map_err(|source| FragmentError::Serialize { key, source })
    }
}

/// All five fragments a submission needs, read in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSet {
    pub company_data: CompanyData,
    pub digital_and_financial: DigitalAndFinancial,
    pub digital_readiness: DigitalReadiness,
    pub property_law: PropertyLaw,
    pub rest_of_data: RestOfData,
}

/// Collects parsed fragments; reports the first key still missing.
#[derive(Debug, Default)]
pub struct FragmentSetBuilder {
    company_data: Option<CompanyData>,
    digital_and_financial: Option<DigitalAndFinancial>,
    digital_readiness: Option<DigitalReadiness>,
    property_law: Option<PropertyLaw>,
    rest_of_data: Option<RestOfData>,
}

impl FragmentSetBuilder {
    pub fn insert(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::CompanyData(v) => self.company_data = Some(v),
            Fragment::DigitalAndFinancial(v) => self.digital_and_financial = Some(v),
            Fragment::DigitalReadiness(v) => self.digital_readiness = Some(v),
            Fragment::PropertyLaw(v) => self.property_law = Some(v),
            Fragment::RestOfData(v) => self.rest_of_data = Some(v),
        }
    }

    pub fn build(self) -> Result<FragmentSet, FragmentKey> {
        Ok(FragmentSet {
            company_data: self.company_data.ok_or(FragmentKey::CompanyData)?,
            digital_and_financial: self
                .digital_and_financial
                .ok_or(FragmentKey::DigitalAndFinancial)?,
            digital_readiness: self.digital_readiness.ok_or(FragmentKey::DigitalReadiness)?,
            property_law: self.property_law.ok_or(FragmentKey::PropertyLaw)?,
            rest_of_data: self.rest_of_data.ok_or(FragmentKey::RestOfData)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dispatches_on_key() {
        let raw = r#"{"businessOperations":"retail","companyLawType":"LLC","products":"tea","exportActivity":false}"#;
        let fragment = Fragment::parse(FragmentKey::PropertyLaw, raw).unwrap();
        assert_eq!(fragment.key(), FragmentKey::PropertyLaw);

        let err = Fragment::parse(FragmentKey::CompanyData, raw).unwrap_err();
        assert!(matches!(err, FragmentError::Shape { key: FragmentKey::CompanyData, .. }));
    }

    #[test]
    fn builder_reports_first_missing_key() {
        let mut builder = FragmentSetBuilder::default();
        builder.insert(Fragment::RestOfData(RestOfData::default()));
        assert_eq!(builder.build().unwrap_err(), FragmentKey::CompanyData);
    }
}
