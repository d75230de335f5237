//! Normalized `companyRequest` document accepted by the registration service.
//!
//! Field order is fixed by the struct layout, so two requests built from the
//! same fragments serialize to identical bytes.

use serde::{Deserialize, Serialize};

use crate::declaration::DeclarationState;
use crate::fragment::FragmentSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRequest {
    pub company_data: CompanySection,
    pub declaration_consent: DeclarationState,
    pub digital_leadership: DigitalLeadershipSection,
    pub financial_needing: FinancialNeedingSection,
    pub digital_readiness: DigitalReadinessSection,
    pub property_law: PropertyLawSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySection {
    pub company_name: String,
    pub company_register_number: String,
    pub create_year: u16,
    pub worker_count: String,
    pub annual_turnover: String,
    pub address: String,
    pub city_and_region: String,
    pub website: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalLeadershipSection {
    pub digital_team_or_lead: bool,
    pub digital_path: bool,
    pub digital_transformation_loyality: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialNeedingSection {
    pub financial_need: bool,
    pub needed_budget: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalReadinessSection {
    pub key_challenges: Vec<String>,
    pub digital_level: u8,
    pub digital_tools: Vec<String>,
    pub company_purpose: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyLawSection {
    pub business_operations: String,
    pub company_law_type: String,
    pub products: String,
    pub export_activity: bool,
    pub export_bazaar: Vec<String>,
}

impl From<&FragmentSet> for CompanyRequest {
    fn from(set: &FragmentSet) -> Self {
        let company = &set.company_data;
        let digital = &set.digital_and_financial.digital;
        let finance = &set.digital_and_financial.finance;
        let readiness = &set.digital_readiness;
        let law = &set.property_law;

        CompanyRequest {
            company_data: CompanySection {
                company_name: company.company_name.clone(),
                company_register_number: company.company_register_number.clone(),
                create_year: company.create_year,
                worker_count: company.company_size.clone(),
                annual_turnover: company.annual_turnover.clone(),
                address: company.company_address.clone(),
                city_and_region: company.location.clone(),
                website: company.website.clone(),
                contact_name: company.contact_person.clone(),
                contact_email: company.email.clone(),
                contact_phone: company.phone.clone(),
            },
            declaration_consent: set.rest_of_data.declaration,
            digital_leadership: DigitalLeadershipSection {
                digital_team_or_lead: digital.digital_team_or_lead,
                digital_path: digital.digital_path,
                digital_transformation_loyality: digital.digital_transformation_loyality,
            },
            financial_needing: FinancialNeedingSection {
                financial_need: finance.financial_need,
                needed_budget: finance.needed_budget.clone(),
            },
            digital_readiness: DigitalReadinessSection {
                key_challenges: readiness.key_challenges.clone(),
                digital_level: readiness.digital_level,
                digital_tools: readiness.digital_tools.clone(),
                company_purpose: readiness.company_purpose.clone(),
            },
            property_law: PropertyLawSection {
                business_operations: law.business_operations.clone(),
                company_law_type: law.company_law_type.clone(),
                products: law.products.clone(),
                export_activity: law.export_activity,
                export_bazaar: law.export_bazaar.clone(),
            },
        }
    }
}
