//! Raw submission payload as it arrives over the wire.
//!
//! Enum-valued fields stay strings here; the builder parses them into the
//! closed domain enums and reports unrecognized values as structural
//! violations instead of deserialization failures.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::Address;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
    #[serde(default)]
    pub application_number: Option<String>,
    pub loan_purpose: String,
    pub loan_type: String,
    pub loan_amount: Decimal,
    pub property_value: Decimal,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub crm_contact_id: Option<String>,
    #[serde(default)]
    pub property: Option<PropertyPayload>,
    #[serde(default)]
    pub borrowers: Vec<BorrowerPayload>,
    #[serde(default)]
    pub liabilities: Vec<LiabilityPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPayload {
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub county: Option<String>,
    pub property_type: String,
    pub property_value: Decimal,
    #[serde(default)]
    pub construction_type: Option<String>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default = "default_units_count")]
    pub units_count: u32,
}

fn default_units_count() -> u32 {
    1
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowerPayload {
    #[serde(default)]
    pub sequence_number: Option<u32>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub ssn: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub citizenship_type: Option<String>,
    #[serde(default)]
    pub dependents_count: Option<u32>,
    #[serde(default)]
    pub current_address: Address,
    #[serde(default)]
    pub employment_history: Vec<EmploymentPayload>,
    #[serde(default)]
    pub income_sources: Vec<IncomeSourcePayload>,
    #[serde(default)]
    pub residences: Vec<ResidencePayload>,
    #[serde(default)]
    pub reo_properties: Vec<ReoPropertyPayload>,
    #[serde(default)]
    pub declaration: Option<DeclarationPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentPayload {
    #[serde(default)]
    pub sequence_number: Option<u32>,
    pub employer_name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub employer_phone: Option<String>,
    #[serde(default)]
    pub employer_address: Address,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub monthly_income: Decimal,
    pub employment_status: String,
    #[serde(default)]
    pub self_employed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSourcePayload {
    pub income_type: String,
    pub monthly_amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidencePayload {
    #[serde(default)]
    pub address: Address,
    pub residency_type: String,
    pub residency_basis: String,
    #[serde(default)]
    pub duration_months: Option<u32>,
    #[serde(default)]
    pub monthly_rent: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReoPropertyPayload {
    #[serde(default)]
    pub sequence_number: Option<u32>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub property_value: Option<Decimal>,
    #[serde(default)]
    pub monthly_rental_income: Option<Decimal>,
    #[serde(default)]
    pub monthly_payment: Option<Decimal>,
    #[serde(default)]
    pub unpaid_balance: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiabilityPayload {
    #[serde(default)]
    pub account_number: Option<String>,
    pub creditor_name: String,
    pub liability_type: String,
    pub monthly_payment: Decimal,
    pub unpaid_balance: Decimal,
    #[serde(default)]
    pub payoff_status: Option<bool>,
    #[serde(default)]
    pub to_be_paid_off: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationPayload {
    #[serde(default)]
    pub outstanding_judgments: bool,
    #[serde(default)]
    pub bankruptcy: bool,
    #[serde(default)]
    pub foreclosure: bool,
    #[serde(default)]
    pub lawsuit: bool,
    #[serde(default)]
    pub loan_foreclosure: bool,
    #[serde(default)]
    pub presently_delinquent: bool,
    #[serde(default)]
    pub alimony_child_support: bool,
    #[serde(default)]
    pub borrowing_down_payment: bool,
    #[serde(default)]
    pub comaker_endorser: bool,
    #[serde(default = "default_true")]
    pub us_citizen: bool,
    #[serde(default)]
    pub permanent_resident: bool,
    #[serde(default = "default_true")]
    pub intent_to_occupy: bool,
    #[serde(default)]
    pub down_payment_gift: bool,
    #[serde(default)]
    pub gift_source: Option<String>,
    #[serde(default)]
    pub gift_amount: Option<Decimal>,
    #[serde(default)]
    pub co_signer_obligation: bool,
    #[serde(default)]
    pub pending_credit_inquiry: bool,
    #[serde(default)]
    pub credit_explanation: Option<String>,
    #[serde(default)]
    pub employment_gap_explanation: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for DeclarationPayload {
    fn default() -> Self {
        Self {
            outstanding_judgments: false,
            bankruptcy: false,
            foreclosure: false,
            lawsuit: false,
            loan_foreclosure: false,
            presently_delinquent: false,
            alimony_child_support: false,
            borrowing_down_payment: false,
            comaker_endorser: false,
            us_citizen: true,
            permanent_resident: false,
            intent_to_occupy: true,
            down_payment_gift: false,
            gift_source: None,
            gift_amount: None,
            co_signer_obligation: false,
            pending_credit_inquiry: false,
            credit_explanation: None,
            employment_gap_explanation: None,
        }
    }
}
