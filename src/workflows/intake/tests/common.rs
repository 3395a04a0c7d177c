use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::workflows::intake::builder::AggregateBuilder;
use crate::workflows::intake::derivation::DerivationEngine;
use crate::workflows::intake::domain::Address;
use crate::workflows::intake::payload::{
    ApplicationPayload, BorrowerPayload, DeclarationPayload, EmploymentPayload,
    IncomeSourcePayload, LiabilityPayload, PropertyPayload, ReoPropertyPayload, ResidencePayload,
};
use crate::workflows::intake::repository::MemoryRepository;
use crate::workflows::intake::service::LoanIntakeService;

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

pub(super) fn engine() -> DerivationEngine {
    DerivationEngine::new(as_of())
}

pub(super) fn builder() -> AggregateBuilder {
    AggregateBuilder::new(engine())
}

pub(super) fn build_service() -> (LoanIntakeService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = LoanIntakeService::with_engine(repository.clone(), engine());
    (service, repository)
}

pub(super) fn address(line: &str) -> Address {
    Address {
        address_line: Some(line.to_string()),
        city: Some("Des Moines".to_string()),
        state: Some("IA".to_string()),
        zip_code: Some("50309".to_string()),
    }
}

pub(super) fn property_payload() -> PropertyPayload {
    PropertyPayload {
        address: address("742 Maple Ave"),
        county: Some("Polk".to_string()),
        property_type: "PrimaryResidence".to_string(),
        property_value: dec!(300000),
        construction_type: Some("SiteBuilt".to_string()),
        year_built: Some(1998),
        units_count: 1,
    }
}

pub(super) fn present_employment() -> EmploymentPayload {
    EmploymentPayload {
        sequence_number: Some(1),
        employer_name: "Prairie Analytics".to_string(),
        position: Some("Data Engineer".to_string()),
        employer_phone: Some("515-555-0134".to_string()),
        employer_address: address("100 Grand Ave"),
        start_date: NaiveDate::from_ymd_opt(2021, 3, 1).expect("valid date"),
        end_date: None,
        monthly_income: dec!(5000),
        employment_status: "Present".to_string(),
        self_employed: Some(false),
    }
}

pub(super) fn prior_employment() -> EmploymentPayload {
    EmploymentPayload {
        sequence_number: Some(2),
        employer_name: "Cedar Logistics".to_string(),
        position: Some("Analyst".to_string()),
        employer_phone: None,
        employer_address: address("8 Dock St"),
        start_date: NaiveDate::from_ymd_opt(2018, 6, 1).expect("valid date"),
        end_date: Some(NaiveDate::from_ymd_opt(2021, 2, 15).expect("valid date")),
        monthly_income: dec!(3800),
        employment_status: "Prior".to_string(),
        self_employed: Some(false),
    }
}

pub(super) fn income_source() -> IncomeSourcePayload {
    IncomeSourcePayload {
        income_type: "SocialSecurity".to_string(),
        monthly_amount: dec!(800),
        description: None,
    }
}

pub(super) fn current_rental_residence() -> ResidencePayload {
    ResidencePayload {
        address: address("12 Walnut St"),
        residency_type: "Current".to_string(),
        residency_basis: "Rent".to_string(),
        duration_months: Some(30),
        monthly_rent: Some(dec!(1180)),
    }
}

pub(super) fn prior_owned_residence() -> ResidencePayload {
    ResidencePayload {
        address: address("9 Birch Ln"),
        residency_type: "Prior".to_string(),
        residency_basis: "Own".to_string(),
        duration_months: Some(48),
        monthly_rent: None,
    }
}

pub(super) fn reo_property() -> ReoPropertyPayload {
    ReoPropertyPayload {
        sequence_number: Some(1),
        address: address("300 River Rd"),
        property_type: Some("SingleFamily".to_string()),
        property_value: Some(dec!(185000)),
        monthly_rental_income: Some(dec!(1500)),
        monthly_payment: Some(dec!(900)),
        unpaid_balance: Some(dec!(92000)),
    }
}

pub(super) fn clean_declaration() -> DeclarationPayload {
    DeclarationPayload::default()
}

pub(super) fn credit_card_liability() -> LiabilityPayload {
    LiabilityPayload {
        account_number: Some("1234567890".to_string()),
        creditor_name: "Hawkeye Bank".to_string(),
        liability_type: "CreditCard".to_string(),
        monthly_payment: dec!(250),
        unpaid_balance: dec!(3000),
        payoff_status: Some(false),
        to_be_paid_off: Some(false),
    }
}

pub(super) fn auto_loan_liability() -> LiabilityPayload {
    LiabilityPayload {
        account_number: Some("AL-55".to_string()),
        creditor_name: "Motor Credit".to_string(),
        liability_type: "AutoLoan".to_string(),
        monthly_payment: dec!(310),
        unpaid_balance: dec!(11200),
        payoff_status: Some(false),
        to_be_paid_off: Some(true),
    }
}

pub(super) fn primary_borrower() -> BorrowerPayload {
    BorrowerPayload {
        sequence_number: Some(1),
        first_name: Some("Ada".to_string()),
        last_name: Some("Hollis".to_string()),
        ssn: Some("123-44-5555".to_string()),
        birth_date: NaiveDate::from_ymd_opt(1988, 9, 4),
        marital_status: Some("Married".to_string()),
        email: Some("ada.hollis@example.com".to_string()),
        phone: Some("515-555-0187".to_string()),
        citizenship_type: Some("USCitizen".to_string()),
        dependents_count: Some(2),
        current_address: address("12 Walnut St"),
        employment_history: vec![present_employment(), prior_employment()],
        income_sources: vec![income_source()],
        residences: vec![current_rental_residence(), prior_owned_residence()],
        reo_properties: vec![reo_property()],
        declaration: Some(clean_declaration()),
    }
}

pub(super) fn full_payload() -> ApplicationPayload {
    ApplicationPayload {
        application_number: Some("APP-2025-0042".to_string()),
        loan_purpose: "Purchase".to_string(),
        loan_type: "Conventional".to_string(),
        loan_amount: dec!(240000),
        property_value: dec!(300000),
        status: None,
        crm_contact_id: None,
        property: Some(property_payload()),
        borrowers: vec![primary_borrower()],
        liabilities: vec![credit_card_liability(), auto_loan_liability()],
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
