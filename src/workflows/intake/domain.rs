use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier wrapper for stored applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Borrower identifier, unique within one aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorrowerId(pub u64);

/// Identifier for child records (employment, residences, liabilities, ...),
/// unique within one aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

/// Raised when a wire value does not name a member of a closed enum set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind} '{value}'")]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! closed_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = EnumParseError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok($name::$variant),)+
                    other => Err(EnumParseError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

closed_enum!(LoanPurpose, "loan purpose", {
    Purchase => "Purchase",
    Refinance => "Refinance",
    Construction => "Construction",
    CashOutRefinance => "CashOutRefinance",
    HomeImprovement => "HomeImprovement",
});

closed_enum!(LoanType, "loan type", {
    Conventional => "Conventional",
    Fha => "FHA",
    Va => "VA",
    Usda => "USDA",
    Jumbo => "Jumbo",
});

closed_enum!(ApplicationStatus, "application status", {
    Draft => "Draft",
    Submitted => "Submitted",
    Processing => "Processing",
    Approved => "Approved",
    Denied => "Denied",
});

closed_enum!(PropertyType, "property type", {
    PrimaryResidence => "PrimaryResidence",
    SecondHome => "SecondHome",
    Investment => "Investment",
});

closed_enum!(EmploymentStatus, "employment status", {
    Present => "Present",
    Prior => "Prior",
});

closed_enum!(IncomeType, "income type", {
    SocialSecurity => "SocialSecurity",
    Pension => "Pension",
    Disability => "Disability",
    Unemployment => "Unemployment",
    ChildSupport => "ChildSupport",
    Alimony => "Alimony",
    Investment => "Investment",
    Rental => "Rental",
    Other => "Other",
});

closed_enum!(ResidencyType, "residency type", {
    Current => "Current",
    Prior => "Prior",
});

closed_enum!(ResidencyBasis, "residency basis", {
    Own => "Own",
    Rent => "Rent",
    LivingRentFree => "LivingRentFree",
});

closed_enum!(LiabilityType, "liability type", {
    MortgageLoan => "MortgageLoan",
    Revolving => "Revolving",
    Installment => "Installment",
    StudentLoan => "StudentLoan",
    AutoLoan => "AutoLoan",
    CreditCard => "CreditCard",
    Other => "Other",
});

impl ApplicationStatus {
    /// Workflow transitions the surrounding system is allowed to request.
    /// The core stores any status; callers gate changes through this check.
    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Draft, ApplicationStatus::Submitted)
                | (ApplicationStatus::Submitted, ApplicationStatus::Processing)
                | (ApplicationStatus::Processing, ApplicationStatus::Approved)
                | (ApplicationStatus::Processing, ApplicationStatus::Denied)
        )
    }
}

/// Risk bands reported alongside the declaration risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very High",
        }
    }
}

/// Civil address shared by properties, residences, employers, and REO records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

impl Address {
    /// Single-line rendering: comma-joined street/city/state, space-joined
    /// zip. Absent street line means no renderable address.
    pub fn full(&self) -> Option<String> {
        let line = self.address_line.as_deref()?;
        let mut full = String::from(line);
        if let Some(city) = self.city.as_deref() {
            full.push_str(", ");
            full.push_str(city);
        }
        if let Some(state) = self.state.as_deref() {
            full.push_str(", ");
            full.push_str(state);
        }
        if let Some(zip) = self.zip_code.as_deref() {
            full.push(' ');
            full.push_str(zip);
        }
        Some(full)
    }
}

/// Aggregate root: the application and every owned child entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplicationAggregate {
    pub application: LoanApplication,
    pub property: Option<Property>,
    pub borrowers: Vec<Borrower>,
    pub liabilities: Vec<Liability>,
}

impl LoanApplicationAggregate {
    pub fn borrower(&self, id: BorrowerId) -> Option<&Borrower> {
        self.borrowers.iter().find(|borrower| borrower.id == id)
    }

    pub fn borrower_mut(&mut self, id: BorrowerId) -> Option<&mut Borrower> {
        self.borrowers.iter_mut().find(|borrower| borrower.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: ApplicationId,
    pub application_number: String,
    pub loan_purpose: LoanPurpose,
    pub loan_type: LoanType,
    pub loan_amount: Decimal,
    pub property_value: Decimal,
    pub status: ApplicationStatus,
    pub crm_contact_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub computed: ApplicationComputed,
}

/// Application-level figures recomputed from the full aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationComputed {
    pub loan_to_value_percent: Decimal,
    pub total_monthly_income: Decimal,
    pub total_monthly_debt: Decimal,
    pub debt_to_income_ratio: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: RecordId,
    pub application_id: ApplicationId,
    pub address: Address,
    pub county: Option<String>,
    pub property_type: PropertyType,
    pub property_value: Decimal,
    pub construction_type: Option<String>,
    pub year_built: Option<i32>,
    pub units_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Borrower {
    pub id: BorrowerId,
    pub application_id: ApplicationId,
    pub sequence_number: u32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub ssn: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub marital_status: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub citizenship_type: Option<String>,
    pub dependents_count: u32,
    pub current_address: Address,
    pub employment_history: Vec<Employment>,
    pub income_sources: Vec<IncomeSource>,
    pub residences: Vec<Residence>,
    pub reo_properties: Vec<ReoProperty>,
    pub declaration: Option<Declaration>,
    pub computed: BorrowerComputed,
}

impl Borrower {
    /// A borrower counts as identified once first name, last name, and
    /// tax-id are all present and non-blank.
    pub fn has_complete_identity(&self) -> bool {
        let filled = |field: &Option<String>| {
            field
                .as_deref()
                .map(|value| !value.trim().is_empty())
                .unwrap_or(false)
        };
        filled(&self.first_name) && filled(&self.last_name) && filled(&self.ssn)
    }
}

/// Borrower rollups recomputed from the owned child records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowerComputed {
    pub full_current_address: Option<String>,
    pub total_monthly_employment_income: Decimal,
    pub total_annual_employment_income: Decimal,
    pub total_monthly_other_income: Decimal,
    pub total_monthly_housing_cost: Decimal,
    pub total_residence_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employment {
    pub id: RecordId,
    pub borrower_id: BorrowerId,
    pub sequence_number: u32,
    pub employer_name: String,
    pub position: Option<String>,
    pub employer_phone: Option<String>,
    pub employer_address: Address,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub monthly_income: Decimal,
    pub status: EmploymentStatus,
    pub self_employed: bool,
    pub computed: EmploymentComputed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentComputed {
    pub duration_months: i32,
    pub annual_income: Decimal,
    pub full_employer_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSource {
    pub id: RecordId,
    pub borrower_id: BorrowerId,
    pub income_type: IncomeType,
    pub monthly_amount: Decimal,
    pub description: Option<String>,
    pub computed: IncomeSourceComputed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSourceComputed {
    pub annual_amount: Decimal,
    pub government_benefit: bool,
    pub investment_income: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Residence {
    pub id: RecordId,
    pub borrower_id: BorrowerId,
    pub address: Address,
    pub residency_type: ResidencyType,
    pub residency_basis: ResidencyBasis,
    pub duration_months: Option<u32>,
    pub monthly_rent: Decimal,
    pub computed: ResidenceComputed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidenceComputed {
    pub full_address: Option<String>,
    pub current_residence: bool,
    pub rental: bool,
    pub annual_housing_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReoProperty {
    pub id: RecordId,
    pub borrower_id: BorrowerId,
    pub sequence_number: u32,
    pub address: Address,
    pub property_type: Option<String>,
    pub property_value: Option<Decimal>,
    pub monthly_rental_income: Option<Decimal>,
    pub monthly_payment: Option<Decimal>,
    pub unpaid_balance: Option<Decimal>,
    pub computed: ReoComputed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReoComputed {
    pub full_address: Option<String>,
    pub net_monthly_income: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liability {
    pub id: RecordId,
    pub application_id: ApplicationId,
    pub account_number: Option<String>,
    pub creditor_name: String,
    pub liability_type: LiabilityType,
    pub monthly_payment: Decimal,
    pub unpaid_balance: Decimal,
    pub payoff_status: bool,
    pub to_be_paid_off: bool,
    pub computed: LiabilityComputed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiabilityComputed {
    pub masked_account_number: Option<String>,
    pub revolving: bool,
    pub mortgage: bool,
    pub consumer_debt: bool,
    pub include_in_dti: bool,
    pub total_liability_impact: Decimal,
    pub payoff_priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub id: RecordId,
    pub borrower_id: BorrowerId,
    pub outstanding_judgments: bool,
    pub bankruptcy: bool,
    pub foreclosure: bool,
    pub lawsuit: bool,
    pub loan_foreclosure: bool,
    pub presently_delinquent: bool,
    pub alimony_child_support: bool,
    pub borrowing_down_payment: bool,
    pub comaker_endorser: bool,
    pub us_citizen: bool,
    pub permanent_resident: bool,
    pub intent_to_occupy: bool,
    pub down_payment_gift: bool,
    pub gift_source: Option<String>,
    pub gift_amount: Option<Decimal>,
    pub co_signer_obligation: bool,
    pub pending_credit_inquiry: bool,
    pub credit_explanation: Option<String>,
    pub employment_gap_explanation: Option<String>,
    pub computed: DeclarationComputed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationComputed {
    pub has_legal_issues: bool,
    pub has_financial_issues: bool,
    pub has_adverse_declarations: bool,
    pub risk_score: u8,
    pub eligible_for_loan: bool,
    pub risk_level: RiskLevel,
}

impl Default for DeclarationComputed {
    fn default() -> Self {
        Self {
            has_legal_issues: false,
            has_financial_issues: false,
            has_adverse_declarations: false,
            risk_score: 0,
            eligible_for_loan: true,
            risk_level: RiskLevel::Low,
        }
    }
}
