//! Per-entity field and cross-field rules.

use rust_decimal::Decimal;

use super::Violation;
use crate::workflows::intake::domain::{
    Employment, EmploymentStatus, IncomeSource, IncomeType, Liability, LoanApplication, Property,
    ReoProperty, Residence, ResidencyBasis,
};

fn max_monthly_income() -> Decimal {
    Decimal::new(99_999_999, 2) // 999,999.99
}

fn max_monthly_payment() -> Decimal {
    Decimal::new(9_999_999, 2) // 99,999.99
}

fn max_unpaid_balance() -> Decimal {
    Decimal::new(999_999_999, 2) // 9,999,999.99
}

pub fn validate_application_fields(application: &LoanApplication) -> Vec<Violation> {
    let mut violations = Vec::new();
    if application.loan_amount < Decimal::ZERO {
        violations.push(Violation::new(
            "loanAmount",
            "Loan amount must be non-negative",
        ));
    }
    if application.property_value < Decimal::ZERO {
        violations.push(Violation::new(
            "propertyValue",
            "Property value must be non-negative",
        ));
    }
    violations
}

pub fn validate_property(path: &str, property: &Property) -> Vec<Violation> {
    let mut violations = Vec::new();
    if property.property_value < Decimal::ZERO {
        violations.push(Violation::new(
            format!("{path}.propertyValue"),
            "Property value must be non-negative",
        ));
    }
    if !(1..=4).contains(&property.units_count) {
        violations.push(Violation::new(
            format!("{path}.unitsCount"),
            "Units count must be between 1 and 4 for residential properties",
        ));
    }
    if let Some(year_built) = property.year_built {
        if !(1800..=2030).contains(&year_built) {
            violations.push(Violation::new(
                format!("{path}.yearBuilt"),
                "Year built must be between 1800 and 2030",
            ));
        }
    }
    violations
}

pub fn validate_employment(path: &str, employment: &Employment) -> Vec<Violation> {
    let mut violations = Vec::new();

    if employment.employer_name.trim().is_empty() {
        violations.push(Violation::new(
            format!("{path}.employerName"),
            "Employer name is required",
        ));
    }

    match employment.status {
        EmploymentStatus::Present => {
            if employment.end_date.is_some() {
                violations.push(Violation::new(
                    format!("{path}.endDate"),
                    "Present employment cannot have an end date",
                ));
            }
        }
        EmploymentStatus::Prior => {
            if employment.end_date.is_none() {
                violations.push(Violation::new(
                    format!("{path}.endDate"),
                    "Prior employment must have an end date",
                ));
            }
        }
    }

    if let Some(end_date) = employment.end_date {
        if employment.start_date > end_date {
            violations.push(Violation::new(
                format!("{path}.startDate"),
                "Start date cannot be after end date",
            ));
        }
    }

    if employment.monthly_income < Decimal::ZERO {
        violations.push(Violation::new(
            format!("{path}.monthlyIncome"),
            "Monthly income must be non-negative",
        ));
    } else if employment.monthly_income > max_monthly_income() {
        violations.push(Violation::new(
            format!("{path}.monthlyIncome"),
            "Monthly income cannot exceed $999,999.99",
        ));
    }

    violations
}

pub fn validate_income_source(path: &str, source: &IncomeSource) -> Vec<Violation> {
    let mut violations = Vec::new();

    if source.monthly_amount <= Decimal::ZERO {
        violations.push(Violation::new(
            format!("{path}.monthlyAmount"),
            "Monthly amount must be greater than zero",
        ));
    } else if source.monthly_amount > max_monthly_income() {
        violations.push(Violation::new(
            format!("{path}.monthlyAmount"),
            "Monthly amount cannot exceed $999,999.99",
        ));
    }

    if source.income_type == IncomeType::Other {
        let described = source
            .description
            .as_deref()
            .map(|description| !description.trim().is_empty())
            .unwrap_or(false);
        if !described {
            violations.push(Violation::new(
                format!("{path}.description"),
                "Description is required for income type Other",
            ));
        }
    }

    violations
}

pub fn validate_residence(path: &str, residence: &Residence) -> Vec<Violation> {
    let mut violations = Vec::new();

    if residence.residency_basis == ResidencyBasis::Rent && residence.monthly_rent <= Decimal::ZERO
    {
        violations.push(Violation::new(
            format!("{path}.monthlyRent"),
            "Monthly rent is required and must be greater than zero for rental residences",
        ));
    }

    if residence.duration_months == Some(0) {
        violations.push(Violation::new(
            format!("{path}.durationMonths"),
            "Duration in months must be greater than zero",
        ));
    }

    violations
}

/// Force rent to zero on residences that are not rented. This is a silent
/// normalization, not a violation; returns whether a nonzero value was
/// dropped so the caller can log the change.
pub fn normalize_residence_rent(residence: &mut Residence) -> bool {
    if residence.residency_basis != ResidencyBasis::Rent && residence.monthly_rent != Decimal::ZERO
    {
        residence.monthly_rent = Decimal::ZERO;
        return true;
    }
    false
}

pub fn validate_reo_property(path: &str, reo: &ReoProperty) -> Vec<Violation> {
    let mut violations = Vec::new();
    let non_negative: [(&str, Option<Decimal>); 4] = [
        ("propertyValue", reo.property_value),
        ("monthlyRentalIncome", reo.monthly_rental_income),
        ("monthlyPayment", reo.monthly_payment),
        ("unpaidBalance", reo.unpaid_balance),
    ];
    for (field, value) in non_negative {
        if let Some(amount) = value {
            if amount < Decimal::ZERO {
                violations.push(Violation::new(
                    format!("{path}.{field}"),
                    "Amount must be non-negative",
                ));
            }
        }
    }
    violations
}

pub fn validate_liability(path: &str, liability: &Liability) -> Vec<Violation> {
    let mut violations = Vec::new();

    if liability.creditor_name.trim().is_empty() {
        violations.push(Violation::new(
            format!("{path}.creditorName"),
            "Creditor name is required",
        ));
    }

    if liability.monthly_payment < Decimal::ZERO {
        violations.push(Violation::new(
            format!("{path}.monthlyPayment"),
            "Monthly payment must be non-negative",
        ));
    } else if liability.monthly_payment > max_monthly_payment() {
        violations.push(Violation::new(
            format!("{path}.monthlyPayment"),
            "Monthly payment cannot exceed $99,999.99",
        ));
    }

    if liability.unpaid_balance < Decimal::ZERO {
        violations.push(Violation::new(
            format!("{path}.unpaidBalance"),
            "Unpaid balance must be non-negative",
        ));
    } else if liability.unpaid_balance > max_unpaid_balance() {
        violations.push(Violation::new(
            format!("{path}.unpaidBalance"),
            "Unpaid balance cannot exceed $9,999,999.99",
        ));
    }

    violations
}
