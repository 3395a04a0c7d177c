//! Cross-entity rules evaluated over the fully assembled aggregate.

use rust_decimal::Decimal;

use super::Violation;
use crate::workflows::intake::derivation::loan_to_value_percent;
use crate::workflows::intake::domain::LoanApplicationAggregate;

/// Run every application-level rule, collecting all findings. Nothing here
/// short-circuits: the caller shows the complete list in one pass.
pub fn validate_application(aggregate: &LoanApplicationAggregate) -> Vec<Violation> {
    let mut violations = Vec::new();
    let application = &aggregate.application;

    if application.loan_amount > application.property_value {
        violations.push(Violation::new(
            "loanAmount",
            "Loan amount cannot exceed property value",
        ));
    }

    let ltv = loan_to_value_percent(application.loan_amount, application.property_value);
    if ltv > Decimal::from(100) {
        violations.push(Violation::new(
            "loanAmount",
            "Loan-to-value ratio cannot exceed 100%",
        ));
    }

    if aggregate.borrowers.is_empty() {
        violations.push(Violation::new("borrowers", "At least one borrower is required"));
    } else {
        for (later, borrower) in aggregate.borrowers.iter().enumerate() {
            let Some(ssn) = borrower.ssn.as_deref().filter(|ssn| !ssn.trim().is_empty()) else {
                continue;
            };
            let duplicated = aggregate.borrowers[..later]
                .iter()
                .any(|earlier| earlier.ssn.as_deref() == Some(ssn));
            if duplicated {
                violations.push(Violation::new(
                    format!("borrowers[{later}].ssn"),
                    "Duplicate borrower found with same SSN",
                ));
            }
        }

        let any_complete = aggregate
            .borrowers
            .iter()
            .any(|borrower| borrower.has_complete_identity());
        if !any_complete {
            violations.push(Violation::new(
                "borrowers",
                "At least one borrower must have complete personal information",
            ));
        }
    }

    if aggregate.property.is_none() {
        violations.push(Violation::new("property", "Property information is required"));
    }

    violations
}
