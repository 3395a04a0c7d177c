use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::common::*;
use crate::workflows::intake::builder::BuildError;
use crate::workflows::intake::domain::ApplicationStatus;

#[test]
fn builds_the_full_graph_with_wired_references() {
    let aggregate = builder().build(full_payload()).expect("payload accepted");

    let application = &aggregate.application;
    assert_eq!(application.application_number, "APP-2025-0042");
    assert_eq!(application.status, ApplicationStatus::Draft);

    let property = aggregate.property.as_ref().expect("property attached");
    assert_eq!(property.application_id, application.id);

    assert_eq!(aggregate.borrowers.len(), 1);
    let borrower = &aggregate.borrowers[0];
    assert_eq!(borrower.application_id, application.id);
    assert_eq!(borrower.sequence_number, 1);
    for employment in &borrower.employment_history {
        assert_eq!(employment.borrower_id, borrower.id);
    }
    for residence in &borrower.residences {
        assert_eq!(residence.borrower_id, borrower.id);
    }
    let declaration = borrower.declaration.as_ref().expect("declaration attached");
    assert_eq!(declaration.borrower_id, borrower.id);

    assert_eq!(aggregate.liabilities.len(), 2);
    for liability in &aggregate.liabilities {
        assert_eq!(liability.application_id, application.id);
    }
}

#[test]
fn application_number_is_generated_when_absent() {
    let mut payload = full_payload();
    payload.application_number = None;
    let aggregate = builder().build(payload).expect("payload accepted");
    assert!(aggregate.application.application_number.starts_with("APP"));
}

#[test]
fn borrower_sequence_numbers_are_assigned_in_order_when_missing() {
    let mut payload = full_payload();
    let mut second = primary_borrower();
    second.sequence_number = None;
    second.ssn = Some("987-65-4321".to_string());
    second.residences.clear();
    payload.borrowers.push(second);

    let aggregate = builder().build(payload).expect("payload accepted");
    assert_eq!(aggregate.borrowers[0].sequence_number, 1);
    assert_eq!(aggregate.borrowers[1].sequence_number, 2);
}

#[test]
fn duplicate_employment_sequence_is_rejected_within_one_borrower() {
    let mut payload = full_payload();
    payload.borrowers[0].employment_history[1].sequence_number = Some(1);

    match builder().build(payload) {
        Err(BuildError::Rejected { aggregate, violations }) => {
            assert!(violations.iter().any(|violation| {
                violation.field_path == "borrowers[0].employmentHistory[1].sequenceNumber"
            }));
            // assembly still completed
            assert_eq!(aggregate.borrowers[0].employment_history.len(), 2);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn same_sequence_under_different_borrowers_is_accepted() {
    let mut payload = full_payload();
    let mut second = primary_borrower();
    second.sequence_number = Some(2);
    second.ssn = Some("987-65-4321".to_string());
    second.residences.clear();
    // both borrowers carry employment sequence numbers 1 and 2
    payload.borrowers.push(second);

    assert!(builder().build(payload).is_ok());
}

#[test]
fn duplicate_ssn_is_flagged_on_the_second_borrower_but_still_assembled() {
    let mut payload = full_payload();
    let mut twin = primary_borrower();
    twin.sequence_number = Some(2);
    twin.residences.clear();
    payload.borrowers.push(twin);

    match builder().build(payload) {
        Err(BuildError::Rejected { aggregate, violations }) => {
            assert!(violations.iter().any(|violation| {
                violation.field_path == "borrowers[1].ssn"
                    && violation.message.contains("Duplicate")
            }));
            assert_eq!(aggregate.borrowers.len(), 2);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn loan_amount_above_property_value_is_rejected() {
    let mut payload = full_payload();
    payload.loan_amount = dec!(600000);
    payload.property_value = dec!(500000);
    payload.property.as_mut().expect("property present").property_value = dec!(500000);

    match builder().build(payload) {
        Err(BuildError::Rejected { violations, .. }) => {
            assert!(violations
                .iter()
                .any(|violation| violation.message.contains("exceed property value")));
            assert!(violations
                .iter()
                .any(|violation| violation.message.contains("Loan-to-value")));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn hundred_percent_ltv_is_accepted() {
    let mut payload = full_payload();
    payload.loan_amount = dec!(600000);
    payload.property_value = dec!(600000);
    payload.property.as_mut().expect("property present").property_value = dec!(600000);

    let aggregate = builder().build(payload).expect("boundary LTV accepted");
    assert_eq!(aggregate.application.computed.loan_to_value_percent, dec!(100.00));
}

#[test]
fn missing_property_is_a_violation() {
    let mut payload = full_payload();
    payload.property = None;

    match builder().build(payload) {
        Err(BuildError::Rejected { violations, .. }) => {
            assert!(violations
                .iter()
                .any(|violation| violation.field_path == "property"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn missing_borrowers_is_a_violation() {
    let mut payload = full_payload();
    payload.borrowers.clear();

    match builder().build(payload) {
        Err(BuildError::Rejected { violations, .. }) => {
            assert!(violations.iter().any(|violation| {
                violation.field_path == "borrowers"
                    && violation.message.contains("At least one borrower is required")
            }));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn incomplete_borrower_identities_are_rejected_together() {
    let mut payload = full_payload();
    payload.borrowers[0].ssn = None;

    match builder().build(payload) {
        Err(BuildError::Rejected { violations, .. }) => {
            assert!(violations.iter().any(|violation| {
                violation.message.contains("complete personal information")
            }));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn second_current_residence_is_rejected() {
    let mut payload = full_payload();
    payload.borrowers[0].residences.push(current_rental_residence());

    match builder().build(payload) {
        Err(BuildError::Rejected { violations, .. }) => {
            assert!(violations.iter().any(|violation| {
                violation.field_path == "borrowers[0].residences[2].residencyType"
            }));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn rent_on_owned_residence_is_normalized_not_rejected() {
    let mut payload = full_payload();
    payload.borrowers[0].residences[1].monthly_rent = Some(dec!(450));

    let aggregate = builder().build(payload).expect("normalization is silent");
    let owned = &aggregate.borrowers[0].residences[1];
    assert_eq!(owned.monthly_rent, Decimal::ZERO);
    assert_eq!(owned.computed.annual_housing_cost, Decimal::ZERO);
}

#[test]
fn malformed_enum_aborts_before_assembly() {
    let mut payload = full_payload();
    payload.loan_purpose = "Speculation".to_string();

    match builder().build(payload) {
        Err(BuildError::Structural(violation)) => {
            assert_eq!(violation.field_path, "loanPurpose");
        }
        other => panic!("expected structural failure, got {other:?}"),
    }
}

#[test]
fn explicit_status_is_parsed_and_stored() {
    let mut payload = full_payload();
    payload.status = Some("Submitted".to_string());
    let aggregate = builder().build(payload).expect("payload accepted");
    assert_eq!(aggregate.application.status, ApplicationStatus::Submitted);
}
