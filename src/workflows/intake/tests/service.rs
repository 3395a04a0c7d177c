use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::common::*;
use crate::workflows::intake::domain::{ApplicationId, ApplicationStatus};
use crate::workflows::intake::repository::ApplicationRepository;
use crate::workflows::intake::service::IntakeServiceError;

#[test]
fn submit_persists_accepted_applications_as_draft() {
    let (service, repository) = build_service();

    let record = service.submit(full_payload()).expect("submission accepted");
    assert_eq!(record.aggregate.application.status, ApplicationStatus::Draft);
    assert!(record.id().0.starts_with("app-"));

    let stored = repository
        .fetch(record.id())
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.aggregate, record.aggregate);

    // children carry the assigned application id
    let borrower = &stored.aggregate.borrowers[0];
    assert_eq!(&borrower.application_id, record.id());
}

#[test]
fn submit_surfaces_violations_without_storing() {
    let (service, repository) = build_service();

    let mut payload = full_payload();
    payload.property = None;

    match service.submit(payload) {
        Err(IntakeServiceError::Rejected(violations)) => {
            assert!(violations
                .iter()
                .any(|violation| violation.field_path == "property"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(repository
        .by_status(ApplicationStatus::Draft)
        .expect("query succeeds")
        .is_empty());
}

#[test]
fn submit_reports_structural_payloads() {
    let (service, _) = build_service();

    let mut payload = full_payload();
    payload.loan_type = "Balloon".to_string();

    match service.submit(payload) {
        Err(IntakeServiceError::Structural(violation)) => {
            assert_eq!(violation.field_path, "loanType");
        }
        other => panic!("expected structural error, got {other:?}"),
    }
}

#[test]
fn status_updates_follow_the_state_machine() {
    let (service, _) = build_service();
    let record = service.submit(full_payload()).expect("submission accepted");
    let id = record.id().clone();

    let record = service
        .update_status(&id, ApplicationStatus::Submitted)
        .expect("draft can be submitted");
    assert_eq!(record.aggregate.application.status, ApplicationStatus::Submitted);

    let record = service
        .update_status(&id, ApplicationStatus::Processing)
        .expect("submitted moves to processing");
    assert_eq!(record.aggregate.application.status, ApplicationStatus::Processing);

    let record = service
        .update_status(&id, ApplicationStatus::Approved)
        .expect("processing can be approved");
    assert_eq!(record.aggregate.application.status, ApplicationStatus::Approved);
}

#[test]
fn illegal_status_jumps_are_refused() {
    let (service, _) = build_service();
    let record = service.submit(full_payload()).expect("submission accepted");

    match service.update_status(record.id(), ApplicationStatus::Approved) {
        Err(IntakeServiceError::InvalidTransition { from, to }) => {
            assert_eq!(from, ApplicationStatus::Draft);
            assert_eq!(to, ApplicationStatus::Approved);
        }
        other => panic!("expected transition refusal, got {other:?}"),
    }
}

#[test]
fn applications_are_found_by_their_number() {
    let (service, _) = build_service();
    let record = service.submit(full_payload()).expect("submission accepted");

    let found = service
        .get_by_number("APP-2025-0042")
        .expect("number resolves");
    assert_eq!(found.id(), record.id());

    assert!(service.get_by_number("APP-0000-0000").is_err());
}

#[test]
fn unknown_application_lookups_fail_cleanly() {
    let (service, _) = build_service();
    match service.get(&ApplicationId("missing".to_string())) {
        Err(IntakeServiceError::Repository(err)) => {
            assert!(err.to_string().contains("not found"));
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn employment_edits_refresh_every_derived_figure() {
    let (service, _) = build_service();
    let record = service.submit(full_payload()).expect("submission accepted");
    let id = record.id().clone();
    let borrower = &record.aggregate.borrowers[0];
    let employment = &borrower.employment_history[0];

    let mut edit = present_employment();
    edit.monthly_income = dec!(6000);

    let updated = service
        .update_employment(&id, borrower.id, employment.id, edit)
        .expect("edit accepted");

    let refreshed = &updated.aggregate.borrowers[0];
    assert_eq!(
        refreshed.employment_history[0].computed.annual_income,
        dec!(72000)
    );
    assert_eq!(
        refreshed.computed.total_monthly_employment_income,
        dec!(6000)
    );
    // application-level DTI follows the income change: 560 / 6800
    assert_eq!(
        updated.aggregate.application.computed.debt_to_income_ratio,
        dec!(0.0824)
    );
}

#[test]
fn employment_edit_cannot_steal_a_sibling_sequence() {
    let (service, _) = build_service();
    let record = service.submit(full_payload()).expect("submission accepted");
    let borrower = &record.aggregate.borrowers[0];
    let first = &borrower.employment_history[0];

    // the sibling already holds sequence number 2
    let mut edit = present_employment();
    edit.sequence_number = Some(2);

    match service.update_employment(record.id(), borrower.id, first.id, edit) {
        Err(IntakeServiceError::Rejected(violations)) => {
            assert_eq!(violations[0].field_path, "employment.sequenceNumber");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn employment_edit_keeping_its_own_sequence_is_allowed() {
    let (service, _) = build_service();
    let record = service.submit(full_payload()).expect("submission accepted");
    let borrower = &record.aggregate.borrowers[0];
    let first = &borrower.employment_history[0];

    let edit = present_employment();
    assert!(service
        .update_employment(record.id(), borrower.id, first.id, edit)
        .is_ok());
}

#[test]
fn residence_edits_renormalize_rent() {
    let (service, _) = build_service();
    let record = service.submit(full_payload()).expect("submission accepted");
    let borrower = &record.aggregate.borrowers[0];
    let owned = &borrower.residences[1];

    let mut edit = prior_owned_residence();
    edit.monthly_rent = Some(dec!(725));

    let updated = service
        .update_residence(record.id(), borrower.id, owned.id, edit)
        .expect("edit accepted");
    let refreshed = &updated.aggregate.borrowers[0].residences[1];
    assert_eq!(refreshed.monthly_rent, Decimal::ZERO);
    assert_eq!(refreshed.computed.annual_housing_cost, Decimal::ZERO);
}

#[test]
fn residence_edit_cannot_create_a_second_current_residence() {
    let (service, _) = build_service();
    let record = service.submit(full_payload()).expect("submission accepted");
    let borrower = &record.aggregate.borrowers[0];
    let prior = &borrower.residences[1];

    let mut edit = prior_owned_residence();
    edit.residency_type = "Current".to_string();

    match service.update_residence(record.id(), borrower.id, prior.id, edit) {
        Err(IntakeServiceError::Rejected(violations)) => {
            assert!(violations[0].message.contains("one current residence"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn liability_edits_refresh_debt_figures() {
    let (service, _) = build_service();
    let record = service.submit(full_payload()).expect("submission accepted");
    let card = &record.aggregate.liabilities[0];

    let mut edit = credit_card_liability();
    edit.payoff_status = Some(true);

    let updated = service
        .update_liability(record.id(), card.id, edit)
        .expect("edit accepted");
    let refreshed = &updated.aggregate.liabilities[0];
    assert!(!refreshed.computed.include_in_dti);
    assert_eq!(refreshed.computed.payoff_priority, 0);
    // only the auto loan remains in the debt rollup
    assert_eq!(
        updated.aggregate.application.computed.total_monthly_debt,
        dec!(310)
    );
}
