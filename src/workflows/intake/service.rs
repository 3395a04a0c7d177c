use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::builder::{
    employment_from_payload, liability_from_payload, residence_from_payload, AggregateBuilder,
    BuildError,
};
use super::derivation::DerivationEngine;
use super::domain::{
    ApplicationId, ApplicationStatus, BorrowerId, LoanApplicationAggregate, RecordId,
};
use super::payload::{ApplicationPayload, EmploymentPayload, LiabilityPayload, ResidencePayload};
use super::repository::{ApplicationRecord, ApplicationRepository, RepositoryError};
use super::sequence::{assert_single_current_residence, assign_or_validate_sequence};
use super::validation::{
    normalize_residence_rent, validate_employment, validate_liability, validate_residence,
    Violation,
};

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Service composing the aggregate builder, derivation engine, and storage.
pub struct LoanIntakeService<R> {
    repository: Arc<R>,
    builder: AggregateBuilder,
}

impl<R> LoanIntakeService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_engine(repository, DerivationEngine::for_today())
    }

    pub fn with_engine(repository: Arc<R>, engine: DerivationEngine) -> Self {
        Self {
            repository,
            builder: AggregateBuilder::new(engine),
        }
    }

    /// Assemble and validate a submitted payload; persist it when every
    /// business rule passes.
    pub fn submit(
        &self,
        payload: ApplicationPayload,
    ) -> Result<ApplicationRecord, IntakeServiceError> {
        let mut aggregate = match self.builder.build(payload) {
            Ok(aggregate) => aggregate,
            Err(BuildError::Structural(violation)) => {
                return Err(IntakeServiceError::Structural(violation));
            }
            Err(BuildError::Rejected { violations, .. }) => {
                return Err(IntakeServiceError::Rejected(violations));
            }
        };

        let application_id = next_application_id();
        assign_application_id(&mut aggregate, application_id);

        let record = ApplicationRecord {
            aggregate,
            stored_at: Utc::now(),
        };
        let stored = self.repository.insert(record)?;
        info!(
            application_id = %stored.id().0,
            application_number = %stored.aggregate.application.application_number,
            borrowers = stored.aggregate.borrowers.len(),
            "loan application accepted"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &ApplicationId) -> Result<ApplicationRecord, IntakeServiceError> {
        debug!(application_id = %id.0, "fetching loan application");
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn get_by_number(&self, number: &str) -> Result<ApplicationRecord, IntakeServiceError> {
        debug!(application_number = %number, "fetching loan application by number");
        let record = self
            .repository
            .by_number(number)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Move an application through the workflow state machine. The core
    /// stores any status; this gate belongs to the surrounding flow.
    pub fn update_status(
        &self,
        id: &ApplicationId,
        next: ApplicationStatus,
    ) -> Result<ApplicationRecord, IntakeServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let current = record.aggregate.application.status;
        if !current.can_transition_to(next) {
            return Err(IntakeServiceError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        record.aggregate.application.status = next;
        record.aggregate.application.updated_at = Utc::now();
        self.repository.update(record.clone())?;
        info!(application_id = %id.0, status = next.label(), "application status updated");
        Ok(record)
    }

    /// Replace one employment record and refresh every figure derived from
    /// it, so cached projections never go stale after a partial edit.
    pub fn update_employment(
        &self,
        id: &ApplicationId,
        borrower_id: BorrowerId,
        record_id: RecordId,
        payload: EmploymentPayload,
    ) -> Result<ApplicationRecord, IntakeServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let engine = *self.builder.engine();

        {
            let borrower = record
                .aggregate
                .borrower_mut(borrower_id)
                .ok_or(IntakeServiceError::BorrowerNotFound)?;
            let sequences: Vec<(RecordId, u32)> = borrower
                .employment_history
                .iter()
                .map(|employment| (employment.id, employment.sequence_number))
                .collect();
            let slot = borrower
                .employment_history
                .iter_mut()
                .find(|employment| employment.id == record_id)
                .ok_or(IntakeServiceError::RecordNotFound)?;

            let sequence = assign_or_validate_sequence(
                payload.sequence_number,
                &sequences,
                Some(record_id),
            )
            .map_err(|err| {
                IntakeServiceError::Rejected(vec![Violation::new(
                    "employment.sequenceNumber",
                    err.to_string(),
                )])
            })?;

            let employment =
                employment_from_payload(payload, record_id, borrower_id, sequence, "employment")
                    .map_err(IntakeServiceError::Structural)?;
            let violations = validate_employment("employment", &employment);
            if !violations.is_empty() {
                return Err(IntakeServiceError::Rejected(violations));
            }

            *slot = employment;
            engine.derive_borrower(borrower);
        }

        engine.derive_application_rollups(&mut record.aggregate);
        record.aggregate.application.updated_at = Utc::now();
        self.repository.update(record.clone())?;
        info!(application_id = %id.0, record_id = record_id.0, "employment record updated");
        Ok(record)
    }

    /// Replace one residence record, re-checking the single-current-residence
    /// rule and re-applying rent normalization before anything is derived.
    pub fn update_residence(
        &self,
        id: &ApplicationId,
        borrower_id: BorrowerId,
        record_id: RecordId,
        payload: ResidencePayload,
    ) -> Result<ApplicationRecord, IntakeServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let engine = *self.builder.engine();

        {
            let borrower = record
                .aggregate
                .borrower_mut(borrower_id)
                .ok_or(IntakeServiceError::BorrowerNotFound)?;
            let residency_types: Vec<(RecordId, _)> = borrower
                .residences
                .iter()
                .map(|residence| (residence.id, residence.residency_type))
                .collect();
            let slot = borrower
                .residences
                .iter_mut()
                .find(|residence| residence.id == record_id)
                .ok_or(IntakeServiceError::RecordNotFound)?;

            let mut residence =
                residence_from_payload(payload, record_id, borrower_id, "residence")
                    .map_err(IntakeServiceError::Structural)?;

            if assert_single_current_residence(
                residence.residency_type,
                &residency_types,
                Some(record_id),
            )
            .is_err()
            {
                return Err(IntakeServiceError::Rejected(vec![Violation::new(
                    "residence.residencyType",
                    "Borrower can only have one current residence",
                )]));
            }

            let violations = validate_residence("residence", &residence);
            if !violations.is_empty() {
                return Err(IntakeServiceError::Rejected(violations));
            }
            if normalize_residence_rent(&mut residence) {
                warn!(application_id = %id.0, record_id = record_id.0, "monthly rent provided for non-rental residence, forcing to zero");
            }

            *slot = residence;
            engine.derive_borrower(borrower);
        }

        engine.derive_application_rollups(&mut record.aggregate);
        record.aggregate.application.updated_at = Utc::now();
        self.repository.update(record.clone())?;
        info!(application_id = %id.0, record_id = record_id.0, "residence record updated");
        Ok(record)
    }

    /// Replace one liability and refresh the application-level debt figures.
    pub fn update_liability(
        &self,
        id: &ApplicationId,
        record_id: RecordId,
        payload: LiabilityPayload,
    ) -> Result<ApplicationRecord, IntakeServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let engine = *self.builder.engine();

        {
            let application_id = record.aggregate.application.id.clone();
            let slot = record
                .aggregate
                .liabilities
                .iter_mut()
                .find(|liability| liability.id == record_id)
                .ok_or(IntakeServiceError::RecordNotFound)?;

            let mut liability =
                liability_from_payload(payload, record_id, application_id, "liability")
                    .map_err(IntakeServiceError::Structural)?;
            let violations = validate_liability("liability", &liability);
            if !violations.is_empty() {
                return Err(IntakeServiceError::Rejected(violations));
            }

            engine.derive_liability(&mut liability);
            *slot = liability;
        }

        engine.derive_application_rollups(&mut record.aggregate);
        record.aggregate.application.updated_at = Utc::now();
        self.repository.update(record.clone())?;
        info!(application_id = %id.0, record_id = record_id.0, "liability record updated");
        Ok(record)
    }
}

fn assign_application_id(aggregate: &mut LoanApplicationAggregate, id: ApplicationId) {
    aggregate.application.id = id.clone();
    if let Some(property) = &mut aggregate.property {
        property.application_id = id.clone();
    }
    for borrower in &mut aggregate.borrowers {
        borrower.application_id = id.clone();
    }
    for liability in &mut aggregate.liabilities {
        liability.application_id = id.clone();
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error("application payload rejected")]
    Rejected(Vec<Violation>),
    #[error("malformed application payload: {}", .0.message)]
    Structural(Violation),
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("borrower not found")]
    BorrowerNotFound,
    #[error("record not found")]
    RecordNotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
