use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationStatus, LoanApplicationAggregate};

/// Stored form of an accepted application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub aggregate: LoanApplicationAggregate,
    pub stored_at: DateTime<Utc>,
}

impl ApplicationRecord {
    pub fn id(&self) -> &ApplicationId {
        &self.aggregate.application.id
    }

    pub fn summary_view(&self) -> ApplicationSummaryView {
        let application = &self.aggregate.application;
        ApplicationSummaryView {
            application_id: application.id.clone(),
            application_number: application.application_number.clone(),
            status: application.status.label(),
            loan_to_value_percent: application.computed.loan_to_value_percent,
            debt_to_income_ratio: application.computed.debt_to_income_ratio,
            total_monthly_debt: application.computed.total_monthly_debt,
            borrower_count: self.aggregate.borrowers.len(),
        }
    }
}

/// Condensed representation exposed on API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummaryView {
    pub application_id: ApplicationId,
    pub application_number: String,
    pub status: &'static str,
    pub loan_to_value_percent: Decimal,
    pub debt_to_income_ratio: Decimal,
    pub total_monthly_debt: Decimal,
    pub borrower_count: usize,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn by_number(&self, number: &str) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store backing the service binary and tests. Real
/// persistence lives behind the same trait in the surrounding system.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(record.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(record.id()) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id().clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn by_number(&self, number: &str) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.aggregate.application.application_number == number)
            .cloned())
    }

    fn by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<ApplicationRecord> = guard
            .values()
            .filter(|record| record.aggregate.application.status == status)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.id().0.cmp(&b.id().0));
        Ok(records)
    }
}
