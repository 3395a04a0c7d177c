//! Mortgage application intake: aggregate assembly, business-rule
//! validation, and derivation of the underwriting figures downstream
//! consumers read without recomputation drift.

pub mod builder;
pub mod derivation;
pub mod domain;
pub mod money;
pub mod payload;
pub mod repository;
pub mod router;
pub mod sequence;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use builder::{AggregateBuilder, BuildError};
pub use derivation::{debt_to_income_ratio, loan_to_value_percent, DerivationEngine};
pub use domain::{
    ApplicationId, ApplicationStatus, Borrower, BorrowerId, Declaration, Employment,
    EmploymentStatus, IncomeSource, IncomeType, Liability, LiabilityType, LoanApplication,
    LoanApplicationAggregate, Property, PropertyType, RecordId, ReoProperty, Residence,
    ResidencyBasis, ResidencyType, RiskLevel,
};
pub use payload::ApplicationPayload;
pub use repository::{
    ApplicationRecord, ApplicationRepository, ApplicationSummaryView, MemoryRepository,
    RepositoryError,
};
pub use router::intake_router;
pub use service::{IntakeServiceError, LoanIntakeService};
pub use validation::Violation;
