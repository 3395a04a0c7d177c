//! Assembly of the full application graph from one submission payload.
//!
//! Structural problems (unrecognized enum values) abort the build with a
//! single violation. Business-rule findings never stop assembly: the
//! aggregate is built in full and returned alongside the collected
//! violations so callers can show every problem at once.

use chrono::Utc;
use tracing::warn;

use super::derivation::DerivationEngine;
use super::domain::{
    ApplicationComputed, ApplicationId, ApplicationStatus, Borrower, BorrowerComputed, BorrowerId,
    Declaration, DeclarationComputed, Employment, EmploymentComputed, EnumParseError,
    IncomeSource, IncomeSourceComputed, Liability, LiabilityComputed, LoanApplication,
    LoanApplicationAggregate, Property, RecordId, ReoComputed, ReoProperty, Residence,
    ResidenceComputed,
};
use super::payload::{
    ApplicationPayload, BorrowerPayload, DeclarationPayload, EmploymentPayload,
    IncomeSourcePayload, LiabilityPayload, PropertyPayload, ReoPropertyPayload, ResidencePayload,
};
use super::sequence::{assert_single_current_residence, assign_or_validate_sequence};
use super::validation::{
    normalize_residence_rent, validate_application, validate_application_fields,
    validate_employment, validate_income_source, validate_liability, validate_property,
    validate_reo_property, validate_residence, Violation,
};

/// Outcome of a failed build.
#[derive(Debug)]
pub enum BuildError {
    /// Contract breach in the payload itself; nothing was assembled.
    Structural(Violation),
    /// Business rules failed. The aggregate is still fully assembled so
    /// callers can inspect it; only acceptance is withheld.
    Rejected {
        aggregate: Box<LoanApplicationAggregate>,
        violations: Vec<Violation>,
    },
}

impl BuildError {
    pub fn violations(&self) -> Vec<Violation> {
        match self {
            BuildError::Structural(violation) => vec![violation.clone()],
            BuildError::Rejected { violations, .. } => violations.clone(),
        }
    }
}

/// Hands out aggregate-unique record identifiers during assembly.
#[derive(Debug, Default)]
struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    fn record(&mut self) -> RecordId {
        self.next += 1;
        RecordId(self.next)
    }
}

/// Orchestrates construction: parse, guard sequences, validate, normalize,
/// derive, then cross-validate, in that order.
#[derive(Debug, Clone, Copy)]
pub struct AggregateBuilder {
    engine: DerivationEngine,
}

impl AggregateBuilder {
    pub fn new(engine: DerivationEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &DerivationEngine {
        &self.engine
    }

    pub fn build(
        &self,
        payload: ApplicationPayload,
    ) -> Result<LoanApplicationAggregate, BuildError> {
        let now = Utc::now();
        let mut ids = IdAllocator::default();
        let mut violations = Vec::new();

        let status = match payload.status.as_deref() {
            Some(raw) => parse_enum(raw, "status").map_err(BuildError::Structural)?,
            None => ApplicationStatus::Draft,
        };
        let application = LoanApplication {
            id: ApplicationId("pending".to_string()),
            application_number: payload
                .application_number
                .filter(|number| !number.trim().is_empty())
                .unwrap_or_else(|| format!("APP{}", now.timestamp_millis())),
            loan_purpose: parse_enum(&payload.loan_purpose, "loanPurpose")
                .map_err(BuildError::Structural)?,
            loan_type: parse_enum(&payload.loan_type, "loanType")
                .map_err(BuildError::Structural)?,
            loan_amount: payload.loan_amount,
            property_value: payload.property_value,
            status,
            crm_contact_id: payload.crm_contact_id,
            created_at: now,
            updated_at: now,
            computed: ApplicationComputed::default(),
        };
        violations.extend(validate_application_fields(&application));

        let mut aggregate = LoanApplicationAggregate {
            application,
            property: None,
            borrowers: Vec::new(),
            liabilities: Vec::new(),
        };

        if let Some(property_payload) = payload.property {
            let property = property_from_payload(
                property_payload,
                ids.record(),
                aggregate.application.id.clone(),
            )
            .map_err(BuildError::Structural)?;
            violations.extend(validate_property("property", &property));
            aggregate.property = Some(property);
        }

        let mut borrower_sequences: Vec<(BorrowerId, u32)> = Vec::new();
        for (index, borrower_payload) in payload.borrowers.into_iter().enumerate() {
            let path = format!("borrowers[{index}]");
            let borrower_id = BorrowerId(index as u64 + 1);
            let sequence_number = resolve_sequence(
                borrower_payload.sequence_number,
                &borrower_sequences,
                &path,
                &mut violations,
            );
            borrower_sequences.push((borrower_id, sequence_number));

            let borrower = self
                .build_borrower(
                    borrower_payload,
                    borrower_id,
                    sequence_number,
                    aggregate.application.id.clone(),
                    &path,
                    &mut ids,
                    &mut violations,
                )
                .map_err(BuildError::Structural)?;
            aggregate.borrowers.push(borrower);
        }

        for (index, liability_payload) in payload.liabilities.into_iter().enumerate() {
            let path = format!("liabilities[{index}]");
            let liability = liability_from_payload(
                liability_payload,
                ids.record(),
                aggregate.application.id.clone(),
                &path,
            )
            .map_err(BuildError::Structural)?;
            violations.extend(validate_liability(&path, &liability));
            aggregate.liabilities.push(liability);
        }

        self.engine.derive_aggregate(&mut aggregate);

        violations.extend(validate_application(&aggregate));

        if violations.is_empty() {
            Ok(aggregate)
        } else {
            Err(BuildError::Rejected {
                aggregate: Box::new(aggregate),
                violations,
            })
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_borrower(
        &self,
        payload: BorrowerPayload,
        borrower_id: BorrowerId,
        sequence_number: u32,
        application_id: ApplicationId,
        path: &str,
        ids: &mut IdAllocator,
        violations: &mut Vec<Violation>,
    ) -> Result<Borrower, Violation> {
        let mut borrower = Borrower {
            id: borrower_id,
            application_id,
            sequence_number,
            first_name: payload.first_name,
            last_name: payload.last_name,
            ssn: payload.ssn,
            birth_date: payload.birth_date,
            marital_status: payload.marital_status,
            email: payload.email,
            phone: payload.phone,
            citizenship_type: payload.citizenship_type,
            dependents_count: payload.dependents_count.unwrap_or(0),
            current_address: payload.current_address,
            employment_history: Vec::new(),
            income_sources: Vec::new(),
            residences: Vec::new(),
            reo_properties: Vec::new(),
            declaration: None,
            computed: BorrowerComputed::default(),
        };

        let mut employment_sequences: Vec<(RecordId, u32)> = Vec::new();
        for (index, employment_payload) in payload.employment_history.into_iter().enumerate() {
            let child_path = format!("{path}.employmentHistory[{index}]");
            let record_id = ids.record();
            let sequence = resolve_sequence(
                employment_payload.sequence_number,
                &employment_sequences,
                &child_path,
                violations,
            );
            employment_sequences.push((record_id, sequence));

            let employment = employment_from_payload(
                employment_payload,
                record_id,
                borrower_id,
                sequence,
                &child_path,
            )?;
            violations.extend(validate_employment(&child_path, &employment));
            borrower.employment_history.push(employment);
        }

        for (index, source_payload) in payload.income_sources.into_iter().enumerate() {
            let child_path = format!("{path}.incomeSources[{index}]");
            let source =
                income_source_from_payload(source_payload, ids.record(), borrower_id, &child_path)?;
            violations.extend(validate_income_source(&child_path, &source));
            borrower.income_sources.push(source);
        }

        let mut residence_types = Vec::new();
        for (index, residence_payload) in payload.residences.into_iter().enumerate() {
            let child_path = format!("{path}.residences[{index}]");
            let record_id = ids.record();
            let mut residence =
                residence_from_payload(residence_payload, record_id, borrower_id, &child_path)?;

            if assert_single_current_residence(residence.residency_type, &residence_types, None)
                .is_err()
            {
                violations.push(Violation::new(
                    format!("{child_path}.residencyType"),
                    "Borrower can only have one current residence",
                ));
            }
            residence_types.push((record_id, residence.residency_type));

            violations.extend(validate_residence(&child_path, &residence));
            if normalize_residence_rent(&mut residence) {
                warn!(residence = %child_path, "monthly rent provided for non-rental residence, forcing to zero");
            }
            borrower.residences.push(residence);
        }

        let mut reo_sequences: Vec<(RecordId, u32)> = Vec::new();
        for (index, reo_payload) in payload.reo_properties.into_iter().enumerate() {
            let child_path = format!("{path}.reoProperties[{index}]");
            let record_id = ids.record();
            let sequence = resolve_sequence(
                reo_payload.sequence_number,
                &reo_sequences,
                &child_path,
                violations,
            );
            reo_sequences.push((record_id, sequence));

            let reo = reo_from_payload(reo_payload, record_id, borrower_id, sequence);
            violations.extend(validate_reo_property(&child_path, &reo));
            borrower.reo_properties.push(reo);
        }

        if let Some(declaration_payload) = payload.declaration {
            borrower.declaration = Some(declaration_from_payload(
                declaration_payload,
                ids.record(),
                borrower_id,
            ));
        }

        self.engine.derive_borrower(&mut borrower);
        Ok(borrower)
    }
}

fn parse_enum<T>(value: &str, field_path: &str) -> Result<T, Violation>
where
    T: std::str::FromStr<Err = EnumParseError>,
{
    value
        .parse()
        .map_err(|err: EnumParseError| Violation::new(field_path, err.to_string()))
}

fn resolve_sequence<I: Copy + PartialEq>(
    candidate: Option<u32>,
    existing: &[(I, u32)],
    path: &str,
    violations: &mut Vec<Violation>,
) -> u32 {
    match assign_or_validate_sequence(candidate, existing, None) {
        Ok(sequence) => sequence,
        Err(err) => {
            violations.push(Violation::new(
                format!("{path}.sequenceNumber"),
                err.to_string(),
            ));
            candidate.unwrap_or(0)
        }
    }
}

fn property_from_payload(
    payload: PropertyPayload,
    id: RecordId,
    application_id: ApplicationId,
) -> Result<Property, Violation> {
    Ok(Property {
        id,
        application_id,
        address: payload.address,
        county: payload.county,
        property_type: parse_enum(&payload.property_type, "property.propertyType")?,
        property_value: payload.property_value,
        construction_type: payload.construction_type,
        year_built: payload.year_built,
        units_count: payload.units_count,
    })
}

pub(crate) fn employment_from_payload(
    payload: EmploymentPayload,
    id: RecordId,
    borrower_id: BorrowerId,
    sequence_number: u32,
    path: &str,
) -> Result<Employment, Violation> {
    Ok(Employment {
        id,
        borrower_id,
        sequence_number,
        employer_name: payload.employer_name,
        position: payload.position,
        employer_phone: payload.employer_phone,
        employer_address: payload.employer_address,
        start_date: payload.start_date,
        end_date: payload.end_date,
        monthly_income: payload.monthly_income,
        status: parse_enum(&payload.employment_status, &format!("{path}.employmentStatus"))?,
        self_employed: payload.self_employed.unwrap_or(false),
        computed: EmploymentComputed::default(),
    })
}

fn income_source_from_payload(
    payload: IncomeSourcePayload,
    id: RecordId,
    borrower_id: BorrowerId,
    path: &str,
) -> Result<IncomeSource, Violation> {
    Ok(IncomeSource {
        id,
        borrower_id,
        income_type: parse_enum(&payload.income_type, &format!("{path}.incomeType"))?,
        monthly_amount: payload.monthly_amount,
        description: payload.description,
        computed: IncomeSourceComputed::default(),
    })
}

pub(crate) fn residence_from_payload(
    payload: ResidencePayload,
    id: RecordId,
    borrower_id: BorrowerId,
    path: &str,
) -> Result<Residence, Violation> {
    Ok(Residence {
        id,
        borrower_id,
        address: payload.address,
        residency_type: parse_enum(&payload.residency_type, &format!("{path}.residencyType"))?,
        residency_basis: parse_enum(&payload.residency_basis, &format!("{path}.residencyBasis"))?,
        duration_months: payload.duration_months,
        monthly_rent: payload.monthly_rent.unwrap_or_default(),
        computed: ResidenceComputed::default(),
    })
}

fn reo_from_payload(
    payload: ReoPropertyPayload,
    id: RecordId,
    borrower_id: BorrowerId,
    sequence_number: u32,
) -> ReoProperty {
    ReoProperty {
        id,
        borrower_id,
        sequence_number,
        address: payload.address,
        property_type: payload.property_type,
        property_value: payload.property_value,
        monthly_rental_income: payload.monthly_rental_income,
        monthly_payment: payload.monthly_payment,
        unpaid_balance: payload.unpaid_balance,
        computed: ReoComputed::default(),
    }
}

fn declaration_from_payload(
    payload: DeclarationPayload,
    id: RecordId,
    borrower_id: BorrowerId,
) -> Declaration {
    Declaration {
        id,
        borrower_id,
        outstanding_judgments: payload.outstanding_judgments,
        bankruptcy: payload.bankruptcy,
        foreclosure: payload.foreclosure,
        lawsuit: payload.lawsuit,
        loan_foreclosure: payload.loan_foreclosure,
        presently_delinquent: payload.presently_delinquent,
        alimony_child_support: payload.alimony_child_support,
        borrowing_down_payment: payload.borrowing_down_payment,
        comaker_endorser: payload.comaker_endorser,
        us_citizen: payload.us_citizen,
        permanent_resident: payload.permanent_resident,
        intent_to_occupy: payload.intent_to_occupy,
        down_payment_gift: payload.down_payment_gift,
        gift_source: payload.gift_source,
        gift_amount: payload.gift_amount,
        co_signer_obligation: payload.co_signer_obligation,
        pending_credit_inquiry: payload.pending_credit_inquiry,
        credit_explanation: payload.credit_explanation,
        employment_gap_explanation: payload.employment_gap_explanation,
        computed: DeclarationComputed::default(),
    }
}

pub(crate) fn liability_from_payload(
    payload: LiabilityPayload,
    id: RecordId,
    application_id: ApplicationId,
    path: &str,
) -> Result<Liability, Violation> {
    Ok(Liability {
        id,
        application_id,
        account_number: payload.account_number,
        creditor_name: payload.creditor_name,
        liability_type: parse_enum(&payload.liability_type, &format!("{path}.liabilityType"))?,
        monthly_payment: payload.monthly_payment,
        unpaid_balance: payload.unpaid_balance,
        payoff_status: payload.payoff_status.unwrap_or(false),
        to_be_paid_off: payload.to_be_paid_off.unwrap_or(false),
        computed: LiabilityComputed::default(),
    })
}
