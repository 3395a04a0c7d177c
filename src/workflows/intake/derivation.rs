//! Pure recomputation of every derived figure from current entity state.
//!
//! Derived fields are cache-like projections: they are never authoritative
//! and must be fully recomputed whenever any input field changes. All
//! functions here are idempotent full recomputes over one entity (plus the
//! rollups over an assembled aggregate).

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use super::domain::{
    ApplicationComputed, Borrower, BorrowerComputed, Declaration, DeclarationComputed, Employment,
    EmploymentComputed, EmploymentStatus, IncomeSource, IncomeSourceComputed, IncomeType,
    Liability, LiabilityComputed, LiabilityType, LoanApplicationAggregate, ReoProperty,
    ReoComputed, Residence, ResidenceComputed, ResidencyBasis, ResidencyType, RiskLevel,
};
use super::money::{annualize, divide_ratio, months_between, percent, MONEY_SCALE, RATIO_SCALE};

/// Stateless engine carrying the evaluation date used for open-ended
/// employment durations. Injecting the date keeps every derivation
/// repeatable in tests.
#[derive(Debug, Clone, Copy)]
pub struct DerivationEngine {
    as_of: NaiveDate,
}

impl DerivationEngine {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    pub fn for_today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn derive_employment(&self, employment: &mut Employment) {
        let end = employment.end_date.unwrap_or(self.as_of);
        employment.computed = EmploymentComputed {
            duration_months: months_between(employment.start_date, end),
            annual_income: annualize(employment.monthly_income),
            full_employer_address: employment.employer_address.full(),
        };
    }

    pub fn derive_income_source(&self, source: &mut IncomeSource) {
        source.computed = IncomeSourceComputed {
            annual_amount: annualize(source.monthly_amount),
            government_benefit: matches!(
                source.income_type,
                IncomeType::SocialSecurity | IncomeType::Disability | IncomeType::Unemployment
            ),
            investment_income: matches!(
                source.income_type,
                IncomeType::Investment | IncomeType::Rental
            ),
        };
    }

    pub fn derive_residence(&self, residence: &mut Residence) {
        let rental = residence.residency_basis == ResidencyBasis::Rent;
        residence.computed = ResidenceComputed {
            full_address: residence.address.full(),
            current_residence: residence.residency_type == ResidencyType::Current,
            rental,
            annual_housing_cost: if rental {
                annualize(residence.monthly_rent)
            } else {
                Decimal::ZERO
            },
        };
    }

    pub fn derive_reo(&self, reo: &mut ReoProperty) {
        let net_monthly_income = match (reo.monthly_rental_income, reo.monthly_payment) {
            (None, _) => Decimal::ZERO,
            (Some(income), None) => income,
            (Some(income), Some(payment)) => income - payment,
        };
        reo.computed = ReoComputed {
            full_address: reo.address.full(),
            net_monthly_income,
        };
    }

    pub fn derive_liability(&self, liability: &mut Liability) {
        liability.computed = LiabilityComputed {
            masked_account_number: mask_account_number(liability.account_number.as_deref()),
            revolving: matches!(
                liability.liability_type,
                LiabilityType::Revolving | LiabilityType::CreditCard
            ),
            mortgage: liability.liability_type == LiabilityType::MortgageLoan,
            consumer_debt: matches!(
                liability.liability_type,
                LiabilityType::CreditCard | LiabilityType::AutoLoan | LiabilityType::Installment
            ),
            include_in_dti: !liability.payoff_status && liability.monthly_payment > Decimal::ZERO,
            total_liability_impact: liability.monthly_payment
                + divide_ratio(liability.unpaid_balance, Decimal::from(12), MONEY_SCALE),
            payoff_priority: payoff_priority(liability),
        };
    }

    pub fn derive_declaration(&self, declaration: &mut Declaration) {
        let has_legal_issues = declaration.outstanding_judgments
            || declaration.lawsuit
            || declaration.bankruptcy;
        let has_financial_issues = declaration.foreclosure
            || declaration.loan_foreclosure
            || declaration.presently_delinquent
            || declaration.alimony_child_support;
        let has_adverse_declarations = has_legal_issues
            || has_financial_issues
            || declaration.borrowing_down_payment
            || declaration.comaker_endorser;

        let risk_score = risk_score(declaration);

        declaration.computed = DeclarationComputed {
            has_legal_issues,
            has_financial_issues,
            has_adverse_declarations,
            risk_score,
            eligible_for_loan: risk_score < 50,
            risk_level: risk_level(risk_score),
        };
    }

    /// Recompute a borrower's children and rollups. Children are derived
    /// first so the rollups read fully-derived state.
    pub fn derive_borrower(&self, borrower: &mut Borrower) {
        for employment in &mut borrower.employment_history {
            self.derive_employment(employment);
        }
        for source in &mut borrower.income_sources {
            self.derive_income_source(source);
        }
        for residence in &mut borrower.residences {
            self.derive_residence(residence);
        }
        for reo in &mut borrower.reo_properties {
            self.derive_reo(reo);
        }
        if let Some(declaration) = &mut borrower.declaration {
            self.derive_declaration(declaration);
        }

        let total_monthly_employment_income: Decimal = borrower
            .employment_history
            .iter()
            .filter(|employment| employment.status == EmploymentStatus::Present)
            .map(|employment| employment.monthly_income)
            .sum();
        let total_monthly_other_income: Decimal = borrower
            .income_sources
            .iter()
            .map(|source| source.monthly_amount)
            .sum();
        let total_monthly_housing_cost: Decimal = borrower
            .residences
            .iter()
            .filter(|residence| residence.computed.rental)
            .map(|residence| residence.monthly_rent)
            .sum();
        let total_residence_months = borrower
            .residences
            .iter()
            .filter_map(|residence| residence.duration_months)
            .sum();

        borrower.computed = BorrowerComputed {
            full_current_address: borrower.current_address.full(),
            total_annual_employment_income: annualize(total_monthly_employment_income),
            total_monthly_employment_income,
            total_monthly_other_income,
            total_monthly_housing_cost,
            total_residence_months,
        };
    }

    /// Recompute the whole aggregate: every borrower subtree, every
    /// liability, then the application-level figures.
    pub fn derive_aggregate(&self, aggregate: &mut LoanApplicationAggregate) {
        for borrower in &mut aggregate.borrowers {
            self.derive_borrower(borrower);
        }
        for liability in &mut aggregate.liabilities {
            self.derive_liability(liability);
        }
        self.derive_application_rollups(aggregate);
    }

    /// Recompute only the application-level figures from already-derived
    /// children. Used by partial-update flows after a single record edit.
    pub fn derive_application_rollups(&self, aggregate: &mut LoanApplicationAggregate) {
        let total_monthly_income: Decimal = aggregate
            .borrowers
            .iter()
            .map(|borrower| {
                borrower.computed.total_monthly_employment_income
                    + borrower.computed.total_monthly_other_income
            })
            .sum();
        let total_monthly_debt: Decimal = aggregate
            .liabilities
            .iter()
            .filter(|liability| liability.computed.include_in_dti)
            .map(|liability| liability.monthly_payment)
            .sum();

        aggregate.application.computed = ApplicationComputed {
            loan_to_value_percent: loan_to_value_percent(
                aggregate.application.loan_amount,
                aggregate.application.property_value,
            ),
            debt_to_income_ratio: divide_ratio(total_monthly_debt, total_monthly_income, RATIO_SCALE),
            total_monthly_income,
            total_monthly_debt,
        };
    }
}

/// Loan amount over property value, expressed as a percentage.
pub fn loan_to_value_percent(loan_amount: Decimal, property_value: Decimal) -> Decimal {
    percent(divide_ratio(loan_amount, property_value, RATIO_SCALE))
}

/// Monthly payment of one liability over a monthly income figure.
pub fn debt_to_income_ratio(liability: &Liability, monthly_income: Decimal) -> Decimal {
    divide_ratio(liability.monthly_payment, monthly_income, RATIO_SCALE)
}

/// Account numbers render as `****` plus the last four characters; shorter
/// values (and absent ones) pass through unchanged.
fn mask_account_number(account_number: Option<&str>) -> Option<String> {
    let raw = account_number?;
    if raw.chars().count() < 4 {
        return Some(raw.to_string());
    }
    let visible: String = raw
        .chars()
        .skip(raw.chars().count() - 4)
        .collect();
    Some(format!("****{visible}"))
}

/// Payoff ordering: paid-off debts rank 0, everything else by interest-cost
/// heuristics (credit cards first, mortgages last).
fn payoff_priority(liability: &Liability) -> u8 {
    if liability.payoff_status {
        return 0;
    }
    match liability.liability_type {
        LiabilityType::CreditCard => 1,
        LiabilityType::Revolving => 2,
        LiabilityType::AutoLoan => 3,
        LiabilityType::Installment => 4,
        LiabilityType::StudentLoan => 5,
        LiabilityType::MortgageLoan => 6,
        LiabilityType::Other => 7,
    }
}

/// Fixed-weight score over the adverse declaration flags, capped at 100.
/// The weights and the 50-point eligibility threshold are inherited business
/// policy, not derived quantities.
fn risk_score(declaration: &Declaration) -> u8 {
    let mut score: u32 = 0;

    if declaration.bankruptcy {
        score += 25;
    }
    if declaration.foreclosure {
        score += 20;
    }
    if declaration.loan_foreclosure {
        score += 20;
    }
    if declaration.outstanding_judgments {
        score += 15;
    }
    if declaration.presently_delinquent {
        score += 15;
    }
    if declaration.lawsuit {
        score += 10;
    }
    if declaration.borrowing_down_payment {
        score += 10;
    }
    if declaration.alimony_child_support {
        score += 5;
    }
    if declaration.comaker_endorser {
        score += 5;
    }
    if !declaration.us_citizen && !declaration.permanent_resident {
        score += 10;
    }
    if !declaration.intent_to_occupy {
        score += 5;
    }

    score.min(100) as u8
}

fn risk_level(risk_score: u8) -> RiskLevel {
    match risk_score {
        0..=20 => RiskLevel::Low,
        21..=50 => RiskLevel::Medium,
        51..=75 => RiskLevel::High,
        _ => RiskLevel::VeryHigh,
    }
}
