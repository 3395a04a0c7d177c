use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

/// Fractional digits carried by ratio-style figures (DTI, LTV).
pub const RATIO_SCALE: u32 = 4;

/// Fractional digits carried by monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Divide two amounts for ratio purposes, rounding half-up to `scale`
/// fractional digits.
///
/// Division by zero is defined as zero here: a missing or zero denominator
/// means "no meaningful ratio", never an error.
pub fn divide_ratio(numerator: Decimal, denominator: Decimal, scale: u32) -> Decimal {
    match numerator.checked_div(denominator) {
        Some(ratio) => ratio.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero),
        None => Decimal::ZERO,
    }
}

/// Convert a monthly amount to its annual equivalent.
pub fn annualize(monthly: Decimal) -> Decimal {
    monthly * Decimal::from(12)
}

/// Express a ratio as a percentage.
pub fn percent(ratio: Decimal) -> Decimal {
    ratio * Decimal::from(100)
}

/// Whole calendar months between two dates. A started but incomplete month
/// does not count, matching civil-period arithmetic.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months
}
