use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{PerDiemResult, PreBookedCost};
use crate::services::money::round_currency;

/// Error types for the budget calculator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("duration_days must be at least 1 (got {duration_days})")]
    InvalidDuration { duration_days: i64 },
    #[error("total_budget must not be negative (got {total_budget})")]
    NegativeBudget { total_budget: Decimal },
    #[error("pre-booked costs exceed the representable amount range")]
    AmountOutOfRange,
}

/// Rejects a negative total budget before it reaches the calculator
pub fn validate_total_budget(total_budget: Decimal) -> Result<Decimal, BudgetError> {
    if total_budget < Decimal::ZERO {
        return Err(BudgetError::NegativeBudget { total_budget });
    }
    Ok(total_budget)
}

/// Splits what is left of a budget after pre-booked costs into a daily allowance.
///
/// The remainder is reported as-is, so an overrun shows up as a negative
/// `remaining_for_trip` with a per-diem of zero.
pub fn calculate_per_diem(
    total_budget: Decimal,
    pre_booked_costs: &[PreBookedCost],
    duration_days: i64,
) -> Result<PerDiemResult, BudgetError> {
    if duration_days <= 0 {
        return Err(BudgetError::InvalidDuration { duration_days });
    }

    let spent_on_bookings = pre_booked_costs
        .iter()
        .map(|cost| cost.amount.unwrap_or(Decimal::ZERO))
        .try_fold(Decimal::ZERO, |spent, amount| spent.checked_add(amount))
        .ok_or(BudgetError::AmountOutOfRange)?;
    let remaining_for_trip = total_budget
        .checked_sub(spent_on_bookings)
        .ok_or(BudgetError::AmountOutOfRange)?;

    let per_diem_estimate = if remaining_for_trip > Decimal::ZERO {
        remaining_for_trip / Decimal::from(duration_days)
    } else {
        Decimal::ZERO
    };

    Ok(PerDiemResult {
        total_budget: round_currency(total_budget),
        spent_on_bookings: round_currency(spent_on_bookings),
        remaining_for_trip: round_currency(remaining_for_trip),
        per_diem_estimate: round_currency(per_diem_estimate),
    })
}
