use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cost booked before the trip (flight, hotel deposit, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PreBookedCost {
    #[serde(default)]
    pub name: Option<String>,
    /// Absent amounts count as zero
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl PreBookedCost {
    pub fn new(name: &str, amount: Decimal) -> Self {
        Self {
            name: Some(name.to_string()),
            amount: Some(amount),
        }
    }
}

/// Request body for the per-diem endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerDiemRequest {
    pub total_budget: Decimal,
    #[serde(default)]
    pub pre_booked_costs: Vec<PreBookedCost>,
    pub duration_days: i64,
}

/// Budget breakdown; every figure is rounded to two decimal places
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerDiemResult {
    pub total_budget: Decimal,
    pub spent_on_bookings: Decimal,
    /// Negative when bookings exceed the budget
    pub remaining_for_trip: Decimal,
    pub per_diem_estimate: Decimal,
}
