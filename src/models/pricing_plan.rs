use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Monthly price for a (category, duration, distance package) triple.
/// At most one active plan exists per triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPlan {
    pub id: i64,
    pub category_id: i64,
    pub duration_months: u32,
    pub km_package: u32,
    pub price_per_month: Decimal,
    pub is_active: bool,
}

impl PricingPlan {
    /// Price for the whole subscription term. Fails instead of panicking
    /// when the product does not fit in a `Decimal`.
    pub fn total_for_term(&self) -> Result<Decimal, AppError> {
        self.price_per_month
            .checked_mul(Decimal::from(self.duration_months))
            .ok_or_else(|| AppError::Validation("total amount out of range".to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub category_id: i64,
    pub category_name: String,
    pub duration_months: u32,
    pub km_package: u32,
    pub price_per_month: Decimal,
    pub total_amount: Decimal,
}
