use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::response::ApiResponse;
use crate::errors::AppError;
use crate::models::{PriceQuote, PricingPlan};
use crate::services::pricing;
use crate::state::AppState;

// GET /api/pricing/category/:category_id
pub async fn plans_for_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<PricingPlan>>>, AppError> {
    let plans = {
        let db = state.conn();
        pricing::active_plans(&db, category_id)?
    };
    Ok(Json(ApiResponse::success("Pricing plans retrieved successfully", plans)))
}

#[derive(Debug, Deserialize)]
pub struct CalculateQuery {
    pub category_id: Option<i64>,
    pub duration_months: Option<u32>,
    pub km_package: Option<u32>,
}

// GET /api/pricing/calculate
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalculateQuery>,
) -> Result<Json<ApiResponse<PriceQuote>>, AppError> {
    let (Some(category_id), Some(duration_months), Some(km_package)) =
        (query.category_id, query.duration_months, query.km_package)
    else {
        return Err(AppError::Validation(
            "category_id, duration_months and km_package are required".to_string(),
        ));
    };

    let quote = {
        let db = state.conn();
        pricing::quote(&db, category_id, duration_months, km_package)?
    };
    Ok(Json(ApiResponse::success("Price calculated successfully", quote)))
}
