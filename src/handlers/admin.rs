use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use super::response::ApiResponse;
use super::validated_json::ValidatedJson;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Car, CarStatus, PricingPlan};
use crate::services::{booking, catalog, pricing};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized("unauthorized".to_string()));
    }
    Ok(())
}

// GET /api/admin/bookings
#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let status = match query.status.as_deref() {
        Some(raw) => Some(
            BookingStatus::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("Unknown booking status: {raw}")))?,
        ),
        None => None,
    };
    let limit = query.limit.unwrap_or(50);

    let bookings = {
        let db = state.conn();
        booking::list_bookings(&db, status, limit)?
    };
    Ok(Json(ApiResponse::success("Bookings retrieved successfully", bookings)))
}

// PUT /api/admin/bookings/:id/complete
pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let booking = {
        let db = state.conn();
        booking::complete_booking(&db, id)?
    };
    Ok(Json(ApiResponse::success("Booking completed successfully", booking)))
}

// PUT /api/admin/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let booking = {
        let db = state.conn();
        booking::confirm_booking(&db, id)?
    };
    Ok(Json(ApiResponse::success("Booking confirmed successfully", booking)))
}

// PUT /api/admin/cars/:id/status
#[derive(Debug, Deserialize, Validate)]
pub struct CarStatusRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub status: String,
}

pub async fn set_car_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<CarStatusRequest>,
) -> Result<Json<ApiResponse<Car>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let status = CarStatus::parse(&req.status)
        .ok_or_else(|| AppError::Validation(format!("Unknown car status: {}", req.status)))?;

    let car = {
        let db = state.conn();
        catalog::set_car_status(&db, id, status)?
    };
    Ok(Json(ApiResponse::success("Car status updated successfully", car)))
}

// POST /api/admin/pricing, PUT /api/admin/pricing
#[derive(Debug, Deserialize, Validate)]
pub struct PlanRequest {
    pub category_id: i64,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub duration_months: u32,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub km_package: u32,
    pub price_per_month: Decimal,
}

pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<PlanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PricingPlan>>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let plan = {
        let db = state.conn();
        pricing::create_plan(
            &db,
            req.category_id,
            req.duration_months,
            req.km_package,
            req.price_per_month,
        )?
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Pricing plan created successfully", plan)),
    ))
}

pub async fn update_plan_price(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<PlanRequest>,
) -> Result<Json<ApiResponse<PricingPlan>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let plan = {
        let db = state.conn();
        pricing::update_plan_price(
            &db,
            req.category_id,
            req.duration_months,
            req.km_package,
            req.price_per_month,
        )?
    };
    Ok(Json(ApiResponse::success("Pricing plan updated successfully", plan)))
}

// DELETE /api/admin/pricing/:id
pub async fn deactivate_plan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    {
        let db = state.conn();
        pricing::deactivate_plan(&db, id)?;
    }
    Ok(Json(ApiResponse::success("Pricing plan deactivated successfully", ())))
}
