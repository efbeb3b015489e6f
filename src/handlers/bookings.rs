use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use super::response::ApiResponse;
use super::validated_json::ValidatedJson;
use crate::errors::AppError;
use crate::models::{Booking, NewBooking};
use crate::services::booking;
use crate::state::AppState;

/// Every field is optional at the wire level so a missing one can be
/// reported as a validation failure instead of a parse error.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub user_id: Option<i64>,
    pub car_id: Option<i64>,
    pub category_id: Option<i64>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub duration_months: Option<u32>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub km_package: Option<u32>,
    pub start_date: Option<NaiveDate>,
}

impl CreateBookingRequest {
    fn into_new_booking(self) -> Result<NewBooking, AppError> {
        match self {
            CreateBookingRequest {
                user_id: Some(user_id),
                car_id: Some(car_id),
                category_id: Some(category_id),
                duration_months: Some(duration_months),
                km_package: Some(km_package),
                start_date: Some(start_date),
            } => Ok(NewBooking {
                user_id,
                car_id,
                category_id,
                duration_months,
                km_package,
                start_date,
            }),
            _ => Err(AppError::Validation("All fields are required".to_string())),
        }
    }
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), AppError> {
    let new_booking = req.into_new_booking()?;

    let booking = {
        let db = state.conn();
        booking::create_booking(&db, &new_booking)?
    };

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Booking created successfully", booking)),
    ))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let booking = {
        let db = state.conn();
        booking::get_booking(&db, id)?
    };
    Ok(Json(ApiResponse::success("Booking retrieved successfully", booking)))
}

// GET /api/bookings/user/:user_id
pub async fn user_bookings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    let bookings = {
        let db = state.conn();
        booking::bookings_for_user(&db, user_id)?
    };
    Ok(Json(ApiResponse::success("Bookings retrieved successfully", bookings)))
}

// PUT /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let booking = {
        let db = state.conn();
        booking::cancel_booking(&db, id)?
    };
    Ok(Json(ApiResponse::success("Booking cancelled successfully", booking)))
}
