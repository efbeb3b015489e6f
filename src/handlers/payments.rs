use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use super::response::ApiResponse;
use super::validated_json::ValidatedJson;
use crate::errors::AppError;
use crate::models::{MockOutcome, Payment, PaymentStatus};
use crate::services::payment;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ProcessPaymentRequest {
    pub booking_id: Option<i64>,
    /// Outcome to simulate. Absent means the charge fails.
    pub mock_success: Option<bool>,
}

// POST /api/payments/process
pub async fn process_payment(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ProcessPaymentRequest>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let booking_id = req
        .booking_id
        .ok_or_else(|| AppError::Validation("booking_id is required".to_string()))?;
    let outcome = MockOutcome::from(req.mock_success.unwrap_or(false));

    let payment = {
        let db = state.conn();
        payment::process_payment(&db, booking_id, outcome)?
    };

    match payment.status {
        PaymentStatus::Success => Ok(Json(ApiResponse::success("Payment successful", payment))),
        PaymentStatus::Failed => Err(AppError::PaymentDeclined(Box::new(payment))),
    }
}

// GET /api/payments/booking/:booking_id
pub async fn payment_for_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let payment = {
        let db = state.conn();
        payment::payment_for_booking(&db, booking_id)?
    };
    Ok(Json(ApiResponse::success("Payment retrieved successfully", payment)))
}

// GET /api/payments/transaction/:transaction_id
pub async fn payment_by_transaction(
    State(state): State<Arc<AppState>>,
    Path(transaction_id): Path<String>,
) -> Result<Json<ApiResponse<Payment>>, AppError> {
    let payment = {
        let db = state.conn();
        payment::payment_by_transaction_id(&db, &transaction_id)?
    };
    Ok(Json(ApiResponse::success("Payment retrieved successfully", payment)))
}
