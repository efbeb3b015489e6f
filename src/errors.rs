use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::handlers::response::ApiResponse;
use crate::models::Payment;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// The mock gateway declined the charge. The FAILED payment was recorded.
    #[error("Payment failed")]
    PaymentDeclined(Box<Payment>),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::PaymentDeclined(_) => StatusCode::PAYMENT_REQUIRED,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        match self {
            AppError::PaymentDeclined(payment) => {
                let body = ApiResponse {
                    success: false,
                    message: "Payment failed".to_string(),
                    data: Some(*payment),
                };
                (status, Json(body)).into_response()
            }
            other => {
                let message = if status.is_server_error() {
                    format!("An unexpected error occurred: {other}")
                } else {
                    other.to_string()
                };
                (status, Json(ApiResponse::<()>::error(message))).into_response()
            }
        }
    }
}
