use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{BookingStatus, MockOutcome, Payment, PaymentStatus};
use crate::services::booking;

/// Mock gateway charge for a booking. The amount is the booking's total
/// snapshot. On success the booking is confirmed in the same transaction;
/// on failure it stays as it was and a FAILED payment is still recorded.
pub fn process_payment(
    conn: &Connection,
    booking_id: i64,
    outcome: MockOutcome,
) -> Result<Payment, AppError> {
    let tx = db::begin_immediate(conn)?;

    let booking = booking::get_booking(&tx, booking_id)?;

    if queries::payment_exists_for_booking(&tx, booking_id)? {
        tracing::warn!(booking_id, "payment already exists");
        return Err(AppError::Conflict(format!(
            "Payment already exists for booking ID: {booking_id}"
        )));
    }

    let (status, transaction_id) = match outcome {
        MockOutcome::Succeed => (PaymentStatus::Success, format!("Txn-{}", Uuid::new_v4())),
        MockOutcome::Fail => (PaymentStatus::Failed, format!("Failed-{}", Uuid::new_v4())),
    };

    let mut payment = Payment {
        id: 0,
        booking_id,
        amount: booking.total_amount,
        status,
        transaction_id,
        created_at: queries::now_timestamp(),
    };

    if status == PaymentStatus::Success {
        booking::apply_transition(&tx, booking_id, BookingStatus::Confirmed)?;
    }

    payment.id = queries::insert_payment(&tx, &payment)?;
    tx.commit()?;

    tracing::info!(
        payment_id = payment.id,
        booking_id,
        amount = %payment.amount,
        status = payment.status.as_str(),
        transaction_id = %payment.transaction_id,
        "payment processed"
    );
    Ok(payment)
}

pub fn payment_for_booking(conn: &Connection, booking_id: i64) -> Result<Payment, AppError> {
    queries::get_payment_by_booking(conn, booking_id)?.ok_or_else(|| {
        AppError::NotFound(format!("Payment not found for booking ID: {booking_id}"))
    })
}

pub fn payment_by_transaction_id(conn: &Connection, transaction_id: &str) -> Result<Payment, AppError> {
    queries::get_payment_by_transaction_id(conn, transaction_id)?.ok_or_else(|| {
        AppError::NotFound(format!("Payment not found with transaction ID: {transaction_id}"))
    })
}
