use chrono::{Months, NaiveDate};
use rusqlite::Connection;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, CarStatus, NewBooking};
use crate::services::pricing;

/// End of a subscription: calendar-month addition, clamped to the last day
/// of the target month (Jan 31 + 1 month = Feb 28/29).
pub fn subscription_end_date(start: NaiveDate, duration_months: u32) -> Result<NaiveDate, AppError> {
    start
        .checked_add_months(Months::new(duration_months))
        .ok_or_else(|| AppError::Validation("start_date plus duration is out of range".to_string()))
}

/// Creates a PENDING booking with the plan's price copied in, and marks the
/// car RENTED. Both writes commit together or not at all.
pub fn create_booking(conn: &Connection, new: &NewBooking) -> Result<Booking, AppError> {
    tracing::info!(
        user_id = new.user_id,
        car_id = new.car_id,
        category_id = new.category_id,
        duration_months = new.duration_months,
        km_package = new.km_package,
        start_date = %new.start_date,
        "creating booking"
    );

    let tx = db::begin_immediate(conn)?;

    let user = queries::get_user(&tx, new.user_id)?.ok_or_else(|| {
        tracing::warn!(user_id = new.user_id, "user not found");
        AppError::NotFound(format!("User not found with ID: {}", new.user_id))
    })?;
    tracing::debug!(email = %user.email, "user found");

    let car = queries::get_car(&tx, new.car_id)?.ok_or_else(|| {
        tracing::warn!(car_id = new.car_id, "car not found");
        AppError::NotFound(format!("Car not found with ID: {}", new.car_id))
    })?;
    tracing::debug!(brand = %car.brand, model = %car.model, status = car.status.as_str(), "car found");

    if car.status != CarStatus::Available {
        tracing::warn!(car_id = car.id, status = car.status.as_str(), "car not available");
        return Err(AppError::Conflict("Car is not available for booking".to_string()));
    }

    let plan = pricing::find_plan(&tx, new.category_id, new.duration_months, new.km_package)?;

    let end_date = subscription_end_date(new.start_date, new.duration_months)?;
    let price_per_month = plan.price_per_month;
    let total_amount = plan.total_for_term()?;
    let now = queries::now_timestamp();

    let mut booking = Booking {
        id: 0,
        user_id: user.id,
        car_id: car.id,
        duration_months: new.duration_months,
        km_package: new.km_package,
        price_per_month,
        total_amount,
        start_date: new.start_date,
        end_date,
        status: BookingStatus::Pending,
        created_at: now,
        updated_at: now,
    };
    booking.id = queries::insert_booking(&tx, &booking)?;

    if !queries::mark_car_rented_if_available(&tx, car.id)? {
        tracing::warn!(car_id = car.id, "car was rented by a concurrent booking");
        return Err(AppError::Conflict("Car is not available for booking".to_string()));
    }

    tx.commit()?;

    tracing::info!(
        booking_id = booking.id,
        car_id = car.id,
        %price_per_month,
        %total_amount,
        end_date = %end_date,
        "booking created"
    );
    Ok(booking)
}

pub fn get_booking(conn: &Connection, id: i64) -> Result<Booking, AppError> {
    queries::get_booking(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("Booking not found with ID: {id}")))
}

pub fn bookings_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Booking>, AppError> {
    Ok(queries::list_bookings_for_user(conn, user_id)?)
}

pub fn bookings_by_status(conn: &Connection, status: BookingStatus) -> Result<Vec<Booking>, AppError> {
    Ok(queries::list_bookings_by_status(conn, status)?)
}

pub fn list_bookings(
    conn: &Connection,
    status: Option<BookingStatus>,
    limit: i64,
) -> Result<Vec<Booking>, AppError> {
    Ok(queries::list_all_bookings(conn, status, limit)?)
}

/// Marks a booking CONFIRMED. The payment flow calls this after a
/// successful charge; the admin surface can call it directly.
pub fn confirm_booking(conn: &Connection, id: i64) -> Result<Booking, AppError> {
    transition(conn, id, BookingStatus::Confirmed)
}

/// Sets CANCELLED and releases the car, whatever the prior status.
pub fn cancel_booking(conn: &Connection, id: i64) -> Result<Booking, AppError> {
    transition(conn, id, BookingStatus::Cancelled)
}

/// Sets COMPLETED and releases the car.
pub fn complete_booking(conn: &Connection, id: i64) -> Result<Booking, AppError> {
    transition(conn, id, BookingStatus::Completed)
}

fn transition(conn: &Connection, id: i64, status: BookingStatus) -> Result<Booking, AppError> {
    let tx = db::begin_immediate(conn)?;
    let booking = apply_transition(&tx, id, status)?;
    tx.commit()?;
    Ok(booking)
}

/// Writes the status change inside the caller's transaction. Terminal
/// statuses return the car to AVAILABLE.
pub(crate) fn apply_transition(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
) -> Result<Booking, AppError> {
    let mut booking = get_booking(conn, id)?;
    let previous = booking.status;
    let now = queries::now_timestamp();

    queries::update_booking_status(conn, id, status, &now)?;

    if status.is_terminal() {
        queries::set_car_status(conn, booking.car_id, CarStatus::Available)?;
        tracing::info!(booking_id = id, car_id = booking.car_id, "car released");
    }

    booking.status = status;
    booking.updated_at = now;

    tracing::info!(
        booking_id = id,
        from = previous.as_str(),
        to = status.as_str(),
        "booking status changed"
    );
    Ok(booking)
}
