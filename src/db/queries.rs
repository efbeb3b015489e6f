use std::str::FromStr;

use anyhow::{anyhow, Context};
use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::models::{
    Booking, BookingStatus, Car, CarStatus, Category, NewUser, Payment, PaymentStatus,
    PricingPlan, User, UserRole,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current UTC time truncated to the precision stored in the database.
pub fn now_timestamp() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid timestamp in database: {s}"))
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .with_context(|| format!("invalid date in database: {s}"))
}

fn parse_decimal(s: &str) -> anyhow::Result<Decimal> {
    Decimal::from_str(s).with_context(|| format!("invalid decimal in database: {s}"))
}

fn collect<T>(
    rows: impl Iterator<Item = rusqlite::Result<anyhow::Result<T>>>,
) -> anyhow::Result<Vec<T>> {
    let mut out = vec![];
    for row in rows {
        out.push(row??);
    }
    Ok(out)
}

// ── Users ──

pub fn insert_user(conn: &Connection, user: &NewUser) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO users (email, password_hash, first_name, last_name, phone_number, role)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.email,
            user.password_hash,
            user.first_name,
            user.last_name,
            user.phone_number,
            user.role.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, phone_number, role, created_at";

pub fn get_user(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    conn.query_row(&sql, params![id], |row| Ok(parse_user_row(row)))
        .optional()?
        .transpose()
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 COLLATE NOCASE");
    conn.query_row(&sql, params![email], |row| Ok(parse_user_row(row)))
        .optional()?
        .transpose()
}

pub fn email_exists(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE email = ?1 COLLATE NOCASE",
        params![email],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let role: String = row.get(6)?;
    let created_at: String = row.get(7)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        phone_number: row.get(5)?,
        role: UserRole::parse(&role),
        created_at: parse_timestamp(&created_at)?,
    })
}

// ── Categories ──

pub fn insert_category(
    conn: &Connection,
    code: &str,
    name: &str,
    description: Option<&str>,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO categories (code, name, description) VALUES (?1, ?2, ?3)",
        params![code, name, description],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count_categories(conn: &Connection) -> anyhow::Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
    Ok(count)
}

pub fn list_categories(conn: &Connection) -> anyhow::Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, code, name, description, created_at FROM categories ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_category_row(row)))?;
    collect(rows)
}

pub fn get_category(conn: &Connection, id: i64) -> anyhow::Result<Option<Category>> {
    conn.query_row(
        "SELECT id, code, name, description, created_at FROM categories WHERE id = ?1",
        params![id],
        |row| Ok(parse_category_row(row)),
    )
    .optional()?
    .transpose()
}

pub fn get_category_by_code(conn: &Connection, code: &str) -> anyhow::Result<Option<Category>> {
    conn.query_row(
        "SELECT id, code, name, description, created_at FROM categories WHERE code = ?1",
        params![code],
        |row| Ok(parse_category_row(row)),
    )
    .optional()?
    .transpose()
}

fn parse_category_row(row: &rusqlite::Row) -> anyhow::Result<Category> {
    let created_at: String = row.get(4)?;
    Ok(Category {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

// ── Cars ──

pub fn insert_car(
    conn: &Connection,
    category_id: i64,
    brand: &str,
    model: &str,
    image_url: Option<&str>,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO cars (category_id, brand, model, image_url, status) VALUES (?1, ?2, ?3, ?4, 'available')",
        params![category_id, brand, model, image_url],
    )?;
    Ok(conn.last_insert_rowid())
}

const CAR_COLUMNS: &str = "id, category_id, brand, model, image_url, status";

pub fn get_car(conn: &Connection, id: i64) -> anyhow::Result<Option<Car>> {
    let sql = format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = ?1");
    conn.query_row(&sql, params![id], |row| Ok(parse_car_row(row)))
        .optional()?
        .transpose()
}

pub fn list_cars_by_status(conn: &Connection, status: CarStatus) -> anyhow::Result<Vec<Car>> {
    let sql = format!("SELECT {CAR_COLUMNS} FROM cars WHERE status = ?1 ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![status.as_str()], |row| Ok(parse_car_row(row)))?;
    collect(rows)
}

pub fn list_cars_by_category_and_status(
    conn: &Connection,
    category_id: i64,
    status: CarStatus,
) -> anyhow::Result<Vec<Car>> {
    let sql = format!(
        "SELECT {CAR_COLUMNS} FROM cars WHERE category_id = ?1 AND status = ?2 ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![category_id, status.as_str()], |row| {
        Ok(parse_car_row(row))
    })?;
    collect(rows)
}

pub fn list_cars_by_brand_and_status(
    conn: &Connection,
    brand: &str,
    status: CarStatus,
) -> anyhow::Result<Vec<Car>> {
    let sql = format!(
        "SELECT {CAR_COLUMNS} FROM cars WHERE brand = ?1 COLLATE NOCASE AND status = ?2 ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![brand, status.as_str()], |row| Ok(parse_car_row(row)))?;
    collect(rows)
}

pub fn set_car_status(conn: &Connection, id: i64, status: CarStatus) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE cars SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

/// Flips an available car to rented. Returns false when the car was not
/// available at the time of the write, so a lost race is observable.
pub fn mark_car_rented_if_available(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE cars SET status = 'rented' WHERE id = ?1 AND status = 'available'",
        params![id],
    )?;
    Ok(count == 1)
}

fn parse_car_row(row: &rusqlite::Row) -> anyhow::Result<Car> {
    let status: String = row.get(5)?;
    Ok(Car {
        id: row.get(0)?,
        category_id: row.get(1)?,
        brand: row.get(2)?,
        model: row.get(3)?,
        image_url: row.get(4)?,
        status: CarStatus::parse(&status).ok_or_else(|| anyhow!("unknown car status: {status}"))?,
    })
}

// ── Pricing Plans ──

pub fn insert_pricing_plan(
    conn: &Connection,
    category_id: i64,
    duration_months: u32,
    km_package: u32,
    price_per_month: Decimal,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO pricing_plans (category_id, duration_months, km_package, price_per_month, is_active)
         VALUES (?1, ?2, ?3, ?4, 1)",
        params![category_id, duration_months, km_package, price_per_month.to_string()],
    )?;
    Ok(conn.last_insert_rowid())
}

const PLAN_COLUMNS: &str = "id, category_id, duration_months, km_package, price_per_month, is_active";

pub fn find_active_plan(
    conn: &Connection,
    category_id: i64,
    duration_months: u32,
    km_package: u32,
) -> anyhow::Result<Option<PricingPlan>> {
    let sql = format!(
        "SELECT {PLAN_COLUMNS} FROM pricing_plans
         WHERE category_id = ?1 AND duration_months = ?2 AND km_package = ?3 AND is_active = 1"
    );
    conn.query_row(&sql, params![category_id, duration_months, km_package], |row| {
        Ok(parse_plan_row(row))
    })
    .optional()?
    .transpose()
}

pub fn list_active_plans(conn: &Connection, category_id: i64) -> anyhow::Result<Vec<PricingPlan>> {
    let sql = format!(
        "SELECT {PLAN_COLUMNS} FROM pricing_plans
         WHERE category_id = ?1 AND is_active = 1
         ORDER BY duration_months ASC, km_package ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![category_id], |row| Ok(parse_plan_row(row)))?;
    collect(rows)
}

pub fn update_plan_price(conn: &Connection, id: i64, price_per_month: Decimal) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE pricing_plans SET price_per_month = ?1 WHERE id = ?2",
        params![price_per_month.to_string(), id],
    )?;
    Ok(count > 0)
}

pub fn deactivate_plan(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE pricing_plans SET is_active = 0 WHERE id = ?1",
        params![id],
    )?;
    Ok(count > 0)
}

fn parse_plan_row(row: &rusqlite::Row) -> anyhow::Result<PricingPlan> {
    let price: String = row.get(4)?;
    Ok(PricingPlan {
        id: row.get(0)?,
        category_id: row.get(1)?,
        duration_months: row.get(2)?,
        km_package: row.get(3)?,
        price_per_month: parse_decimal(&price)?,
        is_active: row.get(5)?,
    })
}

// ── Bookings ──

/// Inserts a booking row and returns the assigned id. `booking.id` is ignored.
pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO bookings (user_id, car_id, duration_months, km_package, price_per_month, total_amount,
                               start_date, end_date, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            booking.user_id,
            booking.car_id,
            booking.duration_months,
            booking.km_package,
            booking.price_per_month.to_string(),
            booking.total_amount.to_string(),
            booking.start_date.format(DATE_FORMAT).to_string(),
            booking.end_date.format(DATE_FORMAT).to_string(),
            booking.status.as_str(),
            format_timestamp(&booking.created_at),
            format_timestamp(&booking.updated_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const BOOKING_COLUMNS: &str = "id, user_id, car_id, duration_months, km_package, price_per_month, total_amount, \
                               start_date, end_date, status, created_at, updated_at";

pub fn get_booking(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    conn.query_row(&sql, params![id], |row| Ok(parse_booking_row(row)))
        .optional()?
        .transpose()
}

pub fn list_bookings_for_user(conn: &Connection, user_id: i64) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = ?1 ORDER BY created_at DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], |row| Ok(parse_booking_row(row)))?;
    collect(rows)
}

pub fn list_bookings_by_status(
    conn: &Connection,
    status: BookingStatus,
) -> anyhow::Result<Vec<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1 ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![status.as_str()], |row| Ok(parse_booking_row(row)))?;
    collect(rows)
}

pub fn list_all_bookings(
    conn: &Connection,
    status_filter: Option<BookingStatus>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match status_filter {
        Some(status) => (
            format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1 ORDER BY id DESC LIMIT ?2"),
            vec![
                Box::new(status.as_str()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(limit),
            ],
        ),
        None => (
            format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY id DESC LIMIT ?1"),
            vec![Box::new(limit) as Box<dyn rusqlite::types::ToSql>],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;
    collect(rows)
}

pub fn update_booking_status(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), format_timestamp(now), id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let price_per_month: String = row.get(5)?;
    let total_amount: String = row.get(6)?;
    let start_date: String = row.get(7)?;
    let end_date: String = row.get(8)?;
    let status: String = row.get(9)?;
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        car_id: row.get(2)?,
        duration_months: row.get(3)?,
        km_package: row.get(4)?,
        price_per_month: parse_decimal(&price_per_month)?,
        total_amount: parse_decimal(&total_amount)?,
        start_date: parse_date(&start_date)?,
        end_date: parse_date(&end_date)?,
        status: BookingStatus::parse(&status)
            .ok_or_else(|| anyhow!("unknown booking status: {status}"))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

// ── Payments ──

/// Inserts a payment row and returns the assigned id. `payment.id` is ignored.
pub fn insert_payment(conn: &Connection, payment: &Payment) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO payments (booking_id, amount, status, transaction_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            payment.booking_id,
            payment.amount.to_string(),
            payment.status.as_str(),
            payment.transaction_id,
            format_timestamp(&payment.created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn payment_exists_for_booking(conn: &Connection, booking_id: i64) -> anyhow::Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM payments WHERE booking_id = ?1",
        params![booking_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

const PAYMENT_COLUMNS: &str = "id, booking_id, amount, status, transaction_id, created_at";

pub fn get_payment_by_booking(conn: &Connection, booking_id: i64) -> anyhow::Result<Option<Payment>> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = ?1");
    conn.query_row(&sql, params![booking_id], |row| Ok(parse_payment_row(row)))
        .optional()?
        .transpose()
}

pub fn get_payment_by_transaction_id(
    conn: &Connection,
    transaction_id: &str,
) -> anyhow::Result<Option<Payment>> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE transaction_id = ?1");
    conn.query_row(&sql, params![transaction_id], |row| Ok(parse_payment_row(row)))
        .optional()?
        .transpose()
}

fn parse_payment_row(row: &rusqlite::Row) -> anyhow::Result<Payment> {
    let amount: String = row.get(2)?;
    let status: String = row.get(3)?;
    let created_at: String = row.get(5)?;

    Ok(Payment {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        amount: parse_decimal(&amount)?,
        status: PaymentStatus::parse(&status)
            .ok_or_else(|| anyhow!("unknown payment status: {status}"))?,
        transaction_id: row.get(4)?,
        created_at: parse_timestamp(&created_at)?,
    })
}
