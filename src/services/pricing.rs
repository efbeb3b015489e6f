use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{PriceQuote, PricingPlan};

/// Upper bound for a monthly price. Keeps every term total well inside
/// `Decimal` range.
pub const MAX_PRICE_PER_MONTH: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn plan_not_found(category_id: i64, duration_months: u32, km_package: u32) -> AppError {
    AppError::NotFound(format!(
        "No pricing plan found for category: {category_id}, duration: {duration_months}, km: {km_package}"
    ))
}

/// Exact-match lookup of the active plan for a (category, duration, km) triple.
pub fn find_plan(
    conn: &Connection,
    category_id: i64,
    duration_months: u32,
    km_package: u32,
) -> Result<PricingPlan, AppError> {
    let plan = queries::find_active_plan(conn, category_id, duration_months, km_package)?;

    match plan {
        Some(plan) => {
            tracing::debug!(plan_id = plan.id, price_per_month = %plan.price_per_month, "pricing plan found");
            Ok(plan)
        }
        None => {
            tracing::warn!(category_id, duration_months, km_package, "no active pricing plan");
            Err(plan_not_found(category_id, duration_months, km_package))
        }
    }
}

pub fn calculate_total(
    conn: &Connection,
    category_id: i64,
    duration_months: u32,
    km_package: u32,
) -> Result<Decimal, AppError> {
    find_plan(conn, category_id, duration_months, km_package)?.total_for_term()
}

pub fn active_plans(conn: &Connection, category_id: i64) -> Result<Vec<PricingPlan>, AppError> {
    Ok(queries::list_active_plans(conn, category_id)?)
}

/// Price preview shown before booking.
pub fn quote(
    conn: &Connection,
    category_id: i64,
    duration_months: u32,
    km_package: u32,
) -> Result<PriceQuote, AppError> {
    let category = queries::get_category(conn, category_id)?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    let plan = find_plan(conn, category_id, duration_months, km_package)?;
    let total_amount = calculate_total(conn, category_id, duration_months, km_package)?;

    Ok(PriceQuote {
        category_id,
        category_name: category.name,
        duration_months,
        km_package,
        price_per_month: plan.price_per_month,
        total_amount,
    })
}

fn ensure_valid_price(price: Decimal) -> Result<(), AppError> {
    if price <= Decimal::ZERO {
        return Err(AppError::Validation(
            "price_per_month must be greater than zero".to_string(),
        ));
    }
    if price > MAX_PRICE_PER_MONTH {
        return Err(AppError::Validation(format!(
            "price_per_month must not exceed {MAX_PRICE_PER_MONTH}"
        )));
    }
    Ok(())
}

pub fn create_plan(
    conn: &Connection,
    category_id: i64,
    duration_months: u32,
    km_package: u32,
    price_per_month: Decimal,
) -> Result<PricingPlan, AppError> {
    ensure_valid_price(price_per_month)?;

    let tx = db::begin_immediate(conn)?;

    if queries::get_category(&tx, category_id)?.is_none() {
        return Err(AppError::NotFound(format!(
            "Category not found with ID: {category_id}"
        )));
    }
    if queries::find_active_plan(&tx, category_id, duration_months, km_package)?.is_some() {
        return Err(AppError::Conflict(format!(
            "An active pricing plan already exists for category: {category_id}, duration: {duration_months}, km: {km_package}"
        )));
    }

    let id = queries::insert_pricing_plan(&tx, category_id, duration_months, km_package, price_per_month)?;
    tx.commit()?;

    tracing::info!(plan_id = id, category_id, duration_months, km_package, %price_per_month, "pricing plan created");

    Ok(PricingPlan {
        id,
        category_id,
        duration_months,
        km_package,
        price_per_month,
        is_active: true,
    })
}

/// Changes the monthly price of the active plan for a triple. Bookings made
/// earlier keep the price they were created with.
pub fn update_plan_price(
    conn: &Connection,
    category_id: i64,
    duration_months: u32,
    km_package: u32,
    new_price_per_month: Decimal,
) -> Result<PricingPlan, AppError> {
    ensure_valid_price(new_price_per_month)?;

    let tx = db::begin_immediate(conn)?;
    let mut plan = find_plan(&tx, category_id, duration_months, km_package)?;
    let old_price = plan.price_per_month;

    queries::update_plan_price(&tx, plan.id, new_price_per_month)?;
    tx.commit()?;

    plan.price_per_month = new_price_per_month;
    tracing::info!(plan_id = plan.id, %old_price, new_price = %new_price_per_month, "pricing plan updated");
    Ok(plan)
}

/// Soft delete: the plan stays referenced by history but no longer matches lookups.
pub fn deactivate_plan(conn: &Connection, id: i64) -> Result<(), AppError> {
    if !queries::deactivate_plan(conn, id)? {
        return Err(AppError::NotFound(format!(
            "Pricing plan not found with ID: {id}"
        )));
    }
    tracing::info!(plan_id = id, "pricing plan deactivated");
    Ok(())
}
