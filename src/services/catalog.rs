use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Car, CarStatus, Category};

pub fn categories(conn: &Connection) -> Result<Vec<Category>, AppError> {
    Ok(queries::list_categories(conn)?)
}

pub fn category(conn: &Connection, id: i64) -> Result<Category, AppError> {
    queries::get_category(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("Category not found with ID: {id}")))
}

pub fn category_by_code(conn: &Connection, code: &str) -> Result<Category, AppError> {
    queries::get_category_by_code(conn, code)?
        .ok_or_else(|| AppError::NotFound(format!("Category not found with code: {code}")))
}

pub fn available_cars(conn: &Connection) -> Result<Vec<Car>, AppError> {
    Ok(queries::list_cars_by_status(conn, CarStatus::Available)?)
}

pub fn available_cars_in_category(conn: &Connection, category_id: i64) -> Result<Vec<Car>, AppError> {
    Ok(queries::list_cars_by_category_and_status(
        conn,
        category_id,
        CarStatus::Available,
    )?)
}

pub fn available_cars_by_brand(conn: &Connection, brand: &str) -> Result<Vec<Car>, AppError> {
    Ok(queries::list_cars_by_brand_and_status(
        conn,
        brand,
        CarStatus::Available,
    )?)
}

pub fn car(conn: &Connection, id: i64) -> Result<Car, AppError> {
    queries::get_car(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("Car not found with ID: {id}")))
}

/// Manual status override. Does not touch bookings that hold the car.
pub fn set_car_status(conn: &Connection, id: i64, status: CarStatus) -> Result<Car, AppError> {
    if !queries::set_car_status(conn, id, status)? {
        return Err(AppError::NotFound(format!("Car not found with ID: {id}")));
    }
    tracing::info!(car_id = id, status = status.as_str(), "car status set");
    car(conn, id)
}
