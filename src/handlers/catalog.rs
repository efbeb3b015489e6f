use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::response::ApiResponse;
use crate::errors::AppError;
use crate::models::{Car, Category};
use crate::services::catalog;
use crate::state::AppState;

// GET /api/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    let categories = {
        let db = state.conn();
        catalog::categories(&db)?
    };
    Ok(Json(ApiResponse::success("Categories retrieved successfully", categories)))
}

// GET /api/categories/:id
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let category = {
        let db = state.conn();
        catalog::category(&db, id)?
    };
    Ok(Json(ApiResponse::success("Category retrieved successfully", category)))
}

#[derive(Debug, Deserialize)]
pub struct CarsQuery {
    pub category_id: Option<i64>,
    pub brand: Option<String>,
}

// GET /api/cars
pub async fn list_cars(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CarsQuery>,
) -> Result<Json<ApiResponse<Vec<Car>>>, AppError> {
    let cars = {
        let db = state.conn();
        match (query.category_id, query.brand.as_deref()) {
            (Some(category_id), _) => catalog::available_cars_in_category(&db, category_id)?,
            (None, Some(brand)) => catalog::available_cars_by_brand(&db, brand)?,
            (None, None) => catalog::available_cars(&db)?,
        }
    };
    Ok(Json(ApiResponse::success("Available cars retrieved successfully", cars)))
}

// GET /api/cars/:id
pub async fn get_car(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Car>>, AppError> {
    let car = {
        let db = state.conn();
        catalog::car(&db, id)?
    };
    Ok(Json(ApiResponse::success("Car retrieved successfully", car)))
}
