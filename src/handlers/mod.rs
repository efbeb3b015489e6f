pub mod admin;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod health;
pub mod payments;
pub mod pricing;
pub mod response;
pub mod validated_json;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/categories/:id", get(catalog::get_category))
        .route("/api/cars", get(catalog::list_cars))
        .route("/api/cars/:id", get(catalog::get_car))
        .route(
            "/api/pricing/category/:category_id",
            get(pricing::plans_for_category),
        )
        .route("/api/pricing/calculate", get(pricing::calculate))
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route("/api/bookings/user/:user_id", get(bookings::user_bookings))
        .route("/api/bookings/:id/cancel", put(bookings::cancel_booking))
        .route("/api/payments/process", post(payments::process_payment))
        .route(
            "/api/payments/booking/:booking_id",
            get(payments::payment_for_booking),
        )
        .route(
            "/api/payments/transaction/:transaction_id",
            get(payments::payment_by_transaction),
        )
        .route("/api/admin/bookings", get(admin::list_bookings))
        .route(
            "/api/admin/bookings/:id/complete",
            put(admin::complete_booking),
        )
        .route(
            "/api/admin/bookings/:id/confirm",
            put(admin::confirm_booking),
        )
        .route("/api/admin/cars/:id/status", put(admin::set_car_status))
        .route(
            "/api/admin/pricing",
            post(admin::create_plan).put(admin::update_plan_price),
        )
        .route("/api/admin/pricing/:id", delete(admin::deactivate_plan))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
