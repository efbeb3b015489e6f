use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use car_rental::config::AppConfig;
use car_rental::db;
use car_rental::handlers;
use car_rental::state::AppState;

// ── Helpers ──

const ADMIN_TOKEN: &str = "test-token";

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_token: ADMIN_TOKEN.to_string(),
        seed_demo_data: true,
        db_busy_timeout: Duration::from_millis(1000),
        bcrypt_cost: 4,
    }
}

/// Fresh in-memory database with the demo catalog: categories 1-3
/// (sedan, SUV, luxury) and cars 1-4 in the sedan category.
fn test_state() -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    db::seed::seed_demo_data(&conn).unwrap();
    Arc::new(AppState::new(conn, test_config()))
}

async fn send(
    state: &Arc<AppState>,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = handlers::router(Arc::clone(state)).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    send(state, "GET", uri, None, None).await
}

async fn signup(state: &Arc<AppState>, email: &str) -> i64 {
    let (status, json) = send(
        state,
        "POST",
        "/api/auth/signup",
        Some(json!({
            "email": email,
            "password": "secret123",
            "first_name": "Asha",
            "last_name": "Rao",
            "phone_number": "+911234567890"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["id"].as_i64().unwrap()
}

fn booking_body(user_id: i64, car_id: i64) -> Value {
    json!({
        "user_id": user_id,
        "car_id": car_id,
        "category_id": 1,
        "duration_months": 3,
        "km_package": 1000,
        "start_date": "2024-02-01"
    })
}

async fn create_booking(state: &Arc<AppState>, user_id: i64, car_id: i64) -> Value {
    let (status, json) = send(
        state,
        "POST",
        "/api/bookings",
        Some(booking_body(user_id, car_id)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"].clone()
}

async fn car_status(state: &Arc<AppState>, car_id: i64) -> String {
    let (_, json) = get(state, &format!("/api/cars/{car_id}")).await;
    json["data"]["status"].as_str().unwrap().to_string()
}

// ── Health & Auth ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, json) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_signup_hides_password_hash() {
    let state = test_state();
    let (status, json) = send(
        &state,
        "POST",
        "/api/auth/signup",
        Some(json!({
            "email": "asha@example.com",
            "password": "secret123",
            "first_name": "Asha",
            "last_name": "Rao"
        })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["email"], "asha@example.com");
    assert_eq!(json["data"]["role"], "CUSTOMER");
    assert!(json["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let state = test_state();
    signup(&state, "asha@example.com").await;

    let (status, json) = send(
        &state,
        "POST",
        "/api/auth/signup",
        Some(json!({
            "email": "asha@example.com",
            "password": "another1",
            "first_name": "A",
            "last_name": "R"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "Email already registered: asha@example.com");
}

#[tokio::test]
async fn test_signup_validation() {
    let state = test_state();
    let (status, json) = send(
        &state,
        "POST",
        "/api/auth/signup",
        Some(json!({
            "email": "not-an-email",
            "password": "123",
            "first_name": "Asha",
            "last_name": "Rao"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("email"));
    assert!(message.contains("password"));
}

#[tokio::test]
async fn test_login() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;

    let (status, json) = send(
        &state,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "asha@example.com", "password": "secret123"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], user_id);

    let (status, json) = send(
        &state,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "asha@example.com", "password": "wrong-pass"})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid email or password");
}

// ── Catalog & Pricing ──

#[tokio::test]
async fn test_categories_and_cars() {
    let state = test_state();

    let (status, json) = get(&state, "/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let (status, json) = get(&state, "/api/categories/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["code"], "SEDAN_STANDARD");

    let (status, _) = get(&state, "/api/categories/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = get(&state, "/api/cars").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 12);

    let (_, json) = get(&state, "/api/cars?category_id=1").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 4);

    let (_, json) = get(&state, "/api/cars?brand=bmw").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let (status, _) = get(&state, "/api/cars/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pricing_calculate() {
    let state = test_state();

    let (status, json) = get(
        &state,
        "/api/pricing/calculate?category_id=1&duration_months=3&km_package=1000",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["category_name"], "Standard Sedan");
    assert_eq!(json["data"]["price_per_month"], "26000");
    assert_eq!(json["data"]["total_amount"], "78000");

    let (status, _) = get(
        &state,
        "/api/pricing/calculate?category_id=1&duration_months=12&km_package=1000",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&state, "/api/pricing/calculate?category_id=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pricing_plans_for_category() {
    let state = test_state();
    let (status, json) = get(&state, "/api/pricing/category/2").await;
    assert_eq!(status, StatusCode::OK);

    let plans = json["data"].as_array().unwrap();
    assert_eq!(plans.len(), 9);
    assert_eq!(plans[0]["duration_months"], 1);
    assert_eq!(plans[0]["km_package"], 500);
}

// ── Bookings ──

#[tokio::test]
async fn test_create_booking() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;

    let booking = create_booking(&state, user_id, 1).await;
    assert_eq!(booking["status"], "PENDING");
    assert_eq!(booking["price_per_month"], "26000");
    assert_eq!(booking["total_amount"], "78000");
    assert_eq!(booking["start_date"], "2024-02-01");
    assert_eq!(booking["end_date"], "2024-05-01");
    assert_eq!(car_status(&state, 1).await, "RENTED");

    let (_, json) = get(&state, "/api/cars?category_id=1").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let id = booking["id"].as_i64().unwrap();
    let (status, json) = get(&state, &format!("/api/bookings/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["car_id"], 1);

    let (_, json) = get(&state, &format!("/api/bookings/user/{user_id}")).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_booking_rented_car_conflicts() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;
    create_booking(&state, user_id, 1).await;

    let (status, json) = send(
        &state,
        "POST",
        "/api/bookings",
        Some(booking_body(user_id, 1)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], "Car is not available for booking");

    let (_, json) = get(&state, &format!("/api/bookings/user/{user_id}")).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_booking_missing_fields() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;

    let (status, json) = send(
        &state,
        "POST",
        "/api/bookings",
        Some(json!({"user_id": user_id, "car_id": 1})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "All fields are required");
    assert_eq!(car_status(&state, 1).await, "AVAILABLE");
}

#[tokio::test]
async fn test_booking_zero_duration_rejected() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;

    let mut body = booking_body(user_id, 1);
    body["duration_months"] = json!(0);
    let (status, _) = send(&state, "POST", "/api/bookings", Some(body), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_unknown_user_and_plan() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;

    let (status, json) = send(
        &state,
        "POST",
        "/api/bookings",
        Some(booking_body(999, 1)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "User not found with ID: 999");

    let mut body = booking_body(user_id, 1);
    body["km_package"] = json!(1500);
    let (status, _) = send(&state, "POST", "/api/bookings", Some(body), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(car_status(&state, 1).await, "AVAILABLE");
}

#[tokio::test]
async fn test_cancel_releases_car() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;
    let booking = create_booking(&state, user_id, 2).await;
    let id = booking["id"].as_i64().unwrap();

    let (status, json) = send(&state, "PUT", &format!("/api/bookings/{id}/cancel"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "CANCELLED");
    assert_eq!(car_status(&state, 2).await, "AVAILABLE");

    let (status, _) = send(&state, "PUT", "/api/bookings/999/cancel", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_price_change_does_not_touch_existing_booking() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;
    let booking = create_booking(&state, user_id, 1).await;
    let id = booking["id"].as_i64().unwrap();

    let (status, _) = send(
        &state,
        "PUT",
        "/api/admin/pricing",
        Some(json!({
            "category_id": 1,
            "duration_months": 3,
            "km_package": 1000,
            "price_per_month": "30000"
        })),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = get(&state, &format!("/api/bookings/{id}")).await;
    assert_eq!(json["data"]["price_per_month"], "26000");
    assert_eq!(json["data"]["total_amount"], "78000");

    let second = create_booking(&state, user_id, 3).await;
    assert_eq!(second["total_amount"], "90000");
}

// ── Payments ──

#[tokio::test]
async fn test_payment_success_confirms_booking() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;
    let booking = create_booking(&state, user_id, 1).await;
    let id = booking["id"].as_i64().unwrap();

    let (status, json) = send(
        &state,
        "POST",
        "/api/payments/process",
        Some(json!({"booking_id": id, "mock_success": true})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "SUCCESS");
    assert_eq!(json["data"]["amount"], "78000");
    let txn = json["data"]["transaction_id"].as_str().unwrap().to_string();
    assert!(txn.starts_with("Txn-"));

    let (_, json) = get(&state, &format!("/api/bookings/{id}")).await;
    assert_eq!(json["data"]["status"], "CONFIRMED");

    let (status, json) = get(&state, &format!("/api/payments/booking/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["transaction_id"], txn);

    let (status, json) = get(&state, &format!("/api/payments/transaction/{txn}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["booking_id"], id);
}

#[tokio::test]
async fn test_payment_failure_keeps_booking_pending() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;
    let booking = create_booking(&state, user_id, 1).await;
    let id = booking["id"].as_i64().unwrap();

    let (status, json) = send(
        &state,
        "POST",
        "/api/payments/process",
        Some(json!({"booking_id": id})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Payment failed");
    assert_eq!(json["data"]["status"], "FAILED");
    assert!(json["data"]["transaction_id"]
        .as_str()
        .unwrap()
        .starts_with("Failed-"));

    let (_, json) = get(&state, &format!("/api/bookings/{id}")).await;
    assert_eq!(json["data"]["status"], "PENDING");
    assert_eq!(car_status(&state, 1).await, "RENTED");
}

#[tokio::test]
async fn test_duplicate_payment_conflicts() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;
    let booking = create_booking(&state, user_id, 1).await;
    let id = booking["id"].as_i64().unwrap();

    let body = json!({"booking_id": id, "mock_success": true});
    let (status, _) = send(&state, "POST", "/api/payments/process", Some(body.clone()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&state, "POST", "/api/payments/process", Some(body), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["message"], format!("Payment already exists for booking ID: {id}"));
}

#[tokio::test]
async fn test_payment_unknown_booking() {
    let state = test_state();
    let (status, _) = send(
        &state,
        "POST",
        "/api/payments/process",
        Some(json!({"booking_id": 404, "mock_success": true})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&state, "/api/payments/booking/404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Admin API ──

#[tokio::test]
async fn test_admin_requires_auth() {
    let state = test_state();

    let (status, _) = send(&state, "GET", "/api/admin/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&state, "GET", "/api/admin/bookings", None, Some("wrong-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&state, "DELETE", "/api/admin/pricing/1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_booking_lifecycle() {
    let state = test_state();
    let user_id = signup(&state, "asha@example.com").await;
    let first = create_booking(&state, user_id, 1).await["id"].as_i64().unwrap();
    let second = create_booking(&state, user_id, 2).await["id"].as_i64().unwrap();

    let (status, json) = send(
        &state,
        "PUT",
        &format!("/api/admin/bookings/{first}/confirm"),
        None,
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "CONFIRMED");

    let (_, json) = send(
        &state,
        "GET",
        "/api/admin/bookings?status=pending",
        None,
        Some(ADMIN_TOKEN),
    )
    .await;
    let pending = json["data"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["id"], second);

    let (status, json) = send(
        &state,
        "PUT",
        &format!("/api/admin/bookings/{first}/complete"),
        None,
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "COMPLETED");
    assert_eq!(car_status(&state, 1).await, "AVAILABLE");

    let (_, json) = send(&state, "GET", "/api/admin/bookings", None, Some(ADMIN_TOKEN)).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &state,
        "GET",
        "/api/admin/bookings?status=bogus",
        None,
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_car_status() {
    let state = test_state();

    let (status, json) = send(
        &state,
        "PUT",
        "/api/admin/cars/5/status",
        Some(json!({"status": "RENTED"})),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "RENTED");

    let (_, json) = get(&state, "/api/cars?category_id=2").await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let (status, _) = send(
        &state,
        "PUT",
        "/api/admin/cars/5/status",
        Some(json!({"status": "SCRAPPED"})),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_plan_management() {
    let state = test_state();

    let plan = json!({
        "category_id": 1,
        "duration_months": 12,
        "km_package": 1000,
        "price_per_month": "20000"
    });
    let (status, json) = send(
        &state,
        "POST",
        "/api/admin/pricing",
        Some(plan.clone()),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let plan_id = json["data"]["id"].as_i64().unwrap();

    let (status, _) = send(&state, "POST", "/api/admin/pricing", Some(plan), Some(ADMIN_TOKEN)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, json) = get(
        &state,
        "/api/pricing/calculate?category_id=1&duration_months=12&km_package=1000",
    )
    .await;
    assert_eq!(json["data"]["total_amount"], "240000");

    let (status, _) = send(
        &state,
        "DELETE",
        &format!("/api/admin/pricing/{plan_id}"),
        None,
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(
        &state,
        "/api/pricing/calculate?category_id=1&duration_months=12&km_package=1000",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_plan_price_rejected_and_service_keeps_running() {
    let state = test_state();

    let (status, json) = send(
        &state,
        "POST",
        "/api/admin/pricing",
        Some(json!({
            "category_id": 1,
            "duration_months": 3,
            "km_package": 777,
            "price_per_month": "50000000000000000000000000000"
        })),
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, _) = get(
        &state,
        "/api/pricing/calculate?category_id=1&duration_months=3&km_package=777",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = get(&state, "/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_requests_served_after_a_handler_panic() {
    let state = test_state();

    let poisoner = Arc::clone(&state);
    let joined = std::thread::spawn(move || {
        let _db = poisoner.conn();
        panic!("panic while holding the connection");
    })
    .join();
    assert!(joined.is_err());

    let (status, json) = get(&state, "/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 3);

    let user_id = signup(&state, "after-panic@example.com").await;
    create_booking(&state, user_id, 1).await;
}
