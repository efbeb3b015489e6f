use bcrypt::{hash, verify};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{NewUser, User, UserRole};

/// Fields collected at signup. The password is plaintext until hashed here.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

/// Registers a customer account. Emails are unique.
pub fn register(conn: &Connection, registration: &Registration, cost: u32) -> Result<User, AppError> {
    let email = registration.email.trim();

    if queries::email_exists(conn, email)? {
        tracing::warn!(email, "signup with registered email");
        return Err(AppError::Conflict(format!("Email already registered: {email}")));
    }

    let password_hash = hash_password(&registration.password, cost)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to hash password: {e}")))?;

    let id = queries::insert_user(
        conn,
        &NewUser {
            email: email.to_string(),
            password_hash,
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            phone_number: registration.phone_number.clone(),
            role: UserRole::Customer,
        },
    )?;

    tracing::info!(user_id = id, email, "user registered");
    find_user(conn, id)
}

/// Checks credentials. Unknown email and wrong password give the same error.
pub fn login(conn: &Connection, email: &str, password: &str) -> Result<User, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = queries::get_user_by_email(conn, email.trim())?.ok_or_else(invalid)?;

    let matches = verify_password(password, &user.password_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to verify password: {e}")))?;
    if !matches {
        tracing::warn!(user_id = user.id, "login with wrong password");
        return Err(invalid());
    }

    tracing::info!(user_id = user.id, "user logged in");
    Ok(user)
}

pub fn find_user(conn: &Connection, id: i64) -> Result<User, AppError> {
    queries::get_user(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("User not found with ID: {id}")))
}
