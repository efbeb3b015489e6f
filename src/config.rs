use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub seed_demo_data: bool,
    pub db_busy_timeout: Duration,
    pub bcrypt_cost: u32,
}

/// Parses an optional raw value, falling back to `default` when unset.
/// A value that is set but does not parse is a configuration error.
fn parse_or<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("invalid value for {name}: {value:?}"))),
    }
}

fn parse_flag(name: &str, raw: Option<String>, default: bool) -> Result<bool, AppError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(AppError::Config(format!("invalid value for {name}: {v:?}"))),
        },
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let bcrypt_cost = parse_or("BCRYPT_COST", env::var("BCRYPT_COST").ok(), bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::Config(format!(
                "BCRYPT_COST must be between 4 and 31, got {bcrypt_cost}"
            )));
        }

        Ok(Self {
            port: parse_or("PORT", env::var("PORT").ok(), 8080)?,
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "car_rental.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            seed_demo_data: parse_flag("SEED_DEMO_DATA", env::var("SEED_DEMO_DATA").ok(), true)?,
            db_busy_timeout: Duration::from_millis(parse_or(
                "DB_BUSY_TIMEOUT_MS",
                env::var("DB_BUSY_TIMEOUT_MS").ok(),
                5000u64,
            )?),
            bcrypt_cost,
        })
    }
}
