use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub category_id: i64,
    pub brand: String,
    pub model: String,
    pub image_url: Option<String>,
    pub status: CarStatus,
}

/// Rental state of a car. A car in `Rented` is held by exactly one
/// non-terminal booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    Available,
    Rented,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "available",
            CarStatus::Rented => "rented",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "available" => Some(CarStatus::Available),
            "rented" => Some(CarStatus::Rented),
            _ => None,
        }
    }
}
