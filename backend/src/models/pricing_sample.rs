use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted pricing history row, one per price computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PricingSample {
    pub id: i64,
    pub spot_id: i32,
    pub price: Decimal,
    /// Zone occupancy at computation time, 0..=100
    pub occupancy_rate: i32,
    /// Hour of day, 0..=23
    pub time_of_day: i32,
    /// Applied factor names, comma separated
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

/// Insert payload for a pricing history row
#[derive(Debug, Clone, PartialEq)]
pub struct NewPricingSample {
    pub spot_id: i32,
    pub price: Decimal,
    pub occupancy_rate: i32,
    pub time_of_day: i32,
    pub reason: String,
}
