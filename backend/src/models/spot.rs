use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A parking spot. Only `base_price` changes over the spot's lifetime and
/// that is managed by administrators outside the pricing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub zone: String,
    pub base_price: Decimal, // NUMERIC(10, 2) in database
}

/// Sensor counts for every spot in a zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneOccupancy {
    pub total: i64,
    pub occupied: i64,
}

impl ZoneOccupancy {
    pub fn new(total: i64, occupied: i64) -> Self {
        Self { total, occupied }
    }

    /// Occupied share of the zone; 0 when no sensors report
    pub fn rate(&self) -> f64 {
        if self.total > 0 {
            self.occupied as f64 / self.total as f64
        } else {
            0.0
        }
    }

    /// Rate as a whole percentage, 0..=100
    pub fn percentage(&self) -> i32 {
        (self.rate() * 100.0).round() as i32
    }
}

/// Latest reported state of a spot's sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SensorState {
    pub spot_id: i32,
    pub is_occupied: bool,
    pub last_update: DateTime<Utc>,
}
