use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A spot switching to occupied or free. Rows are append-only and are
/// read back newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyEvent {
    pub id: i64,
    pub spot_id: i32,
    pub is_occupied: bool,
    pub event_time: DateTime<Utc>,
    /// Minutes the previous state lasted, when known
    pub duration_minutes: Option<i32>,
}

impl OccupancyEvent {
    /// 1.0 for occupied, 0.0 for free
    pub fn occupancy_value(&self) -> f64 {
        if self.is_occupied {
            1.0
        } else {
            0.0
        }
    }
}
