use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::notifications::{ParkingUpdate, UpdateBroadcaster};
use crate::repositories::SensorStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Result of ingesting one sensor reading
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub spot_id: i32,
    pub is_occupied: bool,
    pub changed: bool,
}

/// Ingests occupancy readings from sensors (or the simulator) and turns
/// state changes into occupancy events and live updates.
pub struct SensorService {
    store: Arc<dyn SensorStore>,
    broadcaster: Arc<UpdateBroadcaster>,
    clock: Arc<dyn Clock>,
}

impl SensorService {
    pub fn new(
        store: Arc<dyn SensorStore>,
        broadcaster: Arc<UpdateBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            broadcaster,
            clock,
        }
    }

    /// Store a reading for the spot's sensor
    pub async fn record_reading(&self, spot_id: i32, is_occupied: bool) -> AppResult<SensorReading> {
        let at = self.clock.now_utc();
        let transition = self
            .store
            .apply_sensor_reading(spot_id, is_occupied, at)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sensor not found for spot {}", spot_id)))?;

        let changed = transition.changed();
        if changed {
            info!(
                "Spot {} is now {}",
                spot_id,
                if is_occupied { "occupied" } else { "free" }
            );
            self.broadcaster.publish(ParkingUpdate::SensorUpdate {
                spot_id,
                is_occupied,
                timestamp: at,
            });
        }

        Ok(SensorReading {
            spot_id,
            is_occupied,
            changed,
        })
    }
}
