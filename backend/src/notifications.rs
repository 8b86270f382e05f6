use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Real-time update pushed to connected clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParkingUpdate {
    #[serde(rename = "sensor-update", rename_all = "camelCase")]
    SensorUpdate {
        spot_id: i32,
        is_occupied: bool,
        timestamp: DateTime<Utc>,
    },
}

impl ParkingUpdate {
    /// Subscription channel the update belongs to
    pub fn channel(&self) -> String {
        match self {
            ParkingUpdate::SensorUpdate { spot_id, .. } => format!("spot-{}", spot_id),
        }
    }
}

/// Fan-out sink for parking updates. Delivery to clients is the transport
/// layer's job; this only hands updates to whoever subscribed.
pub struct UpdateBroadcaster {
    tx: broadcast::Sender<ParkingUpdate>,
}

impl UpdateBroadcaster {
    /// Create a broadcaster buffering up to `capacity` undelivered updates
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ParkingUpdate> {
        self.tx.subscribe()
    }

    /// Publish an update; returns how many subscribers received it.
    /// Having no subscribers is not an error.
    pub fn publish(&self, update: ParkingUpdate) -> usize {
        let channel = update.channel();
        match self.tx.send(update) {
            Ok(receivers) => {
                debug!("Published update on {} to {} subscribers", channel, receivers);
                receivers
            }
            Err(_) => 0,
        }
    }
}

impl Default for UpdateBroadcaster {
    fn default() -> Self {
        Self::new(1000)
    }
}
