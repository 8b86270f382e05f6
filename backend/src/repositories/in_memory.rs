//! In-memory facts store.
//!
//! Implements the same traits as the PostgreSQL store over plain maps so the
//! engines can be exercised deterministically in tests and local runs.
//! Trailing windows are measured against the wall clock, like `NOW()` in SQL.

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{
    NewPricingSample, OccupancyEvent, PricingSample, SensorState, Spot, ZoneOccupancy,
};
use crate::repositories::{duration_since, FactsStore, SensorStore, SensorTransition};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct StoreData {
    spots: BTreeMap<i32, Spot>,
    sensors: HashMap<i32, SensorState>,
    events: Vec<OccupancyEvent>,
    /// (spot_id, created_at)
    reservations: Vec<(i32, DateTime<Utc>)>,
    pricing_samples: Vec<PricingSample>,
    next_event_id: i64,
    next_sample_id: i64,
    unavailable: bool,
    failing_spots: HashSet<i32>,
}

/// In-memory facts store
#[derive(Clone, Default)]
pub struct InMemoryFactsStore {
    data: Arc<RwLock<StoreData>>,
}

impl InMemoryFactsStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, StoreData>> {
        let data = self
            .data
            .read()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;
        if data.unavailable {
            return Err(RepositoryError::Unavailable("store offline".to_string()));
        }
        Ok(data)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, StoreData>> {
        let data = self
            .data
            .write()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;
        if data.unavailable {
            return Err(RepositoryError::Unavailable("store offline".to_string()));
        }
        Ok(data)
    }

    fn seed(&self) -> RwLockWriteGuard<'_, StoreData> {
        // Seeding helpers are setup code; a poisoned lock there is a test bug.
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ==================== Seeding ====================

    /// Add or replace a spot
    pub fn insert_spot(&self, spot: Spot) {
        self.seed().spots.insert(spot.id, spot);
    }

    /// Give a spot a sensor with the given occupancy
    pub fn install_sensor(&self, spot_id: i32, is_occupied: bool) {
        self.seed().sensors.insert(
            spot_id,
            SensorState {
                spot_id,
                is_occupied,
                last_update: Utc::now(),
            },
        );
    }

    /// Append an occupancy event with an explicit timestamp
    pub fn push_event(
        &self,
        spot_id: i32,
        is_occupied: bool,
        event_time: DateTime<Utc>,
        duration_minutes: Option<i32>,
    ) -> OccupancyEvent {
        let mut data = self.seed();
        data.next_event_id += 1;
        let event = OccupancyEvent {
            id: data.next_event_id,
            spot_id,
            is_occupied,
            event_time,
            duration_minutes,
        };
        data.events.push(event.clone());
        event
    }

    /// Record that a reservation for the spot was created at `created_at`
    pub fn record_reservation(&self, spot_id: i32, created_at: DateTime<Utc>) {
        self.seed().reservations.push((spot_id, created_at));
    }

    /// Add a pricing sample with an explicit timestamp
    pub fn insert_pricing_sample_at(&self, sample: NewPricingSample, recorded_at: DateTime<Utc>) {
        let mut data = self.seed();
        data.next_sample_id += 1;
        let row = PricingSample {
            id: data.next_sample_id,
            spot_id: sample.spot_id,
            price: sample.price,
            occupancy_rate: sample.occupancy_rate,
            time_of_day: sample.time_of_day,
            reason: sample.reason,
            recorded_at,
        };
        data.pricing_samples.push(row);
    }

    /// Make every call fail as if the backend were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.seed().unavailable = unavailable;
    }

    /// Make reads of one spot fail as if its rows were unreachable
    pub fn fail_spot(&self, spot_id: i32) {
        self.seed().failing_spots.insert(spot_id);
    }

    // ==================== Inspection ====================

    /// All pricing samples for a spot in insertion order
    pub fn pricing_samples(&self, spot_id: i32) -> Vec<PricingSample> {
        self.seed()
            .pricing_samples
            .iter()
            .filter(|s| s.spot_id == spot_id)
            .cloned()
            .collect()
    }

    /// All occupancy events for a spot in insertion order
    pub fn events(&self, spot_id: i32) -> Vec<OccupancyEvent> {
        self.seed()
            .events
            .iter()
            .filter(|e| e.spot_id == spot_id)
            .cloned()
            .collect()
    }
}

/// Start of a trailing window ending now; out-of-range windows are caller errors
fn window_start(
    length: Option<Duration>,
    unit: &str,
    amount: i64,
) -> RepositoryResult<DateTime<Utc>> {
    length
        .and_then(|length| Utc::now().checked_sub_signed(length))
        .ok_or_else(|| {
            RepositoryError::InvalidInput(format!("window of {} {} is out of range", amount, unit))
        })
}

#[async_trait]
impl FactsStore for InMemoryFactsStore {
    async fn get_spot(&self, spot_id: i32) -> RepositoryResult<Option<Spot>> {
        let data = self.read()?;
        if data.failing_spots.contains(&spot_id) {
            return Err(RepositoryError::Unavailable(format!(
                "spot {} unreachable",
                spot_id
            )));
        }
        Ok(data.spots.get(&spot_id).cloned())
    }

    async fn get_zone_occupancy(&self, zone: &str) -> RepositoryResult<ZoneOccupancy> {
        let data = self.read()?;
        let (total, occupied) = data
            .spots
            .values()
            .filter(|spot| spot.zone == zone)
            .filter_map(|spot| data.sensors.get(&spot.id))
            .fold((0i64, 0i64), |(total, occupied), sensor| {
                (total + 1, occupied + i64::from(sensor.is_occupied))
            });
        Ok(ZoneOccupancy::new(total, occupied))
    }

    async fn get_recent_reservation_count(
        &self,
        spot_id: i32,
        window_hours: i64,
    ) -> RepositoryResult<i64> {
        let data = self.read()?;
        let since = window_start(Duration::try_hours(window_hours), "hours", window_hours)?;
        let count = data
            .reservations
            .iter()
            .filter(|(id, created_at)| *id == spot_id && *created_at > since)
            .count();
        Ok(count as i64)
    }

    async fn append_pricing_sample(&self, sample: NewPricingSample) -> RepositoryResult<()> {
        let mut data = self.write()?;
        if !data.spots.contains_key(&sample.spot_id) {
            return Err(RepositoryError::InvalidInput(format!(
                "pricing sample references unknown spot {}",
                sample.spot_id
            )));
        }
        data.next_sample_id += 1;
        let row = PricingSample {
            id: data.next_sample_id,
            spot_id: sample.spot_id,
            price: sample.price,
            occupancy_rate: sample.occupancy_rate,
            time_of_day: sample.time_of_day,
            reason: sample.reason,
            recorded_at: Utc::now(),
        };
        data.pricing_samples.push(row);
        Ok(())
    }

    async fn get_pricing_samples(
        &self,
        spot_id: i32,
        hours_back: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<PricingSample>> {
        let data = self.read()?;
        let since = window_start(Duration::try_hours(hours_back), "hours", hours_back)?;
        let mut samples: Vec<PricingSample> = data
            .pricing_samples
            .iter()
            .filter(|s| s.spot_id == spot_id && s.recorded_at > since)
            .cloned()
            .collect();
        samples.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        samples.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(samples)
    }

    async fn get_recent_occupancy_events(
        &self,
        spot_id: i32,
        window_minutes: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<OccupancyEvent>> {
        let data = self.read()?;
        let since = window_start(
            Duration::try_minutes(window_minutes),
            "minutes",
            window_minutes,
        )?;
        let mut events: Vec<OccupancyEvent> = data
            .events
            .iter()
            .filter(|e| e.spot_id == spot_id && e.event_time > since)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.event_time.cmp(&a.event_time).then(b.id.cmp(&a.id)));
        events.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(events)
    }

    async fn get_current_occupancy(&self, spot_id: i32) -> RepositoryResult<bool> {
        let data = self.read()?;
        Ok(data
            .sensors
            .get(&spot_id)
            .map(|sensor| sensor.is_occupied)
            .unwrap_or(false))
    }

    async fn list_all_spot_ids(&self, limit: i64) -> RepositoryResult<Vec<i32>> {
        let data = self.read()?;
        Ok(data
            .spots
            .keys()
            .copied()
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        self.read().map(|_| ())
    }
}

#[async_trait]
impl SensorStore for InMemoryFactsStore {
    async fn apply_sensor_reading(
        &self,
        spot_id: i32,
        is_occupied: bool,
        at: DateTime<Utc>,
    ) -> RepositoryResult<Option<SensorTransition>> {
        let mut data = self.write()?;

        let Some(sensor) = data.sensors.get_mut(&spot_id) else {
            return Ok(None);
        };
        let was_occupied = sensor.is_occupied;
        sensor.is_occupied = is_occupied;
        sensor.last_update = at;

        let event = if was_occupied != is_occupied {
            let previous = data
                .events
                .iter()
                .filter(|e| e.spot_id == spot_id)
                .map(|e| e.event_time)
                .max();

            data.next_event_id += 1;
            let event = OccupancyEvent {
                id: data.next_event_id,
                spot_id,
                is_occupied,
                event_time: at,
                duration_minutes: previous.and_then(|prev| duration_since(prev, at)),
            };
            data.events.push(event.clone());
            Some(event)
        } else {
            None
        };

        Ok(Some(SensorTransition {
            spot_id,
            was_occupied,
            is_occupied,
            event,
        }))
    }
}
