//! Facts store: the persistence contract consumed by the pricing and
//! prediction engines, with a PostgreSQL and an in-memory implementation.

pub mod in_memory;
pub mod pg_facts_store;
pub mod pricing_history_repository;
pub mod reservation_repository;
pub mod sensor_repository;
pub mod spot_repository;

// Re-export all repositories for convenient access
pub use in_memory::InMemoryFactsStore;
pub use pg_facts_store::PgFactsStore;
pub use pricing_history_repository::PricingHistoryRepository;
pub use reservation_repository::ReservationRepository;
pub use sensor_repository::SensorRepository;
pub use spot_repository::SpotRepository;

use crate::error::RepositoryResult;
use crate::models::{NewPricingSample, OccupancyEvent, PricingSample, Spot, ZoneOccupancy};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-mostly facts the engines price and predict from.
///
/// Every call is independent; implementations must be safe to call from
/// concurrently running computations.
#[async_trait]
pub trait FactsStore: Send + Sync {
    /// Spot by id, `None` when it does not exist
    async fn get_spot(&self, spot_id: i32) -> RepositoryResult<Option<Spot>>;

    /// Sensor totals for all spots in a zone
    async fn get_zone_occupancy(&self, zone: &str) -> RepositoryResult<ZoneOccupancy>;

    /// Reservations created for the spot in the trailing `window_hours`
    async fn get_recent_reservation_count(
        &self,
        spot_id: i32,
        window_hours: i64,
    ) -> RepositoryResult<i64>;

    /// Append one pricing history row
    async fn append_pricing_sample(&self, sample: NewPricingSample) -> RepositoryResult<()>;

    /// Up to `limit` samples from the trailing `hours_back`, newest first
    async fn get_pricing_samples(
        &self,
        spot_id: i32,
        hours_back: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<PricingSample>>;

    /// Up to `limit` occupancy events from the trailing `window_minutes`, newest first
    async fn get_recent_occupancy_events(
        &self,
        spot_id: i32,
        window_minutes: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<OccupancyEvent>>;

    /// Current sensor occupancy; spots without a sensor read as free
    async fn get_current_occupancy(&self, spot_id: i32) -> RepositoryResult<bool>;

    /// Up to `limit` spot ids
    async fn list_all_spot_ids(&self, limit: i64) -> RepositoryResult<Vec<i32>>;

    /// Cheap liveness check
    async fn ping(&self) -> RepositoryResult<()>;
}

/// Write side used by sensor ingestion
#[async_trait]
pub trait SensorStore: Send + Sync {
    /// Record a reading for the spot's sensor at `at`. Returns `None` when the
    /// spot has no sensor. When the reading differs from the stored state an
    /// occupancy event is appended in the same atomic step.
    async fn apply_sensor_reading(
        &self,
        spot_id: i32,
        is_occupied: bool,
        at: DateTime<Utc>,
    ) -> RepositoryResult<Option<SensorTransition>>;
}

/// Outcome of applying one sensor reading
#[derive(Debug, Clone, PartialEq)]
pub struct SensorTransition {
    pub spot_id: i32,
    pub was_occupied: bool,
    pub is_occupied: bool,
    /// Appended event, present only when occupancy changed
    pub event: Option<OccupancyEvent>,
}

impl SensorTransition {
    pub fn changed(&self) -> bool {
        self.was_occupied != self.is_occupied
    }
}

/// Whole minutes between the previous transition and `at`; `None` if the
/// clock went backwards.
pub fn duration_since(previous: DateTime<Utc>, at: DateTime<Utc>) -> Option<i32> {
    let minutes = (at - previous).num_minutes();
    if minutes < 0 {
        return None;
    }
    i32::try_from(minutes).ok()
}
