use crate::database::Database;
use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{NewPricingSample, OccupancyEvent, PricingSample, Spot, ZoneOccupancy};
use crate::repositories::{
    FactsStore, PricingHistoryRepository, ReservationRepository, SensorRepository,
    SensorStore, SensorTransition, SpotRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL-backed facts store
pub struct PgFactsStore {
    database: Database,
    spots: SpotRepository,
    sensors: SensorRepository,
    reservations: ReservationRepository,
    pricing_history: PricingHistoryRepository,
}

impl PgFactsStore {
    /// Create a store whose repositories share one pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            database: Database::new(pool.clone()),
            spots: SpotRepository::new(pool.clone()),
            sensors: SensorRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool.clone()),
            pricing_history: PricingHistoryRepository::new(pool),
        }
    }
}

#[async_trait]
impl FactsStore for PgFactsStore {
    async fn get_spot(&self, spot_id: i32) -> RepositoryResult<Option<Spot>> {
        Ok(self.spots.find_by_id(spot_id).await?)
    }

    async fn get_zone_occupancy(&self, zone: &str) -> RepositoryResult<ZoneOccupancy> {
        Ok(self.spots.zone_occupancy(zone).await?)
    }

    async fn get_recent_reservation_count(
        &self,
        spot_id: i32,
        window_hours: i64,
    ) -> RepositoryResult<i64> {
        Ok(self.reservations.count_recent(spot_id, window_hours).await?)
    }

    async fn append_pricing_sample(&self, sample: NewPricingSample) -> RepositoryResult<()> {
        self.pricing_history.insert(&sample).await?;
        Ok(())
    }

    async fn get_pricing_samples(
        &self,
        spot_id: i32,
        hours_back: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<PricingSample>> {
        Ok(self
            .pricing_history
            .find_recent(spot_id, hours_back, limit)
            .await?)
    }

    async fn get_recent_occupancy_events(
        &self,
        spot_id: i32,
        window_minutes: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<OccupancyEvent>> {
        Ok(self
            .sensors
            .find_recent_events(spot_id, window_minutes, limit)
            .await?)
    }

    async fn get_current_occupancy(&self, spot_id: i32) -> RepositoryResult<bool> {
        Ok(self.sensors.find_occupancy(spot_id).await?.unwrap_or(false))
    }

    async fn list_all_spot_ids(&self, limit: i64) -> RepositoryResult<Vec<i32>> {
        Ok(self.spots.list_ids(limit).await?)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        self.database
            .ping()
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl SensorStore for PgFactsStore {
    async fn apply_sensor_reading(
        &self,
        spot_id: i32,
        is_occupied: bool,
        at: DateTime<Utc>,
    ) -> RepositoryResult<Option<SensorTransition>> {
        Ok(self.sensors.apply_reading(spot_id, is_occupied, at).await?)
    }
}
