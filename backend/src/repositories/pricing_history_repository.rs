use crate::models::{NewPricingSample, PricingSample};
use sqlx::{PgPool, Result as SqlxResult};

/// Repository for the append-only pricing history
pub struct PricingHistoryRepository {
    pool: PgPool,
}

impl PricingHistoryRepository {
    /// Create a new PricingHistoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one pricing sample
    pub async fn insert(&self, sample: &NewPricingSample) -> SqlxResult<PricingSample> {
        sqlx::query_as::<_, PricingSample>(
            r#"
            INSERT INTO pricing_history (spot_id, price, occupancy_rate, time_of_day, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, spot_id, price, occupancy_rate, time_of_day, reason, recorded_at
            "#,
        )
        .bind(sample.spot_id)
        .bind(sample.price)
        .bind(sample.occupancy_rate)
        .bind(sample.time_of_day)
        .bind(&sample.reason)
        .fetch_one(&self.pool)
        .await
    }

    /// Most recent samples for a spot within the trailing window, newest first
    pub async fn find_recent(
        &self,
        spot_id: i32,
        hours_back: i64,
        limit: i64,
    ) -> SqlxResult<Vec<PricingSample>> {
        sqlx::query_as::<_, PricingSample>(
            r#"
            SELECT id, spot_id, price, occupancy_rate, time_of_day, reason, recorded_at
            FROM pricing_history
            WHERE spot_id = $1
                AND recorded_at > NOW() - ($2::BIGINT * INTERVAL '1 hour')
            ORDER BY recorded_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(spot_id)
        .bind(hours_back)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
