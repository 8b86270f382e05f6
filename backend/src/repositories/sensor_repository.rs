use crate::models::OccupancyEvent;
use crate::repositories::{duration_since, SensorTransition};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Result as SqlxResult};

/// Repository for sensors and their occupancy events
pub struct SensorRepository {
    pool: PgPool,
}

impl SensorRepository {
    /// Create a new SensorRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stored occupancy for a spot's sensor, if the spot has one
    pub async fn find_occupancy(&self, spot_id: i32) -> SqlxResult<Option<bool>> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT is_occupied
            FROM sensors
            WHERE spot_id = $1
            "#,
        )
        .bind(spot_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Events for a spot within the trailing window, newest first
    pub async fn find_recent_events(
        &self,
        spot_id: i32,
        window_minutes: i64,
        limit: i64,
    ) -> SqlxResult<Vec<OccupancyEvent>> {
        sqlx::query_as::<_, OccupancyEvent>(
            r#"
            SELECT id, spot_id, is_occupied, event_time, duration_minutes
            FROM sensor_events
            WHERE spot_id = $1
                AND event_time > NOW() - ($2::BIGINT * INTERVAL '1 minute')
            ORDER BY event_time DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(spot_id)
        .bind(window_minutes)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Store a sensor reading and, when occupancy flipped, append the
    /// transition event. Runs in one transaction with the sensor row locked
    /// so concurrent readings for the same spot serialize.
    pub async fn apply_reading(
        &self,
        spot_id: i32,
        is_occupied: bool,
        at: DateTime<Utc>,
    ) -> SqlxResult<Option<SensorTransition>> {
        let mut tx = self.pool.begin().await?;

        let sensor = sqlx::query_as::<_, (i32, bool)>(
            r#"
            SELECT id, is_occupied
            FROM sensors
            WHERE spot_id = $1
            FOR UPDATE
            "#,
        )
        .bind(spot_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((sensor_id, was_occupied)) = sensor else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE sensors
            SET is_occupied = $1, last_update = $2
            WHERE id = $3
            "#,
        )
        .bind(is_occupied)
        .bind(at)
        .bind(sensor_id)
        .execute(&mut *tx)
        .await?;

        let event = if was_occupied != is_occupied {
            let previous = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
                r#"
                SELECT MAX(event_time)
                FROM sensor_events
                WHERE spot_id = $1
                "#,
            )
            .bind(spot_id)
            .fetch_one(&mut *tx)
            .await?;

            let event = sqlx::query_as::<_, OccupancyEvent>(
                r#"
                INSERT INTO sensor_events (sensor_id, spot_id, is_occupied, duration_minutes, event_time)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, spot_id, is_occupied, event_time, duration_minutes
                "#,
            )
            .bind(sensor_id)
            .bind(spot_id)
            .bind(is_occupied)
            .bind(previous.and_then(|prev| duration_since(prev, at)))
            .bind(at)
            .fetch_one(&mut *tx)
            .await?;

            Some(event)
        } else {
            None
        };

        tx.commit().await?;

        Ok(Some(SensorTransition {
            spot_id,
            was_occupied,
            is_occupied,
            event,
        }))
    }
}
