use crate::models::{Spot, ZoneOccupancy};
use sqlx::{PgPool, Result as SqlxResult};

/// Repository for spot data access
pub struct SpotRepository {
    pool: PgPool,
}

impl SpotRepository {
    /// Create a new SpotRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a spot by id
    pub async fn find_by_id(&self, id: i32) -> SqlxResult<Option<Spot>> {
        sqlx::query_as::<_, Spot>(
            r#"
            SELECT id, name, latitude, longitude, zone, base_price
            FROM spots
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List spot ids in id order
    pub async fn list_ids(&self, limit: i64) -> SqlxResult<Vec<i32>> {
        sqlx::query_scalar::<_, i32>(
            r#"
            SELECT id
            FROM spots
            ORDER BY id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Count sensors and occupied sensors across a zone.
    /// Spots without a sensor row are not counted.
    pub async fn zone_occupancy(&self, zone: &str) -> SqlxResult<ZoneOccupancy> {
        let (total, occupied) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN s.is_occupied THEN 1 ELSE 0 END), 0)::BIGINT AS occupied
            FROM spots sp
            JOIN sensors s ON sp.id = s.spot_id
            WHERE sp.zone = $1
            "#,
        )
        .bind(zone)
        .fetch_one(&self.pool)
        .await?;

        Ok(ZoneOccupancy::new(total, occupied))
    }
}
