use sqlx::{PgPool, Result as SqlxResult};

/// Read access to reservations. Creating and settling reservations belongs
/// to the reservation workflow; pricing only needs recent demand.
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new ReservationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reservations created for a spot within the trailing window
    pub async fn count_recent(&self, spot_id: i32, window_hours: i64) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM reservations
            WHERE spot_id = $1
                AND created_at > NOW() - ($2::BIGINT * INTERVAL '1 hour')
            "#,
        )
        .bind(spot_id)
        .bind(window_hours)
        .fetch_one(&self.pool)
        .await
    }
}
