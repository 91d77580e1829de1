//! 连接尝试仓储的 Postgres 实现

use domain::{AttemptRepository, ConnectionAttempt, RepositoryFuture, Timestamp};

use crate::db::{map_sqlx_err, DbPool};

pub struct PgAttemptRepository {
    pool: DbPool,
}

impl PgAttemptRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl AttemptRepository for PgAttemptRepository {
    fn record(&self, attempt: ConnectionAttempt) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO connection_attempts (ip, route, attempted_at) VALUES ($1, $2, $3)",
            )
            .bind(&attempt.ip)
            .bind(&attempt.route)
            .bind(attempt.attempted_at)
            .execute(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(())
        })
    }

    fn count_since(&self, ip: String, route: String, since: Timestamp) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM connection_attempts \
                 WHERE ip = $1 AND route = $2 AND attempted_at >= $3",
            )
            .bind(&ip)
            .bind(&route)
            .bind(since)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(count as u64)
        })
    }

    fn delete_older_than(&self, cutoff: Timestamp) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM connection_attempts WHERE attempted_at < $1")
                .bind(cutoff)
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(result.rows_affected())
        })
    }
}
