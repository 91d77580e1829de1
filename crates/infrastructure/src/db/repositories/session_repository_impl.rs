//! 设备会话仓储的 Postgres 实现

use chrono::{DateTime, Utc};
use domain::{
    DeviceId, DeviceSession, RepositoryFuture, SessionRepository, Timestamp, UserId,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{map_sqlx_err, DbPool};

const SELECT_COLUMNS: &str = "device_id, user_id, ip, device_name, last_active_at, expires_at";

#[derive(Debug, FromRow)]
struct SessionRecord {
    device_id: Uuid,
    user_id: Uuid,
    ip: String,
    device_name: String,
    last_active_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRecord> for DeviceSession {
    fn from(record: SessionRecord) -> Self {
        DeviceSession {
            device_id: DeviceId::from(record.device_id),
            user_id: UserId::from(record.user_id),
            ip: record.ip,
            device_name: record.device_name,
            last_active_at: record.last_active_at,
            expires_at: record.expires_at,
        }
    }
}

pub struct PgSessionRepository {
    pool: DbPool,
}

impl PgSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for PgSessionRepository {
    fn create(&self, session: DeviceSession) -> RepositoryFuture<DeviceSession> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SessionRecord>(&format!(
                r#"
                INSERT INTO sessions (device_id, user_id, ip, device_name, last_active_at, expires_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {SELECT_COLUMNS}
                "#,
            ))
            .bind(Uuid::from(session.device_id))
            .bind(Uuid::from(session.user_id))
            .bind(&session.ip)
            .bind(&session.device_name)
            .bind(session.last_active_at)
            .bind(session.expires_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.into())
        })
    }

    fn update(&self, session: DeviceSession) -> RepositoryFuture<DeviceSession> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SessionRecord>(&format!(
                r#"
                UPDATE sessions
                SET ip = $2, device_name = $3, last_active_at = $4, expires_at = $5
                WHERE device_id = $1
                RETURNING {SELECT_COLUMNS}
                "#,
            ))
            .bind(Uuid::from(session.device_id))
            .bind(&session.ip)
            .bind(&session.device_name)
            .bind(session.last_active_at)
            .bind(session.expires_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.into())
        })
    }

    fn delete(&self, device_id: DeviceId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM sessions WHERE device_id = $1")
                .bind(Uuid::from(device_id))
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn find_by_device(&self, device_id: DeviceId) -> RepositoryFuture<Option<DeviceSession>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, SessionRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM sessions WHERE device_id = $1"
            ))
            .bind(Uuid::from(device_id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.map(DeviceSession::from))
        })
    }

    fn list_by_user(&self, user_id: UserId) -> RepositoryFuture<Vec<DeviceSession>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, SessionRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY last_active_at ASC"
            ))
            .bind(Uuid::from(user_id))
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(records.into_iter().map(DeviceSession::from).collect())
        })
    }

    fn delete_others(&self, user_id: UserId, keep: DeviceId) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result =
                sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND device_id != $2")
                    .bind(Uuid::from(user_id))
                    .bind(Uuid::from(keep))
                    .execute(&pool)
                    .await
                    .map_err(map_sqlx_err)?;
            Ok(result.rows_affected())
        })
    }

    fn delete_expired(&self, now: Timestamp) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
                .bind(now)
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(result.rows_affected())
        })
    }
}
