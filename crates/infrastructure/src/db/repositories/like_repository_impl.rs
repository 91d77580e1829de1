//! 点赞仓储的 Postgres 实现
//!
//! 单表存 post 和 comment 两类目标，`target_kind` 判别。
//! (target_kind, target_id, user_id) 上的唯一索引是并发写的裁决点：
//! 写入一律走 `ON CONFLICT ... DO UPDATE`，不存在读后写竞态。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domain::{
    Like, LikeCounts, LikeRepository, LikeStatus, LikeTarget, RepositoryError, RepositoryFuture,
    UserId,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{map_sqlx_err, DbPool};

const SELECT_COLUMNS: &str = "target_kind, target_id, user_id, user_login, status, added_at";

#[derive(Debug, FromRow)]
struct LikeRecord {
    target_kind: String,
    target_id: Uuid,
    user_id: Uuid,
    user_login: String,
    status: String,
    added_at: DateTime<Utc>,
}

impl TryFrom<LikeRecord> for Like {
    type Error = RepositoryError;

    fn try_from(record: LikeRecord) -> Result<Self, Self::Error> {
        let target = match record.target_kind.as_str() {
            "post" => LikeTarget::Post,
            "comment" => LikeTarget::Comment,
            other => {
                return Err(RepositoryError::storage(format!(
                    "unknown like target kind: {other}"
                )))
            }
        };
        Ok(Like {
            target,
            target_id: record.target_id,
            user_id: UserId::from(record.user_id),
            user_login: record.user_login,
            status: parse_status(&record.status)?,
            added_at: record.added_at,
        })
    }
}

fn parse_status(value: &str) -> Result<LikeStatus, RepositoryError> {
    match value {
        "Like" => Ok(LikeStatus::Like),
        "Dislike" => Ok(LikeStatus::Dislike),
        other => Err(RepositoryError::storage(format!(
            "unknown like status: {other}"
        ))),
    }
}

pub struct PgLikeRepository {
    pool: DbPool,
}

impl PgLikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl LikeRepository for PgLikeRepository {
    fn find(
        &self,
        target: LikeTarget,
        target_id: Uuid,
        user_id: UserId,
    ) -> RepositoryFuture<Option<Like>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, LikeRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM likes \
                 WHERE target_kind = $1 AND target_id = $2 AND user_id = $3"
            ))
            .bind(target.as_str())
            .bind(target_id)
            .bind(Uuid::from(user_id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;
            record.map(Like::try_from).transpose()
        })
    }

    fn upsert(&self, like: Like) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query(
                r#"
                INSERT INTO likes (target_kind, target_id, user_id, user_login, status, added_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (target_kind, target_id, user_id)
                DO UPDATE SET status = EXCLUDED.status, added_at = EXCLUDED.added_at
                "#,
            )
            .bind(like.target.as_str())
            .bind(like.target_id)
            .bind(Uuid::from(like.user_id))
            .bind(&like.user_login)
            .bind(like.status.as_str())
            .bind(like.added_at)
            .execute(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(())
        })
    }

    fn remove(
        &self,
        target: LikeTarget,
        target_id: Uuid,
        user_id: UserId,
    ) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query(
                "DELETE FROM likes WHERE target_kind = $1 AND target_id = $2 AND user_id = $3",
            )
            .bind(target.as_str())
            .bind(target_id)
            .bind(Uuid::from(user_id))
            .execute(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn counts_many(
        &self,
        target: LikeTarget,
        target_ids: Vec<Uuid>,
    ) -> RepositoryFuture<HashMap<Uuid, LikeCounts>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            if target_ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows: Vec<(Uuid, i64, i64)> = sqlx::query_as(
                r#"
                SELECT target_id,
                       COUNT(*) FILTER (WHERE status = 'Like') AS likes,
                       COUNT(*) FILTER (WHERE status = 'Dislike') AS dislikes
                FROM likes
                WHERE target_kind = $1 AND target_id = ANY($2)
                GROUP BY target_id
                "#,
            )
            .bind(target.as_str())
            .bind(&target_ids)
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(rows
                .into_iter()
                .map(|(id, likes, dislikes)| {
                    (
                        id,
                        LikeCounts {
                            likes: likes as u64,
                            dislikes: dislikes as u64,
                        },
                    )
                })
                .collect())
        })
    }

    fn statuses_for_user(
        &self,
        target: LikeTarget,
        target_ids: Vec<Uuid>,
        user_id: UserId,
    ) -> RepositoryFuture<HashMap<Uuid, LikeStatus>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            if target_ids.is_empty() {
                return Ok(HashMap::new());
            }

            let rows: Vec<(Uuid, String)> = sqlx::query_as(
                "SELECT target_id, status FROM likes \
                 WHERE target_kind = $1 AND target_id = ANY($2) AND user_id = $3",
            )
            .bind(target.as_str())
            .bind(&target_ids)
            .bind(Uuid::from(user_id))
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            rows.into_iter()
                .map(|(id, status)| Ok((id, parse_status(&status)?)))
                .collect()
        })
    }

    fn newest_many(
        &self,
        target: LikeTarget,
        target_ids: Vec<Uuid>,
        limit: u32,
    ) -> RepositoryFuture<HashMap<Uuid, Vec<Like>>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            if target_ids.is_empty() {
                return Ok(HashMap::new());
            }

            // 每个目标各取最新 limit 条 Like，不含 Dislike
            let records = sqlx::query_as::<_, LikeRecord>(&format!(
                r#"
                SELECT {SELECT_COLUMNS} FROM (
                    SELECT {SELECT_COLUMNS},
                           ROW_NUMBER() OVER (PARTITION BY target_id ORDER BY added_at DESC) AS rn
                    FROM likes
                    WHERE target_kind = $1 AND target_id = ANY($2) AND status = 'Like'
                ) ranked
                WHERE rn <= $3
                ORDER BY added_at DESC
                "#,
            ))
            .bind(target.as_str())
            .bind(&target_ids)
            .bind(limit as i64)
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            let mut out: HashMap<Uuid, Vec<Like>> = HashMap::new();
            for record in records {
                let like = Like::try_from(record)?;
                out.entry(like.target_id).or_default().push(like);
            }
            Ok(out)
        })
    }
}
