//! 评论仓储的 Postgres 实现

use chrono::{DateTime, Utc};
use domain::{
    Comment, CommentId, CommentRepository, LikeTarget, PaginatedResult, Pagination, PostId,
    RepositoryFuture, SortConfig, UserId,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{map_sqlx_err, DbPool};

use super::order_clause;

const SORTABLE_COLUMNS: &[(&str, &str)] = &[("createdAt", "created_at")];

const SELECT_COLUMNS: &str = "id, content, post_id, author_id, author_login, created_at";

#[derive(Debug, FromRow)]
struct CommentRecord {
    id: Uuid,
    content: String,
    post_id: Uuid,
    author_id: Uuid,
    author_login: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRecord> for Comment {
    fn from(record: CommentRecord) -> Self {
        Comment {
            id: CommentId::from(record.id),
            content: record.content,
            post_id: PostId::from(record.post_id),
            author_id: UserId::from(record.author_id),
            author_login: record.author_login,
            created_at: record.created_at,
        }
    }
}

pub struct PgCommentRepository {
    pool: DbPool,
}

impl PgCommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CommentRepository for PgCommentRepository {
    fn create(&self, comment: Comment) -> RepositoryFuture<Comment> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, CommentRecord>(&format!(
                r#"
                INSERT INTO comments (id, content, post_id, author_id, author_login, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {SELECT_COLUMNS}
                "#,
            ))
            .bind(Uuid::from(comment.id))
            .bind(&comment.content)
            .bind(Uuid::from(comment.post_id))
            .bind(Uuid::from(comment.author_id))
            .bind(&comment.author_login)
            .bind(comment.created_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.into())
        })
    }

    fn update(&self, comment: Comment) -> RepositoryFuture<Comment> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, CommentRecord>(&format!(
                "UPDATE comments SET content = $2 WHERE id = $1 RETURNING {SELECT_COLUMNS}"
            ))
            .bind(Uuid::from(comment.id))
            .bind(&comment.content)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.into())
        })
    }

    /// 点赞行没有指向评论的外键，删除评论时在同一事务里一并清理。
    fn delete(&self, id: CommentId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;
            sqlx::query("DELETE FROM likes WHERE target_kind = $1 AND target_id = $2")
                .bind(LikeTarget::Comment.as_str())
                .bind(Uuid::from(id))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            let result = sqlx::query("DELETE FROM comments WHERE id = $1")
                .bind(Uuid::from(id))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            tx.commit().await.map_err(map_sqlx_err)?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn find_by_id(&self, id: CommentId) -> RepositoryFuture<Option<Comment>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, CommentRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM comments WHERE id = $1"
            ))
            .bind(Uuid::from(id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.map(Comment::from))
        })
    }

    fn list_by_post(
        &self,
        post_id: PostId,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<Comment>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let total_count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1")
                    .bind(Uuid::from(post_id))
                    .fetch_one(&pool)
                    .await
                    .map_err(map_sqlx_err)?;

            let order = order_clause(&sort, SORTABLE_COLUMNS);
            let records = sqlx::query_as::<_, CommentRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM comments WHERE post_id = $1 {order} LIMIT $2 OFFSET $3"
            ))
            .bind(Uuid::from(post_id))
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            let comments = records.into_iter().map(Comment::from).collect();
            Ok(PaginatedResult::new(
                comments,
                total_count as u64,
                pagination,
            ))
        })
    }
}
