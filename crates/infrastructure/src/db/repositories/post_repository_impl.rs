//! 帖子仓储的 Postgres 实现

use chrono::{DateTime, Utc};
use domain::{
    BlogId, LikeTarget, PaginatedResult, Pagination, Post, PostId, PostRepository,
    RepositoryFuture, SortConfig,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{map_sqlx_err, DbPool};

use super::order_clause;

const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("createdAt", "created_at"),
    ("title", "title"),
    ("blogName", "blog_name"),
];

const SELECT_COLUMNS: &str = "id, title, short_description, content, blog_id, blog_name, created_at";

#[derive(Debug, FromRow)]
struct PostRecord {
    id: Uuid,
    title: String,
    short_description: String,
    content: String,
    blog_id: Uuid,
    blog_name: String,
    created_at: DateTime<Utc>,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        Post {
            id: PostId::from(record.id),
            title: record.title,
            short_description: record.short_description,
            content: record.content,
            blog_id: BlogId::from(record.blog_id),
            blog_name: record.blog_name,
            created_at: record.created_at,
        }
    }
}

pub struct PgPostRepository {
    pool: DbPool,
}

impl PgPostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PostRepository for PgPostRepository {
    fn create(&self, post: Post) -> RepositoryFuture<Post> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, PostRecord>(&format!(
                r#"
                INSERT INTO posts (id, title, short_description, content, blog_id, blog_name, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {SELECT_COLUMNS}
                "#,
            ))
            .bind(Uuid::from(post.id))
            .bind(&post.title)
            .bind(&post.short_description)
            .bind(&post.content)
            .bind(Uuid::from(post.blog_id))
            .bind(&post.blog_name)
            .bind(post.created_at)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.into())
        })
    }

    fn update(&self, post: Post) -> RepositoryFuture<Post> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, PostRecord>(&format!(
                r#"
                UPDATE posts
                SET title = $2, short_description = $3, content = $4, blog_id = $5, blog_name = $6
                WHERE id = $1
                RETURNING {SELECT_COLUMNS}
                "#,
            ))
            .bind(Uuid::from(post.id))
            .bind(&post.title)
            .bind(&post.short_description)
            .bind(&post.content)
            .bind(Uuid::from(post.blog_id))
            .bind(&post.blog_name)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.into())
        })
    }

    /// 点赞表以 target_kind 判别，挂不了指向帖子/评论的外键，
    /// 删除目标时必须在同一事务里显式清理点赞行。
    fn delete(&self, id: PostId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;
            sqlx::query(
                r#"
                DELETE FROM likes WHERE target_kind = $1
                AND target_id IN (SELECT id FROM comments WHERE post_id = $2)
                "#,
            )
            .bind(LikeTarget::Comment.as_str())
            .bind(Uuid::from(id))
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            sqlx::query("DELETE FROM likes WHERE target_kind = $1 AND target_id = $2")
                .bind(LikeTarget::Post.as_str())
                .bind(Uuid::from(id))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            let result = sqlx::query("DELETE FROM posts WHERE id = $1")
                .bind(Uuid::from(id))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            tx.commit().await.map_err(map_sqlx_err)?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn delete_by_blog(&self, blog_id: BlogId) -> RepositoryFuture<u64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;
            sqlx::query(
                r#"
                DELETE FROM likes WHERE target_kind = $1
                AND target_id IN (
                    SELECT c.id FROM comments c
                    JOIN posts p ON c.post_id = p.id
                    WHERE p.blog_id = $2
                )
                "#,
            )
            .bind(LikeTarget::Comment.as_str())
            .bind(Uuid::from(blog_id))
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            sqlx::query(
                r#"
                DELETE FROM likes WHERE target_kind = $1
                AND target_id IN (SELECT id FROM posts WHERE blog_id = $2)
                "#,
            )
            .bind(LikeTarget::Post.as_str())
            .bind(Uuid::from(blog_id))
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            let result = sqlx::query("DELETE FROM posts WHERE blog_id = $1")
                .bind(Uuid::from(blog_id))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            tx.commit().await.map_err(map_sqlx_err)?;
            Ok(result.rows_affected())
        })
    }

    fn find_by_id(&self, id: PostId) -> RepositoryFuture<Option<Post>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, PostRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM posts WHERE id = $1"
            ))
            .bind(Uuid::from(id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.map(Post::from))
        })
    }

    fn list(
        &self,
        blog_id: Option<BlogId>,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<Post>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let where_clause = "WHERE ($1::uuid IS NULL OR blog_id = $1)";
            let blog_filter = blog_id.map(Uuid::from);

            let total_count: i64 =
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM posts {where_clause}"))
                    .bind(blog_filter)
                    .fetch_one(&pool)
                    .await
                    .map_err(map_sqlx_err)?;

            let order = order_clause(&sort, SORTABLE_COLUMNS);
            let records = sqlx::query_as::<_, PostRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM posts {where_clause} {order} LIMIT $2 OFFSET $3"
            ))
            .bind(blog_filter)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            let posts = records.into_iter().map(Post::from).collect();
            Ok(PaginatedResult::new(posts, total_count as u64, pagination))
        })
    }
}
