//! 博客仓储的 Postgres 实现

use chrono::{DateTime, Utc};
use domain::{
    Blog, BlogId, BlogRepository, PaginatedResult, Pagination, RepositoryFuture, SortConfig,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{map_sqlx_err, DbPool};

use super::order_clause;

const SORTABLE_COLUMNS: &[(&str, &str)] = &[("createdAt", "created_at"), ("name", "name")];

const SELECT_COLUMNS: &str = "id, name, description, website_url, created_at, is_membership";

#[derive(Debug, FromRow)]
struct BlogRecord {
    id: Uuid,
    name: String,
    description: String,
    website_url: String,
    created_at: DateTime<Utc>,
    is_membership: bool,
}

impl From<BlogRecord> for Blog {
    fn from(record: BlogRecord) -> Self {
        Blog {
            id: BlogId::from(record.id),
            name: record.name,
            description: record.description,
            website_url: record.website_url,
            created_at: record.created_at,
            is_membership: record.is_membership,
        }
    }
}

pub struct PgBlogRepository {
    pool: DbPool,
}

impl PgBlogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl BlogRepository for PgBlogRepository {
    fn create(&self, blog: Blog) -> RepositoryFuture<Blog> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, BlogRecord>(&format!(
                r#"
                INSERT INTO blogs (id, name, description, website_url, created_at, is_membership)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {SELECT_COLUMNS}
                "#,
            ))
            .bind(Uuid::from(blog.id))
            .bind(&blog.name)
            .bind(&blog.description)
            .bind(&blog.website_url)
            .bind(blog.created_at)
            .bind(blog.is_membership)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.into())
        })
    }

    fn update(&self, blog: Blog) -> RepositoryFuture<Blog> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, BlogRecord>(&format!(
                r#"
                UPDATE blogs
                SET name = $2, description = $3, website_url = $4, is_membership = $5
                WHERE id = $1
                RETURNING {SELECT_COLUMNS}
                "#,
            ))
            .bind(Uuid::from(blog.id))
            .bind(&blog.name)
            .bind(&blog.description)
            .bind(&blog.website_url)
            .bind(blog.is_membership)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.into())
        })
    }

    fn delete(&self, id: BlogId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
                .bind(Uuid::from(id))
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn find_by_id(&self, id: BlogId) -> RepositoryFuture<Option<Blog>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, BlogRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM blogs WHERE id = $1"
            ))
            .bind(Uuid::from(id))
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(record.map(Blog::from))
        })
    }

    fn list(
        &self,
        name_term: Option<String>,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<Blog>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let where_clause = "WHERE ($1::text IS NULL OR name ILIKE $1)";
            let name_pattern = name_term.map(|term| format!("%{term}%"));

            let total_count: i64 =
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM blogs {where_clause}"))
                    .bind(&name_pattern)
                    .fetch_one(&pool)
                    .await
                    .map_err(map_sqlx_err)?;

            let order = order_clause(&sort, SORTABLE_COLUMNS);
            let records = sqlx::query_as::<_, BlogRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM blogs {where_clause} {order} LIMIT $2 OFFSET $3"
            ))
            .bind(&name_pattern)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            let blogs = records.into_iter().map(Blog::from).collect();
            Ok(PaginatedResult::new(blogs, total_count as u64, pagination))
        })
    }
}
