//! 用户仓储的 Postgres 实现

use chrono::{DateTime, Utc};
use domain::{
    LikeTarget, Login, PaginatedResult, Pagination, PasswordHash, RepositoryError,
    RepositoryFuture, SortConfig, User, UserEmail, UserId, UserListFilter, UserRepository,
};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::{map_sqlx_err, DbPool};

use super::order_clause;

const SORTABLE_COLUMNS: &[(&str, &str)] = &[
    ("createdAt", "created_at"),
    ("login", "login"),
    ("email", "email"),
];

const SELECT_COLUMNS: &str = "id, login, email, password_hash, created_at, \
     confirmation_code, confirmation_expires_at, is_confirmed, recovery_code";

#[derive(Debug, FromRow)]
struct UserRecord {
    id: Uuid,
    login: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    confirmation_code: Option<Uuid>,
    confirmation_expires_at: Option<DateTime<Utc>>,
    is_confirmed: bool,
    recovery_code: Option<Uuid>,
}

impl TryFrom<UserRecord> for User {
    type Error = RepositoryError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        // 落库前已验证过，解析失败意味着数据损坏
        let corrupt = |err: domain::DomainError| RepositoryError::storage(err.to_string());
        Ok(User {
            id: UserId::from(record.id),
            login: Login::parse(record.login).map_err(corrupt)?,
            email: UserEmail::parse(record.email).map_err(corrupt)?,
            password: PasswordHash::new(record.password_hash).map_err(corrupt)?,
            created_at: record.created_at,
            confirmation_code: record.confirmation_code,
            confirmation_expires_at: record.confirmation_expires_at,
            is_confirmed: record.is_confirmed,
            recovery_code: record.recovery_code,
        })
    }
}

pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn create(&self, user: User) -> RepositoryFuture<User> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(&format!(
                r#"
                INSERT INTO users (id, login, email, password_hash, created_at,
                                   confirmation_code, confirmation_expires_at, is_confirmed, recovery_code)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING {SELECT_COLUMNS}
                "#,
            ))
            .bind(Uuid::from(user.id))
            .bind(user.login.as_str())
            .bind(user.email.as_str())
            .bind(user.password.as_str())
            .bind(user.created_at)
            .bind(user.confirmation_code)
            .bind(user.confirmation_expires_at)
            .bind(user.is_confirmed)
            .bind(user.recovery_code)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            User::try_from(record)
        })
    }

    fn update(&self, user: User) -> RepositoryFuture<User> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(&format!(
                r#"
                UPDATE users
                SET login = $2, email = $3, password_hash = $4,
                    confirmation_code = $5, confirmation_expires_at = $6,
                    is_confirmed = $7, recovery_code = $8
                WHERE id = $1
                RETURNING {SELECT_COLUMNS}
                "#,
            ))
            .bind(Uuid::from(user.id))
            .bind(user.login.as_str())
            .bind(user.email.as_str())
            .bind(user.password.as_str())
            .bind(user.confirmation_code)
            .bind(user.confirmation_expires_at)
            .bind(user.is_confirmed)
            .bind(user.recovery_code)
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            User::try_from(record)
        })
    }

    /// 用户本人的点赞、会话、评论走外键级联；
    /// 其评论收到的他人点赞没有外键可依赖，需显式清理。
    fn delete(&self, id: UserId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;
            sqlx::query(
                r#"
                DELETE FROM likes WHERE target_kind = $1
                AND target_id IN (SELECT id FROM comments WHERE author_id = $2)
                "#,
            )
            .bind(LikeTarget::Comment.as_str())
            .bind(Uuid::from(id))
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            let result = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(Uuid::from(id))
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            tx.commit().await.map_err(map_sqlx_err)?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        self.find_one("id = $1", Uuid::from(id))
    }

    fn find_by_login(&self, login: &str) -> RepositoryFuture<Option<User>> {
        self.find_one("login = $1", login.to_owned())
    }

    fn find_by_email(&self, email: &str) -> RepositoryFuture<Option<User>> {
        self.find_one("email = $1", email.to_owned())
    }

    fn find_by_confirmation_code(&self, code: Uuid) -> RepositoryFuture<Option<User>> {
        self.find_one("confirmation_code = $1", code)
    }

    fn find_by_recovery_code(&self, code: Uuid) -> RepositoryFuture<Option<User>> {
        self.find_one("recovery_code = $1", code)
    }

    fn list(
        &self,
        filter: UserListFilter,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            // 两个搜索条件同时给出时为“或”关系
            let where_clause = r#"
                WHERE ($1::text IS NULL AND $2::text IS NULL)
                   OR ($1::text IS NOT NULL AND login ILIKE $1)
                   OR ($2::text IS NOT NULL AND email ILIKE $2)
            "#;
            let login_pattern = filter.login_term.map(|term| format!("%{term}%"));
            let email_pattern = filter.email_term.map(|term| format!("%{term}%"));

            let total_count: i64 =
                sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {where_clause}"))
                    .bind(&login_pattern)
                    .bind(&email_pattern)
                    .fetch_one(&pool)
                    .await
                    .map_err(map_sqlx_err)?;

            let order = order_clause(&sort, SORTABLE_COLUMNS);
            let records = sqlx::query_as::<_, UserRecord>(&format!(
                "SELECT {SELECT_COLUMNS} FROM users {where_clause} {order} LIMIT $3 OFFSET $4"
            ))
            .bind(&login_pattern)
            .bind(&email_pattern)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            let users = records
                .into_iter()
                .map(User::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PaginatedResult::new(users, total_count as u64, pagination))
        })
    }
}

impl PgUserRepository {
    fn find_one<'q, T>(&self, condition: &str, value: T) -> RepositoryFuture<Option<User>>
    where
        T: sqlx::Type<sqlx::Postgres> + for<'a> sqlx::Encode<'a, sqlx::Postgres> + Send + 'static,
    {
        let pool = self.pool.clone();
        let query = format!("SELECT {SELECT_COLUMNS} FROM users WHERE {condition}");
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(&query)
                .bind(value)
                .fetch_optional(&pool)
                .await
                .map_err(map_sqlx_err)?;
            record.map(User::try_from).transpose()
        })
    }
}
