//! 数据库连接与仓储实现

use domain::RepositoryError;
use sqlx::{Pool, Postgres};

pub mod repositories;

pub type DbPool = Pool<Postgres>;

pub async fn create_pg_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// sqlx 错误到仓储错误的统一映射。唯一约束冲突单独成类，
/// 供上层把并发写裁决为业务冲突。
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => RepositoryError::Conflict,
        _ => RepositoryError::storage(err.to_string()),
    }
}
