//! 测试辅助仓储：清空全部数据

use domain::{MaintenanceRepository, RepositoryFuture};

use crate::db::{map_sqlx_err, DbPool};

pub struct PgMaintenanceRepository {
    pool: DbPool,
}

impl PgMaintenanceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl MaintenanceRepository for PgMaintenanceRepository {
    fn wipe_all(&self) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            // TRUNCATE 一次清空全部表，外键依赖由 CASCADE 处理
            sqlx::query(
                "TRUNCATE TABLE likes, comments, posts, blogs, sessions, \
                 connection_attempts, users CASCADE",
            )
            .execute(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(())
        })
    }
}
