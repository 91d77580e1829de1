//! 仓储接口的 Postgres 实现
//!
//! 每个实现持有连接池的克隆，方法体把池移入 `Box::pin` 的 future。
//! 排序字段一律经白名单映射到列名，杜绝 SQL 注入。

mod attempt_repository_impl;
mod blog_repository_impl;
mod comment_repository_impl;
mod like_repository_impl;
mod maintenance_repository_impl;
mod post_repository_impl;
mod session_repository_impl;
mod user_repository_impl;

pub use attempt_repository_impl::PgAttemptRepository;
pub use blog_repository_impl::PgBlogRepository;
pub use comment_repository_impl::PgCommentRepository;
pub use like_repository_impl::PgLikeRepository;
pub use maintenance_repository_impl::PgMaintenanceRepository;
pub use post_repository_impl::PgPostRepository;
pub use session_repository_impl::PgSessionRepository;
pub use user_repository_impl::PgUserRepository;

use domain::{SortConfig, SortDirection};

/// 把对外的排序字段名映射为列名并拼出 ORDER BY 子句。
/// 未知字段回退到 created_at。
pub(crate) fn order_clause(sort: &SortConfig, allowed: &[(&str, &str)]) -> String {
    let column = allowed
        .iter()
        .find(|(api_name, _)| *api_name == sort.field)
        .map(|(_, column)| *column)
        .unwrap_or("created_at");
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    format!("ORDER BY {column} {direction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_field_falls_back_to_created_at() {
        let allowed = [("createdAt", "created_at"), ("name", "name")];

        let sort = SortConfig::new("name", SortDirection::Asc);
        assert_eq!(order_clause(&sort, &allowed), "ORDER BY name ASC");

        // 注入尝试走默认列
        let sort = SortConfig::new("name; DROP TABLE users", SortDirection::Desc);
        assert_eq!(order_clause(&sort, &allowed), "ORDER BY created_at DESC");
    }
}
