//! 仓储接口定义
//!
//! 内层定义接口，外层（infrastructure）实现接口。
//! 接口风格与分页/排序约定在所有聚合之间保持一致。

use std::collections::HashMap;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::attempt::ConnectionAttempt;
use crate::blog::Blog;
use crate::comment::Comment;
use crate::errors::RepositoryError;
use crate::like::{Like, LikeCounts, LikeStatus, LikeTarget};
use crate::post::Post;
use crate::session::DeviceSession;
use crate::user::User;
use crate::value_objects::{BlogId, CommentId, DeviceId, PostId, Timestamp, UserId};

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type RepositoryFuture<T> = BoxFuture<'static, RepositoryResult<T>>;

/// 分页参数（1 起始页码）。
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    pub fn limit(&self) -> u64 {
        self.page_size as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// 分页结果，`pages_count = ceil(total_count / page_size)`。
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub pages_count: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total_count: u64, pagination: Pagination) -> Self {
        let pages_count = total_count.div_ceil(pagination.page_size as u64) as u32;
        Self {
            items,
            total_count,
            page: pagination.page,
            page_size: pagination.page_size,
            pages_count,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            pages_count: self.pages_count,
        }
    }
}

/// 排序方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// 排序配置，默认 created_at 降序。
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub field: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self::new("createdAt", SortDirection::Desc)
    }
}

/// 用户列表过滤：登录名/邮箱大小写不敏感子串匹配，二者为“或”关系。
#[derive(Debug, Clone, Default)]
pub struct UserListFilter {
    pub login_term: Option<String>,
    pub email_term: Option<String>,
}

pub trait UserRepository: Send + Sync {
    fn create(&self, user: User) -> RepositoryFuture<User>;
    fn update(&self, user: User) -> RepositoryFuture<User>;
    fn delete(&self, id: UserId) -> RepositoryFuture<bool>;
    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>>;
    fn find_by_login(&self, login: &str) -> RepositoryFuture<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepositoryFuture<Option<User>>;
    fn find_by_confirmation_code(&self, code: Uuid) -> RepositoryFuture<Option<User>>;
    fn find_by_recovery_code(&self, code: Uuid) -> RepositoryFuture<Option<User>>;
    fn list(
        &self,
        filter: UserListFilter,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<User>>;
}

pub trait BlogRepository: Send + Sync {
    fn create(&self, blog: Blog) -> RepositoryFuture<Blog>;
    fn update(&self, blog: Blog) -> RepositoryFuture<Blog>;
    fn delete(&self, id: BlogId) -> RepositoryFuture<bool>;
    fn find_by_id(&self, id: BlogId) -> RepositoryFuture<Option<Blog>>;
    fn list(
        &self,
        name_term: Option<String>,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<Blog>>;
}

pub trait PostRepository: Send + Sync {
    fn create(&self, post: Post) -> RepositoryFuture<Post>;
    fn update(&self, post: Post) -> RepositoryFuture<Post>;
    fn delete(&self, id: PostId) -> RepositoryFuture<bool>;
    /// 删除博客下全部帖子（博客删除级联）。
    fn delete_by_blog(&self, blog_id: BlogId) -> RepositoryFuture<u64>;
    fn find_by_id(&self, id: PostId) -> RepositoryFuture<Option<Post>>;
    fn list(
        &self,
        blog_id: Option<BlogId>,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<Post>>;
}

pub trait CommentRepository: Send + Sync {
    fn create(&self, comment: Comment) -> RepositoryFuture<Comment>;
    fn update(&self, comment: Comment) -> RepositoryFuture<Comment>;
    fn delete(&self, id: CommentId) -> RepositoryFuture<bool>;
    fn find_by_id(&self, id: CommentId) -> RepositoryFuture<Option<Comment>>;
    fn list_by_post(
        &self,
        post_id: PostId,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<Comment>>;
}

pub trait LikeRepository: Send + Sync {
    fn find(
        &self,
        target: LikeTarget,
        target_id: Uuid,
        user_id: UserId,
    ) -> RepositoryFuture<Option<Like>>;
    /// 插入或替换 (用户, 目标) 的点赞记录，以唯一索引为准裁决并发写。
    fn upsert(&self, like: Like) -> RepositoryFuture<()>;
    fn remove(&self, target: LikeTarget, target_id: Uuid, user_id: UserId)
        -> RepositoryFuture<bool>;
    /// 批量查询 Like/Dislike 计数，缺失的目标返回零计数。
    fn counts_many(
        &self,
        target: LikeTarget,
        target_ids: Vec<Uuid>,
    ) -> RepositoryFuture<HashMap<Uuid, LikeCounts>>;
    /// 批量查询给定用户对目标们的状态，缺失即 None。
    fn statuses_for_user(
        &self,
        target: LikeTarget,
        target_ids: Vec<Uuid>,
        user_id: UserId,
    ) -> RepositoryFuture<HashMap<Uuid, LikeStatus>>;
    /// 批量查询最新的 Like（不含 Dislike），每个目标按 added_at 降序截断。
    fn newest_many(
        &self,
        target: LikeTarget,
        target_ids: Vec<Uuid>,
        limit: u32,
    ) -> RepositoryFuture<HashMap<Uuid, Vec<Like>>>;
}

pub trait SessionRepository: Send + Sync {
    fn create(&self, session: DeviceSession) -> RepositoryFuture<DeviceSession>;
    fn update(&self, session: DeviceSession) -> RepositoryFuture<DeviceSession>;
    fn delete(&self, device_id: DeviceId) -> RepositoryFuture<bool>;
    fn find_by_device(&self, device_id: DeviceId) -> RepositoryFuture<Option<DeviceSession>>;
    fn list_by_user(&self, user_id: UserId) -> RepositoryFuture<Vec<DeviceSession>>;
    /// 删除用户除指定设备外的全部会话。
    fn delete_others(&self, user_id: UserId, keep: DeviceId) -> RepositoryFuture<u64>;
    fn delete_expired(&self, now: Timestamp) -> RepositoryFuture<u64>;
}

pub trait AttemptRepository: Send + Sync {
    fn record(&self, attempt: ConnectionAttempt) -> RepositoryFuture<()>;
    fn count_since(&self, ip: String, route: String, since: Timestamp) -> RepositoryFuture<u64>;
    /// 删除窗口外的历史尝试记录，防止表无限增长。
    fn delete_older_than(&self, cutoff: Timestamp) -> RepositoryFuture<u64>;
}

/// 测试辅助：清空全部数据（DELETE /testing/all-data）。
pub trait MaintenanceRepository: Send + Sync {
    fn wipe_all(&self) -> RepositoryFuture<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_offset_and_limit() {
        let p = Pagination::new(3, 10);
        assert_eq!(p.offset(), 20);
        assert_eq!(p.limit(), 10);

        // 页码和页大小下限为 1
        let p = Pagination::new(0, 0);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 1);
    }

    #[test]
    fn pages_count_is_ceiling() {
        let cases = [
            (0u64, 10u32, 0u32),
            (1, 10, 1),
            (10, 10, 1),
            (11, 10, 2),
            (95, 10, 10),
            (101, 10, 11),
        ];
        for (total, page_size, expected) in cases {
            let result =
                PaginatedResult::<u8>::new(Vec::new(), total, Pagination::new(1, page_size));
            assert_eq!(result.pages_count, expected, "total={total}");
        }
    }
}
