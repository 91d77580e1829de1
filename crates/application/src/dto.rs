//! 输出 DTO
//!
//! 领域实体到 API 响应体的整形。字段名遵循对外契约的 camelCase。

use domain::{
    Blog, Comment, DeviceSession, Like, LikeCounts, LikeStatus, PaginatedResult, Timestamp, User,
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub login: String,
    pub email: String,
    pub created_at: Timestamp,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.into(),
            login: user.login.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            created_at: user.created_at,
        }
    }
}

/// GET /auth/me 的响应体。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeView {
    pub email: String,
    pub login: String,
    pub user_id: Uuid,
}

impl From<&User> for MeView {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.as_str().to_owned(),
            login: user.login.as_str().to_owned(),
            user_id: user.id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub website_url: String,
    pub created_at: Timestamp,
    pub is_membership: bool,
}

impl From<&Blog> for BlogView {
    fn from(blog: &Blog) -> Self {
        Self {
            id: blog.id.into(),
            name: blog.name.clone(),
            description: blog.description.clone(),
            website_url: blog.website_url.clone(),
            created_at: blog.created_at,
            is_membership: blog.is_membership,
        }
    }
}

/// newestLikes 列表中的单条记录。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeDetailsView {
    pub added_at: Timestamp,
    pub user_id: Uuid,
    pub login: String,
}

impl From<&Like> for LikeDetailsView {
    fn from(like: &Like) -> Self {
        Self {
            added_at: like.added_at,
            user_id: like.user_id.into(),
            login: like.user_login.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedLikesInfoView {
    pub likes_count: u64,
    pub dislikes_count: u64,
    pub my_status: LikeStatus,
    pub newest_likes: Vec<LikeDetailsView>,
}

impl ExtendedLikesInfoView {
    pub fn new(counts: LikeCounts, my_status: LikeStatus, newest: &[Like]) -> Self {
        Self {
            likes_count: counts.likes,
            dislikes_count: counts.dislikes,
            my_status,
            newest_likes: newest.iter().map(LikeDetailsView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesInfoView {
    pub likes_count: u64,
    pub dislikes_count: u64,
    pub my_status: LikeStatus,
}

impl LikesInfoView {
    pub fn new(counts: LikeCounts, my_status: LikeStatus) -> Self {
        Self {
            likes_count: counts.likes,
            dislikes_count: counts.dislikes,
            my_status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub blog_id: Uuid,
    pub blog_name: String,
    pub created_at: Timestamp,
    pub extended_likes_info: ExtendedLikesInfoView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentatorInfoView {
    pub user_id: Uuid,
    pub user_login: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub commentator_info: CommentatorInfoView,
    pub created_at: Timestamp,
    pub likes_info: LikesInfoView,
}

impl CommentView {
    pub fn assemble(comment: &Comment, counts: LikeCounts, my_status: LikeStatus) -> Self {
        Self {
            id: comment.id.into(),
            content: comment.content.clone(),
            commentator_info: CommentatorInfoView {
                user_id: comment.author_id.into(),
                user_login: comment.author_login.clone(),
            },
            created_at: comment.created_at,
            likes_info: LikesInfoView::new(counts, my_status),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceView {
    pub ip: String,
    pub title: String,
    pub last_active_date: Timestamp,
    pub device_id: Uuid,
}

impl From<&DeviceSession> for DeviceView {
    fn from(session: &DeviceSession) -> Self {
        Self {
            ip: session.ip.clone(),
            title: session.device_name.clone(),
            last_active_date: session.last_active_at,
            device_id: session.device_id.into(),
        }
    }
}

/// 登录/刷新的响应体，刷新令牌走 httpOnly cookie 不在此出现。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenView {
    pub access_token: String,
}

/// 分页响应，`pagesCount = ceil(totalCount / pageSize)`。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub pages_count: u32,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub items: Vec<T>,
}

impl<T> From<PaginatedResult<T>> for Paginated<T> {
    fn from(result: PaginatedResult<T>) -> Self {
        Self {
            pages_count: result.pages_count,
            page: result.page,
            page_size: result.page_size,
            total_count: result.total_count,
            items: result.items,
        }
    }
}
