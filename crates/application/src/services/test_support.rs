//! 服务测试用的内存仓储与桩实现。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use domain::{
    AttemptRepository, Blog, BlogId, BlogRepository, Comment, CommentId, CommentRepository,
    ConnectionAttempt, DeviceId, DeviceSession, Like, LikeCounts, LikeRepository, LikeStatus,
    LikeTarget, MaintenanceRepository, PaginatedResult, Pagination, Post, PostId, PostRepository,
    RepositoryFuture, SessionRepository, SortConfig, SortDirection, Timestamp, User, UserEmail,
    UserId, UserListFilter, UserRepository,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::email::{EmailError, EmailSender};
use crate::password::{PasswordHasher, PasswordHasherError};
use crate::tokens::{AccessClaims, RefreshClaims, TokenError, TokenIssuer, TokenPair};

/// 可手动推进的时钟。
pub struct FixedClock {
    now: Mutex<Timestamp>,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }
}

impl FixedClock {
    pub fn advance_seconds(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(seconds);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap()
    }
}

/// 按明文前缀拼接的假哈希，足以驱动服务层逻辑。
#[derive(Default)]
pub struct FakePasswordHasher;

#[async_trait]
impl PasswordHasher for FakePasswordHasher {
    async fn hash(
        &self,
        plaintext: &str,
    ) -> Result<domain::PasswordHash, PasswordHasherError> {
        domain::PasswordHash::new(format!("hashed:{plaintext}"))
            .map_err(|err| PasswordHasherError::hash_error(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &domain::PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hashed.as_str() == format!("hashed:{plaintext}"))
    }
}

/// 记录发件并可回取验证码的假邮件发送器。
#[derive(Default)]
pub struct FakeEmailSender {
    pub sent: Mutex<Vec<(String, Uuid, &'static str)>>,
}

impl FakeEmailSender {
    pub fn last_code_for(&self, email: &str) -> Option<Uuid> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _, _)| to == email)
            .map(|(_, code, _)| *code)
    }
}

#[async_trait]
impl EmailSender for FakeEmailSender {
    async fn send_confirmation(&self, to: &UserEmail, code: Uuid) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.as_str().to_owned(), code, "confirmation"));
        Ok(())
    }

    async fn send_recovery(&self, to: &UserEmail, code: Uuid) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.as_str().to_owned(), code, "recovery"));
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FakeRefreshToken {
    user_id: Uuid,
    device_id: Uuid,
    iat: i64,
}

/// JSON 编码的假令牌签发器，verify 只解析不校验签名。
pub struct FakeTokenIssuer {
    pub refresh_ttl_seconds: i64,
}

impl Default for FakeTokenIssuer {
    fn default() -> Self {
        Self {
            refresh_ttl_seconds: 20,
        }
    }
}

impl TokenIssuer for FakeTokenIssuer {
    fn issue_pair(
        &self,
        user_id: UserId,
        device_id: DeviceId,
        now: Timestamp,
    ) -> Result<TokenPair, TokenError> {
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let refresh = FakeRefreshToken {
            user_id: user_id.into(),
            device_id: device_id.into(),
            iat: issued_at.timestamp(),
        };
        Ok(TokenPair {
            access_token: format!("access:{}", Uuid::from(user_id)),
            refresh_token: serde_json::to_string(&refresh)
                .map_err(|err| TokenError::Issue(err.to_string()))?,
            refresh_issued_at: issued_at,
            refresh_expires_at: issued_at + Duration::seconds(self.refresh_ttl_seconds),
        })
    }

    fn verify_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let user_id = token
            .strip_prefix("access:")
            .and_then(|raw| raw.parse().ok())
            .ok_or(TokenError::Invalid)?;
        Ok(AccessClaims { user_id })
    }

    fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let parsed: FakeRefreshToken =
            serde_json::from_str(token).map_err(|_| TokenError::Invalid)?;
        Ok(RefreshClaims {
            user_id: parsed.user_id,
            device_id: parsed.device_id,
            issued_at: DateTime::from_timestamp(parsed.iat, 0).ok_or(TokenError::Invalid)?,
        })
    }
}

fn sorted_page<T: Clone>(
    mut items: Vec<T>,
    pagination: Pagination,
    sort: &SortConfig,
    created_at: impl Fn(&T) -> Timestamp,
) -> PaginatedResult<T> {
    // 内存实现只支持默认的 createdAt 排序
    items.sort_by_key(&created_at);
    if sort.direction == SortDirection::Desc {
        items.reverse();
    }
    let total = items.len() as u64;
    let page_items = items
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit() as usize)
        .collect();
    PaginatedResult::new(page_items, total, pagination)
}

#[derive(Default)]
pub struct MemoryUsers {
    rows: Arc<Mutex<Vec<User>>>,
}

impl UserRepository for MemoryUsers {
    fn create(&self, user: User) -> RepositoryFuture<User> {
        let rows = self.rows.clone();
        Box::pin(async move {
            rows.lock().unwrap().push(user.clone());
            Ok(user)
        })
    }

    fn update(&self, user: User) -> RepositoryFuture<User> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            if let Some(slot) = rows.iter_mut().find(|row| row.id == user.id) {
                *slot = user.clone();
            }
            Ok(user)
        })
    }

    fn delete(&self, id: UserId) -> RepositoryFuture<bool> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id != id);
            Ok(rows.len() < before)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        let rows = self.rows.clone();
        Box::pin(async move { Ok(rows.lock().unwrap().iter().find(|u| u.id == id).cloned()) })
    }

    fn find_by_login(&self, login: &str) -> RepositoryFuture<Option<User>> {
        let rows = self.rows.clone();
        let login = login.to_owned();
        Box::pin(async move {
            Ok(rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.login.as_str() == login)
                .cloned())
        })
    }

    fn find_by_email(&self, email: &str) -> RepositoryFuture<Option<User>> {
        let rows = self.rows.clone();
        let email = email.to_owned();
        Box::pin(async move {
            Ok(rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email.as_str() == email)
                .cloned())
        })
    }

    fn find_by_confirmation_code(&self, code: Uuid) -> RepositoryFuture<Option<User>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            Ok(rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.confirmation_code == Some(code))
                .cloned())
        })
    }

    fn find_by_recovery_code(&self, code: Uuid) -> RepositoryFuture<Option<User>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            Ok(rows
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.recovery_code == Some(code))
                .cloned())
        })
    }

    fn list(
        &self,
        filter: UserListFilter,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<User>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let matches = |user: &User| {
                let login_hit = filter.login_term.as_ref().map(|term| {
                    user.login
                        .as_str()
                        .to_lowercase()
                        .contains(&term.to_lowercase())
                });
                let email_hit = filter.email_term.as_ref().map(|term| {
                    user.email
                        .as_str()
                        .to_lowercase()
                        .contains(&term.to_lowercase())
                });
                match (login_hit, email_hit) {
                    (None, None) => true,
                    // 两个条件同时给出时为“或”关系
                    (a, b) => a.unwrap_or(false) || b.unwrap_or(false),
                }
            };
            let items: Vec<User> = rows
                .lock()
                .unwrap()
                .iter()
                .filter(|u| matches(u))
                .cloned()
                .collect();
            Ok(sorted_page(items, pagination, &sort, |u| u.created_at))
        })
    }
}

#[derive(Default)]
pub struct MemoryBlogs {
    rows: Arc<Mutex<Vec<Blog>>>,
}

impl BlogRepository for MemoryBlogs {
    fn create(&self, blog: Blog) -> RepositoryFuture<Blog> {
        let rows = self.rows.clone();
        Box::pin(async move {
            rows.lock().unwrap().push(blog.clone());
            Ok(blog)
        })
    }

    fn update(&self, blog: Blog) -> RepositoryFuture<Blog> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            if let Some(slot) = rows.iter_mut().find(|row| row.id == blog.id) {
                *slot = blog.clone();
            }
            Ok(blog)
        })
    }

    fn delete(&self, id: BlogId) -> RepositoryFuture<bool> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id != id);
            Ok(rows.len() < before)
        })
    }

    fn find_by_id(&self, id: BlogId) -> RepositoryFuture<Option<Blog>> {
        let rows = self.rows.clone();
        Box::pin(async move { Ok(rows.lock().unwrap().iter().find(|b| b.id == id).cloned()) })
    }

    fn list(
        &self,
        name_term: Option<String>,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<Blog>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let items: Vec<Blog> = rows
                .lock()
                .unwrap()
                .iter()
                .filter(|b| match &name_term {
                    Some(term) => b.name.to_lowercase().contains(&term.to_lowercase()),
                    None => true,
                })
                .cloned()
                .collect();
            Ok(sorted_page(items, pagination, &sort, |b| b.created_at))
        })
    }
}

#[derive(Default)]
pub struct MemoryPosts {
    rows: Arc<Mutex<Vec<Post>>>,
    comments: Arc<Mutex<Vec<Comment>>>,
    likes: Arc<Mutex<Vec<Like>>>,
}

impl MemoryPosts {
    /// 共享评论与点赞存储，删除帖子时同步级联清理。
    pub fn linked_to(comments: &MemoryComments, likes: &MemoryLikes) -> Self {
        Self {
            rows: Arc::default(),
            comments: comments.rows.clone(),
            likes: likes.rows.clone(),
        }
    }
}

/// 删除给定帖子集合的评论及两类点赞行，对齐存储层的级联语义。
fn cascade_post_deletion(
    post_ids: &[PostId],
    comments: &Mutex<Vec<Comment>>,
    likes: &Mutex<Vec<Like>>,
) {
    let mut comments = comments.lock().unwrap();
    let comment_ids: Vec<CommentId> = comments
        .iter()
        .filter(|c| post_ids.contains(&c.post_id))
        .map(|c| c.id)
        .collect();
    comments.retain(|c| !post_ids.contains(&c.post_id));
    likes.lock().unwrap().retain(|l| match l.target {
        LikeTarget::Post => !post_ids.contains(&PostId::from(l.target_id)),
        LikeTarget::Comment => !comment_ids.contains(&CommentId::from(l.target_id)),
    });
}

impl PostRepository for MemoryPosts {
    fn create(&self, post: Post) -> RepositoryFuture<Post> {
        let rows = self.rows.clone();
        Box::pin(async move {
            rows.lock().unwrap().push(post.clone());
            Ok(post)
        })
    }

    fn update(&self, post: Post) -> RepositoryFuture<Post> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            if let Some(slot) = rows.iter_mut().find(|row| row.id == post.id) {
                *slot = post.clone();
            }
            Ok(post)
        })
    }

    fn delete(&self, id: PostId) -> RepositoryFuture<bool> {
        let rows = self.rows.clone();
        let comments = self.comments.clone();
        let likes = self.likes.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id != id);
            let removed = rows.len() < before;
            if removed {
                cascade_post_deletion(&[id], &comments, &likes);
            }
            Ok(removed)
        })
    }

    fn delete_by_blog(&self, blog_id: BlogId) -> RepositoryFuture<u64> {
        let rows = self.rows.clone();
        let comments = self.comments.clone();
        let likes = self.likes.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let removed_ids: Vec<PostId> = rows
                .iter()
                .filter(|row| row.blog_id == blog_id)
                .map(|row| row.id)
                .collect();
            rows.retain(|row| row.blog_id != blog_id);
            cascade_post_deletion(&removed_ids, &comments, &likes);
            Ok(removed_ids.len() as u64)
        })
    }

    fn find_by_id(&self, id: PostId) -> RepositoryFuture<Option<Post>> {
        let rows = self.rows.clone();
        Box::pin(async move { Ok(rows.lock().unwrap().iter().find(|p| p.id == id).cloned()) })
    }

    fn list(
        &self,
        blog_id: Option<BlogId>,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<Post>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let items: Vec<Post> = rows
                .lock()
                .unwrap()
                .iter()
                .filter(|p| blog_id.map(|id| p.blog_id == id).unwrap_or(true))
                .cloned()
                .collect();
            Ok(sorted_page(items, pagination, &sort, |p| p.created_at))
        })
    }
}

#[derive(Default)]
pub struct MemoryComments {
    rows: Arc<Mutex<Vec<Comment>>>,
    likes: Arc<Mutex<Vec<Like>>>,
}

impl MemoryComments {
    /// 共享点赞存储，删除评论时一并清理其点赞行。
    pub fn linked_to(likes: &MemoryLikes) -> Self {
        Self {
            rows: Arc::default(),
            likes: likes.rows.clone(),
        }
    }
}

impl CommentRepository for MemoryComments {
    fn create(&self, comment: Comment) -> RepositoryFuture<Comment> {
        let rows = self.rows.clone();
        Box::pin(async move {
            rows.lock().unwrap().push(comment.clone());
            Ok(comment)
        })
    }

    fn update(&self, comment: Comment) -> RepositoryFuture<Comment> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            if let Some(slot) = rows.iter_mut().find(|row| row.id == comment.id) {
                *slot = comment.clone();
            }
            Ok(comment)
        })
    }

    fn delete(&self, id: CommentId) -> RepositoryFuture<bool> {
        let rows = self.rows.clone();
        let likes = self.likes.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id != id);
            let removed = rows.len() < before;
            if removed {
                likes.lock().unwrap().retain(|l| {
                    !(l.target == LikeTarget::Comment && l.target_id == Uuid::from(id))
                });
            }
            Ok(removed)
        })
    }

    fn find_by_id(&self, id: CommentId) -> RepositoryFuture<Option<Comment>> {
        let rows = self.rows.clone();
        Box::pin(async move { Ok(rows.lock().unwrap().iter().find(|c| c.id == id).cloned()) })
    }

    fn list_by_post(
        &self,
        post_id: PostId,
        pagination: Pagination,
        sort: SortConfig,
    ) -> RepositoryFuture<PaginatedResult<Comment>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let items: Vec<Comment> = rows
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.post_id == post_id)
                .cloned()
                .collect();
            Ok(sorted_page(items, pagination, &sort, |c| c.created_at))
        })
    }
}

#[derive(Default)]
pub struct MemoryLikes {
    rows: Arc<Mutex<Vec<Like>>>,
}

impl LikeRepository for MemoryLikes {
    fn find(
        &self,
        target: LikeTarget,
        target_id: Uuid,
        user_id: UserId,
    ) -> RepositoryFuture<Option<Like>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            Ok(rows
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.target == target && l.target_id == target_id && l.user_id == user_id)
                .cloned())
        })
    }

    fn upsert(&self, like: Like) -> RepositoryFuture<()> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            rows.retain(|l| {
                !(l.target == like.target
                    && l.target_id == like.target_id
                    && l.user_id == like.user_id)
            });
            rows.push(like);
            Ok(())
        })
    }

    fn remove(
        &self,
        target: LikeTarget,
        target_id: Uuid,
        user_id: UserId,
    ) -> RepositoryFuture<bool> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|l| {
                !(l.target == target && l.target_id == target_id && l.user_id == user_id)
            });
            Ok(rows.len() < before)
        })
    }

    fn counts_many(
        &self,
        target: LikeTarget,
        target_ids: Vec<Uuid>,
    ) -> RepositoryFuture<HashMap<Uuid, LikeCounts>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let rows = rows.lock().unwrap();
            let mut out = HashMap::new();
            for id in target_ids {
                let mut counts = LikeCounts::default();
                for like in rows.iter().filter(|l| l.target == target && l.target_id == id) {
                    match like.status {
                        LikeStatus::Like => counts.likes += 1,
                        LikeStatus::Dislike => counts.dislikes += 1,
                        LikeStatus::None => {}
                    }
                }
                out.insert(id, counts);
            }
            Ok(out)
        })
    }

    fn statuses_for_user(
        &self,
        target: LikeTarget,
        target_ids: Vec<Uuid>,
        user_id: UserId,
    ) -> RepositoryFuture<HashMap<Uuid, LikeStatus>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let rows = rows.lock().unwrap();
            let mut out = HashMap::new();
            for id in target_ids {
                if let Some(like) = rows
                    .iter()
                    .find(|l| l.target == target && l.target_id == id && l.user_id == user_id)
                {
                    out.insert(id, like.status);
                }
            }
            Ok(out)
        })
    }

    fn newest_many(
        &self,
        target: LikeTarget,
        target_ids: Vec<Uuid>,
        limit: u32,
    ) -> RepositoryFuture<HashMap<Uuid, Vec<Like>>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let rows = rows.lock().unwrap();
            let mut out = HashMap::new();
            for id in target_ids {
                let mut likes: Vec<Like> = rows
                    .iter()
                    .filter(|l| {
                        l.target == target && l.target_id == id && l.status == LikeStatus::Like
                    })
                    .cloned()
                    .collect();
                likes.sort_by_key(|l| std::cmp::Reverse(l.added_at));
                likes.truncate(limit as usize);
                out.insert(id, likes);
            }
            Ok(out)
        })
    }
}

#[derive(Default)]
pub struct MemorySessions {
    rows: Arc<Mutex<Vec<DeviceSession>>>,
}

impl SessionRepository for MemorySessions {
    fn create(&self, session: DeviceSession) -> RepositoryFuture<DeviceSession> {
        let rows = self.rows.clone();
        Box::pin(async move {
            rows.lock().unwrap().push(session.clone());
            Ok(session)
        })
    }

    fn update(&self, session: DeviceSession) -> RepositoryFuture<DeviceSession> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            if let Some(slot) = rows.iter_mut().find(|row| row.device_id == session.device_id) {
                *slot = session.clone();
            }
            Ok(session)
        })
    }

    fn delete(&self, device_id: DeviceId) -> RepositoryFuture<bool> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.device_id != device_id);
            Ok(rows.len() < before)
        })
    }

    fn find_by_device(&self, device_id: DeviceId) -> RepositoryFuture<Option<DeviceSession>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            Ok(rows
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.device_id == device_id)
                .cloned())
        })
    }

    fn list_by_user(&self, user_id: UserId) -> RepositoryFuture<Vec<DeviceSession>> {
        let rows = self.rows.clone();
        Box::pin(async move {
            Ok(rows
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect())
        })
    }

    fn delete_others(&self, user_id: UserId, keep: DeviceId) -> RepositoryFuture<u64> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.user_id != user_id || row.device_id == keep);
            Ok((before - rows.len()) as u64)
        })
    }

    fn delete_expired(&self, now: Timestamp) -> RepositoryFuture<u64> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.expires_at > now);
            Ok((before - rows.len()) as u64)
        })
    }
}

#[derive(Default)]
pub struct MemoryAttempts {
    rows: Arc<Mutex<Vec<ConnectionAttempt>>>,
}

impl AttemptRepository for MemoryAttempts {
    fn record(&self, attempt: ConnectionAttempt) -> RepositoryFuture<()> {
        let rows = self.rows.clone();
        Box::pin(async move {
            rows.lock().unwrap().push(attempt);
            Ok(())
        })
    }

    fn count_since(&self, ip: String, route: String, since: Timestamp) -> RepositoryFuture<u64> {
        let rows = self.rows.clone();
        Box::pin(async move {
            Ok(rows
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.ip == ip && a.route == route && a.attempted_at >= since)
                .count() as u64)
        })
    }

    fn delete_older_than(&self, cutoff: Timestamp) -> RepositoryFuture<u64> {
        let rows = self.rows.clone();
        Box::pin(async move {
            let mut rows = rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|a| a.attempted_at >= cutoff);
            Ok((before - rows.len()) as u64)
        })
    }
}

#[derive(Default)]
pub struct MemoryMaintenance {
    pub wiped: Mutex<bool>,
}

impl MaintenanceRepository for MemoryMaintenance {
    fn wipe_all(&self) -> RepositoryFuture<()> {
        *self.wiped.lock().unwrap() = true;
        Box::pin(async { Ok(()) })
    }
}
