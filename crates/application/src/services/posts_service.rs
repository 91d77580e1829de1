use std::collections::HashMap;
use std::sync::Arc;

use domain::{
    BlogId, BlogRepository, Like, LikeCounts, LikeRepository, LikeStatus, LikeTarget,
    LikeTransition, PaginatedResult, Pagination, Post, PostId, PostRepository, SortConfig, UserId,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::dto::{ExtendedLikesInfoView, PostView};
use crate::error::ApplicationError;

/// extendedLikesInfo.newestLikes 的截断上限。
const NEWEST_LIKES_LIMIT: u32 = 3;

#[derive(Debug, Clone)]
pub struct PostInput {
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub blog_id: BlogId,
}

pub struct PostsServiceDependencies {
    pub posts: Arc<dyn PostRepository>,
    pub blogs: Arc<dyn BlogRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct PostsService {
    deps: PostsServiceDependencies,
}

impl PostsService {
    pub fn new(deps: PostsServiceDependencies) -> Self {
        Self { deps }
    }

    /// 创建帖子。blogName 取创建时刻的快照，博客改名不回写。
    pub async fn create(
        &self,
        input: PostInput,
        viewer: Option<UserId>,
    ) -> Result<PostView, ApplicationError> {
        let blog = self
            .deps
            .blogs
            .find_by_id(input.blog_id)
            .await?
            .ok_or(ApplicationError::NotFound)?;

        let now = self.deps.clock.now();
        let post = Post::create(
            PostId::generate(),
            input.title,
            input.short_description,
            input.content,
            blog.id,
            blog.name,
            now,
        )?;
        let stored = self.deps.posts.create(post).await?;
        self.assemble_view(&stored, viewer).await
    }

    pub async fn get(
        &self,
        id: PostId,
        viewer: Option<UserId>,
    ) -> Result<PostView, ApplicationError> {
        let post = self
            .deps
            .posts
            .find_by_id(id)
            .await?
            .ok_or(ApplicationError::NotFound)?;
        self.assemble_view(&post, viewer).await
    }

    /// 帖子列表；`blog_id` 给定时限定在该博客下，博客不存在返回 NotFound。
    pub async fn list(
        &self,
        blog_id: Option<BlogId>,
        pagination: Pagination,
        sort: SortConfig,
        viewer: Option<UserId>,
    ) -> Result<PaginatedResult<PostView>, ApplicationError> {
        if let Some(blog_id) = blog_id {
            if self.deps.blogs.find_by_id(blog_id).await?.is_none() {
                return Err(ApplicationError::NotFound);
            }
        }

        let page = self.deps.posts.list(blog_id, pagination, sort).await?;
        let ids: Vec<Uuid> = page.items.iter().map(|post| post.id.into()).collect();

        let counts = self
            .deps
            .likes
            .counts_many(LikeTarget::Post, ids.clone())
            .await?;
        let newest = self
            .deps
            .likes
            .newest_many(LikeTarget::Post, ids.clone(), NEWEST_LIKES_LIMIT)
            .await?;
        let statuses = self.viewer_statuses(ids, viewer).await?;

        let views = page
            .items
            .iter()
            .map(|post| {
                let post_id = Uuid::from(post.id);
                view_of(
                    post,
                    counts.get(&post_id).copied().unwrap_or_default(),
                    statuses
                        .get(&post_id)
                        .copied()
                        .unwrap_or(LikeStatus::None),
                    newest.get(&post_id).map(Vec::as_slice).unwrap_or(&[]),
                )
            })
            .collect();

        Ok(PaginatedResult {
            items: views,
            total_count: page.total_count,
            page: page.page,
            page_size: page.page_size,
            pages_count: page.pages_count,
        })
    }

    pub async fn update(&self, id: PostId, input: PostInput) -> Result<(), ApplicationError> {
        let mut post = self
            .deps
            .posts
            .find_by_id(id)
            .await?
            .ok_or(ApplicationError::NotFound)?;
        let blog = self
            .deps
            .blogs
            .find_by_id(input.blog_id)
            .await?
            .ok_or(ApplicationError::NotFound)?;

        post.update(
            input.title,
            input.short_description,
            input.content,
            blog.id,
            blog.name,
        )?;
        self.deps.posts.update(post).await?;
        Ok(())
    }

    pub async fn delete(&self, id: PostId) -> Result<(), ApplicationError> {
        let deleted = self.deps.posts.delete(id).await?;
        if !deleted {
            return Err(ApplicationError::NotFound);
        }
        Ok(())
    }

    /// 点赞状态机入口，见 `domain::LikeTransition`。幂等：重复设置同一状态是 no-op。
    pub async fn set_like_status(
        &self,
        post_id: PostId,
        user_id: UserId,
        user_login: String,
        requested: LikeStatus,
    ) -> Result<(), ApplicationError> {
        if self.deps.posts.find_by_id(post_id).await?.is_none() {
            return Err(ApplicationError::NotFound);
        }

        let target_id = Uuid::from(post_id);
        let current = self
            .deps
            .likes
            .find(LikeTarget::Post, target_id, user_id)
            .await?
            .map(|like| like.status)
            .unwrap_or(LikeStatus::None);

        match LikeTransition::plan(current, requested) {
            LikeTransition::Keep => Ok(()),
            LikeTransition::Upsert(status) => {
                let like = Like {
                    target: LikeTarget::Post,
                    target_id,
                    user_id,
                    user_login,
                    status,
                    added_at: self.deps.clock.now(),
                };
                self.deps.likes.upsert(like).await?;
                Ok(())
            }
            LikeTransition::Remove => {
                self.deps
                    .likes
                    .remove(LikeTarget::Post, target_id, user_id)
                    .await?;
                Ok(())
            }
        }
    }

    async fn assemble_view(
        &self,
        post: &Post,
        viewer: Option<UserId>,
    ) -> Result<PostView, ApplicationError> {
        let target_id = Uuid::from(post.id);
        let counts = self
            .deps
            .likes
            .counts_many(LikeTarget::Post, vec![target_id])
            .await?;
        let newest = self
            .deps
            .likes
            .newest_many(LikeTarget::Post, vec![target_id], NEWEST_LIKES_LIMIT)
            .await?;
        let statuses = self.viewer_statuses(vec![target_id], viewer).await?;

        Ok(view_of(
            post,
            counts.get(&target_id).copied().unwrap_or_default(),
            statuses
                .get(&target_id)
                .copied()
                .unwrap_or(LikeStatus::None),
            newest.get(&target_id).map(Vec::as_slice).unwrap_or(&[]),
        ))
    }

    /// 匿名访问者的 myStatus 恒为 None，不查库。
    async fn viewer_statuses(
        &self,
        ids: Vec<Uuid>,
        viewer: Option<UserId>,
    ) -> Result<HashMap<Uuid, LikeStatus>, ApplicationError> {
        match viewer {
            Some(user_id) => Ok(self
                .deps
                .likes
                .statuses_for_user(LikeTarget::Post, ids, user_id)
                .await?),
            None => Ok(HashMap::new()),
        }
    }
}

fn view_of(post: &Post, counts: LikeCounts, my_status: LikeStatus, newest: &[Like]) -> PostView {
    PostView {
        id: post.id.into(),
        title: post.title.clone(),
        short_description: post.short_description.clone(),
        content: post.content.clone(),
        blog_id: post.blog_id.into(),
        blog_name: post.blog_name.clone(),
        created_at: post.created_at,
        extended_likes_info: ExtendedLikesInfoView::new(counts, my_status, newest),
    }
}
